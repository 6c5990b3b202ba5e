// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Tags and tag-related functions.

mod ape;
#[cfg(feature = "flac")]
mod flac;
#[cfg(feature = "id3")]
pub mod id3;
mod mp4;
mod vorbis;

use crate::config::Config;
use crate::song::FileType;
use std::borrow::Cow;
use std::path::Path;

/// A tag key describes the kind of information in a generic, format-independent way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    /// Track Title.
    TrackTitle,
    /// Track Artist Name(s).
    Artist,
    /// Title of the release.
    Album,
    /// Artist(s) primarily credited on the release.
    AlbumArtist,
    /// Genre Name(s) of the track.
    Genre,
    /// Comment.
    Comment,
    /// Release Date (YYYY-MM-DD or YYYY) - the date that the release was issued.
    ReleaseDate,
    /// Track number on the disc.
    TrackNumber,
    /// Number of the disc in this release that contains this track.
    DiscNumber,
    /// Beats per minute of the track.
    Bpm,
    /// Composer Name(s).
    Composer,
    /// Performer.
    Performer,
    /// Content Group.
    Grouping,
    /// Unsynchronized lyrics.
    Lyrics,
    /// 1 for Various Artist albums, otherwise 0 (compatible with iTunes).
    Compilation,
    /// The original release date in the format YYYY-MM-DD or YYYY.
    OriginalReleaseDate,
    /// Rating of the track between 0.0 and 1.0 (`FMPS_Rating`).
    Rating,
    /// Number of times the track was played (`FMPS_PlayCount`).
    PlayCount,
    /// Automatically computed score between 0.0 and 1.0 (`FMPS_Rating_Amarok_Score`).
    Score,
}

/// The tag type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    /// ID3v2.2 tag
    ID3v22,
    /// ID3v2.3 tag
    ID3v23,
    /// ID3v2.4 tag
    ID3v24,
    /// Vorbis comments from a FLAC file
    Flac,
    /// Vorbis comments from an Ogg file
    Vorbis,
    /// APEv2 tag
    Ape,
    /// iTunes-style MP4 metadata
    Mp4,
}

/// A tag can be used for reading and writing.
pub trait Tag {
    /// Get the tag type.
    fn tag_type(&self) -> TagType;

    /// Get the string value for the tag key.
    ///
    /// If the key maps to several frames or fields, the first one that carries a value is used.
    fn get(&self, key: TagKey) -> Option<Cow<'_, str>>;

    /// Set the value for the tag key.
    fn set(&mut self, key: TagKey, value: Cow<'_, str>);

    /// Remove all values for the tag key.
    fn clear(&mut self, key: TagKey);

    /// Set the value for the tag key if it is `Some` and not empty, otherwise clear it.
    fn set_or_clear(&mut self, key: TagKey, value: Option<Cow<'_, str>>) {
        match value {
            Some(value) if !value.trim().is_empty() => self.set(key, value),
            _ => self.clear(key),
        }
    }

    /// Get the embedded cover art (image data), if any.
    fn embedded_art(&self) -> Option<Cow<'_, [u8]>>;

    /// Returns `true` if the tag contains embedded cover art.
    fn has_embedded_art(&self) -> bool {
        self.embedded_art().is_some()
    }

    /// Write the tag to the file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be accessed or the tag cannot be written.
    fn write_to_path(&mut self, path: &Path) -> crate::Result<()>;
}

/// Returns `true` if the value should be used for the key.
///
/// Statistics (rating and play count) need to be positive, other values must not be blank.
fn is_relevant_value(key: TagKey, value: &str) -> bool {
    match key {
        TagKey::Rating | TagKey::PlayCount => value
            .trim()
            .parse::<f64>()
            .is_ok_and(|number| number > 0.0),
        _ => !value.trim().is_empty(),
    }
}

/// Select the value for `key` from candidate values ordered by precedence.
///
/// The first relevant value wins. If there is none, rating and play count fall back to the first
/// non-blank value (e.g., an explicit `0`).
fn select_value<'a, I>(key: TagKey, candidates: I) -> Option<Cow<'a, str>>
where
    I: IntoIterator<Item = Cow<'a, str>>,
{
    let mut fallback = None;
    for value in candidates {
        if is_relevant_value(key, &value) {
            return Some(value);
        }
        if fallback.is_none() && !value.trim().is_empty() {
            fallback = Some(value);
        }
    }

    match key {
        TagKey::Rating | TagKey::PlayCount => fallback,
        _ => None,
    }
}

/// Read the tag from the file at the given path.
///
/// Returns `Ok(None)` if there is no tag backend for the file type.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the tag is malformed.
pub fn read_tag_from_path(
    path: impl AsRef<Path>,
    file_type: FileType,
    config: &Config,
) -> crate::Result<Option<Box<dyn Tag>>> {
    let path = path.as_ref();
    #[cfg(not(feature = "id3"))]
    let _ = config;
    let tag: Box<dyn Tag> = match file_type {
        #[cfg(feature = "id3")]
        FileType::Mpeg | FileType::Wav | FileType::Aiff => Box::new(
            id3::ID3v2Tag::read_from_path(path, config)?,
        ),
        #[cfg(feature = "flac")]
        FileType::Flac => Box::new(flac::FlacTag::read_from_path(path)?),
        FileType::OggVorbis | FileType::OggOpus | FileType::OggSpeex => {
            Box::new(vorbis::VorbisTag::read_from_path(path, file_type)?)
        }
        FileType::Ape | FileType::Mpc | FileType::WavPack => {
            Box::new(ape::ApeTag::read_from_path(path, file_type)?)
        }
        FileType::Mp4 => Box::new(mp4::Mp4Tag::read_from_path(path)?),
        file_type => {
            log::debug!(
                "No tag support for {file_type:?} file {}",
                path.display()
            );
            return Ok(None);
        }
    };

    Ok(Some(tag))
}
