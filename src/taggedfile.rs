// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The [`TaggedFile`] struct represents a file that contains tags.

use crate::config::Config;
use crate::song::{FileType, SongMetadata};
use crate::tag::{read_tag_from_path, Tag, TagKey, TagType};
use crate::util::{modify_through_copy, parse_year, touch};
use lofty::file::AudioFile;
use lofty::probe::Probe;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Artist name that marks a song as part of a compilation if the compilation flag is missing.
const VARIOUS_ARTISTS: &str = "various artists";

/// Get the trimmed, non-empty text value for the key.
fn tag_text(tag: &dyn Tag, key: TagKey) -> Option<String> {
    tag.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse the leading number of values like `3` or `3/12`.
fn tag_leading_number(tag: &dyn Tag, key: TagKey) -> Option<i32> {
    let value = tag.get(key)?;
    let number = value.split('/').next()?.trim();
    number
        .parse()
        .inspect_err(|err| log::warn!("Ignoring invalid {key:?} value {value:?}: {err}"))
        .ok()
}

/// Parse a floating point value.
fn tag_float(tag: &dyn Tag, key: TagKey) -> Option<f64> {
    let value = tag.get(key)?;
    value
        .trim()
        .parse()
        .inspect_err(|err| log::warn!("Ignoring invalid {key:?} value {value:?}: {err}"))
        .ok()
}

/// Format a positive number for a tag, or `None` to clear the tag.
fn positive_number<T>(value: T) -> Option<Cow<'static, str>>
where
    T: PartialOrd + Default + ToString,
{
    (value > T::default()).then(|| Cow::from(value.to_string()))
}

/// A file with its (optional) tag.
pub struct TaggedFile {
    /// Path of the file.
    path: PathBuf,
    /// Container format of the file.
    file_type: FileType,
    /// Tag of the file, if the format has a tag backend.
    tag: Option<Box<dyn Tag>>,
}

impl fmt::Debug for TaggedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("TaggedFile")
            .field("path", &self.path)
            .field("file_type", &self.file_type)
            .field("tag", &self.tag.as_ref().map(|tag| tag.tag_type()))
            .finish()
    }
}

impl TaggedFile {
    /// Create a new tagged file with an empty path from the given tag.
    #[cfg(test)]
    #[must_use]
    pub fn new(file_type: FileType, tag: Option<Box<dyn Tag>>) -> Self {
        TaggedFile {
            path: PathBuf::new(),
            file_type,
            tag,
        }
    }

    /// Creates a [`TaggedFile`] from the path.
    ///
    /// Files without a tag backend have no tag.
    ///
    /// # Errors
    ///
    /// Returns an error in case the file at the given path does not exist or its tag is malformed.
    pub fn read_from_path(path: impl AsRef<Path>, config: &Config) -> crate::Result<Self> {
        let path = path.as_ref();
        let file_type = FileType::from_path(path);
        let tag = read_tag_from_path(path, file_type, config)?;
        Ok(TaggedFile {
            path: path.to_path_buf(),
            file_type,
            tag,
        })
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container format of the file.
    #[must_use]
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Returns the tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&dyn Tag> {
        self.tag.as_deref()
    }

    /// Returns the tag for modification, if any.
    pub fn tag_mut(&mut self) -> Option<&mut (dyn Tag + 'static)> {
        self.tag.as_deref_mut()
    }

    /// Fill the song record from the tag.
    ///
    /// Fields without a value in the tag are left untouched.
    pub fn read_song_metadata(&self, song: &mut SongMetadata, config: &Config) {
        let Some(tag) = self.tag() else {
            return;
        };

        for (key, field) in [
            (TagKey::TrackTitle, &mut song.title),
            (TagKey::Artist, &mut song.artist),
            (TagKey::Album, &mut song.album),
            (TagKey::AlbumArtist, &mut song.albumartist),
            (TagKey::Composer, &mut song.composer),
            (TagKey::Performer, &mut song.performer),
            (TagKey::Grouping, &mut song.grouping),
            (TagKey::Lyrics, &mut song.lyrics),
            (TagKey::Comment, &mut song.comment),
            (TagKey::Genre, &mut song.genre),
        ] {
            if let Some(value) = tag_text(tag, key) {
                *field = value;
            }
        }

        if let Some(track) = tag_leading_number(tag, TagKey::TrackNumber) {
            song.track = track;
        }
        if let Some(disc) = tag_leading_number(tag, TagKey::DiscNumber) {
            song.disc = disc;
        }
        if let Some(year) = tag.get(TagKey::ReleaseDate).as_deref().and_then(parse_year) {
            song.year = year;
        }
        if let Some(year) = tag
            .get(TagKey::OriginalReleaseDate)
            .as_deref()
            .and_then(parse_year)
        {
            song.originalyear = year;
        }

        song.compilation = match tag_text(tag, TagKey::Compilation) {
            Some(value) => value.parse::<i32>().is_ok_and(|flag| flag == 1),
            None => song.artist.eq_ignore_ascii_case(VARIOUS_ARTISTS),
        };

        #[allow(clippy::cast_possible_truncation)]
        {
            if let Some(bpm) = tag_float(tag, TagKey::Bpm) {
                song.bpm = bpm as f32;
            }
            if let Some(rating) =
                tag_float(tag, TagKey::Rating).filter(|rating| *rating >= 0.0)
            {
                song.rating = rating as f32;
            }
            if let Some(playcount) =
                tag_float(tag, TagKey::PlayCount).filter(|playcount| *playcount > 0.0)
            {
                song.playcount = playcount.round() as i32;
            }
            if let Some(score) = tag_float(tag, TagKey::Score).filter(|score| *score > 0.0) {
                song.score = (score * 100.0).trunc() as i32;
            }
        }

        if tag.has_embedded_art() {
            song.art_automatic = config.embedded_cover_marker().to_string();
        }
    }

    /// Assign all editable fields of the song record to the tag.
    ///
    /// Empty strings and unset numbers clear the corresponding tag value.
    pub fn assign_song_metadata(&mut self, song: &SongMetadata) {
        let Some(tag) = self.tag_mut() else {
            return;
        };

        for (key, value) in [
            (TagKey::TrackTitle, &song.title),
            (TagKey::Artist, &song.artist),
            (TagKey::Album, &song.album),
            (TagKey::AlbumArtist, &song.albumartist),
            (TagKey::Composer, &song.composer),
            (TagKey::Performer, &song.performer),
            (TagKey::Grouping, &song.grouping),
            (TagKey::Lyrics, &song.lyrics),
            (TagKey::Comment, &song.comment),
            (TagKey::Genre, &song.genre),
        ] {
            tag.set_or_clear(key, Some(Cow::from(value.as_str())));
        }

        tag.set_or_clear(TagKey::ReleaseDate, positive_number(song.year));
        tag.set_or_clear(TagKey::TrackNumber, positive_number(song.track));
        tag.set_or_clear(TagKey::DiscNumber, positive_number(song.disc));
        tag.set_or_clear(TagKey::Bpm, positive_number(song.bpm));
        match (song.compilation, tag.tag_type()) {
            (true, _) => tag.set(TagKey::Compilation, Cow::from("1")),
            (false, TagType::Mp4) => tag.set(TagKey::Compilation, Cow::from("0")),
            (false, _) => tag.clear(TagKey::Compilation),
        }
    }

    /// Assign the play count and the score of the song record to the tag.
    ///
    /// Zero values are not written.
    pub fn assign_statistics(&mut self, song: &SongMetadata) {
        let Some(tag) = self.tag_mut() else {
            return;
        };

        if song.playcount != 0 {
            tag.set(TagKey::PlayCount, Cow::from(song.playcount.to_string()));
        }
        if song.score != 0 {
            let score = f64::from(song.score) / 100.0;
            tag.set(TagKey::Score, Cow::from(score.to_string()));
        }
    }

    /// Assign the rating of the song record to the tag.
    pub fn assign_rating(&mut self, song: &SongMetadata) {
        if let Some(tag) = self.tag_mut() {
            tag.set(TagKey::Rating, Cow::from(song.rating.to_string()));
        }
    }

    /// Write the tag to the file.
    ///
    /// Depending on the configuration, the tag is written to a temporary copy that replaces the
    /// original file afterwards, and the modification time is updated after saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the file has no tag or writing the tag fails.
    pub fn save(&mut self, config: &Config) -> crate::Result<()> {
        let Some(tag) = self.tag.as_mut() else {
            return Err(match self.file_type {
                FileType::Unknown => crate::ErrorType::UnknownFileType,
                file_type => crate::ErrorType::UnsupportedFileType(file_type),
            });
        };

        log::debug!("Saving {:?} tag to {}", tag.tag_type(), self.path.display());
        if config.atomic_writes() {
            modify_through_copy(&self.path, |path| tag.write_to_path(path))?;
        } else {
            tag.write_to_path(&self.path)?;
        }

        if config.touch_after_save() {
            touch(&self.path)?;
        }

        Ok(())
    }
}

/// Audio properties of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioProperties {
    /// Audio bitrate in kbit/s.
    pub bitrate: Option<u32>,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Duration of the audio stream.
    pub duration: Duration,
}

impl AudioProperties {
    /// Read the audio properties of the file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its format is not supported.
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let tagged_file = Probe::open(path)?.guess_file_type()?.read()?;
        let properties = tagged_file.properties();
        Ok(AudioProperties {
            bitrate: properties.audio_bitrate(),
            sample_rate: properties.sample_rate(),
            duration: properties.duration(),
        })
    }

    /// Apply the properties to the song record.
    pub fn apply_to(&self, song: &mut SongMetadata) {
        song.bitrate = self
            .bitrate
            .and_then(|bitrate| i32::try_from(bitrate).ok())
            .unwrap_or(-1);
        song.samplerate = self
            .sample_rate
            .and_then(|sample_rate| i32::try_from(sample_rate).ok())
            .unwrap_or(-1);
        song.length_nanosec = i64::try_from(self.duration.as_nanos()).unwrap_or(-1);
    }
}
