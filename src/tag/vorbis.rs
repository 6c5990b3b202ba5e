// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for Vorbis comments in Ogg files (Vorbis, Opus and Speex).

use crate::song::FileType;
use crate::tag::{select_value, Tag, TagKey, TagType};
use base64::prelude::{Engine, BASE64_STANDARD};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::ogg::{OggPictureStorage, OpusFile, SpeexFile, VorbisComments, VorbisFile};
use lofty::picture::PictureType;
use lofty::tag::TagExt;
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

/// Field that contains base64-encoded cover art in old-style Ogg files.
const COVER_ART_FIELD: &str = "COVERART";

/// Get the Vorbis comment field names for a tag key, ordered by precedence.
///
/// Values are written to the first field. The other fields are legacy aliases that are removed
/// when the value is written.
pub(super) fn tag_key_to_fields(key: TagKey) -> &'static [&'static str] {
    match key {
        TagKey::TrackTitle => &["TITLE"],
        TagKey::Artist => &["ARTIST"],
        TagKey::Album => &["ALBUM"],
        TagKey::AlbumArtist => &["ALBUMARTIST", "ALBUM ARTIST"],
        TagKey::Genre => &["GENRE"],
        TagKey::Comment => &["COMMENT", "DESCRIPTION"],
        TagKey::ReleaseDate => &["DATE"],
        TagKey::TrackNumber => &["TRACKNUMBER"],
        TagKey::DiscNumber => &["DISCNUMBER"],
        TagKey::Bpm => &["BPM"],
        TagKey::Composer => &["COMPOSER"],
        TagKey::Performer => &["PERFORMER"],
        TagKey::Grouping => &["CONTENT GROUP", "GROUPING"],
        TagKey::Lyrics => &["LYRICS", "UNSYNCEDLYRICS"],
        TagKey::Compilation => &["COMPILATION"],
        TagKey::OriginalReleaseDate => &["ORIGINALDATE", "ORIGINALYEAR"],
        TagKey::Rating => &["FMPS_RATING"],
        TagKey::PlayCount => &["FMPS_PLAYCOUNT"],
        TagKey::Score => &["FMPS_RATING_AMAROK_SCORE"],
    }
}

/// Decode base64-encoded cover art from a `COVERART` field.
pub(super) fn decode_cover_art(value: &str) -> Option<Vec<u8>> {
    BASE64_STANDARD
        .decode(value.trim())
        .inspect_err(|err| log::warn!("Ignoring malformed {COVER_ART_FIELD} field: {err}"))
        .ok()
        .filter(|data| !data.is_empty())
}

/// Vorbis comments of an Ogg file.
#[derive(Debug)]
pub struct VorbisTag {
    /// The underlying tag data.
    data: VorbisComments,
    /// Codec of the Ogg file.
    file_type: FileType,
}

impl VorbisTag {
    #[cfg(test)]
    pub fn new() -> Self {
        VorbisTag {
            data: VorbisComments::default(),
            file_type: FileType::OggVorbis,
        }
    }

    /// Read the Vorbis comments from the Ogg file at the given path.
    pub fn read_from_path(path: impl AsRef<Path>, file_type: FileType) -> crate::Result<Self> {
        let mut file = File::open(path)?;
        let options = ParseOptions::new().read_properties(false);
        let data = match file_type {
            FileType::OggOpus => OpusFile::read_from(&mut file, options)?
                .vorbis_comments()
                .clone(),
            FileType::OggSpeex => SpeexFile::read_from(&mut file, options)?
                .vorbis_comments()
                .clone(),
            FileType::OggVorbis => VorbisFile::read_from(&mut file, options)?
                .vorbis_comments()
                .clone(),
            file_type => return Err(crate::ErrorType::UnsupportedFileType(file_type)),
        };
        Ok(VorbisTag { data, file_type })
    }
}

impl Tag for VorbisTag {
    fn tag_type(&self) -> TagType {
        TagType::Vorbis
    }

    fn get(&self, key: TagKey) -> Option<Cow<'_, str>> {
        select_value(
            key,
            tag_key_to_fields(key)
                .iter()
                .flat_map(|field| self.data.get_all(field))
                .map(Cow::from),
        )
    }

    fn set(&mut self, key: TagKey, value: Cow<'_, str>) {
        let fields = tag_key_to_fields(key);
        if let Some((field, aliases)) = fields.split_first() {
            for alias in aliases {
                self.data.remove(alias).for_each(drop);
            }
            self.data.insert((*field).to_string(), value.into_owned());
        }
    }

    fn clear(&mut self, key: TagKey) {
        for field in tag_key_to_fields(key) {
            self.data.remove(field).for_each(drop);
        }
    }

    fn embedded_art(&self) -> Option<Cow<'_, [u8]>> {
        let pictures = self.data.pictures();
        pictures
            .iter()
            .find(|(picture, _)| picture.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())
            .map(|(picture, _)| Cow::from(picture.data()))
            .or_else(|| {
                self.data
                    .get(COVER_ART_FIELD)
                    .and_then(decode_cover_art)
                    .map(Cow::from)
            })
    }

    fn write_to_path(&mut self, path: &Path) -> crate::Result<()> {
        log::debug!("Writing {:?} comments to {}", self.file_type, path.display());
        self.data.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paste::paste;

    macro_rules! add_test_get_and_set {
        ($tagkey:expr, $fnsuffix:ident) => {
            paste! {
                #[test]
                fn [<test_get_and_set_ $fnsuffix>]() {
                    let mut tag = VorbisTag::new();
                    assert!(tag.get($tagkey).is_none());

                    tag.set($tagkey, Cow::from("Example Value"));
                    assert_eq!(tag.get($tagkey).as_deref(), Some("Example Value"));

                    tag.clear($tagkey);
                    assert!(tag.get($tagkey).is_none());
                }
            }
        };
    }

    add_test_get_and_set!(TagKey::TrackTitle, tracktitle);
    add_test_get_and_set!(TagKey::Artist, artist);
    add_test_get_and_set!(TagKey::Album, album);
    add_test_get_and_set!(TagKey::AlbumArtist, albumartist);
    add_test_get_and_set!(TagKey::Genre, genre);
    add_test_get_and_set!(TagKey::Comment, comment);
    add_test_get_and_set!(TagKey::ReleaseDate, releasedate);
    add_test_get_and_set!(TagKey::TrackNumber, tracknumber);
    add_test_get_and_set!(TagKey::DiscNumber, discnumber);
    add_test_get_and_set!(TagKey::Bpm, bpm);
    add_test_get_and_set!(TagKey::Composer, composer);
    add_test_get_and_set!(TagKey::Performer, performer);
    add_test_get_and_set!(TagKey::Grouping, grouping);
    add_test_get_and_set!(TagKey::Lyrics, lyrics);
    add_test_get_and_set!(TagKey::Compilation, compilation);
    add_test_get_and_set!(TagKey::OriginalReleaseDate, originalreleasedate);
    add_test_get_and_set!(TagKey::Score, score);

    #[test]
    fn test_album_artist_alias() {
        let mut tag = VorbisTag::new();
        tag.data
            .push("ALBUM ARTIST".to_string(), "Miles Davis".to_string());
        assert_eq!(tag.get(TagKey::AlbumArtist).as_deref(), Some("Miles Davis"));

        tag.data
            .push("ALBUMARTIST".to_string(), "John Coltrane".to_string());
        assert_eq!(
            tag.get(TagKey::AlbumArtist).as_deref(),
            Some("John Coltrane")
        );

        tag.set(TagKey::AlbumArtist, Cow::from("Bill Evans"));
        assert_eq!(tag.data.get("ALBUMARTIST"), Some("Bill Evans"));
        assert!(tag.data.get("ALBUM ARTIST").is_none());
    }

    #[test]
    fn test_unsynced_lyrics_alias() {
        let mut tag = VorbisTag::new();
        tag.data
            .push("UNSYNCEDLYRICS".to_string(), "La la la".to_string());
        assert_eq!(tag.get(TagKey::Lyrics).as_deref(), Some("La la la"));

        tag.set(TagKey::Lyrics, Cow::from("Do re mi"));
        assert_eq!(tag.data.get("LYRICS"), Some("Do re mi"));
        assert!(tag.data.get("UNSYNCEDLYRICS").is_none());
    }

    #[test]
    fn test_original_year_fallback() {
        let mut tag = VorbisTag::new();
        tag.data.push("ORIGINALYEAR".to_string(), "1959".to_string());
        assert_eq!(
            tag.get(TagKey::OriginalReleaseDate).as_deref(),
            Some("1959")
        );

        tag.data
            .push("ORIGINALDATE".to_string(), "1958-03-09".to_string());
        assert_eq!(
            tag.get(TagKey::OriginalReleaseDate).as_deref(),
            Some("1958-03-09")
        );
    }

    #[test]
    fn test_statistics() {
        let mut tag = VorbisTag::new();
        tag.set(TagKey::Rating, Cow::from("0.6"));
        tag.set(TagKey::PlayCount, Cow::from("3"));
        assert_eq!(tag.data.get("FMPS_RATING"), Some("0.6"));
        assert_eq!(tag.data.get("FMPS_PLAYCOUNT"), Some("3"));
        assert_eq!(tag.get(TagKey::Rating).as_deref(), Some("0.6"));
        assert_eq!(tag.get(TagKey::PlayCount).as_deref(), Some("3"));
    }

    #[test]
    fn test_cover_art_field() {
        let mut tag = VorbisTag::new();
        assert!(!tag.has_embedded_art());

        tag.data
            .push(COVER_ART_FIELD.to_string(), BASE64_STANDARD.encode(b"\x89PNG"));
        assert_eq!(tag.embedded_art().as_deref(), Some(b"\x89PNG".as_slice()));
    }

    #[test]
    fn test_malformed_cover_art_field() {
        let mut tag = VorbisTag::new();
        tag.data
            .push(COVER_ART_FIELD.to_string(), "not base64!".to_string());
        assert!(tag.embedded_art().is_none());
    }
}
