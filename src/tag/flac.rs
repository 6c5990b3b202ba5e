// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for FLAC tags.

#![cfg(feature = "flac")]

use crate::tag::vorbis::tag_key_to_fields;
use crate::tag::{select_value, Tag, TagKey, TagType};
use metaflac::block::PictureType;
use std::borrow::Cow;
use std::path::Path;

/// FLAC tag.
pub struct FlacTag {
    /// The underlying tag data.
    data: metaflac::Tag,
}

impl FlacTag {
    #[cfg(test)]
    pub fn new() -> Self {
        FlacTag {
            data: metaflac::Tag::new(),
        }
    }

    /// Read the FLAC tag from the path
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let data = metaflac::Tag::read_from_path(path)?;
        Ok(FlacTag { data })
    }

    /// Get the values of a field. Field names are compared case-insensitively.
    fn get_field_values<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> {
        self.data
            .vorbis_comments()
            .into_iter()
            .flat_map(|comments| comments.comments.iter())
            .filter(move |(name, _)| name.eq_ignore_ascii_case(field))
            .flat_map(|(_, values)| values.iter().map(String::as_str))
    }

    /// Remove a field (in any capitalization).
    fn remove_field(&mut self, field: &str) {
        let names: Vec<String> = self
            .data
            .vorbis_comments()
            .into_iter()
            .flat_map(|comments| comments.comments.keys())
            .filter(|name| name.eq_ignore_ascii_case(field))
            .cloned()
            .collect();
        if names.is_empty() {
            return;
        }

        let comments = &mut self.data.vorbis_comments_mut().comments;
        for name in names {
            #[expect(unused_results)]
            comments.remove(&name);
        }
    }
}

impl Tag for FlacTag {
    fn tag_type(&self) -> TagType {
        TagType::Flac
    }

    fn get(&self, key: TagKey) -> Option<Cow<'_, str>> {
        select_value(
            key,
            tag_key_to_fields(key)
                .iter()
                .flat_map(|field| self.get_field_values(field))
                .map(Cow::from),
        )
    }

    fn set(&mut self, key: TagKey, value: Cow<'_, str>) {
        if let Some((field, aliases)) = tag_key_to_fields(key).split_first() {
            for name in aliases.iter().chain(std::iter::once(field)) {
                self.remove_field(name);
            }
            self.data.set_vorbis(*field, vec![value.into_owned()]);
        }
    }

    fn clear(&mut self, key: TagKey) {
        for field in tag_key_to_fields(key) {
            self.remove_field(field);
        }
    }

    fn embedded_art(&self) -> Option<Cow<'_, [u8]>> {
        self.data
            .pictures()
            .find(|picture| picture.picture_type == PictureType::CoverFront)
            .or_else(|| self.data.pictures().next())
            .map(|picture| Cow::from(picture.data.as_slice()))
    }

    fn write_to_path(&mut self, path: &Path) -> crate::Result<()> {
        self.data.write_to_path(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaflac::block::Picture;
    use paste::paste;

    macro_rules! add_test_get_and_set {
        ($tagkey:expr, $fnsuffix:ident) => {
            paste! {
                #[test]
                fn [<test_get_and_set_ $fnsuffix>]() {
                    let mut tag = FlacTag::new();
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
    add_test_get_and_set!(TagKey::Score, score);

    #[test]
    fn test_field_names_are_case_insensitive() {
        let mut tag = FlacTag::new();
        #[expect(unused_results)]
        tag.data
            .vorbis_comments_mut()
            .comments
            .insert("albumartist".to_string(), vec!["Miles Davis".to_string()]);
        assert_eq!(tag.get(TagKey::AlbumArtist).as_deref(), Some("Miles Davis"));

        tag.set(TagKey::AlbumArtist, Cow::from("John Coltrane"));
        assert_eq!(
            tag.get_field_values("ALBUMARTIST").collect::<Vec<_>>(),
            vec!["John Coltrane"]
        );

        #[expect(unused_results)]
        tag.data
            .vorbis_comments_mut()
            .comments
            .insert("albumartist".to_string(), vec!["Bill Evans".to_string()]);
        tag.clear(TagKey::AlbumArtist);
        assert!(tag.get(TagKey::AlbumArtist).is_none());
    }

    #[test]
    fn test_set_removes_alias() {
        let mut tag = FlacTag::new();
        tag.data
            .set_vorbis("ALBUM ARTIST", vec!["Miles Davis".to_string()]);
        assert_eq!(tag.get(TagKey::AlbumArtist).as_deref(), Some("Miles Davis"));

        tag.set(TagKey::AlbumArtist, Cow::from("Bill Evans"));
        assert_eq!(tag.get_field_values("ALBUM ARTIST").count(), 0);
        assert_eq!(tag.get(TagKey::AlbumArtist).as_deref(), Some("Bill Evans"));
    }

    #[test]
    fn test_embedded_art_prefers_front_cover() {
        let mut tag = FlacTag::new();
        assert!(!tag.has_embedded_art());

        let mut back = Picture::new();
        back.picture_type = PictureType::CoverBack;
        back.data = b"back".to_vec();
        tag.data.push_block(metaflac::Block::Picture(back));
        assert_eq!(tag.embedded_art().as_deref(), Some(b"back".as_slice()));

        let mut front = Picture::new();
        front.picture_type = PictureType::CoverFront;
        front.data = b"front".to_vec();
        tag.data.push_block(metaflac::Block::Picture(front));
        assert_eq!(tag.embedded_art().as_deref(), Some(b"front".as_slice()));
    }
}
