// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for iTunes-style MP4 metadata.

use crate::tag::{select_value, Tag, TagKey, TagType};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::mp4::{Atom, AtomData, AtomIdent, Ilst, Mp4File};
use lofty::tag::{Accessor, TagExt};
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

/// Namespace of iTunes freeform atoms.
const ITUNES_MEAN: &str = "com.apple.iTunes";

/// Atom that holds the cover art.
const COVER_ART_ATOM: [u8; 4] = *b"covr";

/// MP4 atom for a tag key.
#[derive(Debug, Clone, Copy)]
enum AtomId {
    /// Text atom, multiple values are joined with the separator.
    Text([u8; 4], &'static str),
    /// Freeform text atom in the iTunes namespace (`----:com.apple.iTunes:<name>`).
    Freeform(&'static str),
    /// Track number (`trkn`).
    TrackNumber,
    /// Disc number (`disk`).
    DiscNumber,
    /// Integer tempo (`tmpo`).
    Tempo,
    /// Boolean compilation flag (`cpil`).
    Compilation,
}

impl AtomId {
    /// The atom identifier, if the atom is not accessed through [`Accessor`].
    fn ident(self) -> Option<AtomIdent<'static>> {
        match self {
            Self::Text(fourcc, _) => Some(AtomIdent::Fourcc(fourcc)),
            Self::Freeform(name) => Some(AtomIdent::Freeform {
                mean: Cow::Borrowed(ITUNES_MEAN),
                name: Cow::Borrowed(name),
            }),
            Self::Tempo => Some(AtomIdent::Fourcc(*b"tmpo")),
            Self::Compilation => Some(AtomIdent::Fourcc(*b"cpil")),
            Self::TrackNumber | Self::DiscNumber => None,
        }
    }
}

/// Parse the leading number of values like `3` or `3/12`.
fn parse_leading_number(value: &str) -> Option<u32> {
    value.split('/').next()?.trim().parse().ok()
}

/// MP4 metadata.
#[derive(Debug)]
pub struct Mp4Tag {
    /// The underlying tag data.
    data: Ilst,
}

impl Mp4Tag {
    #[cfg(test)]
    pub fn new() -> Self {
        Mp4Tag {
            data: Ilst::default(),
        }
    }

    /// Read the MP4 metadata from the path. Files without metadata yield an empty tag.
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let mut file = File::open(path)?;
        let options = ParseOptions::new().read_properties(false);
        let data = Mp4File::read_from(&mut file, options)?
            .ilst()
            .cloned()
            .unwrap_or_default();
        Ok(Mp4Tag { data })
    }

    /// Get the atom for a tag key.
    fn tag_key_to_atom(key: TagKey) -> Option<AtomId> {
        match key {
            TagKey::TrackTitle => AtomId::Text(*b"\xa9nam", ", ").into(),
            TagKey::Artist => AtomId::Text(*b"\xa9ART", ", ").into(),
            TagKey::Album => AtomId::Text(*b"\xa9alb", ", ").into(),
            TagKey::AlbumArtist => AtomId::Text(*b"aART", ", ").into(),
            TagKey::Genre => AtomId::Text(*b"\xa9gen", ", ").into(),
            TagKey::Comment => AtomId::Text(*b"\xa9cmt", ", ").into(),
            TagKey::ReleaseDate => AtomId::Text(*b"\xa9day", ", ").into(),
            TagKey::TrackNumber => AtomId::TrackNumber.into(),
            TagKey::DiscNumber => AtomId::DiscNumber.into(),
            TagKey::Bpm => AtomId::Tempo.into(),
            TagKey::Composer => AtomId::Text(*b"\xa9wrt", ", ").into(),
            TagKey::Performer => None,
            TagKey::Grouping => AtomId::Text(*b"\xa9grp", " ").into(),
            TagKey::Lyrics => AtomId::Text(*b"\xa9lyr", " ").into(),
            TagKey::Compilation => AtomId::Compilation.into(),
            TagKey::OriginalReleaseDate => AtomId::Freeform("ORIGINAL YEAR").into(),
            TagKey::Rating => AtomId::Freeform("FMPS_Rating").into(),
            TagKey::PlayCount => AtomId::Freeform("FMPS_Playcount").into(),
            TagKey::Score => AtomId::Freeform("FMPS_Rating_Amarok_Score").into(),
        }
    }

    /// Get the values of an atom as strings.
    fn get_atom_values<'a>(&'a self, ident: &AtomIdent<'_>) -> Vec<Cow<'a, str>> {
        self.data
            .get(ident)
            .into_iter()
            .flat_map(Atom::data)
            .filter_map(|data| match data {
                AtomData::UTF8(text) | AtomData::UTF16(text) => Some(Cow::from(text.as_str())),
                AtomData::SignedInteger(number) => Some(Cow::from(number.to_string())),
                AtomData::UnsignedInteger(number) => Some(Cow::from(number.to_string())),
                AtomData::Bool(flag) => Some(Cow::from(if *flag { "1" } else { "0" })),
                _ => None,
            })
            .collect()
    }

    /// Replace the atom with a new one that holds the given data.
    fn replace_atom(&mut self, ident: AtomIdent<'static>, data: AtomData) {
        self.data.remove(&ident).for_each(drop);
        self.data.insert(Atom::new(ident, data));
    }
}

impl Tag for Mp4Tag {
    fn tag_type(&self) -> TagType {
        TagType::Mp4
    }

    fn get(&self, key: TagKey) -> Option<Cow<'_, str>> {
        let value = match Self::tag_key_to_atom(key)? {
            AtomId::TrackNumber => self.data.track().map(|number| number.to_string().into()),
            AtomId::DiscNumber => self.data.disk().map(|number| number.to_string().into()),
            AtomId::Text(fourcc, separator) => {
                let values = self.get_atom_values(&AtomIdent::Fourcc(fourcc));
                match values.len() {
                    0 => None,
                    1 => values.into_iter().next(),
                    _ => Some(Cow::from(values.join(separator))),
                }
            }
            atom_id => atom_id
                .ident()
                .and_then(|ident| self.get_atom_values(&ident).into_iter().next()),
        };
        select_value(key, value)
    }

    fn set(&mut self, key: TagKey, value: Cow<'_, str>) {
        let Some(atom_id) = Self::tag_key_to_atom(key) else {
            return;
        };
        match atom_id {
            AtomId::TrackNumber => match parse_leading_number(&value) {
                Some(number) => self.data.set_track(number),
                None => log::warn!("Ignoring invalid track number {value:?}"),
            },
            AtomId::DiscNumber => match parse_leading_number(&value) {
                Some(number) => self.data.set_disk(number),
                None => log::warn!("Ignoring invalid disc number {value:?}"),
            },
            AtomId::Tempo => match value.trim().parse::<f64>() {
                #[allow(clippy::cast_possible_truncation)]
                Ok(bpm) => self.replace_atom(
                    AtomIdent::Fourcc(*b"tmpo"),
                    AtomData::SignedInteger(bpm.round() as i32),
                ),
                Err(err) => log::warn!("Ignoring invalid tempo {value:?}: {err}"),
            },
            AtomId::Compilation => {
                let flag = matches!(value.trim(), "1" | "true");
                self.replace_atom(AtomIdent::Fourcc(*b"cpil"), AtomData::Bool(flag));
            }
            atom_id => {
                if let Some(ident) = atom_id.ident() {
                    self.replace_atom(ident, AtomData::UTF8(value.into_owned()));
                }
            }
        }
    }

    fn clear(&mut self, key: TagKey) {
        match Self::tag_key_to_atom(key) {
            Some(AtomId::TrackNumber) => self.data.remove_track(),
            Some(AtomId::DiscNumber) => self.data.remove_disk(),
            Some(atom_id) => {
                if let Some(ident) = atom_id.ident() {
                    self.data.remove(&ident).for_each(drop);
                }
            }
            None => (),
        }
    }

    fn embedded_art(&self) -> Option<Cow<'_, [u8]>> {
        self.data
            .get(&AtomIdent::Fourcc(COVER_ART_ATOM))?
            .data()
            .find_map(|data| match data {
                AtomData::Picture(picture) => Some(Cow::from(picture.data())),
                _ => None,
            })
    }

    fn write_to_path(&mut self, path: &Path) -> crate::Result<()> {
        self.data.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::picture::{MimeType, Picture, PictureType};
    use paste::paste;

    macro_rules! add_test_get_and_set {
        ($tagkey:expr, $value:expr, $fnsuffix:ident) => {
            paste! {
                #[test]
                fn [<test_get_and_set_ $fnsuffix>]() {
                    let mut tag = Mp4Tag::new();
                    assert!(tag.get($tagkey).is_none());

                    tag.set($tagkey, Cow::from($value));
                    assert_eq!(tag.get($tagkey).as_deref(), Some($value));

                    tag.clear($tagkey);
                    assert!(tag.get($tagkey).is_none());
                }
            }
        };
    }

    add_test_get_and_set!(TagKey::TrackTitle, "Example Value", tracktitle);
    add_test_get_and_set!(TagKey::Artist, "Example Value", artist);
    add_test_get_and_set!(TagKey::Album, "Example Value", album);
    add_test_get_and_set!(TagKey::AlbumArtist, "Example Value", albumartist);
    add_test_get_and_set!(TagKey::Genre, "Example Value", genre);
    add_test_get_and_set!(TagKey::Comment, "Example Value", comment);
    add_test_get_and_set!(TagKey::ReleaseDate, "1959-08-17", releasedate);
    add_test_get_and_set!(TagKey::TrackNumber, "7", tracknumber);
    add_test_get_and_set!(TagKey::DiscNumber, "2", discnumber);
    add_test_get_and_set!(TagKey::Bpm, "136", bpm);
    add_test_get_and_set!(TagKey::Composer, "Example Value", composer);
    add_test_get_and_set!(TagKey::Grouping, "Example Value", grouping);
    add_test_get_and_set!(TagKey::Lyrics, "Example Value", lyrics);
    add_test_get_and_set!(TagKey::Compilation, "1", compilation);
    add_test_get_and_set!(TagKey::OriginalReleaseDate, "1959", originalreleasedate);
    add_test_get_and_set!(TagKey::Rating, "0.8", rating);
    add_test_get_and_set!(TagKey::PlayCount, "42", playcount);
    add_test_get_and_set!(TagKey::Score, "0.55", score);

    #[test]
    fn test_performer_is_unsupported() {
        let mut tag = Mp4Tag::new();
        tag.set(TagKey::Performer, Cow::from("Miles Davis"));
        assert!(tag.get(TagKey::Performer).is_none());
    }

    #[test]
    fn test_disc_number_with_total() {
        let mut tag = Mp4Tag::new();
        tag.set(TagKey::DiscNumber, Cow::from("2/3"));
        assert_eq!(tag.get(TagKey::DiscNumber).as_deref(), Some("2"));

        tag.set(TagKey::DiscNumber, Cow::from("n/a"));
        assert_eq!(tag.get(TagKey::DiscNumber).as_deref(), Some("2"));
    }

    #[test]
    fn test_fractional_tempo_is_rounded() {
        let mut tag = Mp4Tag::new();
        tag.set(TagKey::Bpm, Cow::from("127.6"));
        assert_eq!(tag.get(TagKey::Bpm).as_deref(), Some("128"));
    }

    #[test]
    fn test_compilation_flag() {
        let mut tag = Mp4Tag::new();
        tag.set(TagKey::Compilation, Cow::from("0"));
        assert_eq!(tag.get(TagKey::Compilation).as_deref(), Some("0"));
    }

    #[test]
    fn test_cover_art() {
        let mut tag = Mp4Tag::new();
        assert!(!tag.has_embedded_art());

        let picture = Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::Png),
            None,
            b"\x89PNG".to_vec(),
        );
        tag.data.insert(Atom::new(
            AtomIdent::Fourcc(COVER_ART_ATOM),
            AtomData::Picture(picture),
        ));
        assert_eq!(tag.embedded_art().as_deref(), Some(b"\x89PNG".as_slice()));
    }
}
