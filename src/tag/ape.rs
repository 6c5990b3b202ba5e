// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for APEv2 tags (Monkey's Audio, Musepack and WavPack).

use crate::song::FileType;
use crate::tag::{select_value, Tag, TagKey, TagType};
use itertools::Itertools;
use lofty::ape::{ApeFile, ApeItem};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::musepack::MpcFile;
use lofty::tag::{ItemValue, TagExt};
use lofty::wavpack::WavPackFile;
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

/// Item that contains the front cover as `<file name>\0<image data>`.
const COVER_ART_ITEM: &str = "Cover Art (Front)";

/// APE item key and the separator used to join multiple values.
#[derive(Debug, Clone, Copy)]
struct ItemId {
    /// Item key (case-insensitive).
    key: &'static str,
    /// Separator that joins multiple values of the item.
    separator: &'static str,
}

impl ItemId {
    /// Item whose values are joined with a comma.
    const fn listed(key: &'static str) -> Self {
        ItemId {
            key,
            separator: ", ",
        }
    }

    /// Item whose values are joined with a space.
    const fn spaced(key: &'static str) -> Self {
        ItemId {
            key,
            separator: " ",
        }
    }
}

/// APEv2 tag.
#[derive(Debug)]
pub struct ApeTag {
    /// The underlying tag data.
    data: lofty::ape::ApeTag,
}

impl ApeTag {
    #[cfg(test)]
    pub fn new() -> Self {
        ApeTag {
            data: lofty::ape::ApeTag::default(),
        }
    }

    /// Read the APE tag from the path. Files without an APE tag yield an empty tag.
    pub fn read_from_path(path: impl AsRef<Path>, file_type: FileType) -> crate::Result<Self> {
        let mut file = File::open(path)?;
        let options = ParseOptions::new().read_properties(false);
        let data = match file_type {
            FileType::Ape => ApeFile::read_from(&mut file, options)?.ape().cloned(),
            FileType::Mpc => MpcFile::read_from(&mut file, options)?.ape().cloned(),
            FileType::WavPack => WavPackFile::read_from(&mut file, options)?.ape().cloned(),
            file_type => return Err(crate::ErrorType::UnsupportedFileType(file_type)),
        };
        Ok(ApeTag {
            data: data.unwrap_or_default(),
        })
    }

    /// Get the APE item for a tag key.
    fn tag_key_to_item(key: TagKey) -> Option<ItemId> {
        match key {
            TagKey::TrackTitle => ItemId::listed("Title").into(),
            TagKey::Artist => ItemId::listed("Artist").into(),
            TagKey::Album => ItemId::listed("Album").into(),
            TagKey::AlbumArtist => ItemId::listed("Album Artist").into(),
            TagKey::Genre => ItemId::listed("Genre").into(),
            TagKey::Comment => ItemId::listed("Comment").into(),
            TagKey::ReleaseDate => ItemId::listed("Year").into(),
            TagKey::TrackNumber => ItemId::listed("Track").into(),
            TagKey::DiscNumber => ItemId::listed("Disc").into(),
            TagKey::Bpm => ItemId::listed("BPM").into(),
            TagKey::Composer => ItemId::listed("Composer").into(),
            TagKey::Performer => ItemId::listed("Performer").into(),
            TagKey::Grouping => ItemId::spaced("Grouping").into(),
            TagKey::Lyrics => ItemId::listed("Lyrics").into(),
            TagKey::Compilation => ItemId::listed("Compilation").into(),
            TagKey::OriginalReleaseDate => None,
            TagKey::Rating => ItemId::listed("FMPS_Rating").into(),
            TagKey::PlayCount => ItemId::listed("FMPS_PlayCount").into(),
            TagKey::Score => ItemId::listed("FMPS_Rating_Amarok_Score").into(),
        }
    }

    /// Get the text of an item with multiple (NUL-separated) values joined by the separator.
    fn get_item_text(&self, item_id: ItemId) -> Option<Cow<'_, str>> {
        let text = match self.data.get(item_id.key)?.value() {
            ItemValue::Text(text) => text.as_str(),
            _ => return None,
        };
        if text.contains('\0') {
            Some(Cow::from(
                text.split('\0')
                    .filter(|value| !value.is_empty())
                    .join(item_id.separator),
            ))
        } else {
            Some(Cow::from(text))
        }
    }
}

impl Tag for ApeTag {
    fn tag_type(&self) -> TagType {
        TagType::Ape
    }

    fn get(&self, key: TagKey) -> Option<Cow<'_, str>> {
        select_value(
            key,
            Self::tag_key_to_item(key).and_then(|item_id| self.get_item_text(item_id)),
        )
    }

    fn set(&mut self, key: TagKey, value: Cow<'_, str>) {
        let Some(item_id) = Self::tag_key_to_item(key) else {
            return;
        };
        match ApeItem::new(item_id.key.to_string(), ItemValue::Text(value.into_owned())) {
            Ok(item) => self.data.insert(item),
            Err(err) => log::warn!("Failed to create APE item {:?}: {err}", item_id.key),
        }
    }

    fn clear(&mut self, key: TagKey) {
        if let Some(item_id) = Self::tag_key_to_item(key) {
            self.data.remove(item_id.key);
        }
    }

    fn embedded_art(&self) -> Option<Cow<'_, [u8]>> {
        let data = match self.data.get(COVER_ART_ITEM)?.value() {
            ItemValue::Binary(data) => data.as_slice(),
            _ => return None,
        };
        // The image data follows the file name and its NUL terminator.
        let start = data.iter().position(|&byte| byte == 0).map_or(0, |pos| pos + 1);
        data.get(start..)
            .filter(|image| !image.is_empty())
            .map(Cow::from)
    }

    fn write_to_path(&mut self, path: &Path) -> crate::Result<()> {
        self.data.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}
