// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for ID3 tags.

use crate::config::Config;
use crate::fmps;
use crate::tag::{select_value, Tag, TagKey, TagType};
use id3::{
    frame::{Comment, Content, ExtendedText, Lyrics, Popularimeter},
    Frame, TagLike,
};
use std::borrow::Cow;
use std::path::Path;

/// Description of the `COMM` frame that iTunes uses for its volume normalization data.
const ITUNES_NORMALIZATION: &str = "iTunNORM";

/// Language of newly created `COMM` and `USLT` frames.
const DEFAULT_LANGUAGE: &str = "eng";

/// ID3 frame ID.
#[derive(Debug, Clone, Copy)]
enum FrameId<'a> {
    /// Text frame.
    Text(&'a str),
    /// Extended Text frame (`TXXX`).
    ExtendedText(&'a str),
    /// FMPS statistic (`TXXX`). The per-user frame (`<description>_User`, `user::value`) is only
    /// used if the frame with the machine value is missing.
    FmpsValue(&'a str),
    /// First comment frame (`COMM`) that is not used for iTunes normalization data.
    Comment,
    /// Unsynchronized lyrics frame (`USLT`).
    Lyrics,
    /// Synchronized lyrics frame (`SYLT`).
    SynchronisedLyrics,
    /// Rating of the first popularimeter frame (`POPM`).
    PopularimeterRating,
    /// Play counter of the first popularimeter frame (`POPM`).
    PopularimeterCounter,
}

/// Convert the rating byte of a `POPM` frame into a rating between 0.0 and 1.0.
#[must_use]
pub fn popm_to_rating(popm: u8) -> f32 {
    match popm {
        0x00 => 0.0,
        0x01..=0x3F => 0.2,
        0x40..=0x7F => 0.4,
        0x80..=0xBF => 0.6,
        0xC0..=0xFB => 0.8,
        0xFC..=0xFF => 1.0,
    }
}

/// Convert a rating between 0.0 and 1.0 into the rating byte of a `POPM` frame.
#[must_use]
pub fn rating_to_popm(rating: f32) -> u8 {
    if rating < 0.2 {
        0x00
    } else if rating < 0.4 {
        0x01
    } else if rating < 0.6 {
        0x40
    } else if rating < 0.8 {
        0x80
    } else if rating < 1.0 {
        0xC0
    } else {
        0xFF
    }
}

/// Description of the extended text frame that holds per-user values of an FMPS statistic.
fn fmps_user_description(description: &str) -> String {
    format!("{description}_User")
}

/// ID3 tag (version 2).
#[derive(Debug)]
pub struct ID3v2Tag {
    /// The underlying tag data.
    data: id3::Tag,
    /// Content descriptor of newly created lyrics frames.
    lyrics_description: String,
}

impl ID3v2Tag {
    /// Create an empty tag with the given version.
    #[cfg(test)]
    pub fn with_version(version: id3::Version) -> Self {
        ID3v2Tag {
            data: id3::Tag::with_version(version),
            lyrics_description: String::new(),
        }
    }

    /// Read the ID3 tag from the path.
    ///
    /// If the file does not contain an ID3 tag yet, an empty tag with the given version is
    /// created.
    pub fn read_from_path(
        path: impl AsRef<Path>,
        config: &Config,
    ) -> crate::Result<Self> {
        let data = match id3::Tag::read_from_path(&path) {
            Ok(data) => data,
            Err(err) if matches!(err.kind, id3::ErrorKind::NoTag) => {
                log::debug!(
                    "No ID3 tag found in {}, creating a new one",
                    path.as_ref().display()
                );
                id3::Tag::with_version(config.id3v2_version().into())
            }
            Err(err) => return Err(err.into()),
        };
        Ok(ID3v2Tag {
            data,
            lyrics_description: config.lyrics_description().to_string(),
        })
    }

    /// Get the ID3 frames for a tag key, ordered by precedence.
    ///
    /// Values are written to the first frame.
    fn tag_key_to_frames(&self, key: TagKey) -> &'static [FrameId<'static>] {
        let is_id3v24 = self.data.version() == id3::Version::Id3v24;
        match key {
            TagKey::TrackTitle => &[FrameId::Text("TIT2")],
            TagKey::Artist => &[FrameId::Text("TPE1")],
            TagKey::Album => &[FrameId::Text("TALB")],
            TagKey::AlbumArtist => &[FrameId::Text("TPE2")],
            TagKey::Genre => &[FrameId::Text("TCON")],
            TagKey::Comment => &[FrameId::Comment],
            TagKey::ReleaseDate if is_id3v24 => &[FrameId::Text("TDRC"), FrameId::Text("TYER")],
            TagKey::ReleaseDate => &[FrameId::Text("TYER"), FrameId::Text("TDRC")],
            TagKey::TrackNumber => &[FrameId::Text("TRCK")],
            TagKey::DiscNumber => &[FrameId::Text("TPOS")],
            TagKey::Bpm => &[FrameId::Text("TBPM")],
            TagKey::Composer => &[FrameId::Text("TCOM")],
            TagKey::Performer => &[FrameId::Text("TOPE")],
            TagKey::Grouping => &[FrameId::Text("TIT1")],
            TagKey::Lyrics => &[FrameId::Lyrics, FrameId::SynchronisedLyrics],
            TagKey::Compilation => &[FrameId::Text("TCMP")],
            TagKey::OriginalReleaseDate if is_id3v24 => {
                &[FrameId::Text("TDOR"), FrameId::Text("TORY")]
            }
            TagKey::OriginalReleaseDate => &[FrameId::Text("TORY"), FrameId::Text("TDOR")],
            TagKey::Rating => &[
                FrameId::FmpsValue("FMPS_Rating"),
                FrameId::PopularimeterRating,
            ],
            TagKey::PlayCount => &[
                FrameId::FmpsValue("FMPS_PlayCount"),
                FrameId::PopularimeterCounter,
            ],
            TagKey::Score => &[FrameId::ExtendedText("FMPS_Rating_Amarok_Score")],
        }
    }

    /// Get the content of a text frame as string.
    fn get_frames<'a>(&'a self, frame_id: &'a str) -> impl Iterator<Item = &'a str> {
        self.data
            .get(frame_id)
            .and_then(|frame| frame.content().text_values())
            .into_iter()
            .flatten()
    }

    /// Get the content of an extended text frame as string.
    fn get_extended_texts<'a>(&'a self, description: &'a str) -> impl Iterator<Item = &'a str> {
        self.data
            .extended_texts()
            .filter(move |extended_text| extended_text.description == description)
            .map(|extended_text| extended_text.value.as_str())
    }

    /// Get the first popularimeter frame.
    fn get_popularimeter(&self) -> Option<&Popularimeter> {
        self.data
            .frames()
            .find_map(|frame| match frame.content() {
                Content::Popularimeter(popularimeter) => Some(popularimeter),
                _ => None,
            })
    }

    /// Modify the first popularimeter frame (or a new one if there is none yet).
    fn update_popularimeter(&mut self, update: impl FnOnce(&mut Popularimeter)) {
        let mut popularimeter = self.get_popularimeter().cloned().unwrap_or(Popularimeter {
            user: String::new(),
            rating: 0,
            counter: 0,
        });
        update(&mut popularimeter);
        #[expect(unused_results)]
        self.data
            .add_frame(Frame::with_content("POPM", Content::Popularimeter(popularimeter)));
    }

    /// Get the value of a single frame.
    fn get_frame_value<'a>(&'a self, frame_id: FrameId<'a>) -> Option<Cow<'a, str>> {
        match frame_id {
            FrameId::Text(id) => self.get_frames(id).next().map(Cow::from),
            FrameId::ExtendedText(description) => {
                self.get_extended_texts(description).next().map(Cow::from)
            }
            FrameId::FmpsValue(description) => {
                if let Some(value) = self
                    .get_extended_texts(description)
                    .find(|value| !value.trim().is_empty())
                {
                    return Some(Cow::from(value));
                }

                let user_description = fmps_user_description(description);
                let number = self
                    .get_extended_texts(&user_description)
                    .find_map(|value| fmps::number_at(value, 0, 1));
                number.map(|number| Cow::from(number.to_string()))
            }
            FrameId::Comment => self
                .data
                .comments()
                .filter(|comment| comment.description != ITUNES_NORMALIZATION)
                .map(|comment| comment.text.as_str())
                .find(|text| !text.is_empty())
                .map(Cow::from),
            FrameId::Lyrics => self
                .data
                .lyrics()
                .map(|lyrics| lyrics.text.as_str())
                .find(|text| !text.is_empty())
                .map(Cow::from),
            FrameId::SynchronisedLyrics => self.data.synchronised_lyrics().next().map(|lyrics| {
                lyrics
                    .content
                    .iter()
                    .map(|(_, line)| line.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
                    .into()
            }),
            FrameId::PopularimeterRating => self
                .get_popularimeter()
                .map(|popularimeter| popm_to_rating(popularimeter.rating).to_string().into()),
            FrameId::PopularimeterCounter => self
                .get_popularimeter()
                .map(|popularimeter| popularimeter.counter.to_string().into()),
        }
    }

    /// Remove the value of a single frame.
    fn clear_frame(&mut self, frame_id: FrameId<'_>) {
        match frame_id {
            #[expect(unused_results)]
            FrameId::Text(id) => {
                self.data.remove(id);
            }
            FrameId::ExtendedText(description) => {
                self.data.remove_extended_text(Some(description), None);
            }
            FrameId::FmpsValue(description) => {
                self.data.remove_extended_text(Some(description), None);
                self.data
                    .remove_extended_text(Some(&fmps_user_description(description)), None);
            }
            FrameId::Comment => {
                let descriptions: Vec<String> = self
                    .data
                    .comments()
                    .filter(|comment| comment.description != ITUNES_NORMALIZATION)
                    .map(|comment| comment.description.clone())
                    .collect();
                for description in descriptions {
                    self.data.remove_comment(Some(&description), None);
                }
            }
            #[expect(unused_results)]
            FrameId::Lyrics => {
                self.data.remove("USLT");
            }
            #[expect(unused_results)]
            FrameId::SynchronisedLyrics => {
                self.data.remove("SYLT");
            }
            FrameId::PopularimeterRating => {
                if self.get_popularimeter().is_some() {
                    self.update_popularimeter(|popularimeter| popularimeter.rating = 0);
                }
            }
            FrameId::PopularimeterCounter => {
                if self.get_popularimeter().is_some() {
                    self.update_popularimeter(|popularimeter| popularimeter.counter = 0);
                }
            }
        }
    }

    /// Set the value of a single frame.
    fn set_frame(&mut self, frame_id: FrameId<'_>, value: Cow<'_, str>) {
        match frame_id {
            FrameId::Text(id) => self.data.set_text(id, value),
            #[expect(unused_results)]
            FrameId::ExtendedText(description) | FrameId::FmpsValue(description) => {
                self.data.add_frame(ExtendedText {
                    description: description.to_string(),
                    value: value.into_owned(),
                });
            }
            FrameId::Comment => {
                // Replace the first comment and keep its language and description.
                let (lang, description) = self
                    .data
                    .comments()
                    .find(|comment| comment.description != ITUNES_NORMALIZATION)
                    .map_or_else(
                        || (DEFAULT_LANGUAGE.to_string(), String::new()),
                        |comment| (comment.lang.clone(), comment.description.clone()),
                    );
                self.data.remove_comment(Some(&description), None);
                #[expect(unused_results)]
                self.data.add_frame(Comment {
                    lang,
                    description,
                    text: value.into_owned(),
                });
            }
            FrameId::Lyrics => {
                let (lang, description) = self.data.lyrics().next().map_or_else(
                    || (DEFAULT_LANGUAGE.to_string(), self.lyrics_description.clone()),
                    |lyrics| (lyrics.lang.clone(), lyrics.description.clone()),
                );
                #[expect(unused_results)]
                self.data.add_frame(Lyrics {
                    lang,
                    description,
                    text: value.into_owned(),
                });
            }
            FrameId::SynchronisedLyrics => {
                log::debug!("Writing synchronized lyrics is not supported");
            }
            FrameId::PopularimeterRating => match value.trim().parse::<f32>() {
                Ok(rating) => self.update_popularimeter(|popularimeter| {
                    popularimeter.rating = rating_to_popm(rating);
                }),
                Err(err) => log::warn!("Ignoring invalid rating {value:?}: {err}"),
            },
            FrameId::PopularimeterCounter => match value.trim().parse::<f64>() {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                Ok(counter) => self.update_popularimeter(|popularimeter| {
                    popularimeter.counter = counter.max(0.0) as u64;
                }),
                Err(err) => log::warn!("Ignoring invalid play count {value:?}: {err}"),
            },
        }
    }
}

impl Tag for ID3v2Tag {
    fn tag_type(&self) -> TagType {
        match self.data.version() {
            id3::Version::Id3v22 => TagType::ID3v22,
            id3::Version::Id3v23 => TagType::ID3v23,
            id3::Version::Id3v24 => TagType::ID3v24,
        }
    }

    fn get(&self, key: TagKey) -> Option<Cow<'_, str>> {
        select_value(
            key,
            self.tag_key_to_frames(key)
                .iter()
                .filter_map(|frame_id| self.get_frame_value(*frame_id)),
        )
    }

    fn clear(&mut self, key: TagKey) {
        for frame_id in self.tag_key_to_frames(key) {
            self.clear_frame(*frame_id);
        }
    }

    fn set(&mut self, key: TagKey, value: Cow<'_, str>) {
        let frames = self.tag_key_to_frames(key);
        // Statistics are mirrored into the POPM frame.
        if let Some(frame_id) = frames.iter().copied().find(|frame_id| {
            matches!(
                frame_id,
                FrameId::PopularimeterRating | FrameId::PopularimeterCounter
            )
        }) {
            self.set_frame(frame_id, Cow::from(value.as_ref()));
        }
        if let Some(frame_id) = frames.first() {
            self.set_frame(*frame_id, value);
        }
    }

    fn embedded_art(&self) -> Option<Cow<'_, [u8]>> {
        self.data
            .pictures()
            .next()
            .map(|picture| Cow::from(picture.data.as_slice()))
    }

    fn write_to_path(&mut self, path: &Path) -> crate::Result<()> {
        let version = match self.data.version() {
            id3::Version::Id3v22 => id3::Version::Id3v23,
            version => version,
        };
        self.data.write_to_path(path, version)?;
        Ok(())
    }
}
