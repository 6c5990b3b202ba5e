// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The format-independent song record and the container type detection.

use lofty::probe::Probe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Container format of an audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileType {
    /// Advanced Systems Format (WMA).
    Asf,
    /// Native FLAC.
    Flac,
    /// MPEG-4 audio (M4A, M4B, ...).
    Mp4,
    /// Musepack.
    Mpc,
    /// MPEG audio (MP3).
    Mpeg,
    /// FLAC in an Ogg container.
    OggFlac,
    /// Speex in an Ogg container.
    OggSpeex,
    /// Vorbis in an Ogg container.
    OggVorbis,
    /// Opus in an Ogg container.
    OggOpus,
    /// Audio Interchange File Format.
    Aiff,
    /// Waveform Audio File Format.
    Wav,
    /// True Audio.
    TrueAudio,
    /// WavPack.
    WavPack,
    /// Monkey's Audio.
    Ape,
    /// Anything else.
    #[default]
    Unknown,
}

impl FileType {
    /// Detect the file type from a file extension (case-insensitive, without the leading dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => Self::Mpeg,
            "flac" => Self::Flac,
            "ogg" | "oga" => Self::OggVorbis,
            "opus" => Self::OggOpus,
            "spx" => Self::OggSpeex,
            "m4a" | "m4b" | "m4p" | "mp4" => Self::Mp4,
            "ape" => Self::Ape,
            "mpc" | "mp+" | "mpp" => Self::Mpc,
            "wv" => Self::WavPack,
            "wma" | "asf" => Self::Asf,
            "aif" | "aiff" | "aifc" => Self::Aiff,
            "wav" => Self::Wav,
            "tta" => Self::TrueAudio,
            _ => Self::Unknown,
        }
    }

    /// Detect the file type of the file at the given path.
    ///
    /// The extension is used first. Files with an unknown extension and `.oga` files (which may
    /// contain any Ogg codec) are sniffed by looking at their content.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref().map(Self::from_extension) {
            Some(file_type) if file_type != Self::Unknown && extension.as_deref() != Some("oga") => {
                file_type
            }
            _ => {
                let guessed = Self::guess_from_content(path);
                if guessed == Self::Unknown && extension.as_deref() == Some("oga") {
                    Self::OggFlac
                } else {
                    guessed
                }
            }
        }
    }

    /// Detect the file type by looking at the file content.
    fn guess_from_content(path: &Path) -> Self {
        let file_type = Probe::open(path)
            .map_err(crate::ErrorType::from)
            .and_then(|probe| probe.guess_file_type().map_err(crate::ErrorType::from))
            .map(|probe| probe.file_type());
        match file_type {
            Ok(Some(file_type)) => Self::from(file_type),
            Ok(None) => {
                log::debug!("Unable to detect file type of {}", path.display());
                Self::Unknown
            }
            Err(err) => {
                log::debug!("Unable to probe {}: {err}", path.display());
                Self::Unknown
            }
        }
    }

    /// Returns `true` if tags of this file type can be read and written.
    #[must_use]
    pub fn has_tag_backend(self) -> bool {
        !matches!(
            self,
            Self::Asf | Self::OggFlac | Self::TrueAudio | Self::Unknown
        )
    }
}

impl From<lofty::file::FileType> for FileType {
    fn from(value: lofty::file::FileType) -> Self {
        use lofty::file::FileType as LoftyFileType;

        match value {
            LoftyFileType::Aiff => Self::Aiff,
            LoftyFileType::Ape => Self::Ape,
            LoftyFileType::Flac => Self::Flac,
            LoftyFileType::Mpeg => Self::Mpeg,
            LoftyFileType::Mp4 => Self::Mp4,
            LoftyFileType::Mpc => Self::Mpc,
            LoftyFileType::Opus => Self::OggOpus,
            LoftyFileType::Vorbis => Self::OggVorbis,
            LoftyFileType::Speex => Self::OggSpeex,
            LoftyFileType::Wav => Self::Wav,
            LoftyFileType::WavPack => Self::WavPack,
            _ => Self::Unknown,
        }
    }
}

/// A flat, format-independent metadata record of a song.
///
/// Numeric fields use `-1` for "unknown". `playcount` and `score` use `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongMetadata {
    /// The record was filled from a file with a recognized format.
    pub valid: bool,
    /// Track title.
    pub title: String,
    /// Track artist.
    pub artist: String,
    /// Release title.
    pub album: String,
    /// Release artist.
    pub albumartist: String,
    /// Composer(s).
    pub composer: String,
    /// Performer(s).
    pub performer: String,
    /// Content group.
    pub grouping: String,
    /// Unsynchronized lyrics.
    pub lyrics: String,
    /// Comment.
    pub comment: String,
    /// Genre.
    pub genre: String,
    /// Release year.
    pub year: i32,
    /// Year of the original release.
    pub originalyear: i32,
    /// Track number.
    pub track: i32,
    /// Disc number.
    pub disc: i32,
    /// Beats per minute.
    pub bpm: f32,
    /// Part of a compilation.
    pub compilation: bool,
    /// Rating between 0.0 and 1.0.
    pub rating: f32,
    /// Number of times the song was played.
    pub playcount: i32,
    /// Score between 0 and 100.
    pub score: i32,
    /// Unix timestamp of the last playback.
    pub lastplayed: i64,
    /// Location of the automatically found cover art.
    pub art_automatic: String,
    /// Name of the file without its directory.
    pub basefilename: String,
    /// Path of the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub filesize: u64,
    /// Modification time (unix timestamp).
    pub mtime: i64,
    /// Creation time (unix timestamp).
    pub ctime: i64,
    /// Bitrate in kbit/s.
    pub bitrate: i32,
    /// Sample rate in Hz.
    pub samplerate: i32,
    /// Length in nanoseconds.
    pub length_nanosec: i64,
    /// Container format.
    pub filetype: FileType,
}

impl Default for SongMetadata {
    fn default() -> Self {
        SongMetadata {
            valid: false,
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            albumartist: String::new(),
            composer: String::new(),
            performer: String::new(),
            grouping: String::new(),
            lyrics: String::new(),
            comment: String::new(),
            genre: String::new(),
            year: -1,
            originalyear: -1,
            track: -1,
            disc: -1,
            bpm: -1.0,
            compilation: false,
            rating: -1.0,
            playcount: 0,
            score: 0,
            lastplayed: -1,
            art_automatic: String::new(),
            basefilename: String::new(),
            path: PathBuf::new(),
            filesize: 0,
            mtime: 0,
            ctime: 0,
            bitrate: -1,
            samplerate: -1,
            length_nanosec: -1,
            filetype: FileType::Unknown,
        }
    }
}

impl SongMetadata {
    /// Reset numeric fields that carry no information (i.e., are zero or negative) to `-1`.
    pub fn normalize_unset_fields(&mut self) {
        fn unset_if_not_positive(value: &mut i32) {
            if *value <= 0 {
                *value = -1;
            }
        }

        unset_if_not_positive(&mut self.track);
        unset_if_not_positive(&mut self.disc);
        unset_if_not_positive(&mut self.year);
        unset_if_not_positive(&mut self.bitrate);
        unset_if_not_positive(&mut self.samplerate);
        if self.bpm <= 0.0 {
            self.bpm = -1.0;
        }
        if self.lastplayed <= 0 {
            self.lastplayed = -1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn test_default_song_is_unset() {
        let song = SongMetadata::default();
        assert!(!song.valid);
        assert_eq!(song.track, -1);
        assert_eq!(song.disc, -1);
        assert_eq!(song.year, -1);
        assert_eq!(song.originalyear, -1);
        assert_float_eq!(song.rating, -1.0, abs <= f32::EPSILON);
        assert_eq!(song.playcount, 0);
        assert_eq!(song.score, 0);
        assert_eq!(song.filetype, FileType::Unknown);
    }

    #[test]
    fn test_normalize_unset_fields() {
        let mut song = SongMetadata {
            track: 0,
            disc: 2,
            year: 0,
            bpm: 0.0,
            bitrate: 320,
            samplerate: 0,
            lastplayed: 0,
            ..SongMetadata::default()
        };
        song.normalize_unset_fields();
        assert_eq!(song.track, -1);
        assert_eq!(song.disc, 2);
        assert_eq!(song.year, -1);
        assert_float_eq!(song.bpm, -1.0, abs <= f32::EPSILON);
        assert_eq!(song.bitrate, 320);
        assert_eq!(song.samplerate, -1);
        assert_eq!(song.lastplayed, -1);
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("mp3"), FileType::Mpeg);
        assert_eq!(FileType::from_extension("MP3"), FileType::Mpeg);
        assert_eq!(FileType::from_extension("flac"), FileType::Flac);
        assert_eq!(FileType::from_extension("ogg"), FileType::OggVorbis);
        assert_eq!(FileType::from_extension("opus"), FileType::OggOpus);
        assert_eq!(FileType::from_extension("spx"), FileType::OggSpeex);
        assert_eq!(FileType::from_extension("m4a"), FileType::Mp4);
        assert_eq!(FileType::from_extension("ape"), FileType::Ape);
        assert_eq!(FileType::from_extension("mpc"), FileType::Mpc);
        assert_eq!(FileType::from_extension("wv"), FileType::WavPack);
        assert_eq!(FileType::from_extension("wma"), FileType::Asf);
        assert_eq!(FileType::from_extension("aiff"), FileType::Aiff);
        assert_eq!(FileType::from_extension("wav"), FileType::Wav);
        assert_eq!(FileType::from_extension("tta"), FileType::TrueAudio);
        assert_eq!(FileType::from_extension("txt"), FileType::Unknown);
    }

    #[test]
    fn test_file_type_from_path_without_content() {
        assert_eq!(FileType::from_path("/nonexistent/song.mp3"), FileType::Mpeg);
        assert_eq!(FileType::from_path("/nonexistent/song"), FileType::Unknown);
    }

    #[test]
    fn test_file_type_sniffs_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.dat");
        std::fs::write(&path, b"this is not an audio file").unwrap();
        assert_eq!(FileType::from_path(&path), FileType::Unknown);
    }

    #[test]
    fn test_tag_backend() {
        assert!(FileType::Mpeg.has_tag_backend());
        assert!(FileType::WavPack.has_tag_backend());
        assert!(!FileType::Asf.has_tag_backend());
        assert!(!FileType::TrueAudio.has_tag_backend());
        assert!(!FileType::Unknown.has_tag_backend());
    }
}
