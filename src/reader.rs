// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The [`TagReader`] facade that maps song records from and to files.

use crate::config::Config;
use crate::song::{FileType, SongMetadata};
use crate::taggedfile::{AudioProperties, TaggedFile};
use crate::util::unix_timestamp;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Reads and writes song metadata of audio files.
#[derive(Debug, Clone, Default)]
pub struct TagReader {
    /// Configuration used for reading and writing.
    config: Config,
}

impl TagReader {
    /// Create a new reader with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        TagReader { config }
    }

    /// The configuration of this reader.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Detect the container format of the file at the given path.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn guess_file_type(&self, path: impl AsRef<Path>) -> FileType {
        FileType::from_path(path)
    }

    /// Read the song record of the file at the given path.
    ///
    /// Files with an unknown format or unreadable tags yield a record with `valid == false` that
    /// only contains the file information.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or its metadata cannot be accessed.
    pub fn read_file(&self, path: impl AsRef<Path>) -> crate::Result<SongMetadata> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        let mtime = metadata.modified().map(unix_timestamp).unwrap_or_default();
        let mut song = SongMetadata {
            basefilename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            filesize: metadata.len(),
            mtime,
            ctime: metadata.created().map_or(mtime, unix_timestamp),
            filetype: self.guess_file_type(path),
            ..SongMetadata::default()
        };

        if song.filetype == FileType::Unknown {
            log::info!("Unknown file type: {}", path.display());
            return Ok(song);
        }

        if song.filetype.has_tag_backend() {
            match TaggedFile::read_from_path(path, &self.config) {
                Ok(tagged_file) => tagged_file.read_song_metadata(&mut song, &self.config),
                Err(err) => {
                    log::info!("Unable to read tags of {}: {err}", path.display());
                    return Ok(song);
                }
            }
        } else {
            log::debug!(
                "Reading {:?} file {} without tags",
                song.filetype,
                path.display()
            );
        }

        match AudioProperties::read_from_path(path) {
            Ok(properties) => properties.apply_to(&mut song),
            Err(err) => log::debug!("Unable to read audio properties of {}: {err}", path.display()),
        }

        song.valid = true;
        song.normalize_unset_fields();
        Ok(song)
    }

    /// Write all editable fields of the song record to the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file format has no tag backend or writing fails.
    pub fn save_file(&self, path: impl AsRef<Path>, song: &SongMetadata) -> crate::Result<()> {
        let mut tagged_file = TaggedFile::read_from_path(path, &self.config)?;
        tagged_file.assign_song_metadata(song);
        tagged_file.save(&self.config)
    }

    /// Write the play count and the score of the song record to the file.
    ///
    /// Files without a tag backend are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be read or written.
    pub fn save_song_statistics_to_file(
        &self,
        path: impl AsRef<Path>,
        song: &SongMetadata,
    ) -> crate::Result<()> {
        let Some(mut tagged_file) = self.read_tagged_file_with_backend(path.as_ref())? else {
            return Ok(());
        };
        tagged_file.assign_statistics(song);
        tagged_file.save(&self.config)
    }

    /// Write the rating of the song record to the file.
    ///
    /// Negative (unset) ratings and files without a tag backend are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be read or written.
    pub fn save_song_rating_to_file(
        &self,
        path: impl AsRef<Path>,
        song: &SongMetadata,
    ) -> crate::Result<()> {
        if song.rating < 0.0 {
            log::debug!("Not saving unset rating to {}", path.as_ref().display());
            return Ok(());
        }

        let Some(mut tagged_file) = self.read_tagged_file_with_backend(path.as_ref())? else {
            return Ok(());
        };
        tagged_file.assign_rating(song);
        tagged_file.save(&self.config)
    }

    /// Returns `true` if the file has a supported format and its tag can be read.
    #[must_use]
    pub fn is_media_file(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if !self.guess_file_type(path).has_tag_backend() {
            return false;
        }

        TaggedFile::read_from_path(path, &self.config)
            .inspect_err(|err| log::debug!("{} is not a media file: {err}", path.display()))
            .is_ok_and(|tagged_file| tagged_file.tag().is_some())
    }

    /// Load the embedded cover art of the file, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be read.
    pub fn load_embedded_art(&self, path: impl AsRef<Path>) -> crate::Result<Option<Vec<u8>>> {
        let tagged_file = TaggedFile::read_from_path(path, &self.config)?;
        Ok(tagged_file
            .tag()
            .and_then(|tag| tag.embedded_art())
            .map(Cow::into_owned))
    }

    /// Read the tagged file if its format has a tag backend.
    fn read_tagged_file_with_backend(&self, path: &Path) -> crate::Result<Option<TaggedFile>> {
        let file_type = self.guess_file_type(path);
        if !file_type.has_tag_backend() {
            log::debug!(
                "Skipping {} ({file_type:?} files have no tag support)",
                path.display()
            );
            return Ok(None);
        }

        TaggedFile::read_from_path(path, &self.config).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteConfig;
    use float_eq::assert_float_eq;
    use std::path::PathBuf;

    fn create_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_missing_file() {
        let reader = TagReader::default();
        assert!(reader.read_file("/nonexistent/song.mp3").is_err());
    }

    #[test]
    fn test_read_unknown_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_file(&dir, "notes.txt", b"not a song");

        let reader = TagReader::default();
        let song = reader.read_file(&path).unwrap();
        assert!(!song.valid);
        assert_eq!(song.filetype, FileType::Unknown);
        assert_eq!(song.basefilename, "notes.txt");
        assert_eq!(song.path, path);
        assert_eq!(song.filesize, 10);
        assert!(song.mtime > 0);
        assert!(song.ctime > 0);
        assert_eq!(song.track, -1);
        assert!(!reader.is_media_file(&path));
    }

    #[cfg(feature = "flac")]
    #[test]
    fn test_read_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_file(&dir, "song.flac", b"this is not a flac stream");

        let reader = TagReader::default();
        let song = reader.read_file(&path).unwrap();
        assert!(!song.valid);
        assert_eq!(song.filetype, FileType::Flac);
        assert_eq!(song.basefilename, "song.flac");
        assert_float_eq!(song.rating, -1.0, abs <= f32::EPSILON);
        assert!(!reader.is_media_file(&path));
    }

    #[test]
    fn test_unsupported_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_file(&dir, "song.wma", b"");

        let reader = TagReader::default();
        assert!(!reader.is_media_file(&path));

        let song = SongMetadata {
            rating: 0.4,
            playcount: 3,
            ..SongMetadata::default()
        };
        reader.save_song_statistics_to_file(&path, &song).unwrap();
        reader.save_song_rating_to_file(&path, &song).unwrap();
        assert!(matches!(
            reader.save_file(&path, &song),
            Err(crate::ErrorType::UnsupportedFileType(FileType::Asf))
        ));
    }

    #[test]
    fn test_unset_rating_is_not_saved() {
        let reader = TagReader::default();
        let song = SongMetadata::default();
        reader
            .save_song_rating_to_file("/nonexistent/song.mp3", &song)
            .unwrap();
    }

    #[cfg(feature = "id3")]
    #[test]
    fn test_mp3_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_file(&dir, "song.mp3", &[0_u8; 128]);

        let reader = TagReader::default();
        assert!(reader.is_media_file(&path));

        let song = reader.read_file(&path).unwrap();
        assert!(song.valid);
        assert_eq!(song.filetype, FileType::Mpeg);
        assert!(song.title.is_empty());
        assert_eq!(song.year, -1);
        assert_eq!(song.playcount, 0);

        let song = SongMetadata {
            title: "So What".to_string(),
            artist: "Miles Davis".to_string(),
            album: "Kind of Blue".to_string(),
            year: 1959,
            track: 1,
            disc: 1,
            bpm: 136.0,
            ..song
        };
        reader.save_file(&path, &song).unwrap();

        let song = reader.read_file(&path).unwrap();
        assert!(song.valid);
        assert_eq!(song.title, "So What");
        assert_eq!(song.artist, "Miles Davis");
        assert_eq!(song.album, "Kind of Blue");
        assert_eq!(song.year, 1959);
        assert_eq!(song.track, 1);
        assert_eq!(song.disc, 1);
        assert_float_eq!(song.bpm, 136.0, abs <= f32::EPSILON);
        assert!(!song.compilation);

        let song = SongMetadata {
            rating: 0.8,
            playcount: 5,
            score: 55,
            ..song
        };
        reader.save_song_rating_to_file(&path, &song).unwrap();
        reader.save_song_statistics_to_file(&path, &song).unwrap();

        let song = reader.read_file(&path).unwrap();
        assert_eq!(song.title, "So What");
        assert_float_eq!(song.rating, 0.8, abs <= f32::EPSILON);
        assert_eq!(song.playcount, 5);
        assert_eq!(song.score, 55);
        assert!(reader.load_embedded_art(&path).unwrap().is_none());
        assert!(song.art_automatic.is_empty());
    }

    #[cfg(feature = "id3")]
    #[test]
    fn test_non_atomic_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_file(&dir, "song.mp3", &[0_u8; 128]);
        let config = Config {
            write: WriteConfig {
                atomic: Some(false),
                touch_after_save: Some(false),
                ..WriteConfig::default()
            },
            ..Config::default()
        }
        .with_defaults();

        let reader = TagReader::new(config);
        let song = SongMetadata {
            genre: "Jazz".to_string(),
            ..SongMetadata::default()
        };
        reader.save_file(&path, &song).unwrap();
        assert_eq!(reader.read_file(&path).unwrap().genre, "Jazz");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
