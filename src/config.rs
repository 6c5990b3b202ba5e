// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Configuration utils.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use xdg::BaseDirectories;

/// Encountered when the configuration cannot be loaded.
#[derive(Error, Debug)]
#[error("Configuration Error: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

/// Default configuration TOML string.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Name of the configuration file inside the XDG config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Represents a piece of configuration that can be merged with another one.
trait MergeableConfig {
    /// Merge this configuration object with another one, taking values not set in this object from
    /// the other one (if present).
    fn merge(&self, other: &Self) -> Self;
}

/// ID3v2 version used when a new ID3 tag has to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Id3v2Version {
    /// ID3v2.3
    #[serde(rename = "2.3")]
    Id3v23,
    /// ID3v2.4
    #[serde(rename = "2.4")]
    Id3v24,
}

#[cfg(feature = "id3")]
impl From<Id3v2Version> for id3::Version {
    fn from(value: Id3v2Version) -> Self {
        match value {
            Id3v2Version::Id3v23 => id3::Version::Id3v23,
            Id3v2Version::Id3v24 => id3::Version::Id3v24,
        }
    }
}

/// Configuration for reading files.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ReadConfig {
    /// Marker stored in the `art_automatic` field if the file contains embedded cover art.
    pub embedded_cover_marker: Option<String>,
}

impl MergeableConfig for ReadConfig {
    fn merge(&self, other: &Self) -> Self {
        ReadConfig {
            embedded_cover_marker: self
                .embedded_cover_marker
                .clone()
                .or_else(|| other.embedded_cover_marker.clone()),
        }
    }
}

/// Configuration for writing files.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct WriteConfig {
    /// Version of newly created ID3v2 tags. Existing tags keep their version.
    pub id3v2_version: Option<Id3v2Version>,
    /// Content descriptor of newly created unsynchronized lyrics frames.
    pub lyrics_description: Option<String>,
    /// Write tags to a temporary copy of the file and replace the original afterwards.
    pub atomic: Option<bool>,
    /// Set the modification time of the file to the current time after saving.
    pub touch_after_save: Option<bool>,
}

impl MergeableConfig for WriteConfig {
    fn merge(&self, other: &Self) -> Self {
        WriteConfig {
            id3v2_version: self.id3v2_version.or(other.id3v2_version),
            lyrics_description: self
                .lyrics_description
                .clone()
                .or_else(|| other.lyrics_description.clone()),
            atomic: self.atomic.or(other.atomic),
            touch_after_save: self.touch_after_save.or(other.touch_after_save),
        }
    }
}

/// The main configuration struct.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Configuration for reading tags.
    #[serde(default)]
    pub read: ReadConfig,
    /// Configuration for writing tags.
    #[serde(default)]
    pub write: WriteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::load_default().expect("Failed to load default config")
    }
}

impl MergeableConfig for Config {
    /// Merge this configuration object with another one, taking values not set in this object from
    /// the other one (if present).
    fn merge(&self, other: &Self) -> Self {
        Config {
            read: self.read.merge(&other.read),
            write: self.write.merge(&other.write),
        }
    }
}

impl Config {
    /// Load the configuration from a string slice.
    fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(text)?;
        Ok(config)
    }

    /// Load the default configuration.
    fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_str(DEFAULT_CONFIG)
    }

    /// Load the configuration from a file located at the given path.
    ///
    /// # Errors
    ///
    /// This method can fail if the file cannot be accessed or if it contains malformed
    /// configuration markup.
    pub fn load_from_path<T: AsRef<Path>>(path: T) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::load_from_str(&text)?;
        Ok(config)
    }

    /// Path of the user configuration file in the XDG config directory, if it exists.
    #[must_use]
    pub fn find_user_config_path() -> Option<PathBuf> {
        BaseDirectories::with_prefix(env!("CARGO_PKG_NAME")).find_config_file(CONFIG_FILE_NAME)
    }

    /// Merge this configuration struct with the default values.
    #[must_use]
    pub fn with_defaults(&self) -> Self {
        let default = Self::default();
        self.merge(&default)
    }

    /// The marker stored in `art_automatic` for files with embedded cover art.
    #[must_use]
    pub fn embedded_cover_marker(&self) -> &str {
        self.read
            .embedded_cover_marker
            .as_deref()
            .unwrap_or("(embedded)")
    }

    /// The ID3v2 version of newly created tags.
    #[must_use]
    pub fn id3v2_version(&self) -> Id3v2Version {
        self.write.id3v2_version.unwrap_or(Id3v2Version::Id3v24)
    }

    /// The content descriptor of newly created lyrics frames.
    #[must_use]
    pub fn lyrics_description(&self) -> &str {
        self.write.lyrics_description.as_deref().unwrap_or_default()
    }

    /// Whether tags are written through a temporary copy of the file.
    #[must_use]
    pub fn atomic_writes(&self) -> bool {
        self.write.atomic.unwrap_or(true)
    }

    /// Whether the modification time is updated after saving.
    #[must_use]
    pub fn touch_after_save(&self) -> bool {
        self.write.touch_after_save.unwrap_or(true)
    }
}
