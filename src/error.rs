// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Error and result types.

use crate::song::FileType;
use std::io;
use thiserror::Error;

/// Main error type.
#[derive(Error, Debug)]
pub enum ErrorType {
    /// Configuration error.
    #[error("Configuration Error ({0})")]
    Config(#[from] crate::config::ConfigError),
    /// I/O Error.
    #[error("Input/Output error ({:?})", .0)]
    Io(#[from] io::Error),
    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration ({0})")]
    ConfigSerialization(#[from] toml::ser::Error),
    /// File has an unknown file type.
    #[error("File has unknown file type")]
    UnknownFileType,
    /// The file type is known, but there is no tag backend for it.
    #[error("Tags of {0:?} files are not supported")]
    UnsupportedFileType(FileType),
    /// A value could not be converted into the representation required by the tag.
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue {
        /// Name of the affected field.
        field: &'static str,
        /// The offending value.
        value: String,
    },
    /// Errors raised by the [`id3`] crate.
    #[cfg(feature = "id3")]
    #[error("Failed to access ID3 tag")]
    Id3(#[from] id3::Error),
    /// Errors raised by the [`metaflac`] crate.
    #[cfg(feature = "flac")]
    #[error("Failed to access FLAC tag")]
    Flac(#[from] metaflac::Error),
    /// Errors raised by the [`lofty`] crate.
    #[error("Failed to access tag ({0})")]
    Lofty(#[from] lofty::error::LoftyError),
    /// Serialization of a song record failed.
    #[error("Serialization failed ({0})")]
    Json(#[from] serde_json::Error),
}

/// Convenience type.
pub type Result<T> = std::result::Result<T, ErrorType>;
