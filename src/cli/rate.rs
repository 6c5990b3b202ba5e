// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Module for the `rate` CLI subcommand.

use crate::{SongMetadata, TagReader};
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments for the `rate` CLI command.
#[derive(Parser, Debug)]
pub struct Args {
    /// File to rate.
    path: PathBuf,
    /// Rating between 0.0 and 1.0.
    rating: f32,
}

/// Run the `rate` command.
#[expect(clippy::needless_pass_by_value)]
pub fn run(reader: &TagReader, args: Args) -> crate::Result<()> {
    if !(0.0..=1.0).contains(&args.rating) {
        return Err(crate::ErrorType::InvalidValue {
            field: "rating",
            value: args.rating.to_string(),
        });
    }

    let song = SongMetadata {
        rating: args.rating,
        ..SongMetadata::default()
    };
    reader.save_song_rating_to_file(&args.path, &song)?;
    log::info!("Rated {} with {}", args.path.display(), args.rating);

    Ok(())
}
