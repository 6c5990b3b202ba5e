// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Module for the `stats` CLI subcommand.

use crate::{SongMetadata, TagReader};
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments for the `stats` CLI command.
#[derive(Parser, Debug)]
pub struct Args {
    /// File to update.
    path: PathBuf,
    /// Number of times the song was played.
    #[arg(long)]
    playcount: Option<i32>,
    /// Score between 0 and 100.
    #[arg(long)]
    score: Option<i32>,
}

/// Run the `stats` command.
#[expect(clippy::needless_pass_by_value)]
pub fn run(reader: &TagReader, args: Args) -> crate::Result<()> {
    if args.playcount.is_none() && args.score.is_none() {
        log::warn!("Neither play count nor score given, nothing to do");
        return Ok(());
    }

    if let Some(score) = args.score.filter(|score| !(0..=100).contains(score)) {
        return Err(crate::ErrorType::InvalidValue {
            field: "score",
            value: score.to_string(),
        });
    }

    let song = SongMetadata {
        playcount: args.playcount.unwrap_or_default(),
        score: args.score.unwrap_or_default(),
        ..SongMetadata::default()
    };
    reader.save_song_statistics_to_file(&args.path, &song)?;
    log::info!("Saved statistics to {}", args.path.display());

    Ok(())
}
