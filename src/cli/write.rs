// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Module for the `write` CLI subcommand.

use crate::TagReader;
use clap::Parser;
use std::path::PathBuf;

/// Copy the values of all given options into the song record.
macro_rules! assign_fields {
    ($song:ident, $args:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $args.$field {
                $song.$field = value;
            }
        )+
    };
}

/// Command line arguments for the `write` CLI command.
///
/// Options that are not given keep their current value. Empty strings clear a field.
#[derive(Parser, Debug)]
pub struct Args {
    /// File to write.
    path: PathBuf,
    /// Track title.
    #[arg(long)]
    title: Option<String>,
    /// Track artist.
    #[arg(long)]
    artist: Option<String>,
    /// Release title.
    #[arg(long)]
    album: Option<String>,
    /// Release artist.
    #[arg(long)]
    albumartist: Option<String>,
    /// Composer(s).
    #[arg(long)]
    composer: Option<String>,
    /// Performer(s).
    #[arg(long)]
    performer: Option<String>,
    /// Content group.
    #[arg(long)]
    grouping: Option<String>,
    /// Genre.
    #[arg(long)]
    genre: Option<String>,
    /// Comment.
    #[arg(long)]
    comment: Option<String>,
    /// Unsynchronized lyrics.
    #[arg(long)]
    lyrics: Option<String>,
    /// Release year (0 clears the year).
    #[arg(long)]
    year: Option<i32>,
    /// Track number (0 clears the track number).
    #[arg(long)]
    track: Option<i32>,
    /// Disc number (0 clears the disc number).
    #[arg(long)]
    disc: Option<i32>,
    /// Beats per minute (0 clears the tempo).
    #[arg(long)]
    bpm: Option<f32>,
    /// Part of a compilation.
    #[arg(long)]
    compilation: Option<bool>,
}

/// Run the `write` command.
pub fn run(reader: &TagReader, args: Args) -> crate::Result<()> {
    let mut song = reader.read_file(&args.path)?;
    assign_fields!(
        song,
        args,
        title,
        artist,
        album,
        albumartist,
        composer,
        performer,
        grouping,
        genre,
        comment,
        lyrics,
        year,
        track,
        disc,
        bpm,
        compilation,
    );

    reader.save_file(&args.path, &song)?;
    log::info!("Saved tags to {}", args.path.display());

    Ok(())
}
