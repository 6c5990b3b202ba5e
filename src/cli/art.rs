// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Module for the `art` CLI subcommand.

use crate::TagReader;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

/// Command line arguments for the `art` CLI command.
#[derive(Parser, Debug)]
pub struct Args {
    /// File to extract the cover art from.
    path: PathBuf,
    /// Write the image to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Run the `art` command.
pub fn run(reader: &TagReader, args: Args) -> crate::Result<()> {
    let Some(data) = reader.load_embedded_art(&args.path)? else {
        log::info!("{} has no embedded cover art", args.path.display());
        return Ok(());
    };

    match args.output {
        Some(output) => {
            std::fs::write(&output, &data)?;
            log::info!("Wrote {} bytes to {}", data.len(), output.display());
        }
        None => io::stdout().lock().write_all(&data)?,
    }

    Ok(())
}
