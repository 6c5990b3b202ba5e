// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Module for the `read` CLI subcommand.

use crate::TagReader;
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments for the `read` CLI command.
#[derive(Parser, Debug)]
pub struct Args {
    /// Files to read.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Pretty-print the JSON output.
    #[arg(short, long)]
    pretty: bool,
}

/// Run the `read` command.
pub fn run(reader: &TagReader, args: Args) -> crate::Result<()> {
    for path in args.paths {
        let song = reader.read_file(&path)?;
        if !song.valid {
            log::warn!("{} is not a supported media file", path.display());
        }

        let json = if args.pretty {
            serde_json::to_string_pretty(&song)?
        } else {
            serde_json::to_string(&song)?
        };
        println!("{json}");
    }

    Ok(())
}
