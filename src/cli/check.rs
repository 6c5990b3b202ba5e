// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Module for the `check` CLI subcommand.

use crate::TagReader;
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments for the `check` CLI command.
#[derive(Parser, Debug)]
pub struct Args {
    /// Files to check.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

/// Run the `check` command.
#[expect(clippy::unnecessary_wraps)]
pub fn run(reader: &TagReader, args: Args) -> crate::Result<()> {
    for path in args.paths {
        let file_type = reader.guess_file_type(&path);
        let status = if reader.is_media_file(&path) {
            "media file"
        } else {
            "not a media file"
        };
        println!("{}: {status} ({file_type:?})", path.display());
    }

    Ok(())
}
