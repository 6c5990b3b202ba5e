// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Command line interface.

mod art;
mod check;
mod config;
mod rate;
mod read;
mod stats;
mod write;

use crate::{Config, TagReader};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

/// Command line Arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Show debug information.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Path to configuration file (defaults to `config.toml` in the XDG config directory).
    #[arg(short, long, required = false, global = true)]
    config_path: Option<String>,
    /// Command to run.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the song records of files as JSON.
    Read(read::Args),
    /// Change the tags of a file.
    Write(Box<write::Args>),
    /// Save a rating to a file.
    Rate(rate::Args),
    /// Save the play count and score to a file.
    Stats(stats::Args),
    /// Extract embedded cover art.
    Art(art::Args),
    /// Check if files are supported media files.
    Check(check::Args),
    /// Print the effective configuration.
    Config(config::Args),
}

impl Args {
    /// Get the desired log level, depending on the verbose flag passed on the command line.
    fn log_level_filter(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Get the current configuration.
    ///
    /// The configuration file passed on the command line takes precedence over the user
    /// configuration file. Missing values are taken from the default configuration.
    fn config(&self) -> crate::Result<Config> {
        let path = match &self.config_path {
            Some(path) => Some(expanduser::expanduser(path)?),
            None => Config::find_user_config_path(),
        };

        match path {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Config::load_from_path(path).map(|config| config.with_defaults())
            }
            None => Ok(Config::default()),
        }
    }
}

/// Main entry point.
///
/// # Errors
///
/// Can returns errors if the command line arguments are incorrect or the executed command fails.
pub fn main() -> crate::Result<()> {
    let args = Args::parse();

    if let Err(err) = TermLogger::init(
        args.log_level_filter(),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {err}");
    }

    let reader = TagReader::new(args.config()?);
    match args.command {
        Command::Read(args) => read::run(&reader, args),
        Command::Write(args) => write::run(&reader, *args),
        Command::Rate(args) => rate::run(&reader, args),
        Command::Stats(args) => stats::run(&reader, args),
        Command::Art(args) => art::run(&reader, args),
        Command::Check(args) => check::run(&reader, args),
        Command::Config(args) => config::run(&reader, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_line_interface() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["tagreader", "read", "song.mp3", "--verbose", "-c", "~/x.toml"])
                .unwrap();
        assert!(args.verbose);
        assert_eq!(args.config_path.as_deref(), Some("~/x.toml"));
        assert!(matches!(args.command, Command::Read(_)));
        assert_eq!(args.log_level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Args::try_parse_from(["tagreader"]).is_err());
    }
}
