// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#[path = "sim/sim.rs"]
mod sim;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flexi_logger::{FileSpec, FlexiLoggerError, Logger, LoggerHandle};

use crate::sim::SimArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, arg_required_else_help = true)]
struct Cli {
    /// Loglevel specification, see
    /// https://docs.rs/flexi_logger/latest/flexi_logger/struct.LogSpecification.html.
    /// If not set, environment variable $RUST_LOG is used, then `warn`.
    #[arg(short, long)]
    log_spec: Option<String>,

    /// Write the log to a file instead of stderr.
    #[arg(long)]
    log_to_file: bool,

    /// Directory of the log file.
    #[arg(long, requires = "log_to_file")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run idle cycles against a simulated board.
    Sim(SimArgs),
}

fn start_logger(cli: &Cli) -> Result<LoggerHandle, FlexiLoggerError> {
    let mut logger = match &cli.log_spec {
        Some(spec) => Logger::try_with_str(spec)?,
        None => Logger::try_with_env_or_str("warn")?,
    };
    if cli.log_to_file {
        let spec = FileSpec::default()
            .suppress_timestamp()
            .o_directory(cli.log_dir.clone());
        logger = logger.log_to_file(spec);
    }
    logger.start()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _handle = start_logger(&cli)?;
    log::debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match cli.cmd {
        Command::Sim(args) => sim::sim(args)?,
    }
    Ok(())
}
