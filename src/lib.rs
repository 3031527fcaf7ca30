pub mod cli;
mod csv_cmd;
pub mod guess;
pub mod io_utils;
mod json_cmd;
pub mod keys;
pub mod render;
pub mod stats;
pub mod table;
pub mod tables;
pub mod timestamp;
pub mod tokens;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::guess::{GuessedValue, Type, guess_type};
pub use crate::keys::{KeyError, get_keys};
pub use crate::tables::{TableDef, compute_table_defs};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("shape_probe", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Keys(args) => json_cmd::execute_keys(&args),
        Commands::Tables(args) => json_cmd::execute_tables(&args),
        Commands::Tokens(args) => json_cmd::execute_tokens(&args),
        Commands::Types(args) => csv_cmd::execute_types(&args),
        Commands::Ddl(args) => csv_cmd::execute_ddl(&args),
    }
}
