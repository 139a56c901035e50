//! Runtime configuration: command-line flags layered over an optional TOML
//! file, layered over defaults rooted in the user's home directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::db::{data_dir, DB_FILE_NAME};
use crate::models::FieldSet;

/// Log file name stored next to the database.
const LOG_FILE_NAME: &str = "data-collection.log";

#[derive(Parser, Debug, Default)]
#[command(
    name = "data-collection",
    about = "Record, filter and sort personal identification entries"
)]
pub struct Args {
    /// Path to a TOML config file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database file.
    #[arg(long, value_name = "FILE", env = "DATA_COLLECTION_DB")]
    pub database: Option<PathBuf>,

    /// Which form to show: `basic` or `extended`.
    #[arg(long, value_name = "SET")]
    pub fields: Option<FieldSet>,

    /// Keep entries in memory only; nothing is written to disk.
    #[arg(long)]
    pub in_memory: bool,

    /// Where to write the log.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Shape of the optional TOML config file. Every key may be omitted.
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    fields: Option<String>,
    in_memory: bool,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub field_set: FieldSet,
    pub database: PathBuf,
    pub in_memory: bool,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Resolve the configuration: flags win over the config file, which wins
    /// over defaults.
    pub fn load(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => read_config_file(path)?,
            None => ConfigFile::default(),
        };
        Self::merge(args, file, &data_dir()?)
    }

    fn merge(args: Args, file: ConfigFile, data_dir: &Path) -> Result<Self> {
        let field_set = match (args.fields, file.fields) {
            (Some(set), _) => set,
            (None, Some(raw)) => raw
                .parse::<FieldSet>()
                .map_err(anyhow::Error::msg)
                .context("invalid `fields` in config file")?,
            (None, None) => FieldSet::default(),
        };

        let database = args
            .database
            .or(file.database)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));

        Ok(Self {
            field_set,
            database,
            in_memory: args.in_memory || file.in_memory,
            log_file: args
                .log_file
                .or(file.log_file)
                .unwrap_or_else(|| data_dir.join(LOG_FILE_NAME)),
            log_level: args
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
}
