//! Command-line argument parsing for db-xl-dump.
//!
//! Uses clap to parse CLI arguments and merges them with the configuration
//! file and connection profile. Flags always win.

use crate::config::{
    find_config_file, Config, ConnectionProfile, Settings, DEFAULT_CONFIG_FILE,
    DEFAULT_OUTPUT_FILE,
};
use crate::error::{DumpError, Result};
use crate::export::{parse_targets, ConnectionDescriptor};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Export database tables, views and queries to a multi-sheet XLSX workbook.
#[derive(Parser, Debug)]
#[command(name = "db-xl-dump")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file for general parameters
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Write a header row with the column names
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub headers: bool,

    /// Tables, views or queries to export, comma-separated
    #[arg(short = 'e', long, value_name = "LIST")]
    pub export: Option<String>,

    /// Output file
    #[arg(short = 'o', long, value_name = "PATH", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Connection profile to use
    #[arg(long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Database connection, e.g. user/password@host:port/service or a driver URL
    #[arg(long, value_name = "STRING", env = "DB_XL_DUMP_DB")]
    pub db: Option<String>,

    /// Database user
    #[arg(long, value_name = "USER")]
    pub username: Option<String>,

    /// Database host
    #[arg(long, value_name = "HOST")]
    pub hostname: Option<String>,

    /// Database port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Service (database) name
    #[arg(long, value_name = "NAME")]
    pub service: Option<String>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Resolves the run settings from the config file, the connection
    /// profile and these arguments, in increasing order of precedence.
    pub fn resolve(&self) -> Result<Settings> {
        let config_path = self.config_path();
        let config = Config::load(&config_path, self.config_file.is_some())?;

        let mut descriptor = ConnectionDescriptor::default();
        let profile_name = self.connection.as_ref().or(config.connection_config.as_ref());
        if let Some(name) = profile_name {
            let dir = config.connections_dir();
            ConnectionProfile::load(&dir, name)?.apply_to(&mut descriptor);
        }
        self.apply_overrides(&mut descriptor);

        Ok(Settings {
            debug: self.debug || config.debug_mode,
            headers: self.headers,
            output: self.output.clone(),
            descriptor,
            targets: parse_targets(self.export.as_deref().unwrap_or_default()),
            config_file: find_config_file(&config_path),
        })
    }

    /// Copies connection flags onto `descriptor`.
    fn apply_overrides(&self, descriptor: &mut ConnectionDescriptor) {
        if let Some(db) = &self.db {
            descriptor.connection_string = db.clone();
        }
        if let Some(username) = &self.username {
            descriptor.username = username.clone();
        }
        if let Some(hostname) = &self.hostname {
            descriptor.hostname = hostname.clone();
        }
        if let Some(port) = self.port {
            descriptor.port = port;
        }
        if let Some(service) = &self.service {
            descriptor.service = service.clone();
        }
    }
}

/// Asks for the database password on the terminal without echoing it.
pub fn prompt_password() -> Result<String> {
    rpassword::prompt_password("Password: ")
        .map_err(|e| DumpError::config(format!("Failed to read password: {e}")))
}
