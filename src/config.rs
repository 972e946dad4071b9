//! Configuration management for db-xl-dump.
//!
//! Handles loading the general configuration file and named connection
//! profiles. Both are YAML by default with camelCase keys; a `.toml` file is
//! parsed as TOML. Files may be named with or without their extension.

use crate::error::{DumpError, Result};
use crate::export::{ConnectionDescriptor, ExportTarget};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the general configuration file looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Output path used when none is given.
pub const DEFAULT_OUTPUT_FILE: &str = "output.xlsx";

/// Extensions tried, in order, when a configuration path does not exist as given.
const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "toml"];

/// General configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Enables debug logging.
    #[serde(default)]
    pub debug_mode: bool,

    /// Directory holding connection profiles.
    #[serde(default)]
    pub connections_dir: Option<PathBuf>,

    /// Name of the connection profile to use.
    #[serde(default)]
    pub connection_config: Option<String>,
}

/// A named connection profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProfile {
    /// Pre-built connection string; wins over the discrete fields.
    #[serde(default)]
    pub db_connection_string: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub service: Option<String>,
}

impl Config {
    /// Loads the general configuration.
    ///
    /// A missing file yields defaults unless `required` is set, in which case
    /// it is an error.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        match find_config_file(path) {
            Some(found) => load_file(&found),
            None if required => Err(DumpError::config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            None => Ok(Self::default()),
        }
    }

    /// Returns the directory connection profiles are read from.
    pub fn connections_dir(&self) -> PathBuf {
        self.connections_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl ConnectionProfile {
    /// Loads the profile `name` from `dir`.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(name);
        let found = find_config_file(&path).ok_or_else(|| {
            DumpError::config(format!(
                "Connection profile '{}' not found in {}",
                name,
                dir.display()
            ))
        })?;
        load_file(&found)
    }

    /// Copies every field set in this profile onto `descriptor`.
    pub fn apply_to(&self, descriptor: &mut ConnectionDescriptor) {
        if let Some(conn_str) = &self.db_connection_string {
            descriptor.connection_string = conn_str.clone();
        }
        if let Some(username) = &self.username {
            descriptor.username = username.clone();
        }
        if let Some(password) = &self.password {
            descriptor.password = password.clone();
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

/// Everything a run needs, after merging defaults, files and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub debug: bool,
    pub headers: bool,
    pub output: PathBuf,
    pub descriptor: ConnectionDescriptor,
    pub targets: Vec<ExportTarget>,
    /// The general config file that was read, if one was found.
    pub config_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            headers: true,
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            descriptor: ConnectionDescriptor::default(),
            targets: Vec::new(),
            config_file: None,
        }
    }
}

impl Settings {
    /// Checks that there is a usable connection and something to export.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if !self.descriptor.is_usable() {
            missing.push("a database connection (--db, --connection or --username/--hostname)");
        }
        if self.targets.is_empty() {
            missing.push("a table, view or query to export (--export)");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DumpError::config(format!("Missing {}", missing.join(" and "))))
        }
    }
}

/// Finds a configuration file, trying the path as given and then with each
/// supported extension appended.
pub fn find_config_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut name = OsString::from(path.as_os_str());
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        })
        .find(|candidate| candidate.is_file())
}

/// Reads and parses a configuration file, choosing the format by extension.
fn load_file<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DumpError::config(format!("Failed to read {}: {e}", path.display()))
    })?;

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let parsed = if is_toml {
        toml::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| {
        DumpError::config(format!(
            "Configuration error in {}:\n  {}",
            path.display(),
            e
        ))
    })
}
