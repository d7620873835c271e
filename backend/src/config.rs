//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the CLI
//! before this runs) and can be overridden by command-line flags.
//!
//! | Variable          | Meaning                      | Default |
//! |-------------------|------------------------------|---------|
//! | `SALESDASH_DATA`  | Path of the transaction CSV  | none    |
//! | `SALESDASH_PORT`  | HTTP port for `serve`        | `3000`  |

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

pub const ENV_DATA: &str = "SALESDASH_DATA";
pub const ENV_PORT: &str = "SALESDASH_PORT";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: Option<PathBuf>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_path = lookup(ENV_DATA)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let port = match lookup(ENV_PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { data_path, port })
    }

    /// Apply command-line flags on top.
    pub fn with_overrides(mut self, data_path: Option<PathBuf>, port: Option<u16>) -> Self {
        if data_path.is_some() {
            self.data_path = data_path;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn require_data_path(&self) -> ConfigResult<&Path> {
        self.data_path.as_deref().ok_or(ConfigError::MissingDataPath)
    }
}
