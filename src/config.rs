//! Configuration for jsonkv
//!
//! Centralized client configuration with sensible defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{JsonKvError, Result};

/// Main configuration for a jsonkv client
///
/// Loadable from a JSON file; omitted fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Store address (host:port)
    pub addr: String,

    /// Connect timeout (milliseconds, 0 = no timeout)
    pub connect_timeout_ms: u64,

    /// Read timeout (milliseconds, 0 = no timeout)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = no timeout)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Pipeline Configuration
    // -------------------------------------------------------------------------
    /// Whether `Client::pipeline_default` opens an atomic batch
    pub transaction: bool,

    /// Whether `Batch::execute` fails on the first command error
    pub raise_on_error: bool,

    // -------------------------------------------------------------------------
    // Command Defaults
    // -------------------------------------------------------------------------
    /// Send NOESCAPE with `get` so non-ASCII text is returned as-is
    pub no_escape: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            transaction: true,
            raise_on_error: true,
            no_escape: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| JsonKvError::Config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check the configuration for values no transport can work with
    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(JsonKvError::Config("store address is empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store address
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the default transaction mode for new pipelines
    pub fn transaction(mut self, atomic: bool) -> Self {
        self.config.transaction = atomic;
        self
    }

    /// Set the default partial-failure policy for pipelines
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.config.raise_on_error = raise;
        self
    }

    /// Set the default NOESCAPE flag for reads
    pub fn no_escape(mut self, no_escape: bool) -> Self {
        self.config.no_escape = no_escape;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
