//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Environment variables
//! 2. `.sqlite-lint.toml` in current directory
//! 3. `~/.config/sqlite-lint/config.toml`
//! 4. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [lint]
//! dialect = "sqlite"            # generic, mysql, postgresql, sqlite
//! max_depth = 256
//! max_seen_statements = 10000
//! min_elapsed_ms = 0
//!
//! [checkers]
//! disabled = ["in_condition"]
//!
//! [checkers.severity]
//! fuzzy_match = "info"
//!
//! [log]
//! path = "sqlite-lint.log"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQLITE_LINT_DIALECT` | Dialect used to parse intercepted statements |
//! | `SQLITE_LINT_LOG` | Path of the shared issue log |

use std::{collections::HashMap, env, fs, path::PathBuf};

use serde::Deserialize;

use crate::{
    error::{AppResult, config_error},
    tree::SqlDialect
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub lint:     LintConfig,
    #[serde(default)]
    pub checkers: CheckersConfig,
    #[serde(default)]
    pub log:      LogConfig
}

/// Analysis limits and parsing options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Dialect used to parse intercepted statements
    pub dialect:             SqlDialect,
    /// Deepest expression nesting analyzed before a pass is abandoned
    pub max_depth:           usize,
    /// Fingerprints remembered per database before eviction
    pub max_seen_statements: usize,
    /// Executions cheaper than this are not analyzed
    pub min_elapsed_ms:      u64
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            dialect:             SqlDialect::SQLite,
            max_depth:           256,
            max_seen_statements: 10_000,
            min_elapsed_ms:      0
        }
    }
}

/// Checker configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CheckersConfig {
    /// Disabled checker names
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Severity overrides (checker name -> severity)
    #[serde(default)]
    pub severity: HashMap<String, String>
}

/// Shared issue log configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogConfig {
    pub path: Option<PathBuf>
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sqlite-lint.toml)
    /// 3. Config file in home directory (~/.config/sqlite-lint/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sqlite-lint")
                .join("config.toml");
            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sqlite-lint.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        if let Ok(dialect) = env::var("SQLITE_LINT_DIALECT") {
            config.lint.dialect = SqlDialect::from_name(&dialect).ok_or_else(|| {
                config_error(format!("Unknown SQLITE_LINT_DIALECT value: {}", dialect))
            })?;
        }

        if let Ok(path) = env::var("SQLITE_LINT_LOG") {
            config.log.path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }
}
