//! File-backed defaults for the fetcher and the pool.
//!
//! The config file is a flat `key = value` list (a TOML subset) with `#`
//! comments:
//!
//! ```text
//! # ~/.config/getter/config.toml
//! queue_capacity = 32
//! workers = 8
//! connect_timeout_secs = 10
//! read_timeout_secs = 60
//! max_response_bytes = 1048576
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::fetch::FetcherConfig;
use crate::pool::PoolConfig;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A line is not `key = value`.
    #[error("invalid config syntax on line {line}: expected key = value")]
    Syntax {
        /// 1-based line number.
        line: usize,
    },

    /// A key is not recognized.
    #[error("unknown configuration key '{key}' on line {line}")]
    UnknownKey {
        /// The unrecognized key.
        key: String,
        /// 1-based line number.
        line: usize,
    },

    /// A value failed to parse or is out of range.
    #[error("invalid `{key}` value on line {line}: {reason}")]
    InvalidValue {
        /// Key whose value was rejected.
        key: &'static str,
        /// 1-based line number.
        line: usize,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Resolved configuration for a getter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Capacity of the pool's job and result queues.
    pub queue_capacity: usize,
    /// Number of pool worker threads.
    pub workers: usize,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Socket read/write timeout in seconds.
    pub read_timeout_secs: u64,
    /// Largest full response accepted, in bytes.
    pub max_response_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        let pool = PoolConfig::default();
        let fetcher = FetcherConfig::default();
        Self {
            queue_capacity: pool.queue_capacity,
            workers: pool.workers,
            connect_timeout_secs: fetcher.connect_timeout.as_secs(),
            read_timeout_secs: fetcher.read_timeout.as_secs(),
            max_response_bytes: fetcher.max_response_bytes,
        }
    }
}

impl Config {
    /// Loads the config file at the default path, or defaults when there is
    /// none.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        match resolve_default_config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads and validates the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] on IO failure, otherwise as
    /// [`parse_config_str`].
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse_config_str(&raw)?;
        debug!(path = %path.display(), ?config, "loaded config file");
        Ok(config)
    }

    #[must_use]
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            max_response_bytes: self.max_response_bytes,
        }
    }

    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
        }
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/getter/config.toml`
/// 2. `$HOME/.config/getter/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("getter")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("getter")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Parses config file contents on top of the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Syntax`], [`ConfigError::UnknownKey`] or
/// [`ConfigError::InvalidValue`] naming the offending line.
pub fn parse_config_str(raw: &str) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigError::Syntax { line: line_no });
        };
        let value = raw_value.trim();

        match raw_key.trim() {
            "queue_capacity" => {
                cfg.queue_capacity = parse_in_range("queue_capacity", value, line_no, 1, 1_000_000)?;
            }
            "workers" => {
                cfg.workers = parse_in_range("workers", value, line_no, 1, 100)?;
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs =
                    parse_in_range("connect_timeout_secs", value, line_no, 1, 3600)?;
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs =
                    parse_in_range("read_timeout_secs", value, line_no, 1, 3600)?;
            }
            "max_response_bytes" => {
                cfg.max_response_bytes =
                    parse_in_range("max_response_bytes", value, line_no, 1, usize::MAX)?;
            }
            unknown => {
                return Err(ConfigError::UnknownKey {
                    key: unknown.to_string(),
                    line: line_no,
                });
            }
        }
    }
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

/// Removes TOML digit separators; each `_` must sit between two digits.
fn strip_digit_separators(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut token = String::with_capacity(raw.len());
    for (index, ch) in raw.char_indices() {
        if ch != '_' {
            token.push(ch);
            continue;
        }
        let after_digit = index > 0 && bytes[index - 1].is_ascii_digit();
        let before_digit = bytes.get(index + 1).is_some_and(u8::is_ascii_digit);
        if !(after_digit && before_digit) {
            return None;
        }
    }
    Some(token)
}

fn parse_in_range<T>(
    key: &'static str,
    raw_value: &str,
    line: usize,
    min: T,
    max: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let invalid = |reason: String| ConfigError::InvalidValue { key, line, reason };

    let Some(token) = strip_digit_separators(raw_value) else {
        return Err(invalid(format!("misplaced digit separator in '{raw_value}'")));
    };
    if token.is_empty() {
        return Err(invalid("expected integer value".to_string()));
    }
    let value = token
        .parse::<T>()
        .map_err(|_| invalid(format!("expected non-negative integer, got '{raw_value}'")))?;
    if value < min || value > max {
        return Err(invalid(format!(
            "{value} out of range, expected {min}..={max}"
        )));
    }
    Ok(value)
}
