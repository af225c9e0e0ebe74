// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Closed-Loop Configuration
//!
//! Type-safe configuration for the closed-loop control node:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//! - Validation that reports every violation at once
//!
//! ## Usage
//!
//! ```rust,no_run
//! use closedloop_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("tick length: {} s", config.timing.tick_length);
//! println!("patterns: {}", config.patterns.n_patterns);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default config file name searched by [`find_config_file`].
pub const CONFIG_FILE_NAME: &str = "closedloop.toml";

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = ClosedLoopConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: ClosedLoopConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.patterns.n_patterns, config.patterns.n_patterns);
        assert_eq!(parsed.timing.tick_length, config.timing.tick_length);
    }

    #[test]
    fn test_parse_error_is_mapped() {
        let err: ConfigError = toml::from_str::<ClosedLoopConfig>("[timing\n")
            .unwrap_err()
            .into();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
