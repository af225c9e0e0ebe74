// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Loading happens in three tiers:
//! 1. TOML file (base values, missing keys fall back to defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ClosedLoopConfig, ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Find the configuration file
///
/// Search order:
/// 1. `CLOSEDLOOP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./closedloop.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("CLOSEDLOOP_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by CLOSEDLOOP_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(cwd.ancestors().skip(1).take(5).map(|dir| dir.join(CONFIG_FILE_NAME)));
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet CLOSEDLOOP_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// The result is not validated; call [`crate::validate_config`] before use.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<ClosedLoopConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: ClosedLoopConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} = {:?}", key, value)))
}

fn parse_flag(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue(format!("{} = {:?}", key, value))),
    }
}

/// Apply one override by its snake_case key. Unknown keys are ignored.
fn apply_override(config: &mut ClosedLoopConfig, key: &str, value: &str) -> ConfigResult<()> {
    match key {
        "tick_length" => config.timing.tick_length = parse_value(key, value)?,
        "total_time" => config.timing.total_time = parse_value(key, value)?,
        "n_patterns" => config.patterns.n_patterns = parse_value(key, value)?,
        "seed" => config.random.seed = Some(parse_value(key, value)?),
        "log_level" => config.logging.level = value.to_string(),
        "clear_on_phase_change" => {
            config.activity.clear_on_phase_change = parse_flag(key, value)?
        }
        _ => {}
    }
    Ok(())
}

const OVERRIDE_KEYS: &[&str] = &[
    "tick_length",
    "total_time",
    "n_patterns",
    "seed",
    "log_level",
    "clear_on_phase_change",
];

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `CLOSEDLOOP_TICK_LENGTH` -> `timing.tick_length`
/// - `CLOSEDLOOP_TOTAL_TIME` -> `timing.total_time`
/// - `CLOSEDLOOP_N_PATTERNS` -> `patterns.n_patterns`
/// - `CLOSEDLOOP_SEED` -> `random.seed`
/// - `CLOSEDLOOP_LOG_LEVEL` -> `logging.level`
/// - `CLOSEDLOOP_CLEAR_ON_PHASE_CHANGE` -> `activity.clear_on_phase_change`
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a set variable does not parse.
pub fn apply_environment_overrides(config: &mut ClosedLoopConfig) -> ConfigResult<()> {
    for key in OVERRIDE_KEYS {
        let var = format!("CLOSEDLOOP_{}", key.to_uppercase());
        if let Ok(value) = env::var(&var) {
            apply_override(config, key, &value)?;
        }
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// `cli_args` uses the snake_case keys, e.g. `{"tick_length": "0.0005", "seed": "7"}`.
pub fn apply_cli_overrides(
    config: &mut ClosedLoopConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    for key in OVERRIDE_KEYS {
        if let Some(value) = cli_args.get(*key) {
            apply_override(config, key, value)?;
        }
    }
    Ok(())
}
