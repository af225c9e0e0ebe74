// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-crate debug flags
//!
//! Supports flags like `--debug-closedloop-control` and `--debug-all`, plus
//! the `CLOSEDLOOP_DEBUG` environment variable.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Crates whose logging is raised to `debug`
///
/// # Example
/// ```rust
/// use closedloop_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-closedloop-control".to_string()]);
/// assert!(flags.is_enabled("closedloop-control"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse `--debug-{crate-name}` and `--debug-all` arguments; anything else is ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `tracing::Level::DEBUG` if enabled for the crate, `INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Render an `EnvFilter` directive string with `default_level` for everything else.
    ///
    /// Crate names are converted to their module-path form (`closedloop-control`
    /// becomes `closedloop_control`) since that is the default event target.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|name| format!("{}=debug", name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_lowercase());
        filters.join(",")
    }
}

/// Parse debug flags from the process arguments and `CLOSEDLOOP_DEBUG`
///
/// The environment variable holds comma-separated crate names, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var("CLOSEDLOOP_DEBUG") {
        if env_var.trim() == "all" {
            flags.enable_all();
        } else {
            env_var
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .for_each(|name| flags.enable(name));
        }
    }

    flags
}

/// Help text for the debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  CLOSEDLOOP_DEBUG={{crate-name}}[,{{crate-name}}]
  CLOSEDLOOP_DEBUG=all
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-closedloop-control".to_string()]);
        assert!(flags.is_enabled("closedloop-control"));
        assert!(!flags.is_enabled("closedloop-config"));
    }

    #[test]
    fn test_unrelated_args_are_ignored() {
        let flags = CrateDebugFlags::from_args(vec!["--seed".to_string(), "7".to_string()]);
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_filter_string_uses_module_targets() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-closedloop-control".to_string()]);
        assert_eq!(flags.to_filter_string("WARN"), "closedloop_control=debug,warn");
    }

    #[test]
    fn test_filter_string_without_flags() {
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-closedloop-config".to_string()]);
        assert_eq!(flags.log_level("closedloop-config"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("closedloop-control"), tracing::Level::INFO);
    }
}
