// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are within valid ranges and consistent with
//! each other. All violations are collected before failing so the operator
//! sees the complete list at once.

use crate::{ClosedLoopConfig, ConfigError, ConfigResult};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotPositive { field: String, value: f64 },
    Negative { field: String, value: f64 },
    Zero { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{} = {} must be positive", field, value)
            }
            Self::Negative { field, value } => {
                write!(f, "{} = {} must not be negative", field, value)
            }
            Self::Zero { field } => write!(f, "{} must be at least 1", field),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Positive durations, window and horizon lengths
/// - Non-empty pattern and channel counts
/// - Consistent rate bounds and phase duration bounds
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &ClosedLoopConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_positive_values(config, &mut errors);
    validate_counts(config, &mut errors);
    validate_consistency(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn require_positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(ConfigValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }
}

fn require_non_negative(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(ConfigValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
}

fn validate_positive_values(config: &ClosedLoopConfig, errors: &mut Vec<ConfigValidationError>) {
    require_positive("timing.tick_length", config.timing.tick_length, errors);
    require_positive("timing.total_time", config.timing.total_time, errors);
    require_non_negative("timing.output_delay", config.timing.output_delay, errors);

    require_non_negative("patterns.background_rate", config.patterns.background_rate, errors);
    require_positive("patterns.max_rate", config.patterns.max_rate, errors);
    require_positive("patterns.gamma_shape", config.patterns.gamma_shape, errors);
    require_positive("patterns.gamma_scale", config.patterns.gamma_scale, errors);
    require_positive("patterns.min_phase_duration", config.patterns.min_phase_duration, errors);
    require_positive("patterns.max_phase_duration", config.patterns.max_phase_duration, errors);

    require_positive("activity.window_length", config.activity.window_length, errors);
    require_positive("reward.integration_time", config.reward.integration_time, errors);
}

fn validate_counts(config: &ClosedLoopConfig, errors: &mut Vec<ConfigValidationError>) {
    let counts = [
        ("patterns.n_patterns", config.patterns.n_patterns),
        ("patterns.n_input_channels", config.patterns.n_input_channels),
        ("activity.n_output_channels", config.activity.n_output_channels),
        ("status.speedup_samples", config.status.speedup_samples),
    ];
    for (field, count) in counts {
        if count == 0 {
            errors.push(ConfigValidationError::Zero {
                field: field.to_string(),
            });
        }
    }
}

fn validate_consistency(config: &ClosedLoopConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.patterns.max_rate < config.patterns.background_rate {
        errors.push(ConfigValidationError::InvalidValue {
            field: "patterns.max_rate".to_string(),
            reason: format!(
                "must not be below patterns.background_rate ({})",
                config.patterns.background_rate
            ),
        });
    }

    if config.patterns.min_phase_duration > config.patterns.max_phase_duration {
        errors.push(ConfigValidationError::InvalidValue {
            field: "patterns.min_phase_duration".to_string(),
            reason: format!(
                "must not exceed patterns.max_phase_duration ({})",
                config.patterns.max_phase_duration
            ),
        });
    }

    // every pattern needs its own target output channel
    if config.activity.n_output_channels < config.patterns.n_patterns {
        errors.push(ConfigValidationError::InvalidValue {
            field: "activity.n_output_channels".to_string(),
            reason: format!(
                "must be at least patterns.n_patterns ({})",
                config.patterns.n_patterns
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_validation_error(config: &ClosedLoopConfig) -> String {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => msg,
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ClosedLoopConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_positive_tick_length() {
        let mut config = ClosedLoopConfig::default();
        config.timing.tick_length = 0.0;

        let msg = expect_validation_error(&config);
        assert!(msg.contains("timing.tick_length"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_nan_window_is_rejected() {
        let mut config = ClosedLoopConfig::default();
        config.activity.window_length = f64::NAN;

        let msg = expect_validation_error(&config);
        assert!(msg.contains("activity.window_length"));
    }

    #[test]
    fn test_zero_patterns() {
        let mut config = ClosedLoopConfig::default();
        config.patterns.n_patterns = 0;

        let msg = expect_validation_error(&config);
        assert!(msg.contains("patterns.n_patterns must be at least 1"));
    }

    #[test]
    fn test_output_channels_cover_patterns() {
        let mut config = ClosedLoopConfig::default();
        config.patterns.n_patterns = 5;
        config.activity.n_output_channels = 3;

        let msg = expect_validation_error(&config);
        assert!(msg.contains("activity.n_output_channels"));
    }

    #[test]
    fn test_inverted_phase_durations() {
        let mut config = ClosedLoopConfig::default();
        config.patterns.min_phase_duration = 2.0;
        config.patterns.max_phase_duration = 1.0;

        let msg = expect_validation_error(&config);
        assert!(msg.contains("patterns.min_phase_duration"));
    }

    #[test]
    fn test_all_violations_are_reported() {
        let mut config = ClosedLoopConfig::default();
        config.timing.total_time = -1.0;
        config.patterns.background_rate = -2.0;
        config.reward.integration_time = 0.0;

        let msg = expect_validation_error(&config);
        assert!(msg.contains("timing.total_time"));
        assert!(msg.contains("patterns.background_rate"));
        assert!(msg.contains("reward.integration_time"));
    }
}
