// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the control core

use closedloop_config::ConfigError;

/// Errors raised by the control core
///
/// Every variant is fatal for the run: ticks cannot be replayed, so a failed
/// tick aborts instead of being retried.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("rate vector has {actual} channels, expected {expected}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    #[error("pattern id {pattern_id} outside 0..={n_patterns}")]
    UnknownPattern { pattern_id: usize, n_patterns: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("event sink rejected spike at t={time} on channel {channel}: {reason}")]
    Sink {
        time: f64,
        channel: usize,
        reason: String,
    },
}

/// Result type for control operations
pub type ControlResult<T> = Result<T, ControlError>;
