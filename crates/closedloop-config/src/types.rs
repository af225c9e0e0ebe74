// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `closedloop.toml`. Every duration is in seconds and every rate in Hz.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClosedLoopConfig {
    pub timing: TimingConfig,
    pub patterns: PatternsConfig,
    pub activity: ActivityConfig,
    pub reward: RewardConfig,
    pub status: StatusConfig,
    pub random: RandomConfig,
    pub logging: LoggingConfig,
}

/// Tick timing of the control loop
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of one control tick
    pub tick_length: f64,
    /// Total simulated run length
    pub total_time: f64,
    /// Fixed delay added to every emitted spike timestamp
    pub output_delay: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_length: 0.001,
            total_time: 100.0,
            output_delay: 0.001,
        }
    }
}

/// Stimulus patterns and the phase schedule
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternsConfig {
    pub n_patterns: usize,
    pub n_input_channels: usize,
    pub background_rate: f64,
    pub max_rate: f64,
    pub gamma_shape: f64,
    pub gamma_scale: f64,
    pub min_phase_duration: f64,
    pub max_phase_duration: f64,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            n_patterns: 2,
            n_input_channels: 100,
            background_rate: 2.0,
            max_rate: 60.0,
            gamma_shape: 0.2,
            gamma_scale: 0.8,
            min_phase_duration: 0.5,
            max_phase_duration: 1.0,
        }
    }
}

/// Windowed estimation of observed output activity
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Number of windowed output buffers (one per pattern class at least)
    pub n_output_channels: usize,
    pub window_length: f64,
    /// Drop every buffered output spike when the active phase changes
    pub clear_on_phase_change: bool,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            n_output_channels: 2,
            window_length: 0.1,
            clear_on_phase_change: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Horizon of the running mean reward
    pub integration_time: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            integration_time: 5.0,
        }
    }
}

/// Operator-facing status reporting
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Ticks between two status lines
    pub print_interval: u64,
    /// Capacity of the rolling wall-clock sample buffer
    pub speedup_samples: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            print_interval: 1000,
            speedup_samples: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Fixed seed for reproducible runs; entropy seeded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl ClosedLoopConfig {
    /// Number of whole ticks covering `timing.total_time`.
    pub fn total_ticks(&self) -> u64 {
        (self.timing.total_time / self.timing.tick_length).ceil() as u64
    }
}
