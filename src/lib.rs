// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # closedloop - Closed-Loop Stimulation Control
//!
//! Control logic of a closed-loop neural-simulation experiment. At every fixed
//! tick the node decides which stimulus pattern is presented, generates
//! Poisson input spikes for it, estimates the observed output rates over a
//! sliding window and turns them into a reward signal.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! closedloop = "0.1"  # Default: control + observability
//! ```
//!
//! ## Feature Flags
//!
//! - **`control`** (default): the control core
//! - **`observability`** (default): tracing subscriber setup and debug flags
//! - **`file-logging`**: per-run log folders
//!
//! ## Usage
//!
//! ```rust,no_run
//! use closedloop::prelude::*;
//!
//! let config = load_config(None, None)?;
//! let _guard = closedloop::observability::init_logging(
//!     &closedloop::observability::parse_debug_flags(),
//!     &closedloop::logging_options(&config),
//! )?;
//!
//! let mut control = ControlLoop::new(&config, Box::new(ContrastReward))?;
//! let mut host = OfflineHost::new();
//! run_offline(&mut control, &mut host, true)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: closedloop-config                          │
//! │  (TOML file, environment and CLI overrides, validation) │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: closedloop-control                         │
//! │  (phase plan, rate table, spikes, windows, reward)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Host (not included): transport, ports, lifecycle       │
//! │  plugged in through `ControlOutputs`                    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use closedloop_config as config;

// Re-export algorithms
#[cfg(feature = "control")]
pub use closedloop_control as control;

// Re-export infrastructure
#[cfg(feature = "observability")]
pub use closedloop_observability as observability;

/// Logging options taken from the `[logging]` section
#[cfg(feature = "observability")]
pub fn logging_options(config: &config::ClosedLoopConfig) -> observability::LoggingOptions {
    observability::LoggingOptions {
        level: config.logging.level.clone(),
        log_dir: config.logging.log_dir.clone(),
        ..Default::default()
    }
}

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, validate_config, ClosedLoopConfig, ConfigError};

    #[cfg(feature = "control")]
    pub use crate::control::{
        run_offline, ContrastReward, ControlError, ControlLoop, ControlOutputs, OfflineHost,
        RewardShaping, RewardSnapshot,
    };
}
