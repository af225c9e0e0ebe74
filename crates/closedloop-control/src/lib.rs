// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Closed-Loop Control Core
//!
//! Tick-driven control logic of a closed-loop stimulation experiment. Each
//! tick the [`ControlLoop`] decides which stimulus pattern is presented,
//! samples Poisson input spikes from that pattern's rate row, estimates the
//! observed output rates over a sliding window and turns them into a reward.
//!
//! ## Components
//! - [`plan`]: phase schedule alternating background and pattern phases
//! - [`rate_table`]: per-pattern target rates drawn once at setup
//! - [`spikes`]: Poisson spike counts with jittered sub-tick timestamps
//! - [`window`]: sliding-window rate estimation of observed output spikes
//! - [`reward`]: pluggable reward shaping with a running mean
//! - [`driver`]: the per-tick cycle and status bookkeeping
//!
//! Transport, port naming and process lifecycle belong to the host, which
//! plugs in through [`ControlOutputs`]. [`OfflineHost`] runs the loop in
//! memory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use closedloop_config::ClosedLoopConfig;
//! use closedloop_control::{run_offline, ContrastReward, ControlLoop, OfflineHost};
//!
//! let mut config = ClosedLoopConfig::default();
//! config.random.seed = Some(7);
//!
//! let mut control = ControlLoop::new(&config, Box::new(ContrastReward))?;
//! let mut host = OfflineHost::new();
//! let summary = run_offline(&mut control, &mut host, true)?;
//! println!("mean reward {:.3}", summary.final_reward.mean);
//! # Ok::<(), closedloop_control::ControlError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod driver;
pub mod error;
pub mod io;
pub mod offline;
pub mod plan;
pub mod rate_table;
pub mod reward;
pub mod ring_buffer;
pub mod rng;
pub mod speedup;
pub mod spikes;
pub mod window;

pub use driver::{ActivePhase, ControlLoop, CycleReport, PostCycle};
pub use error::{ControlError, ControlResult};
pub use io::{ControlOutputs, NullOutputs};
pub use offline::{run_offline, OfflineHost, OfflineSummary};
pub use plan::{PatternPlan, PatternPlanEntry, PlanCursor, UniformDuration, BACKGROUND_PATTERN};
pub use rate_table::{generate_rate_pattern, RatePatternTable};
pub use reward::{ContrastReward, RewardGenerator, RewardShaping, RewardSnapshot};
pub use ring_buffer::RingBuffer;
pub use rng::{create_rng, ControlRng};
pub use speedup::SpeedupTracker;
pub use spikes::{SpikeEvent, SpikeGenerator};
pub use window::{WindowedBufferSet, WindowedChannelBuffer};
