// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Control Loop
//!
//! Runs one closed-loop cycle per host tick.
//!
//! ## Cycle
//! 1. Apply a due phase switch (optionally clearing the windowed buffers)
//! 2. Generate and emit input spikes for the active rate row
//! 3. Evict stale output spikes and read back the rates
//! 4. Publish the rates as activity
//! 5. Compute and publish the reward
//!
//! Speedup tracking and status lines happen in [`ControlLoop::post_cycle`],
//! separately from the cycle itself.

use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::error::{ControlError, ControlResult};
use crate::io::ControlOutputs;
use crate::plan::{PatternPlan, PatternPlanEntry, PlanCursor, BACKGROUND_PATTERN};
use crate::rate_table::RatePatternTable;
use crate::reward::{RewardGenerator, RewardShaping, RewardSnapshot};
use crate::rng::{create_rng, ControlRng};
use crate::speedup::SpeedupTracker;
use crate::spikes::{SpikeEvent, SpikeGenerator};
use crate::window::WindowedBufferSet;
use closedloop_config::{validate_config, ClosedLoopConfig};

/// Which pattern is presented now, and when that changes next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePhase {
    pub current_pattern_id: usize,
    /// `None` once the plan is exhausted; the current phase then runs to the end
    pub next_switch: Option<PatternPlanEntry>,
}

impl ActivePhase {
    pub fn is_frozen(&self) -> bool {
        self.next_switch.is_none()
    }
}

/// Everything one cycle produced
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub time: f64,
    pub pattern_id: usize,
    /// A phase switch was applied at the start of this cycle
    pub switched: bool,
    pub spikes: Vec<SpikeEvent>,
    pub rates: Vec<f64>,
    pub reward: RewardSnapshot,
}

/// Outcome of the post-cycle bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostCycle {
    /// Smoothed speedup, `None` while undefined
    pub speedup: Option<f64>,
    /// A status line was logged for this tick
    pub status_logged: bool,
}

/// Tick-driven closed-loop controller
///
/// Owns the phase schedule, the rate table, the windowed output buffers, the
/// reward state and the single random stream of a run.
pub struct ControlLoop {
    config: ClosedLoopConfig,
    rng: ControlRng,
    cursor: PlanCursor,
    phase: ActivePhase,
    rate_table: RatePatternTable,
    spike_generator: SpikeGenerator,
    buffers: WindowedBufferSet,
    reward: RewardGenerator,
    speedup: SpeedupTracker,
    /// Ticks left until the next status line
    status_countdown: u64,
    cycles: u64,
}

impl ControlLoop {
    /// Validate `config` and draw the plan and the rate table
    ///
    /// The random stream is consumed in a fixed order (plan, rate table,
    /// then spikes tick by tick), so a fixed `random.seed` reproduces a run.
    pub fn new(config: &ClosedLoopConfig, shaping: Box<dyn RewardShaping>) -> ControlResult<Self> {
        validate_config(config)?;

        let mut rng = create_rng(config.random.seed);
        let plan = PatternPlan::from_config(&config.patterns, config.timing.total_time, &mut rng)?;
        let rate_table = RatePatternTable::generate(&config.patterns, &mut rng)?;

        Self::assemble(config, rng, plan, rate_table, shaping)
    }

    /// Build a loop around an explicit plan and rate table
    ///
    /// # Errors
    /// `ChannelCountMismatch` if the table width differs from
    /// `patterns.n_input_channels`, `UnknownPattern` if the plan references a
    /// pattern the table does not have.
    pub fn with_plan(
        config: &ClosedLoopConfig,
        plan: PatternPlan,
        rate_table: RatePatternTable,
        shaping: Box<dyn RewardShaping>,
    ) -> ControlResult<Self> {
        validate_config(config)?;

        if rate_table.n_channels() != config.patterns.n_input_channels {
            return Err(ControlError::ChannelCountMismatch {
                expected: config.patterns.n_input_channels,
                actual: rate_table.n_channels(),
            });
        }
        if let Some(entry) = plan
            .entries()
            .iter()
            .find(|entry| entry.pattern_id > rate_table.n_patterns())
        {
            return Err(ControlError::UnknownPattern {
                pattern_id: entry.pattern_id,
                n_patterns: rate_table.n_patterns(),
            });
        }

        let rng = create_rng(config.random.seed);
        Self::assemble(config, rng, plan, rate_table, shaping)
    }

    fn assemble(
        config: &ClosedLoopConfig,
        rng: ControlRng,
        plan: PatternPlan,
        rate_table: RatePatternTable,
        shaping: Box<dyn RewardShaping>,
    ) -> ControlResult<Self> {
        let spike_generator = SpikeGenerator::from_config(&config.timing)?;
        let buffers = WindowedBufferSet::new(
            config.activity.n_output_channels,
            config.activity.window_length,
        )?;
        let reward = RewardGenerator::new(
            shaping,
            config.activity.n_output_channels,
            config.timing.tick_length,
            config.reward.integration_time,
        )?;
        let speedup = SpeedupTracker::new(config.status.speedup_samples, config.timing.tick_length);

        info!(
            "[CONTROL] Control loop ready: {} patterns, {} input channels, {} output channels, {} plan entries, reward shaping '{}'",
            rate_table.n_patterns(),
            rate_table.n_channels(),
            buffers.len(),
            plan.len(),
            reward.shaping_name()
        );

        let mut cursor = plan.into_cursor();
        let phase = ActivePhase {
            current_pattern_id: BACKGROUND_PATTERN,
            next_switch: cursor.advance(),
        };

        Ok(Self {
            config: config.clone(),
            rng,
            cursor,
            phase,
            rate_table,
            spike_generator,
            buffers,
            reward,
            speedup,
            status_countdown: 0,
            cycles: 0,
        })
    }

    /// Record an observed output spike reported by the host
    ///
    /// Spikes with a non-finite timestamp are dropped with a warning;
    /// returns whether the spike was recorded.
    pub fn record_output_spike(&mut self, time: f64, channel_index: usize) -> bool {
        if !self.buffers.insert_event(time, channel_index) {
            warn!(
                "[CONTROL] Dropped output spike with invalid timestamp {} on channel {}",
                time, channel_index
            );
            return false;
        }
        trace!(
            "[CONTROL] Output spike t={:.6} channel={} -> buffer {}",
            time,
            channel_index,
            self.buffers.route(channel_index)
        );
        true
    }

    /// Run one cycle at simulation time `time`
    ///
    /// # Errors
    /// Any error is fatal for the run: a tick cannot be replayed.
    pub fn run_cycle(&mut self, time: f64, outputs: &mut dyn ControlOutputs) -> ControlResult<CycleReport> {
        let switched = self.apply_due_switch(time, outputs);

        let rates_in = self.rate_table.row(self.phase.current_pattern_id)?;
        let spikes = self.spike_generator.generate(time, rates_in, &mut self.rng)?;
        for spike in &spikes {
            outputs
                .emit_spike(spike.time, spike.channel)
                .map_err(|reason| ControlError::Sink {
                    time: spike.time,
                    channel: spike.channel,
                    reason,
                })?;
        }

        self.buffers.evict_all(time);
        let rates = self.buffers.rates();
        outputs.publish_activity(&rates);

        let reward = self.reward.compute_reward(self.phase.current_pattern_id, &rates)?;
        outputs.publish_reward(&reward);

        self.cycles += 1;
        Ok(CycleReport {
            time,
            pattern_id: self.phase.current_pattern_id,
            switched,
            spikes,
            rates,
            reward,
        })
    }

    /// Apply at most one scheduled switch; later elapsed switches wait for the next tick
    fn apply_due_switch(&mut self, time: f64, outputs: &mut dyn ControlOutputs) -> bool {
        let Some(next) = self.phase.next_switch else {
            return false;
        };
        if time < next.switch_time {
            return false;
        }

        self.phase.current_pattern_id = next.pattern_id;
        self.phase.next_switch = self.cursor.advance();
        debug!(
            "[CONTROL] t={:.4}: switched to pattern {} (scheduled at {:.4})",
            time, next.pattern_id, next.switch_time
        );
        if self.phase.next_switch.is_none() {
            debug!(
                "[CONTROL] Phase plan exhausted, pattern {} stays active until the end",
                next.pattern_id
            );
        }

        if self.config.activity.clear_on_phase_change {
            trace!(
                "[CONTROL] Clearing {} buffered output spikes on phase change",
                self.buffers.total_events()
            );
            self.buffers.clear_all();
        }

        outputs.publish_pattern_id(next.pattern_id);
        true
    }

    /// Post-cycle bookkeeping: speedup sample and periodic status line
    ///
    /// The first call logs a status line, after which the countdown restarts
    /// at `status.print_interval` and drops by one per call.
    pub fn post_cycle(&mut self, time: f64, now: Instant) -> PostCycle {
        let speedup = self.speedup.record(now);

        let status_logged = self.status_countdown == 0;
        if status_logged {
            let speedup_text = match speedup {
                Some(value) => format!("{:.3}", value),
                None => "n/a".to_string(),
            };
            info!(
                "[CONTROL] t={:.3}s pattern={} norm_reward={:.4} mean_reward={:.4} speedup={} rates={:?}",
                time,
                self.phase.current_pattern_id,
                self.reward.get_norm_reward(),
                self.reward.get_mean_reward(),
                speedup_text,
                self.buffers.rates()
            );
            self.status_countdown = self.config.status.print_interval;
        } else {
            self.status_countdown -= 1;
        }

        PostCycle {
            speedup,
            status_logged,
        }
    }

    pub fn post_cycle_now(&mut self, time: f64) -> PostCycle {
        self.post_cycle(time, Instant::now())
    }

    /// `run_cycle` followed by `post_cycle` against the wall clock
    pub fn tick(&mut self, time: f64, outputs: &mut dyn ControlOutputs) -> ControlResult<CycleReport> {
        let report = self.run_cycle(time, outputs)?;
        self.post_cycle_now(time);
        Ok(report)
    }

    pub fn phase(&self) -> &ActivePhase {
        &self.phase
    }

    pub fn current_pattern_id(&self) -> usize {
        self.phase.current_pattern_id
    }

    pub fn remaining_switches(&self) -> usize {
        self.cursor.remaining() + usize::from(self.phase.next_switch.is_some())
    }

    pub fn rate_table(&self) -> &RatePatternTable {
        &self.rate_table
    }

    pub fn buffers(&self) -> &WindowedBufferSet {
        &self.buffers
    }

    pub fn reward(&self) -> &RewardGenerator {
        &self.reward
    }

    pub fn speedup(&self) -> Option<f64> {
        self.speedup.speedup()
    }

    pub fn config(&self) -> &ClosedLoopConfig {
        &self.config
    }

    /// Completed calls to [`run_cycle`](Self::run_cycle)
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl std::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("phase", &self.phase)
            .field("remaining_switches", &self.remaining_switches())
            .field("buffers", &self.buffers.len())
            .field("reward", &self.reward)
            .field("cycles", &self.cycles)
            .finish()
    }
}
