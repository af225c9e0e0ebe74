// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory host for running the control loop without a co-simulation.

use serde::Serialize;
use tracing::info;

use crate::driver::ControlLoop;
use crate::error::ControlResult;
use crate::io::ControlOutputs;
use crate::reward::RewardSnapshot;
use crate::spikes::SpikeEvent;

/// Records every output of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OfflineHost {
    pub spikes: Vec<SpikeEvent>,
    /// Pattern ids in the order they became active
    pub pattern_ids: Vec<usize>,
    /// Rate vector of every tick
    pub activity: Vec<Vec<f64>>,
    /// Reward of every tick
    pub rewards: Vec<RewardSnapshot>,
}

impl OfflineHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ControlOutputs for OfflineHost {
    fn emit_spike(&mut self, time: f64, channel: usize) -> Result<(), String> {
        self.spikes.push(SpikeEvent { time, channel });
        Ok(())
    }

    fn publish_pattern_id(&mut self, pattern_id: usize) {
        self.pattern_ids.push(pattern_id);
    }

    fn publish_activity(&mut self, rates: &[f64]) {
        self.activity.push(rates.to_vec());
    }

    fn publish_reward(&mut self, reward: &RewardSnapshot) {
        self.rewards.push(*reward);
    }
}

/// Totals of an offline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OfflineSummary {
    pub ticks: u64,
    pub spikes_emitted: usize,
    pub final_pattern_id: usize,
    pub final_reward: RewardSnapshot,
    pub speedup: Option<f64>,
}

/// Drive `control` at `k * tick_length` for every tick covering `total_time`
///
/// With `loopback`, each emitted input spike is fed straight back as an
/// observed output spike on the same channel index, so the activity seen by
/// the reward follows the stimulus.
pub fn run_offline(
    control: &mut ControlLoop,
    host: &mut OfflineHost,
    loopback: bool,
) -> ControlResult<OfflineSummary> {
    let tick_length = control.config().timing.tick_length;
    let total_ticks = control.config().total_ticks();
    let mut spikes_emitted = 0;

    for k in 0..total_ticks {
        let time = k as f64 * tick_length;
        let report = control.run_cycle(time, host)?;
        spikes_emitted += report.spikes.len();

        if loopback {
            for spike in &report.spikes {
                control.record_output_spike(spike.time, spike.channel);
            }
        }
        control.post_cycle_now(time);
    }

    let summary = OfflineSummary {
        ticks: total_ticks,
        spikes_emitted,
        final_pattern_id: control.current_pattern_id(),
        final_reward: control.reward().snapshot(),
        speedup: control.speedup(),
    };
    info!(
        "[OFFLINE] Run complete: {} ticks, {} spikes emitted, final pattern {}, mean reward {:.4}",
        summary.ticks, summary.spikes_emitted, summary.final_pattern_id, summary.final_reward.mean
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::ContrastReward;
    use closedloop_config::ClosedLoopConfig;

    fn short_config(seed: u64) -> ClosedLoopConfig {
        let mut config = ClosedLoopConfig::default();
        config.timing.total_time = 2.0;
        config.patterns.n_input_channels = 10;
        config.status.speedup_samples = 100;
        config.random.seed = Some(seed);
        config
    }

    #[test]
    fn test_offline_run_records_every_tick() {
        let config = short_config(21);
        let mut control = ControlLoop::new(&config, Box::new(ContrastReward)).unwrap();
        let mut host = OfflineHost::new();

        let summary = run_offline(&mut control, &mut host, false).unwrap();

        assert_eq!(summary.ticks, config.total_ticks());
        assert_eq!(host.activity.len() as u64, summary.ticks);
        assert_eq!(host.rewards.len() as u64, summary.ticks);
        assert_eq!(host.spikes.len(), summary.spikes_emitted);
        assert_eq!(host.pattern_ids.first(), Some(&0));
        // nothing is fed back, so no output activity is observed
        assert!(host.activity.iter().flatten().all(|rate| *rate == 0.0));
    }

    #[test]
    fn test_loopback_produces_activity() {
        let config = short_config(22);
        let mut control = ControlLoop::new(&config, Box::new(ContrastReward)).unwrap();
        let mut host = OfflineHost::new();

        run_offline(&mut control, &mut host, true).unwrap();

        assert!(host.activity.iter().flatten().any(|rate| *rate > 0.0));
    }
}
