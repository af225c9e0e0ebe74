// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Output seam between the control core and its host
//!
//! The host owns transport, port naming and lifecycle. The core only needs
//! somewhere to put events and continuous values each tick.

use crate::reward::RewardSnapshot;

/// Sink for everything the control loop publishes during a tick
pub trait ControlOutputs {
    /// Emit one input spike; called in non-decreasing `time` order within a tick
    fn emit_spike(&mut self, time: f64, channel: usize) -> Result<(), String>;

    /// Publish the pattern id that just became active
    fn publish_pattern_id(&mut self, pattern_id: usize);

    /// Publish the observed rate of every output channel
    fn publish_activity(&mut self, rates: &[f64]);

    /// Publish current, mean and normalized reward
    fn publish_reward(&mut self, reward: &RewardSnapshot);
}

/// Discards every output
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutputs;

impl ControlOutputs for NullOutputs {
    fn emit_spike(&mut self, _time: f64, _channel: usize) -> Result<(), String> {
        Ok(())
    }

    fn publish_pattern_id(&mut self, _pattern_id: usize) {}

    fn publish_activity(&mut self, _rates: &[f64]) {}

    fn publish_reward(&mut self, _reward: &RewardSnapshot) {}
}
