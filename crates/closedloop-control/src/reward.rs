// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reward signal derived from observed output activity.
//!
//! The per-tick reward formula is a [`RewardShaping`] strategy injected at
//! construction. [`RewardGenerator`] only adds the bookkeeping around it: a
//! running mean over the integration horizon and the reward centered on it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::plan::BACKGROUND_PATTERN;

/// Maps the active pattern and the observed rates to one reward value
pub trait RewardShaping: Send {
    fn compute(&self, pattern_id: usize, rates: &[f64]) -> f64;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> RewardShaping for F
where
    F: Fn(usize, &[f64]) -> f64 + Send,
{
    fn compute(&self, pattern_id: usize, rates: &[f64]) -> f64 {
        self(pattern_id, rates)
    }
}

/// Contrast of the target channel against the mean of all other channels
///
/// Pattern `p` targets output channel `p - 1`. The result
/// `(target - others) / (target + others)` lies in `[-1, 1]`; it is 0 while
/// the background is active or when no channel is firing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContrastReward;

impl RewardShaping for ContrastReward {
    fn compute(&self, pattern_id: usize, rates: &[f64]) -> f64 {
        if pattern_id == BACKGROUND_PATTERN {
            return 0.0;
        }
        let Some(&target) = rates.get(pattern_id - 1) else {
            return 0.0;
        };
        let others = if rates.len() > 1 {
            (rates.iter().sum::<f64>() - target) / (rates.len() - 1) as f64
        } else {
            0.0
        };
        let total = target + others;
        if total > 0.0 {
            (target - others) / total
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "contrast"
    }
}

/// Latest computed reward values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardSnapshot {
    pub current: f64,
    pub mean: f64,
    pub normalized: f64,
}

pub struct RewardGenerator {
    shaping: Box<dyn RewardShaping>,
    n_channels: usize,
    smoothing: f64,
    state: RewardSnapshot,
}

impl RewardGenerator {
    /// `smoothing = min(1, tick_length / integration_time)` per update
    pub fn new(
        shaping: Box<dyn RewardShaping>,
        n_channels: usize,
        tick_length: f64,
        integration_time: f64,
    ) -> ControlResult<Self> {
        if !tick_length.is_finite() || tick_length <= 0.0 {
            return Err(ControlError::InvalidParameter(format!(
                "tick_length must be positive, got {}",
                tick_length
            )));
        }
        if !integration_time.is_finite() || integration_time <= 0.0 {
            return Err(ControlError::InvalidParameter(format!(
                "integration_time must be positive, got {}",
                integration_time
            )));
        }
        Ok(Self {
            shaping,
            n_channels,
            smoothing: (tick_length / integration_time).min(1.0),
            state: RewardSnapshot::default(),
        })
    }

    /// Update the reward state from one tick of observed rates
    ///
    /// # Errors
    /// `ChannelCountMismatch` if `rates` does not have the configured length,
    /// `InvalidParameter` if the shaping strategy returns a non-finite value.
    pub fn compute_reward(&mut self, pattern_id: usize, rates: &[f64]) -> ControlResult<RewardSnapshot> {
        if rates.len() != self.n_channels {
            return Err(ControlError::ChannelCountMismatch {
                expected: self.n_channels,
                actual: rates.len(),
            });
        }

        let current = self.shaping.compute(pattern_id, rates);
        if !current.is_finite() {
            return Err(ControlError::InvalidParameter(format!(
                "reward shaping '{}' returned {} for pattern {}",
                self.shaping.name(),
                current,
                pattern_id
            )));
        }

        let mean = self.state.mean + self.smoothing * (current - self.state.mean);
        self.state = RewardSnapshot {
            current,
            mean,
            normalized: current - mean,
        };
        Ok(self.state)
    }

    pub fn get_curr_reward(&self) -> f64 {
        self.state.current
    }

    pub fn get_mean_reward(&self) -> f64 {
        self.state.mean
    }

    pub fn get_norm_reward(&self) -> f64 {
        self.state.normalized
    }

    pub fn snapshot(&self) -> RewardSnapshot {
        self.state
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    pub fn shaping_name(&self) -> &str {
        self.shaping.name()
    }
}

impl fmt::Debug for RewardGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewardGenerator")
            .field("shaping", &self.shaping.name())
            .field("n_channels", &self.n_channels)
            .field("smoothing", &self.smoothing)
            .field("state", &self.state)
            .finish()
    }
}
