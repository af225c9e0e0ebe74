// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Poisson spike generation for the input channels.

use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use closedloop_config::TimingConfig;

/// One emitted input spike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeEvent {
    pub time: f64,
    pub channel: usize,
}

/// Samples spike counts and sub-tick timestamps from a rate vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeGenerator {
    tick_length: f64,
    output_delay: f64,
}

impl SpikeGenerator {
    pub fn new(tick_length: f64, output_delay: f64) -> ControlResult<Self> {
        if !tick_length.is_finite() || tick_length <= 0.0 {
            return Err(ControlError::InvalidParameter(format!(
                "tick_length must be positive, got {}",
                tick_length
            )));
        }
        if !output_delay.is_finite() || output_delay < 0.0 {
            return Err(ControlError::InvalidParameter(format!(
                "output_delay must not be negative, got {}",
                output_delay
            )));
        }
        Ok(Self {
            tick_length,
            output_delay,
        })
    }

    pub fn from_config(timing: &TimingConfig) -> ControlResult<Self> {
        Self::new(timing.tick_length, timing.output_delay)
    }

    pub fn tick_length(&self) -> f64 {
        self.tick_length
    }

    pub fn output_delay(&self) -> f64 {
        self.output_delay
    }

    /// Poisson spike count per channel with mean `rate * tick_length`
    ///
    /// Zero-rate channels never spike and consume no randomness.
    pub fn spikes_from_rate<R: Rng + ?Sized>(&self, rates: &[f64], rng: &mut R) -> ControlResult<Vec<u64>> {
        rates
            .iter()
            .enumerate()
            .map(|(channel, &rate)| {
                let mean = rate * self.tick_length;
                if mean == 0.0 {
                    return Ok(0);
                }
                let poisson = Poisson::new(mean).map_err(|e| {
                    ControlError::InvalidParameter(format!(
                        "rate {} on channel {}: {}",
                        rate, channel, e
                    ))
                })?;
                Ok(poisson.sample(rng) as u64)
            })
            .collect()
    }

    /// Jittered timestamps for `counts`, ordered by time
    ///
    /// Each spike lands at `tick_start + U(0,1) * tick_length + output_delay`.
    /// Events are ascending in time overall and therefore within every channel.
    pub fn spike_times<R: Rng + ?Sized>(&self, tick_start: f64, counts: &[u64], rng: &mut R) -> Vec<SpikeEvent> {
        let total = counts.iter().sum::<u64>() as usize;
        let mut events = Vec::with_capacity(total);
        for (channel, &count) in counts.iter().enumerate() {
            for _ in 0..count {
                let time = tick_start + rng.gen::<f64>() * self.tick_length + self.output_delay;
                events.push(SpikeEvent { time, channel });
            }
        }
        // stable: equal times keep channel order
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        events
    }

    /// Counts and timestamps for one tick
    pub fn generate<R: Rng + ?Sized>(
        &self,
        tick_start: f64,
        rates: &[f64],
        rng: &mut R,
    ) -> ControlResult<Vec<SpikeEvent>> {
        let counts = self.spikes_from_rate(rates, rng)?;
        Ok(self.spike_times(tick_start, &counts, rng))
    }
}
