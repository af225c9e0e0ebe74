// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulated-time vs. wall-clock ratio, for operator status only.

use std::time::Instant;

use crate::ring_buffer::RingBuffer;

/// Weight of a new raw estimate in the smoothed speedup
///
/// The average starts at the first defined raw estimate, not at 0.
const SPEEDUP_SMOOTHING: f64 = 0.01;

/// Tracks speedup over a rolling window of per-tick wall-clock samples
#[derive(Debug, Clone)]
pub struct SpeedupTracker {
    samples: RingBuffer<Instant>,
    tick_length: f64,
    smoothed: Option<f64>,
}

impl SpeedupTracker {
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, tick_length: f64) -> Self {
        Self {
            samples: RingBuffer::new(capacity),
            tick_length,
            smoothed: None,
        }
    }

    /// Record the wall-clock time at the end of one tick
    ///
    /// Returns the smoothed speedup, or `None` while it is undefined: fewer
    /// than two samples, or no measurable wall-clock time between them.
    pub fn record(&mut self, now: Instant) -> Option<f64> {
        self.samples.push(now);
        let (oldest, newest) = (self.samples.oldest()?, self.samples.newest()?);
        if self.samples.len() < 2 {
            return None;
        }

        let real_span = newest.saturating_duration_since(oldest).as_secs_f64();
        if real_span <= 0.0 {
            return self.smoothed;
        }
        let sim_span = (self.samples.len() - 1) as f64 * self.tick_length;
        let raw = sim_span / real_span;

        let smoothed = match self.smoothed {
            Some(previous) => previous + SPEEDUP_SMOOTHING * (raw - previous),
            None => raw,
        };
        self.smoothed = Some(smoothed);
        self.smoothed
    }

    /// Latest smoothed speedup without recording a sample
    pub fn speedup(&self) -> Option<f64> {
        self.smoothed
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_sample_is_undefined() {
        let mut tracker = SpeedupTracker::new(10, 0.001);
        assert_eq!(tracker.record(Instant::now()), None);
        assert_eq!(tracker.speedup(), None);
    }

    #[test]
    fn test_speedup_from_regular_ticks() {
        // 1 ms simulated per 10 ms wall clock
        let mut tracker = SpeedupTracker::new(100, 0.001);
        let start = Instant::now();
        let mut last = None;
        for k in 0..5u32 {
            last = tracker.record(start + Duration::from_millis(10) * k);
        }
        let speedup = last.unwrap();
        assert!((speedup - 0.1).abs() < 1e-9, "speedup {}", speedup);
    }

    #[test]
    fn test_first_estimate_seeds_average() {
        // 1 ms simulated per 4 ms wall clock, then twice as fast
        let mut tracker = SpeedupTracker::new(2, 0.001);
        let start = Instant::now();
        tracker.record(start);
        let first = tracker.record(start + Duration::from_millis(4)).unwrap();
        assert!((first - 0.25).abs() < 1e-9);

        let second = tracker.record(start + Duration::from_millis(6)).unwrap();
        assert!((second - (0.25 + 0.01 * (0.5 - 0.25))).abs() < 1e-9);
    }

    #[test]
    fn test_zero_wall_span_keeps_previous_estimate() {
        let mut tracker = SpeedupTracker::new(10, 0.001);
        let t = Instant::now();
        tracker.record(t);
        assert_eq!(tracker.record(t), None);
    }

    #[test]
    fn test_sample_buffer_is_bounded() {
        let mut tracker = SpeedupTracker::new(4, 0.001);
        let start = Instant::now();
        for k in 0..20u32 {
            tracker.record(start + Duration::from_millis(1) * k);
        }
        assert_eq!(tracker.sample_count(), 4);
        // 1 ms simulated per 1 ms wall clock
        assert!((tracker.speedup().unwrap() - 1.0).abs() < 1e-9);
    }
}
