// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stimulus phase schedule
//!
//! A plan alternates background phases (pattern id 0) with pattern phases
//! (ids `1..=n_patterns`). It is generated once at setup and consumed through
//! a forward-only [`PlanCursor`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use closedloop_config::PatternsConfig;

/// Pattern id of the background (no stimulus) phase
pub const BACKGROUND_PATTERN: usize = 0;

/// One scheduled phase switch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternPlanEntry {
    /// Simulation time at which the phase starts
    pub switch_time: f64,
    pub pattern_id: usize,
}

impl PatternPlanEntry {
    pub fn new(switch_time: f64, pattern_id: usize) -> Self {
        Self {
            switch_time,
            pattern_id,
        }
    }

    pub fn is_background(&self) -> bool {
        self.pattern_id == BACKGROUND_PATTERN
    }
}

/// Uniformly distributed phase length in `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformDuration {
    pub min: f64,
    pub max: f64,
}

impl UniformDuration {
    pub fn new(min: f64, max: f64) -> ControlResult<Self> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || max < min {
            return Err(ControlError::InvalidParameter(format!(
                "phase duration bounds must satisfy 0 < min <= max, got [{}, {}]",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.min + rng.gen::<f64>() * (self.max - self.min)
    }
}

/// Ordered, immutable sequence of phase switches
#[derive(Debug, Clone, PartialEq)]
pub struct PatternPlan {
    entries: Vec<PatternPlanEntry>,
}

impl PatternPlan {
    /// Generate a plan covering `total_time`
    ///
    /// Starts with background at t=0, then appends pattern/background pairs
    /// until the last switch time reaches `total_time`. Pattern ids are drawn
    /// uniformly from `1..=n_patterns`; repeats are allowed.
    pub fn generate<R, P, B>(
        total_time: f64,
        n_patterns: usize,
        rng: &mut R,
        mut pattern_duration: P,
        mut background_duration: B,
    ) -> ControlResult<Self>
    where
        R: Rng + ?Sized,
        P: FnMut(&mut R) -> f64,
        B: FnMut(&mut R) -> f64,
    {
        if n_patterns == 0 {
            return Err(ControlError::InvalidParameter(
                "a plan needs at least one pattern".to_string(),
            ));
        }
        if !total_time.is_finite() {
            return Err(ControlError::InvalidParameter(format!(
                "total_time must be finite, got {}",
                total_time
            )));
        }

        let mut entries = vec![PatternPlanEntry::new(0.0, BACKGROUND_PATTERN)];
        let mut t = 0.0;
        while t < total_time {
            t = next_switch(t, pattern_duration(rng))?;
            let pattern_id = rng.gen_range(1..=n_patterns);
            entries.push(PatternPlanEntry::new(t, pattern_id));

            t = next_switch(t, background_duration(rng))?;
            entries.push(PatternPlanEntry::new(t, BACKGROUND_PATTERN));
        }

        Ok(Self { entries })
    }

    /// Generate a plan with uniform phase durations from the pattern config
    pub fn from_config<R: Rng + ?Sized>(
        patterns: &PatternsConfig,
        total_time: f64,
        rng: &mut R,
    ) -> ControlResult<Self> {
        let durations =
            UniformDuration::new(patterns.min_phase_duration, patterns.max_phase_duration)?;
        Self::generate(
            total_time,
            patterns.n_patterns,
            rng,
            |rng| durations.sample(rng),
            |rng| durations.sample(rng),
        )
    }

    /// Build a plan from explicit entries
    ///
    /// # Errors
    /// `InvalidParameter` if switch times are negative, not finite, or not
    /// strictly increasing.
    pub fn from_entries(entries: Vec<PatternPlanEntry>) -> ControlResult<Self> {
        if let Some(entry) = entries.iter().find(|entry| !entry.switch_time.is_finite()) {
            return Err(ControlError::InvalidParameter(format!(
                "switch times must be finite, got {}",
                entry.switch_time
            )));
        }
        if let Some(first) = entries.first() {
            if first.switch_time < 0.0 {
                return Err(ControlError::InvalidParameter(format!(
                    "first switch time must be >= 0, got {}",
                    first.switch_time
                )));
            }
        }
        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[1].switch_time <= pair[0].switch_time)
        {
            return Err(ControlError::InvalidParameter(format!(
                "switch times must be strictly increasing: {} then {}",
                pair[0].switch_time, pair[1].switch_time
            )));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PatternPlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_cursor(self) -> PlanCursor {
        PlanCursor {
            plan: self,
            position: 0,
        }
    }
}

fn next_switch(t: f64, duration: f64) -> ControlResult<f64> {
    let next = t + duration;
    // also rejects durations too small to move t forward
    if !duration.is_finite() || next <= t {
        return Err(ControlError::InvalidParameter(format!(
            "phase duration must be positive and finite, got {}",
            duration
        )));
    }
    Ok(next)
}

/// Forward-only, non-restartable position in a [`PatternPlan`]
#[derive(Debug, Clone)]
pub struct PlanCursor {
    plan: PatternPlan,
    position: usize,
}

impl PlanCursor {
    /// The entry [`advance`](Self::advance) would return next
    pub fn peek_next(&self) -> Option<&PatternPlanEntry> {
        self.plan.entries.get(self.position)
    }

    /// Consume and return the next entry; `None` once the plan is exhausted
    pub fn advance(&mut self) -> Option<PatternPlanEntry> {
        let entry = self.plan.entries.get(self.position).copied();
        if entry.is_some() {
            self.position += 1;
        }
        entry
    }

    pub fn remaining(&self) -> usize {
        self.plan.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn test_plan_starts_with_background_at_zero() {
        let mut rng = create_rng(Some(1));
        let plan = PatternPlan::generate(5.0, 3, &mut rng, |_| 0.5, |_| 0.25).unwrap();

        assert_eq!(plan.entries()[0], PatternPlanEntry::new(0.0, BACKGROUND_PATTERN));
    }

    #[test]
    fn test_plan_covers_total_time_with_fixed_durations() {
        let mut rng = create_rng(Some(1));
        let plan = PatternPlan::generate(2.0, 2, &mut rng, |_| 0.5, |_| 0.5).unwrap();

        let times: Vec<f64> = plan.entries().iter().map(|e| e.switch_time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert!(plan.entries()[1].pattern_id >= 1 && plan.entries()[1].pattern_id <= 2);
        assert!(plan.entries()[4].is_background());
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let mut rng = create_rng(Some(1));
        let result = PatternPlan::generate(1.0, 2, &mut rng, |_| 0.0, |_| 0.5);
        assert!(matches!(result, Err(ControlError::InvalidParameter(_))));
    }

    #[test]
    fn test_zero_patterns_is_rejected() {
        let mut rng = create_rng(Some(1));
        assert!(PatternPlan::generate(1.0, 0, &mut rng, |_| 0.5, |_| 0.5).is_err());
    }

    #[test]
    fn test_uniform_duration_bounds() {
        let durations = UniformDuration::new(0.5, 1.0).unwrap();
        let mut rng = create_rng(Some(3));
        for _ in 0..1000 {
            let d = durations.sample(&mut rng);
            assert!((0.5..1.0).contains(&d));
        }
        assert!(UniformDuration::new(1.0, 0.5).is_err());
        assert!(UniformDuration::new(0.0, 0.5).is_err());
    }

    #[test]
    fn test_from_entries_rejects_unordered() {
        let entries = vec![PatternPlanEntry::new(0.0, 0), PatternPlanEntry::new(0.0, 1)];
        assert!(PatternPlan::from_entries(entries).is_err());
    }

    #[test]
    fn test_from_entries_rejects_non_finite() {
        for bad in [f64::INFINITY, f64::NAN] {
            let single = vec![PatternPlanEntry::new(bad, 0)];
            assert!(matches!(
                PatternPlan::from_entries(single),
                Err(ControlError::InvalidParameter(_))
            ));

            let trailing = vec![PatternPlanEntry::new(0.0, 0), PatternPlanEntry::new(bad, 1)];
            assert!(PatternPlan::from_entries(trailing).is_err());
        }
    }

    #[test]
    fn test_cursor_is_forward_only() {
        let plan = PatternPlan::from_entries(vec![
            PatternPlanEntry::new(0.0, 0),
            PatternPlanEntry::new(1.0, 2),
        ])
        .unwrap();
        let mut cursor = plan.into_cursor();

        assert_eq!(cursor.peek_next().map(|e| e.pattern_id), Some(0));
        assert_eq!(cursor.peek_next().map(|e| e.pattern_id), Some(0));
        assert_eq!(cursor.advance().map(|e| e.pattern_id), Some(0));
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.advance().map(|e| e.switch_time), Some(1.0));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.peek_next(), None);
    }
}
