// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-pattern target firing rates for the input channels.
//!
//! Row 0 is the constant background rate; rows `1..=n_patterns` are drawn once
//! at setup and never change afterwards.

use rand::Rng;
use rand_distr::{Distribution, Gamma};

use crate::error::{ControlError, ControlResult};
use crate::plan::BACKGROUND_PATTERN;
use closedloop_config::PatternsConfig;

/// Draw one rate per channel: `clip(max_val * Gamma(shape, scale), min_val, max_val)`
pub fn generate_rate_pattern<R: Rng + ?Sized>(
    n_channels: usize,
    shape: f64,
    scale: f64,
    min_val: f64,
    max_val: f64,
    rng: &mut R,
) -> ControlResult<Vec<f64>> {
    if min_val.is_nan() || max_val.is_nan() || min_val < 0.0 || max_val < min_val {
        return Err(ControlError::InvalidParameter(format!(
            "rate bounds must satisfy 0 <= min <= max, got [{}, {}]",
            min_val, max_val
        )));
    }
    let gamma = Gamma::new(shape, scale).map_err(|e| {
        ControlError::InvalidParameter(format!(
            "gamma(shape={}, scale={}): {}",
            shape, scale, e
        ))
    })?;

    Ok((0..n_channels)
        .map(|_| (max_val * gamma.sample(rng)).clamp(min_val, max_val))
        .collect())
}

/// Rate vectors indexed by pattern id
#[derive(Debug, Clone, PartialEq)]
pub struct RatePatternTable {
    rows: Vec<Vec<f64>>,
}

impl RatePatternTable {
    /// Background row plus one freshly drawn row per pattern
    pub fn generate<R: Rng + ?Sized>(patterns: &PatternsConfig, rng: &mut R) -> ControlResult<Self> {
        let mut rows = Vec::with_capacity(patterns.n_patterns + 1);
        rows.push(vec![patterns.background_rate; patterns.n_input_channels]);
        for _ in 0..patterns.n_patterns {
            rows.push(generate_rate_pattern(
                patterns.n_input_channels,
                patterns.gamma_shape,
                patterns.gamma_scale,
                patterns.background_rate,
                patterns.max_rate,
                rng,
            )?);
        }
        Ok(Self { rows })
    }

    /// Build a table from explicit rows; row 0 is the background
    pub fn from_rows(rows: Vec<Vec<f64>>) -> ControlResult<Self> {
        let width = match rows.first() {
            Some(background) => background.len(),
            None => {
                return Err(ControlError::InvalidParameter(
                    "rate table needs at least the background row".to_string(),
                ))
            }
        };
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(ControlError::ChannelCountMismatch {
                expected: width,
                actual: row.len(),
            });
        }
        if rows.iter().flatten().any(|rate| !rate.is_finite() || *rate < 0.0) {
            return Err(ControlError::InvalidParameter(
                "rates must be finite and non-negative".to_string(),
            ));
        }
        Ok(Self { rows })
    }

    pub fn row(&self, pattern_id: usize) -> ControlResult<&[f64]> {
        self.rows
            .get(pattern_id)
            .map(Vec::as_slice)
            .ok_or(ControlError::UnknownPattern {
                pattern_id,
                n_patterns: self.n_patterns(),
            })
    }

    pub fn background(&self) -> &[f64] {
        &self.rows[BACKGROUND_PATTERN]
    }

    /// Number of stimulus patterns, not counting the background
    pub fn n_patterns(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn n_channels(&self) -> usize {
        self.rows[BACKGROUND_PATTERN].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn test_generated_rates_are_clipped() {
        let mut rng = create_rng(Some(5));
        let rates = generate_rate_pattern(500, 0.2, 0.8, 2.0, 60.0, &mut rng).unwrap();

        assert_eq!(rates.len(), 500);
        assert!(rates.iter().all(|r| (2.0..=60.0).contains(r)));
        // shape 0.2 puts most of the mass near zero
        assert!(rates.iter().any(|r| *r == 2.0));
    }

    #[test]
    fn test_invalid_gamma_parameters() {
        let mut rng = create_rng(Some(5));
        let result = generate_rate_pattern(10, -1.0, 0.8, 0.0, 1.0, &mut rng);
        assert!(matches!(result, Err(ControlError::InvalidParameter(_))));
    }

    #[test]
    fn test_table_layout() {
        let patterns = PatternsConfig {
            n_patterns: 3,
            n_input_channels: 20,
            ..PatternsConfig::default()
        };
        let mut rng = create_rng(Some(9));
        let table = RatePatternTable::generate(&patterns, &mut rng).unwrap();

        assert_eq!(table.n_patterns(), 3);
        assert_eq!(table.n_channels(), 20);
        assert!(table.background().iter().all(|r| *r == patterns.background_rate));
        assert_eq!(table.row(3).unwrap().len(), 20);
        assert!(matches!(
            table.row(4),
            Err(ControlError::UnknownPattern { pattern_id: 4, n_patterns: 3 })
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let result = RatePatternTable::from_rows(vec![vec![1.0, 1.0], vec![5.0]]);
        assert!(matches!(
            result,
            Err(ControlError::ChannelCountMismatch { expected: 2, actual: 1 })
        ));
    }
}
