// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Property tests for the invariants of the control components.

use std::collections::VecDeque;

use closedloop_control::{
    create_rng, generate_rate_pattern, PatternPlan, RingBuffer, SpikeGenerator,
    WindowedChannelBuffer, BACKGROUND_PATTERN,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn rate_patterns_stay_within_bounds(
        seed in any::<u64>(),
        n_channels in 1usize..200,
        shape in 0.05f64..5.0,
        scale in 0.1f64..5.0,
        min_val in 0.0f64..10.0,
        span in 0.0f64..100.0,
    ) {
        let max_val = min_val + span;
        let mut rng = create_rng(Some(seed));
        let rates = generate_rate_pattern(n_channels, shape, scale, min_val, max_val, &mut rng).unwrap();

        prop_assert_eq!(rates.len(), n_channels);
        prop_assert!(rates.iter().all(|r| *r >= min_val && *r <= max_val));
    }

    #[test]
    fn window_rate_is_count_over_length(
        mut times in prop::collection::vec(0.0f64..10.0, 0..100),
        window in 0.01f64..5.0,
        now in 0.0f64..20.0,
    ) {
        times.sort_by(f64::total_cmp);
        let mut buffer = WindowedChannelBuffer::new(window).unwrap();
        for t in &times {
            buffer.insert(*t);
        }
        buffer.evict(now);

        prop_assert!(buffer.rate() >= 0.0);
        prop_assert_eq!(buffer.rate(), buffer.len() as f64 / window);
        prop_assert!(buffer.times().all(|t| t > now - window));
    }

    #[test]
    fn evict_twice_is_evict_once(
        times in prop::collection::vec(0.0f64..10.0, 0..100),
        window in 0.01f64..5.0,
        now in 0.0f64..20.0,
    ) {
        let mut buffer = WindowedChannelBuffer::new(window).unwrap();
        for t in &times {
            buffer.insert(*t);
        }
        buffer.evict(now);
        let once: Vec<f64> = buffer.times().collect();
        prop_assert_eq!(buffer.evict(now), 0);
        let twice: Vec<f64> = buffer.times().collect();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn plans_increase_and_alternate(
        seed in any::<u64>(),
        total_time in 0.1f64..20.0,
        n_patterns in 1usize..10,
        min_duration in 0.01f64..1.0,
        extra in 0.0f64..1.0,
    ) {
        let mut rng = create_rng(Some(seed));
        let max_duration = min_duration + extra;
        let duration = move |rng: &mut closedloop_control::ControlRng| {
            use rand::Rng;
            min_duration + rng.gen::<f64>() * (max_duration - min_duration)
        };
        let plan = PatternPlan::generate(total_time, n_patterns, &mut rng, duration, duration).unwrap();
        let entries = plan.entries();

        prop_assert_eq!(entries[0].switch_time, 0.0);
        prop_assert!(entries.windows(2).all(|pair| pair[0].switch_time < pair[1].switch_time));
        for (index, entry) in entries.iter().enumerate() {
            if index % 2 == 0 {
                prop_assert_eq!(entry.pattern_id, BACKGROUND_PATTERN);
            } else {
                prop_assert!(entry.pattern_id >= 1 && entry.pattern_id <= n_patterns);
            }
        }
        prop_assert!(entries[entries.len() - 1].switch_time >= total_time);
    }

    #[test]
    fn zero_rates_never_spike(seed in any::<u64>(), n_channels in 0usize..50) {
        let generator = SpikeGenerator::new(0.001, 0.001).unwrap();
        let mut rng = create_rng(Some(seed));
        let counts = generator.spikes_from_rate(&vec![0.0; n_channels], &mut rng).unwrap();
        prop_assert_eq!(counts, vec![0; n_channels]);
    }

    #[test]
    fn ring_buffer_keeps_newest(capacity in 1usize..16, values in prop::collection::vec(any::<u32>(), 0..64)) {
        let mut ring = RingBuffer::new(capacity);
        let mut model = VecDeque::new();
        for value in values {
            ring.push(value);
            model.push_back(value);
            if model.len() > capacity {
                model.pop_front();
            }
        }
        prop_assert_eq!(ring.iter().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(ring.oldest(), model.front().copied());
        prop_assert_eq!(ring.newest(), model.back().copied());
    }
}
