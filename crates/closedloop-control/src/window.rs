// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sliding-window rate estimation over observed output spikes.
//!
//! Key semantics:
//! - Oldest-first: timestamps are kept sorted ascending.
//! - Explicit eviction: stale entries only leave on [`WindowedChannelBuffer::evict`],
//!   which the control loop calls once per tick before reading rates.
//! - Derived rate: `len / window_length`, never stored.

use std::collections::VecDeque;

use crate::error::{ControlError, ControlResult};

/// Recent spike timestamps of one output channel
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedChannelBuffer {
    window_length: f64,
    times: VecDeque<f64>,
}

impl WindowedChannelBuffer {
    pub fn new(window_length: f64) -> ControlResult<Self> {
        if !window_length.is_finite() || window_length <= 0.0 {
            return Err(ControlError::InvalidParameter(format!(
                "window_length must be positive, got {}",
                window_length
            )));
        }
        Ok(Self {
            window_length,
            times: VecDeque::new(),
        })
    }

    /// Record one spike
    ///
    /// Appends in the common in-order case; a late timestamp is placed at
    /// its sorted position so eviction from the front stays correct.
    /// Non-finite timestamps could never be evicted and are dropped;
    /// returns whether the timestamp was stored.
    pub fn insert(&mut self, timestamp: f64) -> bool {
        if !timestamp.is_finite() {
            return false;
        }
        match self.times.back() {
            Some(&last) if timestamp < last => {
                let position = self.times.partition_point(|&t| t <= timestamp);
                self.times.insert(position, timestamp);
            }
            _ => self.times.push_back(timestamp),
        }
        true
    }

    /// Drop every timestamp `<= current_time - window_length`
    pub fn evict(&mut self, current_time: f64) -> usize {
        let cutoff = current_time - self.window_length;
        let mut evicted = 0;
        while self.times.front().is_some_and(|&t| t <= cutoff) {
            self.times.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.times.clear();
    }

    /// Spikes per second over the window
    pub fn rate(&self) -> f64 {
        self.times.len() as f64 / self.window_length
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn window_length(&self) -> f64 {
        self.window_length
    }

    /// Stored timestamps, oldest first
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.times.iter().copied()
    }
}

/// One windowed buffer per output channel
///
/// Incoming events are routed to buffer `channel_index % len`, so an input
/// port wider than the number of buffers folds onto them.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedBufferSet {
    buffers: Vec<WindowedChannelBuffer>,
}

impl WindowedBufferSet {
    pub fn new(n_channels: usize, window_length: f64) -> ControlResult<Self> {
        if n_channels == 0 {
            return Err(ControlError::InvalidParameter(
                "at least one output channel is required".to_string(),
            ));
        }
        let buffers = (0..n_channels)
            .map(|_| WindowedChannelBuffer::new(window_length))
            .collect::<ControlResult<Vec<_>>>()?;
        Ok(Self { buffers })
    }

    pub fn route(&self, channel_index: usize) -> usize {
        channel_index % self.buffers.len()
    }

    /// Record an observed output spike on `channel_index`
    pub fn insert_event(&mut self, timestamp: f64, channel_index: usize) -> bool {
        let buffer = self.route(channel_index);
        self.buffers[buffer].insert(timestamp)
    }

    pub fn evict_all(&mut self, current_time: f64) -> usize {
        self.buffers
            .iter_mut()
            .map(|buffer| buffer.evict(current_time))
            .sum()
    }

    pub fn clear_all(&mut self) {
        self.buffers.iter_mut().for_each(WindowedChannelBuffer::clear);
    }

    /// Current rate of every buffer, in channel order
    pub fn rates(&self) -> Vec<f64> {
        self.buffers.iter().map(WindowedChannelBuffer::rate).collect()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn total_events(&self) -> usize {
        self.buffers.iter().map(WindowedChannelBuffer::len).sum()
    }

    pub fn buffer(&self, index: usize) -> Option<&WindowedChannelBuffer> {
        self.buffers.get(index)
    }
}
