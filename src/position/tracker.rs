// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Position tracking for open trades.
//!
//! Positions are held in memory only and do not survive a restart. Times are
//! unix milliseconds.

use alloy::primitives::Address;
use std::collections::HashMap;
use tracing::{debug, info};

/// Current unix time in milliseconds.
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// When a position is first evaluated and how often after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSchedule {
    pub first_after_ms: u64,
    pub every_ms: u64,
}

/// A single position (token holding).
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub token: Address,
    pub buy_price: f64,
    pub bought_at_ms: u64,
    /// Sell evaluations already run against this position.
    pub checks: u32,
    pub next_check_at_ms: u64,
}

impl Position {
    /// A fresh position; the tracker sets the first check time when it is added.
    pub fn new(token: Address, buy_price: f64, bought_at_ms: u64) -> Self {
        Self {
            token,
            buy_price,
            bought_at_ms,
            checks: 0,
            next_check_at_ms: bought_at_ms,
        }
    }
}

/// Manages all open positions.
#[derive(Debug)]
pub struct PositionTracker {
    positions: HashMap<Address, Position>,
    schedule: CheckSchedule,
}

impl PositionTracker {
    /// Create a new position tracker.
    pub fn new(schedule: CheckSchedule) -> Self {
        Self {
            positions: HashMap::new(),
            schedule,
        }
    }

    /// Add a new position, replacing any earlier one for the same token.
    ///
    /// Returns the position as stored, with its first check time set.
    pub fn add(&mut self, mut position: Position) -> Position {
        position.next_check_at_ms = position.bought_at_ms + self.schedule.first_after_ms;
        info!(
            "📊 Opening position: {:?} at price {} (first check in {}s)",
            position.token,
            position.buy_price,
            self.schedule.first_after_ms / 1000
        );
        self.positions.insert(position.token, position.clone());
        position
    }

    /// Remove a position.
    pub fn remove(&mut self, token: &Address) -> Option<Position> {
        self.positions.remove(token)
    }

    #[cfg(test)]
    pub fn get(&self, token: &Address) -> Option<&Position> {
        self.positions.get(token)
    }

    /// Record one more sell evaluation made at `now_ms` and schedule the next.
    /// Returns the new count.
    pub fn record_check(&mut self, token: &Address, now_ms: u64) -> Option<u32> {
        let every = self.schedule.every_ms;
        let pos = self.positions.get_mut(token)?;
        pos.checks += 1;
        pos.next_check_at_ms = (pos.next_check_at_ms + every).max(now_ms + 1);
        debug!(
            "Position {:?} evaluated {} time(s), next at {}",
            token, pos.checks, pos.next_check_at_ms
        );
        Some(pos.checks)
    }

    /// Positions whose next check time has been reached at `now_ms`.
    pub fn due(&self, now_ms: u64) -> Vec<Position> {
        self.positions
            .values()
            .filter(|p| p.next_check_at_ms <= now_ms)
            .cloned()
            .collect()
    }

    /// Earliest pending check time, if any position is open.
    pub fn next_check_at(&self) -> Option<u64> {
        self.positions.values().map(|p| p.next_check_at_ms).min()
    }

    /// Get number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
