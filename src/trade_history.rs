// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trade attempt tracking and the shutdown summary.
//!
//! Kept in memory only; the journal is gone when the process exits.

use alloy::primitives::{Address, TxHash};
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Lifecycle of one trade attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeState {
    Idle,
    Submitted(TxHash),
    Confirmed(TxHash),
    Failed(String),
}

impl TradeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed(_) | Self::Failed(_))
    }
}

/// A record of a single trade attempt (buy or sell).
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub token: Address,
    pub side: TradeSide,
    pub state: TradeState,
    pub timestamp: u64,
}

/// Identifies a record in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptId(usize);

#[derive(Debug, Default)]
pub struct TradeJournal {
    trades: Mutex<Vec<TradeRecord>>,
}

impl TradeJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a new attempt in the `Idle` state.
    pub fn open(&self, token: Address, side: TradeSide) -> AttemptId {
        let mut trades = self.lock();
        trades.push(TradeRecord {
            token,
            side,
            state: TradeState::Idle,
            timestamp: chrono::Utc::now().timestamp() as u64,
        });
        AttemptId(trades.len() - 1)
    }

    /// Move an attempt forward. Terminal states are never left.
    pub fn advance(&self, id: AttemptId, state: TradeState) {
        if let Some(record) = self.lock().get_mut(id.0) {
            if !record.state.is_terminal() {
                record.state = state;
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: AttemptId) -> Option<TradeRecord> {
        self.lock().get(id.0).cloned()
    }

    /// Count attempts per outcome.
    pub fn summary(&self) -> TradeSummary {
        let mut summary = TradeSummary::default();
        for trade in self.lock().iter() {
            let (confirmed, failed) = match trade.side {
                TradeSide::Buy => (&mut summary.buys_confirmed, &mut summary.buys_failed),
                TradeSide::Sell => (&mut summary.sells_confirmed, &mut summary.sells_failed),
            };
            match trade.state {
                TradeState::Confirmed(_) => *confirmed += 1,
                TradeState::Failed(_) => *failed += 1,
                _ => summary.pending += 1,
            }
        }
        summary
    }

    /// Failed attempts, oldest first.
    pub fn failures(&self) -> Vec<TradeRecord> {
        self.lock()
            .iter()
            .filter(|t| matches!(t.state, TradeState::Failed(_)))
            .cloned()
            .collect()
    }

    /// Log summary on shutdown.
    pub fn log_summary(&self) {
        let summary = self.summary();
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("📊 Trade Summary:");
        info!("   Buys: {} confirmed, {} failed", summary.buys_confirmed, summary.buys_failed);
        info!("   Sells: {} confirmed, {} failed", summary.sells_confirmed, summary.sells_failed);
        info!("   In flight: {}", summary.pending);
        for trade in self.failures() {
            if let TradeState::Failed(reason) = &trade.state {
                info!(
                    "   ❌ {:?} {:?} at {}: {}",
                    trade.side,
                    trade.token,
                    format_time(trade.timestamp),
                    reason
                );
            }
        }
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TradeRecord>> {
        self.trades.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn format_time(unix_secs: u64) -> String {
    chrono::DateTime::from_timestamp(unix_secs as i64, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| unix_secs.to_string())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TradeSummary {
    pub buys_confirmed: usize,
    pub buys_failed: usize,
    pub sells_confirmed: usize,
    pub sells_failed: usize,
    pub pending: usize,
}
