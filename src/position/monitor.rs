// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Re-evaluates open positions for a profitable exit.
//!
//! A position is first evaluated `sell_delay_secs` after its buy and then
//! every `check_interval_secs` until it is sold or has used up
//! `max_sell_checks` evaluations. With `max_sell_checks = 1` each position
//! gets exactly one check, at the fixed delay.

use crate::config::Config;
use crate::executor::{SellOutcome, TradeExecutor};
use crate::position::{now_millis, CheckSchedule, PositionTracker};
use crate::rpc::Chain;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Duration;
use tracing::{info, warn};

/// Longest sleep between wake-ups while no check is due sooner.
const IDLE_WAKE_MS: u64 = 1_000;

/// When and how often positions are evaluated.
#[derive(Debug, Clone, Copy)]
pub struct SellPolicy {
    pub sell_delay_secs: u64,
    pub check_interval_secs: u64,
    pub max_sell_checks: u32,
}

impl SellPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sell_delay_secs: config.sell_delay_secs,
            check_interval_secs: config.check_interval_secs,
            max_sell_checks: config.max_sell_checks,
        }
    }

    pub fn schedule(&self) -> CheckSchedule {
        CheckSchedule {
            first_after_ms: self.sell_delay_secs * 1000,
            every_ms: self.check_interval_secs * 1000,
        }
    }
}

pub struct PositionMonitor<C: Chain> {
    executor: Arc<TradeExecutor<C>>,
    positions: Arc<Mutex<PositionTracker>>,
    policy: SellPolicy,
}

impl<C: Chain> PositionMonitor<C> {
    pub fn new(
        executor: Arc<TradeExecutor<C>>,
        positions: Arc<Mutex<PositionTracker>>,
        policy: SellPolicy,
    ) -> Self {
        Self {
            executor,
            positions,
            policy,
        }
    }

    /// Run a sell evaluation for every position that is due at `now_ms`.
    pub async fn check_due(&self, now_ms: u64) {
        // Snapshot so the lock is not held across chain calls.
        let due = self.positions.lock().await.due(now_ms);

        for position in due {
            let token = position.token;
            let result = self.executor.sell(token, position.buy_price).await;

            let mut tracker = self.positions.lock().await;
            match result {
                Ok(SellOutcome::Sold { tx_hash, ratio }) => {
                    tracker.remove(&token);
                    info!(
                        "💰 Position {:?} closed at {:.4}x (tx: {:?})",
                        token, ratio, tx_hash
                    );
                }
                Ok(SellOutcome::NothingToSell) => {
                    tracker.remove(&token);
                    info!("📊 Position {:?} closed, nothing left to sell", token);
                }
                Ok(SellOutcome::Hold { .. }) | Err(_) => {
                    if let Err(e) = &result {
                        warn!("⚠️ Sell evaluation for {:?} failed: {}", token, e);
                    }
                    let checks = tracker.record_check(&token, now_ms).unwrap_or(u32::MAX);
                    if checks >= self.policy.max_sell_checks {
                        tracker.remove(&token);
                        warn!(
                            "🛑 Abandoning position {:?} after {} evaluation(s) without a profitable exit",
                            token, checks
                        );
                    }
                }
            }
        }
    }

    /// How long to sleep before the next check is due.
    async fn wait_time(&self, now_ms: u64) -> Duration {
        let next = self.positions.lock().await.next_check_at();
        Duration::from_millis(until_next_check(next, now_ms))
    }
}

/// Milliseconds until `next_check_at`, capped so newly opened positions are picked up.
fn until_next_check(next_check_at: Option<u64>, now_ms: u64) -> u64 {
    next_check_at
        .map(|at| at.saturating_sub(now_ms))
        .unwrap_or(IDLE_WAKE_MS)
        .min(IDLE_WAKE_MS)
}

/// Spawn position monitor background task.
pub fn spawn_monitor<C: Chain + 'static>(
    monitor: Arc<PositionMonitor<C>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "📊 Position monitor started (first check {}s after buy, then every {}s, up to {} checks)",
            monitor.policy.sell_delay_secs,
            monitor.policy.check_interval_secs,
            monitor.policy.max_sell_checks
        );

        loop {
            let wait = monitor.wait_time(now_millis()).await;
            tokio::time::sleep(wait).await;

            monitor.check_due(now_millis()).await;
        }
    })
}
