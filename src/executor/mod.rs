// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transaction execution module.

pub mod gas;
pub mod sell;
pub mod swap;

pub use gas::GasStrategy;
pub use sell::SellOutcome;

use crate::config::Config;
use crate::error::BotError;
use crate::market::{gwei, MarketReader};
use crate::rpc::{Chain, Confirmation, GasParams, TradeCall};
use crate::trade_history::{AttemptId, TradeJournal, TradeState};
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, info};

const BPS: u64 = 10_000;

/// Submits buy and sell swaps through the router for the bot wallet.
pub struct TradeExecutor<C: Chain> {
    chain: Arc<C>,
    market: Arc<MarketReader<C>>,
    journal: Arc<TradeJournal>,
    wbnb: Address,
    buy_amount: U256,
    slippage_bps: u64,
    profit_threshold: f64,
    deadline_secs: u64,
    gas_limit: u64,
    buy_gas: GasStrategy,
    sell_gas: GasStrategy,
}

impl<C: Chain> TradeExecutor<C> {
    pub fn new(
        chain: Arc<C>,
        market: Arc<MarketReader<C>>,
        journal: Arc<TradeJournal>,
        config: &Config,
    ) -> Self {
        Self {
            chain,
            market,
            journal,
            wbnb: config.wbnb_address,
            buy_amount: config.buy_amount,
            slippage_bps: config.slippage_bps().min(BPS),
            profit_threshold: config.profit_threshold,
            deadline_secs: config.deadline_secs,
            gas_limit: config.gas_limit,
            buy_gas: GasStrategy::from_multiplier(config.gas_multiplier),
            sell_gas: GasStrategy::Normal, // Use normal for sells, not aggressive
        }
    }

    pub fn market(&self) -> &MarketReader<C> {
        &self.market
    }

    fn deadline(&self) -> U256 {
        U256::from(chrono::Utc::now().timestamp() as u64 + self.deadline_secs)
    }

    /// Lowest acceptable output for a quoted `expected` amount.
    fn min_out(&self, expected: U256) -> U256 {
        apply_slippage(expected, self.slippage_bps)
    }

    /// Price gas, send `call`, and wait for it to be included.
    ///
    /// A mined-but-reverted transaction is an error.
    async fn send_and_confirm(
        &self,
        call: TradeCall,
        strategy: GasStrategy,
        attempt: Option<AttemptId>,
    ) -> Result<Confirmation, BotError> {
        let network_price = self.market.current_gas_price().await?;
        let gas = GasParams {
            gas_limit: self.gas_limit,
            gas_price: strategy.bid(network_price),
        };
        info!(
            "⛽ Gas: network {} gwei, bidding {} gwei ({:?})",
            gwei(network_price),
            gwei(gas.gas_price),
            strategy
        );

        let label = call.label();
        let tx_hash = self.chain.send(call, gas).await?;
        if let Some(id) = attempt {
            self.journal.advance(id, TradeState::Submitted(tx_hash));
        }
        info!("📤 {} transaction sent: {:?}", label, tx_hash);

        let confirmation = self.chain.confirm(tx_hash).await?;
        if !confirmation.success {
            return Err(BotError::TxFailed(tx_hash));
        }
        if let Some(id) = attempt {
            self.journal.advance(id, TradeState::Confirmed(tx_hash));
        }
        debug!(
            "{} confirmed in block {:?}, gas used {}",
            label, confirmation.block_number, confirmation.gas_used
        );

        Ok(confirmation)
    }

    fn fail(&self, attempt: AttemptId, err: &BotError) {
        self.journal.advance(attempt, TradeState::Failed(err.to_string()));
    }
}

/// `expected * (1 - bps / 10_000)`, rounded down.
pub fn apply_slippage(expected: U256, slippage_bps: u64) -> U256 {
    expected * U256::from(BPS - slippage_bps.min(BPS)) / U256::from(BPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slippage_reduces_expected_output() {
        assert_eq!(apply_slippage(U256::from(1_000u64), 500), U256::from(950u64));
        assert_eq!(apply_slippage(U256::from(1_000u64), 0), U256::from(1_000u64));
        assert_eq!(apply_slippage(U256::from(999u64), 100), U256::from(989u64));
    }

    #[test]
    fn full_slippage_accepts_anything() {
        assert_eq!(apply_slippage(U256::from(1_000u64), 20_000), U256::ZERO);
    }
}
