// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sell execution for closing positions.

use super::TradeExecutor;
use crate::error::BotError;
use crate::rpc::{Chain, TradeCall};
use crate::trade_history::{AttemptId, TradeSide};
use alloy::primitives::{Address, TxHash, U256};
use tracing::{debug, error, info};

/// What a sell evaluation ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum SellOutcome {
    /// Wallet holds none of the token.
    NothingToSell,
    /// Price has not reached the profit threshold yet.
    Hold { ratio: f64 },
    /// Sold the full balance.
    Sold { tx_hash: TxHash, ratio: f64 },
}

/// `current / buy`; a non-positive buy price never reaches any target.
pub fn profit_ratio(buy_price: f64, current_price: f64) -> f64 {
    if buy_price > 0.0 {
        current_price / buy_price
    } else {
        0.0
    }
}

impl<C: Chain> TradeExecutor<C> {
    /// Sell the whole balance of `token` if its price is up by the profit threshold.
    ///
    /// Balance or price read failures abort before anything is submitted.
    pub async fn sell(&self, token: Address, buy_price: f64) -> Result<SellOutcome, BotError> {
        let balance = self.market.check_balance(token).await?;
        if balance.is_zero() {
            debug!("No balance of {:?}, nothing to sell", token);
            return Ok(SellOutcome::NothingToSell);
        }

        let current_price = self.market.token_price(token).await?;
        let ratio = profit_ratio(buy_price, current_price);

        if ratio < self.profit_threshold {
            info!(
                "⏳ Waiting for better profit on {:?}... Current margin: {:.4}x (target {:.2}x)",
                token, ratio, self.profit_threshold
            );
            return Ok(SellOutcome::Hold { ratio });
        }

        info!(
            "🔴 Executing SELL: {} of {:?} at {:.4}x",
            balance.as_f64(),
            token,
            ratio
        );

        let attempt = self.journal.open(token, TradeSide::Sell);
        match self.try_sell(token, balance.raw, attempt).await {
            Ok(tx_hash) => {
                info!("✅ SELL SUCCESS: {:?} - tx: {:?}", token, tx_hash);
                Ok(SellOutcome::Sold { tx_hash, ratio })
            }
            Err(e) => {
                error!("❌ SELL FAILED: {:?} - {}", token, e);
                self.fail(attempt, &e);
                Err(e)
            }
        }
    }

    async fn try_sell(
        &self,
        token: Address,
        amount: U256,
        attempt: AttemptId,
    ) -> Result<TxHash, BotError> {
        self.ensure_allowance(token, amount).await?;

        // Build swap path: Token -> WBNB
        let path = vec![token, self.wbnb];

        let amounts = self.chain.amounts_out(amount, &path).await?;
        let expected = amounts.last().copied().unwrap_or_default();
        let min_out = self.min_out(expected);
        debug!("Expected BNB out: {}, Min: {}", expected, min_out);

        let call = TradeCall::SellForNative {
            amount_in: amount,
            min_out,
            path,
            recipient: self.chain.wallet_address(),
            deadline: self.deadline(),
        };

        let confirmation = self.send_and_confirm(call, self.sell_gas, Some(attempt)).await?;
        Ok(confirmation.tx_hash)
    }

    /// Approve the router for `amount` unless it already may spend that much.
    async fn ensure_allowance(&self, token: Address, amount: U256) -> Result<(), BotError> {
        let router = self.chain.router_address();
        let current = self
            .chain
            .allowance(token, self.chain.wallet_address(), router)
            .await?;
        if current >= amount {
            return Ok(());
        }

        let call = TradeCall::Approve {
            token,
            spender: router,
            amount,
        };
        self.send_and_confirm(call, self.sell_gas, None).await?;
        info!("✅ Approval confirmed");
        Ok(())
    }
}
