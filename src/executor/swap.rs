// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swap execution for buying tokens.

use super::TradeExecutor;
use crate::error::BotError;
use crate::rpc::{Chain, TradeCall};
use crate::trade_history::{AttemptId, TradeSide};
use alloy::primitives::{Address, TxHash, U256};
use tracing::{debug, error, info};

/// Result of a confirmed buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyReceipt {
    pub token: Address,
    pub tx_hash: TxHash,
    pub spent: U256,
    pub gas_used: u64,
}

impl<C: Chain> TradeExecutor<C> {
    /// Swap the configured BNB amount for `token` and wait for confirmation.
    ///
    /// No retry: a failed quote, submission or receipt abandons the buy.
    pub async fn buy(&self, token: Address) -> Result<BuyReceipt, BotError> {
        info!("🚀 Executing BUY: {:?} for {} wei", token, self.buy_amount);

        let attempt = self.journal.open(token, TradeSide::Buy);
        match self.try_buy(token, attempt).await {
            Ok(receipt) => {
                info!(
                    "✅ BUY SUCCESS: {:?} - tx: {:?}, gas used: {}",
                    token, receipt.tx_hash, receipt.gas_used
                );
                Ok(receipt)
            }
            Err(e) => {
                error!("❌ BUY FAILED: {:?} - {}", token, e);
                self.fail(attempt, &e);
                Err(e)
            }
        }
    }

    async fn try_buy(&self, token: Address, attempt: AttemptId) -> Result<BuyReceipt, BotError> {
        // Build swap path: WBNB -> Token
        let path = vec![self.wbnb, token];

        // Get expected output (for slippage calculation)
        let amounts = self.chain.amounts_out(self.buy_amount, &path).await?;
        let expected = amounts.last().copied().unwrap_or_default();
        let min_out = self.min_out(expected);
        debug!("Expected out: {}, Min out: {}", expected, min_out);

        let call = TradeCall::BuyWithNative {
            value: self.buy_amount,
            min_out,
            path,
            recipient: self.chain.wallet_address(),
            deadline: self.deadline(),
        };

        let confirmation = self.send_and_confirm(call, self.buy_gas, Some(attempt)).await?;

        Ok(BuyReceipt {
            token,
            tx_hash: confirmation.tx_hash,
            spent: self.buy_amount,
            gas_used: confirmation.gas_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::BotError;
    use crate::executor::TradeExecutor;
    use crate::market::MarketReader;
    use crate::rpc::fake::{test_config, FakeChain, TOKEN, WALLET, WBNB};
    use crate::rpc::TradeCall;
    use crate::trade_history::TradeJournal;
    use alloy::primitives::U256;
    use std::sync::Arc;

    fn executor(chain: Arc<FakeChain>) -> (TradeExecutor<FakeChain>, Arc<TradeJournal>) {
        let market = Arc::new(MarketReader::new(chain.clone(), WBNB));
        let journal = Arc::new(TradeJournal::new());
        let executor = TradeExecutor::new(chain, market, journal.clone(), &test_config());
        (executor, journal)
    }

    #[tokio::test]
    async fn buy_sends_configured_value_along_wbnb_path() {
        let chain = Arc::new(FakeChain::new());
        let (executor, journal) = executor(chain.clone());

        let receipt = executor.buy(TOKEN).await.unwrap();

        let buy_amount = U256::from(100_000_000_000_000_000u128);
        assert_eq!(receipt.spent, buy_amount);
        let sent = chain.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            TradeCall::BuyWithNative {
                value,
                min_out,
                path,
                recipient,
                ..
            } => {
                assert_eq!(*value, buy_amount);
                assert_eq!(path, &vec![WBNB, TOKEN]);
                assert_eq!(*recipient, WALLET);
                // quote is 10x, 5% slippage
                assert_eq!(*min_out, buy_amount * U256::from(10) * U256::from(95) / U256::from(100));
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(journal.summary().buys_confirmed, 1);
    }

    #[tokio::test]
    async fn buy_bids_aggressive_gas_with_fixed_limit() {
        let chain = Arc::new(FakeChain::new());
        let (executor, _) = executor(chain.clone());

        executor.buy(TOKEN).await.unwrap();

        let (_, gas) = chain.state.lock().unwrap().sent[0].clone();
        assert_eq!(gas.gas_limit, 350_000);
        assert_eq!(gas.gas_price, 4_500_000_000);
    }

    #[tokio::test]
    async fn reverted_buy_is_a_failure() {
        let chain = Arc::new(FakeChain::new().with(|s| s.receipts_succeed = false));
        let (executor, journal) = executor(chain);

        let err = executor.buy(TOKEN).await.unwrap_err();
        assert!(matches!(err, BotError::TxFailed(_)));
        assert_eq!(journal.summary().buys_failed, 1);
    }

    #[tokio::test]
    async fn failed_quote_submits_nothing() {
        let chain = Arc::new(FakeChain::new().with(|s| s.quote_rate = None));
        let (executor, journal) = executor(chain.clone());

        assert!(executor.buy(TOKEN).await.is_err());
        assert!(chain.sent().is_empty());
        assert_eq!(journal.summary().buys_failed, 1);
    }

    #[tokio::test]
    async fn rejected_submission_is_recorded() {
        let chain = Arc::new(FakeChain::new().with(|s| s.send_fails = true));
        let (executor, journal) = executor(chain);

        assert!(matches!(
            executor.buy(TOKEN).await,
            Err(BotError::Submission(_))
        ));
        let summary = journal.summary();
        assert_eq!(summary.buys_failed, 1);
        assert_eq!(summary.pending, 0);
    }
}
