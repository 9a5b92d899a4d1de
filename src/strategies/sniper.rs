// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sniper strategy: buy freshly listed WBNB pairs that pass the safety checks.

use crate::executor::TradeExecutor;
use crate::listeners::NewPair;
use crate::position::{now_millis, Position, PositionTracker};
use crate::rpc::Chain;
use crate::validators::SafetyChecker;
use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// How a snipe attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SnipeOutcome {
    /// Failed the honeypot simulation.
    Honeypot,
    /// Pool holds too little WBNB.
    ThinLiquidity,
    /// A safety check could not be run.
    Unchecked,
    /// The buy was not confirmed.
    BuyFailed,
    /// Bought, but no post-buy price was available, so nothing is tracked.
    Untracked,
    /// Bought and a position is open.
    Opened(Position),
}

pub struct Sniper<C: Chain> {
    safety: SafetyChecker<C>,
    executor: Arc<TradeExecutor<C>>,
    positions: Arc<Mutex<PositionTracker>>,
}

impl<C: Chain> Sniper<C> {
    pub fn new(
        safety: SafetyChecker<C>,
        executor: Arc<TradeExecutor<C>>,
        positions: Arc<Mutex<PositionTracker>>,
    ) -> Self {
        Self {
            safety,
            executor,
            positions,
        }
    }

    /// Run the buy sequence for one new pair.
    ///
    /// Every failure is logged and only stops this token.
    pub async fn snipe(&self, new_pair: NewPair) -> SnipeOutcome {
        let NewPair {
            token,
            pair,
            tx_hash,
        } = new_pair;
        info!("🎯 Sniping {:?} (pair {:?}, created in {:?})", token, pair, tx_hash);

        match self.safety.is_sellable(token).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("❌ REJECT [HONEYPOT]: {:?} cannot be sold", token);
                return SnipeOutcome::Honeypot;
            }
            Err(e) => {
                warn!("❌ REJECT [HONEYPOT]: could not check {:?}: {}", token, e);
                return SnipeOutcome::Unchecked;
            }
        }

        match self.safety.check_liquidity(token, pair).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("❌ REJECT [LIQUIDITY]: {:?} below minimum", token);
                return SnipeOutcome::ThinLiquidity;
            }
            Err(e) => {
                warn!("❌ REJECT [LIQUIDITY]: could not read {:?}: {}", pair, e);
                return SnipeOutcome::Unchecked;
            }
        }

        info!("🟢 BUY SIGNAL: {:?}", token);
        self.executor.market().log_gas_price().await;

        let receipt = match self.executor.buy(token).await {
            Ok(receipt) => receipt,
            Err(_) => return SnipeOutcome::BuyFailed,
        };
        info!(
            "🟢 Bought {:?} for {} BNB",
            receipt.token,
            format_ether(receipt.spent)
        );

        self.open_position(token).await
    }

    async fn open_position(&self, token: Address) -> SnipeOutcome {
        let buy_price = match self.executor.market().token_price(token).await {
            Ok(price) => price,
            Err(e) => {
                error!("Bought {:?} but could not read its price: {}", token, e);
                return SnipeOutcome::Untracked;
            }
        };

        let position = Position::new(token, buy_price, now_millis());
        let position = self.positions.lock().await.add(position);
        SnipeOutcome::Opened(position)
    }
}
