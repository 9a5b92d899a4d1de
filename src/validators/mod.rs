// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Token validators for safety checks.

pub mod honeypot;
pub mod liquidity;

use crate::error::BotError;
use crate::rpc::Chain;
use alloy::primitives::{Address, U256};
use std::sync::Arc;

/// Safety checks run against a freshly listed token before buying.
pub struct SafetyChecker<C: Chain> {
    chain: Arc<C>,
    wbnb: Address,
    min_liquidity: U256,
}

impl<C: Chain> SafetyChecker<C> {
    pub fn new(chain: Arc<C>, wbnb: Address, min_liquidity: U256) -> Self {
        Self {
            chain,
            wbnb,
            min_liquidity,
        }
    }

    /// `Ok(false)` means the token looks like a honeypot; `Err` means we could not tell.
    pub async fn is_sellable(&self, token: Address) -> Result<bool, BotError> {
        honeypot::check_honeypot(self.chain.as_ref(), token, self.wbnb).await
    }

    /// Whether `pair` holds more than the minimum WBNB reserve.
    pub async fn check_liquidity(&self, token: Address, pair: Address) -> Result<bool, BotError> {
        liquidity::check_liquidity(self.chain.as_ref(), token, pair, self.wbnb, self.min_liquidity)
            .await
    }
}
