// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Market data reads: balances, pool prices and gas price.

use crate::error::BotError;
use crate::rpc::Chain;
use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A token balance with the token's own decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalance {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenBalance {
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Decimal-adjusted amount, for display.
    pub fn as_f64(&self) -> f64 {
        format_units(self.raw, self.decimals)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0)
    }
}

/// Read-only view of balances and pools for the bot's wallet.
pub struct MarketReader<C: Chain> {
    chain: Arc<C>,
    wbnb: Address,
}

impl<C: Chain> MarketReader<C> {
    pub fn new(chain: Arc<C>, wbnb: Address) -> Self {
        Self { chain, wbnb }
    }

    /// Spot price of `token` in WBNB, from its WBNB pool's reserves.
    pub async fn token_price(&self, token: Address) -> Result<f64, BotError> {
        let pair = self.chain.pair_for(token, self.wbnb).await?;
        if pair == Address::ZERO {
            return Err(BotError::NoPair { token });
        }

        let reserves = self.chain.reserves(pair).await?;
        let (token_reserve, wbnb_reserve) = reserves.oriented(token, self.wbnb);
        if token_reserve.is_zero() || wbnb_reserve.is_zero() {
            return Err(BotError::EmptyReserve { pair });
        }

        // Reserves are uint112 on-chain, so u128 always fits.
        let price = wbnb_reserve.to::<u128>() as f64 / token_reserve.to::<u128>() as f64;
        debug!("Price of {:?}: {} (pool {:?})", token, price, pair);
        Ok(price)
    }

    /// The wallet's balance of `token`.
    pub async fn check_balance(&self, token: Address) -> Result<TokenBalance, BotError> {
        let raw = self
            .chain
            .balance_of(token, self.chain.wallet_address())
            .await?;
        let decimals = self.chain.decimals(token).await?;

        Ok(TokenBalance { raw, decimals })
    }

    pub async fn current_gas_price(&self) -> Result<u128, BotError> {
        self.chain.gas_price().await
    }

    /// Log the network gas price. Never fails.
    pub async fn log_gas_price(&self) {
        match self.chain.gas_price().await {
            Ok(price) => info!("⛽ Current gas price: {} gwei", gwei(price)),
            Err(e) => warn!("Failed to fetch gas price: {}", e),
        }
    }
}

pub(crate) fn gwei(wei: u128) -> String {
    format_units(U256::from(wei), "gwei").unwrap_or_else(|_| wei.to_string())
}
