// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Liquidity validation.

use crate::error::BotError;
use crate::rpc::Chain;
use alloy::primitives::{Address, U256};
use tracing::debug;

/// Check if the pool holds strictly more than `min_wbnb` of the base token.
pub async fn check_liquidity<C: Chain + ?Sized>(
    chain: &C,
    token: Address,
    pair: Address,
    wbnb: Address,
    min_wbnb: U256,
) -> Result<bool, BotError> {
    let reserves = chain.reserves(pair).await?;
    let (_, wbnb_reserve) = reserves.oriented(token, wbnb);

    let is_sufficient = wbnb_reserve > min_wbnb;
    debug!(
        "Liquidity check: {} > {} = {}",
        wbnb_reserve, min_wbnb, is_sufficient
    );

    Ok(is_sufficient)
}
