// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! The chain operations the bot depends on.

use crate::error::BotError;
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

/// Raw reserves of a V2 pool, ordered as the pool stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    pub reserve0: U256,
    pub reserve1: U256,
}

impl Reserves {
    /// Return `(reserve_of_token, reserve_of_other)` for a pool of `token`/`other`.
    ///
    /// V2 pools sort their tokens by address, so token0 is the lower one.
    pub fn oriented(&self, token: Address, other: Address) -> (U256, U256) {
        if token < other {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }
}

/// Gas settings attached to every submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasParams {
    pub gas_limit: u64,
    pub gas_price: u128,
}

/// A state-changing call the bot can submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeCall {
    /// `token.approve(spender, amount)`.
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    /// `router.swapExactETHForTokens` with `value` attached.
    BuyWithNative {
        value: U256,
        min_out: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
    },
    /// `router.swapExactTokensForETH`.
    SellForNative {
        amount_in: U256,
        min_out: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
    },
}

impl TradeCall {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::BuyWithNative { .. } => "buy",
            Self::SellForNative { .. } => "sell",
        }
    }
}

/// Receipt summary for an included transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub success: bool,
    pub gas_used: u64,
    pub block_number: Option<u64>,
}

/// Read and write access to the chain for a single signing wallet.
///
/// Read methods return `BotError::Reverted` when the node rejected the call
/// and `BotError::Rpc` when the request itself failed.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Address of the signing wallet.
    fn wallet_address(&self) -> Address;

    /// Address of the swap router.
    fn router_address(&self) -> Address;

    async fn gas_price(&self) -> Result<u128, BotError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, BotError>;

    async fn decimals(&self, token: Address) -> Result<u8, BotError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, BotError>;

    async fn reserves(&self, pair: Address) -> Result<Reserves, BotError>;

    /// Pool address for two tokens, `Address::ZERO` if none exists.
    async fn pair_for(&self, token_a: Address, token_b: Address) -> Result<Address, BotError>;

    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>, BotError>;

    /// Run `approve(spender, amount)` from the wallet without committing it.
    async fn simulate_approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool, BotError>;

    /// Sign and broadcast a call; returns once the node accepted it.
    async fn send(&self, call: TradeCall, gas: GasParams) -> Result<TxHash, BotError>;

    /// Wait until a broadcast transaction is included.
    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation, BotError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn orients_reserves_by_address_order() {
        let low = address!("0000000000000000000000000000000000000abc");
        let high = address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");
        let reserves = Reserves {
            reserve0: U256::from(10),
            reserve1: U256::from(20),
        };

        assert_eq!(reserves.oriented(low, high), (U256::from(10), U256::from(20)));
        assert_eq!(reserves.oriented(high, low), (U256::from(20), U256::from(10)));
    }
}
