// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory chain used by the unit tests.

use super::chain::{Chain, Confirmation, GasParams, Reserves, TradeCall};
use crate::config::Config;
use crate::error::BotError;
use alloy::primitives::{address, Address, TxHash, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const WALLET: Address = address!("00000000000000000000000000000000000f00d0");
pub const ROUTER: Address = address!("10ed43c718714eb63d5aa57b78b54704e256024e");
pub const WBNB: Address = address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");
pub const TOKEN: Address = address!("0000000000000000000000000000000000000abc");
pub const PAIR: Address = address!("00000000000000000000000000000000000a1b2c");

/// Config pointing at the fake addresses: 0.1 BNB buys, 1.5x gas multiplier.
pub fn test_config() -> Config {
    let vars = HashMap::from([
        ("BSC_RPC", "http://localhost:8545"),
        ("BSC_WS", "ws://localhost:8546"),
        ("PRIVATE_KEY", "0x01"),
        ("PANCAKE_ROUTER", "0x10ED43C718714eb63d5aA57B78B54704E256024E"),
        ("WBNB_ADDRESS", "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
        ("BUY_AMOUNT", "0.1"),
        ("GAS_LIMIT", "350000"),
        ("GAS_MULTIPLIER", "1.5"),
    ]);
    Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap()
}

/// How a simulated approve should answer.
#[derive(Debug, Clone, Copy)]
pub enum ApproveBehaviour {
    Succeeds,
    ReturnsFalse,
    Reverts,
    Unreachable,
}

#[derive(Debug)]
pub struct FakeState {
    pub gas_price: Option<u128>,
    pub balances: HashMap<Address, U256>,
    pub balance_fails: bool,
    pub decimals: u8,
    pub allowance: U256,
    pub reserves: HashMap<Address, Reserves>,
    pub pairs: HashMap<Address, Address>,
    pub approve: ApproveBehaviour,
    /// Output multiplier for `getAmountsOut`; `None` makes the quote revert.
    pub quote_rate: Option<u64>,
    pub receipts_succeed: bool,
    pub send_fails: bool,
    pub sent: Vec<(TradeCall, GasParams)>,
}

/// A chain whose state is set up by the test and whose writes are recorded.
pub struct FakeChain {
    pub state: Mutex<FakeState>,
}

impl FakeChain {
    /// A healthy WBNB/TOKEN pool with 100 BNB against 1_000 tokens.
    pub fn new() -> Self {
        let state = FakeState {
            gas_price: Some(3_000_000_000),
            balances: HashMap::new(),
            balance_fails: false,
            decimals: 18,
            allowance: U256::ZERO,
            reserves: HashMap::from([(PAIR, reserves(1_000, 100))]),
            pairs: HashMap::from([(TOKEN, PAIR)]),
            approve: ApproveBehaviour::Succeeds,
            quote_rate: Some(10),
            receipts_succeed: true,
            send_fails: false,
            sent: Vec::new(),
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with<F: FnOnce(&mut FakeState)>(self, f: F) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn update<F: FnOnce(&mut FakeState)>(&self, f: F) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn sent(&self) -> Vec<TradeCall> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }
}

/// Reserves for the TOKEN/WBNB pool, in whole units. TOKEN sorts first.
pub fn reserves(token_units: u64, wbnb_units: u64) -> Reserves {
    let unit = U256::from(10u64).pow(U256::from(18));
    Reserves {
        reserve0: U256::from(token_units) * unit,
        reserve1: U256::from(wbnb_units) * unit,
    }
}

#[async_trait]
impl Chain for FakeChain {
    fn wallet_address(&self) -> Address {
        WALLET
    }

    fn router_address(&self) -> Address {
        ROUTER
    }

    async fn gas_price(&self) -> Result<u128, BotError> {
        self.state
            .lock()
            .unwrap()
            .gas_price
            .ok_or_else(|| BotError::Rpc("gas price unavailable".to_string()))
    }

    async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256, BotError> {
        let state = self.state.lock().unwrap();
        if state.balance_fails {
            return Err(BotError::Rpc("balanceOf timed out".to_string()));
        }
        Ok(state.balances.get(&token).copied().unwrap_or_default())
    }

    async fn decimals(&self, _token: Address) -> Result<u8, BotError> {
        Ok(self.state.lock().unwrap().decimals)
    }

    async fn allowance(
        &self,
        _token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, BotError> {
        Ok(self.state.lock().unwrap().allowance)
    }

    async fn reserves(&self, pair: Address) -> Result<Reserves, BotError> {
        self.state
            .lock()
            .unwrap()
            .reserves
            .get(&pair)
            .copied()
            .ok_or_else(|| BotError::Reverted("getReserves: no code".to_string()))
    }

    async fn pair_for(&self, token_a: Address, token_b: Address) -> Result<Address, BotError> {
        let token = if token_a == WBNB { token_b } else { token_a };
        Ok(self
            .state
            .lock()
            .unwrap()
            .pairs
            .get(&token)
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>, BotError> {
        match self.state.lock().unwrap().quote_rate {
            Some(rate) => Ok(vec![amount_in; path.len() - 1]
                .into_iter()
                .chain(std::iter::once(amount_in * U256::from(rate)))
                .collect()),
            None => Err(BotError::Reverted("getAmountsOut: INSUFFICIENT_LIQUIDITY".to_string())),
        }
    }

    async fn simulate_approve(
        &self,
        _token: Address,
        _spender: Address,
        _amount: U256,
    ) -> Result<bool, BotError> {
        match self.state.lock().unwrap().approve {
            ApproveBehaviour::Succeeds => Ok(true),
            ApproveBehaviour::ReturnsFalse => Ok(false),
            ApproveBehaviour::Reverts => Err(BotError::Reverted("approve: trading disabled".to_string())),
            ApproveBehaviour::Unreachable => Err(BotError::Rpc("connection refused".to_string())),
        }
    }

    async fn send(&self, call: TradeCall, gas: GasParams) -> Result<TxHash, BotError> {
        let mut state = self.state.lock().unwrap();
        if state.send_fails {
            return Err(BotError::Submission("insufficient funds".to_string()));
        }
        if let TradeCall::Approve { amount, .. } = &call {
            state.allowance = *amount;
        }
        state.sent.push((call, gas));
        Ok(B256::with_last_byte(state.sent.len() as u8))
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation, BotError> {
        Ok(Confirmation {
            tx_hash,
            success: self.state.lock().unwrap().receipts_succeed,
            gas_used: 150_000,
            block_number: Some(1),
        })
    }
}
