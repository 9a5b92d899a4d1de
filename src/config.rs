// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use crate::error::BotError;
use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, U256};
use std::str::FromStr;

const PANCAKE_ROUTER: &str = "0x10ED43C718714eb63d5aA57B78B54704E256024E";
const PANCAKE_FACTORY: &str = "0xcA143Ce32Fe78f1f7019d7d551a6402fC5350c73";
const WBNB: &str = "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c";

/// Main configuration for the sniper bot.
#[derive(Debug, Clone)]
pub struct Config {
    // RPC
    pub rpc_url: String,
    pub ws_url: String,

    // Wallet
    pub private_key: String,

    // Contracts
    pub router_address: Address,
    pub factory_address: Address,
    pub wbnb_address: Address,

    // Trading
    pub buy_amount: U256,
    pub slippage: f64,
    pub profit_threshold: f64,
    pub min_liquidity: U256,
    pub deadline_secs: u64,

    // Gas
    pub gas_limit: u64,
    pub gas_multiplier: f64,

    // Position monitor
    pub sell_delay_secs: u64,
    pub check_interval_secs: u64,
    pub max_sell_checks: u32,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, BotError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).ok_or_else(|| BotError::Config(format!("{name} not set")));
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let slippage: f64 = parse_num("SLIPPAGE", &var_or("SLIPPAGE", "0.05"))?;
        if !(0.0..1.0).contains(&slippage) {
            return Err(BotError::Config(format!(
                "SLIPPAGE must be in [0, 1), got {slippage}"
            )));
        }

        let profit_threshold: f64 = parse_num("PROFIT_THRESHOLD", &var_or("PROFIT_THRESHOLD", "1.05"))?;
        if profit_threshold <= 0.0 {
            return Err(BotError::Config("PROFIT_THRESHOLD must be positive".to_string()));
        }

        Ok(Self {
            // RPC
            rpc_url: var("BSC_RPC")?,
            ws_url: var("BSC_WS")?,

            // Wallet
            private_key: var("PRIVATE_KEY")?,

            // Contracts
            router_address: parse_address(&var_or("PANCAKE_ROUTER", PANCAKE_ROUTER))?,
            factory_address: parse_address(&var_or("PANCAKE_FACTORY", PANCAKE_FACTORY))?,
            wbnb_address: parse_address(&var_or("WBNB_ADDRESS", WBNB))?,

            // Trading
            buy_amount: parse_bnb("BUY_AMOUNT", &var("BUY_AMOUNT")?)?,
            slippage,
            profit_threshold,
            min_liquidity: parse_bnb("MIN_LIQUIDITY", &var_or("MIN_LIQUIDITY", "1"))?,
            deadline_secs: parse_num("DEADLINE_SECS", &var_or("DEADLINE_SECS", "60"))?,

            // Gas
            gas_limit: parse_num("GAS_LIMIT", &var("GAS_LIMIT")?)?,
            gas_multiplier: parse_num("GAS_MULTIPLIER", &var_or("GAS_MULTIPLIER", "1.0"))?,

            // Position monitor
            sell_delay_secs: parse_num("SELL_DELAY_SECS", &var_or("SELL_DELAY_SECS", "60"))?,
            check_interval_secs: parse_num::<u64>(
                "CHECK_INTERVAL_SECS",
                &var_or("CHECK_INTERVAL_SECS", "60"),
            )?
            .max(1),
            max_sell_checks: parse_num::<u32>("MAX_SELL_CHECKS", &var_or("MAX_SELL_CHECKS", "30"))?
                .max(1),
        })
    }

    /// Convert a basis-point friendly slippage: 0.05 -> 500.
    pub fn slippage_bps(&self) -> u64 {
        (self.slippage * 10_000.0).round() as u64
    }
}

fn parse_address(s: &str) -> Result<Address, BotError> {
    Address::from_str(s).map_err(|e| BotError::Config(format!("Invalid address {s}: {e}")))
}

fn parse_bnb(name: &str, s: &str) -> Result<U256, BotError> {
    parse_ether(s.trim()).map_err(|e| BotError::Config(format!("Invalid {name} {s}: {e}")))
}

fn parse_num<T: FromStr>(name: &str, s: &str) -> Result<T, BotError>
where
    T::Err: std::fmt::Display,
{
    s.trim()
        .parse()
        .map_err(|e| BotError::Config(format!("Invalid {name} {s}: {e}")))
}
