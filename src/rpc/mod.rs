// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! RPC module for interacting with the chain.

mod chain;
mod client;
mod provider;
mod queue;

#[cfg(test)]
pub mod fake;

pub use chain::{Chain, Confirmation, GasParams, Reserves, TradeCall};
pub use client::AlloyChain;
pub use provider::{create_provider, RpcConfig};
