// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provider setup for the HTTP JSON-RPC connection.

use crate::config::Config;
use crate::error::BotError;
use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};

/// Configuration for RPC connection.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub rpc_url: String,
    pub private_key: String,
}

impl From<&Config> for RpcConfig {
    fn from(config: &Config) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            private_key: config.private_key.clone(),
        }
    }
}

/// Create a signing provider from config.
///
/// Returns the provider together with the address of the loaded key.
pub fn create_provider(config: &RpcConfig) -> Result<(impl Provider + Clone, Address), BotError> {
    let signer: PrivateKeySigner = config
        .private_key
        .trim()
        .parse()
        .map_err(|e| BotError::Config(format!("Invalid private key: {e}")))?;

    let address = signer.address();
    let wallet = EthereumWallet::from(signer);

    let url: Url = config
        .rpc_url
        .parse()
        .map_err(|e| BotError::Config(format!("Invalid RPC URL: {e}")))?;

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok((provider, address))
}
