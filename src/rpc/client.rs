// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! alloy-backed implementation of [`Chain`].

use super::chain::{Chain, Confirmation, GasParams, Reserves, TradeCall};
use super::queue::SubmissionQueue;
use crate::error::{call_error, BotError};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{PendingTransactionBuilder, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// How long a receipt wait runs before each stall warning.
const STALL_WARN_AFTER: Duration = Duration::from_secs(60);

// Router interface for swaps and quotes
sol! {
    #[sol(rpc)]
    interface IPancakeRouter {
        function swapExactETHForTokens(
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amounts);

        function swapExactTokensForETH(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external view returns (uint256[] memory amounts);
    }
}

sol! {
    #[sol(rpc)]
    interface IPancakeFactory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

sol! {
    #[sol(rpc)]
    interface IPancakePair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Chain access through an alloy provider and the shared submission queue.
pub struct AlloyChain<P: Provider + Clone> {
    provider: P,
    queue: SubmissionQueue,
    wallet_address: Address,
    router: Address,
    factory: Address,
}

impl<P: Provider + Clone + 'static> AlloyChain<P> {
    /// Connect the submission queue for `wallet_address` and wrap the provider.
    pub async fn new(
        provider: P,
        wallet_address: Address,
        router: Address,
        factory: Address,
    ) -> Result<Self, BotError> {
        let queue = SubmissionQueue::spawn(provider.clone(), wallet_address).await?;

        Ok(Self {
            provider,
            queue,
            wallet_address,
            router,
            factory,
        })
    }

    fn build_request(&self, call: TradeCall) -> TransactionRequest {
        let router = IPancakeRouter::new(self.router, &self.provider);

        match call {
            TradeCall::Approve {
                token,
                spender,
                amount,
            } => {
                let erc20 = IERC20::new(token, &self.provider);
                TransactionRequest::default()
                    .to(token)
                    .input(erc20.approve(spender, amount).calldata().clone().into())
            }
            TradeCall::BuyWithNative {
                value,
                min_out,
                path,
                recipient,
                deadline,
            } => TransactionRequest::default()
                .to(self.router)
                .value(value)
                .input(
                    router
                        .swapExactETHForTokens(min_out, path, recipient, deadline)
                        .calldata()
                        .clone()
                        .into(),
                ),
            TradeCall::SellForNative {
                amount_in,
                min_out,
                path,
                recipient,
                deadline,
            } => TransactionRequest::default().to(self.router).input(
                router
                    .swapExactTokensForETH(amount_in, min_out, path, recipient, deadline)
                    .calldata()
                    .clone()
                    .into(),
            ),
        }
    }
}

#[async_trait]
impl<P: Provider + Clone + 'static> Chain for AlloyChain<P> {
    fn wallet_address(&self) -> Address {
        self.wallet_address
    }

    fn router_address(&self) -> Address {
        self.router
    }

    async fn gas_price(&self) -> Result<u128, BotError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| BotError::Rpc(format!("Failed to get gas price: {e}")))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, BotError> {
        IERC20::new(token, &self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| call_error("balanceOf", e))
    }

    async fn decimals(&self, token: Address) -> Result<u8, BotError> {
        IERC20::new(token, &self.provider)
            .decimals()
            .call()
            .await
            .map_err(|e| call_error("decimals", e))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, BotError> {
        IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| call_error("allowance", e))
    }

    async fn reserves(&self, pair: Address) -> Result<Reserves, BotError> {
        let result = IPancakePair::new(pair, &self.provider)
            .getReserves()
            .call()
            .await
            .map_err(|e| call_error("getReserves", e))?;

        Ok(Reserves {
            reserve0: U256::from(result.reserve0.to::<u128>()),
            reserve1: U256::from(result.reserve1.to::<u128>()),
        })
    }

    async fn pair_for(&self, token_a: Address, token_b: Address) -> Result<Address, BotError> {
        IPancakeFactory::new(self.factory, &self.provider)
            .getPair(token_a, token_b)
            .call()
            .await
            .map_err(|e| call_error("getPair", e))
    }

    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>, BotError> {
        IPancakeRouter::new(self.router, &self.provider)
            .getAmountsOut(amount_in, path.to_vec())
            .call()
            .await
            .map_err(|e| call_error("getAmountsOut", e))
    }

    async fn simulate_approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool, BotError> {
        IERC20::new(token, &self.provider)
            .approve(spender, amount)
            .from(self.wallet_address)
            .call()
            .await
            .map_err(|e| call_error("approve (simulated)", e))
    }

    async fn send(&self, call: TradeCall, gas: GasParams) -> Result<TxHash, BotError> {
        let label = call.label();
        let request = self
            .build_request(call)
            .from(self.wallet_address)
            .gas_limit(gas.gas_limit)
            .gas_price(gas.gas_price);

        debug!("Submitting {} tx, gas_price={}", label, gas.gas_price);
        let submitted = self.queue.submit(request).await?;
        debug!("{} tx {:?} uses nonce {}", label, submitted.tx_hash, submitted.nonce);
        Ok(submitted.tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation, BotError> {
        let pending =
            PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash).get_receipt();
        tokio::pin!(pending);

        let mut waited = Duration::ZERO;
        let receipt = loop {
            match tokio::time::timeout(STALL_WARN_AFTER, &mut pending).await {
                Ok(result) => {
                    break result.map_err(|e| BotError::Confirmation {
                        hash: tx_hash,
                        reason: e.to_string(),
                    })?
                }
                Err(_) => {
                    waited += STALL_WARN_AFTER;
                    warn!(
                        "⏳ {:?} still not mined after {}s; later transactions from this wallet wait behind its nonce",
                        tx_hash,
                        waited.as_secs()
                    );
                }
            }
        };

        Ok(Confirmation {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
            gas_used: receipt.gas_used,
            block_number: receipt.block_number,
        })
    }
}
