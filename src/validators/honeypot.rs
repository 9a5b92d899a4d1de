// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Honeypot detection - simulates the approve and the sell quote a later exit needs.
//!
//! Both steps run as `eth_call`s and never touch chain state. Passing them
//! does not prove the token can be sold: transfer taxes or sell blocks that
//! only trigger inside a real swap are not caught.

use crate::error::BotError;
use crate::rpc::Chain;
use alloy::primitives::{Address, U256};
use tracing::{debug, warn};

/// 1 token at 18 decimals.
const TEST_AMOUNT: u128 = 1_000_000_000_000_000_000;

/// Check if a token can plausibly be sold back to WBNB.
///
/// Returns `Ok(true)` if the token appears safe, `Ok(false)` if the chain
/// rejected the approve or the quote, and `Err` on transport failures.
pub async fn check_honeypot<C: Chain + ?Sized>(
    chain: &C,
    token: Address,
    wbnb: Address,
) -> Result<bool, BotError> {
    debug!("Checking honeypot for token: {:?}", token);
    let test_amount = U256::from(TEST_AMOUNT);

    match chain
        .simulate_approve(token, chain.router_address(), test_amount)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            warn!("Token {:?} failed honeypot check: approve returned false", token);
            return Ok(false);
        }
        Err(e) if e.is_revert() => {
            warn!("Token {:?} failed honeypot check: {}", token, e);
            return Ok(false);
        }
        Err(e) => return Err(e),
    }

    match chain.amounts_out(test_amount, &[token, wbnb]).await {
        Ok(amounts) => {
            let out = amounts.last().copied().unwrap_or_default();
            if amounts.len() >= 2 && out > U256::ZERO {
                debug!("Token {:?} passed honeypot check, output: {}", token, out);
                Ok(true)
            } else {
                warn!("Token {:?} failed honeypot check: zero output", token);
                Ok(false)
            }
        }
        Err(e) if e.is_revert() => {
            warn!("Token {:?} failed honeypot check: {}", token, e);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::fake::{ApproveBehaviour, FakeChain, TOKEN, WBNB};

    async fn run(chain: FakeChain) -> Result<bool, BotError> {
        check_honeypot(&chain, TOKEN, WBNB).await
    }

    #[tokio::test]
    async fn sellable_when_approve_and_quote_succeed() {
        assert!(run(FakeChain::new()).await.unwrap());
    }

    #[tokio::test]
    async fn reverted_approve_is_not_sellable() {
        let chain = FakeChain::new().with(|s| s.approve = ApproveBehaviour::Reverts);
        assert!(!run(chain).await.unwrap());
    }

    #[tokio::test]
    async fn approve_returning_false_is_not_sellable() {
        let chain = FakeChain::new().with(|s| s.approve = ApproveBehaviour::ReturnsFalse);
        assert!(!run(chain).await.unwrap());
    }

    #[tokio::test]
    async fn reverted_sell_quote_is_not_sellable() {
        let chain = FakeChain::new().with(|s| s.quote_rate = None);
        assert!(!run(chain).await.unwrap());
    }

    #[tokio::test]
    async fn zero_sell_quote_is_not_sellable() {
        let chain = FakeChain::new().with(|s| s.quote_rate = Some(0));
        assert!(!run(chain).await.unwrap());
    }

    #[tokio::test]
    async fn transport_failure_is_reported_not_judged() {
        let chain = FakeChain::new().with(|s| s.approve = ApproveBehaviour::Unreachable);
        assert!(matches!(run(chain).await, Err(BotError::Rpc(_))));
    }
}
