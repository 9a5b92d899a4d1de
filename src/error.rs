// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error type shared by every component.

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

/// Everything that can go wrong while talking to the chain or trading.
///
/// `Reverted` is kept apart from `Rpc` so callers can tell "the chain said no"
/// from "we could not ask".
#[derive(Debug, Error)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("rpc request failed: {0}")]
    Rpc(String),

    #[error("call reverted: {0}")]
    Reverted(String),

    #[error("no pool for {token:?} against the base token")]
    NoPair { token: Address },

    #[error("pool {pair:?} has an empty reserve")]
    EmptyReserve { pair: Address },

    #[error("failed to submit transaction: {0}")]
    Submission(String),

    #[error("failed to confirm {hash:?}: {reason}")]
    Confirmation { hash: TxHash, reason: String },

    #[error("transaction {0:?} reverted on-chain")]
    TxFailed(TxHash),

    #[error("submission queue is closed")]
    QueueClosed,
}

impl BotError {
    /// True when the node answered and the call itself was rejected.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted(_))
    }
}

/// JSON-RPC error code nodes use for `execution reverted`.
const EXECUTION_REVERTED: i64 = 3;

/// Classify a contract call failure as a revert or a transport problem.
///
/// Only error responses that describe a revert count as reverts; rate limits
/// and other node-side errors stay `Rpc`.
pub(crate) fn call_error(context: &str, err: alloy::contract::Error) -> BotError {
    let reverted = match &err {
        alloy::contract::Error::TransportError(e) => e.as_error_resp().is_some_and(|payload| {
            payload.code == EXECUTION_REVERTED
                || payload.as_revert_data().is_some()
                || payload.message.contains("revert")
        }),
        alloy::contract::Error::ZeroData(..) | alloy::contract::Error::AbiError(_) => true,
        _ => false,
    };

    if reverted {
        BotError::Reverted(format!("{context}: {err}"))
    } else {
        BotError::Rpc(format!("{context}: {err}"))
    }
}
