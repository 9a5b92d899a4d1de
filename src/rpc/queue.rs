// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-owner transaction submission.
//!
//! Buys and sells for different tokens run concurrently but share one signing
//! key. All of them go through this queue, whose task is the only place that
//! hands out nonces.

use crate::error::BotError;
use alloy::primitives::{Address, TxHash};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// A transaction the node accepted, and the nonce it was sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitted {
    pub tx_hash: TxHash,
    pub nonce: u64,
}

const QUEUE_DEPTH: usize = 64;

struct SubmitJob {
    request: TransactionRequest,
    reply: oneshot::Sender<Result<Submitted, BotError>>,
}

/// Handle to the submission task.
#[derive(Clone)]
pub struct SubmissionQueue {
    tx: mpsc::Sender<SubmitJob>,
}

impl SubmissionQueue {
    /// Read the wallet's current nonce and start the submission task.
    pub async fn spawn<P>(provider: P, sender: Address) -> Result<Self, BotError>
    where
        P: Provider + Clone + 'static,
    {
        let nonce = provider
            .get_transaction_count(sender)
            .await
            .map_err(|e| BotError::Rpc(format!("Failed to get nonce: {e}")))?;

        info!("🔢 Submission queue starting at nonce {}", nonce);

        let (tx, mut rx) = mpsc::channel::<SubmitJob>(QUEUE_DEPTH);

        tokio::spawn(async move {
            let mut next_nonce = nonce;

            while let Some(job) = rx.recv().await {
                let request = job.request.nonce(next_nonce);
                debug!("Using nonce: {}", next_nonce);

                let result = match provider.send_transaction(request).await {
                    Ok(pending) => {
                        let submitted = Submitted {
                            tx_hash: *pending.tx_hash(),
                            nonce: next_nonce,
                        };
                        // A later tx waits on this nonce until it is mined or replaced.
                        info!(
                            "📨 Broadcast {:?} with nonce {}",
                            submitted.tx_hash, submitted.nonce
                        );
                        next_nonce += 1;
                        Ok(submitted)
                    }
                    Err(e) => {
                        // The node may have seen the nonce anyway; ask it.
                        match provider.get_transaction_count(sender).await {
                            Ok(n) => next_nonce = n,
                            Err(sync_err) => warn!("Nonce resync failed: {}", sync_err),
                        }
                        Err(BotError::Submission(e.to_string()))
                    }
                };

                let _ = job.reply.send(result);
            }

            debug!("Submission queue stopped");
        });

        Ok(Self { tx })
    }

    /// Queue a transaction and wait for the node to accept it.
    pub async fn submit(&self, request: TransactionRequest) -> Result<Submitted, BotError> {
        let (reply, response) = oneshot::channel();

        self.tx
            .send(SubmitJob { request, reply })
            .await
            .map_err(|_| BotError::QueueClosed)?;

        response.await.map_err(|_| BotError::QueueClosed)?
    }
}
