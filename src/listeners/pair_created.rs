// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Factory `PairCreated` listener over a WebSocket log subscription.
//!
//! The subscription is not re-established: when the stream ends, `run`
//! returns an error and the process is expected to be restarted.

use super::ProcessedSet;
use crate::error::BotError;
use alloy::primitives::{Address, Bytes, B256};
use alloy::sol;
use alloy::sol_types::SolEvent;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

sol! {
    event PairCreated(address indexed token0, address indexed token1, address pair, uint256 allPairsLength);
}

/// A pool creation seen on the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairEvent {
    pub token0: Address,
    pub token1: Address,
    pub pair: Address,
}

impl PairEvent {
    /// Decode a `PairCreated` log; `None` for any other event.
    fn from_log(log: &LogResult) -> Option<Self> {
        let event = PairCreated::decode_raw_log(log.topics.iter().copied(), &log.data).ok()?;

        Some(Self {
            token0: event.token0,
            token1: event.token1,
            pair: event.pair,
        })
    }

    /// The side of the pair that is not `base`, if `base` is one of them.
    pub fn target_token(&self, base: Address) -> Option<Address> {
        if self.token0 == base {
            Some(self.token1)
        } else if self.token1 == base {
            Some(self.token0)
        } else {
            None
        }
    }
}

/// A new pair that passed target selection and deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPair {
    pub token: Address,
    pub pair: Address,
    pub tx_hash: Option<B256>,
}

const SUBSCRIBE_ID: u64 = 1;

/// JSON-RPC request for eth_subscribe.
#[derive(Debug, Serialize)]
struct SubscribeRequest {
    jsonrpc: String,
    id: u64,
    method: String,
    params: Vec<serde_json::Value>,
}

/// JSON-RPC response.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    id: Option<u64>,
    result: Option<serde_json::Value>,
    params: Option<SubscriptionParams>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionParams {
    result: LogResult,
}

#[derive(Debug, Deserialize)]
struct LogResult {
    topics: Vec<B256>,
    data: Bytes,
    #[serde(rename = "transactionHash")]
    transaction_hash: Option<B256>,
    #[serde(default)]
    removed: bool,
}

/// Listens for new pools on the factory and forwards the ones worth sniping.
pub struct PairCreatedListener {
    ws_url: String,
    factory: Address,
    wbnb: Address,
    processed: Arc<ProcessedSet>,
    tx: mpsc::Sender<NewPair>,
}

impl PairCreatedListener {
    /// Create a new listener.
    pub fn new(
        ws_url: String,
        factory: Address,
        wbnb: Address,
        processed: Arc<ProcessedSet>,
        tx: mpsc::Sender<NewPair>,
    ) -> Self {
        Self {
            ws_url,
            factory,
            wbnb,
            processed,
            tx,
        }
    }

    /// Listen until the subscription drops.
    pub async fn run(&self) -> Result<(), BotError> {
        info!("Connecting to WebSocket: {}", self.ws_url);

        let (ws_stream, _) = connect_async(&self.ws_url)
            .await
            .map_err(|e| BotError::Rpc(format!("Failed to connect: {}", e)))?;

        info!("Connected to WebSocket");

        let (mut write, mut read) = ws_stream.split();

        let subscribe = SubscribeRequest {
            jsonrpc: "2.0".to_string(),
            id: SUBSCRIBE_ID,
            method: "eth_subscribe".to_string(),
            params: vec![
                serde_json::json!("logs"),
                serde_json::json!({
                    "address": self.factory,
                    "topics": [PairCreated::SIGNATURE_HASH],
                }),
            ],
        };

        let subscribe_msg = serde_json::to_string(&subscribe)
            .map_err(|e| BotError::Rpc(format!("Failed to serialize: {}", e)))?;

        write
            .send(Message::Text(subscribe_msg))
            .await
            .map_err(|e| BotError::Rpc(format!("Failed to send subscribe: {}", e)))?;

        info!("Subscribed to PairCreated on {:?}", self.factory);

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Some(new_pair) = self.handle_message(&text)? {
                        if self.tx.send(new_pair).await.is_err() {
                            return Err(BotError::Rpc("pair receiver dropped".to_string()));
                        }
                    }
                }
                Ok(Message::Ping(data)) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Ok(Message::Close(_)) => {
                    warn!("WebSocket closed by server");
                    break;
                }
                Err(e) => {
                    error!("WebSocket receive error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        Err(BotError::Rpc("pair subscription ended".to_string()))
    }

    /// Handle one frame. A rejected subscription is an error: no log will ever arrive.
    fn handle_message(&self, text: &str) -> Result<Option<NewPair>, BotError> {
        debug!("Received: {}", text);

        let response = match serde_json::from_str::<JsonRpcResponse>(text) {
            Ok(response) => response,
            Err(e) => {
                warn!("Unparseable message: {}", e);
                return Ok(None);
            }
        };

        // Check for subscription confirmation
        if let Some(result) = &response.result {
            if result.is_string() {
                info!("Subscription confirmed: {}", result);
            }
            return Ok(None);
        }

        // Check for error
        if let Some(error) = &response.error {
            error!("RPC error: {} - {}", error.code, error.message);
            if response.id == Some(SUBSCRIBE_ID) {
                return Err(BotError::Rpc(format!(
                    "eth_subscribe rejected: {} - {}",
                    error.code, error.message
                )));
            }
            return Ok(None);
        }

        let Some(params) = response.params else {
            return Ok(None);
        };
        let log = params.result;
        if log.removed {
            debug!("Ignoring removed log {:?}", log.transaction_hash);
            return Ok(None);
        }

        let Some(event) = PairEvent::from_log(&log) else {
            warn!("Log is not a PairCreated event");
            return Ok(None);
        };

        Ok(self.admit(event, log.transaction_hash))
    }

    /// Pick the token to buy and make sure it has not been handled already.
    pub fn admit(&self, event: PairEvent, tx_hash: Option<B256>) -> Option<NewPair> {
        info!(
            "🆕 New Pair Detected: {:?} - {:?} at {:?}",
            event.token0, event.token1, event.pair
        );

        let Some(token) = event.target_token(self.wbnb) else {
            info!("⏭️ Pair {:?} has no WBNB side. Skipping...", event.pair);
            return None;
        };

        if !self.processed.mark_seen(token) {
            info!("⏭️ Already processed token {:?}. Skipping...", token);
            return None;
        }

        Some(NewPair {
            token,
            pair: event.pair,
            tx_hash,
        })
    }
}

/// Start the listener in a background task.
pub fn spawn_listener(listener: PairCreatedListener) -> tokio::task::JoinHandle<Result<(), BotError>> {
    tokio::spawn(async move {
        let result = listener.run().await;
        if let Err(e) = &result {
            error!("❌ Pair listener stopped: {}", e);
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const FACTORY: Address = address!("ca143ce32fe78f1f7019d7d551a6402fc5350c73");
    const WBNB: Address = address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");
    const TOKEN: Address = address!("0000000000000000000000000000000000000abc");
    const OTHER: Address = address!("0000000000000000000000000000000000000def");
    const PAIR: Address = address!("00000000000000000000000000000000000a1b2c");

    fn listener() -> (PairCreatedListener, mpsc::Receiver<NewPair>) {
        let (tx, rx) = mpsc::channel(8);
        let listener = PairCreatedListener::new(
            "ws://localhost:8546".to_string(),
            FACTORY,
            WBNB,
            Arc::new(ProcessedSet::new()),
            tx,
        );
        (listener, rx)
    }

    fn log_message(token0: Address, token1: Address, pair: Address) -> String {
        let topic = |a: Address| format!("{:?}", a.into_word());
        let data = format!(
            "0x{}{}",
            hex_word(pair.into_word()),
            hex_word(B256::with_last_byte(1))
        );
        serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_subscription",
            "params": {
                "subscription": "0x1",
                "result": {
                    "address": format!("{:?}", FACTORY),
                    "topics": [
                        format!("{:?}", PairCreated::SIGNATURE_HASH),
                        topic(token0),
                        topic(token1),
                    ],
                    "data": data,
                    "transactionHash": format!("{:?}", B256::with_last_byte(0x42)),
                    "blockNumber": "0x10",
                    "removed": false
                }
            }
        })
        .to_string()
    }

    fn hex_word(word: B256) -> String {
        format!("{:?}", word).trim_start_matches("0x").to_string()
    }

    #[test]
    fn decodes_pair_created_log() {
        let (listener, _rx) = listener();

        let new_pair = listener
            .handle_message(&log_message(WBNB, TOKEN, PAIR))
            .unwrap()
            .unwrap();

        assert_eq!(new_pair.token, TOKEN);
        assert_eq!(new_pair.pair, PAIR);
        assert_eq!(new_pair.tx_hash, Some(B256::with_last_byte(0x42)));
    }

    #[test]
    fn picks_non_base_side_in_either_position() {
        let event = PairEvent {
            token0: TOKEN,
            token1: WBNB,
            pair: PAIR,
        };
        assert_eq!(event.target_token(WBNB), Some(TOKEN));

        let event = PairEvent {
            token0: WBNB,
            token1: TOKEN,
            pair: PAIR,
        };
        assert_eq!(event.target_token(WBNB), Some(TOKEN));
    }

    #[test]
    fn second_event_for_same_token_is_not_admitted() {
        let (listener, _rx) = listener();

        assert!(listener
            .handle_message(&log_message(WBNB, TOKEN, PAIR))
            .unwrap()
            .is_some());

        let other_pool = address!("00000000000000000000000000000000000b2c3d");
        assert!(listener
            .handle_message(&log_message(TOKEN, WBNB, other_pool))
            .unwrap()
            .is_none());
        assert!(listener.processed.contains(&TOKEN));
    }

    #[test]
    fn pair_without_base_token_is_skipped() {
        let (listener, _rx) = listener();

        assert!(listener
            .handle_message(&log_message(TOKEN, OTHER, PAIR))
            .unwrap()
            .is_none());
        assert_eq!(listener.processed.len(), 0);
    }

    #[test]
    fn subscription_ack_and_noise_are_ignored() {
        let (listener, _rx) = listener();

        let ack = r#"{"jsonrpc":"2.0","id":1,"result":"0xcd0c3e8af590364c09d0fa6a1210faf5"}"#;
        assert!(listener.handle_message(ack).unwrap().is_none());

        let unrelated = r#"{"jsonrpc":"2.0","id":7,"error":{"code":-32000,"message":"busy"}}"#;
        assert!(listener.handle_message(unrelated).unwrap().is_none());

        assert!(listener.handle_message("not json").unwrap().is_none());
    }

    #[test]
    fn rejected_subscription_stops_the_listener() {
        let (listener, _rx) = listener();

        let err = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"method not found"}}"#;
        let result = listener.handle_message(err);

        assert!(matches!(result, Err(BotError::Rpc(msg)) if msg.contains("method not found")));
    }

    #[test]
    fn removed_log_is_ignored() {
        let (listener, _rx) = listener();
        let msg = log_message(WBNB, TOKEN, PAIR).replace("\"removed\":false", "\"removed\":true");

        assert!(listener.handle_message(&msg).unwrap().is_none());
        assert!(!listener.processed.contains(&TOKEN));
    }

    #[test]
    fn other_events_are_rejected() {
        let log = LogResult {
            topics: vec![B256::ZERO, B256::ZERO, B256::ZERO],
            data: Bytes::from(vec![0u8; 64]),
            transaction_hash: None,
            removed: false,
        };
        assert!(PairEvent::from_log(&log).is_none());
    }
}
