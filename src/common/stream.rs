//! Decoding of program events from transaction logs, plus an optional
//! WebSocket subscription (behind the `stream` feature).
//!
//! Events arrive as `Program data: <base64>` log lines. The first 8 bytes of
//! the decoded payload are the event discriminator; the rest is the
//! borsh-encoded event body. Newer program versions append fields to event
//! bodies, so decoding reads the leading fields and ignores trailing bytes.

use std::error::Error;

use base64::Engine;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Event emitted when a new token is created
///
/// Carries the token metadata alongside the mint, bonding curve, and
/// creating wallet.
#[derive(BorshSerialize, BorshDeserialize, Debug, Serialize, Deserialize, Clone)]
pub struct CreateEvent {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub mint: Pubkey,
    pub bonding_curve: Pubkey,
    pub user: Pubkey,
}

/// Event emitted when a token is bought or sold
///
/// Contains the amounts exchanged, the trade direction, and the bonding
/// curve reserves after the trade was applied.
#[derive(BorshSerialize, BorshDeserialize, Debug, Serialize, Deserialize, Clone)]
pub struct TradeEvent {
    pub mint: Pubkey,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    pub user: Pubkey,
    pub timestamp: i64,
    pub virtual_sol_reserves: u64,
    pub virtual_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub real_token_reserves: u64,
}

/// Event emitted when a bonding curve reaches its real-token-reserve floor
/// and graduates.
#[derive(BorshSerialize, BorshDeserialize, Debug, Serialize, Deserialize, Clone)]
pub struct CompleteEvent {
    pub user: Pubkey,
    pub mint: Pubkey,
    pub bonding_curve: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when the global program parameters are updated
#[derive(BorshSerialize, BorshDeserialize, Debug, Serialize, Deserialize, Clone)]
pub struct SetParamsEvent {
    pub fee_recipient: Pubkey,
    pub initial_virtual_token_reserves: u64,
    pub initial_virtual_sol_reserves: u64,
    pub initial_real_token_reserves: u64,
    pub token_total_supply: u64,
    pub fee_basis_points: u64,
}

/// All event types the program emits.
///
/// Discriminators this crate does not recognize decode to `Unknown` with the
/// raw payload attached, so a stream consumer never fails on a new event
/// type.
#[derive(Debug, Serialize, Deserialize)]
pub enum PumpFunEvent {
    Create(CreateEvent),
    Trade(TradeEvent),
    Complete(CompleteEvent),
    SetParams(SetParamsEvent),
    Unknown(String, Vec<u8>),
}

const CREATE_EVENT_DISCRIMINATOR: [u8; 8] = [27, 114, 169, 77, 222, 235, 99, 118];
const TRADE_EVENT_DISCRIMINATOR: [u8; 8] = [189, 219, 127, 211, 78, 230, 97, 238];
const COMPLETE_EVENT_DISCRIMINATOR: [u8; 8] = [95, 114, 97, 156, 212, 46, 152, 8];
const SET_PARAMS_EVENT_DISCRIMINATOR: [u8; 8] = [223, 195, 159, 246, 62, 48, 143, 131];

// Reads the leading fields and leaves any appended bytes unconsumed.
fn decode_body<T: BorshDeserialize>(body: &[u8]) -> Result<T, Box<dyn Error + Send + Sync>> {
    let mut reader = body;
    T::deserialize(&mut reader).map_err(|e| format!("failed to decode event body: {}", e).into())
}

/// Parses base64-encoded program log data into a structured `PumpFunEvent`.
///
/// # Arguments
///
/// * `signature` - Transaction signature associated with the event
/// * `data` - Base64-encoded event data from a `Program data:` log line
///
/// # Errors
///
/// Fails if the payload is not valid base64, is too short to carry a
/// discriminator, or carries a recognized discriminator with an undecodable
/// body. An unrecognized discriminator is not an error.
pub fn parse_event(
    signature: &str,
    data: &str,
) -> Result<PumpFunEvent, Box<dyn Error + Send + Sync>> {
    let decoded = base64::engine::general_purpose::STANDARD.decode(data)?;

    if decoded.len() < 8 {
        return Err(format!("data too short to contain discriminator: {}", data).into());
    }

    let (discriminator, body) = decoded.split_at(8);
    match discriminator {
        d if d == CREATE_EVENT_DISCRIMINATOR => Ok(PumpFunEvent::Create(decode_body(body)?)),
        d if d == TRADE_EVENT_DISCRIMINATOR => Ok(PumpFunEvent::Trade(decode_body(body)?)),
        d if d == COMPLETE_EVENT_DISCRIMINATOR => Ok(PumpFunEvent::Complete(decode_body(body)?)),
        d if d == SET_PARAMS_EVENT_DISCRIMINATOR => Ok(PumpFunEvent::SetParams(decode_body(body)?)),
        _ => Ok(PumpFunEvent::Unknown(signature.to_string(), decoded)),
    }
}

#[cfg(feature = "stream")]
pub use subscription::{subscribe, Subscription};

#[cfg(feature = "stream")]
mod subscription {
    use super::*;
    use futures::StreamExt;
    use solana_client::{
        nonblocking::pubsub_client::PubsubClient,
        rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter},
        rpc_response::{Response, RpcLogsResponse},
    };
    use solana_sdk::commitment_config::CommitmentConfig;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    use crate::common::types::Cluster;
    use crate::{constants, error};

    /// An active WebSocket subscription to program events.
    ///
    /// Dropping the subscription signals the background task to unsubscribe
    /// from the log feed and exit.
    pub struct Subscription {
        pub task: JoinHandle<()>,
        pub unsubscribe: Box<dyn Fn() + Send>,
    }

    impl Subscription {
        pub fn new(task: JoinHandle<()>, unsubscribe: Box<dyn Fn() + Send>) -> Self {
            Subscription { task, unsubscribe }
        }
    }

    impl Drop for Subscription {
        fn drop(&mut self) {
            (self.unsubscribe)();
        }
    }

    /// Subscribes to program events emitted on-chain.
    ///
    /// Establishes a WebSocket connection to the cluster and subscribes to
    /// transaction logs mentioning the program (or `mentioned`, when given).
    /// Each `Program data:` log line is decoded with [`parse_event`] and
    /// delivered through `callback`. Decode failures are delivered as the
    /// error argument rather than terminating the stream.
    ///
    /// The subscription runs until the returned [`Subscription`] is dropped.
    ///
    /// # Errors
    ///
    /// Fails if the WebSocket connection cannot be established or the log
    /// subscription itself is refused; an `Ok` return means the feed is
    /// live.
    pub async fn subscribe<F>(
        cluster: Cluster,
        mentioned: Option<String>,
        commitment: Option<CommitmentConfig>,
        callback: F,
    ) -> Result<Subscription, error::ClientError>
    where
        F: Fn(
                String,
                Option<PumpFunEvent>,
                Option<Box<dyn Error + Send + Sync>>,
                Response<RpcLogsResponse>,
            ) + Send
            + Sync
            + 'static,
    {
        let ws_url = &cluster.rpc.ws;
        let pubsub_client = PubsubClient::new(ws_url)
            .await
            .map_err(error::ClientError::PubsubClientError)?;

        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
        let (cb_tx, mut cb_rx) = mpsc::channel(1000);

        tokio::spawn(async move {
            while let Some((sig, event, err, log)) = cb_rx.recv().await {
                callback(sig, event, err, log);
            }
        });

        // The log stream borrows the pubsub client, so the subscription has
        // to be made inside the task that owns it; readiness is reported
        // back through a oneshot so a refused subscription surfaces as an
        // error here instead of a silently dead handle.
        let task = tokio::spawn(async move {
            let subscription = pubsub_client
                .logs_subscribe(
                    RpcTransactionLogsFilter::Mentions(vec![
                        mentioned.unwrap_or(constants::accounts::PUMPFUN.to_string())
                    ]),
                    RpcTransactionLogsConfig {
                        commitment: Some(commitment.unwrap_or(cluster.commitment)),
                    },
                )
                .await;
            let (mut stream, unsubscribe) = match subscription {
                Ok(subscription) => {
                    let _ = ready_tx.send(Ok(()));
                    subscription
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => break,
                    maybe_log = stream.next() => {
                        let Some(log) = maybe_log else { break };
                        let signature = &log.value.signature;
                        for log_line in &log.value.logs {
                            if let Some(data) = log_line.strip_prefix("Program data: ") {
                                match parse_event(signature, data) {
                                    Ok(event) => {
                                        let _ = cb_tx
                                            .send((
                                                signature.to_string(),
                                                Some(event),
                                                None,
                                                log.clone(),
                                            ))
                                            .await;
                                    }
                                    Err(err) => {
                                        let _ = cb_tx
                                            .send((
                                                signature.to_string(),
                                                None,
                                                Some(err),
                                                log.clone(),
                                            ))
                                            .await;
                                    }
                                }
                            }
                        }
                    }
                }
            }

            drop(stream);
            unsubscribe().await;
        });

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                task.abort();
                return Err(error::ClientError::PubsubClientError(err));
            }
            Err(_) => {
                task.abort();
                return Err(error::ClientError::OtherError(
                    "event feed task exited before subscribing".to_string(),
                ));
            }
        }

        Ok(Subscription::new(
            task,
            Box::new(move || {
                let _ = stop_tx.try_send(());
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(discriminator: [u8; 8], body: &impl BorshSerialize) -> String {
        let mut bytes = discriminator.to_vec();
        body.serialize(&mut bytes).unwrap();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn sample_trade() -> TradeEvent {
        TradeEvent {
            mint: Pubkey::new_unique(),
            sol_amount: 1_000_000_000,
            token_amount: 35_000_000_000_000,
            is_buy: true,
            user: Pubkey::new_unique(),
            timestamp: 1_700_000_000,
            virtual_sol_reserves: 31_000_000_000,
            virtual_token_reserves: 1_038_000_000_000_000,
            real_sol_reserves: 1_000_000_000,
            real_token_reserves: 758_000_000_000_000,
        }
    }

    #[test]
    fn trade_event_round_trips() {
        let event = sample_trade();
        let data = encode(TRADE_EVENT_DISCRIMINATOR, &event);

        match parse_event("sig", &data).unwrap() {
            PumpFunEvent::Trade(decoded) => {
                assert_eq!(decoded.mint, event.mint);
                assert_eq!(decoded.sol_amount, event.sol_amount);
                assert_eq!(decoded.token_amount, event.token_amount);
                assert!(decoded.is_buy);
                assert_eq!(decoded.real_token_reserves, event.real_token_reserves);
            }
            other => panic!("expected Trade, got {:?}", other),
        }
    }

    #[test]
    fn trailing_bytes_are_tolerated() {
        // Newer program versions append fields to the trade event
        let mut bytes = TRADE_EVENT_DISCRIMINATOR.to_vec();
        borsh::BorshSerialize::serialize(&sample_trade(), &mut bytes).unwrap();
        bytes.extend_from_slice(&[7u8; 48]);
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);

        assert!(matches!(
            parse_event("sig", &data).unwrap(),
            PumpFunEvent::Trade(_)
        ));
    }

    #[test]
    fn create_event_decodes() {
        let event = CreateEvent {
            name: "Token".to_string(),
            symbol: "TKN".to_string(),
            uri: "https://example.com/meta.json".to_string(),
            mint: Pubkey::new_unique(),
            bonding_curve: Pubkey::new_unique(),
            user: Pubkey::new_unique(),
        };
        let data = encode(CREATE_EVENT_DISCRIMINATOR, &event);

        match parse_event("sig", &data).unwrap() {
            PumpFunEvent::Create(decoded) => {
                assert_eq!(decoded.symbol, "TKN");
                assert_eq!(decoded.mint, event.mint);
            }
            other => panic!("expected Create, got {:?}", other),
        }
    }

    #[test]
    fn unknown_discriminator_is_not_an_error() {
        let mut bytes = vec![9u8; 8];
        bytes.extend_from_slice(&[1, 2, 3]);
        let data = base64::engine::general_purpose::STANDARD.encode(&bytes);

        match parse_event("sig", &data).unwrap() {
            PumpFunEvent::Unknown(signature, payload) => {
                assert_eq!(signature, "sig");
                assert_eq!(payload, bytes);
            }
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn short_or_invalid_payloads_fail() {
        assert!(parse_event("sig", "not base64!!").is_err());

        let short = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]);
        assert!(parse_event("sig", &short).is_err());
    }

    #[test]
    fn recognized_discriminator_with_garbage_body_fails() {
        let mut bytes = TRADE_EVENT_DISCRIMINATOR.to_vec();
        bytes.extend_from_slice(&[1, 2, 3]); // far too short for the body
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);

        assert!(parse_event("sig", &data).is_err());
    }
}

#[cfg(all(test, feature = "stream"))]
mod subscription_tests {
    use super::*;
    use crate::common::types::{Cluster, PriorityFee};
    use crate::error::ClientError;
    use solana_sdk::commitment_config::CommitmentConfig;

    #[tokio::test]
    async fn subscribe_fails_fast_on_unreachable_endpoint() {
        // Nothing listens on this port; the caller gets the error instead
        // of a dead subscription handle.
        let cluster = Cluster::new(
            "http://127.0.0.1:1".to_string(),
            "ws://127.0.0.1:1".to_string(),
            CommitmentConfig::processed(),
            PriorityFee::default(),
        );

        let result = subscribe(cluster, None, None, |_, _, _, _| {}).await;
        assert!(matches!(result, Err(ClientError::PubsubClientError(_))));
    }
}
