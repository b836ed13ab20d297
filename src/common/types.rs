//! Common types and utilities for the bundler client
//!
//! This module provides common types that are used throughout the crate, including:
//!
//! - Configuration structures for Solana clusters and the bundle relay
//! - Priority fee settings for transactions
//! - Helper methods for connecting to different Solana networks
//!
//! These utilities help with configuring the connection to the Solana blockchain
//! and managing transaction parameters.

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;

use crate::constants;

/// Configuration for priority fee compute unit parameters
///
/// Priority fees allow transactions to be prioritized by validators based on
/// the fee paid per compute unit.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityFee {
    /// Maximum compute units that can be consumed by the transaction
    pub unit_limit: Option<u32>,
    /// Price in micro-lamports per compute unit
    pub unit_price: Option<u64>,
}

impl PriorityFee {
    /// Creates a new priority fee configuration
    ///
    /// # Arguments
    ///
    /// * `unit_limit` - Maximum compute units that can be consumed by the transaction
    /// * `unit_price` - Price in micro-lamports per compute unit
    pub fn new(unit_limit: Option<u32>, unit_price: Option<u64>) -> Self {
        PriorityFee {
            unit_limit,
            unit_price,
        }
    }
}

/// RPC connection endpoints for a Solana cluster
///
/// # Fields
///
/// * `http` - HTTP endpoint URL for JSON RPC requests
/// * `ws` - WebSocket endpoint URL for subscription-based requests
#[derive(Debug, Clone)]
pub struct RpcEndpoint {
    pub http: String,
    pub ws: String,
}

impl RpcEndpoint {
    /// Creates a new RPC endpoint configuration
    pub fn new(http: String, ws: String) -> Self {
        RpcEndpoint { http, ws }
    }
}

/// Configuration for connecting to a Solana cluster
///
/// This structure contains everything needed to talk to a Solana cluster:
/// the RPC endpoints, the block-engine relay endpoint for atomic bundle
/// submission, the commitment level used for confirmations, and priority
/// fee defaults for built transactions.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub rpc: RpcEndpoint,
    /// Block-engine endpoint used by the atomic relay submission path
    pub relay: String,
    pub commitment: CommitmentConfig,
    pub priority_fee: PriorityFee,
}

impl Cluster {
    /// Creates a new cluster configuration with custom RPC endpoints.
    ///
    /// The relay endpoint defaults to the mainnet block engine; override it
    /// with [`Cluster::with_relay`].
    pub fn new(
        http: String,
        ws: String,
        commitment: CommitmentConfig,
        priority_fee: PriorityFee,
    ) -> Self {
        Self {
            rpc: RpcEndpoint { http, ws },
            relay: constants::relay::MAINNET_BLOCK_ENGINE.to_string(),
            commitment,
            priority_fee,
        }
    }

    /// Replaces the relay endpoint.
    pub fn with_relay(mut self, relay: String) -> Self {
        self.relay = relay;
        self
    }

    /// Creates a configuration for the Solana mainnet-beta cluster
    pub fn mainnet(commitment: CommitmentConfig, priority_fee: PriorityFee) -> Self {
        Self::new(
            "https://api.mainnet-beta.solana.com".to_string(),
            "wss://api.mainnet-beta.solana.com".to_string(),
            commitment,
            priority_fee,
        )
    }

    /// Creates a configuration for the Solana devnet cluster
    pub fn devnet(commitment: CommitmentConfig, priority_fee: PriorityFee) -> Self {
        Self::new(
            "https://api.devnet.solana.com".to_string(),
            "wss://api.devnet.solana.com".to_string(),
            commitment,
            priority_fee,
        )
    }

    /// Creates a configuration for a local Solana validator
    pub fn localnet(commitment: CommitmentConfig, priority_fee: PriorityFee) -> Self {
        Self::new(
            "http://localhost:8899".to_string(),
            "ws://localhost:8900".to_string(),
            commitment,
            priority_fee,
        )
    }
}
