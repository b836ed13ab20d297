use std::sync::Arc;

use pumpfun_bundler::{
    common::types::{Cluster, PriorityFee},
    PumpFun,
};
use solana_sdk::{commitment_config::CommitmentConfig, signature::Keypair};

/// Shared context for integration tests. Wallets are ephemeral; network
/// tests only read public accounts and never spend from them.
pub struct TestContext {
    pub client: PumpFun,
    pub mint: Keypair,
    pub buyers: Vec<Keypair>,
}

impl Default for TestContext {
    fn default() -> Self {
        let payer = Arc::new(Keypair::new());
        let cluster = Cluster::mainnet(CommitmentConfig::confirmed(), PriorityFee::default());

        Self {
            client: PumpFun::new(payer, cluster),
            mint: Keypair::new(),
            buyers: (0..3).map(|_| Keypair::new()).collect(),
        }
    }
}
