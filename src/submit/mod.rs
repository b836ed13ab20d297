//! Submission paths for assembled bundles.
//!
//! Two first-class, caller-selectable paths:
//!
//! - **Direct**: the bundle's instruction sets are flattened into a single
//!   transaction signed by every required wallet and broadcast through the
//!   normal RPC path, then polled to the configured commitment.
//! - **Atomic relay**: each instruction set becomes its own transaction and
//!   the group is posted to a Jito block engine as one bundle. The relay
//!   includes every transaction or none, so a rejection leaves zero partial
//!   effects on chain.
//!
//! State machine per submission: Built -> Signed -> Submitted ->
//! {Confirmed | Rejected | TimedOut}. A timed-out submission is reported as
//! failure but the transaction may still land later; the crate performs no
//! automatic retry because retrying a state-changing submission without
//! idempotency tracking risks duplicate execution.

use std::time::Duration;

use base64::Engine;
use isahc::{AsyncReadResponseExt, Request, RequestExt};
use log::{debug, warn};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
    transaction::Transaction,
};

use crate::{bundle::Bundle, constants, error::ClientError};

/// How often confirmation status is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(400);

/// Default confirmation budget when the caller does not supply one.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// Which path a submission takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Standard RPC broadcast of a single flattened transaction
    Direct,
    /// All-or-nothing bundle relay, paying `tip_lamports` on top of network fees
    AtomicRelay { tip_lamports: u64 },
}

/// How a submission terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Confirmed at the requested commitment
    Confirmed,
    /// Rejected by the network or the relay; guaranteed not applied
    Rejected,
    /// Confirmation not observed within the deadline; the transaction may
    /// still land later
    TimedOut,
}

/// Terminal outcome of a submission. Immutable once returned.
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    /// Whether the submission was confirmed at the requested commitment
    pub success: bool,
    /// How the submission terminated
    pub outcome: SubmissionOutcome,
    /// Lead transaction signature, when one was produced
    pub signature: Option<Signature>,
    /// Failure detail, when `success` is false
    pub error: Option<String>,
}

impl SubmissionResult {
    fn confirmed(signature: Signature) -> Self {
        Self {
            success: true,
            outcome: SubmissionOutcome::Confirmed,
            signature: Some(signature),
            error: None,
        }
    }

    fn rejected(signature: Option<Signature>, error: String) -> Self {
        Self {
            success: false,
            outcome: SubmissionOutcome::Rejected,
            signature,
            error: Some(error),
        }
    }

    fn timed_out(signature: Signature) -> Self {
        Self {
            success: false,
            outcome: SubmissionOutcome::TimedOut,
            signature: Some(signature),
            error: Some(
                "confirmation not observed within timeout; execution outcome unknown".to_string(),
            ),
        }
    }
}

/// Relay verdict for a posted bundle.
#[derive(Debug)]
pub enum RelayResponse {
    /// Bundle accepted; carries the relay's bundle id
    Accepted(String),
    /// Bundle rejected or the relay was unreachable; nothing was applied
    Rejected(String),
}

fn resolve_signers<'a>(
    required: &[Pubkey],
    signers: &[&'a Keypair],
) -> Result<Vec<&'a Keypair>, ClientError> {
    required
        .iter()
        .map(|pubkey| {
            signers
                .iter()
                .find(|keypair| keypair.pubkey() == *pubkey)
                .copied()
                .ok_or(ClientError::SignerMismatch(*pubkey))
        })
        .collect()
}

/// Deterministic tip account choice so repeated builds of the same bundle
/// target the same account.
fn tip_account(payer: &Pubkey) -> Pubkey {
    let index = payer.to_bytes()[0] as usize % constants::relay::TIP_ACCOUNTS.len();
    constants::relay::TIP_ACCOUNTS[index]
}

/// Flattens a bundle into one signed transaction (the direct path).
pub fn build_flattened_transaction(
    bundle: &Bundle,
    signers: &[&Keypair],
    recent_blockhash: Hash,
) -> Result<Transaction, ClientError> {
    let instructions: Vec<_> = bundle
        .sets
        .iter()
        .flat_map(|set| set.instructions.iter().cloned())
        .collect();
    let keypairs = resolve_signers(&bundle.signer_identities(), signers)?;

    Ok(Transaction::new_signed_with_payer(
        &instructions,
        Some(&bundle.payer),
        &keypairs,
        recent_blockhash,
    ))
}

/// Builds one signed transaction per instruction set (the relay path), with
/// the relay tip transfer appended to the first set.
pub fn build_bundle_transactions(
    bundle: &Bundle,
    signers: &[&Keypair],
    tip_lamports: u64,
    recent_blockhash: Hash,
) -> Result<Vec<Transaction>, ClientError> {
    if bundle.sets.is_empty() {
        return Err(ClientError::EmptyBundle);
    }
    if bundle.sets.len() > constants::relay::MAX_BUNDLE_TRANSACTIONS {
        return Err(ClientError::OtherError(format!(
            "bundle has {} transactions; relay accepts at most {}",
            bundle.sets.len(),
            constants::relay::MAX_BUNDLE_TRANSACTIONS
        )));
    }

    let mut transactions = Vec::with_capacity(bundle.sets.len());
    for (index, set) in bundle.sets.iter().enumerate() {
        if set.instructions.is_empty() {
            return Err(ClientError::EmptyBundle);
        }

        let mut instructions = set.instructions.clone();
        if index == 0 && tip_lamports > 0 {
            instructions.push(system_instruction::transfer(
                &bundle.payer,
                &tip_account(&bundle.payer),
                tip_lamports,
            ));
        }

        let mut required = vec![bundle.payer];
        for signer in &set.signers {
            if !required.contains(signer) {
                required.push(*signer);
            }
        }
        let keypairs = resolve_signers(&required, signers)?;

        transactions.push(Transaction::new_signed_with_payer(
            &instructions,
            Some(&bundle.payer),
            &keypairs,
            recent_blockhash,
        ));
    }

    Ok(transactions)
}

fn parse_relay_response(status: u16, body: &str) -> RelayResponse {
    if status != 200 {
        return RelayResponse::Rejected(format!("relay returned HTTP {}: {}", status, body));
    }
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => return RelayResponse::Rejected(format!("unparseable relay response: {}", err)),
    };
    if let Some(error) = value.get("error") {
        return RelayResponse::Rejected(format!("relay rejected bundle: {}", error));
    }
    match value.get("result").and_then(|result| result.as_str()) {
        Some(bundle_id) => RelayResponse::Accepted(bundle_id.to_string()),
        None => RelayResponse::Rejected(format!("relay response missing bundle id: {}", body)),
    }
}

/// Posts signed transactions to the relay as one bundle.
///
/// Transport failures are reported as `RelayResponse::Rejected` rather than
/// an error: either way the relay guarantees nothing was applied.
pub async fn send_to_relay(
    relay_url: &str,
    transactions: &[Transaction],
) -> Result<RelayResponse, ClientError> {
    let encoded: Vec<String> = transactions
        .iter()
        .map(|tx| {
            bincode::serialize(tx)
                .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes))
                .map_err(|err| {
                    ClientError::OtherError(format!("failed to serialize transaction: {}", err))
                })
        })
        .collect::<Result<_, _>>()?;

    let payload = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "sendBundle",
        "params": [encoded, { "encoding": "base64" }],
    });

    let request = Request::post(relay_url)
        .header("content-type", "application/json")
        .body(payload.to_string())
        .map_err(|err| ClientError::OtherError(format!("failed to build relay request: {}", err)))?;

    let mut response = match request.send_async().await {
        Ok(response) => response,
        Err(err) => {
            return Ok(RelayResponse::Rejected(format!(
                "relay unreachable: {}",
                err
            )))
        }
    };

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Ok(parse_relay_response(status, &body))
}

/// Polls a signature until it reaches `commitment`, fails on chain, or the
/// timeout elapses. Transient RPC errors are logged and polling continues
/// until the deadline.
pub async fn await_confirmation(
    rpc: &RpcClient,
    signature: &Signature,
    commitment: CommitmentConfig,
    timeout: Duration,
) -> SubmissionResult {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match rpc
            .get_signature_status_with_commitment(signature, commitment)
            .await
        {
            Ok(Some(Ok(()))) => return SubmissionResult::confirmed(*signature),
            Ok(Some(Err(err))) => {
                return SubmissionResult::rejected(
                    Some(*signature),
                    format!("transaction failed on chain: {}", err),
                )
            }
            Ok(None) => {}
            Err(err) => warn!("status poll failed for {}: {}", signature, err),
        }

        if tokio::time::Instant::now() >= deadline {
            return SubmissionResult::timed_out(*signature);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Submits a bundle as a single transaction through the normal RPC path and
/// waits for confirmation.
///
/// # Errors
///
/// Local failures (missing signers, empty bundle) are returned as `Err`;
/// network rejection and timeout outcomes come back as a failed
/// `SubmissionResult`.
pub async fn submit_direct(
    rpc: &RpcClient,
    bundle: &Bundle,
    signers: &[&Keypair],
    commitment: CommitmentConfig,
    timeout: Duration,
) -> Result<SubmissionResult, ClientError> {
    let recent_blockhash = rpc
        .get_latest_blockhash()
        .await
        .map_err(ClientError::SolanaClientError)?;
    let transaction = build_flattened_transaction(bundle, signers, recent_blockhash)?;
    let signature = transaction.signatures[0];

    if let Err(err) = rpc.send_transaction(&transaction).await {
        return Ok(SubmissionResult::rejected(
            None,
            format!("broadcast rejected: {}", err),
        ));
    }

    debug!("submitted transaction {}", signature);
    Ok(await_confirmation(rpc, &signature, commitment, timeout).await)
}

/// Submits a bundle through the atomic relay and waits for confirmation of
/// the lead transaction.
///
/// The relay fee (`tip_lamports`) is transferred from the bundle payer to a
/// relay tip account inside the first transaction. On relay rejection the
/// result reports failure with no signature: the bundle is guaranteed not
/// partially applied.
pub async fn submit_atomic_relay(
    rpc: &RpcClient,
    relay_url: &str,
    bundle: &Bundle,
    signers: &[&Keypair],
    tip_lamports: u64,
    commitment: CommitmentConfig,
    timeout: Duration,
) -> Result<SubmissionResult, ClientError> {
    let recent_blockhash = rpc
        .get_latest_blockhash()
        .await
        .map_err(ClientError::SolanaClientError)?;
    let transactions = build_bundle_transactions(bundle, signers, tip_lamports, recent_blockhash)?;

    match send_to_relay(relay_url, &transactions).await? {
        RelayResponse::Rejected(reason) => {
            warn!("relay rejected bundle: {}", reason);
            Ok(SubmissionResult::rejected(None, reason))
        }
        RelayResponse::Accepted(bundle_id) => {
            let lead = transactions[0].signatures[0];
            debug!("relay accepted bundle {} (lead {})", bundle_id, lead);
            Ok(await_confirmation(rpc, &lead, commitment, timeout).await)
        }
    }
}
