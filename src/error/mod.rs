//! Error types for the bundler SDK.
//!
//! `ClientError` covers every failure the crate can surface: local validation
//! (malformed account buffers, pricing preconditions, bundle assembly),
//! network failures from the Solana RPC client, and relay-specific failures
//! from the atomic bundle path.
//!
//! Local validation errors (`MalformedAccount`, `CurveCompleted`,
//! `InsufficientLiquidity`, `InvalidAmount`, `EmptyBundle`, `SignerMismatch`)
//! indicate a caller logic error and are never worth retrying. Rejection and
//! timeout outcomes of a submission that made it onto the wire are not
//! errors; they come back as a failed `SubmissionResult`, and the crate
//! never retries a state-changing submission on its own.

use solana_sdk::pubkey::Pubkey;

#[derive(Debug)]
pub enum ClientError {
    /// Account buffer too short or carrying the wrong discriminator
    MalformedAccount(String),
    /// The bonding curve has completed; trading against it is closed
    CurveCompleted,
    /// Requested amount exceeds what the curve can pay out
    InsufficientLiquidity,
    /// Zero or otherwise unusable amount supplied
    InvalidAmount,
    /// Bundle assembled from zero instruction sets
    EmptyBundle,
    /// An instruction requires a signer that was not provided
    SignerMismatch(Pubkey),
    /// Bonding curve account was not found on chain
    BondingCurveNotFound,
    /// Error deserializing data using Borsh
    BorshError(std::io::Error),
    /// Error from Solana RPC client
    SolanaClientError(solana_client::client_error::ClientError),
    /// Error from Solana Pubsub client
    #[cfg(feature = "stream")]
    PubsubClientError(solana_client::pubsub_client::PubsubClientError),
    /// Error uploading token metadata
    UploadMetadataError(Box<dyn std::error::Error + Send + Sync>),
    /// Other error
    OtherError(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedAccount(msg) => write!(f, "Malformed account buffer: {}", msg),
            Self::CurveCompleted => write!(f, "Bonding curve is complete; trading is closed"),
            Self::InsufficientLiquidity => write!(f, "Insufficient liquidity on bonding curve"),
            Self::InvalidAmount => write!(f, "Amount must be greater than zero"),
            Self::EmptyBundle => write!(f, "Bundle contains no instruction sets"),
            Self::SignerMismatch(pubkey) => {
                write!(f, "Instruction requires undeclared signer: {}", pubkey)
            }
            Self::BondingCurveNotFound => write!(f, "Bonding curve not found"),
            Self::BorshError(err) => write!(f, "Borsh serialization error: {}", err),
            Self::SolanaClientError(err) => write!(f, "Solana client error: {}", err),
            #[cfg(feature = "stream")]
            Self::PubsubClientError(err) => write!(f, "Solana pubsub client error: {}", err),
            Self::UploadMetadataError(err) => write!(f, "Metadata upload error: {}", err),
            Self::OtherError(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BorshError(err) => Some(err),
            Self::SolanaClientError(err) => Some(err),
            #[cfg(feature = "stream")]
            Self::PubsubClientError(err) => Some(err),
            Self::UploadMetadataError(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<solana_client::client_error::ClientError> for ClientError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        Self::SolanaClientError(err)
    }
}

#[cfg(feature = "stream")]
impl From<solana_client::pubsub_client::PubsubClientError> for ClientError {
    fn from(err: solana_client::pubsub_client::PubsubClientError) -> Self {
        Self::PubsubClientError(err)
    }
}
