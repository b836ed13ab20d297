//! Shared configuration types and the on-chain event decoder.

pub mod stream;
pub mod types;
