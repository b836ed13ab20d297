//! Account definitions for the Pump.fun Solana Program
//!
//! This module contains the decoders for the two fixed-layout program
//! accounts and the client-side pricing math derived from them.
//!
//! - `GlobalAccount`: network-wide configuration (fees, initial curve
//!   constants), one per deployment.
//! - `BondingCurveAccount`: per-token curve state (reserves, completion
//!   flag), one per mint.
//!
//! Both buffers start with an 8-byte Anchor discriminator followed by
//! little-endian Borsh fields. Decoding verifies the discriminator and
//! rejects short buffers with `ClientError::MalformedAccount`.

mod bonding_curve;
mod global;

pub use bonding_curve::*;
pub use global::*;
