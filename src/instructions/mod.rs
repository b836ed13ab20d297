//! Instruction builders for the Pump.fun program.
//!
//! Each builder is a pure function of its inputs: the method discriminator,
//! borsh-serialized arguments, and the pinned account list of the deployed
//! program. Builders take public keys rather than keypairs so that
//! instruction sets can be assembled for any wallet in a multi-wallet
//! bundle; signing happens at submission time.
//!
//! # Instructions
//!
//! - `Create`: creates a new token with an associated bonding curve.
//! - `Buy`: buys tokens from a bonding curve by providing SOL.
//! - `Sell`: sells tokens back to the bonding curve in exchange for SOL.

mod buy;
mod create;
mod sell;

pub use buy::*;
pub use create::*;
pub use sell::*;
