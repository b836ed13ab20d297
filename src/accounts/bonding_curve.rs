//! Bonding curve account for the Pump.fun program.
//!
//! One curve account exists per token mint. It holds the real and virtual
//! reserve balances that drive the constant product pricing, plus the
//! completion flag set when the curve is finalized and migrated.
//!
//! All pricing here is pure integer arithmetic over a snapshot of the
//! reserves. The snapshot may be stale by the time a transaction lands; the
//! on-chain program's own slippage check is the authority, and a stale quote
//! surfaces as a retryable program failure, not a client defect.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::ClientError;

/// Per-token bonding curve state.
#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct BondingCurveAccount {
    /// Virtual token reserves used for pricing
    pub virtual_token_reserves: u64,
    /// Virtual SOL reserves used for pricing
    pub virtual_sol_reserves: u64,
    /// Real token reserves still available for purchase
    pub real_token_reserves: u64,
    /// Real SOL reserves held by the curve
    pub real_sol_reserves: u64,
    /// Total token supply minted for this curve
    pub token_total_supply: u64,
    /// Set once the curve is finalized; trading is closed afterwards
    pub complete: bool,
    /// Wallet that created the token
    pub creator: Pubkey,
}

impl BondingCurveAccount {
    /// Anchor account discriminator (`sha256("account:BondingCurve")[..8]`)
    pub const DISCRIMINATOR: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

    /// Decodes a raw account buffer.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MalformedAccount` if the buffer is shorter than
    /// the fixed layout or the discriminator does not match.
    pub fn from_buffer(data: &[u8]) -> Result<Self, ClientError> {
        if data.len() < 8 {
            return Err(ClientError::MalformedAccount(format!(
                "bonding curve buffer too short: {} bytes",
                data.len()
            )));
        }
        if data[..8] != Self::DISCRIMINATOR {
            return Err(ClientError::MalformedAccount(
                "bonding curve discriminator mismatch".to_string(),
            ));
        }
        solana_sdk::borsh1::try_from_slice_unchecked::<Self>(&data[8..])
            .map_err(|err| ClientError::MalformedAccount(format!("bonding curve: {}", err)))
    }

    /// Encodes the account back to its on-chain buffer layout.
    pub fn to_buffer(&self) -> Result<Vec<u8>, ClientError> {
        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        self.serialize(&mut data).map_err(ClientError::BorshError)?;
        Ok(data)
    }

    /// Calculates the amount of tokens received for `amount` lamports.
    ///
    /// Constant product over the virtual reserves, with the program's
    /// conservative `+1` rounding on the reserve kept by the curve. The
    /// result is capped at the real token reserves still for sale.
    ///
    /// # Errors
    ///
    /// - `ClientError::CurveCompleted` when the curve is finalized
    /// - `ClientError::InvalidAmount` when `amount` is zero
    pub fn get_buy_price(&self, amount: u64) -> Result<u64, ClientError> {
        if self.complete {
            return Err(ClientError::CurveCompleted);
        }
        if amount == 0 {
            return Err(ClientError::InvalidAmount);
        }

        // Invariant product of the virtual reserves
        let n: u128 = (self.virtual_sol_reserves as u128) * (self.virtual_token_reserves as u128);

        // SOL reserves after the buy
        let i: u128 = (self.virtual_sol_reserves as u128) + (amount as u128);

        // Token reserves the curve must keep, rounded up in its own favor
        let r: u128 = n / i + 1;

        // Tokens released to the buyer
        let s: u128 = (self.virtual_token_reserves as u128) - r;

        if s < (self.real_token_reserves as u128) {
            Ok(s as u64)
        } else {
            Ok(self.real_token_reserves)
        }
    }

    /// Calculates the SOL received for selling `amount` tokens, net of the
    /// protocol fee.
    ///
    /// `fee_basis_points` comes from the global account at call time; it is
    /// never hard-coded because fee policy can change between calls.
    ///
    /// # Errors
    ///
    /// - `ClientError::CurveCompleted` when the curve is finalized
    /// - `ClientError::InvalidAmount` when `amount` is zero
    /// - `ClientError::InsufficientLiquidity` when `amount` exceeds the real
    ///   token reserves
    pub fn get_sell_price(&self, amount: u64, fee_basis_points: u64) -> Result<u64, ClientError> {
        if self.complete {
            return Err(ClientError::CurveCompleted);
        }
        if amount == 0 {
            return Err(ClientError::InvalidAmount);
        }
        if amount > self.real_token_reserves {
            return Err(ClientError::InsufficientLiquidity);
        }

        // Gross SOL out that keeps the product invariant
        let n: u128 = (amount as u128) * (self.virtual_sol_reserves as u128)
            / ((self.virtual_token_reserves as u128) + (amount as u128));

        // Fee taken from the output side, rounded down
        let fee: u128 = n * (fee_basis_points as u128) / 10_000;

        Ok((n - fee) as u64)
    }

    /// Applies a buy to the reserve snapshot, mirroring what the program
    /// does on chain. Used to quote a sequence of buys that will execute
    /// back to back against the same curve.
    pub fn apply_buy(&mut self, sol_amount: u64, token_amount: u64) {
        self.virtual_sol_reserves += sol_amount;
        self.real_sol_reserves += sol_amount;
        self.virtual_token_reserves -= token_amount;
        self.real_token_reserves -= token_amount;
    }

    /// Instantaneous marginal price in lamports per token.
    ///
    /// Display and quoting only. Amounts that feed instruction construction
    /// must go through `get_buy_price` / `get_sell_price`, which stay in
    /// integer arithmetic.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::CurveCompleted` when the curve is finalized.
    pub fn get_current_price(&self) -> Result<f64, ClientError> {
        if self.complete {
            return Err(ClientError::CurveCompleted);
        }
        if self.virtual_token_reserves == 0 {
            return Err(ClientError::InsufficientLiquidity);
        }
        Ok(self.virtual_sol_reserves as f64 / self.virtual_token_reserves as f64)
    }
}
