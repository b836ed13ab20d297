//! Global configuration account for the Pump.fun program.
//!
//! The global account stores the deployment-wide fee policy and the virtual
//! reserve constants used to price a brand-new curve before its bonding
//! curve account exists on chain.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::ClientError;

/// Network-wide configuration: fee policy and initial curve constants.
///
/// Read-only to this crate; fetched on demand and never cached across
/// pricing calls, since fee policy can change between calls.
#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct GlobalAccount {
    /// Whether the global account has been initialized
    pub initialized: bool,
    /// Authority that can modify global settings
    pub authority: Pubkey,
    /// Account that receives protocol fees
    pub fee_recipient: Pubkey,
    /// Virtual token reserves a new curve starts with
    pub initial_virtual_token_reserves: u64,
    /// Virtual SOL reserves a new curve starts with
    pub initial_virtual_sol_reserves: u64,
    /// Real token reserves a new curve starts with
    pub initial_real_token_reserves: u64,
    /// Total token supply minted per curve
    pub token_total_supply: u64,
    /// Protocol fee in basis points (1/100th of a percent)
    pub fee_basis_points: u64,
}

impl GlobalAccount {
    /// Anchor account discriminator (`sha256("account:Global")[..8]`)
    pub const DISCRIMINATOR: [u8; 8] = [167, 232, 232, 177, 200, 108, 114, 127];

    /// Decodes a raw account buffer.
    ///
    /// Verifies the leading discriminator before touching the field region,
    /// so a buffer of the wrong account kind is rejected rather than
    /// silently misread.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MalformedAccount` if the buffer is shorter than
    /// the fixed layout or the discriminator does not match.
    pub fn from_buffer(data: &[u8]) -> Result<Self, ClientError> {
        if data.len() < 8 {
            return Err(ClientError::MalformedAccount(format!(
                "global account buffer too short: {} bytes",
                data.len()
            )));
        }
        if data[..8] != Self::DISCRIMINATOR {
            return Err(ClientError::MalformedAccount(
                "global account discriminator mismatch".to_string(),
            ));
        }
        solana_sdk::borsh1::try_from_slice_unchecked::<Self>(&data[8..])
            .map_err(|err| ClientError::MalformedAccount(format!("global account: {}", err)))
    }

    /// Encodes the account back to its on-chain buffer layout. Used to build
    /// fixtures; the program itself owns the authoritative encoding.
    pub fn to_buffer(&self) -> Result<Vec<u8>, ClientError> {
        let mut data = Vec::with_capacity(128);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        self.serialize(&mut data).map_err(ClientError::BorshError)?;
        Ok(data)
    }

    /// Prices a buy against the *initial virtual* reserves.
    ///
    /// Only valid before the curve has any real reserves, i.e. for the first
    /// buy placed in the same transaction as the create instruction. Output
    /// is capped at the initial real token reserves.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidAmount` when `amount` is zero.
    pub fn get_initial_buy_price(&self, amount: u64) -> Result<u64, ClientError> {
        if amount == 0 {
            return Err(ClientError::InvalidAmount);
        }

        let n: u128 = (self.initial_virtual_sol_reserves as u128)
            * (self.initial_virtual_token_reserves as u128);
        let i: u128 = (self.initial_virtual_sol_reserves as u128) + (amount as u128);
        let r: u128 = n / i + 1;
        let s: u128 = (self.initial_virtual_token_reserves as u128) - r;

        if s < (self.initial_real_token_reserves as u128) {
            Ok(s as u64)
        } else {
            Ok(self.initial_real_token_reserves)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_global() -> GlobalAccount {
        GlobalAccount {
            initialized: true,
            authority: Pubkey::new_unique(),
            fee_recipient: Pubkey::new_unique(),
            initial_virtual_token_reserves: 1_073_000_000_000_000,
            initial_virtual_sol_reserves: 30_000_000_000,
            initial_real_token_reserves: 793_100_000_000_000,
            token_total_supply: 1_000_000_000_000_000,
            fee_basis_points: 100,
        }
    }

    #[test]
    fn initial_buy_price_rejects_zero() {
        let global = get_global();
        assert!(matches!(
            global.get_initial_buy_price(0),
            Err(ClientError::InvalidAmount)
        ));
    }

    #[test]
    fn initial_buy_price_is_positive_and_capped() {
        let global = get_global();

        let price = global.get_initial_buy_price(1_000_000_000).unwrap();
        assert!(price > 0);
        assert!(price <= global.initial_real_token_reserves);

        // Arbitrarily large spend is capped by the real reserve
        let price = global.get_initial_buy_price(u64::MAX).unwrap();
        assert_eq!(price, global.initial_real_token_reserves);
    }

    #[test]
    fn initial_buy_price_survives_max_reserves() {
        let global = GlobalAccount {
            initial_virtual_token_reserves: u64::MAX,
            initial_virtual_sol_reserves: u64::MAX,
            initial_real_token_reserves: u64::MAX / 2,
            ..get_global()
        };

        let price = global.get_initial_buy_price(u64::MAX).unwrap();
        assert!(price > 0);
        assert!(price <= global.initial_real_token_reserves);
    }

    #[test]
    fn buffer_round_trip() {
        let global = get_global();
        let buffer = global.to_buffer().unwrap();
        let decoded = GlobalAccount::from_buffer(&buffer).unwrap();
        assert_eq!(decoded, global);
    }

    #[test]
    fn short_buffer_is_malformed() {
        for len in 0..8 {
            let buffer = vec![0u8; len];
            assert!(matches!(
                GlobalAccount::from_buffer(&buffer),
                Err(ClientError::MalformedAccount(_))
            ));
        }

        // Discriminator present but field region truncated
        let mut buffer = GlobalAccount::DISCRIMINATOR.to_vec();
        buffer.extend_from_slice(&[0u8; 4]);
        assert!(matches!(
            GlobalAccount::from_buffer(&buffer),
            Err(ClientError::MalformedAccount(_))
        ));
    }

    #[test]
    fn wrong_discriminator_is_malformed() {
        let mut buffer = get_global().to_buffer().unwrap();
        buffer[0] ^= 0xff;
        assert!(matches!(
            GlobalAccount::from_buffer(&buffer),
            Err(ClientError::MalformedAccount(_))
        ));
    }
}
