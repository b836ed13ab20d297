//! Instruction for selling tokens back to a bonding curve.

use crate::{constants, PumpFun};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::get_associated_token_address;

/// Instruction data for selling tokens back to a bonding curve
///
/// # Fields
///
/// * `amount` - Amount of tokens to sell (in token smallest units)
/// * `min_sol_output` - Minimum acceptable SOL received for the sale (slippage protection)
#[derive(BorshSerialize, BorshDeserialize, Clone)]
pub struct Sell {
    pub amount: u64,
    pub min_sol_output: u64,
}

impl Sell {
    /// Instruction discriminator used to identify this instruction
    pub const DISCRIMINATOR: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];

    /// Serializes the instruction data with the appropriate discriminator
    pub fn data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(24);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        self.serialize(&mut data).unwrap();
        data
    }
}

/// Creates an instruction to sell tokens back to a bonding curve.
///
/// # Arguments
///
/// * `seller` - Wallet that owns the tokens; must sign the transaction
/// * `mint` - Public key of the token mint to sell
/// * `fee_recipient` - Account that receives the protocol fee
/// * `creator` - Token creator, used to derive the creator fee vault
/// * `args` - Sell instruction data
///
/// # Account Requirements
///
/// The instruction requires the following accounts in this order:
/// 1. Global configuration PDA (readonly)
/// 2. Fee recipient account (writable)
/// 3. Token mint account (readonly)
/// 4. Bonding curve PDA (writable)
/// 5. Bonding curve token account (writable)
/// 6. Seller's token account (writable)
/// 7. Seller account (signer, writable)
/// 8. System program (readonly)
/// 9. Creator vault (writable)
/// 10. Token program (readonly)
/// 11. Event authority (readonly)
/// 12. Pump.fun program ID (readonly)
pub fn sell(
    seller: &Pubkey,
    mint: &Pubkey,
    fee_recipient: &Pubkey,
    creator: &Pubkey,
    args: Sell,
) -> Instruction {
    let bonding_curve: Pubkey = PumpFun::get_bonding_curve_pda(mint);
    let creator_vault: Pubkey = PumpFun::get_creator_vault_pda(creator);
    Instruction::new_with_bytes(
        constants::accounts::PUMPFUN,
        &args.data(),
        vec![
            AccountMeta::new_readonly(PumpFun::get_global_pda(), false),
            AccountMeta::new(*fee_recipient, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(bonding_curve, false),
            AccountMeta::new(get_associated_token_address(&bonding_curve, mint), false),
            AccountMeta::new(get_associated_token_address(seller, mint), false),
            AccountMeta::new(*seller, true),
            AccountMeta::new_readonly(constants::accounts::SYSTEM_PROGRAM, false),
            AccountMeta::new(creator_vault, false),
            AccountMeta::new_readonly(constants::accounts::TOKEN_PROGRAM, false),
            AccountMeta::new_readonly(constants::accounts::EVENT_AUTHORITY, false),
            AccountMeta::new_readonly(constants::accounts::PUMPFUN, false),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_starts_with_discriminator() {
        let args = Sell {
            amount: 5_000,
            min_sol_output: 10,
        };
        let data = args.data();
        assert_eq!(&data[..8], &Sell::DISCRIMINATOR);
        assert_eq!(&data[8..16], &5_000u64.to_le_bytes());
        assert_eq!(&data[16..24], &10u64.to_le_bytes());
    }

    #[test]
    fn seller_is_the_only_signer() {
        let seller = Pubkey::new_unique();
        let ix = sell(
            &seller,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            Sell {
                amount: 1,
                min_sol_output: 0,
            },
        );
        let signers: Vec<_> = ix.accounts.iter().filter(|meta| meta.is_signer).collect();
        assert_eq!(signers.len(), 1);
        assert_eq!(signers[0].pubkey, seller);
    }
}
