//! Instruction for buying tokens from a bonding curve.

use crate::{constants, PumpFun};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::get_associated_token_address;

/// Instruction data for buying tokens from a bonding curve
///
/// # Fields
///
/// * `amount` - Amount of tokens to buy (in token smallest units)
/// * `max_sol_cost` - Maximum acceptable SOL cost for the purchase (slippage protection)
#[derive(BorshSerialize, BorshDeserialize, Clone)]
pub struct Buy {
    pub amount: u64,
    pub max_sol_cost: u64,
}

impl Buy {
    /// Instruction discriminator used to identify this instruction
    pub const DISCRIMINATOR: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];

    /// Serializes the instruction data with the appropriate discriminator
    pub fn data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(24);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        self.serialize(&mut data).unwrap();
        data
    }
}

/// Creates an instruction to buy tokens from a bonding curve.
///
/// The token amount and the slippage-bounded maximum SOL cost in `args` come
/// from the pricing engine; the on-chain program re-checks both against the
/// live reserves and fails the transaction if the snapshot went stale.
///
/// # Arguments
///
/// * `buyer` - Wallet that pays SOL and receives tokens; must sign the transaction
/// * `mint` - Public key of the token mint to buy
/// * `fee_recipient` - Account that receives the protocol fee
/// * `creator` - Token creator, used to derive the creator fee vault
/// * `args` - Buy instruction data
///
/// # Account Requirements
///
/// The instruction requires the following accounts in this order:
/// 1. Global configuration PDA (readonly)
/// 2. Fee recipient account (writable)
/// 3. Token mint account (readonly)
/// 4. Bonding curve PDA (writable)
/// 5. Bonding curve token account (writable)
/// 6. Buyer's token account (writable)
/// 7. Buyer account (signer, writable)
/// 8. System program (readonly)
/// 9. Token program (readonly)
/// 10. Creator vault (writable)
/// 11. Event authority (readonly)
/// 12. Pump.fun program ID (readonly)
pub fn buy(buyer: &Pubkey, mint: &Pubkey, fee_recipient: &Pubkey, creator: &Pubkey, args: Buy) -> Instruction {
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
            AccountMeta::new(get_associated_token_address(buyer, mint), false),
            AccountMeta::new(*buyer, true),
            AccountMeta::new_readonly(constants::accounts::SYSTEM_PROGRAM, false),
            AccountMeta::new_readonly(constants::accounts::TOKEN_PROGRAM, false),
            AccountMeta::new(creator_vault, false),
            AccountMeta::new_readonly(constants::accounts::EVENT_AUTHORITY, false),
            AccountMeta::new_readonly(constants::accounts::PUMPFUN, false),
        ],
    )
}
