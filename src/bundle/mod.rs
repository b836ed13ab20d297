//! Bundle assembly: composing instruction sets from one or more wallets
//! into a logically atomic unit.
//!
//! An `InstructionSet` is the ordered output of the instruction builders for
//! a single wallet (e.g. the creator's create+buy, or one buyer's
//! ATA-create+buy). A `Bundle` is an ordered sequence of instruction sets
//! sharing one fee payer. Order is preserved end to end: the creator's set
//! goes first, then each buyer's set in caller-supplied order, because later
//! buys price against reserve state as mutated by earlier buys inside the
//! same atomic unit.
//!
//! Assembly is pure validation; signing and transport happen in the
//! submission layer.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::error::ClientError;

/// Ordered instructions for a single wallet, together with the signer
/// identities that authorize them.
#[derive(Debug, Clone)]
pub struct InstructionSet {
    /// Instructions in execution order
    pub instructions: Vec<Instruction>,
    /// Wallets that must sign for these instructions (e.g. the buyer, plus
    /// the mint keypair for a create)
    pub signers: Vec<Pubkey>,
}

impl InstructionSet {
    pub fn new(instructions: Vec<Instruction>, signers: Vec<Pubkey>) -> Self {
        Self {
            instructions,
            signers,
        }
    }
}

/// An ordered group of instruction sets submitted as one atomic unit.
///
/// Via the direct path the sets are flattened into a single transaction;
/// via the relay path each set becomes its own transaction and the relay
/// guarantees all-or-nothing inclusion.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Fee payer for the bundle (also a valid signer for every set)
    pub payer: Pubkey,
    /// Instruction sets in submission order
    pub sets: Vec<InstructionSet>,
}

impl Bundle {
    /// Total number of instructions across all sets.
    pub fn instruction_count(&self) -> usize {
        self.sets.iter().map(|set| set.instructions.len()).sum()
    }

    /// Every distinct signer identity the bundle requires, payer included.
    pub fn signer_identities(&self) -> Vec<Pubkey> {
        let mut identities = vec![self.payer];
        for set in &self.sets {
            for signer in &set.signers {
                if !identities.contains(signer) {
                    identities.push(*signer);
                }
            }
        }
        identities
    }
}

/// Assembles a bundle from a single instruction set.
///
/// # Errors
///
/// - `ClientError::EmptyBundle` if the set contains no instructions
/// - `ClientError::SignerMismatch` if an instruction references a signer
///   not declared in the set and not equal to the payer
pub fn assemble_single(set: InstructionSet, payer: Pubkey) -> Result<Bundle, ClientError> {
    assemble_multi(vec![set], payer)
}

/// Assembles a bundle from multiple instruction sets in caller order.
///
/// # Errors
///
/// - `ClientError::EmptyBundle` if zero sets (or zero instructions overall)
///   are supplied
/// - `ClientError::SignerMismatch` if any instruction references a signer
///   identity not declared by its set and not equal to the payer
pub fn assemble_multi(sets: Vec<InstructionSet>, payer: Pubkey) -> Result<Bundle, ClientError> {
    if sets.iter().map(|set| set.instructions.len()).sum::<usize>() == 0 {
        return Err(ClientError::EmptyBundle);
    }

    for set in &sets {
        for instruction in &set.instructions {
            for meta in instruction.accounts.iter().filter(|meta| meta.is_signer) {
                if meta.pubkey != payer && !set.signers.contains(&meta.pubkey) {
                    return Err(ClientError::SignerMismatch(meta.pubkey));
                }
            }
        }
    }

    Ok(Bundle { payer, sets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;

    fn dummy_instruction(signer: Pubkey) -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[0u8; 8],
            vec![AccountMeta::new(signer, true)],
        )
    }

    #[test]
    fn empty_input_is_rejected() {
        let payer = Pubkey::new_unique();
        assert!(matches!(
            assemble_multi(vec![], payer),
            Err(ClientError::EmptyBundle)
        ));
        assert!(matches!(
            assemble_single(InstructionSet::new(vec![], vec![]), payer),
            Err(ClientError::EmptyBundle)
        ));
    }

    #[test]
    fn undeclared_signer_is_rejected() {
        let payer = Pubkey::new_unique();
        let rogue = Pubkey::new_unique();
        let set = InstructionSet::new(vec![dummy_instruction(rogue)], vec![]);

        match assemble_single(set, payer) {
            Err(ClientError::SignerMismatch(pubkey)) => assert_eq!(pubkey, rogue),
            other => panic!("expected SignerMismatch, got {:?}", other),
        }
    }

    #[test]
    fn payer_counts_as_declared_signer() {
        let payer = Pubkey::new_unique();
        let set = InstructionSet::new(vec![dummy_instruction(payer)], vec![]);
        assert!(assemble_single(set, payer).is_ok());
    }

    #[test]
    fn multi_preserves_count_and_order() {
        let payer = Pubkey::new_unique();
        let buyers: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();

        // Creator set with two instructions, then one per buyer
        let mut sets = vec![InstructionSet::new(
            vec![dummy_instruction(payer), dummy_instruction(payer)],
            vec![],
        )];
        for buyer in &buyers {
            sets.push(InstructionSet::new(
                vec![dummy_instruction(*buyer)],
                vec![*buyer],
            ));
        }

        let bundle = assemble_multi(sets, payer).unwrap();
        assert_eq!(bundle.instruction_count(), 5);
        assert_eq!(bundle.sets.len(), 4);
        for (i, buyer) in buyers.iter().enumerate() {
            assert_eq!(bundle.sets[i + 1].signers, vec![*buyer]);
        }
    }

    #[test]
    fn signer_identities_deduplicate() {
        let payer = Pubkey::new_unique();
        let buyer = Pubkey::new_unique();
        let sets = vec![
            InstructionSet::new(vec![dummy_instruction(buyer)], vec![buyer]),
            InstructionSet::new(vec![dummy_instruction(buyer)], vec![buyer]),
        ];
        let bundle = assemble_multi(sets, payer).unwrap();
        assert_eq!(bundle.signer_identities(), vec![payer, buyer]);
    }
}
