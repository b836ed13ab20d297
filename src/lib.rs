#![doc = include_str!("../RUSTDOC.md")]

pub mod accounts;
pub mod bundle;
pub mod common;
pub mod constants;
pub mod error;
pub mod instructions;
pub mod submit;
pub mod utils;

use std::sync::Arc;

use common::types::{Cluster, PriorityFee};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction, instruction::Instruction, pubkey::Pubkey,
    signature::Keypair, signer::Signer,
};
use spl_associated_token_account::{
    get_associated_token_address,
    instruction::{create_associated_token_account, create_associated_token_account_idempotent},
};

use crate::accounts::{BondingCurveAccount, GlobalAccount};
use crate::bundle::{assemble_multi, assemble_single, Bundle, InstructionSet};
use crate::submit::{SubmissionResult, SubmitMode, DEFAULT_CONFIRM_TIMEOUT};

/// Main client for interacting with the bonding curve program
///
/// This struct provides the primary interface for creating, buying, and
/// selling tokens against bonding curves, individually or as multi-wallet
/// bundles. Every trading operation takes a [`SubmitMode`] selecting between
/// the direct RPC path and the atomic relay path.
///
/// # Examples
///
/// ```no_run
/// use pumpfun_bundler::{PumpFun, common::types::{Cluster, PriorityFee}};
/// use solana_sdk::{commitment_config::CommitmentConfig, signature::Keypair};
/// use std::sync::Arc;
///
/// let payer = Arc::new(Keypair::new());
/// let cluster = Cluster::mainnet(CommitmentConfig::confirmed(), PriorityFee::default());
/// let client = PumpFun::new(payer, cluster);
/// ```
pub struct PumpFun {
    /// Keypair used to sign transactions
    pub payer: Arc<Keypair>,
    /// RPC client for Solana network requests
    pub rpc: Arc<RpcClient>,
    /// Cluster configuration
    pub cluster: Cluster,
}

impl PumpFun {
    /// Creates a new client instance
    ///
    /// # Arguments
    ///
    /// * `payer` - Keypair used to sign and pay for transactions
    /// * `cluster` - Cluster configuration including RPC endpoints, the relay
    ///   endpoint, and transaction parameters
    pub fn new(payer: Arc<Keypair>, cluster: Cluster) -> Self {
        let rpc = Arc::new(RpcClient::new_with_commitment(
            cluster.rpc.http.clone(),
            cluster.commitment,
        ));

        Self {
            payer,
            rpc,
            cluster,
        }
    }

    async fn submit_bundle(
        &self,
        bundle: &Bundle,
        signers: &[&Keypair],
        mode: SubmitMode,
    ) -> Result<SubmissionResult, error::ClientError> {
        match mode {
            SubmitMode::Direct => {
                submit::submit_direct(
                    &self.rpc,
                    bundle,
                    signers,
                    self.cluster.commitment,
                    DEFAULT_CONFIRM_TIMEOUT,
                )
                .await
            }
            SubmitMode::AtomicRelay { tip_lamports } => {
                submit::submit_atomic_relay(
                    &self.rpc,
                    &self.cluster.relay,
                    bundle,
                    signers,
                    tip_lamports,
                    self.cluster.commitment,
                    DEFAULT_CONFIRM_TIMEOUT,
                )
                .await
            }
        }
    }

    /// Creates a new token with metadata by uploading metadata to IPFS and
    /// initializing the on-chain accounts
    ///
    /// 1. Uploads token metadata and image to IPFS
    /// 2. Creates the SPL token with the provided mint keypair
    /// 3. Initializes the bonding curve that determines token pricing
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata upload fails or the transaction
    /// cannot be built. Network rejection and confirmation timeout come back
    /// as a failed [`SubmissionResult`], not an error.
    pub async fn create(
        &self,
        mint: Keypair,
        metadata: utils::CreateTokenMetadata,
        priority_fee: Option<PriorityFee>,
        mode: SubmitMode,
    ) -> Result<SubmissionResult, error::ClientError> {
        let ipfs: utils::TokenMetadataResponse = utils::create_token_metadata(metadata).await?;

        let priority_fee = priority_fee.unwrap_or(self.cluster.priority_fee);
        let mut instructions = Self::get_priority_fee_instructions(&priority_fee);
        instructions.push(self.get_create_instruction(&mint.pubkey(), ipfs));

        let set = InstructionSet::new(instructions, vec![mint.pubkey()]);
        let bundle = assemble_single(set, self.payer.pubkey())?;

        self.submit_bundle(&bundle, &[&*self.payer, &mint], mode).await
    }

    /// Creates a new token and immediately buys an initial amount in the same
    /// atomic unit
    ///
    /// Combining creation and the first purchase guarantees the creator is
    /// the first holder; no other transaction can trade against the curve in
    /// between.
    ///
    /// # Arguments
    ///
    /// * `mint` - Keypair for the new token mint account; must sign
    /// * `metadata` - Token metadata including name, symbol, description and image
    /// * `amount_sol` - Lamports to spend on the initial buy
    /// * `slippage_basis_points` - Maximum acceptable slippage (1 bp = 0.01%).
    ///   Defaults to 500 (5%)
    /// * `priority_fee` - Compute unit settings; defaults to the cluster configuration
    /// * `mode` - Submission path
    pub async fn create_and_buy(
        &self,
        mint: Keypair,
        metadata: utils::CreateTokenMetadata,
        amount_sol: u64,
        slippage_basis_points: Option<u64>,
        priority_fee: Option<PriorityFee>,
        mode: SubmitMode,
    ) -> Result<SubmissionResult, error::ClientError> {
        let ipfs: utils::TokenMetadataResponse = utils::create_token_metadata(metadata).await?;

        let priority_fee = priority_fee.unwrap_or(self.cluster.priority_fee);
        let mut instructions = Self::get_priority_fee_instructions(&priority_fee);
        instructions.push(self.get_create_instruction(&mint.pubkey(), ipfs));

        let buy_ix = self
            .get_buy_instructions(mint.pubkey(), amount_sol, slippage_basis_points)
            .await?;
        instructions.extend(buy_ix);

        let set = InstructionSet::new(instructions, vec![mint.pubkey()]);
        let bundle = assemble_single(set, self.payer.pubkey())?;

        self.submit_bundle(&bundle, &[&*self.payer, &mint], mode).await
    }

    /// Buys tokens from a bonding curve by spending SOL
    ///
    /// The token amount received is quoted off the current reserve snapshot;
    /// the transaction carries a slippage-bounded maximum cost and the
    /// on-chain program fails it if the snapshot went stale beyond that
    /// bound.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pumpfun_bundler::{PumpFun, submit::SubmitMode, common::types::{Cluster, PriorityFee}};
    /// # use solana_sdk::{commitment_config::CommitmentConfig, native_token::sol_to_lamports, pubkey, signature::Keypair};
    /// # use std::sync::Arc;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let payer = Arc::new(Keypair::new());
    /// # let cluster = Cluster::mainnet(CommitmentConfig::confirmed(), PriorityFee::default());
    /// # let client = PumpFun::new(payer, cluster);
    /// let mint = pubkey!("SoMeTokenM1ntAddr3ssXXXXXXXXXXXXXXXXXXXXXXX");
    /// let result = client
    ///     .buy(mint, sol_to_lamports(0.01), Some(300), None, SubmitMode::Direct)
    ///     .await?;
    /// println!("confirmed: {} ({:?})", result.success, result.signature);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn buy(
        &self,
        mint: Pubkey,
        amount_sol: u64,
        slippage_basis_points: Option<u64>,
        priority_fee: Option<PriorityFee>,
        mode: SubmitMode,
    ) -> Result<SubmissionResult, error::ClientError> {
        let priority_fee = priority_fee.unwrap_or(self.cluster.priority_fee);
        let mut instructions = Self::get_priority_fee_instructions(&priority_fee);

        let buy_ix = self
            .get_buy_instructions(mint, amount_sol, slippage_basis_points)
            .await?;
        instructions.extend(buy_ix);

        let bundle = assemble_single(
            InstructionSet::new(instructions, Vec::new()),
            self.payer.pubkey(),
        )?;

        self.submit_bundle(&bundle, &[&*self.payer], mode).await
    }

    /// Sells tokens back to a bonding curve in exchange for SOL
    ///
    /// # Arguments
    ///
    /// * `mint` - Public key of the token mint to sell
    /// * `amount_token` - Token amount in base units; `None` sells the entire balance
    /// * `slippage_basis_points` - Maximum acceptable slippage (1 bp = 0.01%).
    ///   Defaults to 500 (5%)
    /// * `priority_fee` - Compute unit settings; defaults to the cluster configuration
    /// * `mode` - Submission path
    pub async fn sell(
        &self,
        mint: Pubkey,
        amount_token: Option<u64>,
        slippage_basis_points: Option<u64>,
        priority_fee: Option<PriorityFee>,
        mode: SubmitMode,
    ) -> Result<SubmissionResult, error::ClientError> {
        let priority_fee = priority_fee.unwrap_or(self.cluster.priority_fee);
        let mut instructions = Self::get_priority_fee_instructions(&priority_fee);

        let sell_ix = self
            .get_sell_instructions(mint, amount_token, slippage_basis_points)
            .await?;
        instructions.extend(sell_ix);

        let bundle = assemble_single(
            InstructionSet::new(instructions, Vec::new()),
            self.payer.pubkey(),
        )?;

        self.submit_bundle(&bundle, &[&*self.payer], mode).await
    }

    /// Creates a token and buys into it from multiple wallets as one atomic
    /// bundle through the relay
    ///
    /// The first instruction set carries the create, the payer's ATA setup,
    /// and the creator's initial buy; each buyer wallet follows with its own
    /// set. Every buy is quoted against the reserve state left by the buys
    /// ahead of it, so later wallets pay the moved price rather than failing
    /// their slippage check.
    ///
    /// The relay includes all transactions or none. On rejection nothing is
    /// applied, including the create.
    ///
    /// # Arguments
    ///
    /// * `mint` - Keypair for the new token mint; must sign
    /// * `metadata` - Token metadata to upload before the create
    /// * `creator_buy_sol` - Lamports the payer spends on the initial buy
    /// * `buyer_buys` - Buyer keypairs with the lamports each spends, in
    ///   bundle order. At most four buyers fit alongside the creator set
    /// * `slippage_basis_points` - Maximum acceptable slippage per buy.
    ///   Defaults to 500 (5%)
    /// * `priority_fee` - Compute unit settings for the first set
    /// * `tip_lamports` - Relay tip paid by the payer in the first transaction
    pub async fn bundle_buys(
        &self,
        mint: Keypair,
        metadata: utils::CreateTokenMetadata,
        creator_buy_sol: u64,
        buyer_buys: &[(&Keypair, u64)],
        slippage_basis_points: Option<u64>,
        priority_fee: Option<PriorityFee>,
        tip_lamports: u64,
    ) -> Result<SubmissionResult, error::ClientError> {
        let ipfs: utils::TokenMetadataResponse = utils::create_token_metadata(metadata).await?;
        let global_account = self.get_global_account().await?;

        let slippage = slippage_basis_points.unwrap_or(500);
        let priority_fee = priority_fee.unwrap_or(self.cluster.priority_fee);
        let fee_recipient = global_account.fee_recipient;
        let creator = self.payer.pubkey();
        let mint_pubkey = mint.pubkey();

        // Fresh curve snapshot, advanced after every quoted buy so each
        // wallet prices against the state its predecessors leave behind.
        let mut curve = BondingCurveAccount {
            virtual_token_reserves: global_account.initial_virtual_token_reserves,
            virtual_sol_reserves: global_account.initial_virtual_sol_reserves,
            real_token_reserves: global_account.initial_real_token_reserves,
            real_sol_reserves: 0,
            token_total_supply: global_account.token_total_supply,
            complete: false,
            creator,
        };

        let mut creator_instructions = Self::get_priority_fee_instructions(&priority_fee);
        creator_instructions.push(self.get_create_instruction(&mint_pubkey, ipfs));
        creator_instructions.push(create_associated_token_account_idempotent(
            &creator,
            &creator,
            &mint_pubkey,
            &constants::accounts::TOKEN_PROGRAM,
        ));
        let creator_tokens = curve.get_buy_price(creator_buy_sol)?;
        creator_instructions.push(instructions::buy(
            &creator,
            &mint_pubkey,
            &fee_recipient,
            &creator,
            instructions::Buy {
                amount: creator_tokens,
                max_sol_cost: utils::calculate_with_slippage_buy(creator_buy_sol, slippage),
            },
        ));
        curve.apply_buy(creator_buy_sol, creator_tokens);

        let mut sets = vec![InstructionSet::new(
            creator_instructions,
            vec![mint_pubkey],
        )];

        for (buyer, sol_amount) in buyer_buys {
            let buyer_pubkey = buyer.pubkey();
            let tokens = curve.get_buy_price(*sol_amount)?;
            let instructions = vec![
                create_associated_token_account_idempotent(
                    &buyer_pubkey,
                    &buyer_pubkey,
                    &mint_pubkey,
                    &constants::accounts::TOKEN_PROGRAM,
                ),
                instructions::buy(
                    &buyer_pubkey,
                    &mint_pubkey,
                    &fee_recipient,
                    &creator,
                    instructions::Buy {
                        amount: tokens,
                        max_sol_cost: utils::calculate_with_slippage_buy(*sol_amount, slippage),
                    },
                ),
            ];
            curve.apply_buy(*sol_amount, tokens);
            sets.push(InstructionSet::new(instructions, vec![buyer_pubkey]));
        }

        let bundle = assemble_multi(sets, self.payer.pubkey())?;

        let mut signers: Vec<&Keypair> = vec![&*self.payer, &mint];
        signers.extend(buyer_buys.iter().map(|(buyer, _)| *buyer));

        submit::submit_atomic_relay(
            &self.rpc,
            &self.cluster.relay,
            &bundle,
            &signers,
            tip_lamports,
            self.cluster.commitment,
            DEFAULT_CONFIRM_TIMEOUT,
        )
        .await
    }

    /// Subscribes to program events emitted on-chain
    ///
    /// See [`common::stream::subscribe`] for the callback contract. The
    /// subscription ends when the returned handle is dropped.
    #[cfg(feature = "stream")]
    pub async fn subscribe<F>(
        &self,
        mentioned: Option<String>,
        commitment: Option<solana_sdk::commitment_config::CommitmentConfig>,
        callback: F,
    ) -> Result<common::stream::Subscription, error::ClientError>
    where
        F: Fn(
                String,
                Option<common::stream::PumpFunEvent>,
                Option<Box<dyn std::error::Error + Send + Sync>>,
                solana_client::rpc_response::Response<solana_client::rpc_response::RpcLogsResponse>,
            ) + Send
            + Sync
            + 'static,
    {
        common::stream::subscribe(self.cluster.clone(), mentioned, commitment, callback).await
    }

    /// Builds compute budget instructions from a priority fee configuration.
    /// Returns an empty vector when neither limit nor price is set.
    pub fn get_priority_fee_instructions(priority_fee: &PriorityFee) -> Vec<Instruction> {
        let mut instructions = Vec::new();

        if let Some(limit) = priority_fee.unit_limit {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(limit));
        }

        if let Some(price) = priority_fee.unit_price {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
        }

        instructions
    }

    /// Builds the create instruction from an uploaded metadata response.
    pub fn get_create_instruction(
        &self,
        mint: &Pubkey,
        ipfs: utils::TokenMetadataResponse,
    ) -> Instruction {
        instructions::create(
            &self.payer.pubkey(),
            mint,
            instructions::Create {
                name: ipfs.metadata.name,
                symbol: ipfs.metadata.symbol,
                uri: ipfs.metadata_uri,
                creator: self.payer.pubkey(),
            },
        )
    }

    /// Generates the instructions for buying tokens with the payer wallet
    ///
    /// Quotes the token amount off the current reserves (or the global
    /// initial reserves when the curve does not exist yet, as in a
    /// create-and-buy), prepends an ATA creation when the payer has no token
    /// account, and applies the slippage bound to the maximum SOL cost.
    ///
    /// # Errors
    ///
    /// Fails when the global account cannot be fetched, the curve is
    /// complete, or the amount is zero.
    pub async fn get_buy_instructions(
        &self,
        mint: Pubkey,
        amount_sol: u64,
        slippage_basis_points: Option<u64>,
    ) -> Result<Vec<Instruction>, error::ClientError> {
        let global_account = self.get_global_account().await?;

        let bonding_curve_pda = Self::get_bonding_curve_pda(&mint);
        let mut creator = self.payer.pubkey();
        let buy_amount = if self.rpc.get_account(&bonding_curve_pda).await.is_err() {
            // Curve does not exist yet; quote off the global initial reserves
            global_account.get_initial_buy_price(amount_sol)?
        } else {
            let bonding_curve_account = self.get_bonding_curve_account(&mint).await?;
            creator = bonding_curve_account.creator;
            bonding_curve_account.get_buy_price(amount_sol)?
        };
        let max_sol_cost =
            utils::calculate_with_slippage_buy(amount_sol, slippage_basis_points.unwrap_or(500));

        let mut instructions = Vec::new();

        let ata: Pubkey = get_associated_token_address(&self.payer.pubkey(), &mint);
        if self.rpc.get_account(&ata).await.is_err() {
            instructions.push(create_associated_token_account(
                &self.payer.pubkey(),
                &self.payer.pubkey(),
                &mint,
                &constants::accounts::TOKEN_PROGRAM,
            ));
        }

        instructions.push(instructions::buy(
            &self.payer.pubkey(),
            &mint,
            &global_account.fee_recipient,
            &creator,
            instructions::Buy {
                amount: buy_amount,
                max_sol_cost,
            },
        ));

        Ok(instructions)
    }

    /// Generates the instructions for selling tokens with the payer wallet
    ///
    /// When `amount_token` is `None` the payer's full token balance is sold.
    /// The minimum SOL output carries the fee-adjusted quote with the
    /// slippage bound applied.
    ///
    /// # Errors
    ///
    /// Fails when the token balance or curve account cannot be fetched, the
    /// curve is complete, the amount is zero, or the amount exceeds the real
    /// token reserves.
    pub async fn get_sell_instructions(
        &self,
        mint: Pubkey,
        amount_token: Option<u64>,
        slippage_basis_points: Option<u64>,
    ) -> Result<Vec<Instruction>, error::ClientError> {
        let amount = match amount_token {
            Some(amount) => amount,
            None => {
                let ata: Pubkey = get_associated_token_address(&self.payer.pubkey(), &mint);
                let balance = self.rpc.get_token_account_balance(&ata).await?;
                balance.amount.parse::<u64>().map_err(|err| {
                    error::ClientError::OtherError(format!(
                        "unparseable token balance for {}: {}",
                        ata, err
                    ))
                })?
            }
        };

        let global_account = self.get_global_account().await?;
        let bonding_curve_account = self.get_bonding_curve_account(&mint).await?;
        let quote = bonding_curve_account.get_sell_price(amount, global_account.fee_basis_points)?;
        let min_sol_output =
            utils::calculate_with_slippage_sell(quote, slippage_basis_points.unwrap_or(500));

        Ok(vec![instructions::sell(
            &self.payer.pubkey(),
            &mint,
            &global_account.fee_recipient,
            &bonding_curve_account.creator,
            instructions::Sell {
                amount,
                min_sol_output,
            },
        )])
    }

    /// Gets the PDA of the global configuration account.
    pub fn get_global_pda() -> Pubkey {
        let seeds: &[&[u8]; 1] = &[constants::seeds::GLOBAL_SEED];
        let program_id: &Pubkey = &constants::accounts::PUMPFUN;
        Pubkey::find_program_address(seeds, program_id).0
    }

    /// Gets the PDA of the mint authority shared by every token created
    /// through the program.
    pub fn get_mint_authority_pda() -> Pubkey {
        let seeds: &[&[u8]; 1] = &[constants::seeds::MINT_AUTHORITY_SEED];
        let program_id: &Pubkey = &constants::accounts::PUMPFUN;
        Pubkey::find_program_address(seeds, program_id).0
    }

    /// Gets the PDA of a token's bonding curve account.
    pub fn get_bonding_curve_pda(mint: &Pubkey) -> Pubkey {
        let seeds: &[&[u8]; 2] = &[constants::seeds::BONDING_CURVE_SEED, mint.as_ref()];
        let program_id: &Pubkey = &constants::accounts::PUMPFUN;
        Pubkey::find_program_address(seeds, program_id).0
    }

    /// Gets the PDA of a token's Metaplex metadata account.
    pub fn get_metadata_pda(mint: &Pubkey) -> Pubkey {
        let seeds: &[&[u8]; 3] = &[
            constants::seeds::METADATA_SEED,
            constants::accounts::MPL_TOKEN_METADATA.as_ref(),
            mint.as_ref(),
        ];
        let program_id: &Pubkey = &constants::accounts::MPL_TOKEN_METADATA;
        Pubkey::find_program_address(seeds, program_id).0
    }

    /// Gets the PDA of a creator's fee vault.
    pub fn get_creator_vault_pda(creator: &Pubkey) -> Pubkey {
        let seeds: &[&[u8]; 2] = &[constants::seeds::CREATOR_VAULT_SEED, creator.as_ref()];
        let program_id: &Pubkey = &constants::accounts::PUMPFUN;
        Pubkey::find_program_address(seeds, program_id).0
    }

    /// Fetches and decodes the global configuration account
    ///
    /// # Errors
    ///
    /// Fails when the account cannot be fetched, or its buffer is malformed
    /// (wrong length or discriminator).
    pub async fn get_global_account(&self) -> Result<GlobalAccount, error::ClientError> {
        let global: Pubkey = Self::get_global_pda();

        let account = self
            .rpc
            .get_account(&global)
            .await
            .map_err(error::ClientError::SolanaClientError)?;

        GlobalAccount::from_buffer(&account.data)
    }

    /// Fetches and decodes a token's bonding curve account
    ///
    /// # Errors
    ///
    /// Returns `ClientError::BondingCurveNotFound` when the account does not
    /// exist, or `ClientError::MalformedAccount` when its buffer cannot be
    /// decoded.
    pub async fn get_bonding_curve_account(
        &self,
        mint: &Pubkey,
    ) -> Result<BondingCurveAccount, error::ClientError> {
        let bonding_curve_pda = Self::get_bonding_curve_pda(mint);

        let account = self
            .rpc
            .get_account(&bonding_curve_pda)
            .await
            .map_err(|_| error::ClientError::BondingCurveNotFound)?;

        BondingCurveAccount::from_buffer(&account.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_and_mint_authority_pdas_are_the_known_addresses() {
        assert_eq!(
            PumpFun::get_global_pda().to_string(),
            "4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf"
        );
        assert_eq!(
            PumpFun::get_mint_authority_pda().to_string(),
            "TSLvdd1pWpHVjahSpsvCXUbgwsL3JAcvokwaKt1eokM"
        );
    }

    #[test]
    fn curve_and_vault_pdas_are_deterministic() {
        let mint = Pubkey::new_unique();
        let creator = Pubkey::new_unique();

        assert_eq!(
            PumpFun::get_bonding_curve_pda(&mint),
            PumpFun::get_bonding_curve_pda(&mint)
        );
        assert_ne!(
            PumpFun::get_bonding_curve_pda(&mint),
            PumpFun::get_bonding_curve_pda(&Pubkey::new_unique())
        );
        assert_eq!(
            PumpFun::get_creator_vault_pda(&creator),
            PumpFun::get_creator_vault_pda(&creator)
        );
    }

    #[test]
    fn priority_fee_instructions_match_configuration() {
        assert!(PumpFun::get_priority_fee_instructions(&PriorityFee::default()).is_empty());

        let both = PriorityFee::new(Some(200_000), Some(1_000));
        assert_eq!(PumpFun::get_priority_fee_instructions(&both).len(), 2);

        let price_only = PriorityFee::new(None, Some(1_000));
        assert_eq!(PumpFun::get_priority_fee_instructions(&price_only).len(), 1);
    }
}
