pub mod utils;

use pumpfun_bundler::{
    accounts::{BondingCurveAccount, GlobalAccount},
    bundle::{assemble_multi, InstructionSet},
    error::ClientError,
    instructions,
    submit::build_bundle_transactions,
    utils::calculate_with_slippage_buy,
};
use serial_test::serial;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, signer::Signer};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use utils::TestContext;

const SOL: u64 = 1_000_000_000;

fn mainnet_default_global() -> GlobalAccount {
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

fn fresh_curve(global: &GlobalAccount, creator: Pubkey) -> BondingCurveAccount {
    BondingCurveAccount {
        virtual_token_reserves: global.initial_virtual_token_reserves,
        virtual_sol_reserves: global.initial_virtual_sol_reserves,
        real_token_reserves: global.initial_real_token_reserves,
        real_sol_reserves: 0,
        token_total_supply: global.token_total_supply,
        complete: false,
        creator,
    }
}

#[test]
fn bundle_quotes_cascade_through_reserve_state() {
    let global = mainnet_default_global();
    let mut curve = fresh_curve(&global, Pubkey::new_unique());

    // Same SOL input, quoted in bundle order: each buy moves the price for
    // the next, so token outputs must be strictly decreasing.
    let mut outputs = Vec::new();
    for _ in 0..4 {
        let tokens = curve.get_buy_price(SOL).unwrap();
        curve.apply_buy(SOL, tokens);
        outputs.push(tokens);
    }

    for pair in outputs.windows(2) {
        assert!(
            pair[1] < pair[0],
            "later buy received more tokens: {:?}",
            outputs
        );
    }

    // The flat quote equals the sum of per-step outputs only when taken in
    // one step; sanity-check the first quote against the initial-buy path.
    assert_eq!(
        fresh_curve(&global, Pubkey::new_unique())
            .get_buy_price(SOL)
            .unwrap(),
        global.get_initial_buy_price(SOL).unwrap()
    );
}

#[test]
fn bundled_create_and_buys_assemble_and_sign() {
    let ctx = TestContext::default();
    let payer = ctx.client.payer.pubkey();
    let mint = ctx.mint.pubkey();
    let global = mainnet_default_global();
    let mut curve = fresh_curve(&global, payer);

    // Creator set: create plus initial buy
    let creator_tokens = curve.get_buy_price(2 * SOL).unwrap();
    curve.apply_buy(2 * SOL, creator_tokens);
    let mut sets = vec![InstructionSet::new(
        vec![
            instructions::create(
                &payer,
                &mint,
                instructions::Create {
                    name: "Bundled".to_string(),
                    symbol: "BNDL".to_string(),
                    uri: "https://example.com/meta.json".to_string(),
                    creator: payer,
                },
            ),
            instructions::buy(
                &payer,
                &mint,
                &global.fee_recipient,
                &payer,
                instructions::Buy {
                    amount: creator_tokens,
                    max_sol_cost: calculate_with_slippage_buy(2 * SOL, 500),
                },
            ),
        ],
        vec![mint],
    )];

    // One set per buyer wallet
    for buyer in &ctx.buyers {
        let tokens = curve.get_buy_price(SOL).unwrap();
        curve.apply_buy(SOL, tokens);
        sets.push(InstructionSet::new(
            vec![
                create_associated_token_account_idempotent(
                    &buyer.pubkey(),
                    &buyer.pubkey(),
                    &mint,
                    &spl_token::ID,
                ),
                instructions::buy(
                    &buyer.pubkey(),
                    &mint,
                    &global.fee_recipient,
                    &payer,
                    instructions::Buy {
                        amount: tokens,
                        max_sol_cost: calculate_with_slippage_buy(SOL, 500),
                    },
                ),
            ],
            vec![buyer.pubkey()],
        ));
    }

    let bundle = assemble_multi(sets, payer).unwrap();
    assert_eq!(bundle.sets.len(), 1 + ctx.buyers.len());
    assert_eq!(bundle.instruction_count(), 2 * (1 + ctx.buyers.len()));

    let mut signers = vec![&*ctx.client.payer, &ctx.mint];
    signers.extend(ctx.buyers.iter());
    let transactions =
        build_bundle_transactions(&bundle, &signers, 100_000, Hash::default()).unwrap();

    assert_eq!(transactions.len(), 1 + ctx.buyers.len());
    for tx in &transactions {
        // Bundle payer fronts the fees of every transaction
        assert_eq!(tx.message.account_keys[0], payer);
        assert!(tx.signatures.iter().all(|sig| *sig != Signature::default()));
    }
    // Tip rides in the first transaction only: create + buy + tip transfer
    assert_eq!(transactions[0].message.instructions.len(), 3);
    assert_eq!(transactions[1].message.instructions.len(), 2);
}

#[test]
fn missing_buyer_keypair_fails_before_any_network_call() {
    let ctx = TestContext::default();
    let payer = ctx.client.payer.pubkey();
    let buyer = &ctx.buyers[0];

    let sets = vec![InstructionSet::new(
        vec![instructions::buy(
            &buyer.pubkey(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &payer,
            instructions::Buy {
                amount: 1,
                max_sol_cost: 1,
            },
        )],
        vec![buyer.pubkey()],
    )];
    let bundle = assemble_multi(sets, payer).unwrap();

    // Payer keypair alone cannot satisfy the buyer's signature
    let result = build_bundle_transactions(&bundle, &[&*ctx.client.payer], 0, Hash::default());
    match result {
        Err(ClientError::SignerMismatch(pubkey)) => assert_eq!(pubkey, buyer.pubkey()),
        other => panic!("expected SignerMismatch, got {:?}", other.map(|_| ())),
    }
}

#[cfg(not(skip_expensive_tests))]
#[tokio::test]
#[serial]
async fn test_get_global_account() {
    if std::env::var("SKIP_EXPENSIVE_TESTS").is_ok() {
        return;
    }

    let ctx = TestContext::default();
    let global = ctx
        .client
        .get_global_account()
        .await
        .expect("Failed to get global account");

    assert!(global.initialized, "Global account should be initialized");
    assert_ne!(global.fee_recipient, Pubkey::default());
    assert!(global.fee_basis_points > 0);
    assert!(global.initial_virtual_sol_reserves > 0);
}

#[cfg(not(skip_expensive_tests))]
#[tokio::test]
#[serial]
async fn test_unknown_mint_has_no_bonding_curve() {
    if std::env::var("SKIP_EXPENSIVE_TESTS").is_ok() {
        return;
    }

    let ctx = TestContext::default();
    let result = ctx
        .client
        .get_bonding_curve_account(&ctx.mint.pubkey())
        .await;

    assert!(matches!(result, Err(ClientError::BondingCurveNotFound)));
}
