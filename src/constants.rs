//! Constants used throughout the SDK: program identities, PDA seeds and
//! relay endpoints.

/// PDA seed strings. These must match the deployed program byte-for-byte or
/// derived addresses will not resolve.
pub mod seeds {
    /// Seed for the global configuration PDA
    pub const GLOBAL_SEED: &[u8] = b"global";

    /// Seed for the mint authority PDA
    pub const MINT_AUTHORITY_SEED: &[u8] = b"mint-authority";

    /// Seed prefix for per-token bonding curve PDAs
    pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

    /// Seed prefix for creator fee vault PDAs
    pub const CREATOR_VAULT_SEED: &[u8] = b"creator-vault";

    /// Seed prefix for Metaplex metadata PDAs
    pub const METADATA_SEED: &[u8] = b"metadata";
}

/// Well-known program and sysvar addresses.
pub mod accounts {
    use solana_sdk::{pubkey, pubkey::Pubkey};

    /// Pump.fun bonding curve program
    pub const PUMPFUN: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");

    /// Pump.fun event authority PDA
    pub const EVENT_AUTHORITY: Pubkey = pubkey!("Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1");

    /// Metaplex Token Metadata program
    pub const MPL_TOKEN_METADATA: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

    /// SPL Token program
    pub const TOKEN_PROGRAM: Pubkey = spl_token::ID;

    /// SPL Associated Token Account program
    pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey = spl_associated_token_account::ID;

    /// System program
    pub const SYSTEM_PROGRAM: Pubkey = pubkey!("11111111111111111111111111111111");

    /// Rent sysvar
    pub const RENT: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");
}

/// IPFS pinning endpoint used to host token metadata before a create.
pub const METADATA_UPLOAD_URL: &str = "https://pump.fun/api/ipfs";

/// Atomic relay (Jito block engine) endpoints and tip accounts.
pub mod relay {
    use solana_sdk::{pubkey, pubkey::Pubkey};

    /// Default mainnet block engine bundle endpoint
    pub const MAINNET_BLOCK_ENGINE: &str = "https://mainnet.block-engine.jito.wtf/api/v1/bundles";

    /// Maximum number of transactions the relay accepts in one bundle
    pub const MAX_BUNDLE_TRANSACTIONS: usize = 5;

    /// Tip accounts operated by the relay. A bundle must transfer its tip to
    /// one of these for the relay to consider it.
    pub const TIP_ACCOUNTS: [Pubkey; 8] = [
        pubkey!("96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5"),
        pubkey!("HFqU5x63VTqvQss8hp11i4wVV8bD44PvwucfZ2bU7gRe"),
        pubkey!("Cw8CFyM9FkoMi7K7Crf6HNQqf4uEMzpKw6QNghXLvLkY"),
        pubkey!("ADaUMid9yfUytqMBgopwjb2DTLSokTSzL1zt6iGPaS49"),
        pubkey!("DfXygSm4jCyNCybVYYK6DwvWqjKee8pbDmJGcLWNDXjh"),
        pubkey!("ADuUkR4vqLUMWXxW9gh6D6L8pMSawimctcNZ5pGwDcEt"),
        pubkey!("DttWaMuVvTiduZRnguLF7jNxTgiMBZ1hyAumKUiL2KRL"),
        pubkey!("3AVi9Tg9Uo68tJfuvoKvqKNWKkC5wPdSSdeBnizKZ6jT"),
    ];
}
