#![deny(missing_docs)]

//! Solend program client

pub mod action;
pub mod error;
pub mod instruction;
pub mod market;
pub mod state;

// Export current sdk types for downstream users building with a different sdk version
pub use solana_program;
use solana_program::pubkey::{Pubkey, PubkeyError};

solana_program::declare_id!("So1endDq2YkqhipRh3WViPa8hdiSpxWy6z3Z6tMCpAo");

/// Main lending market of the production deployment
const MAIN_MARKET_PRODUCTION: Pubkey =
    solana_program::pubkey!("4UpD2fh7xH3VP9QQaXtsS1YY3bxzWhtfpks7FatyKvdY");

/// Main lending market of the devnet deployment
const MAIN_MARKET_DEVNET: Pubkey =
    solana_program::pubkey!("7y2cniJyAJtc3ybVrT6Yi9KSZTckYKzHuy6qDFtaBnmd");

/// Number of base58 characters of the market address used as the obligation
/// account seed. Obligation addresses must stay derivable from the wallet and
/// the market alone, so the seed is a fixed-length prefix.
pub const OBLIGATION_SEED_LEN: usize = 32;

/// Deployment environment of the lending program
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    /// Mainnet deployment
    Production,
    /// Devnet deployment
    Devnet,
}

impl Environment {
    /// Main lending market of the deployment
    pub fn main_market(&self) -> Pubkey {
        match self {
            Environment::Production => MAIN_MARKET_PRODUCTION,
            Environment::Devnet => MAIN_MARKET_DEVNET,
        }
    }
}

/// Generates the authority of a lending market
pub fn find_program_address(program_id: &Pubkey, pubkey: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[&pubkey.to_bytes()[..32]], program_id)
}

/// Seed the obligation account of a wallet is derived with
pub fn obligation_seed(market: &Pubkey) -> String {
    market.to_string()[..OBLIGATION_SEED_LEN].to_string()
}

/// Derives the obligation account of a wallet in a market
pub fn find_obligation_address(wallet: &Pubkey, market: &Pubkey) -> Result<Pubkey, PubkeyError> {
    Pubkey::create_with_seed(wallet, &obligation_seed(market), &id())
}
