//! Error types

use solana_client::client_error::ClientError;
use solana_program::{
    program_error::ProgramError,
    pubkey::{Pubkey, PubkeyError},
};
use thiserror::Error;

/// Errors that may be returned by the lending client.
#[derive(Debug, Error)]
pub enum LendingClientError {
    /// Account is missing on the cluster
    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    /// No reserve in the market carries the requested symbol
    #[error("Reserve not found for symbol {0}")]
    ReserveNotFound(String),

    /// The wallet has no obligation in the market
    #[error("Obligation not found for wallet {0}")]
    ObligationNotFound(Pubkey),

    /// Arithmetic overflow while deriving reserve statistics
    #[error("Calculation failure")]
    CalculationFailure,

    /// RPC request failed
    #[error(transparent)]
    Rpc(#[from] ClientError),

    /// Account deserialization or instruction construction failed
    #[error(transparent)]
    Program(#[from] ProgramError),

    /// Address derivation failed
    #[error(transparent)]
    Pubkey(#[from] PubkeyError),
}
