//! Program state definitions

use super::*;
use borsh::{BorshDeserialize, BorshSchema, BorshSerialize};
use solana_program::{
    msg,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

/// Lending market
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct LendingMarket {
    /// State version
    pub version: u8,
    /// Bump seed of the market authority
    pub bump_seed: u8,
    /// Market owner
    pub owner: Pubkey,
    /// Currency market prices are quoted in, as a padded symbol or a pubkey
    pub quote_currency: [u8; 32],
    /// Token program the reserve supplies are held under
    pub token_program_id: Pubkey,
    /// Oracle program the reserve price accounts belong to
    pub oracle_program_id: Pubkey,
}

impl Sealed for LendingMarket {}
impl Pack for LendingMarket {
    // 1 + 1 + 32 + 32 + 32 + 32
    const LEN: usize = 130;

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let mut slice = dst;
        self.serialize(&mut slice).unwrap()
    }

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(src).map_err(|_| {
            msg!("Failed to deserialize");
            ProgramError::InvalidAccountData
        })
    }
}

impl IsInitialized for LendingMarket {
    fn is_initialized(&self) -> bool {
        self.version != UNINITIALIZED_VERSION
    }
}
