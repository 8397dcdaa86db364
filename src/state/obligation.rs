//! Program state definitions

use super::*;
use borsh::{BorshDeserialize, BorshSchema, BorshSerialize};
use solana_program::{
    msg,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

/// Combined number of deposit and borrow entries an obligation can track
pub const MAX_OBLIGATION_RESERVES: usize = 10;

/// Obligation
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct Obligation {
    /// State version
    pub version: u8,
    /// Last slot the obligation was refreshed in
    pub last_update: LastUpdate,
    /// Market the obligation belongs to
    pub market: Pubkey,
    /// Obligation owner
    pub owner: Pubkey,
    /// Collateral deposited to back the borrows
    pub deposits: Vec<ObligationCollateral>,
    /// Liquidity borrowed against the deposits
    pub borrows: Vec<ObligationLiquidity>,
    /// Value of the deposits in quote currency (multiplied by 10e9)
    pub deposited_value: u64,
    /// Value of the borrows in quote currency (multiplied by 10e9)
    pub borrowed_value: u64,
    /// Borrow value the deposits still allow (multiplied by 10e9)
    pub allowed_borrow_value: u64,
    /// Borrow value the obligation gets liquidated at (multiplied by 10e9)
    pub unhealthy_borrow_value: u64,
}

/// Collateral deposited into an obligation, per reserve
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct ObligationCollateral {
    /// Reserve the collateral was deposited under
    pub deposit_reserve: Pubkey,
    /// Deposited collateral tokens
    pub deposited_amount: u64,
}

/// Liquidity borrowed from an obligation, per reserve
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct ObligationLiquidity {
    /// Reserve the liquidity was borrowed from
    pub borrow_reserve: Pubkey,
    /// Borrowed liquidity plus accrued interest (multiplied by 10e9)
    pub borrowed_amount: u64,
    /// Interest accrued on the reserve when the borrow was last updated (multiplied by 10e9)
    pub cumulative_borrow_rate: u64,
}

impl Obligation {
    /// Reserves the obligation references, deposits first, without duplicates
    pub fn reserve_pubkeys(&self) -> Vec<Pubkey> {
        let mut pubkeys: Vec<Pubkey> = Vec::new();
        for deposit in &self.deposits {
            if !pubkeys.contains(&deposit.deposit_reserve) {
                pubkeys.push(deposit.deposit_reserve);
            }
        }
        for borrow in &self.borrows {
            if !pubkeys.contains(&borrow.borrow_reserve) {
                pubkeys.push(borrow.borrow_reserve);
            }
        }
        pubkeys
    }
}

impl Sealed for Obligation {}
impl Pack for Obligation {
    // 1 + 9 + 32 + 32 + (4 + 4) + 10 * 48 + 4 * 8
    const LEN: usize = 594;

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let mut slice = dst;
        self.serialize(&mut slice).unwrap()
    }

    // Entry vectors make the packed layout variable sized, accounts are
    // allocated at LEN and zero padded past the serialized prefix
    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let mut src_mut = src;
        Self::deserialize(&mut src_mut).map_err(|_| {
            msg!("Failed to deserialize");
            ProgramError::InvalidAccountData
        })
    }
}

impl IsInitialized for Obligation {
    fn is_initialized(&self) -> bool {
        self.version != UNINITIALIZED_VERSION
    }
}
