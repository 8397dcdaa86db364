//! Program state definitions

use super::*;
use crate::error::LendingClientError;
use borsh::{BorshDeserialize, BorshSchema, BorshSerialize};
use solana_program::{
    msg,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};
use std::str;

/// Byte offset of the `market` field inside a packed reserve
pub const RESERVE_MARKET_OFFSET: usize = 1 + LastUpdate::LEN;

/// Reserve
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct Reserve {
    /// State version
    pub version: u8,
    /// Last slot the reserve was refreshed in
    pub last_update: LastUpdate,
    /// Market the reserve belongs to
    pub market: Pubkey,
    /// Liquidity side of the reserve
    pub liquidity: ReserveLiquidity,
    /// Collateral side of the reserve
    pub collateral: ReserveCollateral,
    /// Reserve configuration
    pub config: ReserveConfig,
}

/// Liquidity side of a reserve
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct ReserveLiquidity {
    /// Mint of the deposited token
    pub mint: Pubkey,
    /// Decimals of the deposited token
    pub mint_decimals: u8,
    /// Supply account holding the deposited liquidity
    pub supply: Pubkey,
    /// Account collecting borrow fees
    pub fee_receiver: Pubkey,
    /// Price account of the deposited token
    pub oracle: Pubkey,
    /// Liquidity available for borrows and withdrawals
    pub available_amount: u64,
    /// Liquidity currently lent out (multiplied by 10e9)
    pub borrowed_amount: u64,
    /// Interest accrued on borrows since reserve creation (multiplied by 10e9)
    pub cumulative_borrow_rate: u64,
    /// Price of the deposited token in quote currency (multiplied by 10e9)
    pub market_price: u64,
}

/// Collateral side of a reserve
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct ReserveCollateral {
    /// Mint of the collateral token lenders receive
    pub mint: Pubkey,
    /// Total collateral tokens in circulation
    pub mint_total_supply: u64,
    /// Supply account holding collateral deposited into obligations
    pub supply: Pubkey,
}

/// Reserve configuration
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct ReserveConfig {
    /// Token symbol of the deposited token, zero padded
    pub symbol: [u8; 16],
    /// Utilization rate the borrow rate curve pivots at, as a percentage
    pub optimal_utilization_rate: u8,
    /// Deposit value that can be borrowed against, as a percentage
    pub loan_to_value_ratio: u8,
    /// Discount liquidators buy collateral at, as a percentage
    pub liquidation_bonus: u8,
    /// Borrow value an obligation can be liquidated at, as a percentage
    pub liquidation_threshold: u8,
    /// Borrow rate at zero utilization, as a percentage
    pub min_borrow_rate: u8,
    /// Borrow rate at optimal utilization, as a percentage
    pub optimal_borrow_rate: u8,
    /// Borrow rate at full utilization, as a percentage
    pub max_borrow_rate: u8,
    /// Fees taken on borrows
    pub fees: ReserveFees,
    /// Cap on the total deposited liquidity
    pub deposit_limit: u64,
    /// Cap on the total borrowed liquidity
    pub borrow_limit: u64,
}

/// Fees taken on borrows
#[repr(C)]
#[derive(Debug, BorshDeserialize, BorshSerialize, BorshSchema, Default)]
pub struct ReserveFees {
    /// Fraction of the borrowed amount taken as fee (multiplied by 10e9)
    pub borrow_fee: u64,
    /// Share of the borrow fee paid to the transaction host, as a percentage
    pub host_fee_percentage: u8,
}

/// Encode a token symbol into its fixed-size state representation
pub fn pack_symbol(symbol: &str) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    let len = symbol.len().min(bytes.len());
    bytes[..len].copy_from_slice(&symbol.as_bytes()[..len]);
    bytes
}

impl ReserveConfig {
    /// Token symbol of the deposited token
    pub fn symbol(&self) -> &str {
        let end = self
            .symbol
            .iter()
            .position(|byte| *byte == 0)
            .unwrap_or(self.symbol.len());
        str::from_utf8(&self.symbol[..end]).unwrap_or_default()
    }
}

/// Derived reserve statistics
#[derive(Debug, PartialEq)]
pub struct ReserveStats {
    /// Token symbol of the deposited token
    pub symbol: String,
    /// Mint of the deposited token
    pub mint: Pubkey,
    /// Decimals of the deposited token
    pub decimals: u8,
    /// Price of the deposited token in quote currency
    pub market_price: f64,
    /// Total liquidity under the reserve, lent and available
    pub total_deposits: u64,
    /// Liquidity currently lent out
    pub total_borrows: u64,
    /// Liquidity available for borrows and withdrawals
    pub available_liquidity: u64,
    /// Share of the total liquidity currently lent out
    pub utilization_rate: f64,
    /// Liquidity tokens one collateral token redeems for
    pub collateral_exchange_rate: f64,
    /// Interest accrued on borrows since reserve creation
    pub cumulative_borrow_rate: f64,
    /// Fraction of the borrowed amount taken as fee
    pub borrow_fee: f64,
}

impl Reserve {
    /// Derive display statistics from the reserve balances
    pub fn stats(&self) -> Result<ReserveStats, LendingClientError> {
        let total_borrows = self.liquidity.borrowed_amount / RATE_POWER;
        let total_deposits = self
            .liquidity
            .available_amount
            .checked_add(total_borrows)
            .ok_or(LendingClientError::CalculationFailure)?;
        let utilization_rate = if total_deposits == 0 {
            0.0
        } else {
            total_borrows as f64 / total_deposits as f64
        };
        let collateral_exchange_rate = if self.collateral.mint_total_supply == 0 {
            1.0
        } else {
            total_deposits as f64 / self.collateral.mint_total_supply as f64
        };

        Ok(ReserveStats {
            symbol: self.config.symbol().to_string(),
            mint: self.liquidity.mint,
            decimals: self.liquidity.mint_decimals,
            market_price: rate_to_ui_rate(self.liquidity.market_price),
            total_deposits,
            total_borrows,
            available_liquidity: self.liquidity.available_amount,
            utilization_rate,
            collateral_exchange_rate,
            cumulative_borrow_rate: rate_to_ui_rate(self.liquidity.cumulative_borrow_rate),
            borrow_fee: rate_to_ui_rate(self.config.fees.borrow_fee),
        })
    }
}

impl Sealed for Reserve {}
impl Pack for Reserve {
    // 1 + 9 + 32 + 161 + 72 + 48
    const LEN: usize = 323;

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

impl IsInitialized for Reserve {
    fn is_initialized(&self) -> bool {
        self.version != UNINITIALIZED_VERSION
    }
}
