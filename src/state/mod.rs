//! State types

mod market;
mod obligation;
mod reserve;

pub use market::*;
pub use obligation::*;
pub use reserve::*;

use borsh::{BorshDeserialize, BorshSchema, BorshSerialize};
use solana_program::clock::Slot;

/// Accounts are created with data zeroed out, so uninitialized state instances
/// will have the version set to 0.
pub const UNINITIALIZED_VERSION: u8 = 0;

/// Current version of the program state and all new accounts created
pub const PROGRAM_VERSION: u8 = 1;

/// Scale of fractional rates, prices and fees kept in state (multiplied by 10e9)
pub const RATE_POWER: u64 = 1_000_000_000;

/// Convert the raw representation of a rate (like 500_000_000) to its UI value (like 0.5)
pub fn rate_to_ui_rate(rate: u64) -> f64 {
    rate as f64 / RATE_POWER as f64
}

/// Convert the UI representation of a rate (like 0.5) to its raw value (like 500_000_000)
pub fn ui_rate_to_rate(ui_rate: f64) -> u64 {
    (ui_rate * RATE_POWER as f64).round() as u64
}

/// Slot-stamped freshness marker carried by reserves and obligations
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, BorshDeserialize, BorshSerialize, BorshSchema)]
pub struct LastUpdate {
    /// Slot the account was last refreshed in
    pub slot: Slot,
    /// Set when balances changed after the refresh
    pub stale: bool,
}

impl LastUpdate {
    // 8 + 1
    /// Packed size
    pub const LEN: usize = 9;
}
