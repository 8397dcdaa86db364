//! Instruction types

use crate::find_program_address;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvar,
};

/// Instruction definition
#[derive(BorshSerialize, BorshDeserialize, PartialEq, Debug, Clone)]
pub enum LendingInstruction {
    /// Initializes new obligation
    ///
    /// Accounts:
    /// [W] Obligation account - uninitialized
    /// [R] Market account
    /// [RS] Obligation owner
    /// [R] Rent sysvar
    InitObligation,

    /// Accrue interest and update the market price of a reserve
    ///
    /// Accounts:
    /// [W] Reserve account
    /// [R] Reserve liquidity oracle
    RefreshReserve,

    /// Refresh the deposit and borrow values of an obligation
    ///
    /// Accounts:
    /// [W] Obligation account
    /// [R] Reserve accounts referenced by the obligation, deposits first
    RefreshObligation,

    /// Deposit liquidity into a reserve in exchange for collateral tokens
    ///
    /// Accounts:
    /// [W] Source liquidity token account
    /// [W] Destination collateral token account
    /// [W] Reserve account
    /// [W] Reserve liquidity supply
    /// [W] Reserve collateral mint
    /// [R] Market account
    /// [R] Market authority
    /// [RS] User transfer authority
    /// [R] Token program id
    DepositReserveLiquidity {
        /// Amount of liquidity to deposit
        liquidity_amount: u64,
    },

    /// Redeem collateral tokens from a reserve in exchange for liquidity
    ///
    /// Accounts:
    /// [W] Source collateral token account
    /// [W] Destination liquidity token account
    /// [W] Reserve account
    /// [W] Reserve collateral mint
    /// [W] Reserve liquidity supply
    /// [R] Market account
    /// [R] Market authority
    /// [RS] User transfer authority
    /// [R] Token program id
    RedeemReserveCollateral {
        /// Amount of collateral to redeem
        collateral_amount: u64,
    },

    /// Deposit collateral tokens into an obligation
    ///
    /// Accounts:
    /// [W] Source collateral token account
    /// [W] Reserve collateral supply
    /// [R] Deposit reserve account
    /// [W] Obligation account
    /// [R] Market account
    /// [RS] Obligation owner
    /// [RS] User transfer authority
    /// [R] Token program id
    DepositObligationCollateral {
        /// Amount of collateral to deposit
        collateral_amount: u64,
    },

    /// Withdraw collateral tokens from an obligation
    ///
    /// Accounts:
    /// [W] Reserve collateral supply
    /// [W] Destination collateral token account
    /// [R] Withdraw reserve account
    /// [W] Obligation account
    /// [R] Market account
    /// [R] Market authority
    /// [RS] Obligation owner
    /// [R] Token program id
    WithdrawObligationCollateral {
        /// Amount of collateral to withdraw
        collateral_amount: u64,
    },

    /// Borrow liquidity from a reserve against obligation collateral
    ///
    /// Accounts:
    /// [W] Reserve liquidity supply
    /// [W] Destination liquidity token account
    /// [W] Borrow reserve account
    /// [W] Reserve liquidity fee receiver
    /// [W] Obligation account
    /// [R] Market account
    /// [R] Market authority
    /// [RS] Obligation owner
    /// [R] Token program id
    BorrowObligationLiquidity {
        /// Amount of liquidity to borrow
        liquidity_amount: u64,
    },

    /// Repay borrowed liquidity to a reserve
    ///
    /// Accounts:
    /// [W] Source liquidity token account
    /// [W] Reserve liquidity supply
    /// [W] Repay reserve account
    /// [W] Obligation account
    /// [R] Market account
    /// [RS] User transfer authority
    /// [R] Token program id
    RepayObligationLiquidity {
        /// Amount of liquidity to repay
        liquidity_amount: u64,
    },

    /// Deposit liquidity into a reserve and the received collateral tokens
    /// into an obligation in one step
    ///
    /// Accounts:
    /// [W] Source liquidity token account
    /// [W] User collateral token account
    /// [W] Reserve account
    /// [W] Reserve liquidity supply
    /// [W] Reserve collateral mint
    /// [R] Market account
    /// [R] Market authority
    /// [W] Reserve collateral supply
    /// [W] Obligation account
    /// [RS] Obligation owner
    /// [RS] User transfer authority
    /// [R] Token program id
    DepositReserveLiquidityAndObligationCollateral {
        /// Amount of liquidity to deposit
        liquidity_amount: u64,
    },

    /// Withdraw collateral tokens from an obligation and redeem them for
    /// liquidity in one step
    ///
    /// Accounts:
    /// [W] Reserve collateral supply
    /// [W] User collateral token account
    /// [W] Withdraw reserve account
    /// [W] Obligation account
    /// [R] Market account
    /// [R] Market authority
    /// [W] Destination liquidity token account
    /// [W] Reserve collateral mint
    /// [W] Reserve liquidity supply
    /// [RS] Obligation owner
    /// [RS] User transfer authority
    /// [R] Token program id
    WithdrawObligationCollateralAndRedeemReserveCollateral {
        /// Amount of collateral to withdraw
        collateral_amount: u64,
    },
}

/// Create `InitObligation` instruction
pub fn init_obligation(
    program_id: &Pubkey,
    obligation: &Pubkey,
    market: &Pubkey,
    obligation_owner: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::InitObligation;
    let data = init_data.try_to_vec()?;

    let accounts = vec![
        AccountMeta::new(*obligation, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(*obligation_owner, true),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `RefreshReserve` instruction
pub fn refresh_reserve(
    program_id: &Pubkey,
    reserve: &Pubkey,
    reserve_liquidity_oracle: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::RefreshReserve;
    let data = init_data.try_to_vec()?;

    let accounts = vec![
        AccountMeta::new(*reserve, false),
        AccountMeta::new_readonly(*reserve_liquidity_oracle, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `RefreshObligation` instruction
pub fn refresh_obligation(
    program_id: &Pubkey,
    obligation: &Pubkey,
    reserves: &[Pubkey],
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::RefreshObligation;
    let data = init_data.try_to_vec()?;

    let mut accounts = vec![AccountMeta::new(*obligation, false)];
    for reserve in reserves {
        accounts.push(AccountMeta::new_readonly(*reserve, false));
    }

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `DepositReserveLiquidity` instruction
#[allow(clippy::too_many_arguments)]
pub fn deposit_reserve_liquidity(
    program_id: &Pubkey,
    liquidity_amount: u64,
    source_liquidity: &Pubkey,
    destination_collateral: &Pubkey,
    reserve: &Pubkey,
    reserve_liquidity_supply: &Pubkey,
    reserve_collateral_mint: &Pubkey,
    market: &Pubkey,
    user_transfer_authority: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::DepositReserveLiquidity { liquidity_amount };
    let data = init_data.try_to_vec()?;
    let (market_authority, _) = find_program_address(program_id, market);

    let accounts = vec![
        AccountMeta::new(*source_liquidity, false),
        AccountMeta::new(*destination_collateral, false),
        AccountMeta::new(*reserve, false),
        AccountMeta::new(*reserve_liquidity_supply, false),
        AccountMeta::new(*reserve_collateral_mint, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(market_authority, false),
        AccountMeta::new_readonly(*user_transfer_authority, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `RedeemReserveCollateral` instruction
#[allow(clippy::too_many_arguments)]
pub fn redeem_reserve_collateral(
    program_id: &Pubkey,
    collateral_amount: u64,
    source_collateral: &Pubkey,
    destination_liquidity: &Pubkey,
    reserve: &Pubkey,
    reserve_collateral_mint: &Pubkey,
    reserve_liquidity_supply: &Pubkey,
    market: &Pubkey,
    user_transfer_authority: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::RedeemReserveCollateral { collateral_amount };
    let data = init_data.try_to_vec()?;
    let (market_authority, _) = find_program_address(program_id, market);

    let accounts = vec![
        AccountMeta::new(*source_collateral, false),
        AccountMeta::new(*destination_liquidity, false),
        AccountMeta::new(*reserve, false),
        AccountMeta::new(*reserve_collateral_mint, false),
        AccountMeta::new(*reserve_liquidity_supply, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(market_authority, false),
        AccountMeta::new_readonly(*user_transfer_authority, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `DepositObligationCollateral` instruction
#[allow(clippy::too_many_arguments)]
pub fn deposit_obligation_collateral(
    program_id: &Pubkey,
    collateral_amount: u64,
    source_collateral: &Pubkey,
    destination_collateral: &Pubkey,
    deposit_reserve: &Pubkey,
    obligation: &Pubkey,
    market: &Pubkey,
    obligation_owner: &Pubkey,
    user_transfer_authority: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::DepositObligationCollateral { collateral_amount };
    let data = init_data.try_to_vec()?;

    let accounts = vec![
        AccountMeta::new(*source_collateral, false),
        AccountMeta::new(*destination_collateral, false),
        AccountMeta::new_readonly(*deposit_reserve, false),
        AccountMeta::new(*obligation, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(*obligation_owner, true),
        AccountMeta::new_readonly(*user_transfer_authority, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `WithdrawObligationCollateral` instruction
#[allow(clippy::too_many_arguments)]
pub fn withdraw_obligation_collateral(
    program_id: &Pubkey,
    collateral_amount: u64,
    source_collateral: &Pubkey,
    destination_collateral: &Pubkey,
    withdraw_reserve: &Pubkey,
    obligation: &Pubkey,
    market: &Pubkey,
    obligation_owner: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::WithdrawObligationCollateral { collateral_amount };
    let data = init_data.try_to_vec()?;
    let (market_authority, _) = find_program_address(program_id, market);

    let accounts = vec![
        AccountMeta::new(*source_collateral, false),
        AccountMeta::new(*destination_collateral, false),
        AccountMeta::new_readonly(*withdraw_reserve, false),
        AccountMeta::new(*obligation, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(market_authority, false),
        AccountMeta::new_readonly(*obligation_owner, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `BorrowObligationLiquidity` instruction
#[allow(clippy::too_many_arguments)]
pub fn borrow_obligation_liquidity(
    program_id: &Pubkey,
    liquidity_amount: u64,
    source_liquidity: &Pubkey,
    destination_liquidity: &Pubkey,
    borrow_reserve: &Pubkey,
    borrow_reserve_liquidity_fee_receiver: &Pubkey,
    obligation: &Pubkey,
    market: &Pubkey,
    obligation_owner: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::BorrowObligationLiquidity { liquidity_amount };
    let data = init_data.try_to_vec()?;
    let (market_authority, _) = find_program_address(program_id, market);

    let accounts = vec![
        AccountMeta::new(*source_liquidity, false),
        AccountMeta::new(*destination_liquidity, false),
        AccountMeta::new(*borrow_reserve, false),
        AccountMeta::new(*borrow_reserve_liquidity_fee_receiver, false),
        AccountMeta::new(*obligation, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(market_authority, false),
        AccountMeta::new_readonly(*obligation_owner, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `RepayObligationLiquidity` instruction
#[allow(clippy::too_many_arguments)]
pub fn repay_obligation_liquidity(
    program_id: &Pubkey,
    liquidity_amount: u64,
    source_liquidity: &Pubkey,
    destination_liquidity: &Pubkey,
    repay_reserve: &Pubkey,
    obligation: &Pubkey,
    market: &Pubkey,
    user_transfer_authority: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::RepayObligationLiquidity { liquidity_amount };
    let data = init_data.try_to_vec()?;

    let accounts = vec![
        AccountMeta::new(*source_liquidity, false),
        AccountMeta::new(*destination_liquidity, false),
        AccountMeta::new(*repay_reserve, false),
        AccountMeta::new(*obligation, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(*user_transfer_authority, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `DepositReserveLiquidityAndObligationCollateral` instruction
#[allow(clippy::too_many_arguments)]
pub fn deposit_reserve_liquidity_and_obligation_collateral(
    program_id: &Pubkey,
    liquidity_amount: u64,
    source_liquidity: &Pubkey,
    user_collateral: &Pubkey,
    reserve: &Pubkey,
    reserve_liquidity_supply: &Pubkey,
    reserve_collateral_mint: &Pubkey,
    market: &Pubkey,
    destination_collateral: &Pubkey,
    obligation: &Pubkey,
    obligation_owner: &Pubkey,
    user_transfer_authority: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data =
        LendingInstruction::DepositReserveLiquidityAndObligationCollateral { liquidity_amount };
    let data = init_data.try_to_vec()?;
    let (market_authority, _) = find_program_address(program_id, market);

    let accounts = vec![
        AccountMeta::new(*source_liquidity, false),
        AccountMeta::new(*user_collateral, false),
        AccountMeta::new(*reserve, false),
        AccountMeta::new(*reserve_liquidity_supply, false),
        AccountMeta::new(*reserve_collateral_mint, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(market_authority, false),
        AccountMeta::new(*destination_collateral, false),
        AccountMeta::new(*obligation, false),
        AccountMeta::new_readonly(*obligation_owner, true),
        AccountMeta::new_readonly(*user_transfer_authority, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create `WithdrawObligationCollateralAndRedeemReserveCollateral` instruction
#[allow(clippy::too_many_arguments)]
pub fn withdraw_obligation_collateral_and_redeem_reserve_collateral(
    program_id: &Pubkey,
    collateral_amount: u64,
    source_collateral: &Pubkey,
    user_collateral: &Pubkey,
    withdraw_reserve: &Pubkey,
    obligation: &Pubkey,
    market: &Pubkey,
    destination_liquidity: &Pubkey,
    reserve_collateral_mint: &Pubkey,
    reserve_liquidity_supply: &Pubkey,
    obligation_owner: &Pubkey,
    user_transfer_authority: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let init_data = LendingInstruction::WithdrawObligationCollateralAndRedeemReserveCollateral {
        collateral_amount,
    };
    let data = init_data.try_to_vec()?;
    let (market_authority, _) = find_program_address(program_id, market);

    let accounts = vec![
        AccountMeta::new(*source_collateral, false),
        AccountMeta::new(*user_collateral, false),
        AccountMeta::new(*withdraw_reserve, false),
        AccountMeta::new(*obligation, false),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(market_authority, false),
        AccountMeta::new(*destination_liquidity, false),
        AccountMeta::new(*reserve_collateral_mint, false),
        AccountMeta::new(*reserve_liquidity_supply, false),
        AccountMeta::new_readonly(*obligation_owner, true),
        AccountMeta::new_readonly(*user_transfer_authority, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}
