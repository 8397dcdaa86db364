//! Transaction assembly for lending operations
//!
//! Each builder fetches the main market, resolves the wallet's token and
//! obligation accounts and returns the instruction set of one operation.
//! Account creation goes into a setup transaction so the lending transaction
//! never exceeds the packet size limit.

use crate::{
    error::LendingClientError,
    find_obligation_address, id, instruction,
    market::{MarketInfo, ObligationInfo, ReserveInfo},
    obligation_seed,
    state::Obligation,
    Environment,
};
use solana_client::rpc_client::RpcClient;
use solana_program::{
    instruction::Instruction, program_pack::Pack, pubkey::Pubkey, system_instruction,
};
use solana_sdk::{signature::Signature, transaction::Transaction};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};

/// Unsigned transaction set implementing one lending operation
#[derive(Debug)]
pub struct Action {
    /// Fee payer the transactions are built for
    pub payer: Pubkey,
    /// Account creation preceding the operation
    pub setup_instructions: Vec<Instruction>,
    /// The operation itself, refreshes included
    pub lending_instructions: Vec<Instruction>,
    /// Rent-exemption lamports the setup instructions draw from the payer
    pub rent_free_balances: u64,
}

impl Action {
    /// Build a deposit of liquidity that is collateralized into the wallet's
    /// obligation in one step
    pub fn build_deposit(
        rpc_client: &RpcClient,
        environment: Environment,
        liquidity_amount: u64,
        symbol: &str,
        owner: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Action, LendingClientError> {
        let market = MarketInfo::load(rpc_client, environment)?;
        let reserve = market.reserve_by_symbol(symbol)?;

        let mut setup_instructions = vec![];
        let mut lending_instructions = vec![];
        let mut rent_free_balances = 0;

        let source_liquidity = resolve_source_liquidity(
            rpc_client,
            &mut setup_instructions,
            &mut lending_instructions,
            &mut rent_free_balances,
            reserve,
            owner,
            payer,
            liquidity_amount,
        )?;
        let user_collateral = ensure_associated_token_account(
            rpc_client,
            &mut setup_instructions,
            &mut rent_free_balances,
            owner,
            &reserve.account.collateral.mint,
            payer,
        )?;
        let obligation = ensure_obligation(
            rpc_client,
            &mut setup_instructions,
            &mut rent_free_balances,
            &market,
            owner,
            payer,
        )?;

        lending_instructions.push(instruction::refresh_reserve(
            &id(),
            &reserve.pubkey,
            &reserve.account.liquidity.oracle,
        )?);
        lending_instructions.push(
            instruction::deposit_reserve_liquidity_and_obligation_collateral(
                &id(),
                liquidity_amount,
                &source_liquidity,
                &user_collateral,
                &reserve.pubkey,
                &reserve.account.liquidity.supply,
                &reserve.account.collateral.mint,
                &market.pubkey,
                &reserve.account.collateral.supply,
                &obligation,
                owner,
                owner,
            )?,
        );

        Ok(Action {
            payer: *payer,
            setup_instructions,
            lending_instructions,
            rent_free_balances,
        })
    }

    /// Build a withdrawal of obligation collateral that is redeemed for
    /// liquidity in one step
    pub fn build_withdraw(
        rpc_client: &RpcClient,
        environment: Environment,
        collateral_amount: u64,
        symbol: &str,
        owner: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Action, LendingClientError> {
        let market = MarketInfo::load(rpc_client, environment)?;
        let reserve = market.reserve_by_symbol(symbol)?;
        let obligation = market
            .fetch_obligation_by_wallet(rpc_client, owner)?
            .ok_or(LendingClientError::ObligationNotFound(*owner))?;

        let mut setup_instructions = vec![];
        let mut lending_instructions = vec![];
        let mut rent_free_balances = 0;

        let user_collateral = ensure_associated_token_account(
            rpc_client,
            &mut setup_instructions,
            &mut rent_free_balances,
            owner,
            &reserve.account.collateral.mint,
            payer,
        )?;
        let user_liquidity = ensure_associated_token_account(
            rpc_client,
            &mut setup_instructions,
            &mut rent_free_balances,
            owner,
            &reserve.account.liquidity.mint,
            payer,
        )?;

        push_refresh_instructions(&mut lending_instructions, &market, &obligation, reserve)?;
        lending_instructions.push(
            instruction::withdraw_obligation_collateral_and_redeem_reserve_collateral(
                &id(),
                collateral_amount,
                &reserve.account.collateral.supply,
                &user_collateral,
                &reserve.pubkey,
                &obligation.pubkey,
                &market.pubkey,
                &user_liquidity,
                &reserve.account.collateral.mint,
                &reserve.account.liquidity.supply,
                owner,
                owner,
            )?,
        );

        Ok(Action {
            payer: *payer,
            setup_instructions,
            lending_instructions,
            rent_free_balances,
        })
    }

    /// Build a deposit of liquidity into a reserve, leaving the collateral
    /// tokens in the wallet
    pub fn build_deposit_reserve_liquidity(
        rpc_client: &RpcClient,
        environment: Environment,
        liquidity_amount: u64,
        symbol: &str,
        owner: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Action, LendingClientError> {
        let market = MarketInfo::load(rpc_client, environment)?;
        let reserve = market.reserve_by_symbol(symbol)?;

        let mut setup_instructions = vec![];
        let mut lending_instructions = vec![];
        let mut rent_free_balances = 0;

        let source_liquidity = resolve_source_liquidity(
            rpc_client,
            &mut setup_instructions,
            &mut lending_instructions,
            &mut rent_free_balances,
            reserve,
            owner,
            payer,
            liquidity_amount,
        )?;
        let user_collateral = ensure_associated_token_account(
            rpc_client,
            &mut setup_instructions,
            &mut rent_free_balances,
            owner,
            &reserve.account.collateral.mint,
            payer,
        )?;

        lending_instructions.push(instruction::refresh_reserve(
            &id(),
            &reserve.pubkey,
            &reserve.account.liquidity.oracle,
        )?);
        lending_instructions.push(instruction::deposit_reserve_liquidity(
            &id(),
            liquidity_amount,
            &source_liquidity,
            &user_collateral,
            &reserve.pubkey,
            &reserve.account.liquidity.supply,
            &reserve.account.collateral.mint,
            &market.pubkey,
            owner,
        )?);

        Ok(Action {
            payer: *payer,
            setup_instructions,
            lending_instructions,
            rent_free_balances,
        })
    }

    /// Build a redemption of collateral tokens held in the wallet for
    /// reserve liquidity
    pub fn build_redeem_reserve_collateral(
        rpc_client: &RpcClient,
        environment: Environment,
        collateral_amount: u64,
        symbol: &str,
        owner: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Action, LendingClientError> {
        let market = MarketInfo::load(rpc_client, environment)?;
        let reserve = market.reserve_by_symbol(symbol)?;

        let mut setup_instructions = vec![];
        let mut lending_instructions = vec![];
        let mut rent_free_balances = 0;

        let user_collateral =
            get_associated_token_address(owner, &reserve.account.collateral.mint);
        let user_liquidity = ensure_associated_token_account(
            rpc_client,
            &mut setup_instructions,
            &mut rent_free_balances,
            owner,
            &reserve.account.liquidity.mint,
            payer,
        )?;

        lending_instructions.push(instruction::refresh_reserve(
            &id(),
            &reserve.pubkey,
            &reserve.account.liquidity.oracle,
        )?);
        lending_instructions.push(instruction::redeem_reserve_collateral(
            &id(),
            collateral_amount,
            &user_collateral,
            &user_liquidity,
            &reserve.pubkey,
            &reserve.account.collateral.mint,
            &reserve.account.liquidity.supply,
            &market.pubkey,
            owner,
        )?);

        Ok(Action {
            payer: *payer,
            setup_instructions,
            lending_instructions,
            rent_free_balances,
        })
    }

    /// Build a deposit of collateral tokens held in the wallet into the
    /// wallet's obligation
    pub fn build_deposit_obligation_collateral(
        rpc_client: &RpcClient,
        environment: Environment,
        collateral_amount: u64,
        symbol: &str,
        owner: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Action, LendingClientError> {
        let market = MarketInfo::load(rpc_client, environment)?;
        let reserve = market.reserve_by_symbol(symbol)?;

        let mut setup_instructions = vec![];
        let mut lending_instructions = vec![];
        let mut rent_free_balances = 0;

        let user_collateral =
            get_associated_token_address(owner, &reserve.account.collateral.mint);
        let obligation = ensure_obligation(
            rpc_client,
            &mut setup_instructions,
            &mut rent_free_balances,
            &market,
            owner,
            payer,
        )?;

        lending_instructions.push(instruction::refresh_reserve(
            &id(),
            &reserve.pubkey,
            &reserve.account.liquidity.oracle,
        )?);
        lending_instructions.push(instruction::deposit_obligation_collateral(
            &id(),
            collateral_amount,
            &user_collateral,
            &reserve.account.collateral.supply,
            &reserve.pubkey,
            &obligation,
            &market.pubkey,
            owner,
            owner,
        )?);

        Ok(Action {
            payer: *payer,
            setup_instructions,
            lending_instructions,
            rent_free_balances,
        })
    }

    /// Build a borrow of reserve liquidity against the wallet's obligation
    pub fn build_borrow(
        rpc_client: &RpcClient,
        environment: Environment,
        liquidity_amount: u64,
        symbol: &str,
        owner: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Action, LendingClientError> {
        let market = MarketInfo::load(rpc_client, environment)?;
        let reserve = market.reserve_by_symbol(symbol)?;
        let obligation = market
            .fetch_obligation_by_wallet(rpc_client, owner)?
            .ok_or(LendingClientError::ObligationNotFound(*owner))?;

        let mut setup_instructions = vec![];
        let mut lending_instructions = vec![];
        let mut rent_free_balances = 0;

        let user_liquidity = ensure_associated_token_account(
            rpc_client,
            &mut setup_instructions,
            &mut rent_free_balances,
            owner,
            &reserve.account.liquidity.mint,
            payer,
        )?;

        push_refresh_instructions(&mut lending_instructions, &market, &obligation, reserve)?;
        lending_instructions.push(instruction::borrow_obligation_liquidity(
            &id(),
            liquidity_amount,
            &reserve.account.liquidity.supply,
            &user_liquidity,
            &reserve.pubkey,
            &reserve.account.liquidity.fee_receiver,
            &obligation.pubkey,
            &market.pubkey,
            owner,
        )?);

        Ok(Action {
            payer: *payer,
            setup_instructions,
            lending_instructions,
            rent_free_balances,
        })
    }

    /// Build a repayment of liquidity borrowed against the wallet's obligation
    pub fn build_repay(
        rpc_client: &RpcClient,
        environment: Environment,
        liquidity_amount: u64,
        symbol: &str,
        owner: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Action, LendingClientError> {
        let market = MarketInfo::load(rpc_client, environment)?;
        let reserve = market.reserve_by_symbol(symbol)?;
        let obligation = market
            .fetch_obligation_by_wallet(rpc_client, owner)?
            .ok_or(LendingClientError::ObligationNotFound(*owner))?;

        let mut setup_instructions = vec![];
        let mut lending_instructions = vec![];
        let mut rent_free_balances = 0;

        let source_liquidity = resolve_source_liquidity(
            rpc_client,
            &mut setup_instructions,
            &mut lending_instructions,
            &mut rent_free_balances,
            reserve,
            owner,
            payer,
            liquidity_amount,
        )?;

        push_refresh_instructions(&mut lending_instructions, &market, &obligation, reserve)?;
        lending_instructions.push(instruction::repay_obligation_liquidity(
            &id(),
            liquidity_amount,
            &source_liquidity,
            &reserve.account.liquidity.supply,
            &reserve.pubkey,
            &obligation.pubkey,
            &market.pubkey,
            owner,
        )?);

        Ok(Action {
            payer: *payer,
            setup_instructions,
            lending_instructions,
            rent_free_balances,
        })
    }

    /// Unsigned transactions of the action, setup first
    pub fn transactions(&self) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        if !self.setup_instructions.is_empty() {
            transactions.push(Transaction::new_with_payer(
                &self.setup_instructions,
                Some(&self.payer),
            ));
        }
        transactions.push(Transaction::new_with_payer(
            &self.lending_instructions,
            Some(&self.payer),
        ));
        transactions
    }

    /// Sign and submit the transactions of the action through a callback,
    /// stopping at the first failure
    pub fn send_transactions<F, E>(&self, mut send: F) -> Result<Vec<Signature>, E>
    where
        F: FnMut(Transaction) -> Result<Signature, E>,
    {
        let mut signatures = Vec::new();
        for transaction in self.transactions() {
            signatures.push(send(transaction)?);
        }
        Ok(signatures)
    }
}

/// Whether the account exists on the cluster
fn account_exists(rpc_client: &RpcClient, pubkey: &Pubkey) -> Result<bool, LendingClientError> {
    Ok(rpc_client
        .get_account_with_commitment(pubkey, rpc_client.commitment())?
        .value
        .is_some())
}

/// Resolve the associated token account of a wallet, creating it in the
/// setup transaction when missing
fn ensure_associated_token_account(
    rpc_client: &RpcClient,
    setup_instructions: &mut Vec<Instruction>,
    rent_free_balances: &mut u64,
    wallet: &Pubkey,
    mint: &Pubkey,
    payer: &Pubkey,
) -> Result<Pubkey, LendingClientError> {
    let pubkey = get_associated_token_address(wallet, mint);
    if !account_exists(rpc_client, &pubkey)? {
        *rent_free_balances +=
            rpc_client.get_minimum_balance_for_rent_exemption(spl_token::state::Account::LEN)?;
        setup_instructions.push(create_associated_token_account(
            payer,
            wallet,
            mint,
            &spl_token::id(),
        ));
    }
    Ok(pubkey)
}

/// Resolve the wallet's obligation account, creating and initializing it in
/// the setup transaction when missing
fn ensure_obligation(
    rpc_client: &RpcClient,
    setup_instructions: &mut Vec<Instruction>,
    rent_free_balances: &mut u64,
    market: &MarketInfo,
    owner: &Pubkey,
    payer: &Pubkey,
) -> Result<Pubkey, LendingClientError> {
    let pubkey = find_obligation_address(owner, &market.pubkey)?;
    if !account_exists(rpc_client, &pubkey)? {
        let lamports = rpc_client.get_minimum_balance_for_rent_exemption(Obligation::LEN)?;
        *rent_free_balances += lamports;
        setup_instructions.push(system_instruction::create_account_with_seed(
            payer,
            &pubkey,
            owner,
            &obligation_seed(&market.pubkey),
            lamports,
            Obligation::LEN as u64,
            &id(),
        ));
        setup_instructions.push(instruction::init_obligation(
            &id(),
            &pubkey,
            &market.pubkey,
            owner,
        )?);
    }
    Ok(pubkey)
}

/// Resolve the wallet's liquidity token account, wrapping the deposit amount
/// when the reserve liquidity is native SOL
#[allow(clippy::too_many_arguments)]
fn resolve_source_liquidity(
    rpc_client: &RpcClient,
    setup_instructions: &mut Vec<Instruction>,
    lending_instructions: &mut Vec<Instruction>,
    rent_free_balances: &mut u64,
    reserve: &ReserveInfo,
    owner: &Pubkey,
    payer: &Pubkey,
    liquidity_amount: u64,
) -> Result<Pubkey, LendingClientError> {
    let mint = &reserve.account.liquidity.mint;
    if *mint != spl_token::native_mint::id() {
        return Ok(get_associated_token_address(owner, mint));
    }

    let user_liquidity = ensure_associated_token_account(
        rpc_client,
        setup_instructions,
        rent_free_balances,
        owner,
        mint,
        payer,
    )?;
    lending_instructions.push(system_instruction::transfer(
        owner,
        &user_liquidity,
        liquidity_amount,
    ));
    lending_instructions.push(spl_token::instruction::sync_native(
        &spl_token::id(),
        &user_liquidity,
    )?);
    Ok(user_liquidity)
}

/// Refresh every reserve the obligation references plus the target reserve,
/// then the obligation itself
fn push_refresh_instructions(
    lending_instructions: &mut Vec<Instruction>,
    market: &MarketInfo,
    obligation: &ObligationInfo,
    target_reserve: &ReserveInfo,
) -> Result<(), LendingClientError> {
    let mut refresh_keys = obligation.account.reserve_pubkeys();
    if !refresh_keys.contains(&target_reserve.pubkey) {
        refresh_keys.push(target_reserve.pubkey);
    }
    for pubkey in &refresh_keys {
        let reserve = market.reserve_by_pubkey(pubkey)?;
        lending_instructions.push(instruction::refresh_reserve(
            &id(),
            &reserve.pubkey,
            &reserve.account.liquidity.oracle,
        )?);
    }
    lending_instructions.push(instruction::refresh_obligation(
        &id(),
        &obligation.pubkey,
        &obligation.account.reserve_pubkeys(),
    )?);
    Ok(())
}
