use solana_account_decoder::{UiAccount, UiAccountEncoding};
use solana_client::{
    rpc_client::RpcClient,
    rpc_request::RpcRequest,
    rpc_response::{Response, RpcKeyedAccount, RpcResponseContext},
};
use solana_program::program_pack::Pack;
use solana_sdk::{
    account::Account, instruction::Instruction, pubkey::Pubkey, signature::Signature,
    system_instruction,
};
use solend_client::{
    action::Action,
    error::LendingClientError,
    find_obligation_address, id, instruction, obligation_seed,
    state::{pack_symbol, LendingMarket, Obligation, Reserve, PROGRAM_VERSION},
    Environment,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};
use std::collections::HashMap;

fn noop_instruction() -> Instruction {
    Instruction {
        program_id: Pubkey::new_unique(),
        accounts: vec![],
        data: vec![],
    }
}

fn test_reserve(symbol: &str, liquidity_mint: Pubkey) -> Reserve {
    let mut reserve = Reserve::default();
    reserve.version = PROGRAM_VERSION;
    reserve.market = Environment::Devnet.main_market();
    reserve.liquidity.mint = liquidity_mint;
    reserve.liquidity.supply = Pubkey::new_unique();
    reserve.liquidity.fee_receiver = Pubkey::new_unique();
    reserve.liquidity.oracle = Pubkey::new_unique();
    reserve.collateral.mint = Pubkey::new_unique();
    reserve.collateral.supply = Pubkey::new_unique();
    reserve.config.symbol = pack_symbol(symbol);
    reserve
}

fn account_response(account: &Account) -> serde_json::Value {
    serde_json::to_value(Response {
        context: RpcResponseContext {
            slot: 1,
            api_version: None,
        },
        value: Some(UiAccount::encode(
            &Pubkey::new_unique(),
            account,
            UiAccountEncoding::Base64,
            None,
            None,
        )),
    })
    .unwrap()
}

/// Client serving the devnet main market with one reserve. Each mocked
/// response is served once and every other request falls back to the sender
/// defaults, so later account lookups report missing accounts and rent
/// queries quote a flat 20 lamports.
fn mock_market_client(reserve: &Reserve, reserve_pubkey: Pubkey) -> RpcClient {
    let market = LendingMarket {
        version: PROGRAM_VERSION,
        ..LendingMarket::default()
    };
    let mut market_data = vec![0u8; LendingMarket::LEN];
    market.pack_into_slice(&mut market_data);
    let mut reserve_data = vec![0u8; Reserve::LEN];
    reserve.pack_into_slice(&mut reserve_data);

    let market_account = Account {
        lamports: 1_000_000_000,
        data: market_data,
        owner: id(),
        executable: false,
        rent_epoch: 0,
    };
    let reserve_account = Account {
        lamports: 1_000_000_000,
        data: reserve_data,
        owner: id(),
        executable: false,
        rent_epoch: 0,
    };

    let mut mocks = HashMap::new();
    mocks.insert(RpcRequest::GetAccountInfo, account_response(&market_account));
    mocks.insert(
        RpcRequest::GetProgramAccounts,
        serde_json::to_value(vec![RpcKeyedAccount {
            pubkey: reserve_pubkey.to_string(),
            account: UiAccount::encode(
                &reserve_pubkey,
                &reserve_account,
                UiAccountEncoding::Base64,
                None,
                None,
            ),
        }])
        .unwrap(),
    );
    RpcClient::new_mock_with_mocks("succeeds", mocks)
}

#[test]
fn missing_obligation_reported() {
    let owner = Pubkey::new_unique();
    let payer = Pubkey::new_unique();

    let builders: [fn(
        &RpcClient,
        Environment,
        u64,
        &str,
        &Pubkey,
        &Pubkey,
    ) -> Result<Action, LendingClientError>; 3] = [
        Action::build_withdraw,
        Action::build_borrow,
        Action::build_repay,
    ];

    for build in builders {
        let reserve = test_reserve("USDC", Pubkey::new_unique());
        let rpc_client = mock_market_client(&reserve, Pubkey::new_unique());

        match build(&rpc_client, Environment::Devnet, 100, "USDC", &owner, &payer) {
            Err(LendingClientError::ObligationNotFound(wallet)) => assert_eq!(wallet, owner),
            other => panic!("unexpected result: {:?}", other.map(|action| action.payer)),
        }
    }
}

#[test]
fn deposit_reserve_liquidity_sequence() {
    let owner = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let reserve = test_reserve("USDC", Pubkey::new_unique());
    let reserve_pubkey = Pubkey::new_unique();
    let rpc_client = mock_market_client(&reserve, reserve_pubkey);

    let action = Action::build_deposit_reserve_liquidity(
        &rpc_client,
        Environment::Devnet,
        1_000,
        "USDC",
        &owner,
        &payer,
    )
    .unwrap();

    assert_eq!(
        action.setup_instructions,
        vec![create_associated_token_account(
            &payer,
            &owner,
            &reserve.collateral.mint,
            &spl_token::id(),
        )]
    );
    assert_eq!(action.rent_free_balances, 20);

    assert_eq!(action.lending_instructions.len(), 2);
    assert_eq!(
        action.lending_instructions[0],
        instruction::refresh_reserve(&id(), &reserve_pubkey, &reserve.liquidity.oracle).unwrap()
    );
    let deposit = &action.lending_instructions[1];
    assert_eq!(deposit.data[0], 3);
    assert_eq!(deposit.data[1..], 1_000u64.to_le_bytes());
    assert_eq!(
        deposit.accounts[0].pubkey,
        get_associated_token_address(&owner, &reserve.liquidity.mint)
    );
    assert_eq!(
        deposit.accounts[1].pubkey,
        get_associated_token_address(&owner, &reserve.collateral.mint)
    );
    assert_eq!(deposit.accounts[2].pubkey, reserve_pubkey);
}

#[test]
fn deposit_creates_missing_accounts() {
    let owner = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let reserve = test_reserve("USDC", Pubkey::new_unique());
    let reserve_pubkey = Pubkey::new_unique();
    let rpc_client = mock_market_client(&reserve, reserve_pubkey);

    let action =
        Action::build_deposit(&rpc_client, Environment::Devnet, 500, "USDC", &owner, &payer)
            .unwrap();

    let market = Environment::Devnet.main_market();
    let obligation = find_obligation_address(&owner, &market).unwrap();
    assert_eq!(action.setup_instructions.len(), 3);
    assert_eq!(
        action.setup_instructions[0],
        create_associated_token_account(&payer, &owner, &reserve.collateral.mint, &spl_token::id())
    );
    assert_eq!(
        action.setup_instructions[1],
        system_instruction::create_account_with_seed(
            &payer,
            &obligation,
            &owner,
            &obligation_seed(&market),
            20,
            Obligation::LEN as u64,
            &id(),
        )
    );
    assert_eq!(
        action.setup_instructions[2],
        instruction::init_obligation(&id(), &obligation, &market, &owner).unwrap()
    );
    assert_eq!(action.rent_free_balances, 40);

    assert_eq!(action.lending_instructions.len(), 2);
    assert_eq!(action.lending_instructions[0].data[0], 1);
    assert_eq!(action.lending_instructions[1].data[0], 9);
}

#[test]
fn native_deposit_wrapped_in_lending_transaction() {
    let owner = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let reserve = test_reserve("SOL", spl_token::native_mint::id());
    let rpc_client = mock_market_client(&reserve, Pubkey::new_unique());

    let action = Action::build_deposit_reserve_liquidity(
        &rpc_client,
        Environment::Devnet,
        5_000,
        "SOL",
        &owner,
        &payer,
    )
    .unwrap();

    let user_liquidity = get_associated_token_address(&owner, &spl_token::native_mint::id());
    assert_eq!(action.setup_instructions.len(), 2);
    assert_eq!(action.rent_free_balances, 40);

    assert_eq!(action.lending_instructions.len(), 4);
    assert_eq!(
        action.lending_instructions[0],
        system_instruction::transfer(&owner, &user_liquidity, 5_000)
    );
    assert_eq!(
        action.lending_instructions[1],
        spl_token::instruction::sync_native(&spl_token::id(), &user_liquidity).unwrap()
    );
    assert_eq!(action.lending_instructions[2].data[0], 1);
    assert_eq!(action.lending_instructions[3].data[0], 3);
}

#[test]
fn lending_only_action_is_one_transaction() {
    let payer = Pubkey::new_unique();
    let action = Action {
        payer,
        setup_instructions: vec![],
        lending_instructions: vec![noop_instruction(), noop_instruction()],
        rent_free_balances: 0,
    };

    let transactions = action.transactions();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].message.instructions.len(), 2);
    assert_eq!(transactions[0].message.account_keys[0], payer);
}

#[test]
fn setup_goes_first() {
    let payer = Pubkey::new_unique();
    let action = Action {
        payer,
        setup_instructions: vec![noop_instruction()],
        lending_instructions: vec![noop_instruction(), noop_instruction(), noop_instruction()],
        rent_free_balances: 0,
    };

    let transactions = action.transactions();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].message.instructions.len(), 1);
    assert_eq!(transactions[1].message.instructions.len(), 3);
    for transaction in &transactions {
        assert_eq!(transaction.message.account_keys[0], payer);
    }
}

#[test]
fn send_transactions_in_order() {
    let action = Action {
        payer: Pubkey::new_unique(),
        setup_instructions: vec![noop_instruction()],
        lending_instructions: vec![noop_instruction(), noop_instruction()],
        rent_free_balances: 0,
    };

    let mut sent = Vec::new();
    let signatures = action
        .send_transactions(|transaction| {
            sent.push(transaction.message.instructions.len());
            Ok::<_, String>(Signature::default())
        })
        .unwrap();

    assert_eq!(signatures.len(), 2);
    assert_eq!(sent, vec![1, 2]);
}

#[test]
fn send_transactions_stops_at_first_failure() {
    let action = Action {
        payer: Pubkey::new_unique(),
        setup_instructions: vec![noop_instruction()],
        lending_instructions: vec![noop_instruction()],
        rent_free_balances: 0,
    };

    let mut attempts = 0;
    let result: Result<_, String> = action.send_transactions(|_| {
        attempts += 1;
        Err("node unreachable".to_string())
    });

    assert!(result.is_err());
    assert_eq!(attempts, 1);
}
