use clap::{
    crate_description, crate_name, crate_version, App, AppSettings, Arg, SubCommand,
};
use solana_clap_utils::{
    input_parsers::{pubkey_of, value_of},
    input_validators::{is_parsable, is_pubkey},
};
use solana_client::rpc_client::RpcClient;
use solana_program::native_token::{lamports_to_sol, LAMPORTS_PER_SOL};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
    transaction::Transaction,
};
use solend_client::{action::Action, market::MarketInfo, Environment};
use std::{process::exit, thread, time::Duration};

mod utils;
use crate::utils::{
    airdrop_topup, is_cluster, load_owner_keypair, load_payer_keypair, Cluster, FAUCET_WAIT_MS,
};

struct Config {
    rpc_client: RpcClient,
    cluster: Cluster,
    environment: Environment,
    owner: Keypair,
    payer: Keypair,
}

type Error = Box<dyn std::error::Error>;
type CommandResult = Result<(), Error>;

macro_rules! unique_signers {
    ($vec:ident) => {
        $vec.sort_by_key(|l| l.pubkey());
        $vec.dedup();
    };
}

fn check_fee_payer_balance(config: &Config, required_balance: u64) -> Result<(), Error> {
    let balance = config.rpc_client.get_balance(&config.payer.pubkey())?;
    if balance < required_balance {
        Err(format!(
            "Fee payer, {}, has insufficient balance: {} required, {} available",
            config.payer.pubkey(),
            lamports_to_sol(required_balance),
            lamports_to_sol(balance)
        )
        .into())
    } else {
        Ok(())
    }
}

fn bootstrap(config: &Config) -> Result<(), Error> {
    let owner_balance = config.rpc_client.get_balance(&config.owner.pubkey())?;
    if let Some(lamports) = airdrop_topup(config.cluster, owner_balance) {
        config
            .rpc_client
            .request_airdrop(&config.owner.pubkey(), lamports)?;
    }

    let payer_balance = config.rpc_client.get_balance(&config.payer.pubkey())?;
    if let Some(lamports) = airdrop_topup(config.cluster, payer_balance) {
        config
            .rpc_client
            .request_airdrop(&config.payer.pubkey(), lamports)?;
        // Let the faucet credit land before the payer covers any fees
        thread::sleep(Duration::from_millis(FAUCET_WAIT_MS));
    }

    let version = config.rpc_client.get_version()?;
    println!(
        "Connection to cluster established: {} {:?}",
        config.cluster.url(),
        version
    );
    Ok(())
}

fn send_action(config: &Config, action: &Action) -> CommandResult {
    action.send_transactions(|mut transaction: Transaction| -> Result<Signature, Error> {
        let recent_blockhash = config.rpc_client.get_latest_blockhash()?;
        let mut signers: Vec<&dyn Signer> = vec![&config.owner, &config.payer];
        unique_signers!(signers);
        transaction.try_sign(&signers, recent_blockhash)?;

        let fee = config.rpc_client.get_fee_for_message(transaction.message())?;
        check_fee_payer_balance(config, action.rent_free_balances + fee)?;

        let signature = config.rpc_client.send_transaction(&transaction)?;
        println!("Signature: {}", signature);
        Ok(signature)
    })?;
    Ok(())
}

fn command_market(config: &Config) -> CommandResult {
    let market = MarketInfo::load(&config.rpc_client, config.environment)?;

    println!("Market: {}", market.pubkey);
    println!("Owner: {}", market.account.owner);
    println!("Reserves:");
    for reserve in &market.reserves {
        println!("  {} {}", reserve.account.config.symbol(), reserve.pubkey);
    }

    Ok(())
}

fn command_obligation(config: &Config) -> CommandResult {
    let market = MarketInfo::load(&config.rpc_client, config.environment)?;
    let obligation = market.fetch_obligation_by_wallet(&config.rpc_client, &config.owner.pubkey())?;

    match obligation {
        Some(obligation) => {
            println!("Obligation: {}", obligation.pubkey);
            println!("{:#?}", obligation.account);
        }
        None => println!(
            "No obligation found for wallet {}",
            config.owner.pubkey()
        ),
    }

    Ok(())
}

fn command_reserve(config: &Config, symbol: &str) -> CommandResult {
    let market = MarketInfo::load(&config.rpc_client, config.environment)?;
    let reserve = market.reserve_by_symbol(symbol)?;

    println!("Reserve: {}", reserve.pubkey);
    println!("{:#?}", reserve.account.config);
    println!("{:#?}", reserve.account.stats()?);

    Ok(())
}

fn command_deposit(config: &Config, amount: u64, symbol: &str) -> CommandResult {
    println!("Depositing {} {}", amount, symbol);

    let action = Action::build_deposit(
        &config.rpc_client,
        config.environment,
        amount,
        symbol,
        &config.owner.pubkey(),
        &config.payer.pubkey(),
    )?;
    send_action(config, &action)
}

fn command_withdraw(config: &Config, amount: u64, symbol: &str) -> CommandResult {
    println!("Withdrawing {} {} collateral", amount, symbol);

    let action = Action::build_withdraw(
        &config.rpc_client,
        config.environment,
        amount,
        symbol,
        &config.owner.pubkey(),
        &config.payer.pubkey(),
    )?;
    send_action(config, &action)
}

fn command_deposit_reserve_liquidity(config: &Config, amount: u64, symbol: &str) -> CommandResult {
    println!("Depositing {} {} reserve liquidity", amount, symbol);

    let action = Action::build_deposit_reserve_liquidity(
        &config.rpc_client,
        config.environment,
        amount,
        symbol,
        &config.owner.pubkey(),
        &config.payer.pubkey(),
    )?;
    send_action(config, &action)
}

fn command_redeem_reserve_collateral(config: &Config, amount: u64, symbol: &str) -> CommandResult {
    println!("Redeeming {} {} collateral", amount, symbol);

    let action = Action::build_redeem_reserve_collateral(
        &config.rpc_client,
        config.environment,
        amount,
        symbol,
        &config.owner.pubkey(),
        &config.payer.pubkey(),
    )?;
    send_action(config, &action)
}

fn command_deposit_obligation_collateral(
    config: &Config,
    amount: u64,
    symbol: &str,
) -> CommandResult {
    println!("Depositing {} {} obligation collateral", amount, symbol);

    let action = Action::build_deposit_obligation_collateral(
        &config.rpc_client,
        config.environment,
        amount,
        symbol,
        &config.owner.pubkey(),
        &config.payer.pubkey(),
    )?;
    send_action(config, &action)
}

fn command_borrow(config: &Config, amount: u64, symbol: &str) -> CommandResult {
    println!("Borrowing {} {}", amount, symbol);

    let action = Action::build_borrow(
        &config.rpc_client,
        config.environment,
        amount,
        symbol,
        &config.owner.pubkey(),
        &config.payer.pubkey(),
    )?;
    send_action(config, &action)
}

fn command_repay(config: &Config, amount: u64, symbol: &str) -> CommandResult {
    println!("Repaying {} {}", amount, symbol);

    let action = Action::build_repay(
        &config.rpc_client,
        config.environment,
        amount,
        symbol,
        &config.owner.pubkey(),
        &config.payer.pubkey(),
    )?;
    send_action(config, &action)
}

fn command_transfer(config: &Config, amount: u64, recipient: &Pubkey) -> CommandResult {
    println!("From: {}", config.owner.pubkey());
    println!("Transfer amount: {} SOL", amount);
    println!("To: {}", recipient);

    let lamports = amount
        .checked_mul(LAMPORTS_PER_SOL)
        .ok_or("Transfer amount overflows lamports")?;

    let mut transaction = Transaction::new_with_payer(
        &[system_instruction::transfer(
            &config.owner.pubkey(),
            recipient,
            lamports,
        )],
        Some(&config.payer.pubkey()),
    );

    let recent_blockhash = config.rpc_client.get_latest_blockhash()?;
    let mut signers: Vec<&dyn Signer> = vec![&config.owner, &config.payer];
    unique_signers!(signers);
    transaction.try_sign(&signers, recent_blockhash)?;

    let fee = config.rpc_client.get_fee_for_message(transaction.message())?;
    check_fee_payer_balance(config, fee)?;

    let signature = config
        .rpc_client
        .send_and_confirm_transaction_with_spinner(&transaction)?;
    println!("Signature: {}", signature);

    Ok(())
}

fn command_balance(config: &Config) -> CommandResult {
    let balance = config.rpc_client.get_balance(&config.owner.pubkey())?;

    println!("Account: {}", config.owner.pubkey());
    println!("Balance: {} SOL", lamports_to_sol(balance));

    Ok(())
}

fn build_app() -> App<'static, 'static> {
    App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("owner")
                .short("o")
                .long("owner")
                .value_name("KEYPAIR")
                .takes_value(true)
                .global(true)
                .default_value("~/.config/solana/id.json")
                .help("Keypair of the position owner"),
        )
        .arg(
            Arg::with_name("payer")
                .short("p")
                .long("payer")
                .value_name("KEYPAIR")
                .takes_value(true)
                .global(true)
                .default_value("~/.config/solana/id.json")
                .help("Keypair paying fees, the owner keypair when the file is missing"),
        )
        .arg(
            Arg::with_name("cluster")
                .short("u")
                .long("url")
                .value_name("CLUSTER")
                .takes_value(true)
                .global(true)
                .validator(is_cluster)
                .default_value("devnet")
                .help("Cluster moniker: [mainnet-beta, testnet, devnet, localhost]"),
        )
        .subcommand(
            SubCommand::with_name("market").about("Print the main lending market and its reserves"),
        )
        .subcommand(
            SubCommand::with_name("obligation").about("Print the obligation of the owner wallet"),
        )
        .subcommand(
            SubCommand::with_name("reserve")
                .about("Print config and stats of a reserve")
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Reserve token symbol, like USDC"),
                ),
        )
        .subcommand(
            SubCommand::with_name("deposit")
                .about("Deposit liquidity and collateralize it in one step")
                .arg(
                    Arg::with_name("amount")
                        .value_name("AMOUNT")
                        .validator(is_parsable::<u64>)
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Amount of liquidity to deposit, in base units"),
                )
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .takes_value(true)
                        .index(2)
                        .required(true)
                        .help("Reserve token symbol, like USDC"),
                ),
        )
        .subcommand(
            SubCommand::with_name("withdraw")
                .about("Withdraw collateral and redeem it for liquidity in one step")
                .arg(
                    Arg::with_name("amount")
                        .value_name("AMOUNT")
                        .validator(is_parsable::<u64>)
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Amount of collateral to withdraw, in base units"),
                )
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .takes_value(true)
                        .index(2)
                        .required(true)
                        .help("Reserve token symbol, like USDC"),
                ),
        )
        .subcommand(
            SubCommand::with_name("deposit-reserve-liquidity")
                .about("Deposit liquidity into a reserve for collateral tokens")
                .arg(
                    Arg::with_name("amount")
                        .value_name("AMOUNT")
                        .validator(is_parsable::<u64>)
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Amount of liquidity to deposit, in base units"),
                )
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .takes_value(true)
                        .index(2)
                        .required(true)
                        .help("Reserve token symbol, like USDC"),
                ),
        )
        .subcommand(
            SubCommand::with_name("redeem-reserve-collateral")
                .about("Redeem collateral tokens for reserve liquidity")
                .arg(
                    Arg::with_name("amount")
                        .value_name("AMOUNT")
                        .validator(is_parsable::<u64>)
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Amount of collateral to redeem, in base units"),
                )
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .takes_value(true)
                        .index(2)
                        .required(true)
                        .help("Reserve token symbol, like USDC"),
                ),
        )
        .subcommand(
            SubCommand::with_name("deposit-obligation-collateral")
                .about("Deposit collateral tokens into the owner obligation")
                .arg(
                    Arg::with_name("amount")
                        .value_name("AMOUNT")
                        .validator(is_parsable::<u64>)
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Amount of collateral to deposit, in base units"),
                )
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .takes_value(true)
                        .index(2)
                        .required(true)
                        .help("Reserve token symbol, like USDC"),
                ),
        )
        .subcommand(
            SubCommand::with_name("borrow")
                .about("Borrow liquidity against the owner obligation")
                .arg(
                    Arg::with_name("amount")
                        .value_name("AMOUNT")
                        .validator(is_parsable::<u64>)
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Amount of liquidity to borrow, in base units"),
                )
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .takes_value(true)
                        .index(2)
                        .required(true)
                        .help("Reserve token symbol, like USDC"),
                ),
        )
        .subcommand(
            SubCommand::with_name("repay")
                .about("Repay borrowed liquidity")
                .arg(
                    Arg::with_name("amount")
                        .value_name("AMOUNT")
                        .validator(is_parsable::<u64>)
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Amount of liquidity to repay, in base units"),
                )
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .takes_value(true)
                        .index(2)
                        .required(true)
                        .help("Reserve token symbol, like USDC"),
                ),
        )
        .subcommand(
            SubCommand::with_name("transfer")
                .about("Transfer SOL from the owner to a recipient")
                .arg(
                    Arg::with_name("amount")
                        .value_name("AMOUNT")
                        .validator(is_parsable::<u64>)
                        .takes_value(true)
                        .index(1)
                        .required(true)
                        .help("Amount to transfer, in whole SOL"),
                )
                .arg(
                    Arg::with_name("recipient")
                        .value_name("ADDRESS")
                        .validator(is_pubkey)
                        .takes_value(true)
                        .index(2)
                        .required(true)
                        .help("Recipient wallet address"),
                ),
        )
        .subcommand(
            SubCommand::with_name("balance").about("Print the SOL balance of the owner"),
        )
}

fn main() {
    let matches = build_app().get_matches();

    let config = {
        let cluster = value_of::<Cluster>(&matches, "cluster").unwrap();

        let owner = load_owner_keypair(matches.value_of("owner").unwrap()).unwrap_or_else(|e| {
            eprintln!("error: {}", e);
            exit(1);
        });
        let payer = load_payer_keypair(matches.value_of("payer").unwrap(), &owner)
            .unwrap_or_else(|e| {
                eprintln!("error: {}", e);
                exit(1);
            });

        Config {
            rpc_client: RpcClient::new_with_commitment(
                cluster.url().to_string(),
                CommitmentConfig::confirmed(),
            ),
            environment: cluster.environment(),
            cluster,
            owner,
            payer,
        }
    };

    solana_logger::setup_with_default("solana=info");

    let _ = bootstrap(&config)
        .and_then(|_| match matches.subcommand() {
            ("market", Some(_)) => command_market(&config),
            ("obligation", Some(_)) => command_obligation(&config),
            ("reserve", Some(arg_matches)) => {
                let symbol = arg_matches.value_of("symbol").unwrap();
                command_reserve(&config, symbol)
            }
            ("deposit", Some(arg_matches)) => {
                let amount = value_of(arg_matches, "amount").unwrap();
                let symbol = arg_matches.value_of("symbol").unwrap();
                command_deposit(&config, amount, symbol)
            }
            ("withdraw", Some(arg_matches)) => {
                let amount = value_of(arg_matches, "amount").unwrap();
                let symbol = arg_matches.value_of("symbol").unwrap();
                command_withdraw(&config, amount, symbol)
            }
            ("deposit-reserve-liquidity", Some(arg_matches)) => {
                let amount = value_of(arg_matches, "amount").unwrap();
                let symbol = arg_matches.value_of("symbol").unwrap();
                command_deposit_reserve_liquidity(&config, amount, symbol)
            }
            ("redeem-reserve-collateral", Some(arg_matches)) => {
                let amount = value_of(arg_matches, "amount").unwrap();
                let symbol = arg_matches.value_of("symbol").unwrap();
                command_redeem_reserve_collateral(&config, amount, symbol)
            }
            ("deposit-obligation-collateral", Some(arg_matches)) => {
                let amount = value_of(arg_matches, "amount").unwrap();
                let symbol = arg_matches.value_of("symbol").unwrap();
                command_deposit_obligation_collateral(&config, amount, symbol)
            }
            ("borrow", Some(arg_matches)) => {
                let amount = value_of(arg_matches, "amount").unwrap();
                let symbol = arg_matches.value_of("symbol").unwrap();
                command_borrow(&config, amount, symbol)
            }
            ("repay", Some(arg_matches)) => {
                let amount = value_of(arg_matches, "amount").unwrap();
                let symbol = arg_matches.value_of("symbol").unwrap();
                command_repay(&config, amount, symbol)
            }
            ("transfer", Some(arg_matches)) => {
                let amount = value_of(arg_matches, "amount").unwrap();
                let recipient = pubkey_of(arg_matches, "recipient").unwrap();
                command_transfer(&config, amount, &recipient)
            }
            ("balance", Some(_)) => command_balance(&config),
            _ => unreachable!(),
        })
        .map_err(|err| {
            eprintln!("{}", err);
            exit(1);
        });
}
