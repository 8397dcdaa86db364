use borsh::BorshSerialize;
use solana_program::program_pack::{IsInitialized, Pack};
use solana_sdk::pubkey::Pubkey;
use solend_client::state::{
    pack_symbol, LastUpdate, LendingMarket, Obligation, ObligationCollateral,
    ObligationLiquidity, Reserve, MAX_OBLIGATION_RESERVES, PROGRAM_VERSION, RATE_POWER,
    RESERVE_MARKET_OFFSET,
};

fn test_reserve(market: Pubkey, symbol: &str) -> Reserve {
    let mut reserve = Reserve::default();
    reserve.version = PROGRAM_VERSION;
    reserve.last_update = LastUpdate {
        slot: 12_345,
        stale: false,
    };
    reserve.market = market;
    reserve.liquidity.mint = Pubkey::new_unique();
    reserve.liquidity.mint_decimals = 6;
    reserve.liquidity.supply = Pubkey::new_unique();
    reserve.liquidity.fee_receiver = Pubkey::new_unique();
    reserve.liquidity.oracle = Pubkey::new_unique();
    reserve.liquidity.available_amount = 600;
    reserve.liquidity.borrowed_amount = 400 * RATE_POWER;
    reserve.liquidity.cumulative_borrow_rate = RATE_POWER;
    reserve.liquidity.market_price = 2 * RATE_POWER;
    reserve.collateral.mint = Pubkey::new_unique();
    reserve.collateral.mint_total_supply = 500;
    reserve.collateral.supply = Pubkey::new_unique();
    reserve.config.symbol = pack_symbol(symbol);
    reserve.config.loan_to_value_ratio = 80;
    reserve.config.liquidation_threshold = 85;
    reserve
}

#[test]
fn lending_market_round_trip() {
    let owner = Pubkey::new_unique();
    let token_program_id = spl_token::id();
    let oracle_program_id = Pubkey::new_unique();

    let mut quote_currency = [0u8; 32];
    quote_currency[..3].copy_from_slice(b"USD");

    let market = LendingMarket {
        version: PROGRAM_VERSION,
        bump_seed: 255,
        owner,
        quote_currency,
        token_program_id,
        oracle_program_id,
    };

    let mut data = [0u8; LendingMarket::LEN];
    LendingMarket::pack(market, &mut data).unwrap();
    let unpacked = LendingMarket::unpack(&data).unwrap();

    assert_eq!(unpacked.version, PROGRAM_VERSION);
    assert_eq!(unpacked.bump_seed, 255);
    assert_eq!(unpacked.owner, owner);
    assert_eq!(unpacked.quote_currency, quote_currency);
    assert_eq!(unpacked.token_program_id, token_program_id);
    assert_eq!(unpacked.oracle_program_id, oracle_program_id);
}

#[test]
fn uninitialized_market_rejected() {
    let data = [0u8; LendingMarket::LEN];

    assert!(LendingMarket::unpack(&data).is_err());
    assert!(!LendingMarket::unpack_unchecked(&data)
        .unwrap()
        .is_initialized());
}

#[test]
fn reserve_round_trip() {
    let market = Pubkey::new_unique();
    let reserve = test_reserve(market, "USDC");
    let oracle = reserve.liquidity.oracle;

    let mut data = [0u8; Reserve::LEN];
    Reserve::pack(reserve, &mut data).unwrap();
    let unpacked = Reserve::unpack(&data).unwrap();

    assert_eq!(unpacked.market, market);
    assert_eq!(unpacked.last_update.slot, 12_345);
    assert_eq!(unpacked.liquidity.oracle, oracle);
    assert_eq!(unpacked.liquidity.available_amount, 600);
    assert_eq!(unpacked.config.symbol(), "USDC");
    assert_eq!(unpacked.config.loan_to_value_ratio, 80);
}

#[test]
fn reserve_len_matches_layout() {
    let reserve = test_reserve(Pubkey::new_unique(), "SOL");
    let serialized = reserve.try_to_vec().unwrap();

    assert_eq!(serialized.len(), Reserve::LEN);
}

#[test]
fn reserve_market_offset_matches_layout() {
    let market = Pubkey::new_unique();
    let reserve = test_reserve(market, "SOL");

    let mut data = [0u8; Reserve::LEN];
    Reserve::pack(reserve, &mut data).unwrap();

    assert_eq!(
        &data[RESERVE_MARKET_OFFSET..RESERVE_MARKET_OFFSET + 32],
        market.as_ref()
    );
}

#[test]
fn symbol_zero_padding() {
    assert_eq!(pack_symbol("USDC")[..4], *b"USDC");
    assert_eq!(pack_symbol("USDC")[4..], [0u8; 12]);
    assert_eq!(pack_symbol("TOKENNAMETOOLONGX"), *b"TOKENNAMETOOLONG");

    let mut reserve = Reserve::default();
    reserve.config.symbol = pack_symbol("wSOL");
    assert_eq!(reserve.config.symbol(), "wSOL");

    reserve.config.symbol = [0u8; 16];
    assert_eq!(reserve.config.symbol(), "");
}

#[test]
fn reserve_stats_derivation() {
    let reserve = test_reserve(Pubkey::new_unique(), "USDC");
    let stats = reserve.stats().unwrap();

    assert_eq!(stats.symbol, "USDC");
    assert_eq!(stats.decimals, 6);
    assert_eq!(stats.total_borrows, 400);
    assert_eq!(stats.available_liquidity, 600);
    assert_eq!(stats.total_deposits, 1_000);
    assert!((stats.utilization_rate - 0.4).abs() < f64::EPSILON);
    assert!((stats.collateral_exchange_rate - 2.0).abs() < f64::EPSILON);
    assert!((stats.market_price - 2.0).abs() < f64::EPSILON);
    assert!((stats.cumulative_borrow_rate - 1.0).abs() < f64::EPSILON);
}

#[test]
fn reserve_stats_initial_exchange_rate() {
    let mut reserve = test_reserve(Pubkey::new_unique(), "USDC");
    reserve.liquidity.available_amount = 0;
    reserve.liquidity.borrowed_amount = 0;
    reserve.collateral.mint_total_supply = 0;

    let stats = reserve.stats().unwrap();
    assert_eq!(stats.utilization_rate, 0.0);
    assert_eq!(stats.collateral_exchange_rate, 1.0);
}

#[test]
fn obligation_round_trip() {
    let reserve_a = Pubkey::new_unique();
    let reserve_b = Pubkey::new_unique();
    let owner = Pubkey::new_unique();

    let mut obligation = Obligation::default();
    obligation.version = PROGRAM_VERSION;
    obligation.market = Pubkey::new_unique();
    obligation.owner = owner;
    obligation.deposits = vec![
        ObligationCollateral {
            deposit_reserve: reserve_a,
            deposited_amount: 1_000,
        },
        ObligationCollateral {
            deposit_reserve: reserve_b,
            deposited_amount: 2_000,
        },
    ];
    obligation.borrows = vec![ObligationLiquidity {
        borrow_reserve: reserve_a,
        borrowed_amount: 500 * RATE_POWER,
        cumulative_borrow_rate: RATE_POWER,
    }];
    obligation.deposited_value = 3_000 * RATE_POWER;

    let mut data = [0u8; Obligation::LEN];
    Obligation::pack(obligation, &mut data).unwrap();
    let unpacked = Obligation::unpack(&data).unwrap();

    assert_eq!(unpacked.owner, owner);
    assert_eq!(unpacked.deposits.len(), 2);
    assert_eq!(unpacked.borrows.len(), 1);
    assert_eq!(unpacked.deposits[1].deposited_amount, 2_000);
    assert_eq!(unpacked.deposited_value, 3_000 * RATE_POWER);

    // Duplicates collapse, deposits come first
    assert_eq!(unpacked.reserve_pubkeys(), vec![reserve_a, reserve_b]);
}

#[test]
fn obligation_len_bounds_max_entries() {
    let mut obligation = Obligation::default();
    obligation.version = PROGRAM_VERSION;
    obligation.borrows = (0..MAX_OBLIGATION_RESERVES)
        .map(|_| ObligationLiquidity {
            borrow_reserve: Pubkey::new_unique(),
            borrowed_amount: RATE_POWER,
            cumulative_borrow_rate: RATE_POWER,
        })
        .collect();

    // Borrow entries are the largest, all borrows is the worst case
    let serialized = obligation.try_to_vec().unwrap();
    assert_eq!(serialized.len(), Obligation::LEN);
}

#[test]
fn empty_obligation_unpacks_from_padded_account() {
    let mut obligation = Obligation::default();
    obligation.version = PROGRAM_VERSION;
    obligation.market = Pubkey::new_unique();
    obligation.owner = Pubkey::new_unique();

    // Freshly initialized accounts keep their full allocation with the
    // serialized prefix followed by zero padding
    let mut data = [0u8; Obligation::LEN];
    Obligation::pack(obligation, &mut data).unwrap();
    let unpacked = Obligation::unpack(&data).unwrap();

    assert!(unpacked.deposits.is_empty());
    assert!(unpacked.borrows.is_empty());
    assert!(unpacked.reserve_pubkeys().is_empty());
}
