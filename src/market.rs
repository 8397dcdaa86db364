//! Market snapshot loading

use crate::{
    error::LendingClientError,
    find_obligation_address, id,
    state::{LendingMarket, Obligation, Reserve, RESERVE_MARKET_OFFSET},
    Environment,
};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_program::{program_pack::Pack, pubkey::Pubkey};

/// Lending market with its reserves, as last fetched
#[derive(Debug)]
pub struct MarketInfo {
    /// Market address
    pub pubkey: Pubkey,
    /// Market state
    pub account: LendingMarket,
    /// Reserves of the market
    pub reserves: Vec<ReserveInfo>,
}

/// Reserve, as last fetched
#[derive(Debug)]
pub struct ReserveInfo {
    /// Reserve address
    pub pubkey: Pubkey,
    /// Reserve state
    pub account: Reserve,
}

/// Obligation, as last fetched
#[derive(Debug)]
pub struct ObligationInfo {
    /// Obligation address
    pub pubkey: Pubkey,
    /// Obligation state
    pub account: Obligation,
}

impl MarketInfo {
    /// Fetch the main lending market of the environment with all its reserves
    pub fn load(
        rpc_client: &RpcClient,
        environment: Environment,
    ) -> Result<MarketInfo, LendingClientError> {
        let pubkey = environment.main_market();
        let account = rpc_client
            .get_account_with_commitment(&pubkey, rpc_client.commitment())?
            .value
            .ok_or(LendingClientError::AccountNotFound(pubkey))?;
        let account = LendingMarket::unpack(&account.data)?;
        let reserves = load_reserves(rpc_client, &pubkey)?;

        Ok(MarketInfo {
            pubkey,
            account,
            reserves,
        })
    }

    /// Find the reserve carrying the configured token symbol
    pub fn reserve_by_symbol(&self, symbol: &str) -> Result<&ReserveInfo, LendingClientError> {
        self.reserves
            .iter()
            .find(|reserve| reserve.account.config.symbol() == symbol)
            .ok_or_else(|| LendingClientError::ReserveNotFound(symbol.to_string()))
    }

    /// Find a reserve of the market by address
    pub fn reserve_by_pubkey(&self, pubkey: &Pubkey) -> Result<&ReserveInfo, LendingClientError> {
        self.reserves
            .iter()
            .find(|reserve| reserve.pubkey == *pubkey)
            .ok_or(LendingClientError::AccountNotFound(*pubkey))
    }

    /// Fetch the obligation of a wallet in this market, if one was created
    pub fn fetch_obligation_by_wallet(
        &self,
        rpc_client: &RpcClient,
        wallet: &Pubkey,
    ) -> Result<Option<ObligationInfo>, LendingClientError> {
        let pubkey = find_obligation_address(wallet, &self.pubkey)?;
        let account = rpc_client
            .get_account_with_commitment(&pubkey, rpc_client.commitment())?
            .value;

        match account {
            Some(account) => Ok(Some(ObligationInfo {
                pubkey,
                account: Obligation::unpack(&account.data)?,
            })),
            None => Ok(None),
        }
    }
}

/// Fetch all reserve accounts of a market
fn load_reserves(
    rpc_client: &RpcClient,
    market: &Pubkey,
) -> Result<Vec<ReserveInfo>, LendingClientError> {
    let config = RpcProgramAccountsConfig {
        filters: Some(vec![
            RpcFilterType::DataSize(Reserve::LEN as u64),
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                RESERVE_MARKET_OFFSET,
                market.to_bytes().to_vec(),
            )),
        ]),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            data_slice: None,
            commitment: Some(rpc_client.commitment()),
            min_context_slot: None,
        },
        with_context: None,
    };
    let accounts = rpc_client.get_program_accounts_with_config(&id(), config)?;

    accounts
        .into_iter()
        .map(|(pubkey, account)| {
            Ok(ReserveInfo {
                pubkey,
                account: Reserve::unpack(&account.data)?,
            })
        })
        .collect()
}
