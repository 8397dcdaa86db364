//! Cluster resolution, identity loading and the devnet faucet policy

use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    signature::{read_keypair_file, Keypair},
};
use solend_client::Environment;
use std::{env, path::PathBuf, str::FromStr};

type Error = Box<dyn std::error::Error>;

/// Identities below this balance get topped up on devnet
pub const AIRDROP_THRESHOLD: u64 = 2 * LAMPORTS_PER_SOL;
/// Fixed faucet top-up amount
pub const AIRDROP_AMOUNT: u64 = 2 * LAMPORTS_PER_SOL;
/// Wait after a fee payer top-up so the credit lands before it pays fees
pub const FAUCET_WAIT_MS: u64 = 1000;

/// Recognized cluster monikers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cluster {
    Localhost,
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    /// JSON RPC endpoint of the cluster
    pub fn url(&self) -> &'static str {
        match self {
            Cluster::Localhost => "http://127.0.0.1:8899",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    /// Lending program deployment served by the cluster
    pub fn environment(&self) -> Environment {
        match self {
            Cluster::MainnetBeta => Environment::Production,
            _ => Environment::Devnet,
        }
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "localhost" => Ok(Cluster::Localhost),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" => Ok(Cluster::MainnetBeta),
            _ => Err(format!("Invalid cluster provided: {}", string)),
        }
    }
}

/// clap validator for cluster monikers
pub fn is_cluster(string: String) -> Result<(), String> {
    string.parse::<Cluster>().map(|_| ())
}

/// Expand a leading `~` in a keypair path against the home directory
pub fn resolve_home_path(path: &str) -> PathBuf {
    expand_home(path, env::var_os("HOME").map(PathBuf::from))
}

fn expand_home(path: &str, home: Option<PathBuf>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(stripped), Some(home)) => home.join(stripped.trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}

/// Load the owner identity, failing when the keypair file is missing
pub fn load_owner_keypair(path: &str) -> Result<Keypair, Error> {
    let path = resolve_home_path(path);
    if !path.exists() {
        return Err(format!(
            "The owner keypair {} does not exist, use the `-o, --owner` option to change the keypair path",
            path.display()
        )
        .into());
    }
    read_keypair_file(&path)
}

/// Load the fee payer identity, reusing the owner's key when the keypair
/// file is missing
pub fn load_payer_keypair(path: &str, owner: &Keypair) -> Result<Keypair, Error> {
    let path = resolve_home_path(path);
    if path.exists() {
        read_keypair_file(&path)
    } else {
        Ok(Keypair::from_bytes(&owner.to_bytes())?)
    }
}

/// Faucet top-up an identity needs before running a command, if any
pub fn airdrop_topup(cluster: Cluster, balance: u64) -> Option<u64> {
    if cluster == Cluster::Devnet && balance < AIRDROP_THRESHOLD {
        Some(AIRDROP_AMOUNT)
    } else {
        None
    }
}
