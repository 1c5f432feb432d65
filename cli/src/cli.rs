//! # CLI Interface
//!
//! Defines the command-line argument structure for `civic-wallet` using
//! `clap` derive. Secrets (passwords, phrases) can come from the
//! environment so they stay out of shell history.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CivicVerse identity and wallet tool.
///
/// Creates and restores a self-sovereign identity and a multi-chain wallet
/// on this machine. Nothing is sent over the network.
#[derive(Parser, Debug)]
#[command(
    name = "civic-wallet",
    about = "CivicVerse identity and multi-chain wallet",
    version,
    propagate_version = true
)]
pub struct CivicWalletCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory holding the encrypted vault.
    #[arg(long, short = 'd', env = "CIVIC_DATA_DIR", default_value = ".civic", global = true)]
    pub data_dir: PathBuf,

    /// Log output format (logs go to stderr).
    #[arg(long, env = "CIVIC_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    pub log_format: LogFormatArg,

    /// Vault password.
    #[arg(long, env = "CIVIC_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Store records without a password. Anyone who can read the data
    /// directory can then read the keys.
    #[arg(long, conflicts_with = "password", global = true)]
    pub no_password: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate or validate a recovery phrase.
    #[command(subcommand)]
    Mnemonic(MnemonicCommand),
    /// Derive chain addresses from a recovery phrase.
    Addresses(AddressesArgs),
    /// Manage the device identity.
    #[command(subcommand)]
    Identity(IdentityCommand),
    /// Manage the stored wallet.
    #[command(subcommand)]
    Wallet(WalletCommand),
    /// Split the wallet phrase among guardians, or recombine it.
    #[command(subcommand)]
    Recovery(RecoveryCommand),
    /// Print version information and exit.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum MnemonicCommand {
    /// Print a fresh recovery phrase.
    Generate {
        /// Number of words: 12 or 24.
        #[arg(long, short = 'w', default_value_t = 12)]
        words: usize,
    },
    /// Check a recovery phrase against the wordlist and checksum.
    Validate {
        #[arg(env = "CIVIC_MNEMONIC", hide_env_values = true)]
        phrase: String,
    },
}

/// Arguments for the `addresses` subcommand.
#[derive(Args, Debug)]
pub struct AddressesArgs {
    /// Recovery phrase to derive from.
    #[arg(env = "CIVIC_MNEMONIC", hide_env_values = true)]
    pub phrase: String,

    /// Optional BIP-39 passphrase.
    #[arg(long, default_value = "")]
    pub passphrase: String,

    /// Only this chain (BTC, ETH, KASPA, MONERO).
    #[arg(long, short = 'c')]
    pub chain: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub account: u32,

    #[arg(long, default_value_t = 0)]
    pub index: u32,
}

#[derive(Subcommand, Debug)]
pub enum IdentityCommand {
    /// Mint a new identity. Refused while one is stored.
    Create,
    /// Unlock the stored identity and print its DID document.
    Restore,
    /// Sign a message with the identity key.
    Sign { message: String },
    /// Show whether an identity is stored and its DID.
    Status,
    /// Delete the stored identity. Cannot be undone.
    Delete {
        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Create a wallet bound to the stored identity. Refused while one is
    /// stored.
    Create,
    /// Store an existing recovery phrase as the wallet.
    Import {
        #[arg(env = "CIVIC_MNEMONIC", hide_env_values = true)]
        phrase: String,
    },
    /// Unlock the wallet and print its addresses.
    Restore,
    /// Print the recovery phrase.
    Export,
    /// Delete the stored wallet. Cannot be undone.
    Delete {
        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecoveryCommand {
    /// Split the wallet phrase into one share per guardian.
    Split(SplitArgs),
    /// Rebuild a recovery phrase from guardian shares.
    Combine(CombineArgs),
}

/// Arguments for `recovery split`.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Shares needed to recover.
    #[arg(long, short = 't')]
    pub threshold: u8,

    /// Guardian as `NAME` or `NAME:CONTACT`. Repeat once per guardian.
    #[arg(long = "guardian", short = 'g', required = true)]
    pub guardians: Vec<String>,

    /// Seal each share under this password before printing.
    #[arg(long, env = "CIVIC_SHARE_PASSWORD", hide_env_values = true)]
    pub share_password: Option<String>,
}

/// Arguments for `recovery combine`.
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// JSON file as printed by `recovery split`, or a subset of its entries.
    pub shares: PathBuf,

    /// Password the shares were sealed with.
    #[arg(long, env = "CIVIC_SHARE_PASSWORD", hide_env_values = true)]
    pub share_password: Option<String>,
}
