// Copyright (c) 2026 CivicVerse Contributors. MIT License.
// See LICENSE for details.

//! # Civic Wallet CLI
//!
//! Entry point for the `civic-wallet` binary. Parses CLI arguments,
//! initializes logging, opens the vault in the data directory and runs one
//! command against the core library.
//!
//! Results go to stdout (JSON where structured); logs go to stderr.

mod cli;
mod logging;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use civic_core::config::{IdentityConfig, VaultConfig};
use civic_core::recovery::{open_share, recover_mnemonic};
use civic_core::wallet::{derive_address, mnemonic_to_seed, ExtendedKey};
use civic_core::{
    generate_mnemonic, generate_wallet_addresses, validate_mnemonic, Chain, Guardian,
    IdentityManager, Mnemonic, RecoveryShare, SecretStore, SecureVault, SledStore,
    SocialRecoveryCoordinator, WalletManager, WordCount,
};

use cli::{
    AddressesArgs, CivicWalletCli, CombineArgs, Commands, GlobalArgs, IdentityCommand,
    MnemonicCommand, RecoveryCommand, SplitArgs, WalletCommand,
};

/// One entry of `recovery split` output.
#[derive(Serialize, Deserialize)]
struct DistributedShare {
    guardian: Guardian,
    share: ShareEnvelope,
}

/// A share as handed to a guardian: in the clear, or sealed.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ShareEnvelope {
    Plain(RecoveryShare),
    Sealed(String),
}

fn main() -> Result<()> {
    let cli = CivicWalletCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.global.log_format);

    let global = &cli.global;
    match cli.command {
        Commands::Mnemonic(cmd) => mnemonic_command(cmd),
        Commands::Addresses(args) => addresses(args),
        Commands::Identity(cmd) => identity_command(global, cmd),
        Commands::Wallet(cmd) => wallet_command(global, cmd),
        Commands::Recovery(cmd) => recovery_command(global, cmd),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Opens the vault store under `data_dir`, creating it on first use.
fn open_store(data_dir: &Path) -> Result<Arc<dyn SecretStore>> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
    let path = data_dir.join("vault");
    let store = SledStore::open(&path)
        .with_context(|| format!("failed to open vault at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "vault opened");
    Ok(Arc::new(store))
}

/// The password to use, or `None` when the user explicitly opted out.
fn password(global: &GlobalArgs) -> Result<Option<&str>> {
    match (&global.password, global.no_password) {
        (Some(p), _) => Ok(Some(p.as_str())),
        (None, true) => Ok(None),
        (None, false) => {
            bail!("a password is required; pass --password or set CIVIC_PASSWORD (or --no-password)")
        }
    }
}

fn managers(global: &GlobalArgs) -> Result<(IdentityManager, WalletManager)> {
    let store = open_store(&global.data_dir)?;
    let vault = SecureVault::new(VaultConfig::default());
    Ok((
        IdentityManager::new(store.clone(), vault, IdentityConfig::default()),
        WalletManager::new(store, vault),
    ))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn mnemonic_command(cmd: MnemonicCommand) -> Result<()> {
    match cmd {
        MnemonicCommand::Generate { words } => {
            let count = WordCount::try_from(words)?;
            let mnemonic = generate_mnemonic(count, &mut OsRng);
            println!("{}", mnemonic.phrase());
        }
        MnemonicCommand::Validate { phrase } => {
            if validate_mnemonic(&phrase) {
                println!("valid");
            } else {
                bail!("invalid recovery phrase");
            }
        }
    }
    Ok(())
}

fn addresses(args: AddressesArgs) -> Result<()> {
    let mnemonic = Mnemonic::parse(&args.phrase).context("invalid recovery phrase")?;

    if args.chain.is_none() && args.passphrase.is_empty() && args.index == 0 {
        return print_json(&generate_wallet_addresses(&mnemonic, args.account)?);
    }

    let chains: Vec<Chain> = match &args.chain {
        Some(symbol) => vec![symbol.parse()?],
        None => Chain::ALL.to_vec(),
    };
    let seed = mnemonic_to_seed(&mnemonic, &args.passphrase)?;
    let master = ExtendedKey::master(&seed)?;
    let derived = chains
        .into_iter()
        .map(|chain| derive_address(&master, chain, args.account, 0, args.index))
        .collect::<civic_core::Result<Vec<_>>>()?;
    print_json(&derived)
}

fn identity_command(global: &GlobalArgs, cmd: IdentityCommand) -> Result<()> {
    let (identities, _) = managers(global)?;

    match cmd {
        IdentityCommand::Create => {
            let identity = identities
                .create(password(global)?, &mut OsRng)
                .context("failed to create identity")?;
            print_json(&json!({
                "did": identity.did().to_string(),
                "publicKey": identity.public_key_hex(),
                "createdAt": identity.created_at(),
            }))
        }
        IdentityCommand::Restore => {
            let identity = identities
                .restore(global.password.as_deref())
                .context("failed to restore identity")?;
            print_json(&identity.did_document())
        }
        IdentityCommand::Sign { message } => {
            let identity = identities
                .restore(global.password.as_deref())
                .context("failed to unlock identity")?;
            let signature = identity.sign_message(&message);
            print_json(&json!({
                "did": identity.did().to_string(),
                "publicKey": identity.public_key_hex(),
                "signature": signature.to_hex(),
            }))
        }
        IdentityCommand::Status => print_json(&json!({
            "exists": identities.exists()?,
            "did": identities.stored_did()?,
        })),
        IdentityCommand::Delete { yes } => {
            if !yes {
                bail!("refusing to delete the identity without --yes");
            }
            identities.delete()?;
            println!("identity deleted");
            Ok(())
        }
    }
}

fn wallet_command(global: &GlobalArgs, cmd: WalletCommand) -> Result<()> {
    let (identities, wallets) = managers(global)?;

    match cmd {
        WalletCommand::Create => store_wallet(global, &identities, &wallets, None),
        WalletCommand::Import { phrase } => {
            store_wallet(global, &identities, &wallets, Some(&phrase))
        }
        WalletCommand::Restore => {
            let wallet = wallets
                .restore(global.password.as_deref())
                .context("failed to restore wallet")?;
            print_json(&json!({
                "civicId": wallet.civic_id(),
                "addresses": wallet.all_addresses(),
            }))
        }
        WalletCommand::Export => {
            let wallet = wallets
                .restore(global.password.as_deref())
                .context("failed to unlock wallet")?;
            println!("{}", wallet.export_mnemonic().phrase());
            Ok(())
        }
        WalletCommand::Delete { yes } => {
            if !yes {
                bail!("refusing to delete the wallet without --yes");
            }
            wallets.delete()?;
            println!("wallet deleted");
            Ok(())
        }
    }
}

/// Create or import the wallet, bound to the stored identity's DID.
fn store_wallet(
    global: &GlobalArgs,
    identities: &IdentityManager,
    wallets: &WalletManager,
    phrase: Option<&str>,
) -> Result<()> {
    let did = identities
        .stored_did()?
        .context("no identity found; run `civic-wallet identity create` first")?;
    let password = password(global)?;
    let wallet = match phrase {
        Some(phrase) => wallets.import(&did, phrase, password, &mut OsRng),
        None => wallets.create(&did, password, &mut OsRng),
    }
    .context("failed to store wallet")?;
    print_json(wallet.all_addresses())
}

fn recovery_command(global: &GlobalArgs, cmd: RecoveryCommand) -> Result<()> {
    match cmd {
        RecoveryCommand::Split(args) => split(global, args),
        RecoveryCommand::Combine(args) => combine(args),
    }
}

fn split(global: &GlobalArgs, args: SplitArgs) -> Result<()> {
    let (_, wallets) = managers(global)?;
    let wallet = wallets
        .restore(global.password.as_deref())
        .context("failed to unlock wallet")?;

    let mut coordinator = SocialRecoveryCoordinator::for_mnemonic(
        wallet.export_mnemonic(),
        SecureVault::new(VaultConfig::default()),
    );
    for entry in &args.guardians {
        let (name, contact) = entry.split_once(':').unwrap_or((entry.as_str(), ""));
        coordinator.add_guardian(Guardian::new(name, contact, &mut OsRng))?;
    }
    coordinator.generate_shares(args.threshold, &mut OsRng)?;

    let distributed = coordinator
        .export_shares_for_distribution()
        .into_iter()
        .map(|(guardian, share)| {
            let share = match &args.share_password {
                Some(pw) => ShareEnvelope::Sealed(coordinator.seal_share(share, pw, &mut OsRng)?),
                None => ShareEnvelope::Plain(share.clone()),
            };
            Ok(DistributedShare {
                guardian: guardian.clone(),
                share,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if args.share_password.is_none() {
        tracing::warn!("shares printed unsealed; hand them over in person only");
    }
    print_json(&distributed)
}

fn combine(args: CombineArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.shares)
        .with_context(|| format!("failed to read {}", args.shares.display()))?;
    let distributed: Vec<DistributedShare> =
        serde_json::from_str(&raw).context("share file is not valid split output")?;

    let vault = SecureVault::new(VaultConfig::default());
    let shares = distributed
        .into_iter()
        .map(|entry| match entry.share {
            ShareEnvelope::Plain(share) => Ok(share),
            ShareEnvelope::Sealed(sealed) => {
                let pw = args
                    .share_password
                    .as_deref()
                    .context("shares are sealed; pass --share-password")?;
                open_share(&vault, &sealed, pw)
                    .with_context(|| format!("failed to open share of {}", entry.guardian.name))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mnemonic = recover_mnemonic(&shares).context("failed to recover recovery phrase")?;
    println!("{}", mnemonic.phrase());
    Ok(())
}

fn print_version() {
    println!("civic-wallet {}", env!("CARGO_PKG_VERSION"));
    println!("  chains: {}", Chain::ALL.map(|c| c.symbol()).join(", "));
}
