//! End-to-end tests for the Civic core.
//!
//! These drive the public API the way a device would: phrase to addresses,
//! identity and wallet lifecycles against real stores, tampering with
//! stored records, and guardian recovery of a wallet phrase.
//!
//! Every test owns its store. Randomness is seeded so failures reproduce.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use civic_core::config::{IdentityConfig, VaultConfig, IDENTITY_SLOT};
use civic_core::crypto::IdentityKeypair;
use civic_core::recovery::recover_mnemonic;
use civic_core::vault::{open_record, seal_record};
use civic_core::wallet::{derive_address, mnemonic_to_seed, DerivationPath, ExtendedKey, Seed};
use civic_core::{
    generate_mnemonic, generate_wallet_addresses, validate_mnemonic, Chain, CoreError, Guardian,
    IdentityManager, MemoryStore, Mnemonic, SecretStore, SecureVault, SledStore,
    SocialRecoveryCoordinator, WalletManager, WordCount,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// A vault with a low iteration count so the suite stays fast.
fn fast_vault() -> SecureVault {
    SecureVault::new(VaultConfig {
        pbkdf2_iterations: 1_000,
    })
}

fn managers(store: Arc<dyn SecretStore>) -> (IdentityManager, WalletManager) {
    (
        IdentityManager::new(store.clone(), fast_vault(), IdentityConfig::default()),
        WalletManager::new(store, fast_vault()),
    )
}

// ---------------------------------------------------------------------------
// Derivation Pipeline
// ---------------------------------------------------------------------------

#[test]
fn eth_address_is_stable_across_pipeline_reruns() {
    let mnemonic = generate_mnemonic(WordCount::Twelve, &mut StdRng::seed_from_u64(2026));
    assert!(validate_mnemonic(mnemonic.phrase()));

    let run = || {
        let seed = mnemonic_to_seed(&mnemonic, "").unwrap();
        let master = ExtendedKey::master(&seed).unwrap();
        (
            derive_address(&master, Chain::Eth, 0, 0, 0).unwrap(),
            derive_address(&master, Chain::Eth, 0, 0, 1).unwrap(),
        )
    };

    let (first, next) = run();
    let (again, _) = run();
    assert_eq!(first.address, again.address);
    assert_ne!(first.address, next.address);
    assert_eq!(first.path, "m/44'/60'/0'/0/0");

    let all = generate_wallet_addresses(&mnemonic, 0).unwrap();
    assert_eq!(all[&Chain::Eth], first);
}

#[test]
fn known_phrase_reproduces_reference_vectors() {
    let phrase = "abandon abandon abandon abandon abandon abandon \
                  abandon abandon abandon abandon abandon about";
    let mnemonic = Mnemonic::parse(phrase).unwrap();

    let seed = mnemonic_to_seed(&mnemonic, "TREZOR").unwrap();
    assert_eq!(
        seed.to_hex(),
        "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
    );

    let addresses = generate_wallet_addresses(&mnemonic, 0).unwrap();
    assert_eq!(addresses.len(), 4);
    assert_eq!(
        addresses[&Chain::Eth].address,
        "0x9858effd232b4033e47d90003d41ec34ecaeda94"
    );
    assert!(addresses[&Chain::Btc].address.starts_with("bc1"));
    assert!(addresses[&Chain::Kaspa].address.starts_with("kaspa:"));
    assert!(addresses[&Chain::Monero].address.starts_with('4'));
}

#[test]
fn bip32_vector_one_chain() {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let master = ExtendedKey::master_from_bytes(&seed).unwrap();

    let leaf = master.derive_path("m/0'/1/2'/2/1000000000").unwrap();
    assert_eq!(leaf.depth(), 5);
    assert_eq!(
        leaf.private_key_hex().as_str(),
        "471b76e389e528d6de6d816857e012c5455051cad6660850e58372a6c3e6e7c8"
    );
    assert_eq!(
        hex::encode(leaf.chain_code()),
        "c783e67b921d2beb8f6b389cc646d7263b4145701dadd2161548a8b078e65e9e"
    );

    let path: DerivationPath = "m/0'/1/2'/2/1000000000".parse().unwrap();
    assert_eq!(master.derive(&path).unwrap(), leaf);
}

#[test]
fn hardened_and_normal_children_diverge() {
    let master = ExtendedKey::master(&Seed::from_bytes([7u8; 64])).unwrap();
    let normal = master.child(0).unwrap();
    let hardened = master.child(0x8000_0000).unwrap();
    assert_ne!(normal.public_key(), hardened.public_key());
    assert_eq!(
        master.derive_path("m/0/0").unwrap(),
        master.child(0).unwrap().child(0).unwrap()
    );
}

#[test]
fn validation_rejects_wrong_lengths_and_words() {
    let fifteen = "abandon ".repeat(14) + "address";
    assert!(!validate_mnemonic(&fifteen));
    assert!(!validate_mnemonic(
        "abandon abandon abandon abandon abandon abandon \
         abandon abandon abandon abandon abandon civicverse"
    ));
    let twenty_four = generate_mnemonic(WordCount::TwentyFour, &mut StdRng::seed_from_u64(1));
    assert!(validate_mnemonic(twenty_four.phrase()));
}

// ---------------------------------------------------------------------------
// Identity & Wallet Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn identity_create_restore_with_password() {
    let (identities, _) = managers(Arc::new(MemoryStore::new()));
    let mut rng = StdRng::seed_from_u64(42);

    let created = identities.create(Some("p@ss1234"), &mut rng).unwrap();
    let restored = identities.restore(Some("p@ss1234")).unwrap();
    assert_eq!(restored.did(), created.did());
    assert_eq!(restored.public_key(), created.public_key());
    assert_eq!(restored.created_at(), created.created_at());

    assert!(matches!(
        identities.restore(Some("wrong")),
        Err(CoreError::Authentication)
    ));
}

#[test]
fn tampered_public_key_halts_restore() {
    let store = Arc::new(MemoryStore::new());
    let (identities, _) = managers(store.clone());
    let vault = fast_vault();
    let mut rng = StdRng::seed_from_u64(43);
    identities.create(None, &mut rng).unwrap();

    let stored = store.get(IDENTITY_SLOT).unwrap().unwrap();
    let mut record: serde_json::Value = open_record(&vault, &stored, None).unwrap();
    let other = IdentityKeypair::generate(&mut StdRng::seed_from_u64(44));
    record["publicKey"] = serde_json::Value::String(other.public_key_hex());
    store
        .put(IDENTITY_SLOT, &seal_record(&vault, &record, None, &mut rng).unwrap())
        .unwrap();

    assert!(matches!(
        identities.restore(None),
        Err(CoreError::Integrity(_))
    ));
}

#[test]
fn identity_and_wallet_persist_in_sled() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(45);

    let (did, addresses) = {
        let store = Arc::new(SledStore::open(dir.path()).unwrap());
        let (identities, wallets) = managers(store);
        let identity = identities.create(Some("pw"), &mut rng).unwrap();
        let wallet = wallets
            .create(&identity.did().to_string(), Some("pw"), &mut rng)
            .unwrap();
        (identity.did().clone(), wallet.all_addresses().clone())
    };

    let store = Arc::new(SledStore::open(dir.path()).unwrap());
    let (identities, wallets) = managers(store);
    assert!(identities.exists().unwrap());
    assert_eq!(identities.stored_did().unwrap(), Some(did.to_string()));

    let identity = identities.restore(Some("pw")).unwrap();
    assert_eq!(identity.did(), &did);

    let wallet = wallets.restore(Some("pw")).unwrap();
    assert_eq!(wallet.civic_id(), did.to_string());
    assert_eq!(wallet.all_addresses(), &addresses);

    assert!(matches!(
        identities.create(Some("pw"), &mut rng),
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        wallets.create(&did.to_string(), Some("pw"), &mut rng),
        Err(CoreError::Validation(_))
    ));
    assert_eq!(identities.restore(Some("pw")).unwrap().did(), &did);

    let sig = identity.sign_message("hello civicverse");
    assert!(identity.verify_message("hello civicverse", &sig));
}

#[test]
fn deleting_identity_leaves_wallet() {
    let (identities, wallets) = managers(Arc::new(MemoryStore::new()));
    let mut rng = StdRng::seed_from_u64(46);
    let identity = identities.create(Some("pw"), &mut rng).unwrap();
    wallets
        .create(&identity.did().to_string(), Some("pw"), &mut rng)
        .unwrap();

    identities.delete().unwrap();
    assert!(!identities.exists().unwrap());
    assert!(matches!(
        identities.restore(Some("pw")),
        Err(CoreError::NotFound(_))
    ));
    assert!(wallets.exists().unwrap());
}

// ---------------------------------------------------------------------------
// Social Recovery
// ---------------------------------------------------------------------------

#[test]
fn guardians_recover_wallet_phrase() {
    let (_, wallets) = managers(Arc::new(MemoryStore::new()));
    let mut rng = StdRng::seed_from_u64(47);
    let wallet = wallets
        .create("did:civic:00112233445566778899aabbccddeeff", Some("pw"), &mut rng)
        .unwrap();
    let mnemonic = wallet.export_mnemonic().clone();

    let mut coordinator = SocialRecoveryCoordinator::for_mnemonic(&mnemonic, fast_vault());
    for name in ["Ana", "Bo", "Cy", "Di", "Ed"] {
        let contact = format!("{}@civic.example", name.to_lowercase());
        coordinator
            .add_guardian(Guardian::new(name, &contact, &mut rng))
            .unwrap();
    }
    coordinator.generate_shares(3, &mut rng).unwrap();

    // Each guardian receives a sealed share and returns it opened.
    let sealed: Vec<String> = coordinator
        .export_shares_for_distribution()
        .into_iter()
        .map(|(_, share)| coordinator.seal_share(share, "shared-secret", &mut rng).unwrap())
        .collect();
    let returned: Vec<_> = sealed
        .iter()
        .rev()
        .take(3)
        .map(|s| coordinator.open_share(s, "shared-secret").unwrap())
        .collect();

    let recovered = recover_mnemonic(&returned).unwrap();
    assert_eq!(recovered, mnemonic);
    assert_eq!(
        generate_wallet_addresses(&recovered, 0).unwrap(),
        *wallet.all_addresses()
    );

    assert!(matches!(
        recover_mnemonic(&returned[..2]),
        Err(CoreError::InsufficientShares {
            threshold: 3,
            provided: 2
        })
    ));
}
