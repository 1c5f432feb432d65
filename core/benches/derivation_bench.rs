// Derivation and vault benchmarks for the Civic core.
//
// Covers seed stretching, master and child key derivation, full address
// generation for every chain, vault sealing and Shamir splitting.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use civic_core::config::VaultConfig;
use civic_core::recovery::{SecretSharing, ShamirScheme};
use civic_core::wallet::{mnemonic_to_seed, ExtendedKey};
use civic_core::{generate_wallet_addresses, Mnemonic, SecureVault};

const PHRASE: &str = "legal winner thank year wave sausage worth useful legal winner thank yellow";

fn bench_seed(c: &mut Criterion) {
    let mnemonic = Mnemonic::parse(PHRASE).unwrap();
    c.bench_function("bip39/mnemonic_to_seed", |b| {
        b.iter(|| mnemonic_to_seed(&mnemonic, "").unwrap());
    });
}

fn bench_key_tree(c: &mut Criterion) {
    let seed = mnemonic_to_seed(&Mnemonic::parse(PHRASE).unwrap(), "").unwrap();
    let master = ExtendedKey::master(&seed).unwrap();

    c.bench_function("bip32/master", |b| {
        b.iter(|| ExtendedKey::master(&seed).unwrap());
    });
    c.bench_function("bip32/child_normal", |b| {
        b.iter(|| master.child(0).unwrap());
    });
    c.bench_function("bip32/child_hardened", |b| {
        b.iter(|| master.child(0x8000_0000).unwrap());
    });
    c.bench_function("bip32/bip44_eth_path", |b| {
        b.iter(|| master.derive_path("m/44'/60'/0'/0/0").unwrap());
    });
}

fn bench_wallet_addresses(c: &mut Criterion) {
    let mnemonic = Mnemonic::parse(PHRASE).unwrap();
    c.bench_function("wallet/generate_all_chains", |b| {
        b.iter(|| generate_wallet_addresses(&mnemonic, 0).unwrap());
    });
}

fn bench_vault(c: &mut Criterion) {
    let mut group = c.benchmark_group("vault/encrypt");
    group.sample_size(10);
    let mut rng = StdRng::seed_from_u64(42);
    let plaintext = vec![0x5Au8; 256];

    for iterations in [10_000u32, 100_000] {
        let vault = SecureVault::new(VaultConfig {
            pbkdf2_iterations: iterations,
        });
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &iterations,
            |b, _| {
                b.iter(|| vault.encrypt(&plaintext, "p@ss1234", &mut rng).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_shamir(c: &mut Criterion) {
    let mut group = c.benchmark_group("shamir/split");
    let mut rng = StdRng::seed_from_u64(7);
    let secret = [0xA5u8; 64];
    group.throughput(Throughput::Bytes(secret.len() as u64));

    for (threshold, total) in [(2u8, 3u8), (3, 5), (5, 10)] {
        group.bench_with_input(
            BenchmarkId::new("t_of_n", format!("{threshold}/{total}")),
            &(threshold, total),
            |b, &(t, n)| {
                b.iter(|| ShamirScheme.split(&secret, t, n, &mut rng).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_seed,
    bench_key_tree,
    bench_wallet_addresses,
    bench_vault,
    bench_shamir
);
criterion_main!(benches);
