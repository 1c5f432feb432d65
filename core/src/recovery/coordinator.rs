//! # Social Recovery Coordinator
//!
//! Splits a wallet secret among trusted guardians so that any `threshold`
//! of them can hand it back. Each guardian holds exactly one share; the
//! share count is always the guardian count at the time of the split.
//!
//! Every split gets a fresh random set id. Shares from different splits
//! never combine, even when their indices happen to line up.
//!
//! Shares leave the device through [`seal_share`](SocialRecoveryCoordinator::seal_share),
//! which encrypts them under a password agreed with the guardian.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{CoreError, Result};
use crate::recovery::shamir::{check_parameters, SecretSharing, ShamirScheme, MAX_SHARES};
use crate::vault::{open_record, seal_record, SecureVault};
use crate::wallet::Mnemonic;

/// Someone trusted to hold one recovery share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: String,
    pub name: String,
    /// Free-form contact detail (email, phone, handle).
    pub contact: String,
    /// The guardian's own DID, if they have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
}

impl Guardian {
    /// New guardian with a random v4 id.
    pub fn new<R: RngCore + CryptoRng>(name: &str, contact: &str, rng: &mut R) -> Self {
        Self::with_id(random_uuid(rng).to_string(), name, contact)
    }

    pub fn with_id(id: impl Into<String>, name: &str, contact: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            contact: contact.to_string(),
            did: None,
        }
    }

    pub fn with_did(mut self, did: impl Into<String>) -> Self {
        self.did = Some(did.into());
        self
    }
}

/// One guardian's share of a split secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryShare {
    pub set_id: Uuid,
    pub guardian_id: String,
    pub index: u8,
    pub threshold: u8,
    pub total_shares: u8,
    /// Share bytes, hex.
    pub payload: String,
}

impl fmt::Debug for RecoveryShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryShare")
            .field("set_id", &self.set_id)
            .field("guardian_id", &self.guardian_id)
            .field("index", &self.index)
            .field("threshold", &self.threshold)
            .field("total_shares", &self.total_shares)
            .finish_non_exhaustive()
    }
}

/// Guardian list plus the shares of the most recent split.
pub struct SocialRecoveryCoordinator<S: SecretSharing = ShamirScheme> {
    scheme: S,
    vault: SecureVault,
    secret: Zeroizing<Vec<u8>>,
    guardians: Vec<Guardian>,
    shares: BTreeMap<String, RecoveryShare>,
}

impl SocialRecoveryCoordinator<ShamirScheme> {
    /// Coordinator for an arbitrary secret, using Shamir's scheme.
    pub fn new(secret: &[u8], vault: SecureVault) -> Self {
        Self::with_scheme(ShamirScheme, secret, vault)
    }

    /// Coordinator for a wallet's recovery phrase.
    pub fn for_mnemonic(mnemonic: &Mnemonic, vault: SecureVault) -> Self {
        Self::new(mnemonic.phrase().as_bytes(), vault)
    }
}

impl<S: SecretSharing> SocialRecoveryCoordinator<S> {
    pub fn with_scheme(scheme: S, secret: &[u8], vault: SecureVault) -> Self {
        Self {
            scheme,
            vault,
            secret: Zeroizing::new(secret.to_vec()),
            guardians: Vec::new(),
            shares: BTreeMap::new(),
        }
    }

    pub fn add_guardian(&mut self, guardian: Guardian) -> Result<()> {
        if self.guardians.iter().any(|g| g.id == guardian.id) {
            return Err(CoreError::Validation(format!(
                "guardian '{}' already exists",
                guardian.id
            )));
        }
        if self.guardians.len() >= MAX_SHARES {
            return Err(CoreError::Validation(format!(
                "at most {MAX_SHARES} guardians are supported"
            )));
        }
        debug!(guardian_id = %guardian.id, "guardian added");
        self.guardians.push(guardian);
        Ok(())
    }

    /// Remove a guardian and forget their share. Returns `false` if the id
    /// was unknown.
    ///
    /// The remaining shares still combine; generate a new set if the
    /// removed guardian should no longer count.
    pub fn remove_guardian(&mut self, guardian_id: &str) -> bool {
        let before = self.guardians.len();
        self.guardians.retain(|g| g.id != guardian_id);
        self.shares.remove(guardian_id);
        let removed = self.guardians.len() != before;
        if removed {
            debug!(guardian_id, "guardian removed");
        }
        removed
    }

    pub fn guardians(&self) -> &[Guardian] {
        &self.guardians
    }

    /// Shares of the current set, keyed by guardian id.
    pub fn shares(&self) -> &BTreeMap<String, RecoveryShare> {
        &self.shares
    }

    /// Split the secret into one share per guardian, any `threshold` of
    /// which recover it. Replaces any previous set.
    pub fn generate_shares<R: RngCore + CryptoRng>(
        &mut self,
        threshold: u8,
        rng: &mut R,
    ) -> Result<&BTreeMap<String, RecoveryShare>> {
        let total = u8::try_from(self.guardians.len())
            .map_err(|_| CoreError::Validation("too many guardians".into()))?;
        check_parameters(threshold, total)?;

        let set_id = random_uuid(rng);
        let raw = self.scheme.split(&self.secret, threshold, total, rng)?;

        self.shares = self
            .guardians
            .iter()
            .zip(raw)
            .map(|(guardian, (index, data))| {
                let share = RecoveryShare {
                    set_id,
                    guardian_id: guardian.id.clone(),
                    index,
                    threshold,
                    total_shares: total,
                    payload: hex::encode(&data),
                };
                (guardian.id.clone(), share)
            })
            .collect();

        info!(%set_id, threshold, total, "recovery shares generated");
        Ok(&self.shares)
    }

    /// Pair each current share with its guardian, for hand-off.
    pub fn export_shares_for_distribution(&self) -> Vec<(&Guardian, &RecoveryShare)> {
        self.guardians
            .iter()
            .filter_map(|g| self.shares.get(&g.id).map(|share| (g, share)))
            .collect()
    }

    /// Encrypt `share` under `password` for delivery to its guardian.
    pub fn seal_share<R: RngCore + CryptoRng>(
        &self,
        share: &RecoveryShare,
        password: &str,
        rng: &mut R,
    ) -> Result<String> {
        seal_record(&self.vault, share, Some(password), rng)
    }

    /// Inverse of [`seal_share`](Self::seal_share).
    pub fn open_share(&self, sealed: &str, password: &str) -> Result<RecoveryShare> {
        open_share(&self.vault, sealed, password)
    }

    /// Rebuild the secret from guardian-submitted shares.
    pub fn recover_from_shares(&self, shares: &[RecoveryShare]) -> Result<Zeroizing<Vec<u8>>> {
        recover_with(&self.scheme, shares)
    }
}

/// Open a sealed share without a coordinator (the guardian's side).
pub fn open_share(vault: &SecureVault, sealed: &str, password: &str) -> Result<RecoveryShare> {
    open_record(vault, sealed, Some(password))
}

/// Rebuild a secret from shares with the default Shamir scheme.
pub fn recover_from_shares(shares: &[RecoveryShare]) -> Result<Zeroizing<Vec<u8>>> {
    recover_with(&ShamirScheme, shares)
}

/// Rebuild and parse a recovery phrase split by
/// [`SocialRecoveryCoordinator::for_mnemonic`].
pub fn recover_mnemonic(shares: &[RecoveryShare]) -> Result<Mnemonic> {
    let secret = recover_from_shares(shares)?;
    let phrase = std::str::from_utf8(&secret)
        .map_err(|_| CoreError::Integrity("recovered secret is not a recovery phrase".into()))?;
    Mnemonic::parse(phrase)
        .map_err(|_| CoreError::Integrity("recovered secret is not a recovery phrase".into()))
}

fn recover_with<S: SecretSharing + ?Sized>(
    scheme: &S,
    shares: &[RecoveryShare],
) -> Result<Zeroizing<Vec<u8>>> {
    let Some(first) = shares.first() else {
        return Err(CoreError::Validation("no shares supplied".into()));
    };

    let mut indices = HashSet::with_capacity(shares.len());
    for share in shares {
        if share.set_id != first.set_id {
            return Err(CoreError::Validation(
                "shares belong to different recovery sets".into(),
            ));
        }
        if share.threshold != first.threshold || share.total_shares != first.total_shares {
            return Err(CoreError::Validation(
                "shares disagree on threshold or share count".into(),
            ));
        }
        if !indices.insert(share.index) {
            return Err(CoreError::Validation(format!(
                "share index {} supplied twice",
                share.index
            )));
        }
    }

    if shares.len() < first.threshold as usize {
        return Err(CoreError::InsufficientShares {
            threshold: first.threshold,
            provided: shares.len(),
        });
    }

    let raw = shares
        .iter()
        .map(|s| {
            hex::decode(&s.payload)
                .map(|data| (s.index, data))
                .map_err(|e| CoreError::Validation(format!("share {} payload: {e}", s.index)))
        })
        .collect::<Result<Vec<_>>>()?;

    let secret = scheme.combine(&raw)?;
    info!(set_id = %first.set_id, provided = shares.len(), "secret recovered from shares");
    Ok(secret)
}

fn random_uuid<R: RngCore + CryptoRng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use crate::vault::is_encrypted;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SECRET: &[u8] = b"correct horse battery staple";

    fn vault() -> SecureVault {
        SecureVault::new(VaultConfig {
            pbkdf2_iterations: 1_000,
        })
    }

    fn coordinator(guardians: usize, rng: &mut StdRng) -> SocialRecoveryCoordinator {
        let mut c = SocialRecoveryCoordinator::new(SECRET, vault());
        for i in 0..guardians {
            c.add_guardian(Guardian::new(&format!("g{i}"), "x@example.org", rng))
                .unwrap();
        }
        c
    }

    fn current_shares(c: &SocialRecoveryCoordinator) -> Vec<RecoveryShare> {
        c.export_shares_for_distribution()
            .into_iter()
            .map(|(_, s)| s.clone())
            .collect()
    }

    #[test]
    fn guardian_ids_are_v4_uuids() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = Guardian::new("Ana", "ana@example.org", &mut rng);
        let id = Uuid::parse_str(&g.id).unwrap();
        assert_eq!(id.get_version_num(), 4);
        assert_ne!(g.id, Guardian::new("Ana", "ana@example.org", &mut rng).id);
    }

    #[test]
    fn duplicate_guardian_rejected() {
        let mut c = SocialRecoveryCoordinator::new(SECRET, vault());
        c.add_guardian(Guardian::with_id("a", "A", "a")).unwrap();
        assert!(matches!(
            c.add_guardian(Guardian::with_id("a", "B", "b")),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(c.guardians().len(), 1);
    }

    #[test]
    fn any_threshold_subset_recovers() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut c = coordinator(5, &mut rng);
        c.generate_shares(3, &mut rng).unwrap();
        let shares = current_shares(&c);
        assert_eq!(shares.len(), 5);

        for skip in 0..5 {
            let subset: Vec<_> = shares
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip && *i != (skip + 1) % 5)
                .map(|(_, s)| s.clone())
                .collect();
            assert_eq!(subset.len(), 3);
            assert_eq!(c.recover_from_shares(&subset).unwrap().as_slice(), SECRET);
        }
    }

    #[test]
    fn below_threshold_is_insufficient() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut c = coordinator(4, &mut rng);
        c.generate_shares(3, &mut rng).unwrap();
        let shares = current_shares(&c);
        assert!(matches!(
            c.recover_from_shares(&shares[..2]),
            Err(CoreError::InsufficientShares {
                threshold: 3,
                provided: 2
            })
        ));
    }

    #[test]
    fn empty_share_list_is_validation_error() {
        assert!(matches!(
            recover_from_shares(&[]),
            Err(CoreError::Validation(ref msg)) if msg == "no shares supplied"
        ));
        assert!(matches!(recover_mnemonic(&[]), Err(CoreError::Validation(_))));
    }

    #[test]
    fn threshold_bounds() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut c = coordinator(3, &mut rng);
        assert!(matches!(c.generate_shares(1, &mut rng), Err(CoreError::Validation(_))));
        assert!(matches!(c.generate_shares(4, &mut rng), Err(CoreError::Validation(_))));
        assert!(c.generate_shares(3, &mut rng).is_ok());
    }

    #[test]
    fn mixed_sets_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut c = coordinator(3, &mut rng);
        c.generate_shares(2, &mut rng).unwrap();
        let first = current_shares(&c);
        c.generate_shares(2, &mut rng).unwrap();
        let second = current_shares(&c);
        assert_ne!(first[0].set_id, second[0].set_id);

        let mixed = [first[0].clone(), second[1].clone()];
        assert!(matches!(c.recover_from_shares(&mixed), Err(CoreError::Validation(_))));
    }

    #[test]
    fn duplicate_and_inconsistent_shares_rejected() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut c = coordinator(3, &mut rng);
        c.generate_shares(2, &mut rng).unwrap();
        let shares = current_shares(&c);

        let dup = [shares[0].clone(), shares[0].clone()];
        assert!(matches!(c.recover_from_shares(&dup), Err(CoreError::Validation(_))));

        let mut altered = shares[1].clone();
        altered.threshold = 3;
        let inconsistent = [shares[0].clone(), altered];
        assert!(matches!(
            c.recover_from_shares(&inconsistent),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn removing_guardian_drops_share() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut c = coordinator(3, &mut rng);
        c.generate_shares(2, &mut rng).unwrap();
        let id = c.guardians()[1].id.clone();

        assert!(c.remove_guardian(&id));
        assert!(!c.remove_guardian(&id));
        assert_eq!(c.guardians().len(), 2);
        assert!(!c.shares().contains_key(&id));
        assert_eq!(c.export_shares_for_distribution().len(), 2);
    }

    #[test]
    fn sealed_share_roundtrip() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut c = coordinator(2, &mut rng);
        c.generate_shares(2, &mut rng).unwrap();
        let share = current_shares(&c).remove(0);

        let sealed = c.seal_share(&share, "guardian-pw", &mut rng).unwrap();
        assert!(is_encrypted(&sealed));
        assert!(!sealed.contains(&share.payload));
        assert_eq!(c.open_share(&sealed, "guardian-pw").unwrap(), share);
        assert!(matches!(
            open_share(&vault(), &sealed, "wrong"),
            Err(CoreError::Authentication)
        ));
    }

    #[test]
    fn mnemonic_roundtrip_through_guardians() {
        let mut rng = StdRng::seed_from_u64(9);
        let mnemonic = Mnemonic::parse(
            "legal winner thank year wave sausage worth useful legal winner thank yellow",
        )
        .unwrap();
        let mut c = SocialRecoveryCoordinator::for_mnemonic(&mnemonic, vault());
        for name in ["a", "b", "c"] {
            c.add_guardian(Guardian::new(name, name, &mut rng)).unwrap();
        }
        c.generate_shares(2, &mut rng).unwrap();
        let shares = current_shares(&c);
        assert_eq!(recover_mnemonic(&shares[1..]).unwrap(), mnemonic);
    }

    #[test]
    fn debug_hides_payload() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut c = coordinator(2, &mut rng);
        c.generate_shares(2, &mut rng).unwrap();
        let share = current_shares(&c).remove(0);
        assert!(!format!("{share:?}").contains(&share.payload));
    }
}
