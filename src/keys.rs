//! Module: Keys
//! But: BIP-32 child key derivation over secp256k1.

use bip32::{ChildNumber, DerivationPath, XPrv};

use crate::error::WalletError;
use crate::seed::Seed;

// --- Dérivation ---

/// Derives the extended private key at `path` from the master key of `seed`.
pub fn derive_key(seed: &Seed, path: &DerivationPath) -> Result<XPrv, WalletError> {
    let master = XPrv::new(seed).map_err(|e| failure("m", e))?;
    walk(master, path.iter(), path)
}

/// Applies `children` left to right starting from `parent`.
fn walk(
    parent: XPrv,
    children: impl Iterator<Item = ChildNumber>,
    path: &DerivationPath,
) -> Result<XPrv, WalletError> {
    children.fold(Ok(parent), |node, child| {
        node?.derive_child(child).map_err(|e| failure(&path.to_string(), e))
    })
}

fn failure(path: &str, err: bip32::Error) -> WalletError {
    WalletError::KeyDerivation {
        path: path.to_string(),
        reason: err.to_string(),
    }
}

/// Key material for one mnemonic.
///
/// The node at `base` is derived once; every path that extends `base` only
/// walks its remaining children from there, which is what makes deriving many
/// indices per seed cheap.
pub struct SeedKeys {
    seed: Seed,
    base: DerivationPath,
    account: Result<XPrv, WalletError>,
}

impl SeedKeys {
    pub fn new(seed: Seed, base: &DerivationPath) -> Self {
        let account = derive_key(&seed, base);
        Self {
            seed,
            base: base.clone(),
            account,
        }
    }

    /// Same result as [`derive_key`] on the cached seed.
    pub fn derive(&self, path: &DerivationPath) -> Result<XPrv, WalletError> {
        let extends_base =
            path.len() >= self.base.len() && path.iter().zip(self.base.iter()).all(|(a, b)| a == b);
        if !extends_base {
            return derive_key(&self.seed, path);
        }
        let account = self.account.clone()?;
        walk(account, path.iter().skip(self.base.len()), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{base_path, build_path};

    const PHRASE: &str = "test test test test test test test test test test test junk";

    #[test]
    fn known_private_key_at_index_zero() {
        let seed = Seed::from_phrase(PHRASE);
        let key = derive_key(&seed, &build_path(&base_path(), 0).unwrap()).unwrap();
        assert_eq!(
            hex::encode(key.to_bytes()),
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
        );
    }

    #[test]
    fn distinct_indices_give_distinct_keys() {
        let seed = Seed::from_phrase(PHRASE);
        let keys: Vec<[u8; 32]> = (0..8)
            .map(|i| {
                derive_key(&seed, &build_path(&base_path(), i).unwrap())
                    .unwrap()
                    .to_bytes()
            })
            .collect();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn cached_account_matches_full_walk() {
        let seed = Seed::from_phrase(PHRASE);
        let keys = SeedKeys::new(seed.clone(), &base_path());
        for i in [0, 1, 19, 1000] {
            let path = build_path(&base_path(), i).unwrap();
            assert_eq!(
                keys.derive(&path).unwrap().to_bytes(),
                derive_key(&seed, &path).unwrap().to_bytes()
            );
        }
    }

    #[test]
    fn unrelated_path_walks_from_master() {
        let seed = Seed::from_phrase(PHRASE);
        let keys = SeedKeys::new(seed.clone(), &base_path());
        let other: DerivationPath = "m/44'/60'/1'/0/0".parse().unwrap();
        assert_eq!(
            keys.derive(&other).unwrap().to_bytes(),
            derive_key(&seed, &other).unwrap().to_bytes()
        );
    }

    #[test]
    fn hardened_and_plain_children_differ() {
        let seed = Seed::from_phrase(PHRASE);
        let plain: DerivationPath = "m/44'/60'/0'/0/0".parse().unwrap();
        let hardened: DerivationPath = "m/44'/60'/0'/0/0'".parse().unwrap();
        assert_ne!(
            derive_key(&seed, &plain).unwrap().to_bytes(),
            derive_key(&seed, &hardened).unwrap().to_bytes()
        );
    }
}
