//! Module: Seed
//! But: BIP-39 seed stretching from a raw mnemonic string.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;

/// Seed length in bytes.
pub const SEED_LEN: usize = 64;

const PBKDF2_ROUNDS: u32 = 2048;
const SALT_PREFIX: &str = "mnemonic";

/// Stretched binary material fed to BIP-32.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Derives the seed of `phrase` with an empty passphrase.
    ///
    /// The phrase is used as-is: no word list lookup, no checksum and no
    /// normalization, so malformed phrases still produce a seed. For valid
    /// English phrases this matches every BIP-39 wallet.
    pub fn from_phrase(phrase: &str) -> Self {
        Self::from_phrase_with_passphrase(phrase, "")
    }

    pub fn from_phrase_with_passphrase(phrase: &str, passphrase: &str) -> Self {
        let salt = format!("{SALT_PREFIX}{passphrase}");
        let mut out = [0u8; SEED_LEN];
        pbkdf2_hmac::<Sha512>(phrase.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut out);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Seed {
    // Never print seed material.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(..)")
    }
}
