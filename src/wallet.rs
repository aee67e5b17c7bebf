//! Module: Wallet
//! But: Private key to Ethereum wallet record.

use std::fmt;

use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use crate::error::WalletError;

/// A derived wallet that survived derivation.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletRecord {
    /// EIP-55 checksummed address, `0x` prefixed.
    pub address: String,
    /// 32-byte secret scalar as lowercase hex, no prefix.
    pub private_key: String,
    /// Full derivation path, empty until the caller labels it.
    pub hd_path: String,
}

impl WalletRecord {
    pub fn from_private_key(key: &SigningKey) -> Result<Self, WalletError> {
        let point = key.verifying_key().to_encoded_point(false);
        let public = point.as_bytes();

        // Uncompressed SEC1: 0x04 || X || Y
        if public.len() != 65 || public[0] != 0x04 {
            return Err(WalletError::Encoding(format!(
                "unexpected public key encoding ({} bytes)",
                public.len()
            )));
        }

        let hash = Keccak256::digest(&public[1..]);
        Ok(Self {
            address: checksum_address(&hash[12..]),
            private_key: hex::encode(key.to_bytes()),
            hd_path: String::new(),
        })
    }

    /// Fails for anything that is not a valid non-zero secp256k1 scalar.
    pub fn from_private_key_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let key = SigningKey::from_slice(bytes)
            .map_err(|e| WalletError::Encoding(format!("invalid private key: {e}")))?;
        Self::from_private_key(&key)
    }

    pub fn with_hd_path(mut self, hd_path: impl Into<String>) -> Self {
        self.hd_path = hd_path.into();
        self
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("address", &self.address)
            .field("hd_path", &self.hd_path)
            .finish_non_exhaustive()
    }
}

// --- Encodage ---

/// EIP-55: uppercase each hex letter whose nibble in keccak(lower_hex) is >= 8.
pub fn checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HARDHAT_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const HARDHAT_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn known_addresses() {
        let w0 = WalletRecord::from_private_key_bytes(&hex::decode(HARDHAT_0).unwrap()).unwrap();
        assert_eq!(w0.address, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(w0.private_key, HARDHAT_0);
        assert!(w0.hd_path.is_empty());

        let w1 = WalletRecord::from_private_key_bytes(&hex::decode(HARDHAT_1).unwrap()).unwrap();
        assert_eq!(w1.address, "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
    }

    #[test]
    fn eip55_reference_vectors() {
        for addr in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let raw = hex::decode(addr[2..].to_lowercase()).unwrap();
            assert_eq!(checksum_address(&raw), addr);
        }
    }

    #[test]
    fn rejects_invalid_scalars() {
        assert!(matches!(
            WalletRecord::from_private_key_bytes(&[0u8; 32]),
            Err(WalletError::Encoding(_))
        ));
        assert!(matches!(
            WalletRecord::from_private_key_bytes(&[1u8; 16]),
            Err(WalletError::Encoding(_))
        ));
        // Curve order n is out of range.
        let n = hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141").unwrap();
        assert!(WalletRecord::from_private_key_bytes(&n).is_err());
    }

    #[test]
    fn labels_path() {
        let w = WalletRecord::from_private_key_bytes(&hex::decode(HARDHAT_0).unwrap())
            .unwrap()
            .with_hd_path("m/44'/60'/0'/0/0");
        assert_eq!(w.hd_path, "m/44'/60'/0'/0/0");
    }

    #[test]
    fn debug_omits_private_key() {
        let w = WalletRecord::from_private_key_bytes(&hex::decode(HARDHAT_0).unwrap()).unwrap();
        assert!(!format!("{w:?}").contains(HARDHAT_0));
    }
}
