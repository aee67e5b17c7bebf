//! Module: Path
//! But: Ethereum HD path construction.

use bip32::{ChildNumber, DerivationPath};

use crate::error::PathError;

/// Ethereum account chain: m/44'/60'/0'/0
pub const BASE_PATH: &str = "m/44'/60'/0'/0";

const HARDENED: u32 = ChildNumber::HARDENED_FLAG;

const BASE_CHILDREN: [ChildNumber; 4] = [
    ChildNumber(44 | HARDENED),
    ChildNumber(60 | HARDENED),
    ChildNumber(HARDENED),
    ChildNumber(0),
];

/// [`BASE_PATH`] as child numbers.
pub fn base_path() -> DerivationPath {
    let mut path = DerivationPath::default();
    path.extend(BASE_CHILDREN);
    path
}

/// Appends the non-hardened child `index` to `base`.
pub fn build_path(base: &DerivationPath, index: u32) -> Result<DerivationPath, PathError> {
    let child = ChildNumber::new(index, false).map_err(|_| PathError::IndexOutOfRange(index))?;
    let mut path = base.clone();
    path.push(child);
    Ok(path)
}
