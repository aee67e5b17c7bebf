//! Module: Input
//! But: Seeds file parsing.

use std::path::Path;

use tracing::warn;

use crate::error::InputError;

/// Reads one mnemonic per line, skipping blank lines.
///
/// Lines are raw bytes: invalid UTF-8 is replaced lossily and logged, never fatal.
pub fn read_seeds(path: impl AsRef<Path>) -> Result<Vec<String>, InputError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_seed_bytes(&bytes))
}

pub fn parse_seeds(text: &str) -> Vec<String> {
    parse_seed_bytes(text.as_bytes())
}

fn parse_seed_bytes(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|&b| b == b'\n')
        .enumerate()
        .filter_map(|(i, line)| {
            let line = line.trim_ascii();
            if line.is_empty() {
                return None;
            }
            let text = String::from_utf8_lossy(line);
            if let std::borrow::Cow::Owned(_) = text {
                warn!(file_line = i + 1, "Seed line is not valid UTF-8, invalid bytes replaced");
            }
            Some(text.into_owned())
        })
        .collect()
}
