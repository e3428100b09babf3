use primitive_types::H256;
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors arising from parsing a textual 32-byte hash.
#[derive(Debug, Error)]
pub enum ParseHashError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::from_slice(&hasher.finalize())
}

/// Parse a `0x`-prefixed (or bare) 64-digit hex string.
pub fn parse_h256(s: &str) -> Result<H256, ParseHashError> {
    let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
    if bytes.len() != 32 {
        return Err(ParseHashError::Length(bytes.len()));
    }
    Ok(H256::from_slice(&bytes))
}
