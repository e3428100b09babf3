use primitive_types::H160;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a counterparty in a bilateral ledger.
///
/// A party is an opaque 160-bit account address. Beyond equality and
/// unsigned numeric ordering it carries no meaning; the all-zero value
/// is the null identifier and is never a valid counterparty.
///
/// # Examples
///
/// ```
/// use exposure_ledger::core::party::PartyId;
///
/// let alice = PartyId::from_low_u64(1);
/// let bob: PartyId = "0x0000000000000000000000000000000000000002".parse().unwrap();
/// assert!(alice < bob);
/// assert!(!alice.is_null());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(H160);

impl PartyId {
    /// The null identifier.
    pub const ZERO: PartyId = PartyId(H160([0u8; 20]));

    /// Wrap a raw 20-byte address.
    pub fn new(address: H160) -> Self {
        Self(address)
    }

    /// Build an identifier whose low 8 bytes hold `value` (big-endian).
    pub fn from_low_u64(value: u64) -> Self {
        Self(H160::from_low_u64_be(value))
    }

    /// Whether this is the null identifier.
    pub fn is_null(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        self.0.as_fixed_bytes()
    }

    pub fn address(&self) -> H160 {
        self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

impl From<H160> for PartyId {
    fn from(address: H160) -> Self {
        Self(address)
    }
}

/// Errors arising from parsing a textual party identifier.
#[derive(Debug, Error)]
pub enum ParsePartyError {
    #[error("invalid hex in party identifier: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("party identifier must be 20 bytes, got {0}")]
    Length(usize),
}

impl FromStr for PartyId {
    type Err = ParsePartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)?;
        if bytes.len() != 20 {
            return Err(ParsePartyError::Length(bytes.len()));
        }
        Ok(Self(H160::from_slice(&bytes)))
    }
}
