use crate::core::hash::{keccak256, parse_h256, ParseHashError};
use crate::core::party::PartyId;
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors arising from canonicalising a party pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("identical addresses: {0}")]
    IdenticalAddresses(PartyId),
    #[error("invalid address: null party identifier")]
    InvalidAddress,
}

/// Symmetric storage key for an unordered pair of parties.
///
/// `PairKey(a, b) == PairKey(b, a)` for every valid pair, so every
/// bilateral ledger stores one record per pair regardless of which side
/// the caller names first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(H256);

impl PairKey {
    pub fn as_h256(&self) -> H256 {
        self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

impl FromStr for PairKey {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_h256(s).map(Self)
    }
}

impl From<H256> for PairKey {
    fn from(hash: H256) -> Self {
        Self(hash)
    }
}

/// Result of [`pack`]: the canonical key plus the caller's argument order.
///
/// `flipped` is true when the first argument given to [`pack`] is the
/// numerically higher party, i.e. when it occupies canonical slot 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedPair {
    pub key: PairKey,
    pub flipped: bool,
}

impl PackedPair {
    /// Map a canonically ordered pair of values into caller order.
    pub fn order<T>(&self, slot0: T, slot1: T) -> (T, T) {
        if self.flipped {
            (slot1, slot0)
        } else {
            (slot0, slot1)
        }
    }

    /// Map a caller-ordered pair of values into canonical slots.
    ///
    /// The mapping is its own inverse, so this is [`PackedPair::order`]
    /// under a name that reads correctly at write sites.
    pub fn canonical<T>(&self, first: T, second: T) -> (T, T) {
        self.order(first, second)
    }
}

/// Canonicalise two parties into a symmetric key and a flip flag.
///
/// The key is Keccak-256 over the two identifiers in ascending numeric
/// order, each left-padded to 32 bytes.
///
/// # Examples
///
/// ```
/// use exposure_ledger::core::pair::pack;
/// use exposure_ledger::core::party::PartyId;
///
/// let a = PartyId::from_low_u64(1);
/// let b = PartyId::from_low_u64(2);
/// let ab = pack(&a, &b).unwrap();
/// let ba = pack(&b, &a).unwrap();
/// assert_eq!(ab.key, ba.key);
/// assert!(!ab.flipped);
/// assert!(ba.flipped);
/// ```
pub fn pack(party_a: &PartyId, party_b: &PartyId) -> Result<PackedPair, PackError> {
    if party_a == party_b {
        return Err(PackError::IdenticalAddresses(*party_a));
    }
    let (lo, hi) = if party_a < party_b {
        (party_a, party_b)
    } else {
        (party_b, party_a)
    };
    if lo.is_null() {
        return Err(PackError::InvalidAddress);
    }

    let mut encoded = [0u8; 64];
    encoded[12..32].copy_from_slice(lo.as_bytes());
    encoded[44..64].copy_from_slice(hi.as_bytes());

    Ok(PackedPair {
        key: PairKey(keccak256(&encoded)),
        flipped: party_a != lo,
    })
}
