use crate::core::hash::keccak256;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width of the counter part of a deal identifier.
pub const COUNTER_BITS: usize = 224;

/// Errors arising from deal identifier and prefix handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealIdError {
    #[error("NUMBER OVERFLOW: counter {0} does not fit in 224 bits")]
    NumberOverflow(U256),
    #[error("invalid product prefix: {0}")]
    InvalidPrefix(String),
}

/// Four-byte tag naming a class of financial product.
///
/// # Examples
///
/// ```
/// use exposure_ledger::product::deal_id::ProductPrefix;
///
/// let loan = ProductPrefix::from_label("0xLoan");
/// let parsed: ProductPrefix = loan.to_string().parse().unwrap();
/// assert_eq!(loan, parsed);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductPrefix(pub [u8; 4]);

impl ProductPrefix {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// First four bytes of the Keccak-256 hash of `label`.
    pub fn from_label(label: &str) -> Self {
        let hash = keccak256(label.as_bytes());
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&hash.as_bytes()[..4]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for ProductPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ProductPrefix {
    type Err = DealIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DealIdError::InvalidPrefix(s.to_string());
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|_| invalid())?;
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

/// Identifier of a single deal: product prefix in the top 32 bits, a
/// per-product counter in the low 224 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealId(U256);

impl DealId {
    /// Pack `prefix` and `counter` into one identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use exposure_ledger::product::deal_id::{DealId, ProductPrefix};
    /// use primitive_types::U256;
    ///
    /// let prefix = ProductPrefix::new([0x21, 0xaa, 0xa4, 0x7b]);
    /// let id = DealId::generate(prefix, U256::from(42)).unwrap();
    /// assert_eq!(id.prefix(), prefix);
    /// assert_eq!(id.counter(), U256::from(42));
    /// ```
    pub fn generate(prefix: ProductPrefix, counter: U256) -> Result<Self, DealIdError> {
        if counter >= counter_bound() {
            return Err(DealIdError::NumberOverflow(counter));
        }
        let high = U256::from(u32::from_be_bytes(prefix.0)) << COUNTER_BITS;
        Ok(Self(high | counter))
    }

    /// Product prefix held in the top 32 bits.
    pub fn prefix(&self) -> ProductPrefix {
        let top = (self.0 >> COUNTER_BITS).low_u32();
        ProductPrefix(top.to_be_bytes())
    }

    /// Per-product counter held in the low 224 bits.
    pub fn counter(&self) -> U256 {
        self.0 & (counter_bound() - U256::one())
    }

    /// The packed 256-bit identifier.
    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<U256> for DealId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        write!(f, "0x{}", hex::encode(bytes))
    }
}

fn counter_bound() -> U256 {
    U256::one() << COUNTER_BITS
}
