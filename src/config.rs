//! Registry bootstrap configuration.
//!
//! A deployment describes its registry owner, the addresses known to carry
//! contract code, and the initial product table in one JSON document:
//!
//! ```json
//! {
//!   "owner": "0x00000000000000000000000000000000000000aa",
//!   "contracts": ["0x0000000000000000000000000000000000000100"],
//!   "products": [
//!     { "prefix": "0xLoan", "logic": "0x...0100", "controller": "0x...0100" }
//!   ]
//! }
//! ```
//!
//! A prefix is either eight hex digits (`0x21aaa47b`) or a label that is
//! hashed with [`ProductPrefix::from_label`].

use crate::core::party::PartyId;
use crate::product::deal_id::{DealIdError, ProductPrefix};
use crate::product::registry::{KnownContracts, ProductRegistry, RegistryError};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from loading a registry configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid registry config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Prefix(#[from] DealIdError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfig {
    pub prefix: String,
    pub logic: PartyId,
    pub controller: PartyId,
}

impl ProductConfig {
    pub fn resolve_prefix(&self) -> Result<ProductPrefix, DealIdError> {
        let digits = self.prefix.strip_prefix("0x").unwrap_or(&self.prefix);
        if digits.len() == 8 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            self.prefix.parse()
        } else {
            Ok(ProductPrefix::from_label(&self.prefix))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub owner: PartyId,
    #[serde(default)]
    pub contracts: Vec<PartyId>,
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ProductRegistry<KnownContracts> {
    /// Build a registry owned by `config.owner` and seed its product table.
    ///
    /// Products go through the owner-checked batch path, so an invalid
    /// entry rejects the whole configuration.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        let contracts: KnownContracts = config.contracts.iter().copied().collect();
        let mut registry = ProductRegistry::new(config.owner, contracts);

        let prefixes = config
            .products
            .iter()
            .map(ProductConfig::resolve_prefix)
            .collect::<Result<Vec<_>, _>>()?;
        let logics: Vec<PartyId> = config.products.iter().map(|p| p.logic).collect();
        let controllers: Vec<PartyId> = config.products.iter().map(|p| p.controller).collect();
        registry.register_products(&config.owner, &prefixes, &logics, &controllers)?;

        info!(
            "product registry loaded: owner={} contracts={} products={}",
            config.owner,
            registry.contracts().len(),
            prefixes.len()
        );
        Ok(registry)
    }
}
