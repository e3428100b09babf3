use crate::core::party::PartyId;
use crate::product::deal_id::{DealId, ProductPrefix};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors arising from product registry writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid access: {0} is not the registry owner")]
    InvalidAccess(PartyId),
    #[error("{0} is not a contract address")]
    NotContract(PartyId),
    #[error("invalid input: {prefixes} prefixes, {logics} logic and {controllers} controller addresses")]
    LengthMismatch {
        prefixes: usize,
        logics: usize,
        controllers: usize,
    },
    #[error("new owner must not be the null address")]
    NullOwner,
}

/// Answers whether an address carries deployed contract code.
pub trait ContractDirectory {
    fn is_contract(&self, address: &PartyId) -> bool;
}

/// A fixed set of addresses known to be contracts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnownContracts {
    addresses: HashSet<PartyId>,
}

impl KnownContracts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `address` as carrying contract code.
    pub fn insert(&mut self, address: PartyId) {
        self.addresses.insert(address);
    }

    /// Number of known contract addresses.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether no contract addresses are known.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl FromIterator<PartyId> for KnownContracts {
    fn from_iter<T: IntoIterator<Item = PartyId>>(iter: T) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}

impl ContractDirectory for KnownContracts {
    fn is_contract(&self, address: &PartyId) -> bool {
        !address.is_null() && self.addresses.contains(address)
    }
}

/// Contracts handling one product class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    /// Contract holding the settlement logic for deals of this product.
    pub logic: PartyId,
    /// Market contract controlling the product.
    pub controller: PartyId,
}

/// Routes a product prefix, or a deal identifier carrying one, to the
/// contracts that handle it.
///
/// Writes are restricted to the owner fixed at construction. Lookups on
/// an unregistered prefix return [`PartyId::ZERO`].
///
/// # Examples
///
/// ```
/// use exposure_ledger::core::party::PartyId;
/// use exposure_ledger::product::deal_id::{DealId, ProductPrefix};
/// use exposure_ledger::product::registry::{KnownContracts, ProductRegistry};
/// use primitive_types::U256;
///
/// let owner = PartyId::from_low_u64(1);
/// let logic = PartyId::from_low_u64(100);
/// let market = PartyId::from_low_u64(101);
/// let contracts: KnownContracts = [logic, market].into_iter().collect();
///
/// let mut registry = ProductRegistry::new(owner, contracts);
/// let loan = ProductPrefix::from_label("0xLoan");
/// registry.register_product(&owner, loan, logic, market).unwrap();
///
/// let deal = DealId::generate(loan, U256::from(7)).unwrap();
/// assert_eq!(registry.product_contract_by_deal_id(&deal), logic);
/// ```
#[derive(Debug, Clone)]
pub struct ProductRegistry<C: ContractDirectory> {
    owner: PartyId,
    contracts: C,
    products: HashMap<ProductPrefix, ProductEntry>,
}

impl<C: ContractDirectory> ProductRegistry<C> {
    pub fn new(owner: PartyId, contracts: C) -> Self {
        Self {
            owner,
            contracts,
            products: HashMap::new(),
        }
    }

    /// Party allowed to write the product table.
    pub fn owner(&self) -> PartyId {
        self.owner
    }

    /// Directory used to check that registered addresses are contracts.
    pub fn contracts(&self) -> &C {
        &self.contracts
    }

    /// Register or overwrite the contracts for one product prefix.
    pub fn register_product(
        &mut self,
        caller: &PartyId,
        prefix: ProductPrefix,
        logic: PartyId,
        controller: PartyId,
    ) -> Result<(), RegistryError> {
        self.authorize(caller)?;
        self.check_contract(&logic)?;
        self.check_contract(&controller)?;
        self.insert(prefix, ProductEntry { logic, controller });
        Ok(())
    }

    /// Register several products at once.
    ///
    /// The three slices are matched by index. Every entry is validated
    /// before any is written, so a rejected batch leaves the registry
    /// unchanged.
    pub fn register_products(
        &mut self,
        caller: &PartyId,
        prefixes: &[ProductPrefix],
        logics: &[PartyId],
        controllers: &[PartyId],
    ) -> Result<(), RegistryError> {
        self.authorize(caller)?;
        if prefixes.len() != logics.len() || prefixes.len() != controllers.len() {
            return Err(RegistryError::LengthMismatch {
                prefixes: prefixes.len(),
                logics: logics.len(),
                controllers: controllers.len(),
            });
        }
        for (logic, controller) in logics.iter().zip(controllers) {
            self.check_contract(logic)?;
            self.check_contract(controller)?;
        }
        for ((prefix, logic), controller) in prefixes.iter().zip(logics).zip(controllers) {
            self.insert(
                *prefix,
                ProductEntry {
                    logic: *logic,
                    controller: *controller,
                },
            );
        }
        Ok(())
    }

    pub fn product_contract(&self, prefix: &ProductPrefix) -> PartyId {
        self.products
            .get(prefix)
            .map(|entry| entry.logic)
            .unwrap_or(PartyId::ZERO)
    }

    pub fn controller_contract(&self, prefix: &ProductPrefix) -> PartyId {
        self.products
            .get(prefix)
            .map(|entry| entry.controller)
            .unwrap_or(PartyId::ZERO)
    }

    pub fn product_contract_by_deal_id(&self, deal: &DealId) -> PartyId {
        self.product_contract(&deal.prefix())
    }

    pub fn controller_contract_by_deal_id(&self, deal: &DealId) -> PartyId {
        self.controller_contract(&deal.prefix())
    }

    /// Whether any contracts are registered for `prefix`.
    pub fn is_supported_product(&self, prefix: &ProductPrefix) -> bool {
        self.products.contains_key(prefix)
    }

    /// Both contracts registered for `prefix`, if any.
    pub fn entry(&self, prefix: &ProductPrefix) -> Option<&ProductEntry> {
        self.products.get(prefix)
    }

    /// Hand write access to `new_owner`. Only the current owner may call this.
    pub fn transfer_ownership(
        &mut self,
        caller: &PartyId,
        new_owner: PartyId,
    ) -> Result<(), RegistryError> {
        self.authorize(caller)?;
        if new_owner.is_null() {
            return Err(RegistryError::NullOwner);
        }
        info!("product registry ownership: {} -> {}", self.owner, new_owner);
        self.owner = new_owner;
        Ok(())
    }

    fn authorize(&self, caller: &PartyId) -> Result<(), RegistryError> {
        if *caller != self.owner {
            return Err(RegistryError::InvalidAccess(*caller));
        }
        Ok(())
    }

    fn check_contract(&self, address: &PartyId) -> Result<(), RegistryError> {
        if address.is_null() || !self.contracts.is_contract(address) {
            return Err(RegistryError::NotContract(*address));
        }
        Ok(())
    }

    fn insert(&mut self, prefix: ProductPrefix, entry: ProductEntry) {
        info!(
            "product registered: prefix={} logic={} controller={}",
            prefix, entry.logic, entry.controller
        );
        self.products.insert(prefix, entry);
    }
}
