//! # exposure-ledger
//!
//! Accounting core for bilateral OTC derivatives settlement.
//!
//! Tracks collateral, present value and scheduled payments between pairs
//! of counterparties, and mints the deal identifiers that tie each record
//! back to a product.
//!
//! ## Architecture
//!
//! - **core** — Party identifiers, canonical pair keys, amount arithmetic
//! - **ledger** — Collateral, net present value and time-slot ledgers
//! - **product** — Deal identifiers and the product address registry
//! - **config** — Registry bootstrap from JSON

pub mod config;
pub mod core;
pub mod ledger;
pub mod product;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::amount::Amount;
    pub use crate::core::pair::{pack, PackError, PackedPair, PairKey};
    pub use crate::core::party::PartyId;
    pub use crate::ledger::collateral::{CollateralLedger, CollateralView};
    pub use crate::ledger::error::LedgerError;
    pub use crate::ledger::net_pv::{NetPvLedger, NetPvView};
    pub use crate::ledger::time_slot::{SlotPosition, TimeSlotLedger, TimeSlotView};
    pub use crate::product::deal_id::{DealId, ProductPrefix};
    pub use crate::product::registry::{ContractDirectory, KnownContracts, ProductRegistry};
}
