pub mod collateral;
pub mod error;
pub mod net_pv;
mod snapshot;
pub mod time_slot;
