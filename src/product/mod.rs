pub mod deal_id;
pub mod registry;
