pub mod amount;
pub mod hash;
pub mod pair;
pub mod party;
