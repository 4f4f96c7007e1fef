//! # Blastline Store
//!
//! Campaign persistence backends. The JSON store is the production default;
//! the memory store backs tests.

pub mod json;
pub mod memory;

pub use json::JsonCampaignStore;
pub use memory::MemoryCampaignStore;
