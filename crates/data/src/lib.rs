//! Protocol persistence and catalog loading. The core crate stays free of
//! IO; everything touching disk lives here.

pub mod load;
pub mod schema;
pub mod store;

pub use load::build_catalog;
pub use schema::{CardDoc, EffectDoc, ProtocolDoc, StoreDoc, CURRENT_STORE_VERSION};
pub use store::ProtocolStore;
