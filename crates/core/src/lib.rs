//! Core rules engine. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod effect;
pub mod engine;
pub mod events;
pub mod filter;
pub mod passive;
pub mod pending;
pub mod rng;
pub mod state;

pub use cards::*;
pub use config::*;
pub use effect::*;
pub use engine::*;
pub use events::*;
pub use filter::*;
pub use passive::*;
pub use pending::*;
pub use rng::*;
pub use state::*;
