//! komori domain crate
//!
//! This crate contains the core reply-bot logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: The submission processing loop
//! - `policy`: Community blacklist

pub mod model;
pub mod policy;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use policy::Blacklist;
pub use ports::*;
