//! komori adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `state`: SQLite and in-memory dedup stores
//! - `reddit`: Reddit session, search feed and comment adapters

mod state_memory;
mod state_sqlite;

pub mod reddit;

/// Re-exports for dedup store adapters
pub mod state {
    pub use crate::state_memory::InMemoryDedupStore;
    pub use crate::state_sqlite::SqliteDedupStore;
}
