//! Application use cases / business logic

pub mod run_loop;

pub use run_loop::{ProcessingLoop, ProcessingLoopConfig, RunLoopError};
