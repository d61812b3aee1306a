//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::model::{Candidate, PostId};

/// Error type for feed operations
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Pull-based cursor over search results.
///
/// Finite and not restartable; `Ok(None)` means the sequence is exhausted.
#[async_trait]
pub trait CandidateStream: Send {
    async fn next(&mut self) -> Result<Option<Candidate>, FeedError>;
}

/// Port for searching a platform feed
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Start a search for `query` within `community_scope`
    async fn search(
        &self,
        query: &str,
        community_scope: &str,
    ) -> Result<Box<dyn CandidateStream>, FeedError>;
}

/// Error type for reply operations
#[derive(Debug, Error)]
pub enum ReplyError {
    /// Platform-level throttling; the only recoverable reply failure
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Port for posting a reply under a post
#[async_trait]
pub trait ReplyAction: Send + Sync {
    async fn reply(&self, post_id: &PostId, body: &str) -> Result<(), ReplyError>;
}

/// Error type for dedup store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Port for the persistent ledger of handled posts
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Create the backing structure if absent. Safe to call on every startup.
    async fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Every post ID ever recorded
    async fn load_all(&self) -> Result<HashSet<PostId>, StorageError>;

    /// Durably add a post ID. Either the whole record lands or nothing does.
    async fn record(&self, id: &PostId) -> Result<(), StorageError>;

    /// Release the underlying connection
    async fn close(&self);
}

/// Port for suspending the loop (enables deterministic testing)
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
