//! Reddit API adapters

mod auth;
mod read;
mod write;

pub use auth::{API_BASE_URL, AUTH_BASE_URL, RedditCredentials, RedditSession, SessionError};
pub use read::{DEFAULT_MAX_RESULTS, RedditFeed};
pub use write::RedditReplier;

use async_trait::async_trait;
use komori_domain::{Candidate, CandidateStream, FeedClient, FeedError, PostId, ReplyAction, ReplyError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Stub feed for testing; every search yields the same candidates
pub struct StubFeed {
    candidates: Vec<Candidate>,
}

impl StubFeed {
    /// Create an empty stub
    pub fn empty() -> Self {
        Self { candidates: vec![] }
    }

    /// Create a stub with predefined candidates
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

struct StubCursor(VecDeque<Candidate>);

#[async_trait]
impl CandidateStream for StubCursor {
    async fn next(&mut self) -> Result<Option<Candidate>, FeedError> {
        Ok(self.0.pop_front())
    }
}

#[async_trait]
impl FeedClient for StubFeed {
    async fn search(
        &self,
        _query: &str,
        _community_scope: &str,
    ) -> Result<Box<dyn CandidateStream>, FeedError> {
        Ok(Box::new(StubCursor(self.candidates.clone().into())))
    }
}

/// Stub replier for testing; records every reply it is asked to post
#[derive(Default)]
pub struct StubReplier {
    replies: Mutex<Vec<(PostId, String)>>,
}

impl StubReplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all replies that were posted
    pub fn get_replies(&self) -> Vec<(PostId, String)> {
        self.replies
            .lock()
            .map(|replies| replies.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReplyAction for StubReplier {
    async fn reply(&self, post_id: &PostId, body: &str) -> Result<(), ReplyError> {
        self.replies
            .lock()
            .map_err(|e| ReplyError::Api(e.to_string()))?
            .push((post_id.clone(), body.to_string()));
        Ok(())
    }
}
