//! Run loop use case - searches the feed and replies to each new post once

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    model::{Candidate, CandidateOutcome, PostId, RunSummary},
    policy::Blacklist,
    ports::{DedupStore, FeedClient, FeedError, ReplyAction, ReplyError, Sleeper, StorageError},
};

/// Suspension applied after the platform throttles a reply
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(600);

/// Community scope that searches the whole site
pub const DEFAULT_COMMUNITY_SCOPE: &str = "all";

/// Configuration for the processing loop
#[derive(Debug, Clone)]
pub struct ProcessingLoopConfig {
    /// Search query
    pub query: String,
    /// Community to search within
    pub community_scope: String,
    /// Fixed reply text
    pub reply_body: String,
    /// Communities never replied in
    pub blacklist: Blacklist,
    /// Loop suspension after a rate-limited reply
    pub cooldown: Duration,
}

impl Default for ProcessingLoopConfig {
    fn default() -> Self {
        Self {
            query: String::new(),
            community_scope: DEFAULT_COMMUNITY_SCOPE.to_string(),
            reply_body: String::new(),
            blacklist: Blacklist::with_defaults(),
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Submission processing loop
pub struct ProcessingLoop<F, R, D, Sl>
where
    F: FeedClient + ?Sized,
    R: ReplyAction + ?Sized,
    D: DedupStore + ?Sized,
    Sl: Sleeper + ?Sized,
{
    feed: Arc<F>,
    replier: Arc<R>,
    store: Arc<D>,
    sleeper: Arc<Sl>,
    config: ProcessingLoopConfig,
}

impl<F, R, D, Sl> ProcessingLoop<F, R, D, Sl>
where
    F: FeedClient + ?Sized,
    R: ReplyAction + ?Sized,
    D: DedupStore + ?Sized,
    Sl: Sleeper + ?Sized,
{
    pub fn new(
        feed: Arc<F>,
        replier: Arc<R>,
        store: Arc<D>,
        sleeper: Arc<Sl>,
        config: ProcessingLoopConfig,
    ) -> Self {
        Self {
            feed,
            replier,
            store,
            sleeper,
            config,
        }
    }

    /// Run one pass over the search results.
    ///
    /// Returns the tally once the feed is exhausted. Any error other than a
    /// rate-limited reply aborts the run immediately.
    pub async fn run(&self) -> Result<RunSummary, RunLoopError> {
        // Snapshot taken once; not re-queried per candidate
        let mut processed = self.store.load_all().await?;

        tracing::info!(
            query = %self.config.query,
            scope = %self.config.community_scope,
            already_processed = processed.len(),
            "Searching for submissions"
        );

        let mut candidates = self
            .feed
            .search(&self.config.query, &self.config.community_scope)
            .await?;

        let mut summary = RunSummary::default();

        while let Some(candidate) = candidates.next().await? {
            let outcome = self.process_candidate(&candidate, &mut processed).await?;
            summary.count(outcome);
        }

        tracing::info!(
            replied = summary.replied,
            seen = summary.seen(),
            duplicates = summary.duplicates,
            archived = summary.archived,
            blacklisted = summary.blacklisted,
            rate_limited = summary.rate_limited,
            "Commented on {} total threads",
            summary.replied
        );

        self.store.close().await;

        Ok(summary)
    }

    fn skip_reason(
        &self,
        candidate: &Candidate,
        processed: &HashSet<PostId>,
    ) -> Option<CandidateOutcome> {
        if self.config.blacklist.is_blacklisted(&candidate.community) {
            return Some(CandidateOutcome::Blacklisted);
        }
        if candidate.archived {
            return Some(CandidateOutcome::Archived);
        }
        if processed.contains(&candidate.id) {
            return Some(CandidateOutcome::Duplicate);
        }
        None
    }

    async fn process_candidate(
        &self,
        candidate: &Candidate,
        processed: &mut HashSet<PostId>,
    ) -> Result<CandidateOutcome, RunLoopError> {
        if let Some(outcome) = self.skip_reason(candidate, processed) {
            if outcome != CandidateOutcome::Blacklisted {
                tracing::debug!(post_id = %candidate.id, outcome = ?outcome, "Skipped");
            }
            return Ok(outcome);
        }

        match self
            .replier
            .reply(&candidate.id, &self.config.reply_body)
            .await
        {
            Ok(()) => {}
            Err(ReplyError::RateLimited(message)) => {
                tracing::warn!(
                    post_id = %candidate.id,
                    cooldown_secs = self.config.cooldown.as_secs(),
                    reason = %message,
                    "Rate limit exceeded, sleeping before the next submission"
                );
                self.sleeper.sleep(self.config.cooldown).await;
                return Ok(CandidateOutcome::RateLimited);
            }
            Err(source) => {
                return Err(RunLoopError::Reply {
                    post_id: candidate.id.clone(),
                    source,
                });
            }
        }

        self.store.record(&candidate.id).await?;
        processed.insert(candidate.id.clone());

        tracing::info!(
            title = %candidate.title,
            community = %candidate.community,
            post_id = %candidate.id,
            "Left comment on {} in \"/r/{}\" with id {}",
            candidate.title,
            candidate.community,
            candidate.id
        );

        Ok(CandidateOutcome::Replied)
    }
}

/// Errors from the run loop
#[derive(Debug, thiserror::Error)]
pub enum RunLoopError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("Reply to {post_id} failed: {source}")]
    Reply {
        post_id: PostId,
        #[source]
        source: ReplyError,
    },
}
