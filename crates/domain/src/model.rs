//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-assigned post identifier (e.g., a Reddit base36 id without the `t3_` prefix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A post returned by a feed search, not yet classified
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Platform-specific post ID
    pub id: PostId,
    /// Community (subreddit) display name
    pub community: String,
    /// Archived posts no longer accept replies
    pub archived: bool,
    /// Post title
    pub title: String,
}

/// Why a candidate was not replied to, or what happened when it was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Community is on the blacklist
    Blacklisted,
    /// Post is archived
    Archived,
    /// Post was already handled in this or a previous run
    Duplicate,
    /// Reply posted and recorded
    Replied,
    /// Reply was throttled; loop cooled down and moved on
    RateLimited,
}

/// Tally of a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Successful replies (the run tally)
    pub replied: usize,
    pub blacklisted: usize,
    pub archived: usize,
    pub duplicates: usize,
    /// Reply attempts that hit the platform rate limit
    pub rate_limited: usize,
}

impl RunSummary {
    pub(crate) fn count(&mut self, outcome: CandidateOutcome) {
        match outcome {
            CandidateOutcome::Blacklisted => self.blacklisted += 1,
            CandidateOutcome::Archived => self.archived += 1,
            CandidateOutcome::Duplicate => self.duplicates += 1,
            CandidateOutcome::Replied => self.replied += 1,
            CandidateOutcome::RateLimited => self.rate_limited += 1,
        }
    }

    /// Total candidates pulled from the feed
    pub fn seen(&self) -> usize {
        self.replied + self.blacklisted + self.archived + self.duplicates + self.rate_limited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_id_display_is_raw_id() {
        let id = PostId::from("abc123");
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
    }

    #[test]
    fn test_summary_counts_every_outcome() {
        let mut summary = RunSummary::default();
        summary.count(CandidateOutcome::Replied);
        summary.count(CandidateOutcome::Replied);
        summary.count(CandidateOutcome::Duplicate);
        summary.count(CandidateOutcome::RateLimited);
        summary.count(CandidateOutcome::Blacklisted);
        summary.count(CandidateOutcome::Archived);

        assert_eq!(summary.replied, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.rate_limited, 1);
        assert_eq!(summary.seen(), 6);
    }
}
