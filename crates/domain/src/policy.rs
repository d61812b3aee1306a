//! Community blacklist policy

use std::collections::HashSet;

/// Communities the bot never replies in unless configured otherwise
pub const DEFAULT_BLACKLIST: &[&str] = &["woooosh", "pics", "suicidewatch", "depression"];

/// Fixed set of community names excluded from replies.
///
/// Matching is exact and case-sensitive: `"Pics"` does not match `"pics"`.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    communities: HashSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(communities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            communities: communities.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in list
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_BLACKLIST.iter().copied())
    }

    pub fn is_blacklisted(&self, community: &str) -> bool {
        self.communities.contains(community)
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }
}
