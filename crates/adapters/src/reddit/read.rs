//! Reddit search adapter

use async_trait::async_trait;
use komori_domain::{Candidate, CandidateStream, FeedClient, FeedError, PostId};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;

use super::RedditSession;

/// Reddit's maximum listing page size
pub const MAX_PAGE_SIZE: usize = 100;

/// Default cap on results per search, matching the classic listing default
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Subreddit search feed
pub struct RedditFeed {
    session: Arc<RedditSession>,
    max_results: usize,
}

impl RedditFeed {
    pub fn new(session: Arc<RedditSession>) -> Self {
        Self::with_max_results(session, DEFAULT_MAX_RESULTS)
    }

    pub fn with_max_results(session: Arc<RedditSession>, max_results: usize) -> Self {
        Self {
            session,
            max_results,
        }
    }
}

#[async_trait]
impl FeedClient for RedditFeed {
    async fn search(
        &self,
        query: &str,
        community_scope: &str,
    ) -> Result<Box<dyn CandidateStream>, FeedError> {
        tracing::info!(
            query = %query,
            subreddit = %community_scope,
            max_results = self.max_results,
            "Starting Reddit search"
        );

        Ok(Box::new(SearchCursor {
            session: Arc::clone(&self.session),
            query: query.to_string(),
            subreddit: community_scope.to_string(),
            max_results: self.max_results,
            buffer: VecDeque::new(),
            after: None,
            yielded: 0,
            exhausted: false,
        }))
    }
}

/// Lazily paginated search results; a page is fetched only when the buffer runs dry
struct SearchCursor {
    session: Arc<RedditSession>,
    query: String,
    subreddit: String,
    max_results: usize,
    buffer: VecDeque<Candidate>,
    after: Option<String>,
    yielded: usize,
    exhausted: bool,
}

impl SearchCursor {
    async fn fetch_page(&mut self) -> Result<(), FeedError> {
        let limit = MAX_PAGE_SIZE.min(self.max_results - self.yielded).to_string();
        let path = format!("/r/{}/search", self.subreddit);

        let mut params = vec![
            ("q", self.query.as_str()),
            ("restrict_sr", "on"),
            ("sort", "relevance"),
            ("t", "all"),
            ("raw_json", "1"),
            ("limit", limit.as_str()),
        ];
        if let Some(after) = self.after.as_deref() {
            params.push(("after", after));
        }

        let response = self
            .session
            .get(&path)
            .await?
            .query(&params)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if response.status() == 401 || response.status() == 403 {
            return Err(FeedError::Auth(format!(
                "Search rejected with status {}",
                response.status()
            )));
        }

        if response.status() == 429 {
            return Err(FeedError::RateLimited("Search throttled (HTTP 429)".to_string()));
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api(format!("Search failed: {}", body)));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| FeedError::Api(e.to_string()))?;

        let page_len = listing.data.children.len();
        self.buffer
            .extend(listing.data.children.into_iter().map(|child| Candidate {
                id: PostId::from(child.data.id),
                community: child.data.subreddit,
                archived: child.data.archived,
                title: child.data.title,
            }));

        self.after = listing.data.after;
        if self.after.is_none() || page_len == 0 {
            self.exhausted = true;
        }

        tracing::debug!(
            subreddit = %self.subreddit,
            count = page_len,
            more = !self.exhausted,
            "Fetched search page"
        );

        Ok(())
    }
}

#[async_trait]
impl CandidateStream for SearchCursor {
    async fn next(&mut self) -> Result<Option<Candidate>, FeedError> {
        if self.yielded >= self.max_results {
            return Ok(None);
        }

        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page().await?;
        }

        match self.buffer.pop_front() {
            Some(candidate) => {
                self.yielded += 1;
                Ok(Some(candidate))
            }
            None => Ok(None),
        }
    }
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
    after: Option<String>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: SubmissionData,
}

#[derive(Deserialize)]
struct SubmissionData {
    id: String,
    title: String,
    subreddit: String,
    #[serde(default)]
    archived: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reddit::auth::tests::{mount_token, session_for};
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn submission(id: &str, subreddit: &str, archived: bool) -> serde_json::Value {
        serde_json::json!({
            "kind": "t3",
            "data": {
                "id": id,
                "title": format!("Found a disposable camera {}", id),
                "subreddit": subreddit,
                "archived": archived
            }
        })
    }

    fn listing(children: Vec<serde_json::Value>, after: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "kind": "Listing",
            "data": { "children": children, "after": after }
        })
    }

    async fn drain(stream: &mut Box<dyn CandidateStream>) -> Vec<Candidate> {
        let mut out = vec![];
        while let Some(c) = stream.next().await.unwrap() {
            out.push(c);
        }
        out
    }

    #[tokio::test]
    async fn test_search_maps_submissions() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/r/all/search"))
            .and(header("Authorization", "Bearer test-token"))
            .and(query_param("q", "disposable camera"))
            .and(query_param("restrict_sr", "on"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(
                vec![
                    submission("a1", "analog", false),
                    submission("b2", "pics", true),
                ],
                None,
            )))
            .mount(&server)
            .await;

        let feed = RedditFeed::new(Arc::new(session_for(&server)));
        let mut stream = feed.search("disposable camera", "all").await.unwrap();
        let candidates = drain(&mut stream).await;

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id.as_str(), "a1");
        assert_eq!(candidates[0].community, "analog");
        assert!(!candidates[0].archived);
        assert_eq!(candidates[1].community, "pics");
        assert!(candidates[1].archived);
    }

    #[tokio::test]
    async fn test_search_follows_after_cursor() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/r/analog/search"))
            .and(query_param_is_missing("after"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(
                vec![submission("a1", "analog", false)],
                Some("t3_a1"),
            )))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/r/analog/search"))
            .and(query_param("after", "t3_a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(
                vec![submission("b2", "analog", false)],
                None,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let feed = RedditFeed::new(Arc::new(session_for(&server)));
        let mut stream = feed.search("film", "analog").await.unwrap();
        let candidates = drain(&mut stream).await;

        let ids: Vec<_> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b2"]);
    }

    #[tokio::test]
    async fn test_search_is_lazy_and_capped() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/r/all/search"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(
                vec![
                    submission("a1", "analog", false),
                    submission("b2", "analog", false),
                ],
                Some("t3_b2"),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let feed = RedditFeed::with_max_results(Arc::new(session_for(&server)), 2);
        let mut stream = feed.search("film", "all").await.unwrap();
        let candidates = drain(&mut stream).await;

        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_search_rate_limited() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/r/all/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let feed = RedditFeed::new(Arc::new(session_for(&server)));
        let mut stream = feed.search("film", "all").await.unwrap();

        assert!(matches!(stream.next().await, Err(FeedError::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_search_auth_error() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/r/all/search"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let feed = RedditFeed::new(Arc::new(session_for(&server)));
        let mut stream = feed.search("film", "all").await.unwrap();

        assert!(matches!(stream.next().await, Err(FeedError::Auth(_))));
    }
}
