//! Reddit comment adapter

use async_trait::async_trait;
use komori_domain::{PostId, ReplyAction, ReplyError};
use serde::Deserialize;
use std::sync::Arc;

use super::RedditSession;

/// Posts top-level comments on submissions
pub struct RedditReplier {
    session: Arc<RedditSession>,
}

impl RedditReplier {
    pub fn new(session: Arc<RedditSession>) -> Self {
        Self { session }
    }
}

#[derive(Deserialize)]
struct CommentResponse {
    json: CommentJson,
}

#[derive(Deserialize)]
struct CommentJson {
    /// Each entry is `[code, message, field]`
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
}

fn error_part(entry: &[serde_json::Value], index: usize) -> &str {
    entry.get(index).and_then(|v| v.as_str()).unwrap_or_default()
}

#[async_trait]
impl ReplyAction for RedditReplier {
    async fn reply(&self, post_id: &PostId, body: &str) -> Result<(), ReplyError> {
        let thing_id = format!("t3_{}", post_id);

        let response = self
            .session
            .post("/api/comment")
            .await?
            .form(&[
                ("api_type", "json"),
                ("thing_id", thing_id.as_str()),
                ("text", body),
            ])
            .send()
            .await
            .map_err(|e| ReplyError::Network(e.to_string()))?;

        if response.status() == 401 || response.status() == 403 {
            return Err(ReplyError::Auth(format!(
                "Comment rejected with status {}",
                response.status()
            )));
        }

        if response.status() == 429 {
            return Err(ReplyError::RateLimited(
                "Comment throttled (HTTP 429)".to_string(),
            ));
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReplyError::Api(format!("Failed to comment: {}", body)));
        }

        let comment: CommentResponse = response
            .json()
            .await
            .map_err(|e| ReplyError::Api(e.to_string()))?;

        let errors = &comment.json.errors;

        if let Some(entry) = errors.iter().find(|e| error_part(e, 0) == "RATELIMIT") {
            return Err(ReplyError::RateLimited(error_part(entry, 1).to_string()));
        }

        if let Some(entry) = errors.first() {
            return Err(ReplyError::Api(format!(
                "{}: {}",
                error_part(entry, 0),
                error_part(entry, 1)
            )));
        }

        tracing::debug!(thing_id = %thing_id, "Comment posted");

        Ok(())
    }
}
