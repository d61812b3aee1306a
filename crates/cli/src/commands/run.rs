//! Run command - search once, reply to new submissions, exit

use anyhow::{Context, Result, bail};
use komori_adapters::{
    reddit::{RedditCredentials, RedditFeed, RedditReplier, RedditSession},
    state::SqliteDedupStore,
};
use komori_domain::{
    Blacklist, TokioSleeper,
    usecases::{ProcessingLoop, ProcessingLoopConfig, run_loop::DEFAULT_COMMUNITY_SCOPE},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::args::RunArgs;
use crate::commands::load_secret;
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = AppConfig::load(config_path.as_deref())?;

    if let Some(query) = args.query {
        config.search.query = query;
    }
    if let Some(subreddit) = args.subreddit {
        config.search.subreddit = subreddit;
    }

    if config.search.query.trim().is_empty() {
        bail!("No search query configured");
    }

    let credentials = load_credentials(&config)?;
    let loop_config = loop_config_from_config(&config);

    tracing::info!(
        query = %loop_config.query,
        subreddit = %loop_config.community_scope,
        username = %credentials.username,
        state_db = %config.general.state_db_path.display(),
        blacklisted = loop_config.blacklist.len(),
        "Starting komori run"
    );

    // Build dependencies
    let store = Arc::new(
        SqliteDedupStore::new(&config.general.state_db_path)
            .await
            .context("Failed to initialize SQLite dedup store")?,
    );

    let session = Arc::new(
        RedditSession::new(credentials).context("Failed to initialize Reddit session")?,
    );
    session
        .authenticate()
        .await
        .context("Failed to authenticate with Reddit")?;

    let feed = Arc::new(RedditFeed::with_max_results(
        Arc::clone(&session),
        config.search.max_results,
    ));
    let replier = Arc::new(RedditReplier::new(session));

    let processing_loop =
        ProcessingLoop::new(feed, replier, store, Arc::new(TokioSleeper), loop_config);

    let summary = processing_loop.run().await.context("Run aborted")?;

    tracing::info!(
        replied = summary.replied,
        rate_limited = summary.rate_limited,
        "komori run completed"
    );
    Ok(())
}

fn load_credentials(config: &AppConfig) -> Result<RedditCredentials> {
    let reddit = &config.reddit;

    if reddit.username.trim().is_empty() {
        bail!("No Reddit username configured");
    }

    Ok(RedditCredentials {
        client_id: load_secret(&reddit.client_id_env, "Reddit client id")?,
        client_secret: load_secret(&reddit.client_secret_env, "Reddit client secret")?,
        username: reddit.username.clone(),
        password: load_secret(&reddit.password_env, "Reddit password")?,
        user_agent: reddit.user_agent.clone(),
    })
}

fn loop_config_from_config(config: &AppConfig) -> ProcessingLoopConfig {
    let subreddit = config.search.subreddit.trim();
    let community_scope = if subreddit.is_empty() {
        DEFAULT_COMMUNITY_SCOPE.to_string()
    } else {
        subreddit.to_string()
    };

    ProcessingLoopConfig {
        query: config.search.query.clone(),
        community_scope,
        reply_body: config.reply.message.clone(),
        blacklist: Blacklist::new(config.reply.blacklist.iter().cloned()),
        cooldown: Duration::from_secs(config.reply.cooldown_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use komori_domain::usecases::run_loop::DEFAULT_COOLDOWN;

    #[test]
    fn test_empty_subreddit_searches_all() {
        let mut config = AppConfig::default();
        config.search.subreddit = String::new();

        let loop_config = loop_config_from_config(&config);

        assert_eq!(loop_config.community_scope, "all");
    }

    #[test]
    fn test_defaults_carry_into_loop() {
        let loop_config = loop_config_from_config(&AppConfig::default());

        assert_eq!(loop_config.query, "disposable camera");
        assert_eq!(loop_config.cooldown, DEFAULT_COOLDOWN);
        assert!(loop_config.blacklist.is_blacklisted("pics"));
        assert!(loop_config.reply_body.starts_with("Disposable cameras"));
    }

    #[test]
    fn test_missing_credentials_is_error() {
        let mut config = AppConfig::default();
        config.reddit.client_id_env = "KOMORI_TEST_UNSET_CLIENT_ID".to_string();

        let err = load_credentials(&config).unwrap_err();

        assert!(err.to_string().contains("KOMORI_TEST_UNSET_CLIENT_ID"));
    }
}
