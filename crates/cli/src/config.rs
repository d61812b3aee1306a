//! Configuration loading and management

use anyhow::{Context, Result};
use komori_domain::policy::DEFAULT_BLACKLIST;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reply posted under every matching submission unless overridden
pub const DEFAULT_REPLY_MESSAGE: &str = "Disposable cameras are so underrated these days!\n\n\
Check out this art [project](https://www.instagram.com/thedisposablemanproject/) \
I did for Burning Man 2018 where I gifted new playa friends I met a \
disposable camera, and had them return to me when all the exposures were gone.";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub reply: ReplyConfig,

    #[serde(default)]
    pub reddit: RedditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_state_db_path")]
    pub state_db_path: PathBuf,

    /// Empty string disables the log file
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_query")]
    pub query: String,

    #[serde(default = "default_subreddit")]
    pub subreddit: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    #[serde(default = "default_message")]
    pub message: String,

    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,

    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_client_id_env")]
    pub client_id_env: String,

    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,

    #[serde(default = "default_password_env")]
    pub password_env: String,
}

// Default value functions
fn default_state_db_path() -> PathBuf {
    PathBuf::from("./reddit.db")
}

fn default_log_file() -> String {
    "./komori.log".to_string()
}

fn default_query() -> String {
    "disposable camera".to_string()
}

fn default_subreddit() -> String {
    "all".to_string()
}

fn default_max_results() -> usize {
    100
}

fn default_message() -> String {
    DEFAULT_REPLY_MESSAGE.to_string()
}

fn default_blacklist() -> Vec<String> {
    DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()
}

fn default_cooldown_secs() -> u64 {
    600
}

fn default_username() -> String {
    "komoribot".to_string()
}

fn default_user_agent() -> String {
    "web:thedisposablemanproject:v0.0.1 (by /u/komoribot)".to_string()
}

fn default_client_id_env() -> String {
    "REDDIT_CLIENT_ID".to_string()
}

fn default_client_secret_env() -> String {
    "REDDIT_CLIENT_SECRET".to_string()
}

fn default_password_env() -> String {
    "KOMORI_BOT_PASSWORD".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            state_db_path: default_state_db_path(),
            log_file: default_log_file(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            subreddit: default_subreddit(),
            max_results: default_max_results(),
        }
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            message: default_message(),
            blacklist: default_blacklist(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            user_agent: default_user_agent(),
            client_id_env: default_client_id_env(),
            client_secret_env: default_client_secret_env(),
            password_env: default_password_env(),
        }
    }
}

impl GeneralConfig {
    pub fn log_file_path(&self) -> Option<PathBuf> {
        let trimmed = self.log_file.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("KOMORI")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# komori configuration

[general]
state_db_path = "./reddit.db"
# Empty string disables the log file
log_file = "./komori.log"

[search]
query = "disposable camera"
subreddit = "all"
max_results = 100

[reply]
# message = "Text posted under every matching submission"
blacklist = ["woooosh", "pics", "suicidewatch", "depression"]
# Pause after Reddit rate-limits a comment
cooldown_secs = 600

[reddit]
username = "komoribot"
user_agent = "web:thedisposablemanproject:v0.0.1 (by /u/komoribot)"
client_id_env = "REDDIT_CLIENT_ID"
client_secret_env = "REDDIT_CLIENT_SECRET"
password_env = "KOMORI_BOT_PASSWORD"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_matches_defaults() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(parsed.search.query, defaults.search.query);
        assert_eq!(parsed.search.subreddit, "all");
        assert_eq!(parsed.reply.blacklist, defaults.reply.blacklist);
        assert_eq!(parsed.reply.cooldown_secs, 600);
        assert_eq!(parsed.reply.message, DEFAULT_REPLY_MESSAGE);
        assert_eq!(parsed.reddit.password_env, "KOMORI_BOT_PASSWORD");
    }

    #[test]
    fn test_empty_log_file_disables_file_logging() {
        let general = GeneralConfig {
            log_file: "  ".to_string(),
            ..Default::default()
        };
        assert!(general.log_file_path().is_none());
        assert!(GeneralConfig::default().log_file_path().is_some());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let parsed: AppConfig = toml::from_str("[search]\nquery = \"film camera\"\n").unwrap();

        assert_eq!(parsed.search.query, "film camera");
        assert_eq!(parsed.search.max_results, 100);
        assert_eq!(parsed.reddit.username, "komoribot");
    }
}
