//! Doctor command - validate configuration and show status

use anyhow::Result;
use komori_adapters::state::SqliteDedupStore;
use komori_domain::DedupStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    credentials: CheckResult,
    state: CheckResult,
    search: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        credentials: CheckResult::error("Not checked"),
        state: CheckResult::error("Not checked"),
        search: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    match AppConfig::load(config_path.as_deref()) {
        Ok(config) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            report.credentials = check_credentials(&config);
            report.state = check_state(&config.general.state_db_path).await;
            report.search = check_search(&config);
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
        }
    }

    let checks = [
        &report.config,
        &report.credentials,
        &report.state,
        &report.search,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

/// Reports which credential env vars are set, never their values
fn check_credentials(config: &AppConfig) -> CheckResult {
    let reddit = &config.reddit;
    let vars = [
        &reddit.client_id_env,
        &reddit.client_secret_env,
        &reddit.password_env,
    ];

    let missing: Vec<&str> = vars
        .iter()
        .filter(|var| {
            var.trim().is_empty()
                || std::env::var(var.as_str())
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
        })
        .map(|var| var.as_str())
        .collect();

    if missing.is_empty() {
        CheckResult::ok(format!("Account: {}, credentials set", reddit.username))
    } else {
        CheckResult::error(format!(
            "Account: {}, missing env vars: {}",
            reddit.username,
            missing.join(", ")
        ))
    }
}

async fn check_state(db_path: &Path) -> CheckResult {
    let store = match SqliteDedupStore::new(db_path).await {
        Ok(store) => store,
        Err(e) => {
            return CheckResult::error(format!("Cannot open {}: {}", db_path.display(), e));
        }
    };

    let result = match store.load_all().await {
        Ok(ids) => CheckResult::ok(format!("{} submissions already handled", ids.len()))
            .with_details(serde_json::json!({
                "path": db_path.display().to_string(),
                "count": ids.len(),
            })),
        Err(e) => CheckResult::error(format!("Failed to read {}: {}", db_path.display(), e)),
    };

    store.close().await;
    result
}

fn check_search(config: &AppConfig) -> CheckResult {
    let search = &config.search;

    if search.query.trim().is_empty() {
        return CheckResult::error("No search query configured");
    }

    if config.reply.message.trim().is_empty() {
        return CheckResult::error("Reply message is empty");
    }

    let details = serde_json::json!({
        "query": search.query,
        "subreddit": search.subreddit,
        "max_results": search.max_results,
        "blacklist": config.reply.blacklist,
        "cooldown_secs": config.reply.cooldown_secs,
    });

    if config.reply.blacklist.is_empty() {
        return CheckResult::warn(format!(
            "Query: \"{}\" in r/{}, blacklist is empty",
            search.query, search.subreddit
        ))
        .with_details(details);
    }

    CheckResult::ok(format!(
        "Query: \"{}\" in r/{}, {} blacklisted subreddits",
        search.query,
        search.subreddit,
        config.reply.blacklist.len()
    ))
    .with_details(details)
}

fn print_report(report: &DoctorReport) {
    println!("komori Doctor Report");
    println!("====================");
    println!();

    print_check("Config", &report.config);
    print_check("Credentials", &report.credentials);
    print_check("State DB", &report.state);
    print_check("Search", &report.search);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: komori run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
