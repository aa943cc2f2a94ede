//! Server configuration
//!
//! Defines the bind address, how workers are invoked, per-stage timeouts and
//! the collection limits applied to each operation.

use anyhow::Context;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::service::plan::CollectLimits;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// Interpreter or executable every worker is launched with
    pub worker_program: String,

    /// Working directory of every worker invocation
    pub worker_dir: PathBuf,

    pub collect_script: String,
    pub index_script: String,
    pub query_script: String,

    pub collect_timeout: Duration,
    pub index_timeout: Duration,
    pub query_timeout: Duration,

    /// Default limits for the collect and collect-and-index operations
    pub collect_limits: CollectLimits,

    /// Default limits for the collect-and-analyze operation
    pub analyze_limits: CollectLimits,

    /// Upper bound for any requested `max_pages`
    pub max_pages_ceiling: u32,

    /// Upper bound for any requested `max_reviews`
    pub max_reviews_ceiling: u32,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(bind_addr: String, worker_dir: PathBuf) -> Self {
        Self {
            bind_addr,
            worker_program: "python".to_string(),
            worker_dir,
            collect_script: "1_fetch_reviews.py".to_string(),
            index_script: "2_create_rag_index.py".to_string(),
            query_script: "3_query_rag.py".to_string(),
            collect_timeout: Duration::from_secs(300), // 5 minutes
            index_timeout: Duration::from_secs(120),
            query_timeout: Duration::from_secs(120),
            collect_limits: CollectLimits::new(5, 50),
            analyze_limits: CollectLimits::new(2, 100),
            max_pages_ceiling: 10,
            max_reviews_ceiling: 500,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional and falls back to the default:
    /// - SIFT_BIND_ADDR (default: 0.0.0.0:3000)
    /// - SIFT_WORKER_PROGRAM (default: python)
    /// - SIFT_WORKER_DIR (default: backend/ai_core)
    /// - SIFT_COLLECT_SCRIPT, SIFT_INDEX_SCRIPT, SIFT_QUERY_SCRIPT
    /// - SIFT_COLLECT_TIMEOUT (seconds, default: 300)
    /// - SIFT_INDEX_TIMEOUT (seconds, default: 120)
    /// - SIFT_QUERY_TIMEOUT (seconds, default: 120)
    /// - SIFT_MAX_PAGES_CEILING (default: 10)
    /// - SIFT_MAX_REVIEWS_CEILING (default: 500)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("SIFT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(program) = std::env::var("SIFT_WORKER_PROGRAM") {
            config.worker_program = program;
        }
        if let Ok(dir) = std::env::var("SIFT_WORKER_DIR") {
            config.worker_dir = PathBuf::from(dir);
        }
        if let Ok(script) = std::env::var("SIFT_COLLECT_SCRIPT") {
            config.collect_script = script;
        }
        if let Ok(script) = std::env::var("SIFT_INDEX_SCRIPT") {
            config.index_script = script;
        }
        if let Ok(script) = std::env::var("SIFT_QUERY_SCRIPT") {
            config.query_script = script;
        }

        if let Some(secs) = parse_env::<u64>("SIFT_COLLECT_TIMEOUT")? {
            config.collect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env::<u64>("SIFT_INDEX_TIMEOUT")? {
            config.index_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env::<u64>("SIFT_QUERY_TIMEOUT")? {
            config.query_timeout = Duration::from_secs(secs);
        }
        if let Some(ceiling) = parse_env::<u32>("SIFT_MAX_PAGES_CEILING")? {
            config.max_pages_ceiling = ceiling;
        }
        if let Some(ceiling) = parse_env::<u32>("SIFT_MAX_REVIEWS_CEILING")? {
            config.max_reviews_ceiling = ceiling;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.worker_program.trim().is_empty() {
            anyhow::bail!("worker_program cannot be empty");
        }

        for (name, script) in [
            ("collect_script", &self.collect_script),
            ("index_script", &self.index_script),
            ("query_script", &self.query_script),
        ] {
            if script.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
        }

        for (name, timeout) in [
            ("collect_timeout", self.collect_timeout),
            ("index_timeout", self.index_timeout),
            ("query_timeout", self.query_timeout),
        ] {
            if timeout.is_zero() {
                anyhow::bail!("{} must be greater than 0", name);
            }
        }

        if self.max_pages_ceiling == 0 {
            anyhow::bail!("max_pages_ceiling must be greater than 0");
        }

        if self.max_reviews_ceiling == 0 {
            anyhow::bail!("max_reviews_ceiling must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("0.0.0.0:3000".to_string(), PathBuf::from("backend/ai_core"))
    }
}

/// Reads and parses an optional environment variable
fn parse_env<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: '{}'", name, raw)),
        Err(_) => Ok(None),
    }
}
