//! Service configuration
//!
//! Loaded once at startup from the environment (a `.env` file is honored in
//! `main`). Optional credentials are `Option`: a missing key means the
//! corresponding collaborator runs in its documented degraded mode instead
//! of failing startup.

use crate::{hints, remote};

/// Runtime configuration, immutable after startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address for the HTTP listener
    pub listen_addr: String,
    /// Wall-clock budget for one program run
    pub exec_timeout_ms: u64,
    /// Compile-phase budget for toolchain languages
    pub compile_timeout_ms: u64,
    /// Submissions endpoint of the remote execution service
    pub remote_exec_url: String,
    /// Remote execution credential
    pub remote_exec_key: Option<String>,
    /// Whether a missing toolchain may fall back to remote without opt-in
    pub remote_fallback: bool,
    /// Hint service endpoint
    pub gemini_api_url: String,
    /// Hint service model name
    pub gemini_model: String,
    /// Hint service credential
    pub gemini_api_key: Option<String>,
}

impl Config {
    /// Read configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            listen_addr: env_or("LISTEN_ADDR", "0.0.0.0:8000"),
            exec_timeout_ms: env_u64("EXEC_TIMEOUT_MS", 5_000),
            compile_timeout_ms: env_u64("COMPILE_TIMEOUT_MS", 30_000),
            remote_exec_url: env_or("REMOTE_EXEC_URL", remote::DEFAULT_SUBMISSIONS_URL),
            remote_exec_key: non_empty_env("REMOTE_EXEC_KEY"),
            remote_fallback: env_flag("REMOTE_FALLBACK", true),
            gemini_api_url: env_or("GEMINI_API_URL", hints::DEFAULT_API_URL),
            gemini_model: env_or("GEMINI_MODEL", hints::DEFAULT_MODEL),
            gemini_api_key: non_empty_env("GEMINI_API_KEY"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
