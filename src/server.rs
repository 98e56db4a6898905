//! HTTP surface
//!
//! Root banner, health probe, `/run` and `/quickfix`. Handlers stay thin:
//! parse the language at the boundary, drive the orchestrator, then decorate
//! the outcome with hint-service suggestions. Hint failures degrade inside
//! the handler, so the routes always answer 200 with a well-formed body.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::hints::{self, HintClient};
use crate::languages::{Language, UnsupportedLanguage};
use crate::orchestrator::Orchestrator;
use crate::outcome::{ExecutionResult, Strategy};
use crate::remote::RemoteClient;

/// Shared service state handed to every handler
pub struct AppState {
    orchestrator: Orchestrator,
    hints: HintClient,
}

impl AppState {
    /// Assemble the collaborators from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote = match &config.remote_exec_key {
            Some(key) => Some(RemoteClient::new(&config.remote_exec_url, key)?),
            None => None,
        };

        let orchestrator = Orchestrator::new(remote)
            .with_remote_fallback(config.remote_fallback)
            .with_timeouts(config.exec_timeout_ms, config.compile_timeout_ms);

        let hints = HintClient::new(
            &config.gemini_api_url,
            &config.gemini_model,
            config.gemini_api_key.clone().unwrap_or_default(),
        )?;

        Ok(Self {
            orchestrator,
            hints,
        })
    }
}

/// Build the service router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/run", post(run_code))
        .route("/quickfix", post(quickfix))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub prefer_remote: bool,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub output: String,
    pub errors: Vec<String>,
    pub strategy_used: Strategy,
    pub is_simulation: bool,
    pub is_remote: bool,
    pub timed_out: bool,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuickfixRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct QuickfixResponse {
    pub fixed_code: String,
}

fn default_language() -> String {
    "python".into()
}

impl RunResponse {
    fn assemble(result: ExecutionResult, suggestions: Vec<String>) -> Self {
        Self {
            output: result.stdout,
            errors: result.stderr,
            strategy_used: result.strategy,
            is_simulation: result.strategy == Strategy::Simulated,
            is_remote: result.strategy == Strategy::Remote,
            timed_out: result.timed_out,
            suggestions,
        }
    }

    /// Response for a language outside the supported set: one descriptive
    /// error, the availability note as output, nothing executed
    fn unsupported(err: &UnsupportedLanguage) -> Self {
        Self {
            output: err.availability_note(),
            errors: vec![err.to_string()],
            strategy_used: Strategy::Local,
            is_simulation: false,
            is_remote: false,
            timed_out: false,
            suggestions: Vec::new(),
        }
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the AI-Powered Code Debugger!" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") }))
}

async fn run_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Json<RunResponse> {
    let language = match request.language.parse::<Language>() {
        Ok(language) => language,
        Err(e) => {
            info!("Rejected submission: {e}");
            return Json(RunResponse::unsupported(&e));
        }
    };

    let result = state
        .orchestrator
        .execute(&request.code, language, request.prefer_remote)
        .await;

    let error_text = result.stderr.join("\n");
    let suggestions = state
        .hints
        .suggest(&request.code, language, &error_text)
        .await
        .unwrap_or_else(|e| hints::degrade_suggestions(&e));

    Json(RunResponse::assemble(result, suggestions))
}

async fn quickfix(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuickfixRequest>,
) -> Json<QuickfixResponse> {
    let language = match request.language.parse::<Language>() {
        Ok(language) => language,
        Err(e) => {
            info!("Rejected quickfix: {e}");
            return Json(QuickfixResponse {
                fixed_code: request.code,
            });
        }
    };

    let fixed_code = state
        .hints
        .autofix(&request.code, language)
        .await
        .unwrap_or_else(|e| hints::degrade_fixed_code(&request.code, &e));

    Json(QuickfixResponse { fixed_code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::DEFAULT_SUBMISSIONS_URL;

    fn test_config() -> Config {
        // No credentials and no remote fallback, so nothing leaves the host.
        Config {
            listen_addr: "127.0.0.1:0".into(),
            exec_timeout_ms: 5_000,
            compile_timeout_ms: 30_000,
            remote_exec_url: DEFAULT_SUBMISSIONS_URL.into(),
            remote_exec_key: None,
            remote_fallback: false,
            gemini_api_url: hints::DEFAULT_API_URL.into(),
            gemini_model: hints::DEFAULT_MODEL.into(),
            gemini_api_key: None,
        }
    }

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::from_config(&test_config()).unwrap())
    }

    #[test]
    fn test_run_request_defaults() {
        let request: RunRequest = serde_json::from_str(r#"{"code": "print('hi')"}"#).unwrap();
        assert_eq!(request.language, "python");
        assert!(!request.prefer_remote);
    }

    #[test]
    fn test_response_wire_shape() {
        let result = ExecutionResult::new(Strategy::Simulated).with_stdout("hi");
        let response = RunResponse::assemble(result, vec!["tip".into()]);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["output"], "hi");
        assert_eq!(value["strategy_used"], "simulated");
        assert_eq!(value["is_simulation"], true);
        assert_eq!(value["is_remote"], false);
        assert_eq!(value["timed_out"], false);
        assert_eq!(value["suggestions"][0], "tip");
    }

    #[tokio::test]
    async fn test_unsupported_language_rejected_without_execution() {
        let response = run_code(
            State(test_state()),
            Json(RunRequest {
                code: "puts 'hi'".into(),
                language: "ruby".into(),
                prefer_remote: false,
            }),
        )
        .await;

        let body = response.0;
        assert_eq!(body.errors, vec!["Language 'ruby' is not supported.".to_string()]);
        assert!(body.output.starts_with("Unsupported language: ruby."));
        assert!(body.suggestions.is_empty());
        assert!(!body.is_simulation);
        assert!(!body.timed_out);
    }

    #[tokio::test]
    async fn test_quickfix_without_key_returns_code_unchanged() {
        let response = quickfix(
            State(test_state()),
            Json(QuickfixRequest {
                code: "print(".into(),
                language: "python".into(),
            }),
        )
        .await;

        assert_eq!(response.0.fixed_code, "print(");
    }

    #[tokio::test]
    async fn test_run_round_trip_over_http() {
        let app = router(test_state());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{addr}/run"))
            .json(&json!({ "code": "print('hi')", "language": "python" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        let strategy = body["strategy_used"].as_str().unwrap();
        assert!(["local", "remote", "simulated"].contains(&strategy));
        assert!(body["errors"].is_array());
        assert!(body["suggestions"].is_array());

        let health = client
            .get(format!("http://{addr}/health"))
            .send()
            .await
            .unwrap();
        assert_eq!(health.status(), 200);
    }
}
