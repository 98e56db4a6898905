//! Remote execution client
//!
//! Client for a Judge0-style submissions API: base64-encode the source,
//! create a submission, then poll the returned token until the job reaches a
//! terminal status. A program that ran and failed remotely is still an
//! `ExecutionResult`; only service-level problems (credentials, transport,
//! unexpected statuses, a job that never settles) surface as `RemoteError`.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::languages::Language;
use crate::outcome::{ExecutionResult, Strategy};

/// Judge0 CE submissions endpoint on RapidAPI
pub const DEFAULT_SUBMISSIONS_URL: &str = "https://judge0-ce.p.rapidapi.com/submissions";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const INITIAL_DELAY: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(1500);
const MAX_POLLS: u32 = 5;

// Judge0 status ids: 1 and 2 are queued/processing, everything above is
// terminal.
const STATUS_PROCESSING: u32 = 2;
const STATUS_ACCEPTED: u32 = 3;
const STATUS_TIME_LIMIT: u32 = 5;

/// Failure of the remote execution service itself
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote execution is not configured (missing API key)")]
    MissingCredentials,
    #[error("Remote request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Remote service responded with status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("Remote job did not finish within the polling window")]
    NotReady,
}

/// Client for the remote submissions API
pub struct RemoteClient {
    client: Client,
    submissions_url: String,
    api_key: String,
    host: String,
}

#[derive(Debug, Serialize)]
struct CreateSubmission {
    language_id: u32,
    source_code: String,
    stdin: String,
}

#[derive(Debug, Deserialize)]
struct CreatedSubmission {
    token: String,
}

#[derive(Debug, Deserialize)]
struct Submission {
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(default)]
    compile_output: Option<String>,
    status: SubmissionStatus,
}

#[derive(Debug, Deserialize)]
struct SubmissionStatus {
    id: u32,
    #[serde(default)]
    description: String,
}

impl RemoteClient {
    pub fn new(
        submissions_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, RemoteError> {
        let submissions_url = submissions_url.into();
        let host = reqwest::Url::parse(&submissions_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            submissions_url,
            api_key: api_key.into(),
            host,
        })
    }

    /// Run `code` remotely and wait for the terminal result
    pub async fn submit(
        &self,
        code: &str,
        language: Language,
    ) -> Result<ExecutionResult, RemoteError> {
        if self.api_key.is_empty() {
            return Err(RemoteError::MissingCredentials);
        }

        let payload = CreateSubmission {
            language_id: language.remote_id(),
            source_code: BASE64.encode(code),
            stdin: String::new(),
        };

        debug!(language = %language, "Submitting code to remote execution service");

        let response = self
            .with_headers(self.client.post(&self.submissions_url))
            .json(&payload)
            .send()
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(RemoteError::UnexpectedStatus(response.status()));
        }
        let created: CreatedSubmission = response.json().await?;

        let poll_url = format!("{}/{}", self.submissions_url, created.token);
        tokio::time::sleep(INITIAL_DELAY).await;

        for attempt in 0..MAX_POLLS {
            if attempt > 0 {
                tokio::time::sleep(POLL_INTERVAL).await;
            }

            let response = self.with_headers(self.client.get(&poll_url)).send().await?;
            if !response.status().is_success() {
                return Err(RemoteError::UnexpectedStatus(response.status()));
            }

            let submission: Submission = response.json().await?;
            if submission.status.id > STATUS_PROCESSING {
                return Ok(interpret(submission));
            }
            debug!(token = %created.token, attempt, "Remote job still pending");
        }

        Err(RemoteError::NotReady)
    }

    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header("X-RapidAPI-Key", &self.api_key);
        if self.host.is_empty() {
            builder
        } else {
            builder.header("X-RapidAPI-Host", &self.host)
        }
    }
}

/// Fold a terminal submission into an execution result
fn interpret(submission: Submission) -> ExecutionResult {
    let mut result = ExecutionResult::new(Strategy::Remote);

    if submission.status.id == STATUS_ACCEPTED {
        result.stdout = submission
            .stdout
            .as_deref()
            .map(decode_field)
            .unwrap_or_default();
        return result;
    }

    if submission.status.id == STATUS_TIME_LIMIT {
        result.timed_out = true;
    }

    let message = non_empty(submission.stderr)
        .or_else(|| non_empty(submission.compile_output))
        .map(|field| decode_field(&field))
        .unwrap_or_else(|| format!("Execution failed: {}", submission.status.description));
    result.stderr.push(message);
    result
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// Remote payload fields are base64; tolerate services that send them raw
fn decode_field(encoded: &str) -> String {
    let cleaned: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    match BASE64.decode(cleaned) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => encoded.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(json: &str) -> Submission {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_accepted_status_decodes_stdout() {
        let result = interpret(submission(
            r#"{"stdout": "aGVsbG8K", "status": {"id": 3, "description": "Accepted"}}"#,
        ));
        assert_eq!(result.stdout, "hello\n");
        assert!(result.stderr.is_empty());
        assert_eq!(result.strategy, Strategy::Remote);
        assert!(!result.timed_out);
    }

    #[test]
    fn test_accepted_without_stdout_is_empty() {
        let result = interpret(submission(r#"{"status": {"id": 3, "description": "Accepted"}}"#));
        assert!(result.stdout.is_empty());
        assert!(result.is_clean());
    }

    #[test]
    fn test_stderr_takes_priority_over_compile_output() {
        // "cnVudGltZQ==" is "runtime", "Y29tcGlsZQ==" is "compile".
        let result = interpret(submission(
            r#"{"stderr": "cnVudGltZQ==", "compile_output": "Y29tcGlsZQ==",
                "status": {"id": 11, "description": "Runtime Error (NZEC)"}}"#,
        ));
        assert_eq!(result.stderr, vec!["runtime".to_string()]);
    }

    #[test]
    fn test_compile_output_used_when_stderr_absent() {
        let result = interpret(submission(
            r#"{"compile_output": "Y29tcGlsZQ==",
                "status": {"id": 6, "description": "Compilation Error"}}"#,
        ));
        assert_eq!(result.stderr, vec!["compile".to_string()]);
    }

    #[test]
    fn test_message_synthesized_from_status_description() {
        let result = interpret(submission(
            r#"{"status": {"id": 13, "description": "Internal Error"}}"#,
        ));
        assert_eq!(
            result.stderr,
            vec!["Execution failed: Internal Error".to_string()]
        );
    }

    #[test]
    fn test_remote_time_limit_sets_timed_out() {
        let result = interpret(submission(
            r#"{"status": {"id": 5, "description": "Time Limit Exceeded"}}"#,
        ));
        assert!(result.timed_out);
        assert_eq!(
            result.stderr,
            vec!["Execution failed: Time Limit Exceeded".to_string()]
        );
    }

    #[test]
    fn test_decode_tolerates_embedded_whitespace() {
        assert_eq!(decode_field("aGVs\nbG8K"), "hello\n");
    }

    #[test]
    fn test_decode_falls_back_to_raw_text() {
        assert_eq!(decode_field("not valid base64!!"), "not valid base64!!");
    }

    #[test]
    fn test_creation_payload_shape() {
        let payload = CreateSubmission {
            language_id: Language::Python.remote_id(),
            source_code: BASE64.encode("print('hi')"),
            stdin: String::new(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["language_id"], 71);
        assert_eq!(value["stdin"], "");
        assert_eq!(value["source_code"], BASE64.encode("print('hi')"));
    }

    #[test]
    fn test_client_without_key_reports_missing_credentials() {
        let client = RemoteClient::new(DEFAULT_SUBMISSIONS_URL, "").unwrap();
        let err = tokio_test::block_on(client.submit("print('hi')", Language::Python));
        assert!(matches!(err, Err(RemoteError::MissingCredentials)));
    }
}
