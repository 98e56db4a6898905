//! Debugging hint client
//!
//! Client for the Google Generative Language API used for two things:
//! error-fix suggestions attached to every run, and the whole-file quickfix.
//! The service is best-effort by contract, so every failure mode has a
//! degraded form (`degrade_suggestions` / `degrade_fixed_code`) that callers
//! use instead of failing the response.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::languages::Language;

/// Google Generative Language API base
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Advisory shown next to a transport failure
pub const CHECK_CONNECTION_NOTE: &str = "Please check your API key and internet connection.";

/// Advisory for an unparseable reply
pub const DECODE_FAILURE_NOTE: &str =
    "Error decoding API response. The Gemini API may be experiencing issues.";

/// Advisory when the service is unconfigured or replied with nothing
pub const NO_SUGGESTIONS_NOTE: &str =
    "No AI suggestions available. Please check your API key or try again later.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SUGGESTIONS: usize = 10;

/// Failure of the hint service itself
#[derive(Debug, Error)]
pub enum HintError {
    #[error("Hint service is not configured (missing API key)")]
    MissingCredentials,
    #[error("Hint request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Hint service responded with status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("Hint service reply carried no text")]
    EmptyReply,
}

/// Client for the generateContent endpoint
pub struct HintClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl HintClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, HintError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Ask for 3-5 fix suggestions, returned as display-ready lines
    pub async fn suggest(
        &self,
        code: &str,
        language: Language,
        error_text: &str,
    ) -> Result<Vec<String>, HintError> {
        let prompt = suggestion_prompt(code, language, error_text);
        let config = GenerationConfig {
            temperature: 0.2,
            top_p: 0.8,
            top_k: 40,
        };

        let text = self.generate(prompt, config).await?;
        Ok(split_suggestions(&text))
    }

    /// Ask for a corrected whole-file rewrite of `code`
    pub async fn autofix(&self, code: &str, language: Language) -> Result<String, HintError> {
        let prompt = autofix_prompt(code, language);
        let config = GenerationConfig {
            temperature: 0.1,
            top_p: 0.95,
            top_k: 40,
        };

        let text = self.generate(prompt, config).await?;
        Ok(extract_code_block(&text, language))
    }

    async fn generate(
        &self,
        prompt: String,
        config: GenerationConfig,
    ) -> Result<String, HintError> {
        if self.api_key.is_empty() {
            return Err(HintError::MissingCredentials);
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: config,
        };

        debug!(model = %self.model, "Requesting hints");

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(HintError::UnexpectedStatus(response.status()));
        }

        let reply: GenerateResponse = response.json().await?;
        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(HintError::EmptyReply)
    }
}

/// Suggestion lines to show when the hint service failed
pub fn degrade_suggestions(err: &HintError) -> Vec<String> {
    match err {
        HintError::MissingCredentials | HintError::EmptyReply => {
            vec![NO_SUGGESTIONS_NOTE.to_string()]
        }
        HintError::Transport(e) if e.is_decode() => vec![DECODE_FAILURE_NOTE.to_string()],
        HintError::Transport(_) | HintError::UnexpectedStatus(_) => vec![
            format!("API error: {err}"),
            CHECK_CONNECTION_NOTE.to_string(),
        ],
    }
}

/// Quickfix output when the hint service failed: the submitted code, with an
/// error annotation for failures the caller should know about
pub fn degrade_fixed_code(code: &str, err: &HintError) -> String {
    match err {
        HintError::MissingCredentials | HintError::EmptyReply => code.to_string(),
        HintError::Transport(e) if e.is_decode() => {
            format!("{code}\n\n# Error: Failed to decode API response")
        }
        _ => format!("{code}\n\n# Error: API request failed - {err}"),
    }
}

fn suggestion_prompt(code: &str, language: Language, error_text: &str) -> String {
    format!(
        "Code ({lang}):\n```{lang}\n{code}\n```\n\nErrors:\n{errors}\n\n{instructions}\n\n\
         Provide 3-5 clear, concise suggestions to fix these errors in {lang}.\n\
         For each suggestion:\n\
         1. Identify the specific error or issue\n\
         2. Provide the correct code snippet to fix it\n\
         3. Briefly explain why this is a problem and how your fix resolves it",
        lang = language.name(),
        code = code,
        errors = error_text,
        instructions = language_instructions(language),
    )
}

fn autofix_prompt(code: &str, language: Language) -> String {
    format!(
        "Fix all errors in this {lang} code and return ONLY the corrected version:\n\
         ```{lang}\n{code}\n```\n\n{instructions}\n\n\
         Requirements:\n\
         1. Output ONLY the fixed code with no explanations\n\
         2. Keep the program logic intact while fixing syntax/errors\n\
         3. Make minimal changes to achieve a working program\n\
         4. Return the entire fixed code, not just the problematic parts\n\
         5. Preserve code comments and formatting as much as possible",
        lang = language.name(),
        code = code,
        instructions = language_instructions(language),
    )
}

/// Language-specific prompt guidance
fn language_instructions(language: Language) -> &'static str {
    match language {
        Language::Python => {
            "Focus on common Python issues like indentation, missing colons, or undefined \
             variables. Consider Python's dynamic typing and library imports."
        }
        Language::Javascript => {
            "Pay attention to JavaScript-specific issues like missing semicolons, undefined \
             variables, or async/await problems. Consider browser compatibility and Node.js \
             environment differences."
        }
        Language::Java => {
            "Focus on Java-specific issues like missing semicolons, type errors, or class \
             structure problems. Consider Java's strict typing, method signatures, and \
             compilation requirements."
        }
        Language::Cpp => {
            "Look for C++ specific issues like memory management, pointer errors, or missing \
             include statements. Consider compilation stages and linking errors."
        }
        Language::C => {
            "Check for C-specific issues like memory allocation, pointer arithmetic, or missing \
             headers. Consider C's procedural nature and manual memory management."
        }
    }
}

/// Split reply text into display lines, bounded for the UI
fn split_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

/// Pull the first fenced code block out of a reply, or fall back to raw text
fn extract_code_block(text: &str, language: Language) -> String {
    let blocks: Vec<&str> = text.split("```").collect();
    if blocks.len() >= 3 {
        let block = blocks[1].trim();
        let block = block.strip_prefix(language.name()).unwrap_or(block);
        return block.trim().to_string();
    }
    text.trim().to_string()
}
