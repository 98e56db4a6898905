//! Compile-then-run adapter
//!
//! Two-phase execution for toolchain languages. Phase 1 compiles the source
//! into a workspace-local artifact under a fixed compile budget; phase 2 runs
//! the artifact under the submission timeout. Compiler diagnostics
//! short-circuit phase 2.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use super::{run_with_timeout, LanguageRunner, TIMEOUT_MESSAGE};
use crate::languages::Language;
use crate::outcome::{ExecutionResult, Strategy};

/// Reported when the compiler exceeds its time budget
pub const COMPILE_TIMEOUT_MESSAGE: &str = "compilation timed out";

/// Reported for java sources that declare no public class
pub const MISSING_CLASS_MESSAGE: &str =
    "Could not find a public class in your Java code. Please define a public class.";

const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 30_000;

/// Cached class declaration pattern
static CLASS_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Extract the declared public class name from a java source, if any
pub fn java_class_name(code: &str) -> Option<&str> {
    let pattern = CLASS_PATTERN.get_or_init(|| Regex::new(r"public\s+class\s+(\w+)").unwrap());
    pattern
        .captures(code)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Runner for languages that build an artifact before running it
pub struct CompiledRunner {
    language: Language,
    compile_timeout_ms: u64,
}

impl CompiledRunner {
    pub fn new(language: Language) -> Self {
        debug_assert!(language.is_compiled());
        Self {
            language,
            compile_timeout_ms: DEFAULT_COMPILE_TIMEOUT_MS,
        }
    }

    /// Set the compile-phase time budget
    pub fn with_compile_timeout(mut self, compile_timeout_ms: u64) -> Self {
        self.compile_timeout_ms = compile_timeout_ms;
        self
    }

    /// Run the compile phase; a rejected program is diagnostics, not an Err
    async fn compile(&self, cmd: Command) -> Result<Option<String>> {
        let outcome = run_with_timeout(cmd, self.compile_timeout_ms).await?;

        if outcome.timed_out {
            return Ok(Some(COMPILE_TIMEOUT_MESSAGE.to_string()));
        }
        if outcome.is_success() {
            return Ok(None);
        }

        // Diagnostics usually land on stderr; some toolchains write to
        // stdout instead. A javac started under JAVA_TOOL_OPTIONS leads
        // its stderr with the banner, so the capture is filtered like the
        // run phase.
        let stderr = filter_runtime_noise(self.language, &outcome.stderr);
        let diagnostics = if !stderr.is_empty() {
            stderr
        } else if !outcome.stdout.trim().is_empty() {
            outcome.stdout.trim().to_string()
        } else {
            format!("Compilation failed with exit code {}", outcome.exit_code)
        };
        Ok(Some(diagnostics))
    }

    /// Run the built artifact and fold its streams into a local result
    async fn run_artifact(&self, cmd: Command, timeout_ms: u64) -> Result<ExecutionResult> {
        let outcome = run_with_timeout(cmd, timeout_ms).await?;

        let mut result = ExecutionResult::new(Strategy::Local);
        if outcome.timed_out {
            result.timed_out = true;
            result.stderr.push(TIMEOUT_MESSAGE.to_string());
        } else {
            result.stdout = outcome.stdout.trim().to_string();
            let diagnostics = filter_runtime_noise(self.language, &outcome.stderr);
            if !diagnostics.is_empty() {
                result.stderr.push(diagnostics);
            }
        }
        Ok(result)
    }

    /// gcc / g++ path: fixed source name, artifact named `program`
    async fn run_native(&self, code: &str, timeout_ms: u64) -> Result<ExecutionResult> {
        let workspace = tempfile::tempdir().context("Failed to create workspace")?;
        let source_path = workspace.path().join(self.language.source_file());
        let artifact_path = workspace.path().join("program");

        tokio::fs::write(&source_path, code)
            .await
            .context("Failed to write source file")?;

        debug!(language = %self.language, "Compiling {:?}", source_path);

        let mut compile_cmd = Command::new(self.language.primary_tool());
        compile_cmd
            .arg(&source_path)
            .arg("-o")
            .arg(&artifact_path)
            .current_dir(workspace.path());

        if let Some(diagnostics) = self.compile(compile_cmd).await? {
            return Ok(ExecutionResult::new(Strategy::Local).with_error(diagnostics));
        }

        let mut run_cmd = Command::new(&artifact_path);
        run_cmd.current_dir(workspace.path());
        self.run_artifact(run_cmd, timeout_ms).await
    }

    /// javac / java path: the source file must carry the public class name
    async fn run_java(&self, code: &str, timeout_ms: u64) -> Result<ExecutionResult> {
        let Some(class_name) = java_class_name(code) else {
            return Ok(ExecutionResult::new(Strategy::Local).with_error(MISSING_CLASS_MESSAGE));
        };

        let workspace = tempfile::tempdir().context("Failed to create workspace")?;
        let source_path = workspace.path().join(format!("{class_name}.java"));

        tokio::fs::write(&source_path, code)
            .await
            .context("Failed to write source file")?;

        debug!(class = class_name, "Compiling {:?}", source_path);

        let mut compile_cmd = Command::new("javac");
        compile_cmd.arg(&source_path).current_dir(workspace.path());

        if let Some(diagnostics) = self.compile(compile_cmd).await? {
            return Ok(ExecutionResult::new(Strategy::Local).with_error(diagnostics));
        }

        let mut run_cmd = Command::new("java");
        run_cmd
            .arg("-cp")
            .arg(workspace.path())
            .arg(class_name)
            .current_dir(workspace.path());
        self.run_artifact(run_cmd, timeout_ms).await
    }
}

#[async_trait]
impl LanguageRunner for CompiledRunner {
    async fn run(&self, code: &str, timeout_ms: u64) -> Result<ExecutionResult> {
        match self.language {
            Language::Java => self.run_java(code, timeout_ms).await,
            _ => self.run_native(code, timeout_ms).await,
        }
    }
}

/// Drop JVM banner noise from captured stderr
fn filter_runtime_noise(language: Language, stderr: &str) -> String {
    let trimmed = stderr.trim();
    if language != Language::Java {
        return trimmed.to_string();
    }
    trimmed
        .lines()
        .filter(|line| !line.trim().starts_with("Picked up JAVA_TOOL_OPTIONS"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
