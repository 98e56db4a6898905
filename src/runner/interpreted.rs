//! Interpreted-script adapter
//!
//! Writes the submitted source into a fresh temporary workspace and runs
//! the language's interpreter over it: one process invocation, one timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{run_with_timeout, LanguageRunner, TIMEOUT_MESSAGE};
use crate::languages::Language;
use crate::outcome::{ExecutionResult, Strategy};

/// Runner for languages executed directly by an interpreter
pub struct InterpretedRunner {
    language: Language,
}

impl InterpretedRunner {
    pub fn new(language: Language) -> Self {
        debug_assert!(!language.is_compiled());
        Self { language }
    }
}

#[async_trait]
impl LanguageRunner for InterpretedRunner {
    async fn run(&self, code: &str, timeout_ms: u64) -> Result<ExecutionResult> {
        let workspace = tempfile::tempdir().context("Failed to create workspace")?;
        let source_path = workspace.path().join(self.language.source_file());

        tokio::fs::write(&source_path, code)
            .await
            .context("Failed to write source file")?;

        debug!(language = %self.language, "Running interpreter over {:?}", source_path);

        let mut cmd = Command::new(self.language.primary_tool());
        cmd.arg(&source_path).current_dir(workspace.path());

        let outcome = run_with_timeout(cmd, timeout_ms).await?;

        let mut result = ExecutionResult::new(Strategy::Local);
        if outcome.timed_out {
            result.timed_out = true;
            result.stderr.push(TIMEOUT_MESSAGE.to_string());
        } else {
            // Partial output before a crash is kept; stdout never carries
            // diagnostics and stderr never carries program output.
            result.stdout = outcome.stdout.trim().to_string();
            let diagnostics = outcome.stderr.trim();
            if !diagnostics.is_empty() {
                result.stderr.push(diagnostics.to_string());
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe;
    use std::path::Path;

    fn python() -> Option<InterpretedRunner> {
        // Skip on hosts without the toolchain; the probe is the same check
        // the orchestrator performs before choosing this path.
        probe::available("python3").then(|| InterpretedRunner::new(Language::Python))
    }

    #[tokio::test]
    async fn test_print_literal() {
        let Some(runner) = python() else { return };

        let result = runner.run("print(\"hi\")", 10_000).await.unwrap();
        assert_eq!(result.stdout, "hi");
        assert!(result.stderr.is_empty());
        assert_eq!(result.strategy, Strategy::Local);
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn test_syntax_error_surfaces_diagnostic() {
        let Some(runner) = python() else { return };

        let result = runner.run("print(", 10_000).await.unwrap();
        assert!(result.stdout.is_empty());
        assert_eq!(result.stderr.len(), 1);
        assert!(result.stderr[0].contains("SyntaxError"));
        assert_eq!(result.strategy, Strategy::Local);
    }

    #[tokio::test]
    async fn test_partial_output_kept_on_crash() {
        let Some(runner) = python() else { return };

        let code = "print(\"before\")\nraise RuntimeError(\"boom\")";
        let result = runner.run(code, 10_000).await.unwrap();
        assert_eq!(result.stdout, "before");
        assert_eq!(result.stderr.len(), 1);
        assert!(result.stderr[0].contains("RuntimeError"));
    }

    #[tokio::test]
    async fn test_timeout_reported_and_child_killed() {
        let Some(runner) = python() else { return };

        let started = std::time::Instant::now();
        let result = runner
            .run("import time\ntime.sleep(30)", 300)
            .await
            .unwrap();

        assert!(result.timed_out);
        assert_eq!(result.stderr, vec![TIMEOUT_MESSAGE.to_string()]);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_workspace_removed_after_run() {
        let Some(runner) = python() else { return };

        // The child prints its own working directory, which is the
        // temporary workspace; it must be gone once run() returns.
        let code = "import os\nprint(os.getcwd())";
        let result = runner.run(code, 10_000).await.unwrap();

        let workspace = Path::new(result.stdout.trim());
        assert!(!result.stdout.is_empty());
        assert!(!workspace.exists());
    }

    #[tokio::test]
    async fn test_workspace_removed_after_timeout() {
        let Some(runner) = python() else { return };

        // A timed-out child captures nothing, so the workspace path goes
        // through a side file instead: the child records its working
        // directory there before sleeping past the budget.
        let marker_dir = tempfile::tempdir().unwrap();
        let marker = marker_dir.path().join("cwd.txt");
        let code = format!(
            "import os, time\nf = open({marker:?}, 'w')\nf.write(os.getcwd())\nf.close()\ntime.sleep(30)"
        );

        let result = runner.run(&code, 1_000).await.unwrap();
        assert!(result.timed_out);

        let recorded = std::fs::read_to_string(&marker).unwrap();
        assert!(!recorded.is_empty());
        assert!(!Path::new(&recorded).exists());
    }
}
