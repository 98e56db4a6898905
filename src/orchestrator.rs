//! Execution orchestrator
//!
//! The strategy ladder for one submission: local toolchain when present,
//! remote execution as the secondary path, textual simulation as the last
//! resort. Each strategy is attempted at most once and every path ends in a
//! well-formed `ExecutionResult`; callers never see a fault from here.

use tracing::{info, warn};

use crate::languages::Language;
use crate::outcome::{ExecutionResult, Strategy};
use crate::probe;
use crate::remote::{RemoteClient, RemoteError};
use crate::runner;
use crate::simulate;

/// Warning attached to every simulated result
pub const SIMULATION_NOTE: &str =
    "Note: This is a simulated output and may not reflect actual execution results.";

/// Appended when a requested remote run failed and simulation takes over
const REMOTE_FALLBACK_NOTE: &str =
    "External API execution failed. Falling back to simulation mode.";

const DEFAULT_EXEC_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 30_000;

/// Toolchain availability check, injectable for tests
pub trait ToolchainProbe: Send + Sync {
    fn is_available(&self, language: Language) -> bool;
}

/// Probe backed by the real `PATH`
pub struct PathProbe;

impl ToolchainProbe for PathProbe {
    fn is_available(&self, language: Language) -> bool {
        probe::all_available(language.toolchain())
    }
}

/// Per-submission strategy driver
pub struct Orchestrator {
    toolchains: Box<dyn ToolchainProbe>,
    remote: Option<RemoteClient>,
    remote_fallback: bool,
    exec_timeout_ms: u64,
    compile_timeout_ms: u64,
}

impl Orchestrator {
    pub fn new(remote: Option<RemoteClient>) -> Self {
        Self {
            toolchains: Box::new(PathProbe),
            remote,
            remote_fallback: true,
            exec_timeout_ms: DEFAULT_EXEC_TIMEOUT_MS,
            compile_timeout_ms: DEFAULT_COMPILE_TIMEOUT_MS,
        }
    }

    /// Replace the toolchain probe
    pub fn with_probe(mut self, toolchains: Box<dyn ToolchainProbe>) -> Self {
        self.toolchains = toolchains;
        self
    }

    /// Allow or forbid the remote attempt for submissions without opt-in
    pub fn with_remote_fallback(mut self, enabled: bool) -> Self {
        self.remote_fallback = enabled;
        self
    }

    /// Set the run and compile time budgets
    pub fn with_timeouts(mut self, exec_timeout_ms: u64, compile_timeout_ms: u64) -> Self {
        self.exec_timeout_ms = exec_timeout_ms;
        self.compile_timeout_ms = compile_timeout_ms;
        self
    }

    /// Run one submission through the ladder
    pub async fn execute(
        &self,
        code: &str,
        language: Language,
        prefer_remote: bool,
    ) -> ExecutionResult {
        info!(language = %language, prefer_remote, "Executing submission");

        let mut advisories: Vec<String> = Vec::new();

        if prefer_remote {
            match self.remote_attempt(code, language).await {
                Ok(result) => return result,
                Err(e) => {
                    warn!(language = %language, "Remote execution failed: {e}");
                    advisories.push(e.to_string());
                }
            }
        }

        if self.toolchains.is_available(language) {
            return self.local_attempt(code, language, advisories).await;
        }

        if !prefer_remote && self.remote_fallback {
            match self.remote_attempt(code, language).await {
                Ok(result) => return result,
                Err(e) => {
                    warn!(language = %language, "Remote execution failed: {e}");
                }
            }
            advisories.push(toolchain_missing_note(language));
        } else if prefer_remote {
            advisories.push(REMOTE_FALLBACK_NOTE.to_string());
        } else {
            advisories.push(toolchain_missing_note(language));
        }

        self.simulated(code, language, advisories)
    }

    /// Local execution is terminal whenever the toolchain exists, even when
    /// the adapter itself failed
    async fn local_attempt(
        &self,
        code: &str,
        language: Language,
        advisories: Vec<String>,
    ) -> ExecutionResult {
        let adapter = runner::runner_for(language, self.compile_timeout_ms);
        match adapter.run(code, self.exec_timeout_ms).await {
            Ok(mut result) => {
                if !advisories.is_empty() {
                    let mut stderr = advisories;
                    stderr.extend(result.stderr);
                    result.stderr = stderr;
                }
                result
            }
            Err(e) => {
                warn!(language = %language, "Adapter failure: {:?}", e);
                let mut result = ExecutionResult::new(Strategy::Local);
                result.stderr = advisories;
                result.stderr.push(format!("Execution failed: {e}"));
                result
            }
        }
    }

    async fn remote_attempt(
        &self,
        code: &str,
        language: Language,
    ) -> Result<ExecutionResult, RemoteError> {
        match &self.remote {
            Some(client) => client.submit(code, language).await,
            None => Err(RemoteError::MissingCredentials),
        }
    }

    fn simulated(
        &self,
        code: &str,
        language: Language,
        mut advisories: Vec<String>,
    ) -> ExecutionResult {
        info!(language = %language, "Falling back to simulated execution");
        advisories.push(SIMULATION_NOTE.to_string());

        let mut result = ExecutionResult::new(Strategy::Simulated)
            .with_stdout(simulate::simulate(code, language));
        result.stderr = advisories;
        result
    }
}

fn toolchain_missing_note(language: Language) -> String {
    let what = match language {
        Language::Python => "Python",
        Language::Javascript => "Node.js",
        Language::Java => "Java SDK",
        Language::C => "GCC compiler",
        Language::Cpp => "G++ compiler",
    };
    format!("{what} is not installed or not in PATH. Running in simulation mode.")
}
