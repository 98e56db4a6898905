//! Normalized execution results shared by every strategy

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a submission's result was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// A toolchain on this host ran the code
    Local,
    /// The remote execution service ran the code
    Remote,
    /// The simulation engine approximated the output
    Simulated,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Local => "local",
            Strategy::Remote => "remote",
            Strategy::Simulated => "simulated",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of one submission, produced exactly once per request.
///
/// `stderr` holds user-visible error lines: compiler diagnostics and runtime
/// stderr verbatim, plus advisory notes when a fallback was taken.
/// Orchestration failures (remote transport trouble, missing toolchains) only
/// appear here as fallback explanations, never dressed up as program output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: Vec<String>,
    pub strategy: Strategy,
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            stdout: String::new(),
            stderr: Vec::new(),
            strategy,
            timed_out: false,
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_error(mut self, line: impl Into<String>) -> Self {
        self.stderr.push(line.into());
        self
    }

    /// True when execution produced no error text and did not time out
    pub fn is_clean(&self) -> bool {
        self.stderr.is_empty() && !self.timed_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Local.to_string(), "local");
        assert_eq!(Strategy::Remote.to_string(), "remote");
        assert_eq!(Strategy::Simulated.to_string(), "simulated");
    }

    #[test]
    fn test_strategy_serde_names() {
        assert_eq!(
            serde_json::to_string(&Strategy::Simulated).unwrap(),
            "\"simulated\""
        );
    }

    #[test]
    fn test_result_builders() {
        let result = ExecutionResult::new(Strategy::Local)
            .with_stdout("hi")
            .with_error("boom");
        assert_eq!(result.stdout, "hi");
        assert_eq!(result.stderr, vec!["boom".to_string()]);
        assert!(!result.is_clean());
        assert!(ExecutionResult::new(Strategy::Remote).is_clean());
    }
}
