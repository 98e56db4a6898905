//! Toolchain probe
//!
//! Answers one question: is a given interpreter or compiler reachable on
//! this host right now? Absence of a tool is a normal `false`, never an
//! error. Nothing is cached; hosts may gain or lose toolchains between
//! submissions, and a probe is a single PATH walk.

use std::env;
use std::path::Path;

/// Check whether `tool` resolves to an executable on the current PATH.
pub fn available(tool: &str) -> bool {
    if tool.is_empty() {
        return false;
    }
    let path = env::var_os("PATH").unwrap_or_default();
    search_path(env::split_paths(&path), tool)
}

/// Check whether every binary in `tools` is available.
///
/// Languages with a split toolchain (javac + java) need all of them.
pub fn all_available(tools: &[&str]) -> bool {
    tools.iter().all(|tool| available(tool))
}

/// Walk an explicit list of directories looking for an executable `tool`.
/// Split out from [`available`] so tests can supply their own directories
/// instead of mutating the process environment.
pub fn search_path<I, P>(dirs: I, tool: &str) -> bool
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    dirs.into_iter()
        .any(|dir| is_executable(&dir.as_ref().join(tool)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
