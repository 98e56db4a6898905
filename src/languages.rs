//! Supported languages and their toolchain facts
//!
//! The submission language is a closed enum: every variant is bound at
//! compile time to its adapter shape, toolchain binaries and remote-service
//! id. The only string handling is the initial parse at the request
//! boundary; past that point no code branches on language names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language this service can execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Java,
    C,
    Cpp,
}

/// Every supported language, in the order user-facing messages list them
pub const ALL: [Language; 5] = [
    Language::Python,
    Language::Javascript,
    Language::Java,
    Language::C,
    Language::Cpp,
];

impl Language {
    /// Canonical lowercase name used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }

    /// Human-facing label used in advisories and simulation placeholders
    pub fn label(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Javascript => "JavaScript",
            Language::Java => "Java",
            Language::C => "C",
            Language::Cpp => "C++",
        }
    }

    /// Name of the source file written into the workspace.
    ///
    /// Java is the exception: the compiled runner names the file after the
    /// declared public class, discovered by scanning the source.
    pub fn source_file(&self) -> &'static str {
        match self {
            Language::Python => "main.py",
            Language::Javascript => "main.js",
            Language::Java => "Main.java",
            Language::C => "main.c",
            Language::Cpp => "main.cpp",
        }
    }

    /// Binaries that must all be reachable on PATH for local execution
    pub fn toolchain(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["python3"],
            Language::Javascript => &["node"],
            Language::Java => &["javac", "java"],
            Language::C => &["gcc"],
            Language::Cpp => &["g++"],
        }
    }

    /// The interpreter for script languages, the compiler for compiled ones
    pub fn primary_tool(&self) -> &'static str {
        self.toolchain()[0]
    }

    /// Whether execution needs a separate compile phase
    pub fn is_compiled(&self) -> bool {
        matches!(self, Language::Java | Language::C | Language::Cpp)
    }

    /// Numeric id the remote execution service assigns to this language
    pub fn remote_id(&self) -> u32 {
        match self {
            Language::Python => 71,     // Python 3
            Language::Javascript => 63, // Node.js
            Language::Java => 62,
            Language::Cpp => 54, // C++ (GCC)
            Language::C => 50,   // C (GCC)
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "javascript" => Ok(Language::Javascript),
            "java" => Ok(Language::Java),
            "c" => Ok(Language::C),
            "cpp" => Ok(Language::Cpp),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

/// A language identifier outside the supported set.
///
/// Displays as the single user-facing error line; the companion text for
/// the output field comes from [`UnsupportedLanguage::availability_note`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLanguage(pub String);

impl UnsupportedLanguage {
    pub fn availability_note(&self) -> String {
        format!(
            "Unsupported language: {}. Available languages are: python, javascript, java, c, and cpp.",
            self.0
        )
    }
}

impl fmt::Display for UnsupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Language '{}' is not supported.", self.0)
    }
}

impl std::error::Error for UnsupportedLanguage {}
