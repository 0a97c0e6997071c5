use crate::impl_case_insensitive_deserialize;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A test found by discovery; read-only input to the module path resolvers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTest {
    pub label: String,
    pub file: PathBuf,
    /// Zero-based line of the test declaration
    pub line: u32,
}

impl DiscoveredTest {
    pub fn new(file: impl Into<PathBuf>, label: impl Into<String>, line: u32) -> Self {
        Self {
            label: label.into(),
            file: file.into(),
            line,
        }
    }
}

/// Source ecosystem a test runner targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    JavaScript,
    TypeScript,
    Python,
}

impl_case_insensitive_deserialize!(
    Ecosystem,
    JavaScript => "javascript" | "js",
    TypeScript => "typescript" | "ts",
    Python => "python" | "py"
);

impl Ecosystem {
    pub fn path_style(&self) -> PathStyle {
        match self {
            Ecosystem::Python => PathStyle::Dotted,
            Ecosystem::JavaScript | Ecosystem::TypeScript => PathStyle::Slash,
        }
    }

    /// File extensions (lowercase, with dot) belonging to the ecosystem
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Ecosystem::JavaScript => &[".js", ".jsx", ".mjs", ".cjs"],
            Ecosystem::TypeScript => &[".ts", ".tsx", ".mts", ".cts"],
            Ecosystem::Python => &[".py"],
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ecosystem::JavaScript => f.write_str("javascript"),
            Ecosystem::TypeScript => f.write_str("typescript"),
            Ecosystem::Python => f.write_str("python"),
        }
    }
}

/// How an ecosystem names modules on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// `tests/test_file.test.js`
    Slash,
    /// `tests.test_file`
    Dotted,
}
