//! Test-command templating for configured test runners.
//!
//! Runner templates use their own small variable set (`$test_name`,
//! `$executable_test_path:slash`, ...), distinct from command placeholders.

use crate::error::{Error, Result};
use crate::module_path::ModulePathContext;
use crate::types::{PathStyle, TestRunnerConfig};
use crate::utils::path;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

pub const TEST_VARIABLES: [&str; 8] = [
    "test_name",
    "test_testcase",
    "test_file",
    "test_path",
    "test_extension",
    "executable_test_path",
    "file",
    "line",
];

pub const TEST_FORMATS: [&str; 3] = ["dot", "slash", "hyphen"];

static TEST_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?P<name>\w+)(?::(?P<format>\w+))?").expect("test variable pattern is valid")
});

/// Values for one test run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestInvocation {
    pub test_name: String,
    /// Text before the first `.` of the test name
    pub test_testcase: String,
    /// File name without extension
    pub test_file: String,
    /// Workspace-relative path without extension
    pub test_path: String,
    /// Extension with its leading dot
    pub test_extension: String,
    pub executable_test_path: String,
    pub file: String,
    pub line: String,
    /// Render a format-less `$executable_test_path` in dot form
    pub dotted_executable_path: bool,
}

impl TestInvocation {
    /// Derive every replacement for running `test_name` from `file`
    pub fn build(
        runner: &TestRunnerConfig,
        workspace_root: Option<&Path>,
        file: Option<&Path>,
        test_name: &str,
        line: Option<u32>,
    ) -> Self {
        let test_testcase = match test_name.find('.') {
            Some(dot) if dot > 0 => test_name[..dot].to_string(),
            _ => String::new(),
        };

        let mut invocation = Self {
            test_name: test_name.to_string(),
            test_testcase,
            line: line.map(|l| l.to_string()).unwrap_or_default(),
            dotted_executable_path: true,
            ..Default::default()
        };

        let Some(file) = file else {
            return invocation;
        };

        let normalized = path::to_forward_slashes(&file.to_string_lossy());
        let context = ModulePathContext::new(workspace_root);
        let module = context.module_path(file, runner.working_dir());

        invocation.test_extension = path::extension(&normalized).to_string();
        invocation.test_file = path::strip_extension(path::file_name(&normalized)).to_string();
        invocation.test_path = path::strip_extension(&context.workspace_relative(&normalized)).to_string();
        invocation.executable_test_path = format!("{}.{}", module.replace('/', "."), test_name);
        invocation.file = file.display().to_string();

        debug!(
            "Test invocation for '{}': module {}, executable path {}",
            test_name, module, invocation.executable_test_path
        );
        invocation
    }

    /// Invocation for a batch selector from the module path resolver
    pub fn batch(selector: &str, style: PathStyle) -> Self {
        Self {
            test_name: selector.to_string(),
            executable_test_path: selector.to_string(),
            dotted_executable_path: style == PathStyle::Dotted,
            ..Default::default()
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        let value = match name {
            "test_name" => &self.test_name,
            "test_testcase" => &self.test_testcase,
            "test_file" => &self.test_file,
            "test_path" => &self.test_path,
            "test_extension" => &self.test_extension,
            "executable_test_path" => &self.executable_test_path,
            "file" => &self.file,
            "line" => &self.line,
            _ => return None,
        };
        Some(value)
    }
}

/// Reject unknown variables and unknown formats.
///
/// The first unknown format fails immediately; unknown variables are
/// collected and reported together.
pub fn validate_test_command(template: &str) -> Result<()> {
    let mut unknown: Vec<&str> = Vec::new();

    for caps in TEST_VARIABLE.captures_iter(template) {
        let name = caps.name("name").map(|m| m.as_str()).unwrap_or_default();
        if !TEST_VARIABLES.contains(&name) {
            if !unknown.contains(&name) {
                unknown.push(name);
            }
            continue;
        }
        if let Some(format) = caps.name("format") {
            if !TEST_FORMATS.contains(&format.as_str()) {
                return Err(Error::InvalidTestFormat {
                    variable: name.to_string(),
                    format: format.as_str().to_string(),
                });
            }
        }
    }

    if unknown.is_empty() {
        return Ok(());
    }

    let list = |names: &[&str]| {
        names
            .iter()
            .map(|n| format!("${n}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    Err(Error::InvalidTestVariable(format!(
        "{}. Available variables: {}",
        list(&unknown),
        list(&TEST_VARIABLES)
    )))
}

/// Validate and render `template` with the invocation's values
pub fn render_test_command(template: &str, invocation: &TestInvocation) -> Result<String> {
    validate_test_command(template)?;

    let rendered = TEST_VARIABLE.replace_all(template, |caps: &Captures<'_>| {
        let whole = &caps[0];
        let name = &caps["name"];
        let Some(value) = invocation.value(name) else {
            return whole.to_string();
        };

        if let Some(format) = caps.name("format") {
            return apply_format(value, format.as_str());
        }

        // `$name:` with nothing usable after the colon is left alone
        let end = caps.get(0).map(|m| m.end()).unwrap_or_default();
        if template[end..].starts_with(':') {
            return whole.to_string();
        }

        if name == "executable_test_path" && invocation.dotted_executable_path {
            apply_format(value, "dot")
        } else {
            value.to_string()
        }
    });

    Ok(rendered.into_owned())
}

fn apply_format(value: &str, format: &str) -> String {
    match format {
        "dot" => value.replace(['/', '\\'], "."),
        "slash" => value.replace('\\', "/"),
        "hyphen" => value.replace(['/', '\\', '.'], "-"),
        _ => value.to_string(),
    }
}

impl TestRunnerConfig {
    /// Command for running one test from `file`
    pub fn test_command(
        &self,
        workspace_root: Option<&Path>,
        file: Option<&Path>,
        test_name: &str,
        line: Option<u32>,
    ) -> Result<String> {
        let invocation = TestInvocation::build(self, workspace_root, file, test_name, line);
        render_test_command(&self.run_test_command, &invocation)
    }

    /// Command for a file, folder or test-case selector
    pub fn batch_command(&self, selector: &str) -> Result<String> {
        let invocation = TestInvocation::batch(selector, self.file_type.path_style());
        render_test_command(&self.run_test_command, &invocation)
    }
}
