use super::{Ecosystem, TerminalConfig, TerminalKind};
use crate::utils::glob::PatternSet;
use serde::{Deserialize, Serialize};

/// A configured external test runner, as stored in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunnerConfig {
    pub id: String,
    pub title: String,
    #[serde(default = "default_true")]
    pub activated: bool,
    pub file_type: Ecosystem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Newline-separated file name globs; empty matches every file
    #[serde(default)]
    pub file_name_pattern: String,
    /// Newline-separated test name globs; empty matches every test
    #[serde(default)]
    pub test_name_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_list: Option<String>,
    /// Command template using `$test_name`, `$executable_test_path` and friends
    pub run_test_command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_name: Option<String>,
    /// Treat every Python function as a test when no name pattern narrows it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_non_test: bool,
}

fn default_true() -> bool {
    true
}

impl TestRunnerConfig {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        file_type: Ecosystem,
        run_test_command: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            activated: true,
            file_type,
            working_directory: None,
            file_name_pattern: String::new(),
            test_name_pattern: String::new(),
            ignore_list: None,
            run_test_command: run_test_command.into(),
            terminal_name: None,
            allow_non_test: false,
        }
    }

    pub fn working_dir(&self) -> Option<&str> {
        self.working_directory
            .as_deref()
            .map(str::trim)
            .filter(|wd| !wd.is_empty())
    }

    /// Test runs go to a dedicated terminal named after the runner
    pub fn terminal_config(&self) -> TerminalConfig {
        let name = self
            .terminal_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.title);
        let mut terminal = TerminalConfig::new(TerminalKind::Dedicated).with_name(name);
        if let Some(cwd) = self.working_dir() {
            terminal = terminal.with_cwd(cwd);
        }
        terminal
    }

    /// Whether a file with this name and extension belongs to the runner
    pub fn matches_file(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        let right_type = self
            .file_type
            .extensions()
            .iter()
            .any(|ext| lower.ends_with(ext));
        right_type && PatternSet::parse(&self.file_name_pattern).matches_any(file_name)
    }

    /// Whether a discovered test name passes the name pattern and ignore list
    pub fn includes_test(&self, test_name: &str) -> bool {
        PatternSet::parse(&self.test_name_pattern).matches_any(test_name)
            && !PatternSet::parse(self.ignore_list.as_deref().unwrap_or_default())
                .excludes(test_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_deserialization_defaults() {
        let runner: TestRunnerConfig = serde_json::from_str(
            r#"{
                "id": "pytest",
                "title": "Pytest",
                "fileType": "python",
                "runTestCommand": "pytest $test_path"
            }"#,
        )
        .unwrap();

        assert!(runner.activated);
        assert!(!runner.allow_non_test);
        assert_eq!(runner.file_type, Ecosystem::Python);
        assert_eq!(runner.working_dir(), None);
    }

    #[test]
    fn test_terminal_config_for_runner() {
        let mut runner = TestRunnerConfig::new("jest", "Jest", Ecosystem::JavaScript, "npx jest");
        runner.working_directory = Some("web".to_string());

        let terminal = runner.terminal_config();
        assert_eq!(terminal.kind().unwrap(), TerminalKind::Dedicated);
        assert_eq!(terminal.display_name(), "Jest");
        assert_eq!(terminal.working_dir(), Some("web"));

        runner.terminal_name = Some("Unit tests".to_string());
        assert_eq!(runner.terminal_config().display_name(), "Unit tests");
    }

    #[test]
    fn test_file_and_test_filters() {
        let mut runner = TestRunnerConfig::new("py", "Py", Ecosystem::Python, "pytest");
        runner.file_name_pattern = "test_*.py".to_string();
        runner.ignore_list = Some("TestSlow.*\n".to_string());

        assert!(runner.matches_file("test_models.py"));
        assert!(!runner.matches_file("models.py"));
        assert!(!runner.matches_file("test_models.js"));

        assert!(runner.includes_test("TestModels.test_save"));
        assert!(!runner.includes_test("TestSlow.test_everything"));
    }
}
