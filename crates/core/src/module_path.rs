//! Module selectors for batch test runs.
//!
//! A selector names a file, a folder or one test group the way an external
//! runner expects it on its command line: a slash path for JavaScript and
//! TypeScript runners, a dotted module path for Python. Resolution never
//! fails; inputs it cannot place degrade to a best-effort string.

use crate::types::{DiscoveredTest, Ecosystem, PathStyle};
use crate::utils::path;
use std::path::Path;
use tracing::debug;

/// Computes batch selectors for one ecosystem
pub trait TestPathResolver {
    /// Selector for every test in the file of `tests[0]`
    fn resolve_file_path(
        &self,
        tests: &[DiscoveredTest],
        working_directory: Option<&str>,
    ) -> String;

    /// Selector for every test under `folder` (workspace-relative)
    fn resolve_folder_path(
        &self,
        tests: &[DiscoveredTest],
        folder: &str,
        working_directory: Option<&str>,
    ) -> String;

    /// Selector for the test group `test_case` in the file of `tests[0]`
    fn resolve_test_case_path(
        &self,
        tests: &[DiscoveredTest],
        test_case: &str,
        working_directory: Option<&str>,
    ) -> String;
}

/// Workspace facts shared by the resolvers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePathContext {
    /// Normalized forward-slash workspace root
    workspace_root: Option<String>,
    case_insensitive: bool,
}

impl ModulePathContext {
    /// Paths compare case-insensitively on Windows only
    pub fn new(workspace_root: Option<&Path>) -> Self {
        Self {
            workspace_root: workspace_root.map(|root| path::normalize(&root.to_string_lossy())),
            case_insensitive: cfg!(windows),
        }
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// `file` relative to the workspace root, or unchanged when it lies
    /// outside the workspace
    pub fn workspace_relative(&self, file: &str) -> String {
        let file = path::normalize(file);
        self.workspace_root
            .as_deref()
            .and_then(|root| path::strip_base(&file, root, self.case_insensitive))
            .map(|rest| path::strip_leading_slash(rest).to_string())
            .unwrap_or(file)
    }

    /// Extension-less module path of `file`, relative to the working
    /// directory when one is given and to the workspace root otherwise.
    /// Separators are forward slashes.
    pub fn module_path(&self, file: &Path, working_directory: Option<&str>) -> String {
        let file = path::normalize(&file.to_string_lossy());
        let working_directory = working_directory.map(str::trim).filter(|wd| !wd.is_empty());

        let Some(root) = self.workspace_root.as_deref() else {
            return path::strip_extension(&file).to_string();
        };

        let base = match working_directory {
            Some(wd) => path::join(root, wd),
            None => root.to_string(),
        };

        if let Some(rest) = path::strip_base(&file, &base, self.case_insensitive) {
            let rest = path::strip_leading_slash(rest);
            let rest = path::strip_extension(rest);
            let rest = path::strip_leading_dot_slash(rest);
            let rest = path::strip_leading_dot(rest);
            return path::strip_leading_slash(rest).to_string();
        }

        debug!(
            "{} is outside {}, falling back to the workspace-relative path",
            file, base
        );
        let relative = self.workspace_relative(&file);
        let mut module = path::strip_extension(&relative).trim_start_matches('/');
        if let Some(rest) = module.strip_prefix("./") {
            module = rest.trim_start_matches('/');
        }

        let mut module = module.to_string();
        if let Some(wd) = working_directory {
            let wd = path::to_forward_slashes(wd);
            let wd = wd.trim_matches('/');
            let trimmed = module.trim_matches('/');
            if let Some(rest) = trimmed
                .strip_prefix(wd)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                module = rest.to_string();
            } else if trimmed == wd {
                module = String::new();
            }
        }

        let module = path::strip_leading_dot(&module);
        path::strip_leading_slash(module).to_string()
    }
}

/// Python-style resolver: `tests.test_file`, `tests.test_file.TestCase`
#[derive(Debug, Clone)]
pub struct DottedModuleResolver {
    context: ModulePathContext,
}

impl DottedModuleResolver {
    pub fn new(context: ModulePathContext) -> Self {
        Self { context }
    }

    fn dotted_module(&self, file: &Path, working_directory: Option<&str>) -> String {
        let module = self.context.module_path(file, working_directory);
        path::trim_leading_slashes_and_dots(&module).replace('/', ".")
    }
}

impl TestPathResolver for DottedModuleResolver {
    fn resolve_file_path(&self, tests: &[DiscoveredTest], working_directory: Option<&str>) -> String {
        let Some(first) = tests.first() else {
            debug!("No tests given, file selector is empty");
            return String::new();
        };
        let selector = self.dotted_module(&first.file, working_directory);
        debug!(
            "Dotted file selector for {:?} (working directory {:?}): {}",
            first.file, working_directory, selector
        );
        selector
    }

    fn resolve_folder_path(
        &self,
        tests: &[DiscoveredTest],
        folder: &str,
        _working_directory: Option<&str>,
    ) -> String {
        if tests.is_empty() {
            return String::new();
        }
        path::separators_to_dots(folder)
    }

    fn resolve_test_case_path(
        &self,
        tests: &[DiscoveredTest],
        test_case: &str,
        working_directory: Option<&str>,
    ) -> String {
        let Some(first) = tests.first() else {
            return String::new();
        };
        let module = self.dotted_module(&first.file, working_directory);
        format!("{module}.{test_case}")
    }
}

/// JavaScript/TypeScript-style resolver: `tests/test_file.test.js`
#[derive(Debug, Clone)]
pub struct SlashPathResolver {
    context: ModulePathContext,
}

impl SlashPathResolver {
    pub fn new(context: ModulePathContext) -> Self {
        Self { context }
    }
}

impl TestPathResolver for SlashPathResolver {
    fn resolve_file_path(&self, tests: &[DiscoveredTest], working_directory: Option<&str>) -> String {
        let Some(first) = tests.first() else {
            return String::new();
        };
        let file = path::normalize(&first.file.to_string_lossy());
        let working_directory = working_directory.map(str::trim).filter(|wd| !wd.is_empty());

        match (working_directory, self.context.workspace_root.as_deref()) {
            (Some(wd), Some(root)) => {
                let base = path::join(root, wd);
                path::relative(&base, &file, self.context.case_insensitive)
            }
            _ => self.context.workspace_relative(&file),
        }
    }

    fn resolve_folder_path(
        &self,
        _tests: &[DiscoveredTest],
        folder: &str,
        _working_directory: Option<&str>,
    ) -> String {
        path::to_forward_slashes(folder)
    }

    /// Runners in this style filter by test name, so the file selector is
    /// returned unchanged
    fn resolve_test_case_path(
        &self,
        tests: &[DiscoveredTest],
        _test_case: &str,
        working_directory: Option<&str>,
    ) -> String {
        self.resolve_file_path(tests, working_directory)
    }
}

/// Resolver for the path style of `ecosystem`
pub fn resolver_for(ecosystem: Ecosystem, context: ModulePathContext) -> Box<dyn TestPathResolver> {
    match ecosystem.path_style() {
        PathStyle::Dotted => Box::new(DottedModuleResolver::new(context)),
        PathStyle::Slash => Box::new(SlashPathResolver::new(context)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ModulePathContext {
        ModulePathContext::new(Some(Path::new("/ws"))).with_case_insensitive(false)
    }

    fn tests_in(file: &str) -> Vec<DiscoveredTest> {
        vec![DiscoveredTest::new(file, "test_one", 4)]
    }

    #[test]
    fn test_dotted_file_selector_relative_to_working_directory() {
        let resolver = DottedModuleResolver::new(context());
        let tests = tests_in("/ws/flowchart/tests/test_file.py");

        assert_eq!(
            resolver.resolve_file_path(&tests, Some("flowchart")),
            "tests.test_file"
        );
        assert_eq!(
            resolver.resolve_file_path(&tests, None),
            "flowchart.tests.test_file"
        );
        assert_eq!(
            resolver.resolve_test_case_path(&tests, "TestParser", Some("flowchart")),
            "tests.test_file.TestParser"
        );
    }

    #[test]
    fn test_slash_file_selector_keeps_extension() {
        let resolver = SlashPathResolver::new(context());
        let tests = tests_in("/ws/flowchart/tests/test_file.py");

        assert_eq!(
            resolver.resolve_file_path(&tests, Some("flowchart")),
            "tests/test_file.py"
        );
        assert_eq!(
            resolver.resolve_file_path(&tests, None),
            "flowchart/tests/test_file.py"
        );
        assert_eq!(
            resolver.resolve_test_case_path(&tests, "Parser", Some("flowchart")),
            "tests/test_file.py"
        );
    }

    #[test]
    fn test_slash_file_selector_outside_working_directory() {
        let resolver = SlashPathResolver::new(context());
        let tests = tests_in("/ws/shared/util.test.ts");

        assert_eq!(
            resolver.resolve_file_path(&tests, Some("web")),
            "../shared/util.test.ts"
        );
    }

    #[test]
    fn test_folder_selectors() {
        let tests = tests_in("/ws/flowchart/tests/test_file.py");
        let dotted = DottedModuleResolver::new(context());
        let slash = SlashPathResolver::new(context());

        assert_eq!(
            dotted.resolve_folder_path(&tests, "flowchart/tests", None),
            "flowchart.tests"
        );
        assert_eq!(
            dotted.resolve_folder_path(&tests, "flowchart\\tests", None),
            "flowchart.tests"
        );
        assert_eq!(
            slash.resolve_folder_path(&tests, "flowchart\\tests", None),
            "flowchart/tests"
        );
        assert_eq!(dotted.resolve_folder_path(&[], "flowchart/tests", None), "");
    }

    #[test]
    fn test_empty_tests_yield_empty_selectors() {
        let dotted = DottedModuleResolver::new(context());
        let slash = SlashPathResolver::new(context());

        assert_eq!(dotted.resolve_file_path(&[], None), "");
        assert_eq!(dotted.resolve_test_case_path(&[], "Case", None), "");
        assert_eq!(slash.resolve_file_path(&[], Some("web")), "");
    }

    #[test]
    fn test_working_directory_is_stripped_in_fallback() {
        let resolver = DottedModuleResolver::new(context());
        let tests = tests_in("src/flowchart/tests/test_file.py");

        assert_eq!(
            resolver.resolve_file_path(&tests, Some("src")),
            "flowchart.tests.test_file"
        );
        assert_eq!(
            context().module_path(Path::new("src/app.py"), Some("src/app")),
            ""
        );
    }

    #[test]
    fn test_file_outside_working_directory_falls_back_to_workspace_path() {
        let resolver = DottedModuleResolver::new(context());
        let tests = tests_in("/ws/flowchart/tests/test_file.py");

        assert_eq!(
            resolver.resolve_file_path(&tests, Some("other")),
            "flowchart.tests.test_file"
        );
    }

    #[test]
    fn test_working_directory_prefix_needs_segment_boundary() {
        let resolver = DottedModuleResolver::new(context());
        let tests = tests_in("/ws/flowchart2/tests/test_file.py");

        assert_eq!(
            resolver.resolve_file_path(&tests, Some("flowchart")),
            "flowchart2.tests.test_file"
        );
    }

    #[test]
    fn test_case_insensitive_comparison_keeps_original_case() {
        let context = ModulePathContext::new(Some(Path::new("C:\\Work\\App")))
            .with_case_insensitive(true);
        let resolver = DottedModuleResolver::new(context);
        let tests = tests_in("c:\\work\\app\\Flowchart\\Tests\\test_file.py");

        assert_eq!(
            resolver.resolve_file_path(&tests, None),
            "Flowchart.Tests.test_file"
        );
    }

    #[test]
    fn test_no_workspace_root() {
        let resolver = DottedModuleResolver::new(ModulePathContext::new(None));
        let tests = tests_in("pkg/tests/test_mod.py");
        assert_eq!(resolver.resolve_file_path(&tests, None), "pkg.tests.test_mod");
    }

    #[test]
    fn test_resolver_for_ecosystem() {
        let tests = tests_in("/ws/app/a.test.js");
        let resolver = resolver_for(Ecosystem::JavaScript, context());
        assert_eq!(resolver.resolve_file_path(&tests, Some("app")), "a.test.js");

        let resolver = resolver_for(Ecosystem::Python, context());
        assert_eq!(resolver.resolve_file_path(&tests, Some("app")), "a.test");
    }
}
