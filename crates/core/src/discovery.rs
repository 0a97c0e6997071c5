//! Line-based test discovery for the supported ecosystems.
//!
//! Discovery scans source text; it never imports or executes the code under
//! test. Python tests are qualified with their innermost enclosing class
//! (`TestCase.test_method`).

use crate::types::{DiscoveredTest, Ecosystem, TestRunnerConfig};
use crate::utils::glob::PatternSet;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static PY_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)class\s+(\w+)").expect("class pattern is valid"));
static PY_TEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*)def\s+(test_\w+|test\w+\s*\()").expect("test def pattern is valid")
});
static PY_ANY_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)def\s+(\w+)\s*\(").expect("def pattern is valid"));
static JS_TEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:it|test)\s*\(\s*['"`]([^'"`]+)['"`]"#).expect("js test pattern is valid")
});

/// Every test in `source` that the runner's name pattern and ignore list admit
pub fn extract_tests(runner: &TestRunnerConfig, file: &Path, source: &str) -> Vec<DiscoveredTest> {
    let tests = match runner.file_type {
        Ecosystem::Python => extract_python(runner, file, source),
        Ecosystem::JavaScript | Ecosystem::TypeScript => extract_javascript(runner, file, source),
    };
    debug!("Discovered {} tests in {:?}", tests.len(), file);
    tests
}

fn extract_python(runner: &TestRunnerConfig, file: &Path, source: &str) -> Vec<DiscoveredTest> {
    let lines: Vec<&str> = source.lines().collect();
    let match_all =
        runner.allow_non_test && PatternSet::parse(&runner.test_name_pattern).is_empty();

    // (first line, end line exclusive, indent, name)
    let classes: Vec<(usize, usize, usize, &str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            PY_CLASS.captures(line).map(|caps| {
                let indent = caps.get(1).map_or(0, |m| m.as_str().len());
                let name = caps.get(2).map_or("", |m| m.as_str());
                (index, block_end(&lines, index, indent), indent, name)
            })
        })
        .collect();

    let mut tests = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let caps = PY_TEST
            .captures(line)
            .or_else(|| match_all.then(|| PY_ANY_DEF.captures(line)).flatten());
        let Some(caps) = caps else {
            continue;
        };
        let indent = caps.get(1).map_or(0, |m| m.as_str().len());
        let method = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim_end_matches('(')
            .trim_end();

        let enclosing = classes
            .iter()
            .filter(|(start, end, class_indent, _)| {
                (*start + 1..*end).contains(&index) && indent > *class_indent
            })
            .max_by_key(|(start, _, class_indent, _)| (*class_indent, *start));
        let label = match enclosing {
            Some((_, _, _, class)) => format!("{class}.{method}"),
            None => method.to_string(),
        };

        if runner.includes_test(&label) {
            tests.push(DiscoveredTest::new(file, label, index as u32));
        }
    }
    tests
}

/// Line after the last one belonging to the block opened at `start`
fn block_end(lines: &[&str], start: usize, indent: usize) -> usize {
    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| {
            let trimmed = line.trim_start();
            !trimmed.is_empty()
                && !trimmed.starts_with('#')
                && line.len() - trimmed.len() <= indent
        })
        .map_or(lines.len(), |(index, _)| index)
}

fn extract_javascript(runner: &TestRunnerConfig, file: &Path, source: &str) -> Vec<DiscoveredTest> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let name = JS_TEST.captures(line)?.get(1)?.as_str();
            runner
                .includes_test(name)
                .then(|| DiscoveredTest::new(file, name, index as u32))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTHON_SOURCE: &str = r#"
import unittest

def helper():
    pass

def test_top_level():
    assert True

class TestParser(unittest.TestCase):
    def setUp(self):
        pass

    def test_parse(self):
        pass

    def testLegacy(self):
        pass

class TestSlow(unittest.TestCase):
    def test_everything(self):
        pass
"#;

    fn labels(tests: &[DiscoveredTest]) -> Vec<&str> {
        tests.iter().map(|t| t.label.as_str()).collect()
    }

    #[test]
    fn test_python_tests_are_qualified_by_class() {
        let runner = TestRunnerConfig::new("py", "Py", Ecosystem::Python, "pytest");
        let tests = extract_tests(&runner, Path::new("/ws/tests/test_parser.py"), PYTHON_SOURCE);

        assert_eq!(
            labels(&tests),
            vec![
                "test_top_level",
                "TestParser.test_parse",
                "TestParser.testLegacy",
                "TestSlow.test_everything"
            ]
        );
        assert_eq!(tests[1].line, 13);
    }

    #[test]
    fn test_python_class_scope_ends_at_dedent() {
        let runner = TestRunnerConfig::new("py", "Py", Ecosystem::Python, "pytest");
        let source = "class TestA:\n    def test_one(self):\n        pass\n\n    # trailing comment\ndef outer():\n    def test_inner():\n        pass\n";
        let tests = extract_tests(&runner, Path::new("t.py"), source);

        assert_eq!(labels(&tests), vec!["TestA.test_one", "test_inner"]);
    }

    #[test]
    fn test_python_ignore_list_and_all_functions() {
        let mut runner = TestRunnerConfig::new("py", "Py", Ecosystem::Python, "pytest");
        runner.ignore_list = Some("TestSlow.*".to_string());
        runner.allow_non_test = true;
        let tests = extract_tests(&runner, Path::new("t.py"), PYTHON_SOURCE);

        assert_eq!(
            labels(&tests),
            vec![
                "helper",
                "test_top_level",
                "TestParser.setUp",
                "TestParser.test_parse",
                "TestParser.testLegacy"
            ]
        );
    }

    #[test]
    fn test_javascript_tests() {
        let mut runner = TestRunnerConfig::new("jest", "Jest", Ecosystem::TypeScript, "npx jest");
        runner.test_name_pattern = "*renders*".to_string();
        let source = "describe('App', () => {\n  it('renders header', () => {});\n  test(\"handles click\", () => {});\n  it(`renders footer`, () => {});\n});\n";
        let tests = extract_tests(&runner, Path::new("app.test.ts"), source);

        assert_eq!(labels(&tests), vec!["renders header", "renders footer"]);
        assert_eq!(tests[0].line, 1);
    }
}
