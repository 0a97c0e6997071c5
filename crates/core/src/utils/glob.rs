//! Newline-separated wildcard pattern sets (`*` and `?`, case-insensitive)

use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    matchers: Vec<Regex>,
}

impl PatternSet {
    /// Parse one pattern per line; blank lines are skipped
    pub fn parse(patterns: &str) -> Self {
        let matchers = patterns
            .lines()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .filter_map(pattern_to_regex)
            .collect();
        Self { matchers }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// An empty set matches everything
    pub fn matches_any(&self, value: &str) -> bool {
        self.is_empty() || self.matchers.iter().any(|re| re.is_match(value))
    }

    /// Like [`matches_any`](Self::matches_any) but an empty set matches nothing,
    /// which is what ignore lists need.
    pub fn excludes(&self, value: &str) -> bool {
        !self.is_empty() && self.matchers.iter().any(|re| re.is_match(value))
    }
}

fn pattern_to_regex(pattern: &str) -> Option<Regex> {
    let mut body = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        match c {
            '*' => body.push_str(".*"),
            '?' => body.push('.'),
            other => body.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        let set = PatternSet::parse("test_*.py\n*_test.py\n");
        assert!(set.matches_any("test_file.py"));
        assert!(set.matches_any("TEST_FILE.PY"));
        assert!(set.matches_any("models_test.py"));
        assert!(!set.matches_any("models.py"));
    }

    #[test]
    fn test_single_character_wildcard() {
        let set = PatternSet::parse("test_?.py");
        assert!(set.matches_any("test_a.py"));
        assert!(!set.matches_any("test_ab.py"));
    }

    #[test]
    fn test_regex_characters_are_literal() {
        let set = PatternSet::parse("a+b(1).spec.ts");
        assert!(set.matches_any("a+b(1).spec.ts"));
        assert!(!set.matches_any("aab(1)xspec.ts"));
    }

    #[test]
    fn test_empty_sets() {
        let set = PatternSet::parse("\n  \n");
        assert!(set.is_empty());
        assert!(set.matches_any("anything"));
        assert!(!set.excludes("anything"));
    }
}
