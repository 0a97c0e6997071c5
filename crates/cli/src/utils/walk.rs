use anyhow::{Context, Result};
use cmdhub_core::TestRunnerConfig;
use cmdhub_core::discovery::extract_tests;
use cmdhub_core::types::DiscoveredTest;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const SKIPPED_DIRS: [&str; 4] = ["node_modules", "__pycache__", "target", "dist"];

/// Tests the runner accepts in one file
pub fn collect_tests_in_file(runner: &TestRunnerConfig, file: &Path) -> Result<Vec<DiscoveredTest>> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(extract_tests(runner, file, &source))
}

/// Tests the runner accepts in every matching file under `folder`
pub fn collect_tests(runner: &TestRunnerConfig, folder: &Path) -> Result<Vec<DiscoveredTest>> {
    let mut tests = Vec::new();

    for entry in WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            e.depth() == 0 || !(name.starts_with('.') || SKIPPED_DIRS.contains(&&*name))
        })
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !runner.matches_file(&name) {
            continue;
        }
        tests.extend(collect_tests_in_file(runner, entry.path())?);
    }

    debug!("Collected {} tests under {:?}", tests.len(), folder);
    Ok(tests)
}
