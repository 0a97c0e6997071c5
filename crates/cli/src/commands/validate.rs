use anyhow::{Result, bail};
use cmdhub_core::config::validate;

use crate::session::Session;

pub fn validate_command(session: &Session) -> Result<()> {
    let issues = validate(session.config());
    if issues.is_empty() {
        println!(
            "✅ {} is valid ({} commands, {} test runners)",
            session.manager.path().display(),
            session.config().command_ids().len(),
            session.config().test_runners.len()
        );
        return Ok(());
    }

    for issue in &issues {
        println!("❌ {issue}");
    }
    bail!("{} problem(s) found in {}", issues.len(), session.manager.path().display())
}
