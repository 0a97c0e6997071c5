use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::{debug, info};

use crate::interaction::TerminalInteraction;
use crate::session::{Session, require_command, resolve_path};

/// Run `ids` in order through one executor, so dedicated terminals are
/// shared between them. A cancelled prompt stops the sequence quietly.
pub fn run_command(
    session: &mut Session,
    ids: &[String],
    dry_run: bool,
    active_file: Option<&Path>,
) -> Result<()> {
    let active_file = active_file.map(resolve_path).transpose()?;
    let mut interaction =
        TerminalInteraction::new().context("Failed to start the line editor")?;
    let mut executor = session.executor(active_file, dry_run);

    for id in ids {
        let command = require_command(session.manager.config(), id)?;
        debug!("Running {} ({})", id, command.command);

        let result = executor.execute(
            command,
            session.manager.config(),
            &mut interaction,
            &mut session.state,
        );

        if result.cancelled {
            println!("Cancelled: {id}");
            return Ok(());
        }
        if !result.success {
            let error = result.error.unwrap_or_default();
            bail!("Command '{id}' failed: {error}");
        }
        if let Some(final_command) = &result.command {
            info!("Dispatched '{}': {}", id, final_command);
        }
    }

    Ok(())
}
