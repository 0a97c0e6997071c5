use anyhow::{Context, Result};

use crate::display::format_command_line;
use crate::session::{Session, require_command};

pub fn pin_command(session: &mut Session, id: &str) -> Result<()> {
    require_command(session.config(), id)?;
    if session.state.pin(id).context("Failed to save pins")? {
        println!("📌 Pinned {id}");
    } else {
        println!("{id} is already pinned");
    }
    Ok(())
}

pub fn unpin_command(session: &mut Session, id: &str) -> Result<()> {
    if session.state.unpin(id).context("Failed to save pins")? {
        println!("Unpinned {id}");
    } else {
        println!("{id} is not pinned");
    }
    Ok(())
}

pub fn pins_command(session: &Session) -> Result<()> {
    let pinned = session.state.pinned();
    if pinned.is_empty() {
        println!("No pinned commands.");
        return Ok(());
    }
    for id in pinned {
        if let Some(command) = session.config().find_command(id) {
            println!("{}", format_command_line(command, true));
        }
    }
    Ok(())
}

pub fn forget_command(session: &mut Session, key: Option<&str>) -> Result<()> {
    match key {
        Some(key) => {
            if session.state.forget(key).context("Failed to save state")? {
                println!("Forgot remembered value for {key}");
            } else {
                println!("No remembered value for {key}");
            }
        }
        None => {
            session
                .state
                .clear_remembered()
                .context("Failed to save state")?;
            println!("Forgot all remembered values");
        }
    }
    Ok(())
}
