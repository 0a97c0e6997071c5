use anyhow::Result;

use crate::display::{print_command_details, print_command_tree, print_variables};
use crate::session::{Session, require_command};

pub fn list_command(session: &Session) -> Result<()> {
    print_command_tree(session.config(), &session.state);
    Ok(())
}

pub fn vars_command(session: &Session) -> Result<()> {
    print_variables(&session.config().shared_catalog().available());
    Ok(())
}

pub fn show_command(session: &Session, id: &str) -> Result<()> {
    let command = require_command(session.config(), id)?;
    let preview = session
        .executor(None, true)
        .preview(command, session.config(), &session.state);
    print_command_details(command, &preview);
    Ok(())
}
