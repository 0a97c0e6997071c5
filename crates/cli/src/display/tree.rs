use cmdhub_core::{Command, Folder, HubConfig, StateStore};

/// One listing line: id, label and the pin marker
pub fn format_command_line(command: &Command, pinned: bool) -> String {
    let icon = command.icon.as_deref().unwrap_or("▶");
    let pin = if pinned { " 📌" } else { "" };
    format!("{icon} {:<24} {}{pin}", command.id, command.label)
}

/// Pinned commands first, then every folder with its subfolders indented
pub fn print_command_tree(config: &HubConfig, state: &StateStore) {
    let pinned: Vec<&Command> = state
        .pinned()
        .iter()
        .filter_map(|id| config.find_command(id))
        .collect();
    if !pinned.is_empty() {
        println!("📌 Pinned");
        for command in pinned {
            println!("   {}", format_command_line(command, true));
        }
        println!();
    }

    if config.folders.is_empty() {
        println!("No commands configured. Run `cmdhub init` to create a starter config.");
        return;
    }
    for folder in &config.folders {
        print_folder(folder, state, 0);
    }
}

fn print_folder(folder: &Folder, state: &StateStore, depth: usize) {
    let indent = "   ".repeat(depth);
    let icon = folder.icon.as_deref().unwrap_or("📁");
    match &folder.description {
        Some(description) => println!("{indent}{icon} {} - {description}", folder.name),
        None => println!("{indent}{icon} {}", folder.name),
    }

    for command in &folder.commands {
        println!(
            "{indent}   {}",
            format_command_line(command, state.is_pinned(&command.id))
        );
    }
    for subfolder in &folder.subfolders {
        print_folder(subfolder, state, depth + 1);
    }
}
