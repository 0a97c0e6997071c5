use cmdhub_core::catalog::VariableSummary;
use cmdhub_core::Command;

pub fn print_command_details(command: &Command, preview: &str) {
    println!("🔧 {} ({})", command.label, command.id);
    if let Some(description) = &command.description {
        println!("   {description}");
    }
    println!("   📝 Template: {}", command.command);
    println!("   🚀 Preview:  {preview}");

    let terminal = &command.terminal;
    println!(
        "   🖥  Terminal: {} '{}'",
        terminal.terminal_type,
        terminal.display_name()
    );
    if let Some(cwd) = terminal.working_dir() {
        println!("   📂 Working directory: {cwd}");
    }

    if !command.variables.is_empty() {
        println!("   🔤 Variables:");
        for variable in &command.variables {
            let label = variable.label.as_deref().unwrap_or(&variable.key);
            let remember = if variable.remember { " (remembered)" } else { "" };
            println!(
                "      • {} [{}] {label}{remember}",
                variable.key, variable.variable_type
            );
        }
    }
}

pub fn print_variables(variables: &[VariableSummary]) {
    if variables.is_empty() {
        println!("No shared variables or lists configured.");
        return;
    }

    for variable in variables {
        println!("{} ({}) - {}", variable.key, variable.variable_type, variable.label);
        if let Some(description) = &variable.description {
            println!("   {description}");
        }
        if let Some(value) = &variable.value {
            println!("   = {value}");
        }
        for option in &variable.options {
            println!("   • {option}");
        }
    }
}
