use anyhow::{Context, Result};
use cmdhub_core::ConfigManager;
use cmdhub_core::config::CONFIG_FILE_NAMES;
use std::env;
use std::path::Path;
use tracing::info;

pub fn init_command(config: Option<&Path>, force: bool) -> Result<()> {
    let config_path = match config {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()
            .context("Failed to get current directory")?
            .join(CONFIG_FILE_NAMES[0]),
    };

    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    let manager = ConfigManager::write_default(&config_path, force)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Wrote starter config to {:?}", manager.path());

    println!("✅ Created config: {}", config_path.display());
    println!("\n📌 Try:");
    println!("   cmdhub list");
    println!("   cmdhub run example-echo");
    Ok(())
}
