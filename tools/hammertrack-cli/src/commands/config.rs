//! Show or write the effective configuration.

use hammertrack_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, write: bool) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);

    if write {
        let path = config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to save config: {e}"))?;
        println!();
        println!("Config written to: {}", path.display());
    } else {
        println!();
        println!("Config file: {}", config_file_path().display());
    }

    Ok(())
}
