use std::path::Path;

use anyhow::Result;

use crate::config::BatonConfig;

pub fn show_config(config: &BatonConfig, save: Option<&Path>) -> Result<()> {
    println!("{}", toml::to_string_pretty(&config.redacted())?);

    if let Some(path) = save {
        config.save_to_file(path)?;
        println!("💾 Saved configuration to {}", path.display());
    }
    Ok(())
}
