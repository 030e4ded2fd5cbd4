use anyhow::{bail, Result};

use keepsake_core::AppConfig;

pub fn run(config: &AppConfig, init: bool, force: bool) -> Result<()> {
    let path = AppConfig::config_path();

    if init {
        if path.exists() && !force {
            bail!(
                "Configuration already exists at {}\nUse --force to overwrite it with the defaults.",
                path.display()
            );
        }
        AppConfig::default().save()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let source = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("# {}{}", path.display(), source);
    println!("# logs: {}\n", config.log_dir().display());
    print!("{}", config.to_toml()?);

    Ok(())
}
