//! `covidash config init`

use crate::cli::ConfigInitArgs;
use crate::config::CovidashConfig;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../covidash.example.toml");

/// Write the example configuration and return a short summary of what it
/// points at.
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<String, Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "{} already exists. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.output, EXAMPLE_CONFIG)?;

    let defaults = CovidashConfig::default();
    Ok(format!(
        "✓ Configuration file created: {}\n  Data directory: {}\n  Run `covidash fetch -c {}` to download the datasets.",
        args.output.display(),
        defaults.data.dir.display(),
        args.output.display()
    ))
}
