//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{StagingError, StagingResult};
use console::style;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> StagingResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> StagingResult<()> {
    let toml = toml::to_string_pretty(config)?;
    println!("{}", toml);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> StagingResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        eprintln!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("!").yellow(),
            path.display()
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized: {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

/// Set one key in the file `manager` owns
///
/// Starts from that file alone, never the merged view, so local
/// overrides stay local.
async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> StagingResult<()> {
    let mut config = manager.load().await?;
    apply(&mut config, key, value)?;
    config
        .staging
        .validate()
        .map_err(|e| StagingError::User(e.to_string()))?;

    manager.save(&config).await?;
    println!("{} Set {} = {}", style("✓").green(), key, value);

    Ok(())
}

/// Apply a dot-separated `key = value` to `config`
fn apply(config: &mut Config, key: &str, value: &str) -> StagingResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,

        ["staging", "dir"] => config.staging.dir = value.to_string(),
        ["staging", "inherit_perms"] => config.staging.inherit_perms = parse_bool(value)?,
        ["staging", "tmp_prefix"] => config.staging.tmp_prefix = value.to_string(),
        ["staging", "id_seed"] => config.staging.id_seed = parse_u64(value)?,
        ["staging", "execution_prefix"] => config.staging.execution_prefix = value.to_string(),
        ["staging", "view_schemes"] => {
            config.staging.view_schemes = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        _ => {
            return Err(StagingError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

const VALID_KEYS: &[&str] = &[
    "general.verbose",
    "general.log_format",
    "staging.dir",
    "staging.inherit_perms",
    "staging.tmp_prefix",
    "staging.id_seed",
    "staging.execution_prefix",
    "staging.view_schemes",
];

fn parse_bool(value: &str) -> StagingResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(StagingError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u64(value: &str) -> StagingResult<u64> {
    value
        .parse()
        .map_err(|_| StagingError::User(format!("Invalid number: {}", value)))
}

fn parse_log_format(value: &str) -> StagingResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(StagingError::User(format!(
            "Invalid log format: {}. Use text or json",
            value
        ))),
    }
}
