//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{DbseedError, DbseedResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> DbseedResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            set_value(manager, config, &key, &value).await?
        }
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> DbseedResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config::default();
    manager.save(&config).await?;

    println!(
        "{} Configuration initialized at {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> DbseedResult<()> {
    let mut config = config.clone();

    // Parse dot-separated key path
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["store", "url"] => config.store.url = value.to_string(),

        ["catalog", "roots"] => {
            config.catalog.roots = parse_list(value).into_iter().map(PathBuf::from).collect();
        }
        ["catalog", "exclude"] => config.catalog.exclude = parse_list(value),

        ["cache", "enabled"] => config.cache.enabled = parse_bool(value)?,
        ["cache", "prefix"] => config.cache.prefix = value.to_string(),
        ["cache", "max_age_days"] => config.cache.max_age_days = parse_i64(value)?,
        ["cache", "max_size"] => config.cache.max_size = parse_i64(value)?,

        ["builder", "command"] => config.builder.command = parse_list(value),

        _ => {
            eprintln!("{} Unknown config key: {}", style("✗").red(), key);
            eprintln!("Valid keys:");
            print_valid_keys();
            return Ok(());
        }
    }

    manager.save(&config).await?;
    println!("{} Set {} = {}", style("✓").green(), key, value);

    Ok(())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> DbseedResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(DbseedError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_i64(value: &str) -> DbseedResult<i64> {
    value
        .parse()
        .map_err(|_| DbseedError::User(format!("Invalid number: {}", value)))
}

fn print_valid_keys() {
    let keys = [
        "store.url",
        "catalog.roots",
        "catalog.exclude",
        "cache.enabled",
        "cache.prefix",
        "cache.max_age_days",
        "cache.max_size",
        "builder.command",
    ];

    for key in keys {
        eprintln!("  {}", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_trims_and_drops_empty() {
        assert_eq!(parse_list("a, b,,c"), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn parse_bool_accepts_common_forms() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("no").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[tokio::test]
    async fn set_value_persists_key() {
        let temp = tempfile::TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));
        let config = Config::default();

        set_value(&manager, &config, "cache.prefix", "pytest")
            .await
            .unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.cache.prefix, "pytest");
    }

    #[tokio::test]
    async fn set_value_parses_builder_command_list() {
        let temp = tempfile::TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));
        let config = Config::default();

        set_value(
            &manager,
            &config,
            "builder.command",
            "installer,--db={database},--install={components}",
        )
        .await
        .unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(
            loaded.builder.command,
            vec!["installer", "--db={database}", "--install={components}"]
        );
    }
}
