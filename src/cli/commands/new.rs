//! New command - provision a database from the template cache

use crate::catalog::ManifestCatalog;
use crate::cli::args::NewArgs;
use crate::config::Config;
use crate::error::DbseedResult;
use crate::provision::{provision, CacheOptions, CommandBuilder, ProvisionOutcome};
use crate::store::create_store;
use console::style;
use tracing::debug;

/// Execute the new command
pub async fn execute(args: NewArgs, config: &Config) -> DbseedResult<()> {
    let catalog = ManifestCatalog::new(config.catalog.roots.clone());
    let builder = CommandBuilder::new(config.builder.command.clone());

    // CLI flags override the configured cache behavior
    let mut cache = CacheOptions::from(&config.cache);
    if args.no_cache {
        cache.enabled = false;
    }
    if let Some(prefix) = args.cache_prefix {
        cache.prefix = prefix;
    }
    if let Some(max_age) = args.cache_max_age {
        cache.max_age_days = max_age;
    }
    if let Some(max_size) = args.cache_max_size {
        cache.max_size = max_size;
    }
    debug!(
        "cache enabled={} prefix={} max_age_days={} max_size={}",
        cache.enabled, cache.prefix, cache.max_age_days, cache.max_size
    );

    let store = create_store(config)?;
    let outcome = provision(
        store.as_ref(),
        &builder,
        &catalog,
        args.database.as_deref(),
        &args.components,
        !args.no_demo,
        &cache,
        &config.catalog.exclude,
    )
    .await?;

    let database = args.database.as_deref().unwrap_or_default();
    match outcome {
        ProvisionOutcome::FromTemplate => {
            println!(
                "{} Created {} from a cached template",
                style("✓").green(),
                style(database).cyan()
            );
        }
        ProvisionOutcome::BuiltFresh => {
            let cached = if cache.enabled { " and cached as a template" } else { "" };
            println!(
                "{} Built {} from scratch{}",
                style("✓").green(),
                style(database).cyan(),
                cached
            );
        }
        ProvisionOutcome::TrimOnly => {
            println!("{} Cache trimmed", style("✓").green());
        }
        ProvisionOutcome::Nothing => {
            println!("Cache disabled and no database name given; nothing to do.");
        }
    }

    Ok(())
}
