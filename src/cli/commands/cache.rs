//! Cache command - inspect and evict cached templates

use crate::cache::{decode, TemplateCache};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::DbseedResult;
use crate::store::{create_store, Store};
use chrono::Duration;
use console::style;
use std::io::{self, Write};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> DbseedResult<()> {
    let store = create_store(config)?;

    match args.action {
        CacheAction::List { format, prefix } => {
            let cache = cache_for(prefix, config)?;
            list_templates(store.as_ref(), &cache, format).await
        }
        CacheAction::Size { prefix } => {
            let cache = cache_for(prefix, config)?;
            show_size(store.as_ref(), &cache).await
        }
        CacheAction::Purge { prefix, yes } => {
            let cache = cache_for(prefix, config)?;
            purge_templates(store.as_ref(), &cache, yes).await
        }
        CacheAction::Trim {
            prefix,
            max_size,
            max_age,
        } => {
            let cache = cache_for(prefix, config)?;
            trim_templates(
                store.as_ref(),
                &cache,
                max_size.unwrap_or(config.cache.max_size),
                max_age.unwrap_or(config.cache.max_age_days),
            )
            .await
        }
    }
}

/// Prefix validation happens here, before any store session is opened
fn cache_for(prefix: Option<String>, config: &Config) -> DbseedResult<TemplateCache> {
    TemplateCache::new(prefix.as_deref().unwrap_or(&config.cache.prefix))
}

/// List cached templates, most recently used first
async fn list_templates(
    store: &dyn Store,
    cache: &TemplateCache,
    format: OutputFormat,
) -> DbseedResult<()> {
    let mut session = store.session().await?;
    let entries = cache.entries(session.as_mut()).await?;

    if entries.is_empty() {
        println!("No cached templates under prefix '{}'.", cache.prefix());
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_template_table(&entries),
        OutputFormat::Json => print_template_json(&entries)?,
        OutputFormat::Plain => print_template_plain(&entries),
    }

    Ok(())
}

fn print_template_table(entries: &[String]) {
    println!("{:<20} {:<18} FINGERPRINT", "LAST USED", "PREFIX");
    println!("{}", "-".repeat(72));

    for entry in entries {
        match decode(entry) {
            Some(parts) => {
                println!(
                    "{:<20} {:<18} {}",
                    parts.timestamp.format("%Y-%m-%d %H:%M"),
                    parts.prefix,
                    parts.fingerprint
                );
            }
            // Listed under the prefix pattern but not decodable; show raw
            None => println!("{:<20} {:<18} {}", "?", "?", entry),
        }
    }

    println!();
    println!("Total: {} template(s)", entries.len());
}

fn print_template_json(entries: &[String]) -> DbseedResult<()> {
    #[derive(serde::Serialize)]
    struct TemplateJson {
        name: String,
        prefix: Option<String>,
        last_used: Option<String>,
        fingerprint: Option<String>,
    }

    let json_entries: Vec<TemplateJson> = entries
        .iter()
        .map(|name| {
            let parts = decode(name);
            TemplateJson {
                name: name.clone(),
                prefix: parts.as_ref().map(|p| p.prefix.clone()),
                last_used: parts.as_ref().map(|p| p.timestamp.to_rfc3339()),
                fingerprint: parts.map(|p| p.fingerprint),
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn print_template_plain(entries: &[String]) {
    for entry in entries {
        println!("{}", entry);
    }
}

/// Show the number of cached templates
async fn show_size(store: &dyn Store, cache: &TemplateCache) -> DbseedResult<()> {
    let mut session = store.session().await?;
    let size = cache.size(session.as_mut()).await?;
    println!("{}", size);
    Ok(())
}

/// Drop every cached template under the prefix
async fn purge_templates(
    store: &dyn Store,
    cache: &TemplateCache,
    skip_confirm: bool,
) -> DbseedResult<()> {
    let mut session = store.session().await?;
    let entries = cache.entries(session.as_mut()).await?;

    if entries.is_empty() {
        println!("No cached templates to purge.");
        return Ok(());
    }

    println!("This will drop {} template database(s):", entries.len());
    for entry in &entries {
        println!("  {} {}", style("•").red(), entry);
    }
    println!();

    if !skip_confirm {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    cache.purge(session.as_mut()).await?;
    println!(
        "{} purged {} template(s)",
        style("✓").green(),
        entries.len()
    );

    Ok(())
}

/// Apply count and age thresholds now
async fn trim_templates(
    store: &dyn Store,
    cache: &TemplateCache,
    max_size: i64,
    max_age_days: i64,
) -> DbseedResult<()> {
    let mut session = store.session().await?;
    let before = cache.size(session.as_mut()).await?;

    if max_size >= 0 {
        cache.trim_size(session.as_mut(), max_size as usize).await?;
    }
    if max_age_days >= 0 {
        cache
            .trim_age(session.as_mut(), Duration::days(max_age_days))
            .await?;
    }

    let after = cache.size(session.as_mut()).await?;
    println!(
        "{} trimmed {} template(s), {} remaining",
        style("✓").green(),
        before - after,
        after
    );

    Ok(())
}
