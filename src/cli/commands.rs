//! Command handlers for the CLI
//!
//! Each handler loads configuration, applies the global overrides and runs
//! one operation against the guide cache.

use std::io::{self, Read, Write};
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::app::{CacheManager, Channel, GuideCache};
use crate::cli::args::{ExpireArgs, FetchArgs, GlobalArgs, ShowArgs};
use crate::cli::progress::FetchProgress;
use crate::config::AppConfig;
use crate::errors::{AppError, CacheError, Result};

/// Load configuration and apply command-line overrides
async fn load_config(global: &GlobalArgs) -> Result<AppConfig> {
    if global.config.is_none() {
        if let Err(e) = AppConfig::initialize_first_run().await {
            warn!("Could not create default configuration: {}", e);
        }
    }

    let mut config = AppConfig::load(global.config.clone()).await?;
    config.apply_overrides(
        global.cache_dir.clone(),
        global.service.clone(),
        global.very_verbose,
    );
    Ok(config)
}

async fn open_cache(global: &GlobalArgs) -> Result<CacheManager> {
    let config = load_config(global).await?;
    Ok(CacheManager::new(config.cache.to_runtime_config()))
}

/// Fetch a window of days for one channel
pub async fn handle_fetch(global: &GlobalArgs, args: FetchArgs) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let config = load_config(global).await?;
    let (cache_config, client_config) = config.to_runtime_config();
    let guide = GuideCache::new(cache_config, &client_config)?;
    if !guide.cache().is_active() {
        return Err(CacheError::Inactive.into());
    }

    let channel = Arc::new(Channel::new(args.channel.clone(), args.base_urls.clone()));
    let days = args.window(Local::now().date_naive());
    let Some(&primary) = days.first() else {
        return Ok(());
    };

    let (_listener, mut events) = guide.subscribe()?;

    let mut submitted = 0;
    for &day in &days {
        let issued = if args.refresh {
            guide.refresh_window(&channel, day, primary)?
        } else {
            guide.fetch_window(&channel, day, primary)?
        };
        if issued {
            submitted += 1;
        }
    }

    if submitted == 0 {
        guide.shutdown().await?;
        return Err(AppError::generic(format!(
            "No requests issued for {}; check the base URLs",
            channel.id
        )));
    }
    info!("Requested {} day(s) for {}", submitted, channel.id);

    let mut progress = if global.quiet {
        FetchProgress::hidden(submitted)
    } else {
        FetchProgress::new(submitted)?
    };
    while let Some(event) = events.recv().await {
        if progress.handle(&event) {
            break;
        }
    }
    let summary = progress.finish();
    guide.shutdown().await?;

    if !global.quiet {
        println!("{}: {}", channel.id, summary);
    }
    if summary.has_primary_failures() {
        return Err(AppError::generic(format!(
            "Failed to fetch {}",
            summary.failed_primary.join(", ")
        )));
    }
    Ok(())
}

/// Print the decompressed XML for one cached day
pub async fn handle_show(global: &GlobalArgs, args: ShowArgs) -> Result<()> {
    let cache = open_cache(global).await?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let channel = Channel::new(args.channel, Vec::<String>::new());

    let Some(mut reader) = cache.open_channel_data(&channel, date) else {
        return Err(AppError::generic(format!(
            "No cached guide data for {} on {}",
            channel.id, date
        )));
    };

    let mut xml = Vec::new();
    reader.read_to_end(&mut xml)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&xml)?;
    stdout.flush()?;
    Ok(())
}

/// Show the cache location and a summary of its contents
pub async fn handle_status(global: &GlobalArgs) -> Result<()> {
    let cache = open_cache(global).await?;

    println!("Service: {}", display_or_none(&cache.service_name()));
    match cache.http_dir() {
        Some(dir) => println!("Cache directory: {}", dir.display()),
        None => println!("Cache directory: inactive"),
    }
    if let Some(stats) = cache.stats()? {
        println!("{}", stats);
    }
    Ok(())
}

/// Delete days before today, or before the given date
pub async fn handle_expire(global: &GlobalArgs, args: ExpireArgs) -> Result<()> {
    let cache = open_cache(global).await?;
    let today = args.before.unwrap_or_else(|| Local::now().date_naive());
    let deleted = cache.expire_before(today)?;
    if !global.quiet {
        println!("Removed {} expired file(s) older than {}", deleted, today);
    }
    Ok(())
}

/// Delete every cached data and metadata file
pub async fn handle_clear(global: &GlobalArgs) -> Result<()> {
    let cache = open_cache(global).await?;
    let deleted = cache.clear()?;
    if !global.quiet {
        println!("Removed {} cached file(s)", deleted);
    }
    Ok(())
}

fn display_or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}
