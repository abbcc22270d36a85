pub mod config;
pub mod csv;
pub mod date;
pub mod error;
pub mod favorites;
pub mod log;
pub mod providers;
pub mod rates;
pub mod resolver;
pub mod store;
pub mod ui;

use crate::config::AppConfig;
use crate::favorites::Favorites;
use crate::rates::ConversionRow;
use crate::resolver::RateResolver;
use crate::store::{DiskStore, MemoryStore, SnapshotStore};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The commands the application can run, independent of any CLI parser.
pub enum AppCommand {
    Rates {
        currency: Option<String>,
        date: Option<String>,
    },
    FavoriteAdd {
        from: String,
        to: String,
    },
    FavoriteRemove {
        from: String,
        to: String,
    },
    FavoriteList,
    Export {
        output: Option<PathBuf>,
    },
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    cancel: CancellationToken,
) -> Result<()> {
    info!("fxtab starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = open_store(&config);
    let source = providers::CurrencyApiSource::new(&config.source.base_url)?;
    let resolver = RateResolver::new(Arc::new(source), store);
    let favorites = Favorites::new(config.resolved_favorites_path()?);

    match command {
        AppCommand::Rates { currency, date } => {
            let currency = currency.unwrap_or_else(|| config.currency.clone());
            let date = date.unwrap_or_else(|| "latest".to_string());
            show_rates(&resolver, &currency, &date, &cancel).await
        }
        AppCommand::FavoriteAdd { from, to } => add_favorite(&favorites, &from, &to).await,
        AppCommand::FavoriteRemove { from, to } => remove_favorite(&favorites, &from, &to).await,
        AppCommand::FavoriteList => list_favorites(&favorites, &resolver, &cancel).await,
        AppCommand::Export { output } => {
            export_favorites(&favorites, &resolver, output, &cancel).await
        }
    }
}

/// Opens the disk cache, falling back to an in-memory one when the cache
/// directory cannot be used. Rates still resolve either way; they are just
/// not remembered across runs.
fn open_store(config: &AppConfig) -> Arc<dyn SnapshotStore> {
    match config
        .resolved_cache_dir()
        .and_then(|dir| DiskStore::new(&dir))
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "cache directory unavailable, using in-memory cache");
            Arc::new(MemoryStore::new())
        }
    }
}

async fn show_rates(
    resolver: &RateResolver,
    currency: &str,
    date_input: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    let base = currency.trim().to_lowercase();
    let Some(snapshot) = resolver.resolve(&base, date_input, cancel).await? else {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "No rates found for {} within a year of the requested date.",
                    base.to_uppercase()
                ),
                ui::StyleType::Error
            )
        );
        return Ok(());
    };

    let Some(rates) = snapshot.rates(&base) else {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "The published data for {} carries no usable rate table.",
                    base.to_uppercase()
                ),
                ui::StyleType::Error
            )
        );
        return Ok(());
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {} =)", base.to_uppercase())),
    ]);
    for (code, rate) in &rates {
        table.add_row(vec![Cell::new(code.to_uppercase()), ui::rate_cell(rate)]);
    }

    println!(
        "Rates for {} on {}\n",
        ui::style_text(&base.to_uppercase(), ui::StyleType::Title),
        snapshot.date
    );
    println!("{table}");

    // The snapshot may come from a nearby date when the requested one had no
    // published data.
    if let Ok(requested) = date::normalize(date_input) {
        let requested_iso = requested.format("%Y-%m-%d").to_string();
        if snapshot.date != requested_iso {
            println!(
                "{}",
                ui::style_text(
                    &format!(
                        "Requested {requested_iso}; showing the nearest published data ({}).",
                        snapshot.date
                    ),
                    ui::StyleType::Subtle
                )
            );
        }
    }
    Ok(())
}

async fn add_favorite(favorites: &Favorites, from: &str, to: &str) -> Result<()> {
    if favorites.add(from, to).await? {
        println!("Saved {} -> {}.", from.to_uppercase(), to.to_uppercase());
    } else {
        println!(
            "{} -> {} is already saved.",
            from.to_uppercase(),
            to.to_uppercase()
        );
    }
    Ok(())
}

async fn remove_favorite(favorites: &Favorites, from: &str, to: &str) -> Result<()> {
    if favorites.remove(from, to).await? {
        println!("Removed {} -> {}.", from.to_uppercase(), to.to_uppercase());
    } else {
        println!(
            "{} -> {} is not in your favorites.",
            from.to_uppercase(),
            to.to_uppercase()
        );
    }
    Ok(())
}

async fn list_favorites(
    favorites: &Favorites,
    resolver: &RateResolver,
    cancel: &CancellationToken,
) -> Result<()> {
    let rows = resolve_favorite_rows(favorites, resolver, cancel).await?;
    if rows.is_empty() {
        println!("No favorites saved yet. Add one with `fxtab favorites add usd eur`.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Rate"),
        ui::header_cell("Date"),
    ]);
    for row in &rows {
        let (rate_cell, date_cell) = if row.date == "N/A" {
            (ui::na_cell(), Cell::new("N/A"))
        } else {
            (ui::rate_cell(&row.rate), Cell::new(&row.date))
        };
        table.add_row(vec![
            Cell::new(row.from.to_uppercase()),
            Cell::new(row.to.to_uppercase()),
            rate_cell,
            date_cell,
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn export_favorites(
    favorites: &Favorites,
    resolver: &RateResolver,
    output: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let rows = resolve_favorite_rows(favorites, resolver, cancel).await?;
    let rendered = csv::format_rows(&rows);

    match output {
        Some(path) => {
            tokio::fs::write(&path, &rendered)
                .await
                .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
            println!("Wrote {} rows to {}.", rows.len(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

async fn resolve_favorite_rows(
    favorites: &Favorites,
    resolver: &RateResolver,
    cancel: &CancellationToken,
) -> Result<Vec<ConversionRow>> {
    let pair_count = favorites.list().await.len() as u64;
    let pb = ui::new_progress_bar(pair_count, true);
    pb.set_message("Resolving favorite rates...");

    let rows = favorites.load_rows(resolver, cancel, pb.clone()).await;
    pb.finish_and_clear();
    Ok(rows?)
}
