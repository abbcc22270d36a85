//! Saved currency pairs on disk, and the live conversion table built from
//! them.

use crate::error::RateError;
use crate::rates::ConversionRow;
use crate::resolver::RateResolver;
use anyhow::{Context, Result};
use futures::future::join_all;
use indicatif::ProgressBar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One saved conversion, stored exactly as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritePair {
    pub base: String,
    pub target: String,
}

/// The favorites file: a JSON list of pairs, created on first add.
pub struct Favorites {
    path: PathBuf,
}

impl Favorites {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Adds a pair unless the exact pair is already saved. Returns whether
    /// the file changed.
    pub async fn add(&self, base: &str, target: &str) -> Result<bool> {
        let mut pairs = self.list().await;
        if pairs.iter().any(|p| p.base == base && p.target == target) {
            debug!(%base, %target, "pair already saved");
            return Ok(false);
        }
        pairs.push(FavoritePair {
            base: base.to_string(),
            target: target.to_string(),
        });
        self.save(&pairs).await?;
        Ok(true)
    }

    /// Removes the first saved pair matching case-insensitively. Returns
    /// whether anything was removed.
    pub async fn remove(&self, base: &str, target: &str) -> Result<bool> {
        let mut pairs = self.list().await;
        let Some(index) = pairs.iter().position(|p| {
            p.base.eq_ignore_ascii_case(base) && p.target.eq_ignore_ascii_case(target)
        }) else {
            return Ok(false);
        };
        pairs.remove(index);
        self.save(&pairs).await?;
        Ok(true)
    }

    /// All saved pairs in file order. A missing or unreadable file is an
    /// empty list, never an error.
    pub async fn list(&self) -> Vec<FavoritePair> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no favorites file yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read favorites");
                return Vec::new();
            }
        };
        match serde_json::from_str(&json) {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "favorites file is malformed");
                Vec::new()
            }
        }
    }

    /// Resolves the latest rate for every saved pair and renders one row
    /// per pair, in saved order.
    ///
    /// Pairs sharing a base currency are grouped so each base is resolved
    /// once, and the groups are resolved concurrently. A base with no
    /// published data drops its group from the table; a base with data but
    /// no rate for some target renders that row with a zero rate and an
    /// `"N/A"` date.
    pub async fn load_rows(
        &self,
        resolver: &RateResolver,
        cancel: &CancellationToken,
        pb: ProgressBar,
    ) -> Result<Vec<ConversionRow>, RateError> {
        let pairs = self.list().await;
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        // Group by lowercased base, keeping the order bases first appear in
        // the file.
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for pair in &pairs {
            let base = pair.base.to_lowercase();
            let target = pair.target.to_lowercase();
            match groups.iter_mut().find(|(b, _)| *b == base) {
                Some((_, targets)) => targets.push(target),
                None => groups.push((base, vec![target])),
            }
        }

        let fetches = groups.iter().map(|(base, targets)| {
            let pb_clone = pb.clone();
            async move {
                let outcome = resolver.resolve(base, "latest", cancel).await;
                pb_clone.inc(targets.len() as u64);
                outcome
            }
        });
        let resolved = join_all(fetches).await;

        let mut rows = Vec::new();
        for ((base, targets), outcome) in groups.iter().zip(resolved) {
            let Some(snapshot) = outcome? else {
                warn!(%base, "no rate data for favorite base currency, skipping");
                continue;
            };
            let Some(rates) = snapshot.rates(base) else {
                warn!(%base, "snapshot carries no rate table for its base currency, skipping");
                continue;
            };
            for target in targets {
                match rates.get(target) {
                    Some(rate) => rows.push(ConversionRow {
                        from: base.clone(),
                        to: target.clone(),
                        rate: *rate,
                        date: snapshot.date.clone(),
                    }),
                    None => rows.push(ConversionRow {
                        from: base.clone(),
                        to: target.clone(),
                        rate: Decimal::ZERO,
                        date: "N/A".to_string(),
                    }),
                }
            }
        }
        Ok(rows)
    }

    async fn save(&self, pairs: &[FavoritePair]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(pairs)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write favorites to {}", self.path.display()))
    }
}
