//! The rate-resolution engine: cache first, then the remote source, then a
//! bounded forward/backward date search.

use crate::date;
use crate::error::RateError;
use crate::rates::{RateQuery, RateSnapshot, RateSource};
use crate::store::SnapshotStore;
use chrono::Duration;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// How far below the requested date the search reaches before giving up.
const SEARCH_FLOOR_DAYS: i64 = 365;

pub struct RateResolver {
    source: Arc<dyn RateSource>,
    store: Arc<dyn SnapshotStore>,
}

impl RateResolver {
    pub fn new(source: Arc<dyn RateSource>, store: Arc<dyn SnapshotStore>) -> Self {
        Self { source, store }
    }

    /// Resolves a rate snapshot for a base currency and a date given in any
    /// accepted text form (`"latest"`, canonical, or a common format).
    ///
    /// The cache short-circuits everything. On a miss the requested date is
    /// fetched; when the source has nothing for it, the resolver walks
    /// forward one day at a time through today, then backward from the
    /// requested date down to a year before it, and the first date with
    /// published data wins. `Ok(None)` is the definitive "no data anywhere
    /// in the window" outcome. Transport failures abort the resolution
    /// instead of drifting to other dates, and `cancel` is honored between
    /// any two fetch attempts.
    #[instrument(skip(self, cancel), fields(%currency, date = %date_input))]
    pub async fn resolve(
        &self,
        currency: &str,
        date_input: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<RateSnapshot>, RateError> {
        if cancel.is_cancelled() {
            return Err(RateError::Cancelled);
        }

        let requested = date::normalize(date_input)?;
        let today = date::today_utc();
        let start = if requested > today {
            warn!(
                requested = %date::canonical(requested),
                "requested a future date, using today instead"
            );
            today
        } else {
            requested
        };

        let query = RateQuery::new(currency, start);
        if let Some(snapshot) = self.store.get(&query.cache_key()).await {
            debug!(query = %query, "resolved from cache");
            return Ok(Some(snapshot));
        }

        if let Some(snapshot) = self.fetch_day(&query, cancel).await? {
            return Ok(Some(snapshot));
        }

        warn!(query = %query, "no data for requested date, searching nearby dates");

        // Forward first: single-day steps from the day after the requested
        // date through today, then backward from the day before it down to
        // the floor. The search stops at the first date with data; it never
        // keeps going to find a closer one.
        let mut day = start + Duration::days(1);
        while day <= today {
            let candidate = RateQuery::new(&query.currency, day);
            if let Some(snapshot) = self.fetch_day(&candidate, cancel).await? {
                info!(date = %date::canonical(day), "found data at a later date");
                self.store_under(&query.cache_key(), &snapshot).await;
                return Ok(Some(snapshot));
            }
            day = day + Duration::days(1);
        }

        let floor = start - Duration::days(SEARCH_FLOOR_DAYS);
        let mut day = start - Duration::days(1);
        while day >= floor {
            let candidate = RateQuery::new(&query.currency, day);
            if let Some(snapshot) = self.fetch_day(&candidate, cancel).await? {
                info!(date = %date::canonical(day), "found data at an earlier date");
                self.store_under(&query.cache_key(), &snapshot).await;
                return Ok(Some(snapshot));
            }
            day = day - Duration::days(1);
        }

        warn!(query = %query, "no data found within a year of the requested date");
        Ok(None)
    }

    /// One unit of search work: a cancellation gate, a single fetch, and a
    /// write-through under the fetched date's own key on success.
    async fn fetch_day(
        &self,
        query: &RateQuery,
        cancel: &CancellationToken,
    ) -> Result<Option<RateSnapshot>, RateError> {
        if cancel.is_cancelled() {
            return Err(RateError::Cancelled);
        }

        let snapshot = self.source.fetch(query).await?;
        if let Some(snapshot) = &snapshot {
            self.store_under(&query.cache_key(), snapshot).await;
        }
        Ok(snapshot)
    }

    /// Cache writes never fail a resolution; the snapshot still goes back
    /// to the caller.
    async fn store_under(&self, key: &str, snapshot: &RateSnapshot) {
        if let Err(e) = self.store.put(key, snapshot).await {
            warn!(key, error = %e, "cache write failed");
        }
    }
}
