//! Query and snapshot types shared by the cache store, the remote source,
//! and the resolver.

use crate::date;
use crate::error::RateError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One (base currency, calendar date) resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    pub currency: String,
    pub date: NaiveDate,
}

impl RateQuery {
    pub fn new(currency: &str, date: NaiveDate) -> Self {
        Self {
            currency: currency.trim().to_lowercase(),
            date,
        }
    }

    /// Deterministic cache key for this query: identical query, identical key.
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.currency, date::canonical(self.date))
    }
}

impl fmt::Display for RateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.currency, date::canonical(self.date))
    }
}

/// A dated set of exchange rates for one base currency, in the shape the
/// source publishes: `{"date": "...", "<base>": {"<target>": rate, ...}}`.
///
/// Everything outside `date` is carried as raw JSON. The source grows new
/// currency keys over time, so an open map keeps deserialization from ever
/// rejecting a payload, and a snapshot written to the cache reproduces the
/// document it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// The date the source actually published data for; may differ from the
    /// requested date when the search shifted.
    pub date: String,
    #[serde(flatten)]
    tables: BTreeMap<String, serde_json::Value>,
}

impl RateSnapshot {
    /// The rate table for a base currency, decoded on demand.
    ///
    /// `None` when the snapshot holds no usable table under that key; the
    /// caller decides whether that means a sentinel row or a hard error.
    pub fn rates(&self, base: &str) -> Option<BTreeMap<String, Decimal>> {
        let table = self.tables.get(base)?;
        serde_json::from_value(table.clone()).ok()
    }
}

/// One rendered conversion: how much of `to` one unit of `from` buys, and
/// the date the rate is good for.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRow {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
    pub date: String,
}

/// A remote source of dated rate snapshots.
///
/// `Ok(None)` means the source has no published data for the queried date.
/// That is an expected outcome which drives the resolver's date search, not
/// an error; only transport-class failures are `Err`.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self, query: &RateQuery) -> Result<Option<RateSnapshot>, RateError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_query_normalizes_currency() {
        let query = RateQuery::new("  EUR ", day(2024, 3, 6));
        assert_eq!(query.currency, "eur");
        assert_eq!(query.cache_key(), "eur-2024.3.6");
        assert_eq!(query.to_string(), "eur@2024.3.6");
    }

    #[test]
    fn test_same_query_same_key() {
        let a = RateQuery::new("usd", day(2024, 3, 6));
        let b = RateQuery::new("USD", day(2024, 3, 6));
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_snapshot_decodes_rate_table() {
        let snapshot: RateSnapshot = serde_json::from_value(json!({
            "date": "2024-03-06",
            "usd": {"eur": 0.92, "gbp": 0.79},
            "newfield": "ignored"
        }))
        .unwrap();

        assert_eq!(snapshot.date, "2024-03-06");
        let rates = snapshot.rates("usd").unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates["eur"], "0.92".parse::<Decimal>().unwrap());
        assert!(snapshot.rates("eur").is_none());
    }

    #[test]
    fn test_snapshot_tolerates_malformed_table() {
        let snapshot: RateSnapshot = serde_json::from_value(json!({
            "date": "2024-03-06",
            "usd": "not-a-table"
        }))
        .unwrap();

        assert!(snapshot.rates("usd").is_none());
    }

    #[test]
    fn test_snapshot_round_trips_unknown_keys() {
        let document = json!({
            "date": "2024-03-06",
            "usd": {"eur": 0.92},
            "meta": {"source": "test"}
        });

        let snapshot: RateSnapshot = serde_json::from_value(document.clone()).unwrap();
        assert_eq!(serde_json::to_value(&snapshot).unwrap(), document);
    }
}
