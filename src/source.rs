//! Data collaborators: where per-column aggregates, last values and thresholds come from.
//!
//! The render core only consumes already-aggregated values. [`MemorySource`] is a small
//! in-process implementation that buckets raw samples; real deployments implement the
//! traits on top of their history storage.

use ahash::AHashMap;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ColumnAggregate, ItemRef, SeriesSpec, TimeWindow};

/// Supplies per-pixel-column aggregates for a series.
pub trait TimeSeriesSource {
    /// Aggregates for the columns of `window` that have samples. Columns without samples
    /// may be omitted or returned with `count == 0`.
    fn fetch(&self, series: &SeriesSpec, window: &TimeWindow) -> Result<Vec<ColumnAggregate>>;

    /// Latest known value of an item, if any.
    fn last_value(&self, item: &ItemRef) -> Result<Option<Decimal>>;
}

/// A threshold expression attached to an item, e.g. `{12345}>95` or `{7}<=1G`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub expression: String,
    /// Severity, 0 (not classified) ..= 5 (disaster).
    #[serde(default)]
    pub priority: u8,
    pub description: String,
}

/// Supplies threshold expressions for a series.
pub trait ThresholdSource {
    fn matching_thresholds(&self, item: &ItemRef) -> Result<Vec<Threshold>>;
}

/// A source that has no thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThresholds;

impl ThresholdSource for NoThresholds {
    fn matching_thresholds(&self, _item: &ItemRef) -> Result<Vec<Threshold>> {
        Ok(Vec::new())
    }
}

/// Raw history of one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemHistory {
    /// `(clock, value)` samples in any order.
    pub samples: Vec<(i64, Decimal)>,
    pub thresholds: Vec<Threshold>,
}

/// In-memory source keyed by item.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: AHashMap<ItemRef, ItemHistory>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: impl Into<ItemRef>, history: ItemHistory) {
        self.items.insert(item.into(), history);
    }

    pub fn push_sample(&mut self, item: impl Into<ItemRef>, clock: i64, value: Decimal) {
        self.items.entry(item.into()).or_default().samples.push((clock, value));
    }

    pub fn push_threshold(&mut self, item: impl Into<ItemRef>, threshold: Threshold) {
        self.items.entry(item.into()).or_default().thresholds.push(threshold);
    }
}

impl From<AHashMap<ItemRef, ItemHistory>> for MemorySource {
    fn from(items: AHashMap<ItemRef, ItemHistory>) -> Self {
        Self { items }
    }
}

impl TimeSeriesSource for MemorySource {
    /// Buckets samples in `[from, to)` into `floor((clock - from) * width / period)`.
    /// The column clock is the latest sample clock in the bucket.
    fn fetch(&self, series: &SeriesSpec, window: &TimeWindow) -> Result<Vec<ColumnAggregate>> {
        let Some(history) = self.items.get(&series.item) else {
            return Ok(Vec::new());
        };
        let width = window.pixel_width as i64;
        if width == 0 || window.period <= 0 {
            return Ok(Vec::new());
        }

        let mut buckets: Vec<Option<(u64, Decimal, Decimal, Decimal, i64)>> =
            vec![None; window.pixel_width];
        for &(clock, value) in &history.samples {
            if clock < window.from || clock >= window.to() {
                continue;
            }
            let column = ((clock - window.from) * width / window.period) as usize;
            let Some(slot) = buckets.get_mut(column) else {
                continue;
            };
            *slot = Some(match *slot {
                None => (1, value, value, value, clock),
                Some((count, min, max, sum, last)) => {
                    (count + 1, min.min(value), max.max(value), sum + value, last.max(clock))
                }
            });
        }

        Ok(buckets
            .into_iter()
            .enumerate()
            .filter_map(|(column, b)| {
                b.map(|(count, min, max, sum, clock)| ColumnAggregate {
                    column,
                    count,
                    min,
                    max,
                    avg: sum / Decimal::from(count),
                    clock: Decimal::from(clock),
                })
            })
            .collect())
    }

    fn last_value(&self, item: &ItemRef) -> Result<Option<Decimal>> {
        Ok(self
            .items
            .get(item)
            .and_then(|h| h.samples.iter().max_by_key(|(clock, _)| *clock))
            .map(|(_, v)| *v))
    }
}

impl ThresholdSource for MemorySource {
    fn matching_thresholds(&self, item: &ItemRef) -> Result<Vec<Threshold>> {
        Ok(self
            .items
            .get(item)
            .map(|h| h.thresholds.clone())
            .unwrap_or_default())
    }
}
