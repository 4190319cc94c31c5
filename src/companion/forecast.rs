//! Forecast store consumed by the companion.

use heapless::Vec;

use crate::error::{Error, Result};
use crate::sync::Location;

const MS_PER_DAY: i64 = 86_400_000;

/// Maximum number of rows held by [`MemoryForecastStore`].
pub const MAX_ROWS: usize = 16;

/// Forecast lookup for one location on the day containing `date_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ForecastQuery {
    pub location: Location,
    /// Milliseconds since the Unix epoch.
    pub date_ms: i64,
}

impl ForecastQuery {
    /// UTC day number of the query date.
    pub fn day(&self) -> i64 {
        self.date_ms.div_euclid(MS_PER_DAY)
    }
}

/// Projection of one forecast row.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ForecastRow {
    pub id: i64,
    pub condition_code: i32,
    pub max_temp: f32,
    pub min_temp: f32,
}

/// Source of forecast rows.
pub trait ForecastStore {
    /// Row for the query's location on the query's day, if any.
    fn query(&mut self, query: &ForecastQuery) -> Result<Option<ForecastRow>>;
}

#[derive(Debug, Clone)]
struct Entry {
    location: Location,
    day: i64,
    row: ForecastRow,
}

/// Forecast rows keyed by (location, day).
#[derive(Debug, Clone, Default)]
pub struct MemoryForecastStore {
    entries: Vec<Entry, MAX_ROWS>,
    fail: bool,
}

impl MemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the row for `location` on the day containing `date_ms`.
    pub fn insert(&mut self, location: &str, date_ms: i64, row: ForecastRow) -> Result<()> {
        let day = date_ms.div_euclid(MS_PER_DAY);
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.location.as_str() == location && e.day == day)
        {
            entry.row = row;
            return Ok(());
        }
        let entry = Entry {
            location: crate::sync::location_from(location)?,
            day,
            row,
        };
        self.entries.push(entry).map_err(|_| Error::BufferOverflow)
    }

    /// Make queries fail.
    pub fn fail_queries(&mut self, fail: bool) {
        self.fail = fail;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ForecastStore for MemoryForecastStore {
    fn query(&mut self, query: &ForecastQuery) -> Result<Option<ForecastRow>> {
        if self.fail {
            return Err(Error::QueryFailed);
        }
        let day = query.day();
        Ok(self
            .entries
            .iter()
            .find(|e| e.location == query.location && e.day == day)
            .map(|e| e.row))
    }
}
