//! Monthly spend snapshots used to chart real trends.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    domain::month_start,
    errors::StorageError,
    storage::KeyValueStore,
};

pub const HISTORY_KEY: &str = "@spend_history";

/// Recorded total spend for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// First day of the month the total belongs to.
    pub month: NaiveDate,
    pub total: f64,
}

/// Ordered list of monthly totals, at most one point per month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendHistory {
    points: Vec<HistoryPoint>,
}

impl SpendHistory {
    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Stores `total` for the month containing `date`, replacing any earlier
    /// value for that month.
    pub fn record(&mut self, date: NaiveDate, total: f64) {
        let month = month_start(date);
        match self.points.binary_search_by(|point| point.month.cmp(&month)) {
            Ok(index) => self.points[index].total = total,
            Err(index) => self.points.insert(index, HistoryPoint { month, total }),
        }
    }

    /// Loads the history, treating a missing or unreadable slot as empty.
    pub fn load(backend: &dyn KeyValueStore) -> Self {
        let raw = match backend.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                warn!(error = %err, "failed to read spend history");
                return Self::default();
            }
        };
        match serde_json::from_str::<Vec<HistoryPoint>>(&raw) {
            Ok(mut points) => {
                points.sort_by_key(|point| point.month);
                points.dedup_by_key(|point| point.month);
                Self { points }
            }
            Err(err) => {
                warn!(error = %err, "spend history is corrupt; ignoring it");
                Self::default()
            }
        }
    }

    /// Encoded form stored under [`HISTORY_KEY`].
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(&self.points)?)
    }
}
