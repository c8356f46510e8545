// SPDX-License-Identifier: MIT

//! Reporting periods and holidays.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named reporting date range (e.g. a 4-week accounting period).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    /// Period ID (also used as document ID)
    pub id: u64,
    pub name: String,
    pub start_date: NaiveDate,
    /// Inclusive end date; never before `start_date`
    pub end_date: NaiveDate,
}

impl Period {
    /// Whether a delivery date falls inside this period (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// A holiday date range with an assumed daily earnings rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    /// Holiday ID (also used as document ID)
    pub id: u64,
    pub start_date: NaiveDate,
    /// Inclusive end date; never before `start_date`
    pub end_date: NaiveDate,
    /// Credited earnings per holiday day
    pub daily_rate: f64,
}

impl Holiday {
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_period_contains_is_inclusive() {
        let period = Period {
            id: 1,
            name: "P1".to_string(),
            start_date: d(2025, 4, 1),
            end_date: d(2025, 4, 28),
        };
        assert!(period.contains(d(2025, 4, 1)));
        assert!(period.contains(d(2025, 4, 28)));
        assert!(!period.contains(d(2025, 4, 29)));
        assert!(!period.contains(d(2025, 3, 31)));
    }
}
