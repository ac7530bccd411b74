//! Data models for the market snapshot pipeline.
//!
//! This module contains the domain structures shared between the
//! fetch stage and the sink stage: the company profile and the
//! adjusted-close price series.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Company profile extracted from the investor-relations page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Free-text company description.
    pub description: String,
    /// Marketing tagline, when the page carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
}

/// A single observation in the price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date (weekly close).
    pub date: NaiveDate,
    /// Adjusted closing price.
    pub adj_close: f64,
}

/// Adjusted-close price series, ordered oldest to newest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a series from unordered points, sorting by date.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate observations oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    /// Oldest observation.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Newest observation.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Lowest adjusted close in the series.
    pub fn min_close(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.adj_close)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Highest adjusted close in the series.
    pub fn max_close(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.adj_close)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Restrict the series to the trailing `years` window, measured from the
    /// newest observation rather than from today, so stale data stays windowed
    /// the same way it was recorded.
    pub fn recent_years(self, years: u32) -> Self {
        let Some(newest) = self.points.last().map(|p| p.date) else {
            return self;
        };

        let cutoff = newest
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);

        Self {
            points: self
                .points
                .into_iter()
                .filter(|p| p.date >= cutoff)
                .collect(),
        }
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, adj_close: f64) -> PricePoint {
        PricePoint {
            date: date.parse().unwrap(),
            adj_close,
        }
    }

    #[test]
    fn test_series_sorts_on_construction() {
        let series = PriceSeries::new(vec![
            point("2024-01-08", 11.0),
            point("2024-01-01", 10.0),
            point("2024-01-15", 12.0),
        ]);

        let dates: Vec<_> = series.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-08", "2024-01-15"]);
    }

    #[test]
    fn test_min_max_close() {
        let series = PriceSeries::new(vec![
            point("2024-01-01", 10.0),
            point("2024-01-08", 14.5),
            point("2024-01-15", 9.25),
        ]);

        assert_eq!(series.min_close(), Some(9.25));
        assert_eq!(series.max_close(), Some(14.5));
    }

    #[test]
    fn test_recent_years_windows_from_newest_point() {
        let series = PriceSeries::new(vec![
            point("2015-06-01", 1.0),
            point("2021-06-01", 2.0),
            point("2024-06-01", 3.0),
        ]);

        let windowed = series.recent_years(5);
        assert_eq!(windowed.len(), 2);
        assert_eq!(windowed.first().unwrap().date.to_string(), "2021-06-01");
        assert_eq!(windowed.last().unwrap().date.to_string(), "2024-06-01");
    }

    #[test]
    fn test_recent_years_empty_series() {
        let series = PriceSeries::default();
        assert!(series.recent_years(5).is_empty());
    }
}
