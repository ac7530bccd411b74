//! Weekly adjusted-close series fetcher.
//!
//! Queries an Alpha Vantage-style `TIME_SERIES_WEEKLY_ADJUSTED` endpoint and
//! decodes the `5. adjusted close` column. The API reports its own faults in
//! the response body (an `Error Message` for bad requests, a `Note` when
//! rate-limited), so both are surfaced as failures rather than empty series.

use crate::config::FetchConfig;
use crate::fetch::PRICE_SERIES;
use crate::models::{PricePoint, PriceSeries};
use crate::pipeline::{FetchUnit, Field};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Build the gather unit for the price series.
pub fn unit(client: reqwest::Client, config: &FetchConfig, api_key: String) -> FetchUnit {
    let api_url = config.api_url.clone();
    let symbol = config.symbol.clone();
    let years = config.years;

    FetchUnit::new("price-series", async move {
        let series = fetch_price_series(&client, &api_url, &symbol, &api_key, years).await?;
        Ok(vec![Field::series(PRICE_SERIES, series)])
    })
}

#[derive(Debug, Deserialize)]
struct WeeklySeriesResponse {
    #[serde(rename = "Weekly Adjusted Time Series", default)]
    series: BTreeMap<String, WeeklyBar>,

    #[serde(rename = "Error Message")]
    error_message: Option<String>,

    #[serde(rename = "Note")]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeeklyBar {
    #[serde(rename = "5. adjusted close")]
    adjusted_close: String,
}

/// Fetch the weekly series for `symbol`, clamped to the trailing `years`
/// window.
pub async fn fetch_price_series(
    client: &reqwest::Client,
    api_url: &str,
    symbol: &str,
    api_key: &str,
    years: u32,
) -> Result<PriceSeries> {
    let response = client
        .get(api_url)
        .query(&[
            ("function", "TIME_SERIES_WEEKLY_ADJUSTED"),
            ("symbol", symbol),
            ("apikey", api_key),
        ])
        .send()
        .await
        .with_context(|| format!("requesting weekly series for {}", symbol))?
        .error_for_status()
        .context("time-series endpoint returned an error status")?;

    let payload: WeeklySeriesResponse = response
        .json()
        .await
        .context("decoding weekly series response")?;

    let series = decode_series(payload)?;
    debug!("decoded {} weekly observation(s) for {}", series.len(), symbol);
    Ok(series.recent_years(years))
}

/// Turn the decoded payload into an ordered series, surfacing API-reported
/// faults.
fn decode_series(payload: WeeklySeriesResponse) -> Result<PriceSeries> {
    if let Some(message) = payload.error_message {
        bail!("API error: {}", message);
    }
    if payload.series.is_empty() {
        if let Some(note) = payload.note {
            bail!("API note: {}", note);
        }
        bail!("response contained no weekly series");
    }

    let mut points = Vec::with_capacity(payload.series.len());
    for (date, bar) in payload.series {
        let date: NaiveDate = date
            .parse()
            .with_context(|| format!("parsing observation date '{}'", date))?;
        let adj_close: f64 = bar
            .adjusted_close
            .parse()
            .with_context(|| format!("parsing adjusted close '{}'", bar.adjusted_close))?;
        points.push(PricePoint { date, adj_close });
    }

    Ok(PriceSeries::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<PriceSeries> {
        let payload: WeeklySeriesResponse = serde_json::from_str(json).unwrap();
        decode_series(payload)
    }

    #[test]
    fn test_decode_series_sorted_ascending() {
        let series = decode(
            r#"{
                "Meta Data": {"2. Symbol": "KO"},
                "Weekly Adjusted Time Series": {
                    "2024-01-08": {"5. adjusted close": "11.0", "1. open": "10.5"},
                    "2024-01-01": {"5. adjusted close": "10.0", "1. open": "9.8"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().date.to_string(), "2024-01-01");
        assert_eq!(series.last().unwrap().adj_close, 11.0);
    }

    #[test]
    fn test_decode_series_surfaces_api_error() {
        let err = decode(r#"{"Error Message": "Invalid API call."}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid API call."));
    }

    #[test]
    fn test_decode_series_surfaces_rate_limit_note() {
        let err = decode(r#"{"Note": "API call frequency exceeded."}"#).unwrap_err();
        assert!(err.to_string().contains("frequency exceeded"));
    }

    #[test]
    fn test_decode_series_empty_payload() {
        let err = decode(r#"{}"#).unwrap_err();
        assert!(err.to_string().contains("no weekly series"));
    }

    #[test]
    fn test_decode_series_bad_number() {
        let err = decode(
            r#"{"Weekly Adjusted Time Series": {
                "2024-01-01": {"5. adjusted close": "not-a-number"}
            }}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not-a-number"));
    }
}
