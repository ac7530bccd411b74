//! Relational table sink: the price series as a SQLite table.
//!
//! The table is replaced wholesale on every run so repeated runs stay
//! reproducible. Rows are `(date TEXT PRIMARY KEY, adj_close REAL)`.

use crate::fetch::PRICE_SERIES;
use crate::models::PriceSeries;
use crate::pipeline::{ResultBag, SinkUnit};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// Build the dispatch unit for the price table.
pub fn unit(bag: &ResultBag, db_path: PathBuf, table: String) -> SinkUnit {
    let series = bag.series(PRICE_SERIES).cloned().unwrap_or_default();

    SinkUnit::new("write-table", move || {
        replace_price_table(&db_path, &table, &series)
    })
}

/// Replace `table` in the database at `db_path` with the series rows.
pub fn replace_price_table(db_path: &Path, table: &str, series: &PriceSeries) -> Result<String> {
    validate_table_name(table)?;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;

    let tx = conn.transaction().context("starting transaction")?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS \"{table}\";
         CREATE TABLE \"{table}\" (
             date      TEXT NOT NULL PRIMARY KEY,
             adj_close REAL NOT NULL
         );"
    ))
    .with_context(|| format!("recreating table '{}'", table))?;

    {
        let mut insert = tx
            .prepare(&format!(
                "INSERT INTO \"{table}\" (date, adj_close) VALUES (?1, ?2)"
            ))
            .context("preparing insert statement")?;
        for point in series.iter() {
            insert
                .execute(params![point.date.to_string(), point.adj_close])
                .with_context(|| format!("inserting row for {}", point.date))?;
        }
    }
    tx.commit().context("committing price rows")?;

    Ok(format!(
        "replaced table '{}' with {} rows in {}",
        table,
        series.len(),
        db_path.display()
    ))
}

/// Table names are interpolated into SQL, so only identifier characters are
/// accepted.
fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && !table.starts_with(|c: char| c.is_ascii_digit())
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        bail!("invalid table name '{}'", table);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;

    fn sample_series() -> PriceSeries {
        PriceSeries::new(vec![
            PricePoint {
                date: "2024-01-01".parse().unwrap(),
                adj_close: 10.0,
            },
            PricePoint {
                date: "2024-01-08".parse().unwrap(),
                adj_close: 11.0,
            },
        ])
    }

    fn row_count(db_path: &Path, table: &str) -> i64 {
        let conn = Connection::open(db_path).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_writes_all_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("brief.db");

        let summary = replace_price_table(&db_path, "ko_adj_close", &sample_series()).unwrap();

        assert_eq!(row_count(&db_path, "ko_adj_close"), 2);
        assert!(summary.contains("ko_adj_close"));
        assert!(summary.contains("2 rows"));
    }

    #[test]
    fn test_second_run_replaces_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("brief.db");

        replace_price_table(&db_path, "ko_adj_close", &sample_series()).unwrap();
        replace_price_table(&db_path, "ko_adj_close", &sample_series()).unwrap();

        assert_eq!(row_count(&db_path, "ko_adj_close"), 2);
    }

    #[test]
    fn test_values_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("brief.db");

        replace_price_table(&db_path, "prices", &sample_series()).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let close: f64 = conn
            .query_row(
                "SELECT adj_close FROM \"prices\" WHERE date = '2024-01-08'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(close, 11.0);
    }

    #[test]
    fn test_rejects_invalid_table_names() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("brief.db");
        let series = sample_series();

        assert!(replace_price_table(&db_path, "", &series).is_err());
        assert!(replace_price_table(&db_path, "bad-name", &series).is_err());
        assert!(replace_price_table(&db_path, "1prices", &series).is_err());
        assert!(replace_price_table(&db_path, "drop table\"; --", &series).is_err());
    }
}
