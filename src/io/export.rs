//! Export report rows to CSV.
//!
//! One row per output record, headers from the record's field names, so the
//! file opens cleanly in a spreadsheet.

use std::path::Path;

use serde::Serialize;

use crate::error::AppError;
use crate::report::Report;

/// Write `report` to `path`. Returns the number of rows written.
pub fn write_report_csv(path: &Path, report: &Report) -> Result<usize, AppError> {
    match report {
        Report::Issuance(agg) => write_rows(path, &agg.data),
        Report::Trend(points) => write_rows(path, points),
        Report::YieldCurve(points) => write_rows(path, points),
        Report::Spread(spread) => write_rows(path, std::slice::from_ref(spread)),
        Report::Liquidity(points) => write_rows(path, points),
        Report::DebtCost(points) => write_rows(path, points),
        Report::DebtHistory(points) => write_rows(path, points),
        Report::Indicator(ind) => write_rows(path, std::slice::from_ref(ind)),
        Report::Price(price) => write_rows(path, std::slice::from_ref(price)),
        Report::CacheCleared { .. } => Err(AppError::config("cache-clear has no rows to export.")),
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize, AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to write export CSV '{}': {e}", path.display())))?;

    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetPrice, DebtPoint};
    use crate::error::ErrorKind;

    #[test]
    fn debt_history_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");
        let report = Report::DebtHistory(vec![
            DebtPoint {
                date: "2024-01-02".to_string(),
                total_debt: 100.0,
                daily_change: 0.0,
            },
            DebtPoint {
                date: "2024-01-03".to_string(),
                total_debt: 150.0,
                daily_change: 50.0,
            },
        ]);

        assert_eq!(write_report_csv(&path, &report).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "date,total_debt,daily_change\n2024-01-02,100.0,0.0\n2024-01-03,150.0,50.0\n"
        );
    }

    #[test]
    fn single_record_is_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("price.csv");
        let report = Report::Price(AssetPrice {
            symbol: "EUR/USD".to_string(),
            price: 1.0705,
            currency: "USD".to_string(),
            source: "Frankfurter".to_string(),
            timestamp: Some("2024-06-28".to_string()),
        });

        assert_eq!(write_report_csv(&path, &report).unwrap(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "symbol,price,currency,source,timestamp\nEUR/USD,1.0705,USD,Frankfurter,2024-06-28\n"
        );
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let report = Report::Trend(Vec::new());
        assert_eq!(write_report_csv(&path, &report).unwrap_err().kind(), ErrorKind::Io);
    }
}
