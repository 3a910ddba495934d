use std::collections::BTreeMap;

use super::observation::{Observation, ValueRow};
use super::series::{Series, SeriesKey};
use crate::common::errors::RevisionError;

/// Column names the flat input table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["date", "product", "location", "value"];

/// Fail on the first required column missing from `headers`.
pub fn check_schema(headers: &[&str]) -> Result<(), RevisionError> {
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| *h == required) {
            return Err(RevisionError::Schema(format!(
                "missing column '{}'",
                required
            )));
        }
    }
    Ok(())
}

/// Group flat rows into per-key series, preserving row order within each key.
///
/// Keys come out sorted; dates inside one key must be strictly increasing.
pub fn split_rows(rows: Vec<ValueRow>) -> Result<BTreeMap<SeriesKey, Series>, RevisionError> {
    let mut map: BTreeMap<SeriesKey, Series> = BTreeMap::new();
    for row in rows {
        let key = SeriesKey::new(row.product, row.location);
        let series = map
            .entry(key.clone())
            .or_insert_with(|| Series::new(key));
        series.add(Observation::new(row.date, row.value))?;
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, product: &str, location: &str, value: f64) -> ValueRow {
        ValueRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            product: product.to_string(),
            location: location.to_string(),
            value,
        }
    }

    #[test]
    fn test_check_schema_reports_first_missing_column() {
        assert!(check_schema(&["date", "product", "location", "value"]).is_ok());
        assert!(check_schema(&["value", "location", "date", "product", "extra"]).is_ok());

        let err = check_schema(&["date", "product", "value"]).unwrap_err();
        assert_eq!(err.to_string(), "schema error: missing column 'location'");
    }

    #[test]
    fn test_split_rows_groups_by_key_in_sorted_order() {
        let rows = vec![
            row(1, "Product B", "Location 1", 10.0),
            row(1, "Product A", "Location 2", 20.0),
            row(2, "Product B", "Location 1", 11.0),
            row(2, "Product A", "Location 2", 21.0),
        ];
        let map = split_rows(rows).unwrap();

        let keys: Vec<String> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec!["Product A at Location 2", "Product B at Location 1"]
        );
        let series = &map[&SeriesKey::new("Product B", "Location 1")];
        assert_eq!(series.values(), vec![10.0, 11.0]);
    }

    #[test]
    fn test_split_rows_rejects_duplicate_dates_within_key() {
        let rows = vec![
            row(1, "Product A", "Location 1", 10.0),
            row(1, "Product A", "Location 1", 12.0),
        ];
        let err = split_rows(rows).unwrap_err();
        assert!(matches!(err, RevisionError::OutOfOrder { .. }));
    }
}
