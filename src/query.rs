//! Column discovery, lookups and aggregations over a loaded [`FeatureCollection`].

use crate::error::{LanduseError, Result};
use crate::types::{FeatureCollection, Value};
use std::collections::HashMap;

/// Unique key column of a boundary collection.
pub const ID_COLUMN: &str = "NUTS_ID";
/// Human-readable label column. Not guaranteed unique.
pub const NAME_COLUMN: &str = "NUTS_NAME";
/// Suffix marking a precomputed statistic column.
pub const MEAN_SUFFIX: &str = "_mean";

fn require_column(collection: &FeatureCollection, column: &str) -> Result<usize> {
    collection
        .column_index(column)
        .ok_or_else(|| LanduseError::ColumnNotFound {
            column: column.to_string(),
        })
}

/// Columns ending in `_mean`, in column order.
pub fn mean_columns(collection: &FeatureCollection) -> Vec<String> {
    collection
        .columns
        .iter()
        .filter(|c| c.ends_with(MEAN_SUFFIX))
        .cloned()
        .collect()
}

pub fn default_mean_column(collection: &FeatureCollection) -> Result<String> {
    mean_columns(collection)
        .into_iter()
        .next()
        .ok_or(LanduseError::NoMeanColumn)
}

/// Value of `column` in the first row whose `NUTS_ID` equals `id`.
///
/// Duplicate ids are not an error: the first row in load order wins.
pub fn get_value_by_id(collection: &FeatureCollection, id: &str, column: &str) -> Result<Value> {
    let id_idx = require_column(collection, ID_COLUMN)?;
    let value_idx = require_column(collection, column)?;

    collection
        .features
        .iter()
        .find(|f| matches!(f.values.get(id_idx), Some(Value::Text(s)) if s == id))
        .map(|f| f.values.get(value_idx).cloned().unwrap_or(Value::Missing))
        .ok_or_else(|| LanduseError::FeatureNotFound {
            id: id.to_string(),
            level: None,
        })
}

/// The full `NUTS_NAME` column in row order, duplicates included.
pub fn get_names(collection: &FeatureCollection) -> Result<Vec<Option<String>>> {
    let idx = require_column(collection, NAME_COLUMN)?;
    Ok(collection
        .features
        .iter()
        .map(|f| f.values.get(idx).and_then(Value::as_label))
        .collect())
}

/// Numeric view of `column`; missing and NaN cells become `None`.
pub(crate) fn numeric_cells(collection: &FeatureCollection, column: &str) -> Result<Vec<Option<f64>>> {
    let cells = collection
        .column(column)
        .ok_or_else(|| LanduseError::ColumnNotFound {
            column: column.to_string(),
        })?;

    cells
        .map(|v| match v {
            _ if v.is_missing() => Ok(None),
            Value::Number(n) => Ok(Some(*n)),
            _ => Err(LanduseError::NonNumericColumn {
                column: column.to_string(),
            }),
        })
        .collect()
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }
}

/// NaN-skipping mean of a whole column. NaN when nothing numeric remains.
pub fn column_mean(collection: &FeatureCollection, column: &str) -> Result<f64> {
    let mut acc = Accumulator::default();
    for cell in numeric_cells(collection, column)? {
        acc.push(cell);
    }
    Ok(acc.mean())
}

/// NaN-skipping mean of `value_column` for each distinct label in `group_column`.
///
/// Rows whose group label is missing are dropped; a group with no numeric
/// values maps to NaN.
pub fn mean_per_group(
    collection: &FeatureCollection,
    group_column: &str,
    value_column: &str,
) -> Result<HashMap<String, f64>> {
    let group_idx = require_column(collection, group_column)?;
    let values = numeric_cells(collection, value_column)?;

    let mut groups: HashMap<String, Accumulator> = HashMap::new();
    for (feature, value) in collection.features.iter().zip(values) {
        let label = match feature.values.get(group_idx).and_then(Value::as_label) {
            Some(label) => label,
            None => continue,
        };
        groups.entry(label).or_default().push(value);
    }

    Ok(groups
        .into_iter()
        .map(|(label, acc)| (label, acc.mean()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Feature;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> FeatureCollection {
        let mut fc = FeatureCollection::new(columns.iter().map(|c| c.to_string()).collect());
        fc.features = rows
            .into_iter()
            .map(|values| Feature {
                geometry: None,
                values,
            })
            .collect();
        fc
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn districts() -> FeatureCollection {
        table(
            &["NUTS_ID", "NUTS_NAME", "temp_mean", "LEVL_CODE", "prec_mean"],
            vec![
                vec![text("DE1"), text("Baden-Württemberg"), Value::Number(9.5), Value::Number(1.0), Value::Number(800.0)],
                vec![text("DE2"), text("Bayern"), Value::Number(8.1), Value::Number(1.0), Value::Missing],
                vec![text("DE2"), text("Bayern"), Value::Number(99.0), Value::Number(1.0), Value::Missing],
            ],
        )
    }

    #[test]
    fn test_mean_columns_keep_order() {
        assert_eq!(mean_columns(&districts()), vec!["temp_mean", "prec_mean"]);
        assert_eq!(default_mean_column(&districts()).unwrap(), "temp_mean");
    }

    #[test]
    fn test_no_mean_column() {
        let fc = table(&["NUTS_ID", "meaning"], vec![]);
        assert!(mean_columns(&fc).is_empty());
        let err = default_mean_column(&fc).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_get_value_by_id() {
        let fc = districts();
        assert_eq!(get_value_by_id(&fc, "DE1", "temp_mean").unwrap(), Value::Number(9.5));
        // first row wins on duplicate ids
        assert_eq!(get_value_by_id(&fc, "DE2", "temp_mean").unwrap(), Value::Number(8.1));
        assert_eq!(get_value_by_id(&fc, "DE2", "prec_mean").unwrap(), Value::Missing);
    }

    #[test]
    fn test_get_value_by_unknown_id() {
        let err = get_value_by_id(&districts(), "DE9", "temp_mean").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "District DE9 not found.");
    }

    #[test]
    fn test_get_value_by_id_unknown_column() {
        let err = get_value_by_id(&districts(), "DE1", "wind_mean").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_get_names_keeps_duplicates() {
        let names = get_names(&districts()).unwrap();
        assert_eq!(
            names,
            vec![
                Some("Baden-Württemberg".to_string()),
                Some("Bayern".to_string()),
                Some("Bayern".to_string())
            ]
        );
    }

    #[test]
    fn test_mean_per_group() {
        let fc = table(
            &["NUTS_NAME", "v_mean"],
            vec![
                vec![text("A"), Value::Number(10.0)],
                vec![text("A"), Value::Number(20.0)],
                vec![text("B"), Value::Number(5.0)],
            ],
        );
        let means = mean_per_group(&fc, "NUTS_NAME", "v_mean").unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means["A"], 15.0);
        assert_eq!(means["B"], 5.0);
    }

    #[test]
    fn test_mean_per_group_skips_missing() {
        let fc = table(
            &["NUTS_NAME", "v_mean"],
            vec![
                vec![text("A"), Value::Number(10.0)],
                vec![text("A"), Value::Number(f64::NAN)],
                vec![text("A"), Value::Missing],
                vec![text("B"), Value::Missing],
                vec![Value::Missing, Value::Number(1000.0)],
            ],
        );
        let means = mean_per_group(&fc, "NUTS_NAME", "v_mean").unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means["A"], 10.0);
        assert!(means["B"].is_nan());
    }

    #[test]
    fn test_mean_per_group_missing_columns() {
        let fc = districts();
        assert!(mean_per_group(&fc, "NAME", "temp_mean").unwrap_err().is_invalid_input());
        assert!(mean_per_group(&fc, "NUTS_NAME", "v_mean").unwrap_err().is_invalid_input());
        assert!(mean_per_group(&fc, "NUTS_NAME", "NUTS_ID").unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_column_mean() {
        let fc = districts();
        let mean = column_mean(&fc, "temp_mean").unwrap();
        assert!((mean - (9.5 + 8.1 + 99.0) / 3.0).abs() < 1e-9);
        assert_eq!(column_mean(&fc, "prec_mean").unwrap(), 800.0);

        let empty = table(&["v_mean"], vec![vec![Value::Missing]]);
        assert!(column_mean(&empty, "v_mean").unwrap().is_nan());
    }
}
