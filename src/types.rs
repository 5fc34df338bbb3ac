use geo::MultiPolygon;
use serde::Serialize;
use std::fmt;

/// Which family of packaged datasets a key points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// NUTS boundaries carrying a precomputed indicator, e.g. `airtemp`.
    Boundary,
    /// Crop land-use polygons aggregated to NUTS regions.
    Crop,
}

/// Everything needed to locate one packaged dataset on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    pub kind: DatasetKind,
    pub country: String,
    /// Indicator name for boundary datasets, crop name for crop datasets.
    pub name: String,
    pub level: u8,
    pub year: u16,
}

impl DatasetKey {
    pub fn boundary(country: impl Into<String>, indicator: impl Into<String>, level: u8, year: u16) -> Self {
        Self {
            kind: DatasetKind::Boundary,
            country: country.into(),
            name: indicator.into(),
            level,
            year,
        }
    }

    pub fn crop(country: impl Into<String>, crop: impl Into<String>, level: u8, year: u16) -> Self {
        Self {
            kind: DatasetKind::Crop,
            country: country.into(),
            name: crop.into(),
            level,
            year,
        }
    }

    /// Folder name, which doubles as the file stem inside that folder.
    ///
    /// Boundary: `{country}_{indicator}_NUTS{level}_{year}`
    /// Crop: `{country}_landuse_{crop}_NUTS{level}_{year}`, with spaces in the
    /// crop name replaced by underscores.
    pub fn folder_name(&self) -> String {
        match self.kind {
            DatasetKind::Boundary => format!(
                "{}_{}_NUTS{}_{}",
                self.country, self.name, self.level, self.year
            ),
            DatasetKind::Crop => format!(
                "{}_landuse_{}_NUTS{}_{}",
                self.country,
                self.name.replace(' ', "_"),
                self.level,
                self.year
            ),
        }
    }
}

/// A single attribute cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Missing,
}

impl Value {
    /// Numeric view of the cell. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Label view of the cell, used for names and grouping keys.
    pub fn as_label(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        Some(self.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Missing => f.write_str("NaN"),
        }
    }
}

static MISSING: Value = Value::Missing;

/// One polygon row: geometry plus attribute cells aligned with
/// [`FeatureCollection::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<MultiPolygon<f64>>,
    pub values: Vec<Value>,
}

/// In-memory table of features, built fresh for every query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub columns: Vec<String>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Iterate the cells of one column in row order.
    pub fn column<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.column_index(column)?;
        Some(
            self.features
                .iter()
                .map(move |f| f.values.get(idx).unwrap_or(&MISSING)),
        )
    }
}
