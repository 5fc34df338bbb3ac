//! nuts-landuse - lookups, aggregations and choropleth maps over packaged NUTS
//! boundary and crop land-use datasets.
//!
//! Datasets live under a data root as `<root>/<folder>/<folder>.<ext>`, where the
//! folder name is derived from a [`DatasetKey`]. Every call loads its dataset
//! fresh; nothing is cached between calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod config;
pub mod data;
pub mod error;
pub mod query;
pub mod render;
pub mod types;

pub use config::{AppConfig, DataFormat};
pub use error::{LanduseError, Result};
pub use render::{Choropleth, Colormap, StyleOptions};
pub use types::{DatasetKey, DatasetKind, Feature, FeatureCollection, Value};

/// Stateless accessor for the packaged datasets.
///
/// Only the data root and file format are fixed at construction; every
/// dataset parameter is passed per call.
#[derive(Debug, Clone)]
pub struct NutsHandler {
    root: PathBuf,
    format: DataFormat,
}

impl NutsHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_format(root, DataFormat::default())
    }

    pub fn with_format(root: impl Into<PathBuf>, format: DataFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        debug!("config: {config:?}");
        Self::with_format(config.data.root.clone(), config.data.format)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    pub fn resolve_path(&self, key: &DatasetKey) -> Result<PathBuf> {
        data::resolve_path(&self.root, self.format, key)
    }

    pub fn load(&self, key: &DatasetKey) -> Result<FeatureCollection> {
        data::load(&self.root, self.format, key)
    }

    /// All `*_mean` columns of the dataset.
    pub fn mean_columns(&self, key: &DatasetKey) -> Result<Vec<String>> {
        Ok(query::mean_columns(&self.load(key)?))
    }

    /// Value of one district, defaulting to the first `*_mean` column.
    pub fn district_value(&self, key: &DatasetKey, nuts_id: &str, column: Option<&str>) -> Result<Value> {
        let collection = self.load(key)?;
        let column = match column {
            Some(c) => c.to_string(),
            None => query::default_mean_column(&collection)?,
        };
        query::get_value_by_id(&collection, nuts_id, &column).map_err(|e| match e {
            LanduseError::FeatureNotFound { id, .. } => LanduseError::FeatureNotFound {
                id,
                level: Some(key.level),
            },
            other => other,
        })
    }

    /// District names in file order, duplicates included.
    pub fn nuts_names(&self, key: &DatasetKey) -> Result<Vec<Option<String>>> {
        query::get_names(&self.load(key)?)
    }

    /// Mean of `column` over the whole crop dataset.
    pub fn crop_mean(&self, key: &DatasetKey, column: &str) -> Result<f64> {
        query::column_mean(&self.load(key)?, column)
    }

    /// Mean of `column` per district name.
    pub fn crop_mean_per_district(&self, key: &DatasetKey, column: &str) -> Result<HashMap<String, f64>> {
        let collection = self.load(key)?;
        if !collection.has_column(column) {
            return Err(LanduseError::ColumnNotFound {
                column: column.to_string(),
            });
        }
        query::mean_per_group(&collection, query::NAME_COLUMN, column)
    }

    /// Map of an indicator dataset, defaulting to the first `*_mean` column.
    pub fn plot_mean(&self, key: &DatasetKey, column: Option<&str>, style: &StyleOptions) -> Result<Choropleth> {
        let collection = self.load(key)?;
        let column = match column {
            Some(c) => c.to_string(),
            None => query::default_mean_column(&collection)?,
        };
        let style = StyleOptions {
            title: style.title.clone().or_else(|| {
                Some(format!("{} NUTS{} - {} ({})", key.country, key.level, column, key.year))
            }),
            ..style.clone()
        };
        render::render_choropleth(&collection, &column, &style)
    }

    /// Map of a crop land-use dataset.
    pub fn plot_crop_landuse(&self, key: &DatasetKey, column: &str, style: &StyleOptions) -> Result<Choropleth> {
        let collection = self.load(key)?;
        let style = StyleOptions {
            title: style.title.clone().or_else(|| {
                Some(format!("{} NUTS{} ({}) - {}", key.name, key.level, key.year, column))
            }),
            ..style.clone()
        };
        render::render_choropleth(&collection, column, &style)
    }
}
