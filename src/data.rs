use crate::config::DataFormat;
use crate::error::{LanduseError, Result};
use crate::types::{DatasetKey, Feature, FeatureCollection, Value};
use geo::MultiPolygon;
use shapefile::dbase::FieldValue;
use shapefile::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Build `<root>/<folder>/<folder>.<ext>` for `key` and check that it exists.
pub fn resolve_path(root: &Path, format: DataFormat, key: &DatasetKey) -> Result<PathBuf> {
    let folder_name = key.folder_name();
    let path = root
        .join(&folder_name)
        .join(format!("{}.{}", folder_name, format.extension()));
    debug!("Resolved {:?} to {:?}", key, path);

    if !path.is_file() {
        return Err(LanduseError::DatasetNotFound { path });
    }
    Ok(path)
}

/// Resolve and read one dataset into memory.
pub fn load(root: &Path, format: DataFormat, key: &DatasetKey) -> Result<FeatureCollection> {
    let path = resolve_path(root, format, key)?;
    let collection = match format {
        DataFormat::Shp => load_shapefile(&path)?,
        DataFormat::GeoJson => load_geojson(&path)?,
    };
    info!(
        "Loaded {} features with {} columns from {:?}",
        collection.len(),
        collection.columns.len(),
        path
    );
    Ok(collection)
}

pub fn load_shapefile(path: &Path) -> Result<FeatureCollection> {
    // Records come back as maps, so the column order has to come from the dbf header.
    let table = shapefile::dbase::Reader::from_path(path.with_extension("dbf"))?;
    let columns: Vec<String> = table
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .filter(|name| name != "DeletionFlag")
        .collect();
    drop(table);

    let mut reader = Reader::from_path(path)?;
    let mut collection = FeatureCollection::new(columns);

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let geometry: Option<MultiPolygon<f64>> = match shape {
            shapefile::Shape::Polygon(polygon) => Some(
                polygon
                    .try_into()
                    .map_err(|e| LanduseError::Geometry(format!("{:?}", e)))?,
            ),
            shapefile::Shape::PolygonM(polygon) => Some(
                polygon
                    .try_into()
                    .map_err(|e| LanduseError::Geometry(format!("{:?}", e)))?,
            ),
            shapefile::Shape::PolygonZ(polygon) => Some(
                polygon
                    .try_into()
                    .map_err(|e| LanduseError::Geometry(format!("{:?}", e)))?,
            ),
            shapefile::Shape::NullShape => None,
            other => {
                warn!("Skipping geometry of non-polygon shape {:?}", other.shapetype());
                None
            }
        };

        let values = collection
            .columns
            .iter()
            .map(|name| record.get(name).map(field_to_value).unwrap_or(Value::Missing))
            .collect();

        collection.features.push(Feature { geometry, values });
    }

    Ok(collection)
}

fn field_to_value(field: &FieldValue) -> Value {
    match field {
        // dBASE has no null for character fields; blank means missing
        FieldValue::Character(Some(s)) if !s.trim().is_empty() => Value::Text(s.trim_end().to_string()),
        FieldValue::Numeric(Some(n)) => Value::Number(*n),
        FieldValue::Float(Some(n)) => Value::Number(f64::from(*n)),
        FieldValue::Integer(n) => Value::Number(f64::from(*n)),
        FieldValue::Double(n) | FieldValue::Currency(n) => Value::Number(*n),
        FieldValue::Logical(Some(b)) => Value::Bool(*b),
        FieldValue::Memo(s) => Value::Text(s.clone()),
        FieldValue::Character(_)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => Value::Missing,
        other => Value::Text(format!("{other:?}")),
    }
}

pub fn load_geojson(path: &Path) -> Result<FeatureCollection> {
    use geojson::GeoJson;

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    // Parse the GeoJSON. warning: this loads the whole file into memory.
    let geojson = GeoJson::from_reader(reader).map_err(geojson::Error::from)?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => Vec::new(),
    };

    // Columns in order of first appearance across all features.
    let mut columns: Vec<String> = Vec::new();
    for feature in &features {
        if let Some(props) = &feature.properties {
            for key in props.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut collection = FeatureCollection::new(columns);

    for feature in features {
        let geometry = match feature.geometry {
            Some(geom) => match geo::Geometry::<f64>::try_from(geom.value)? {
                geo::Geometry::MultiPolygon(mp) => Some(mp),
                geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
                _ => {
                    warn!("Skipping geometry of non-polygon feature");
                    None
                }
            },
            None => None,
        };

        let values = collection
            .columns
            .iter()
            .map(|name| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|props| props.get(name))
                    .map(json_to_value)
                    .unwrap_or(Value::Missing)
            })
            .collect();

        collection.features.push(Feature { geometry, values });
    }

    Ok(collection)
}

fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Missing,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}
