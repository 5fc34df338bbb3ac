use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum LanduseError {
    #[error("dataset not found: {}", path.display())]
    DatasetNotFound { path: PathBuf },
    #[error("District {id} not found{}.", level.map(|l| format!(" in NUTS{l}")).unwrap_or_default())]
    FeatureNotFound { id: String, level: Option<u8> },
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },
    #[error("no *_mean column found")]
    NoMeanColumn,
    #[error("column '{column}' is not numeric")]
    NonNumericColumn { column: String },
    #[error("invalid style: {0}")]
    InvalidStyle(String),
    #[error("failed to convert geometry: {0}")]
    Geometry(String),
    #[error(transparent)]
    Shapefile(#[from] shapefile::Error),
    #[error(transparent)]
    Dbase(#[from] shapefile::dbase::Error),
    #[error(transparent)]
    GeoJson(#[from] geojson::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Font(#[from] ab_glyph::InvalidFont),
}

impl LanduseError {
    /// A requested file, or a requested key within a file, does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LanduseError::DatasetNotFound { .. } | LanduseError::FeatureNotFound { .. }
        )
    }

    /// The caller asked for something the loaded table cannot provide.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            LanduseError::ColumnNotFound { .. }
                | LanduseError::NoMeanColumn
                | LanduseError::NonNumericColumn { .. }
                | LanduseError::InvalidStyle(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LanduseError>;
