use crate::render::{Colormap, StyleOptions};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub defaults: DefaultsConfig,
    pub render: RenderConfig,
}

/// On-disk vector format of the packaged datasets.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    Shp,
    #[serde(alias = "json")]
    GeoJson,
}

impl DataFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Shp => "shp",
            DataFormat::GeoJson => "geojson",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub root: PathBuf,
    pub format: DataFormat,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Data").join("Yearly"),
            format: DataFormat::Shp,
        }
    }
}

/// Fallback naming parameters for callers that don't pass their own.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DefaultsConfig {
    pub country: String,
    pub indicator: String,
    pub level: u8,
    pub year: u16,
    pub crop_column: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            country: "DE".into(),
            indicator: "airtemp".into(),
            level: 2,
            year: 2022,
            crop_column: "v_mean".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub cmap: Colormap,
    pub crop_cmap: Colormap,
    pub edge_color: String, // Hex code
    pub missing_color: String, // Hex code
    pub legend: bool,
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            cmap: Colormap::Blues,
            crop_cmap: Colormap::Viridis,
            edge_color: "#000000".into(),
            missing_color: "#d3d3d3".into(),
            legend: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl RenderConfig {
    /// Style for boundary indicator maps.
    pub fn boundary_style(&self) -> crate::Result<StyleOptions> {
        self.style(self.cmap)
    }

    /// Style for crop land-use maps.
    pub fn crop_style(&self) -> crate::Result<StyleOptions> {
        self.style(self.crop_cmap)
    }

    fn style(&self, cmap: Colormap) -> crate::Result<StyleOptions> {
        Ok(StyleOptions {
            cmap,
            width: self.width,
            height: self.height,
            edge_color: crate::render::hex_to_rgba(&self.edge_color)?,
            missing_color: crate::render::hex_to_rgba(&self.missing_color)?,
            legend: self.legend,
            ..StyleOptions::default()
        })
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
