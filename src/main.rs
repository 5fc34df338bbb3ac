use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nuts_landuse::{AppConfig, Colormap, DatasetKey, NutsHandler, StyleOptions};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults apply when omitted
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the data root from the configuration
    #[arg(long, value_name = "DIR", global = true)]
    data_root: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct BoundaryArgs {
    #[arg(long)]
    country: Option<String>,
    /// Indicator name, e.g. airtemp
    #[arg(long)]
    indicator: Option<String>,
    #[arg(long)]
    level: Option<u8>,
    #[arg(long)]
    year: Option<u16>,
}

impl BoundaryArgs {
    fn key(&self, config: &AppConfig) -> DatasetKey {
        let defaults = &config.defaults;
        DatasetKey::boundary(
            self.country.clone().unwrap_or_else(|| defaults.country.clone()),
            self.indicator.clone().unwrap_or_else(|| defaults.indicator.clone()),
            self.level.unwrap_or(defaults.level),
            self.year.unwrap_or(defaults.year),
        )
    }
}

#[derive(Args, Debug)]
struct CropArgs {
    /// Crop name; spaces are allowed
    crop: String,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    level: Option<u8>,
    #[arg(long)]
    year: Option<u16>,
    /// Value column, defaults to the configured crop column
    #[arg(long)]
    column: Option<String>,
}

impl CropArgs {
    fn key(&self, config: &AppConfig) -> DatasetKey {
        let defaults = &config.defaults;
        DatasetKey::crop(
            self.country.clone().unwrap_or_else(|| defaults.country.clone()),
            self.crop.clone(),
            self.level.unwrap_or(defaults.level),
            self.year.unwrap_or(defaults.year),
        )
    }

    fn column(&self, config: &AppConfig) -> String {
        self.column
            .clone()
            .unwrap_or_else(|| config.defaults.crop_column.clone())
    }
}

#[derive(Args, Debug)]
struct StyleArgs {
    #[arg(long)]
    cmap: Option<Colormap>,
    #[arg(long)]
    vmin: Option<f64>,
    #[arg(long)]
    vmax: Option<f64>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    no_legend: bool,
    /// Output PNG; defaults to `<output_dir>/<dataset folder>.png`
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl StyleArgs {
    fn apply(&self, mut style: StyleOptions) -> StyleOptions {
        if let Some(cmap) = self.cmap {
            style.cmap = cmap;
        }
        style.vmin = self.vmin.or(style.vmin);
        style.vmax = self.vmax.or(style.vmax);
        style.width = self.width.unwrap_or(style.width);
        style.height = self.height.unwrap_or(style.height);
        style.legend = style.legend && !self.no_legend;
        style
    }

    fn output(&self, config: &AppConfig, key: &DatasetKey) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            config
                .render
                .output_dir
                .join(format!("{}.png", key.folder_name()))
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the *_mean columns of a boundary dataset
    Columns {
        #[command(flatten)]
        dataset: BoundaryArgs,
    },
    /// Look up one district's value
    Value {
        nuts_id: String,
        #[command(flatten)]
        dataset: BoundaryArgs,
        /// Defaults to the first *_mean column
        #[arg(long)]
        column: Option<String>,
    },
    /// List district names of a boundary dataset
    Names {
        #[command(flatten)]
        dataset: BoundaryArgs,
    },
    /// Mean of a crop dataset column
    CropMean {
        #[command(flatten)]
        dataset: CropArgs,
    },
    /// Mean of a crop dataset column per district
    CropMeans {
        #[command(flatten)]
        dataset: CropArgs,
    },
    /// Render a boundary indicator map to PNG
    Plot {
        #[command(flatten)]
        dataset: BoundaryArgs,
        #[arg(long)]
        column: Option<String>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Render a crop land-use map to PNG
    PlotCrop {
        #[command(flatten)]
        dataset: CropArgs,
        #[command(flatten)]
        style: StyleArgs,
    },
}

fn print<T: Serialize + std::fmt::Debug>(json: bool, value: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{:?}", value);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    debug!("args: {cli:?}");

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(root) = &cli.data_root {
        config.data.root = root.clone();
    }
    let handler = NutsHandler::from_config(&config);

    match &cli.command {
        Commands::Columns { dataset } => {
            let key = dataset.key(&config);
            let columns = handler
                .mean_columns(&key)
                .with_context(|| format!("Failed to list columns of {}", key.folder_name()))?;
            if cli.json {
                print(true, &columns)?;
            } else {
                columns.iter().for_each(|c| println!("{c}"));
            }
        }
        Commands::Value {
            nuts_id,
            dataset,
            column,
        } => {
            let key = dataset.key(&config);
            let value = handler
                .district_value(&key, nuts_id, column.as_deref())
                .with_context(|| format!("Failed to look up {} in {}", nuts_id, key.folder_name()))?;
            if cli.json {
                print(true, &value)?;
            } else {
                println!("{value}");
            }
        }
        Commands::Names { dataset } => {
            let key = dataset.key(&config);
            let names = handler
                .nuts_names(&key)
                .with_context(|| format!("Failed to list names of {}", key.folder_name()))?;
            if cli.json {
                print(true, &names)?;
            } else {
                for name in &names {
                    println!("{}", name.as_deref().unwrap_or("NaN"));
                }
            }
        }
        Commands::CropMean { dataset } => {
            let key = dataset.key(&config);
            let mean = handler
                .crop_mean(&key, &dataset.column(&config))
                .with_context(|| format!("Failed to average {}", key.folder_name()))?;
            print(cli.json, &mean)?;
        }
        Commands::CropMeans { dataset } => {
            let key = dataset.key(&config);
            let means = handler
                .crop_mean_per_district(&key, &dataset.column(&config))
                .with_context(|| format!("Failed to average {} per district", key.folder_name()))?;
            let mut rows: Vec<_> = means.into_iter().collect();
            rows.sort_by(|a, b| a.0.cmp(&b.0));
            if cli.json {
                print(true, &rows.into_iter().collect::<std::collections::BTreeMap<_, _>>())?;
            } else {
                rows.iter().for_each(|(name, mean)| println!("{name}\t{mean}"));
            }
        }
        Commands::Plot {
            dataset,
            column,
            style,
        } => {
            let key = dataset.key(&config);
            let options = style.apply(config.render.boundary_style()?);
            let map = handler
                .plot_mean(&key, column.as_deref(), &options)
                .with_context(|| format!("Failed to plot {}", key.folder_name()))?;
            let output = style.output(&config, &key);
            map.save(&output)?;
            info!("{}", map.title);
            println!("{}", output.display());
        }
        Commands::PlotCrop { dataset, style } => {
            let key = dataset.key(&config);
            let options = style.apply(config.render.crop_style()?);
            let map = handler
                .plot_crop_landuse(&key, &dataset.column(&config), &options)
                .with_context(|| format!("Failed to plot {}", key.folder_name()))?;
            let output = style.output(&config, &key);
            map.save(&output)?;
            info!("{}", map.title);
            println!("{}", output.display());
        }
    }

    Ok(())
}
