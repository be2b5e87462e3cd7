use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// One geometry file per ward (.shp or .geojson), concatenated in order.
    pub ward_geometries: Vec<PathBuf>,
    #[serde(default = "default_ward_field")]
    pub ward_name_field: String,
    #[serde(default = "default_block_field")]
    pub block_name_field: String,
    /// Text encoding of the shapefile `.dbf` tables. When unset, a `.cpg`
    /// file next to the `.shp` decides, otherwise Shift_JIS (e-Stat).
    #[serde(default)]
    pub dbf_encoding: Option<String>,

    pub crime_csv: PathBuf,
    #[serde(default = "default_address_column")]
    pub crime_address_column: String,
    #[serde(default = "default_total_column")]
    pub crime_total_column: String,

    pub poi_csv: PathBuf,

    pub ratings_csv: PathBuf,
    #[serde(default = "default_ward_column")]
    pub ratings_ward_column: String,

    pub review_dir: PathBuf,
    #[serde(default = "default_review_prefix")]
    pub review_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_radius")]
    pub radius_m: f64,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_weight")]
    pub stroke_weight: u32,
    #[serde(default = "default_circle_color")]
    pub circle_color: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            radius_m: default_radius(),
            fill_color: default_fill_color(),
            stroke_color: default_stroke_color(),
            stroke_weight: default_stroke_weight(),
            circle_color: default_circle_color(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

fn default_ward_field() -> String { "CITY_NAME".to_string() }
fn default_block_field() -> String { "S_NAME".to_string() }
fn default_address_column() -> String { "市区町丁".to_string() }
fn default_total_column() -> String { "計".to_string() }
fn default_ward_column() -> String { "区".to_string() }
fn default_review_prefix() -> String { "kuchikomi_comment".to_string() }
fn default_zoom() -> u8 { 15 }
fn default_radius() -> f64 { 500.0 }
fn default_fill_color() -> String { "red".to_string() }
fn default_stroke_color() -> String { "grey".to_string() }
fn default_stroke_weight() -> u32 { 2 }
fn default_circle_color() -> String { "#0000FF".to_string() }
fn default_port() -> u16 { 3000 }

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
