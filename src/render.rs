use crate::chart::RadarChart;
use crate::config::{AppConfig, MapConfig};
use crate::data::load_dataset;
use crate::poi;
use crate::profile::ProfilePanel;
use crate::scoring::fill_opacity;
use crate::stations::{Selection, AGE_OPTIONS, GENDER_OPTIONS, STATIONS};
use crate::types::{BlockArea, Dataset, ReviewRecord, Station};
use anyhow::{Context, Result};
use askama::Template;
use geojson::{Feature, FeatureCollection, Geometry};
use serde::Serialize;
use serde_json::{json, Map};

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub popup: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Circle {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockStyle {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_weight: u32,
}

/// Everything the browser needs to draw the crime map for one station.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub style: BlockStyle,
    pub blocks: FeatureCollection,
    pub station: Marker,
    pub circle: Circle,
    pub pois: Vec<Marker>,
}

fn block_feature(area: &BlockArea) -> Feature {
    let mut properties = Map::new();
    properties.insert("area_name".into(), json!(area.area_name));
    properties.insert("ward_name".into(), json!(area.ward_name));
    properties.insert("block_name".into(), json!(area.block_name));
    properties.insert("score".into(), json!(area.score));
    properties.insert("score_linear".into(), json!(area.score_linear));
    properties.insert("score_log".into(), json!(area.score_log));
    properties.insert("fill_opacity".into(), json!(fill_opacity(area.score_log)));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&area.geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

impl MapView {
    pub fn build(dataset: &Dataset, station: &Station, config: &MapConfig) -> Self {
        let features = dataset.areas.iter().map(block_feature).collect();

        let pois = poi::for_station(&dataset.pois, station.name)
            .into_iter()
            .map(|p| Marker { lat: p.lat, lon: p.lon, popup: p.title.clone() })
            .collect();

        Self {
            center: [station.lat, station.lon],
            zoom: config.zoom,
            style: BlockStyle {
                fill_color: config.fill_color.clone(),
                stroke_color: config.stroke_color.clone(),
                stroke_weight: config.stroke_weight,
            },
            blocks: FeatureCollection { bbox: None, features, foreign_members: None },
            station: Marker { lat: station.lat, lon: station.lon, popup: station.name.to_string() },
            circle: Circle {
                lat: station.lat,
                lon: station.lon,
                radius_m: config.radius_m,
                color: config.circle_color.clone(),
            },
            pois,
        }
    }
}

pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

/// One `<select>` of the sidebar form.
pub struct Control {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<SelectOption>,
}

impl Control {
    fn new(name: &'static str, label: &'static str, options: &[&'static str], selected: &str) -> Self {
        let options = options
            .iter()
            .copied()
            .map(|value| SelectOption { value, selected: value == selected })
            .collect();
        Self { name, label, options }
    }
}

/// Standalone HTML page: selectors, Leaflet map, radar chart and reviews.
/// Askama escapes every interpolated value except the embedded map JSON.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub station: &'static str,
    pub controls: Vec<Control>,
    pub ward: String,
    pub chart: Option<RadarChart>,
    pub reviews: Vec<ReviewRecord>,
    pub view_json: String,
}

impl PageTemplate {
    pub fn new(view: &MapView, panel: &ProfilePanel, selection: &Selection) -> Result<Self> {
        // `</` inside a script block would end it early
        let view_json = serde_json::to_string(view)
            .context("Failed to serialize map view")?
            .replace("</", "<\\/");

        let station_names: Vec<&'static str> = STATIONS.iter().map(|s| s.name).collect();
        let controls = vec![
            Control::new("station", "あなたの住みたいエリア（駅名）を選択してください。", &station_names, selection.station.name),
            Control::new("age", "年代を選択してください", &AGE_OPTIONS, selection.age),
            Control::new("gender", "性別を選択してください", &GENDER_OPTIONS, selection.gender),
        ];

        Ok(Self {
            station: selection.station.name,
            controls,
            ward: panel.ward.clone(),
            chart: RadarChart::build(&panel.radar),
            reviews: panel.reviews.clone(),
            view_json,
        })
    }
}

pub fn render_page(view: &MapView, panel: &ProfilePanel, selection: &Selection) -> Result<String> {
    PageTemplate::new(view, panel, selection)?
        .render()
        .context("Failed to render page template")
}

/// One full page load: read every table, join and score, then fill the template.
pub fn page_for_selection(config: &AppConfig, selection: &Selection) -> Result<PageTemplate> {
    let dataset = load_dataset(config)?;
    let view = MapView::build(&dataset, selection.station, &config.map);
    let panel = ProfilePanel::build(&dataset.ratings, &config.input, selection)?;
    PageTemplate::new(&view, &panel, selection)
}

pub fn render_selection(config: &AppConfig, selection: &Selection) -> Result<String> {
    page_for_selection(config, selection)?
        .render()
        .context("Failed to render page template")
}
