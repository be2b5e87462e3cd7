use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub ward: &'static str,
}

/// One chōme polygon with its joined crime score.
#[derive(Debug, Clone)]
pub struct BlockArea {
    pub ward_name: Option<String>,
    pub block_name: Option<String>,
    // ward_name + block_name, absent when either field is null
    pub area_name: Option<String>,
    pub geometry: MultiPolygon<f64>,
    pub score: Option<f64>,
    pub score_linear: Option<f64>,
    pub score_log: Option<f64>,
}

impl BlockArea {
    pub fn new(
        ward_name: Option<String>,
        block_name: Option<String>,
        geometry: MultiPolygon<f64>,
    ) -> Self {
        let area_name = match (&ward_name, &block_name) {
            (Some(ward), Some(block)) => Some(crate::join::area_name(ward, block)),
            _ => None,
        };
        Self {
            ward_name,
            block_name,
            area_name,
            geometry,
            score: None,
            score_linear: None,
            score_log: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrimeRecord {
    pub address: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PoiRecord {
    #[serde(default)]
    pub station_name: Option<String>,
    #[serde(rename = "緯度")]
    pub lat: f64,
    #[serde(rename = "経度")]
    pub lon: f64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardRating {
    pub ward: String,
    // (category, score) in column order
    pub ratings: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReviewRecord {
    /// Combined age bracket and gender, e.g. "20代 女性".
    #[serde(rename = "年代")]
    pub descriptor: String,
    #[serde(rename = "住んでいた時期", default)]
    pub period: String,
    #[serde(rename = "評価点", default)]
    pub rating: String,
    #[serde(rename = "満足", default)]
    pub satisfaction: String,
    #[serde(rename = "不満", default)]
    pub complaint: String,
}

/// Immutable tables produced by one load step.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub areas: Vec<BlockArea>,
    pub pois: Vec<PoiRecord>,
    pub ratings: Vec<WardRating>,
}
