use crate::config::{AppConfig, InputConfig};
use crate::dbf;
use crate::join::join_scores;
use crate::scoring::apply_scores;
use crate::types::{BlockArea, CrimeRecord, Dataset, PoiRecord, ReviewRecord, WardRating};
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, StringRecord};
use geo::MultiPolygon;
use shapefile::{Reader, ShapeReader};
use shapefile::dbase::{self, FieldValue, Record};
use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Reads every input table, joins crime scores onto the block polygons and
/// scales them. Nothing is cached; each call starts from the files.
pub fn load_dataset(config: &AppConfig) -> Result<Dataset> {
    info!("Loading data...");
    let input = &config.input;

    let areas = load_ward_geometries(input)?;
    info!(areas = areas.len(), files = input.ward_geometries.len(), "loaded block geometry");

    let crime = load_crime_records(input)?;
    info!(records = crime.len(), "loaded crime table");

    let mut areas = join_scores(areas, &crime);
    apply_scores(&mut areas);

    let pois = load_pois(&input.poi_csv)?;
    let ratings = load_ratings(&input.ratings_csv, &input.ratings_ward_column)?;
    info!(pois = pois.len(), wards_rated = ratings.len(), "loaded poi and rating tables");

    Ok(Dataset { areas, pois, ratings })
}

pub fn load_ward_geometries(input: &InputConfig) -> Result<Vec<BlockArea>> {
    let mut areas = Vec::new();
    for path in &input.ward_geometries {
        let extension = path.extension()
            .and_then(|e| e.to_str())
            .map(|s: &str| s.to_lowercase())
            .ok_or_else(|| anyhow!("Input geometry file has no extension: {:?}", path))?;

        let ward_areas = match extension.as_str() {
            "shp" => load_shapefile(path, input)?,
            "json" | "geojson" => load_geojson(path, input)?,
            _ => return Err(anyhow!("Unsupported geometry format: {}", extension)),
        };
        debug!(path = ?path, areas = ward_areas.len(), "loaded ward geometry");
        areas.extend(ward_areas);
    }
    Ok(areas)
}

fn shape_text(record: &Record, field: &str) -> Result<Option<String>> {
    match record.get(field) {
        Some(FieldValue::Character(value)) => Ok(value.as_ref().map(|s| s.trim().to_string())),
        Some(_) => Err(anyhow!("Shapefile field '{}' must be a string", field)),
        None => Err(anyhow!("Field '{}' not found in Shapefile", field)),
    }
}

fn load_shapefile(path: &Path, input: &InputConfig) -> Result<Vec<BlockArea>> {
    let shape_reader = ShapeReader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let dbf_path = path.with_extension("dbf");
    let encoding = dbf::encoding_for(path, input.dbf_encoding.as_deref())?;
    let raw = fs::read(&dbf_path)
        .with_context(|| format!("Failed to read attribute table: {:?}", dbf_path))?;
    let table = dbf::transcode(&raw, encoding)
        .with_context(|| format!("Failed to decode {:?} as {}", dbf_path, encoding.name()))?;
    let dbf_reader = dbase::Reader::new(Cursor::new(table))
        .with_context(|| format!("Failed to parse attribute table: {:?}", dbf_path))?;
    debug!(path = ?dbf_path, encoding = encoding.name(), "opened attribute table");

    let mut reader = Reader::new(shape_reader, dbf_reader);

    let mut areas = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let ward = shape_text(&record, &input.ward_name_field)?;
        let block = shape_text(&record, &input.block_name_field)?;

        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            shapefile::Shape::PolygonM(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            _ => continue, // Skip non-polygon shapes
        };

        areas.push(BlockArea::new(ward, block, geometry));
    }

    Ok(areas)
}

fn load_geojson(path: &Path, input: &InputConfig) -> Result<Vec<BlockArea>> {
    use geojson::GeoJson;
    use std::io::BufReader;

    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse GeoJSON: {:?}", path))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection: {:?}", path)),
    };

    let mut areas = Vec::new();

    for feature in collection.features {
        let text = |field: &str| -> Option<String> {
            match feature.properties.as_ref()?.get(field)? {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        };
        let ward = text(&input.ward_name_field);
        let block = text(&input.block_name_field);

        let geometry = match feature.geometry {
            Some(geom) => {
                let geom: geo::Geometry<f64> = geom.value.try_into()
                    .map_err(|e| anyhow!("Failed to convert geojson geometry: {:?}", e))?;
                match geom {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue, // Skip points/lines
                }
            }
            None => continue,
        };

        areas.push(BlockArea::new(ward, block, geometry));
    }

    Ok(areas)
}

fn open_csv(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    Ok(ReaderBuilder::new().flexible(true).from_reader(file))
}

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers.iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        .ok_or_else(|| anyhow!("Column '{}' not found in {:?}", name, path))
}

/// Header row with any UTF-8 BOM removed, so serde field renames line up.
fn clean_headers<R: Read>(rdr: &mut csv::Reader<R>) -> Result<StringRecord> {
    let headers: StringRecord = rdr.headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();
    rdr.set_headers(headers.clone());
    Ok(headers)
}

pub fn load_crime_records(input: &InputConfig) -> Result<Vec<CrimeRecord>> {
    let path = &input.crime_csv;
    let mut rdr = open_csv(path)?;
    let headers = clean_headers(&mut rdr)?;

    let address_idx = column_index(&headers, &input.crime_address_column, path)?;
    let total_idx = column_index(&headers, &input.crime_total_column, path)?;

    let mut records = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let address = record.get(address_idx).unwrap_or("").trim();
        if address.is_empty() {
            continue;
        }
        let raw_total = record.get(total_idx).unwrap_or("").trim();
        match raw_total.replace(',', "").parse::<f64>() {
            Ok(total) if total.is_finite() => {
                records.push(CrimeRecord { address: address.to_string(), total })
            }
            _ => warn!(row = line + 2, address, value = raw_total, "unparsable crime total, row skipped"),
        }
    }
    Ok(records)
}

pub fn load_pois(path: &Path) -> Result<Vec<PoiRecord>> {
    let mut rdr = open_csv(path)?;
    clean_headers(&mut rdr)?;
    rdr.deserialize()
        .collect::<Result<Vec<PoiRecord>, _>>()
        .with_context(|| format!("Failed to parse POI table: {:?}", path))
}

/// Ward rating table: one ward column, every other column is a rating category.
/// A blank cell leaves that category out for the ward; any other non-numeric
/// cell is an error.
pub fn load_ratings(path: &Path, ward_column: &str) -> Result<Vec<WardRating>> {
    let mut rdr = open_csv(path)?;
    let headers = clean_headers(&mut rdr)?;
    let ward_idx = column_index(&headers, ward_column, path)?;

    let mut ratings = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let ward = record.get(ward_idx).unwrap_or("").trim().to_string();
        let mut values = Vec::new();
        for (idx, category) in headers.iter().enumerate() {
            if idx == ward_idx {
                continue;
            }
            let raw = record.get(idx).unwrap_or("").trim();
            if raw.is_empty() {
                warn!(ward = ward.as_str(), category, "blank rating, category left out");
                continue;
            }
            let value = raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| anyhow!("Rating '{}' for {} is not a number: {:?}", category, ward, raw))?;
            values.push((category.to_string(), value));
        }
        ratings.push(WardRating { ward, ratings: values });
    }
    Ok(ratings)
}

pub fn load_reviews(path: &Path) -> Result<Vec<ReviewRecord>> {
    let mut rdr = open_csv(path)?;
    clean_headers(&mut rdr)?;
    rdr.deserialize()
        .collect::<Result<Vec<ReviewRecord>, _>>()
        .with_context(|| format!("Failed to parse review file: {:?}", path))
}
