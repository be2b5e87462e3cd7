use crate::config::AppConfig;
use crate::data::load_dataset;
use crate::error::LookupError;
use crate::lookup::AreaIndex;
use crate::profile::ProfilePanel;
use crate::render::{page_for_selection, MapView, PageTemplate};
use crate::stations::{find_station, Selection, STATIONS};
use crate::types::Station;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Only the configuration is shared; every request re-reads the input files.
pub struct AppState {
    pub config: AppConfig,
}

pub struct AppError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<LookupError>() {
            Some(LookupError::UnknownStation(_)) | Some(LookupError::UnknownOption { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Some(LookupError::NoRating(_)) => StatusCode::NOT_FOUND,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = ?self.0, "request failed");
        }
        (status, Json(json!({ "error": format!("{:#}", self.0) }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    station: Option<String>,
    age: Option<String>,
    gender: Option<String>,
}

impl PageParams {
    fn selection(&self) -> Result<Selection, LookupError> {
        Selection::parse(self.station.as_deref(), self.age.as_deref(), self.gender.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct PointParams {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize)]
pub struct AreaResponse {
    area_name: Option<String>,
    ward_name: Option<String>,
    block_name: Option<String>,
    score: Option<f64>,
    score_linear: Option<f64>,
    score_log: Option<f64>,
}

pub fn create_router(config: AppConfig) -> Router {
    let state = Arc::new(AppState { config });
    Router::new()
        .route("/", get(page_handler))
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/stations", get(stations_handler))
        .route("/api/map", get(map_handler))
        .route("/api/profile", get(profile_handler))
        .route("/api/query", get(query_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    info!("Starting server on http://{}", addr);

    let app = create_router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Runs the blocking load/join pipeline off the async runtime.
async fn blocking<T, F>(state: Arc<AppState>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&AppConfig) -> Result<T> + Send + 'static,
{
    let out = tokio::task::spawn_blocking(move || f(&state.config)).await??;
    Ok(out)
}

async fn page_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<PageTemplate, AppError> {
    let selection = params.selection()?;
    let page = blocking(state, move |config| page_for_selection(config, &selection)).await?;
    Ok(page)
}

async fn stations_handler() -> Json<&'static [Station]> {
    Json(&STATIONS[..])
}

async fn map_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<MapView>, AppError> {
    let station = match params.station.as_deref() {
        Some(name) => find_station(name)?,
        None => &STATIONS[0],
    };
    let view = blocking(state, move |config| {
        let dataset = load_dataset(config)?;
        Ok(MapView::build(&dataset, station, &config.map))
    })
    .await?;
    Ok(Json(view))
}

async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<ProfilePanel>, AppError> {
    let selection = params.selection()?;
    let panel = blocking(state, move |config| {
        let dataset = load_dataset(config)?;
        ProfilePanel::build(&dataset.ratings, &config.input, &selection)
    })
    .await?;
    Ok(Json(panel))
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointParams>,
) -> Result<Json<Option<AreaResponse>>, AppError> {
    let found = blocking(state, move |config| {
        let dataset = load_dataset(config)?;
        let index = AreaIndex::build(&dataset.areas);
        Ok(index.locate(&dataset.areas, params.lat, params.lon).map(|area| AreaResponse {
            area_name: area.area_name.clone(),
            ward_name: area.ward_name.clone(),
            block_name: area.block_name.clone(),
            score: area.score,
            score_linear: area.score_linear,
            score_log: area.score_log,
        }))
    })
    .await?;
    Ok(Json(found))
}
