use crate::types::BlockArea;
use tracing::{info, warn};

/// Min-max scaling over the non-null values; nulls stay null.
///
/// A constant column scales to 0.0 everywhere.
pub fn min_max_scale(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let range = max - min;
    values
        .iter()
        .map(|v| {
            v.map(|v| if range > 0.0 { (v - min) / range } else { 0.0 })
        })
        .collect()
}

/// Fills `score_linear` and `score_log` on every area, scaled across the whole
/// joined set. Non-positive scores have no logarithm and get no log score.
pub fn apply_scores(areas: &mut [BlockArea]) {
    let raw: Vec<Option<f64>> = areas.iter().map(|a| a.score).collect();

    let mut non_positive = 0usize;
    let logs: Vec<Option<f64>> = raw
        .iter()
        .map(|s| match s {
            Some(v) if *v > 0.0 => Some(v.ln()),
            Some(_) => {
                non_positive += 1;
                None
            }
            None => None,
        })
        .collect();
    if non_positive > 0 {
        warn!(count = non_positive, "non-positive crime scores excluded from log scaling");
    }

    let linear = min_max_scale(&raw);
    let log = min_max_scale(&logs);

    for ((area, lin), lg) in areas.iter_mut().zip(linear).zip(log) {
        area.score_linear = lin;
        area.score_log = lg;
    }

    info!(areas = areas.len(), "normalized crime scores");
}

/// Fill opacity used by the map: the log-scaled score when positive, else 0.
pub fn fill_opacity(score_log: Option<f64>) -> f64 {
    match score_log {
        Some(v) if v > 0.0 => v.min(1.0),
        _ => 0.0,
    }
}
