use crate::config::InputConfig;
use crate::data::load_reviews;
use crate::error::LookupError;
use crate::stations::Selection;
use crate::types::{ReviewRecord, WardRating};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const MAX_REVIEWS: usize = 3;
pub const RADAR_RANGE: (f64, f64) = (0.0, 5.0);

/// First rating row for `ward`. Extra rows for the same ward are ignored.
pub fn ward_rating<'a>(ratings: &'a [WardRating], ward: &str) -> Result<&'a WardRating, LookupError> {
    let mut rows = ratings.iter().filter(|r| r.ward == ward);
    let first = rows.next().ok_or_else(|| LookupError::NoRating(ward.to_string()))?;
    let extra = rows.count();
    if extra > 0 {
        warn!(ward, extra, "multiple rating rows for ward, using the first");
    }
    Ok(first)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarData {
    pub axes: Vec<String>,
    pub values: Vec<f64>,
    pub range: (f64, f64),
}

impl RadarData {
    pub fn from_rating(rating: &WardRating) -> Self {
        let (axes, values) = rating.ratings.iter().cloned().unzip();
        Self { axes, values, range: RADAR_RANGE }
    }
}

pub fn review_path(dir: &Path, prefix: &str, ward: &str) -> PathBuf {
    dir.join(format!("{prefix}_{ward}.csv"))
}

/// Reviews whose descriptor mentions both the age bracket and the gender,
/// capped at [`MAX_REVIEWS`], in file order.
pub fn filter_reviews<'a>(reviews: &'a [ReviewRecord], age: &str, gender: &str) -> Vec<&'a ReviewRecord> {
    reviews
        .iter()
        .filter(|r| r.descriptor.contains(age) && r.descriptor.contains(gender))
        .take(MAX_REVIEWS)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePanel {
    pub ward: String,
    pub radar: RadarData,
    pub reviews: Vec<ReviewRecord>,
}

impl ProfilePanel {
    /// Reads the ward's review file (a missing file is an error) and combines
    /// it with the ward's rating row.
    pub fn build(ratings: &[WardRating], input: &InputConfig, selection: &Selection) -> Result<Self> {
        let ward = selection.station.ward;
        let rating = ward_rating(ratings, ward)?;

        let path = review_path(&input.review_dir, &input.review_prefix, ward);
        let reviews = load_reviews(&path)?;
        let reviews = filter_reviews(&reviews, selection.age, selection.gender)
            .into_iter()
            .cloned()
            .collect();

        Ok(Self {
            ward: ward.to_string(),
            radar: RadarData::from_rating(rating),
            reviews,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(descriptor: &str, satisfaction: &str) -> ReviewRecord {
        ReviewRecord {
            descriptor: descriptor.to_string(),
            period: "2020年".to_string(),
            rating: "4".to_string(),
            satisfaction: satisfaction.to_string(),
            complaint: String::new(),
        }
    }

    fn rating(ward: &str, overall: f64) -> WardRating {
        WardRating {
            ward: ward.to_string(),
            ratings: vec![("総合".into(), overall), ("買い物".into(), 4.1), ("自然".into(), 2.8)],
        }
    }

    #[test]
    fn filter_requires_both_age_and_gender() {
        let reviews = vec![
            review("20代 女性", "a"),
            review("20代 男性", "b"),
            review("30代 女性", "c"),
            review("20代女性 会社員", "d"),
        ];
        let hits = filter_reviews(&reviews, "20代", "女性");
        assert!(hits.iter().all(|r| r.descriptor.contains("20代") && r.descriptor.contains("女性")));
        let ids: Vec<_> = hits.iter().map(|r| r.satisfaction.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn at_most_three_reviews() {
        let reviews: Vec<_> = (0..6).map(|i| review("40代 男性", &i.to_string())).collect();
        let hits = filter_reviews(&reviews, "40代", "男性");
        assert_eq!(hits.len(), MAX_REVIEWS);
        assert_eq!(hits[2].satisfaction, "2");
    }

    #[test]
    fn empty_filter_result() {
        let reviews = vec![review("50代以上 男性", "x")];
        assert!(filter_reviews(&reviews, "10代", "男性").is_empty());
    }

    #[test]
    fn rating_lookup_takes_first_row() {
        let ratings = vec![rating("千代田区", 3.0), rating("中央区", 3.8), rating("中央区", 1.0)];
        assert_eq!(ward_rating(&ratings, "中央区").unwrap().ratings[0].1, 3.8);
        assert_eq!(
            ward_rating(&ratings, "港区").unwrap_err(),
            LookupError::NoRating("港区".into())
        );
    }

    #[test]
    fn radar_axes_follow_columns() {
        let radar = RadarData::from_rating(&rating("中央区", 3.8));
        assert_eq!(radar.axes, vec!["総合", "買い物", "自然"]);
        assert_eq!(radar.values, vec![3.8, 4.1, 2.8]);
        assert_eq!(radar.range, (0.0, 5.0));
    }

    #[test]
    fn review_file_name_uses_ward() {
        let path = review_path(Path::new("data"), "kuchikomi_comment", "千代田区");
        assert_eq!(path, Path::new("data/kuchikomi_comment_千代田区.csv"));
    }
}
