use crate::numerals::normalize_address;
use crate::types::{BlockArea, CrimeRecord};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{info, warn};

/// Composite key of a block polygon: ward and block names with no separator.
pub fn area_name(ward: &str, block: &str) -> String {
    let mut name = String::with_capacity(ward.len() + block.len());
    name.push_str(ward);
    name.push_str(block);
    name
}

/// Builds the normalized address -> total table. The first record wins on
/// duplicate keys so that the join stays one-to-one per polygon.
pub fn score_table(records: &[CrimeRecord]) -> HashMap<String, f64> {
    let mut table = HashMap::with_capacity(records.len());
    for record in records {
        let key = normalize_address(&record.address);
        match table.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record.total);
            }
            Entry::Occupied(slot) => {
                warn!(address = %record.address, key = %slot.key(), "duplicate crime address, keeping first");
            }
        }
    }
    table
}

/// Left join of crime totals onto block polygons by exact area name.
///
/// Every polygon is kept; polygons without a match end up with `score = None`.
pub fn join_scores(mut areas: Vec<BlockArea>, records: &[CrimeRecord]) -> Vec<BlockArea> {
    let table = score_table(records);
    let mut matched = 0usize;

    for area in &mut areas {
        area.score = area
            .area_name
            .as_ref()
            .and_then(|name| table.get(name))
            .copied();
        if area.score.is_some() {
            matched += 1;
        }
    }

    info!(
        polygons = areas.len(),
        matched,
        unmatched = areas.len() - matched,
        "joined crime scores onto blocks"
    );
    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)
        ]])
    }

    fn area(ward: &str, block: &str) -> BlockArea {
        BlockArea::new(Some(ward.to_string()), Some(block.to_string()), square())
    }

    fn record(address: &str, total: f64) -> CrimeRecord {
        CrimeRecord { address: address.to_string(), total }
    }

    #[test]
    fn area_name_is_plain_concatenation() {
        assert_eq!(area_name("中央区", "銀座一丁目"), "中央区銀座一丁目");
        assert_eq!(area_name("", "丸の内"), "丸の内");
    }

    #[test]
    fn full_width_address_matches_kanji_block() {
        let areas = vec![area("中央区", "銀座一丁目")];
        let joined = join_scores(areas, &[record("中央区銀座１丁目", 42.0)]);
        assert_eq!(joined[0].score, Some(42.0));
    }

    #[test]
    fn left_join_keeps_every_polygon() {
        let areas = vec![
            area("中央区", "銀座一丁目"),
            area("中央区", "銀座二丁目"),
            area("千代田区", "丸の内一丁目"),
            BlockArea::new(Some("千代田区".into()), None, square()),
        ];
        let records = [record("中央区銀座2丁目", 7.0), record("港区芝1丁目", 3.0)];
        let joined = join_scores(areas, &records);

        assert_eq!(joined.len(), 4);
        assert_eq!(joined[0].score, None);
        assert_eq!(joined[1].score, Some(7.0));
        assert_eq!(joined[2].score, None);
        assert_eq!(joined[3].score, None);
    }

    #[test]
    fn shared_area_name_gets_same_score() {
        let areas = vec![area("中央区", "佃一丁目"), area("中央区", "佃一丁目")];
        let joined = join_scores(areas, &[record("中央区佃１丁目", 11.0)]);
        assert!(joined.iter().all(|a| a.score == Some(11.0)));
    }

    #[test]
    fn no_partial_matching() {
        let areas = vec![area("中央区", "銀座一丁目")];
        let joined = join_scores(areas, &[record("中央区銀座", 42.0)]);
        assert_eq!(joined[0].score, None);
    }

    #[test]
    fn duplicate_address_keeps_first_total() {
        let table = score_table(&[record("中央区京橋1丁目", 5.0), record("中央区京橋１丁目", 9.0)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table["中央区京橋一丁目"], 5.0);
    }
}
