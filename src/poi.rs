use crate::types::PoiRecord;

/// Points of interest whose `station_name` contains the selected station name.
///
/// Plain substring match, so "銀座駅" also picks up records tagged with a
/// longer name that contains it.
pub fn for_station<'a>(pois: &'a [PoiRecord], station: &str) -> Vec<&'a PoiRecord> {
    pois.iter()
        .filter(|p| p.station_name.as_deref().is_some_and(|name| name.contains(station)))
        .collect()
}
