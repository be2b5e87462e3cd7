use crate::error::LookupError;
use crate::types::Station;

pub static STATIONS: [Station; 10] = [
    Station { name: "東京駅", lat: 35.68125882, lon: 139.7662166, ward: "千代田区" },
    Station { name: "有楽町駅", lat: 35.67457594, lon: 139.7632632, ward: "千代田区" },
    Station { name: "大手町駅", lat: 35.68484, lon: 139.76602, ward: "千代田区" },
    Station { name: "二重橋前駅", lat: 35.68044, lon: 139.761601, ward: "千代田区" },
    Station { name: "日比谷駅", lat: 35.67495, lon: 139.7596, ward: "千代田区" },
    Station { name: "京橋駅", lat: 35.676856, lon: 139.7701, ward: "中央区" },
    Station { name: "銀座一丁目駅", lat: 35.67432, lon: 139.767044, ward: "中央区" },
    Station { name: "銀座駅", lat: 35.67123, lon: 139.765, ward: "中央区" },
    Station { name: "日本橋駅", lat: 35.681874, lon: 139.773318, ward: "中央区" },
    Station { name: "宝町駅", lat: 35.675469, lon: 139.771758, ward: "中央区" },
];

pub const AGE_OPTIONS: [&str; 5] = ["10代", "20代", "30代", "40代", "50代以上"];
pub const GENDER_OPTIONS: [&str; 3] = ["男性", "女性", "その他"];

pub fn find_station(name: &str) -> Result<&'static Station, LookupError> {
    STATIONS
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| LookupError::UnknownStation(name.to_string()))
}

/// Returns the canonical option if `value` is one of `options`.
pub fn check_option(
    kind: &'static str,
    options: &[&'static str],
    value: &str,
) -> Result<&'static str, LookupError> {
    options
        .iter()
        .copied()
        .find(|o| *o == value)
        .ok_or_else(|| LookupError::UnknownOption { kind, value: value.to_string() })
}

/// Station, age and gender picked by the user, validated against the fixed lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub station: &'static Station,
    pub age: &'static str,
    pub gender: &'static str,
}

impl Selection {
    pub fn parse(
        station: Option<&str>,
        age: Option<&str>,
        gender: Option<&str>,
    ) -> Result<Self, LookupError> {
        let station = match station {
            Some(name) => find_station(name)?,
            None => &STATIONS[0],
        };
        let age = match age {
            Some(a) => check_option("age", &AGE_OPTIONS, a)?,
            None => AGE_OPTIONS[0],
        };
        let gender = match gender {
            Some(g) => check_option("gender", &GENDER_OPTIONS, g)?,
            None => GENDER_OPTIONS[0],
        };
        Ok(Self { station, age, gender })
    }
}
