#![allow(dead_code)]

use chian_navi::config::AppConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn square(x0: f64, y0: f64, size: f64) -> String {
    format!(
        "[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]",
        x0 = x0,
        y0 = y0,
        x1 = x0 + size,
        y1 = y0 + size
    )
}

fn feature(ward: &str, block: &str, x0: f64, y0: f64) -> String {
    format!(
        r#"{{"type":"Feature","properties":{{"CITY_NAME":"{ward}","S_NAME":"{block}"}},"geometry":{{"type":"Polygon","coordinates":{coords}}}}}"#,
        coords = square(x0, y0, 0.004)
    )
}

fn collection(features: &[String]) -> String {
    format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
}

/// Two wards, four blocks, three of them with crime totals 42 / 420 / 4200.
pub struct Fixture {
    pub dir: TempDir,
    pub config: AppConfig,
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(root, "chiyoda.geojson", &collection(&[
        feature("千代田区", "丸の内一丁目", 139.760, 35.680),
    ]));
    write(root, "chuo.geojson", &collection(&[
        feature("中央区", "銀座一丁目", 139.764, 35.670),
        feature("中央区", "銀座二丁目", 139.768, 35.670),
        feature("中央区", "京橋一丁目", 139.768, 35.675),
    ]));
    write(root, "hanzai_rankmap.csv",
        "市区町丁,計,侵入窃盗\n中央区銀座１丁目,42,1\n中央区銀座2丁目,420,3\n千代田区丸の内１丁目,4200,9\n港区芝１丁目,7,0\n");
    write(root, "output_tokyo.csv",
        "station_name,緯度,経度,title\n銀座駅,35.6717,139.7650,歌舞伎座\n銀座一丁目駅,35.6745,139.7672,銀座ロフト\n東京駅,35.6812,139.7671,KITTE\n");
    write(root, "kuchikomi.csv",
        "区,総合,買い物,グルメ,自然\n中央区,3.9,4.5,4.4,2.6\n");
    write(root, "kuchikomi_comment_中央区.csv",
        "年代,住んでいた時期,評価点,満足,不満\n\
         20代 女性 会社員,2018年,4,駅が多い,家賃が高い\n\
         20代 男性 会社員,2019年,3,飲食店,騒がしい\n\
         20代 女性 学生,2020年,5,治安が良い,スーパーが少ない\n\
         30代 女性 会社員,2017年,4,買い物,人が多い\n\
         20代 女性 会社員,2021年,4,交通,物価\n\
         20代 女性 会社員,2022年,3,公園,緑が少ない\n");

    let config = AppConfig::from_toml(&format!(
        r#"
        [input]
        ward_geometries = [{chiyoda:?}, {chuo:?}]
        crime_csv = {crime:?}
        poi_csv = {poi:?}
        ratings_csv = {ratings:?}
        review_dir = {dir:?}
        "#,
        chiyoda = root.join("chiyoda.geojson"),
        chuo = root.join("chuo.geojson"),
        crime = root.join("hanzai_rankmap.csv"),
        poi = root.join("output_tokyo.csv"),
        ratings = root.join("kuchikomi.csv"),
        dir = root,
    ))
    .unwrap();

    Fixture { dir, config }
}

fn write(root: &Path, name: &str, content: &str) {
    fs::write(root.join(name), content).unwrap();
}
