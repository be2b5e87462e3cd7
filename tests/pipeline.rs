mod common;

use approx::assert_relative_eq;
use chian_navi::data::load_dataset;
use chian_navi::render::{render_selection, MapView};
use chian_navi::stations::Selection;

#[test]
fn join_keeps_every_block_and_scores_matches() {
    let fx = common::fixture();
    let dataset = load_dataset(&fx.config).unwrap();

    assert_eq!(dataset.areas.len(), 4);
    let by_name = |name: &str| {
        dataset.areas.iter().find(|a| a.area_name.as_deref() == Some(name)).unwrap()
    };

    let ginza1 = by_name("中央区銀座一丁目");
    assert_eq!(ginza1.score, Some(42.0));
    assert_eq!(ginza1.score_linear, Some(0.0));
    assert_eq!(ginza1.score_log, Some(0.0));

    let ginza2 = by_name("中央区銀座二丁目");
    assert_eq!(ginza2.score, Some(420.0));
    assert_relative_eq!(ginza2.score_linear.unwrap(), 378.0 / 4158.0, epsilon = 1e-12);
    assert_relative_eq!(ginza2.score_log.unwrap(), 0.5, epsilon = 1e-12);

    let marunouchi = by_name("千代田区丸の内一丁目");
    assert_eq!(marunouchi.score_linear, Some(1.0));
    assert_eq!(marunouchi.score_log, Some(1.0));

    let kyobashi = by_name("中央区京橋一丁目");
    assert_eq!(kyobashi.score, None);
    assert_eq!(kyobashi.score_log, None);
}

#[test]
fn map_view_for_ginza() {
    let fx = common::fixture();
    let dataset = load_dataset(&fx.config).unwrap();
    let selection = Selection::parse(Some("銀座駅"), None, None).unwrap();
    let view = MapView::build(&dataset, selection.station, &fx.config.map);

    assert_eq!(view.blocks.features.len(), 4);
    assert_eq!(view.pois.len(), 1);
    assert_eq!(view.pois[0].popup, "歌舞伎座");
    assert_eq!(view.circle.color, "#0000FF");
}

#[test]
fn page_shows_three_matching_reviews() {
    let fx = common::fixture();
    let selection = Selection::parse(Some("銀座駅"), Some("20代"), Some("女性")).unwrap();
    let page = render_selection(&fx.config, &selection).unwrap();

    assert_eq!(page.matches("満足ポイント：").count(), 3);
    assert!(page.contains("駅が多い"));
    assert!(page.contains("治安が良い"));
    assert!(page.contains("交通"));
    // fourth match and non-matching rows stay out
    assert!(!page.contains("緑が少ない"));
    assert!(!page.contains("騒がしい"));
    assert!(!page.contains("人が多い"));
}

#[test]
fn page_with_no_matching_reviews_is_still_rendered() {
    let fx = common::fixture();
    let selection = Selection::parse(Some("京橋駅"), Some("50代以上"), Some("その他")).unwrap();
    let page = render_selection(&fx.config, &selection).unwrap();
    assert_eq!(page.matches("満足ポイント：").count(), 0);
    assert!(page.contains("住環境評価チャート"));
}

#[test]
fn station_without_rating_fails_visibly() {
    let fx = common::fixture();
    let selection = Selection::parse(Some("東京駅"), None, None).unwrap();
    let err = render_selection(&fx.config, &selection).unwrap_err();
    assert!(err.to_string().contains("千代田区"));
}

#[test]
fn missing_review_file_is_an_error() {
    let fx = common::fixture();
    std::fs::remove_file(fx.dir.path().join("kuchikomi_comment_中央区.csv")).unwrap();
    let selection = Selection::parse(Some("銀座駅"), None, None).unwrap();
    assert!(render_selection(&fx.config, &selection).is_err());
}
