mod common;

use bounce_scanner::analysis::Potential;
use bounce_scanner::calls::{track_calls, Call};
use bounce_scanner::scanner::{rank_results, Scanner};
use chrono::{TimeZone, Utc};
use common::{chart_json, create_test_config, token_json, StaticProvider, BONK, BOUNCE_CLOSES, SOL, WIF};

fn provider() -> StaticProvider {
    StaticProvider::new()
        .with_token(
            BONK,
            token_json(BONK, "BONK", 2_000_000.0, 700_000.0, 700_000.0),
            Some(chart_json(&BOUNCE_CLOSES)),
        )
        .with_token(WIF, token_json(WIF, "WIF", 5_000_000.0, 50_000.0, 60_000.0), None)
}

#[test_log::test(tokio::test)]
async fn scan_reports_each_address_in_order() {
    let scanner = Scanner::new(provider(), create_test_config().scanner);
    let addresses = vec![WIF.to_string(), SOL.to_string(), BONK.to_string()];

    let scans = scanner.scan(&addresses).await;

    let order: Vec<_> = scans.iter().map(|s| s.address.as_str()).collect();
    assert_eq!(order, vec![WIF, SOL, BONK]);
    assert!(scans[1].outcome.is_err());

    let wif = scans[0].outcome.as_ref().unwrap();
    assert_eq!(wif.scores.pattern, 0);
    assert!(wif.reasons[0].contains("Insufficient historical data"));

    let bonk = scans[2].outcome.as_ref().unwrap();
    assert_eq!(bonk.potential, Potential::TenX);
    assert_eq!(scanner.provider().requests(), 3);
}

#[test_log::test(tokio::test)]
async fn top_scan_is_ranked_and_filtered() {
    let mut config = create_test_config().scanner;
    config.min_total_score = 50;
    let scanner = Scanner::new(provider(), config);

    let results = scanner.scan_top(10).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].metrics.symbol, "BONK");
}

#[test]
fn ranking_without_filter_keeps_everything() {
    let scanner = Scanner::new(provider(), create_test_config().scanner);
    let results = tokio_test::block_on(scanner.scan_top(10)).unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].scores.total >= results[1].scores.total);
    assert_eq!(rank_results(results.clone(), 0), results);
}

#[test]
fn calls_track_current_market_cap() {
    let calls = vec![
        Call {
            address: BONK.to_string(),
            symbol: "BONK".to_string(),
            entry_market_cap: 500_000.0,
            called_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        },
        Call {
            address: SOL.to_string(),
            symbol: "SOL".to_string(),
            entry_market_cap: 1_000_000.0,
            called_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
        },
    ];

    let performances = tokio_test::block_on(track_calls(&provider(), &calls));

    assert_eq!(performances.len(), 1);
    assert_eq!(performances[0].multiple, 4.0);
    assert_eq!(performances[0].pnl_percent, 300.0);
}
