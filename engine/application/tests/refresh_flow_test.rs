mod common;

use common::{article, harness, healthy_statistics, Behavior, ScriptedNews};
use engine_application::{RefreshService, RefreshState, SignalStatus, SnapshotStore, UbiEngine};
use engine_domain::{EconomicField, Freshness, Provider, ProviderHealth, Signal};
use rust_decimal::Decimal;
use std::str::FromStr;

fn status_of(report: &engine_application::RefreshReport, signal: Signal) -> SignalStatus {
    report
        .signals
        .iter()
        .find(|s| s.signal == signal)
        .map(|s| s.status)
        .unwrap()
}

#[tokio::test]
async fn successful_cycle_updates_every_signal_and_sentiment() {
    let h = harness(
        healthy_statistics(),
        Behavior::Value("512.34"),
        ScriptedNews::ok(vec![article(
            "Strong growth boosts jobs",
            "Hiring shows robust gains",
        )]),
    );

    let report = h.refresher.refresh().await.unwrap();

    assert_eq!(report.failed_signals(), 0);
    assert!(report.news_updated);
    assert_eq!(report.articles_analyzed, 1);

    let snapshot = h.store.snapshot().await;
    let economic = snapshot.economic;
    assert_eq!(economic.indicators.unemployment, 6.2);
    assert!((economic.indicators.inflation - 3.1).abs() < 1e-9);
    assert_eq!(economic.indicators.cost_of_living, 80.0);
    assert_eq!(economic.indicators.average_income, 45_000.0);
    assert_eq!(economic.indicators.gdp, Some(29_000.5));
    assert_eq!(
        economic.indicators.market_index,
        Some(Decimal::from_str("512.34").unwrap())
    );
    assert_eq!(economic.freshness, Freshness::Fresh);
    assert!(economic.fallback_fields.is_empty());
    assert!(economic
        .provider_health
        .values()
        .all(|h| *h == ProviderHealth::Healthy));

    assert!((snapshot.news.aggregate_sentiment - 0.45).abs() < 1e-9);
    assert_eq!(snapshot.news.articles.len(), 1);
}

#[tokio::test]
async fn permanent_failure_leaves_its_field_untouched_and_others_apply() {
    let mut statistics = healthy_statistics();
    statistics.retain(|(id, _)| *id != "UNRATE");
    statistics.push(("UNRATE", Behavior::HttpStatus(400)));
    let h = harness(statistics, Behavior::Value("500"), ScriptedNews::ok(vec![]));

    let report = h.refresher.refresh().await.unwrap();

    assert_eq!(status_of(&report, Signal::Unemployment), SignalStatus::Failed);
    assert_eq!(status_of(&report, Signal::MedianIncome), SignalStatus::Applied);
    assert_eq!(report.failed_signals(), 1);

    let economic = h.store.snapshot().await.economic;
    assert_eq!(economic.indicators.unemployment, 3.8);
    assert_eq!(economic.fallback_fields, vec![EconomicField::Unemployment]);
    assert_eq!(economic.indicators.average_income, 45_000.0);
    assert_eq!(
        economic.provider_health[&Provider::AlphaVantage],
        ProviderHealth::Healthy
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_keep_previous_value() {
    let mut statistics = healthy_statistics();
    statistics.retain(|(id, _)| *id != "MEHOINUSA646N");
    statistics.push(("MEHOINUSA646N", Behavior::AlwaysTimeout));
    let h = harness(statistics, Behavior::Value("500"), ScriptedNews::ok(vec![]));

    let report = h.refresher.refresh().await.unwrap();

    assert_eq!(status_of(&report, Signal::MedianIncome), SignalStatus::Failed);
    assert_eq!(h.statistics.calls_for("MEHOINUSA646N").len(), 4);
    let economic = h.store.snapshot().await.economic;
    assert_eq!(economic.indicators.average_income, 74_580.0);
    assert_eq!(economic.indicators.unemployment, 6.2);
}

#[tokio::test(start_paused = true)]
async fn failing_signals_retry_in_parallel() {
    let mut statistics = healthy_statistics();
    statistics.retain(|(id, _)| *id != "UNRATE" && *id != "GDP");
    statistics.push(("UNRATE", Behavior::AlwaysTimeout));
    statistics.push(("GDP", Behavior::AlwaysTimeout));
    let h = harness(statistics, Behavior::AlwaysTimeout, ScriptedNews::ok(vec![]));

    let started = tokio::time::Instant::now();
    let report = h.refresher.refresh().await.unwrap();

    // One 1 + 2 + 4 second backoff chain, not three in sequence.
    assert_eq!(started.elapsed(), std::time::Duration::from_secs(7));
    assert_eq!(report.failed_signals(), 3);
    assert_eq!(status_of(&report, Signal::MedianIncome), SignalStatus::Applied);
    for id in ["UNRATE", "GDP"] {
        assert_eq!(h.statistics.calls_for(id).len(), 4);
    }
    assert_eq!(h.quotes.calls_for("SPY").len(), 4);
}

#[tokio::test]
async fn out_of_range_value_is_reported_as_rejected() {
    let mut statistics = healthy_statistics();
    statistics.retain(|(id, _)| *id != "UNRATE");
    statistics.push(("UNRATE", Behavior::Value("150")));
    let h = harness(statistics, Behavior::Value("not-a-price"), ScriptedNews::ok(vec![]));

    let report = h.refresher.refresh().await.unwrap();

    assert_eq!(status_of(&report, Signal::Unemployment), SignalStatus::Rejected);
    assert_eq!(status_of(&report, Signal::MarketIndex), SignalStatus::Rejected);
    let economic = h.store.snapshot().await.economic;
    assert_eq!(economic.indicators.unemployment, 3.8);
    assert_eq!(economic.indicators.market_index, None);
}

#[tokio::test]
async fn empty_news_keeps_last_known_sentiment() {
    let h = harness(
        healthy_statistics(),
        Behavior::Value("500"),
        ScriptedNews::sequence(vec![
            Ok(vec![article("Markets collapse", "Recession looms")]),
            Ok(vec![]),
        ]),
    );
    h.refresher.refresh().await.unwrap();
    let before = h.store.snapshot().await.news;
    assert!((before.aggregate_sentiment + 0.25).abs() < 1e-9);

    let report = h.refresher.refresh().await.unwrap();

    assert!(!report.news_updated);
    assert_eq!(report.articles_analyzed, 0);
    assert_eq!(h.store.snapshot().await.news, before);
}

#[tokio::test]
async fn failed_news_provider_is_marked_error_without_failing_the_cycle() {
    let h = harness(healthy_statistics(), Behavior::Value("500"), ScriptedNews::failing());

    let report = h.refresher.refresh().await.unwrap();

    assert!(!report.news_updated);
    assert_eq!(report.failed_signals(), 0);
    assert_eq!(h.health.get(Provider::NewsApi), ProviderHealth::Error);
}

#[tokio::test]
async fn concurrent_refreshes_both_complete() {
    let h = harness(healthy_statistics(), Behavior::Value("500"), ScriptedNews::ok(vec![]));

    let (first, second) = tokio::join!(h.refresher.refresh(), h.engine.trigger_refresh());

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_ne!(first.unwrap().cycle_id, second.unwrap().cycle_id);
    assert_eq!(h.refresher.state(), RefreshState::Idle);
    assert_eq!(h.statistics.calls_for("UNRATE").len(), 2);
    assert_eq!(h.quotes.calls_for("SPY").len(), 2);
}
