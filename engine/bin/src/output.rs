use anyhow::Result;
use engine_application::{RefreshReport, SignalStatus};
use engine_domain::{group_thousands, EconomicSnapshot, NewsSnapshot, PayoutBreakdown, Scenario};
use serde_json::json;

pub fn print_report(report: &RefreshReport) {
    println!("\nRefresh cycle {}:", report.cycle_id);
    for outcome in &report.signals {
        let marker = match outcome.status {
            SignalStatus::Applied => "ok",
            SignalStatus::Rejected => "rejected",
            SignalStatus::Failed => "failed",
        };
        match &outcome.detail {
            Some(detail) => println!(
                "  {:<22} {:<9} {}",
                outcome.signal.to_string(),
                marker,
                detail
            ),
            None => println!("  {:<22} {}", outcome.signal.to_string(), marker),
        }
    }
    println!(
        "  News: {} articles analyzed{}",
        report.articles_analyzed,
        if report.news_updated { "" } else { " (sentiment unchanged)" }
    );
    let elapsed = report.finished_at - report.started_at;
    println!("  Took {} ms", elapsed.num_milliseconds());
}

pub fn print_snapshots(economic: &EconomicSnapshot, news: &NewsSnapshot) -> Result<()> {
    let body = json!({ "economic": economic, "news": news });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

pub fn print_breakdown(breakdown: &PayoutBreakdown) {
    let heading = if breakdown.simulated {
        "Simulated payout"
    } else {
        "Monthly payout"
    };
    println!("\n{}: ${}", heading, group_thousands(breakdown.adjusted_payout));
    for line in &breakdown.explanation {
        println!("  - {}", line);
    }
    println!("  Confidence: {:.0}%", breakdown.confidence * 100.0);
}

pub fn print_scenarios(scenarios: &[Scenario]) {
    for scenario in scenarios {
        let o = &scenario.overrides;
        println!("{} - {}", scenario.id, scenario.name);
        println!("    {}", scenario.description);
        println!(
            "    unemployment {}%, inflation {}%, cost of living {}, reference sentiment {}",
            o.unemployment.unwrap_or_default(),
            o.inflation.unwrap_or_default(),
            o.cost_of_living.unwrap_or_default(),
            scenario.reference_sentiment
        );
    }
}
