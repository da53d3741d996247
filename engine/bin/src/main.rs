mod config;
mod di;
mod output;
mod scheduler;

use crate::config::EngineConfig;
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use engine_application::UbiEngine;
use engine_domain::{EconomicOverrides, Scenario};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ubi-engine")]
#[command(about = "Aggregates economic signals and computes universal basic income payouts", long_about = None)]
struct Cli {
    /// Use simulated providers even when API keys are configured
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh periodically and accept console commands
    Serve {
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Run one refresh cycle and print both snapshots
    Refresh,
    /// Refresh once and print the live payout
    Payout,
    /// Refresh once and print a what-if payout
    Simulate(SimulateArgs),
    /// List the built-in scenarios
    Scenarios,
}

#[derive(Args)]
struct SimulateArgs {
    /// Start from a built-in scenario (crisis, boom, disaster)
    #[arg(long)]
    scenario: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    unemployment: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    inflation: Option<f64>,
    #[arg(long)]
    cost_of_living: Option<f64>,
    #[arg(long)]
    population: Option<u64>,
    #[arg(long)]
    average_income: Option<f64>,
}

impl SimulateArgs {
    /// Scenario values first, explicit flags on top.
    fn overrides(&self) -> Result<EconomicOverrides> {
        let base = match &self.scenario {
            Some(id) => match Scenario::find(id) {
                Some(scenario) => scenario.overrides,
                None => {
                    let known: Vec<String> =
                        Scenario::library().into_iter().map(|s| s.id).collect();
                    bail!("Unknown scenario '{}', expected one of: {}", id, known.join(", "));
                }
            },
            None => EconomicOverrides::default(),
        };

        Ok(base.overlay(&EconomicOverrides {
            unemployment: self.unemployment,
            inflation: self.inflation,
            cost_of_living: self.cost_of_living,
            population: self.population,
            average_income: self.average_income,
        }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env()?;
    if let Command::Serve {
        interval_secs: Some(secs),
    } = &cli.command
    {
        if *secs == 0 {
            bail!("--interval-secs must be greater than zero");
        }
        config.refresh_interval_secs = *secs;
    }

    let offline = config.use_offline(cli.offline);
    if offline && !cli.offline {
        warn!(missing = ?config.missing_keys(), "API keys missing, using simulated providers");
    }
    info!(offline, "Starting UBI engine");

    let engine = di::build_engine(&config, offline)?;

    match cli.command {
        Command::Serve { .. } => {
            scheduler::serve(engine, config.refresh_interval()).await?;
        }
        Command::Refresh => {
            let report = engine.trigger_refresh().await?;
            output::print_report(&report);
            output::print_snapshots(
                &engine.economic_snapshot().await,
                &engine.news_snapshot().await,
            )?;
        }
        Command::Payout => {
            refresh_before_payout(engine.as_ref()).await?;
            let breakdown = engine.compute_payout(None).await?;
            output::print_breakdown(&breakdown);
        }
        Command::Simulate(args) => {
            let overrides = args.overrides()?;
            refresh_before_payout(engine.as_ref()).await?;
            let breakdown = engine.compute_payout(Some(overrides)).await?;
            output::print_breakdown(&breakdown);
        }
        Command::Scenarios => {
            output::print_scenarios(&engine.scenarios());
        }
    }

    info!("Shutdown complete");
    Ok(())
}

async fn refresh_before_payout(engine: &dyn UbiEngine) -> Result<()> {
    let report = engine.trigger_refresh().await?;
    if report.failed_signals() > 0 {
        warn!(
            failed = report.failed_signals(),
            "Some signals failed, payout uses last known or fallback values"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate(args: &[&str]) -> SimulateArgs {
        let cli = Cli::try_parse_from(
            ["ubi-engine", "simulate"].iter().chain(args.iter()).copied(),
        )
        .unwrap();
        match cli.command {
            Command::Simulate(args) => args,
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_flags_override_scenario_values() {
        let overrides = simulate(&["--scenario", "crisis", "--unemployment", "9.5"])
            .overrides()
            .unwrap();

        assert_eq!(overrides.unemployment, Some(9.5));
        assert_eq!(overrides.inflation, Some(6.2));
        assert_eq!(overrides.cost_of_living, Some(115.0));
        assert_eq!(overrides.population, None);
    }

    #[test]
    fn test_negative_inflation_flag() {
        let overrides = simulate(&["--inflation", "-1.5"]).overrides().unwrap();
        assert_eq!(overrides.inflation, Some(-1.5));
    }

    #[test]
    fn test_unknown_scenario_is_an_error() {
        let err = simulate(&["--scenario", "utopia"]).overrides().unwrap_err();
        assert!(err.to_string().contains("crisis"));
    }

    #[test]
    fn test_offline_flag_is_global() {
        let cli = Cli::try_parse_from(["ubi-engine", "payout", "--offline"]).unwrap();
        assert!(cli.offline);
    }
}
