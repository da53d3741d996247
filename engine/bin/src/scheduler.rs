use anyhow::Result;
use engine_application::UbiEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Refresh,
    Payout,
    Snapshot,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "refresh" | "r" => Some(ConsoleCommand::Refresh),
            "payout" | "p" => Some(ConsoleCommand::Payout),
            "snapshot" | "s" => Some(ConsoleCommand::Snapshot),
            "quit" | "exit" | "q" => Some(ConsoleCommand::Quit),
            _ => None,
        }
    }
}

/// Refreshes on a fixed cadence, starting immediately, and answers console
/// commands until Ctrl+C or `quit`.
///
/// Scheduled and manual refreshes go through the same engine entry point.
pub async fn serve(engine: Arc<dyn UbiEngine>, period: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = period.as_secs(),
        "Serving (commands: refresh, payout, snapshot, quit; Ctrl+C to stop)"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                spawn_refresh(engine.clone());
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match ConsoleCommand::parse(&line) {
                        Some(ConsoleCommand::Quit) => {
                            info!("Quit requested");
                            break;
                        }
                        Some(command) => {
                            if let Err(e) = handle(engine.as_ref(), command).await {
                                error!(error = %e, "Command failed");
                            }
                        }
                        None => warn!(input = %line.trim(), "Unknown command"),
                    },
                    Ok(None) => {
                        info!("Stdin closed, continuing on schedule");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin, console disabled");
                        stdin_open = false;
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Received shutdown signal, stopping gracefully...");
                break;
            }
        }
    }

    Ok(())
}

fn spawn_refresh(engine: Arc<dyn UbiEngine>) {
    tokio::spawn(async move {
        if let Err(e) = engine.trigger_refresh().await {
            error!(error = %e, "Scheduled refresh failed");
        }
    });
}

async fn handle(engine: &dyn UbiEngine, command: ConsoleCommand) -> Result<()> {
    match command {
        ConsoleCommand::Refresh => {
            let report = engine.trigger_refresh().await?;
            output::print_report(&report);
        }
        ConsoleCommand::Payout => {
            let breakdown = engine.compute_payout(None).await?;
            output::print_breakdown(&breakdown);
        }
        ConsoleCommand::Snapshot => {
            output::print_snapshots(
                &engine.economic_snapshot().await,
                &engine.news_snapshot().await,
            )?;
        }
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("refresh"), Some(ConsoleCommand::Refresh));
        assert_eq!(ConsoleCommand::parse("  PAYOUT \n"), Some(ConsoleCommand::Payout));
        assert_eq!(ConsoleCommand::parse("s"), Some(ConsoleCommand::Snapshot));
        assert_eq!(ConsoleCommand::parse("exit"), Some(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse("payday"), None);
    }
}
