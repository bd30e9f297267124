//! coresched: operator console for the core scheduler.
//!
//! Reads one command per line from stdin while the clock ticks in the
//! background:
//! - `submit <name>`: submit a job with generated attributes
//! - `kill <name>`: terminate a running job
//! - `status`: print the current snapshot
//! - `quit`: stop the clock and print the final status (also on EOF)

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use coresched_core::{load_dotenv, Config, CoreCatalog, PreemptionScope};
use coresched_scheduler::{Admission, Placement, Scheduler, StatusSnapshot};

// ── CLI ─────────────────────────────────────────────────────────────

/// Preemptive priority scheduler over heterogeneous core classes.
///
/// Settings come from the environment (`.env` included) through the
/// profiled config; flags given here override them.
#[derive(Parser, Debug)]
#[command(name = "coresched", version, about)]
struct Cli {
    /// Config profile; keys are read as `{PROFILE}_{KEY}` first.
    #[arg(long, env = "CORESCHED_PROFILE", default_value = "")]
    profile: String,

    /// Clock period in milliseconds.
    #[arg(long)]
    tick_millis: Option<u64>,

    /// Core catalog as `name:capacity:rate,...`.
    #[arg(long)]
    catalog: Option<String>,

    /// Victim search scope at submission: `per-class` or `global`.
    #[arg(long)]
    preemption_scope: Option<PreemptionScope>,

    /// Seed for the job generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the effective config and every status as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(millis) = self.tick_millis {
            config.scheduler.tick_millis = millis;
        }
        if let Some(catalog) = &self.catalog {
            config.catalog = CoreCatalog::parse(catalog)?;
        }
        if let Some(scope) = self.preemption_scope {
            config.scheduler.preemption_scope = scope;
        }
        if self.seed.is_some() {
            config.scheduler.seed = self.seed;
        }
        Ok(())
    }
}

// ── Commands ────────────────────────────────────────────────────────

enum Command<'a> {
    Submit(&'a str),
    Kill(&'a str),
    Status,
    Quit,
}

fn parse_command(line: &str) -> Result<Command<'_>, String> {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };
    match (verb.to_ascii_lowercase().as_str(), arg) {
        ("submit", name) if !name.is_empty() => Ok(Command::Submit(name)),
        ("kill", name) if !name.is_empty() => Ok(Command::Kill(name)),
        ("submit" | "kill", _) => Err(format!("usage: {} <name>", verb)),
        ("status", _) => Ok(Command::Status),
        ("quit" | "exit", _) => Ok(Command::Quit),
        _ => Err(format!("unknown command '{}' (submit, kill, status, quit)", verb)),
    }
}

fn describe(scheduler: &Scheduler, admission: &Admission) -> String {
    let catalog = scheduler.catalog();
    match admission {
        Admission::Placed(Placement::Direct { class }) => {
            format!("running on {}", catalog.name(*class))
        }
        Admission::Placed(Placement::Fallback { class }) => {
            format!("running on {} (fallback)", catalog.name(*class))
        }
        Admission::Placed(Placement::Preempted { class, evicted_name, .. }) => {
            format!("running on {}, preempted {}", catalog.name(*class), evicted_name)
        }
        Admission::Queued => "waiting".to_string(),
    }
}

fn print_status(snapshot: &StatusSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        println!("{}", snapshot);
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let mut config = Config::for_profile(&cli.profile)?;
    cli.apply(&mut config)?;
    config.log_summary();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&config.summary())?);
    }

    let scheduler = Scheduler::from_config(&config);
    scheduler.start_clock()?;
    info!("coresched ready, reading commands from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Submit(name)) => match scheduler.submit(name) {
                Ok(submitted) => {
                    println!("{} {}: {}", submitted.id, name, describe(&scheduler, &submitted.admission))
                }
                Err(e) => println!("submit failed: {}", e),
            },
            Ok(Command::Kill(name)) => {
                if scheduler.terminate(name)? {
                    println!("{} terminated", name);
                } else {
                    println!("no running job named {}", name);
                }
            }
            Ok(Command::Status) => print_status(&scheduler.status()?, cli.json)?,
            Ok(Command::Quit) => break,
            Err(usage) => warn!("{}", usage),
        }
    }

    scheduler.shutdown().await?;
    print_status(&scheduler.status()?, cli.json)?;

    let metrics = scheduler.metrics()?;
    info!(
        submitted = metrics.submitted,
        completed = metrics.completed,
        terminated = metrics.terminated,
        preemptions = metrics.preemptions,
        ticks = metrics.ticks,
        "coresched exited cleanly"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert!(matches!(parse_command("submit render"), Ok(Command::Submit("render"))));
        assert!(matches!(parse_command("  KILL  render "), Ok(Command::Kill("render"))));
        assert!(matches!(parse_command("status"), Ok(Command::Status)));
        assert!(matches!(parse_command("quit"), Ok(Command::Quit)));
        assert!(parse_command("submit").is_err());
        assert!(parse_command("launch x").is_err());
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "coresched",
            "--tick-millis",
            "50",
            "--catalog",
            "4GHz:1:4",
            "--preemption-scope",
            "global",
            "--seed",
            "9",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config).unwrap();
        assert_eq!(config.scheduler.tick_millis, 50);
        assert_eq!(config.catalog.len(), 1);
        assert_eq!(config.scheduler.preemption_scope, PreemptionScope::Global);
        assert_eq!(config.scheduler.seed, Some(9));
    }

    #[test]
    fn profiled_env_wins_over_plain_env() {
        std::env::set_var("CLIPREC_CORESCHED_TICK_MILLIS", "50");
        std::env::set_var("CORESCHED_TICK_MILLIS", "1000");

        let cli = Cli::parse_from(["coresched", "--profile", "cliprec"]);
        let mut config = Config::for_profile(&cli.profile).unwrap();
        cli.apply(&mut config).unwrap();
        assert_eq!(config.scheduler.tick_millis, 50);

        // An explicit flag still beats both.
        let cli = Cli::parse_from(["coresched", "--profile", "cliprec", "--tick-millis", "7"]);
        let mut config = Config::for_profile(&cli.profile).unwrap();
        cli.apply(&mut config).unwrap();
        assert_eq!(config.scheduler.tick_millis, 7);

        std::env::remove_var("CLIPREC_CORESCHED_TICK_MILLIS");
        std::env::remove_var("CORESCHED_TICK_MILLIS");
    }
}
