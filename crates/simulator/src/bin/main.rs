//! Arbiter Simulator CLI
//!
//! Runs the reader-writer arbitration engine or the resource ring and prints
//! what happened.

use arbiter_core::TimedNotification;
use arbiter_simulator::{parse_policy, PriorityAssignment, RingScenario, RwScenario};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arbiter-sim")]
#[command(about = "Reader-writer arbitration and resource ring simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reader-writer arbitration engine on a virtual clock
    Rw {
        /// Number of readers (1-10)
        #[arg(long, default_value = "3")]
        readers: usize,

        /// Number of writers (1-5)
        #[arg(long, default_value = "2")]
        writers: usize,

        /// Scheduling mode (reader, writer)
        #[arg(long, default_value = "reader")]
        mode: String,

        /// Simulated time to run (e.g., "30s", "2m")
        #[arg(short, long, default_value = "30s")]
        duration: humantime::Duration,

        /// Random seed for priorities
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Pin a priority, e.g. W1=3 or R2=7 (repeatable)
        #[arg(long = "priority", value_name = "NAME=P")]
        priorities: Vec<PriorityAssignment>,

        /// Print the event log as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Run the resource ring for wall-clock time
    Ring {
        /// Number of workers, and of resources (at least 2)
        #[arg(long, default_value = "5")]
        workers: usize,

        /// Wall-clock time to run (e.g., "30s", "2m")
        #[arg(short, long, default_value = "30s")]
        duration: humantime::Duration,

        /// Random seed for priorities and latencies
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Acquisition policy (gate, ordered)
        #[arg(long, default_value = "gate")]
        policy: String,

        /// Pin a worker priority, e.g. worker-0=9 (repeatable)
        #[arg(long = "priority", value_name = "NAME=P")]
        priorities: Vec<PriorityAssignment>,

        /// Print the event log and report as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_log(log: &[TimedNotification], json: bool) -> Result<(), serde_json::Error> {
    for timed in log {
        if json {
            println!("{}", serde_json::to_string(timed)?);
        } else {
            println!("{timed}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Rw {
            readers,
            writers,
            mode,
            duration,
            seed,
            priorities,
            json,
        } => {
            let scenario = RwScenario::new(readers, writers, &mode, &priorities, *duration, seed)?;
            let outcome = scenario.run();
            print_log(&outcome.log, json)?;

            if !json {
                let stats = outcome.stats;
                println!();
                println!("Simulated {:?} ({} ticks)", *duration, stats.ticks);
                println!("  Writer grants:       {}", stats.writer_grants);
                println!("  Reading phases:      {}", stats.reading_phases);
                println!("  Deadlocks detected:  {}", stats.deadlocks_detected);
                println!("  Deadlocks resolved:  {}", stats.deadlocks_resolved);
                println!("  Exclusion violations: {}", stats.exclusion_violations);
            }
        }

        Commands::Ring {
            workers,
            duration,
            seed,
            policy,
            priorities,
            json,
        } => {
            let policy = parse_policy(&policy)?;
            let scenario = RingScenario::new(workers, policy, &priorities, *duration, seed)?;

            if !json {
                println!("Running {workers} workers for {duration} ({policy:?})...");
            }
            let outcome = scenario.run().await?;
            print_log(&outcome.log, json)?;

            match (outcome.report, json) {
                (Some(report), true) => println!("{}", serde_json::to_string(&report)?),
                (Some(report), false) => {
                    println!();
                    println!("{report}");
                }
                (None, _) => eprintln!("No worker completed a cycle; nothing to report."),
            }
            if outcome.violations > 0 {
                eprintln!("Resource ledger recorded {} violations", outcome.violations);
            }
        }
    }

    Ok(())
}
