//! Junction CLI entry point.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use junction_runtime::Scenario;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "junction",
    version,
    about = "Run client/car association scenarios against a file-backed store"
)]
struct Cli {
    /// Scenario to run.
    #[arg(value_enum, default_value_t = Which::All)]
    scenario: Which,

    /// Directory holding the store files.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Reuse existing store files instead of starting fresh.
    #[arg(long)]
    keep: bool,

    /// Raise the log level (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Which {
    /// 01: one foreign key on the car
    Implicit,
    /// 02: explicit join table
    JoinTable,
    /// 03: join table with an auto-filled timestamp
    Timestamped,
    /// 07: join table with a required is_rented flag
    Rental,
    /// Every scenario in order
    All,
}

impl Which {
    fn scenarios(self) -> Vec<Scenario> {
        match self {
            Self::Implicit => vec![Scenario::Implicit],
            Self::JoinTable => vec![Scenario::JoinTable],
            Self::Timestamped => vec![Scenario::Timestamped],
            Self::Rental => vec![Scenario::Rental],
            Self::All => Scenario::ALL.to_vec(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&cli.data_dir)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for scenario in cli.scenario.scenarios() {
        scenario.run_in(&cli.data_dir, cli.keep, &mut out)?;
    }
    out.flush()?;
    Ok(())
}
