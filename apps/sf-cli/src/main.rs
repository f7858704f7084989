use clap::{Parser, Subcommand};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use sf_flow::{FlowError, SampleClock, SampleConfig, Signal, scalars};
use sf_project::{ProjectError, build_system};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid input: {what}")]
    Input { what: String },
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "sigflow CLI - block diagram signal flow", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a system file and check that it builds
    Validate {
        /// Path to the system YAML or JSON file
        system_path: PathBuf,
    },
    /// Print the blocks and edges of a system
    Describe {
        /// Path to the system YAML or JSON file
        system_path: PathBuf,
    },
    /// Tick a system and print its outputs as CSV
    Run {
        /// Path to the system YAML or JSON file
        system_path: PathBuf,
        /// Number of ticks (defaults to 10, or the CSV row count)
        #[arg(long)]
        ticks: Option<u64>,
        /// Constant value for each system input, in port order
        #[arg(long = "input", allow_negative_numbers = true)]
        inputs: Vec<f64>,
        /// CSV file with one row of input values per tick
        #[arg(long, conflicts_with = "inputs")]
        input_csv: Option<PathBuf>,
        /// Tick rate in Hz for the time column (overrides the file)
        #[arg(long)]
        rate_hz: Option<f64>,
        /// Output CSV file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { system_path } => cmd_validate(&system_path),
        Commands::Describe { system_path } => cmd_describe(&system_path),
        Commands::Run {
            system_path,
            ticks,
            inputs,
            input_csv,
            rate_hz,
            output,
        } => {
            let source = match input_csv {
                Some(path) => InputSource::Rows(read_csv(&path)?),
                None => InputSource::Constant(inputs),
            };
            cmd_run(&system_path, ticks, source, rate_hz, output.as_deref())
        }
    }
}

fn cmd_validate(system_path: &Path) -> CliResult<()> {
    println!("Validating system: {}", system_path.display());
    let def = sf_project::load(system_path)?;
    build_system(&def)?;
    println!("✓ System is valid");
    Ok(())
}

fn cmd_describe(system_path: &Path) -> CliResult<()> {
    let def = sf_project::load(system_path)?;
    let built = build_system(&def)?;

    println!("{} (version {})", def.name, def.version);
    if let Some(rate) = def.sample_rate_hz {
        println!("Sample rate: {rate} Hz");
    }
    println!("Block ids:");
    for (name, id) in &built.ids {
        println!("  {name} -> {id}");
    }
    print!("{}", built.system);
    Ok(())
}

/// Where each tick's input values come from.
enum InputSource {
    Constant(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

impl InputSource {
    fn default_ticks(&self) -> u64 {
        match self {
            InputSource::Constant(_) => 10,
            InputSource::Rows(rows) => rows.len() as u64,
        }
    }

    fn row(&self, tick: u64) -> Option<&[f64]> {
        match self {
            InputSource::Constant(values) => Some(values),
            InputSource::Rows(rows) => rows.get(tick as usize).map(Vec::as_slice),
        }
    }
}

fn cmd_run(
    system_path: &Path,
    ticks: Option<u64>,
    source: InputSource,
    rate_hz: Option<f64>,
    output: Option<&Path>,
) -> CliResult<()> {
    let def = sf_project::load(system_path)?;
    let mut system = build_system(&def)?.system;

    let rate = rate_hz.or(def.sample_rate_hz).unwrap_or(1.0);
    let mut clock = SampleClock::new(SampleConfig::from_frequency(rate)?, 0.0);
    let ticks = ticks.unwrap_or_else(|| source.default_ticks());

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let header: Vec<String> = (0..system.num_outputs()).map(|i| format!("y{i}")).collect();
    writeln!(out, "t,{}", header.join(","))?;

    info!(system = %def.name, ticks, rate_hz = rate, "run starting");
    let mut skipped = 0_u64;
    for tick in 0..ticks {
        let Some(row) = source.row(tick) else {
            break;
        };
        match system.run(&scalars(row)) {
            Ok(values) => {
                let cells: Vec<String> = values.unwrap_or_default().iter().map(format_signal).collect();
                writeln!(out, "{},{}", clock.time(), cells.join(","))?;
            }
            Err(err) if err.is_recoverable() => {
                warn!(tick, error = %err, "tick skipped");
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
        clock.advance();
    }
    out.flush()?;

    let stats = system.stats();
    info!(
        ticks = stats.ticks,
        skipped,
        overruns = stats.overruns,
        worst_us = stats.worst.as_micros() as u64,
        "run complete"
    );
    Ok(())
}

/// Vector samples are joined with ';' to keep one CSV cell per port.
fn format_signal(signal: &Signal) -> String {
    signal
        .to_vec()
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn read_csv(path: &Path) -> CliResult<Vec<Vec<f64>>> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|(n, line)| {
            line.split(',')
                .map(|cell| {
                    cell.trim().parse::<f64>().map_err(|e| CliError::Input {
                        what: format!("{}:{}: '{}' ({e})", path.display(), n + 1, cell.trim()),
                    })
                })
                .collect()
        })
        .collect()
}
