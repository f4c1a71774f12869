use anyhow::{bail, Result};
use bodycomp::config::AppConfig;
use bodycomp::error::BodyCompError;
use bodycomp::export::{self, text, ExportFormat};
use bodycomp::import::DEMO_CSV;
use bodycomp::logging::{init_logging, LogFormat};
use bodycomp::{CompositionReport, Engine, Gender, Segment, TimeRange, TomlPreferenceStore, UserProfile};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io;
use std::path::PathBuf;
use tracing::Level;

/// bodycomp - Body Composition Analytics CLI
///
/// Turns body-composition scale exports into derived metrics, labels,
/// segmental estimates and trend reports.
#[derive(Parser)]
#[command(name = "bodycomp")]
#[command(author = "bodycomp contributors")]
#[command(version)]
#[command(about = "Body composition analytics CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the measurements come from
#[derive(Args)]
struct SourceArgs {
    /// Scale export (CSV)
    #[arg(short, long, conflicts_with = "demo")]
    file: Option<PathBuf>,

    /// Use the bundled three-scan demo export
    #[arg(long)]
    demo: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise the latest scan, labels, changes and assessment
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// Time range (ALL, 3M, 1Y or a year such as 2024)
        #[arg(short, long)]
        range: Option<TimeRange>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the filtered, height-normalised series
    Series {
        #[command(flatten)]
        source: SourceArgs,

        /// Time range (ALL, 3M, 1Y or a year such as 2024)
        #[arg(short, long)]
        range: Option<TimeRange>,

        /// Output format (csv, json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the segmental breakdown of the latest scan
    Segments {
        #[command(flatten)]
        source: SourceArgs,

        /// Time range (ALL, 3M, 1Y or a year such as 2024)
        #[arg(short, long)]
        range: Option<TimeRange>,
    },

    /// Show or update the stored gender and height
    Profile {
        /// Gender used for thresholds (male, female)
        #[arg(short, long)]
        gender: Option<Gender>,

        /// Height in centimeters
        #[arg(long, value_parser = parse_height_arg, conflicts_with = "clear_height")]
        height: Option<f64>,

        /// Forget the stored height and fall back to the device estimate
        #[arg(long)]
        clear_height: bool,
    },
}

fn parse_height_arg(value: &str) -> std::result::Result<f64, String> {
    UserProfile::parse_height(value)
        .ok_or_else(|| format!("'{}' is not a positive height in centimeters", value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    if let Some(format) = cli.log_format {
        log_config.format = format;
    }
    init_logging(&log_config)?;

    if let Err(err) = run(cli.command, &config) {
        match err.downcast_ref::<BodyCompError>() {
            Some(e) => {
                log_failure(e);
                eprintln!("{} {}", "Error:".red().bold(), e.user_message());
            }
            None => eprintln!("{} {:#}", "Error:".red().bold(), err),
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Log a failed command at the level its severity maps to
fn log_failure(err: &BodyCompError) {
    match err.severity().to_tracing_level() {
        Level::ERROR => tracing::error!(error = %err, "Command failed"),
        Level::WARN => tracing::warn!(error = %err, "Command failed"),
        _ => tracing::info!(error = %err, "Command failed"),
    }
}

fn open_engine(config: &AppConfig) -> Result<Engine<TomlPreferenceStore>> {
    let store = TomlPreferenceStore::open(config.preferences_path()).map_err(BodyCompError::from)?;
    Ok(Engine::new(store))
}

fn load_source(engine: &mut Engine<TomlPreferenceStore>, source: &SourceArgs) -> Result<()> {
    let count = match (&source.file, source.demo) {
        (_, true) => engine.ingest(DEMO_CSV),
        (Some(path), false) => engine.ingest_file(path)?,
        (None, false) => bail!("Provide a scale export with --file <PATH>, or use --demo"),
    };

    if count == 0 {
        eprintln!("{}", "No usable measurements found in the export".yellow());
    }
    Ok(())
}

fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Report {
            source,
            range,
            format,
            output,
        } => {
            let mut engine = open_engine(config)?;
            load_source(&mut engine, &source)?;
            engine.set_time_range(range.unwrap_or(config.settings.default_range));

            let report = CompositionReport::generate(&engine.view());
            match output {
                Some(path) => {
                    export::export_report(&report, format, &path).map_err(BodyCompError::from)?;
                    eprintln!("{} {}", "✓ Report written to".green(), path.display());
                }
                None => export::write_report(&report, format, io::stdout().lock())
                    .map_err(BodyCompError::from)?,
            }
        }

        Commands::Series {
            source,
            range,
            format,
            output,
        } => {
            let mut engine = open_engine(config)?;
            load_source(&mut engine, &source)?;
            engine.set_time_range(range.unwrap_or(config.settings.default_range));

            let view = engine.view();
            match output {
                Some(path) => {
                    export::export_series(&view, format, &path).map_err(BodyCompError::from)?;
                    eprintln!(
                        "{} {} records to {}",
                        "✓ Exported".green(),
                        view.len(),
                        path.display()
                    );
                }
                None => export::write_series(&view, format, io::stdout().lock())
                    .map_err(BodyCompError::from)?,
            }
        }

        Commands::Segments { source, range } => {
            let mut engine = open_engine(config)?;
            load_source(&mut engine, &source)?;
            engine.set_time_range(range.unwrap_or(config.settings.default_range));

            let view = engine.view();
            match (view.latest(), view.segmental()) {
                (Some(latest), Some(breakdown)) => {
                    println!(
                        "{}",
                        format!("SEGMENTAL ANALYSIS  {}", latest.measurement.raw.date_label)
                            .cyan()
                            .bold()
                    );
                    println!("{}", text::render_segments(&breakdown, &Segment::GRID_ORDER));
                }
                _ => println!("{}", "No measurements in the selected range".yellow()),
            }
        }

        Commands::Profile {
            gender,
            height,
            clear_height,
        } => {
            let mut engine = open_engine(config)?;

            if let Some(gender) = gender {
                engine.set_gender(gender).map_err(BodyCompError::from)?;
            }
            if height.is_some() || clear_height {
                engine.set_height(height).map_err(BodyCompError::from)?;
            }

            let profile = engine.profile();
            println!("{}", "PROFILE".bold());
            println!("  Gender: {}", profile.gender);
            match profile.height_cm {
                Some(h) => println!("  Height: {:.1} cm", h),
                None => println!("  Height: {}", "not set (device estimate used for FFMI)".dimmed()),
            }
            println!("  Stored in: {}", engine.store().path().display());
        }
    }

    Ok(())
}
