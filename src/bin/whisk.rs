//! Whisk CLI - Command-line interface for whisking analysis
//!
//! Commands:
//! - process: Analyse a motion-tracking export (binary trace + bout statistics)
//! - isolate: Keep whisking bouts that do not overlap locomotion
//! - settings: Validate and print the effective settings

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use whisking::pipeline::WhiskingProcessor;
use whisking::settings::{Settings, DEFAULT_REC_POINTS};
use whisking::types::{BinaryTrace, WhiskingAnalysis};
use whisking::{AnalysisError, PRODUCER_NAME, VERSION};

/// Whisk - whisking bout detection from whisker-motion traces
#[derive(Parser)]
#[command(name = "whisk")]
#[command(version = VERSION)]
#[command(about = "Detect whisking bouts in whisker-motion traces", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a motion-tracking export
    Process {
        /// Motion export (JSON with a `motion` channel list)
        #[arg(short, long)]
        input: PathBuf,

        /// Settings file (JSON); defaults are used when omitted
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Number of reference frames to resample to
        #[arg(long, default_value_t = DEFAULT_REC_POINTS)]
        rec_points: usize,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        /// Only emit the bout statistics
        #[arg(long)]
        summary: bool,
    },

    /// Keep whisking bouts that do not overlap locomotion
    Isolate {
        /// Binary whisking trace, JSON array of 0/1 (use - for stdin)
        #[arg(short, long)]
        whisking: PathBuf,

        /// Binary locomotion trace, JSON array of 0/1
        #[arg(short, long)]
        locomotion: PathBuf,

        /// Settings file (JSON); defaults are used when omitted
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Validate and print the effective settings
    Settings {
        /// Settings file (JSON); defaults are used when omitted
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), WhiskCliError> {
    match cli.command {
        Commands::Process {
            input,
            settings,
            rec_points,
            output,
            output_format,
            summary,
        } => cmd_process(
            &input,
            settings.as_deref(),
            rec_points,
            &output,
            output_format,
            summary,
        ),

        Commands::Isolate {
            whisking,
            locomotion,
            settings,
            output,
            output_format,
        } => cmd_isolate(
            &whisking,
            &locomotion,
            settings.as_deref(),
            &output,
            output_format,
        ),

        Commands::Settings { settings, json } => cmd_settings(settings.as_deref(), json),
    }
}

fn cmd_process(
    input: &Path,
    settings: Option<&Path>,
    rec_points: usize,
    output: &Path,
    output_format: OutputFormat,
    summary: bool,
) -> Result<(), WhiskCliError> {
    let settings = load_settings(settings)?;
    let processor = WhiskingProcessor::new(settings)?;

    info!(input = %input.display(), rec_points, "processing");
    let analysis = processor.process_file(input, rec_points)?;

    let output_data = match (&analysis, summary) {
        (WhiskingAnalysis::NoData, _) => {
            warn!(input = %input.display(), "file has no motion entry");
            format_output(&analysis, &output_format)?
        }
        (WhiskingAnalysis::Analyzed(result), true) => {
            let summary = AnalysisSummary {
                producer: PRODUCER_NAME,
                version: VERSION,
                path_analysis_file: &result.path_analysis_file,
                frames: result.binary_whisking.len(),
                statistics: &result.statistics,
            };
            format_output(&summary, &output_format)?
        }
        (WhiskingAnalysis::Analyzed(_), false) => format_output(&analysis, &output_format)?,
    };

    write_output(output, &output_data)
}

fn cmd_isolate(
    whisking: &Path,
    locomotion: &Path,
    settings: Option<&Path>,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), WhiskCliError> {
    check_single_stdin(whisking, locomotion)?;
    let settings = load_settings(settings)?;
    let processor = WhiskingProcessor::new(settings)?;

    let binary_whisking: BinaryTrace = serde_json::from_str(&read_input(whisking)?)?;
    let binary_locomotion: BinaryTrace = serde_json::from_str(&read_input(locomotion)?)?;

    let isolated = processor.whisking_only(&binary_whisking, &binary_locomotion)?;
    write_output(output, &format_output(&isolated, &output_format)?)
}

fn cmd_settings(settings: Option<&Path>, json: bool) -> Result<(), WhiskCliError> {
    let settings = load_settings(settings)?;

    if json {
        println!("{}", settings.to_json()?);
    } else {
        let w = &settings.whisking;
        println!("Whisk Settings");
        println!("==============");
        println!("Producer: {} {}", PRODUCER_NAME, VERSION);
        println!("fs:                   {} Hz", settings.fs);
        println!("sigma:                {} frames", w.sigma);
        println!("percentile:           {} %", w.percentile);
        println!("remove short bouts:   {}", w.remove_short_bouts);
        println!("whisk_min_duration:   {} s", w.whisk_min_duration);
        println!("join bouts:           {}", w.join_bouts);
        println!("whisk_max_inter_bout: {} s", w.whisk_max_inter_bout);
    }

    Ok(())
}

// Helper functions

fn load_settings(path: Option<&Path>) -> Result<Settings, WhiskCliError> {
    match path {
        Some(path) => Ok(Settings::from_file(path)?),
        None => Ok(Settings::default()),
    }
}

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn check_single_stdin(whisking: &Path, locomotion: &Path) -> Result<(), WhiskCliError> {
    if is_stdio(whisking) && is_stdio(locomotion) {
        return Err(WhiskCliError::Usage(
            "--whisking and --locomotion cannot both read from stdin".to_string(),
        ));
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<String, WhiskCliError> {
    if is_stdio(input) {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading binary trace from an interactive terminal");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), WhiskCliError> {
    if is_stdio(output) {
        println!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String, WhiskCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

#[derive(Serialize)]
struct AnalysisSummary<'a> {
    producer: &'a str,
    version: &'a str,
    path_analysis_file: &'a str,
    frames: usize,
    statistics: &'a whisking::types::BoutStatistics,
}

// Error handling

#[derive(Debug)]
enum WhiskCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    Usage(String),
}

impl From<io::Error> for WhiskCliError {
    fn from(e: io::Error) -> Self {
        WhiskCliError::Io(e)
    }
}

impl From<AnalysisError> for WhiskCliError {
    fn from(e: AnalysisError) -> Self {
        WhiskCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for WhiskCliError {
    fn from(e: serde_json::Error) -> Self {
        WhiskCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WhiskCliError> for CliError {
    fn from(e: WhiskCliError) -> Self {
        match e {
            WhiskCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WhiskCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Binary traces must be JSON arrays of 0 and 1".to_string()),
            },
            WhiskCliError::Usage(message) => CliError {
                code: "USAGE_ERROR".to_string(),
                message,
                hint: Some("Pass at most one binary trace as -".to_string()),
            },
            WhiskCliError::Analysis(e) => {
                let hint = match &e {
                    AnalysisError::Io(_) => Some("Check file paths and permissions"),
                    AnalysisError::Json(_) | AnalysisError::ParseError(_) => {
                        Some("Input must be a JSON object with a `motion` channel list")
                    }
                    AnalysisError::MissingChannel(_) => {
                        Some("Channel 1 of `motion` must hold the whisker trace")
                    }
                    AnalysisError::InvalidSettings(_) => {
                        Some("Run `whisk settings --json` to see a valid settings file")
                    }
                    AnalysisError::LengthMismatch { .. } => {
                        Some("Whisking and locomotion traces must be aligned frame for frame")
                    }
                    AnalysisError::EmptyTrace(_) | AnalysisError::InvalidBinary { .. } => None,
                };
                CliError {
                    code: "ANALYSIS_ERROR".to_string(),
                    message: e.to_string(),
                    hint: hint.map(|h| h.to_string()),
                }
            }
        }
    }
}
