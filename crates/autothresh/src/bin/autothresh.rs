use std::path::{Path, PathBuf};
use std::process::ExitCode;

use autothresh::{
    BatchConfig, BatchError, BatchPipeline, Compression, ConfigError, ConfigIoError, FileOutcome,
    Polarity, SuccessPolicy, ThresholdMethod,
};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("cannot load config: {0}")]
    Config(#[from] ConfigIoError),
    #[error("missing {0} (pass it as a flag or in --config)")]
    Missing(&'static str),
    #[error(transparent)]
    Batch(#[from] BatchError),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolarityArg {
    /// Pixels above the threshold become white.
    High,
    /// Pixels above the threshold become black.
    Low,
}

impl From<PolarityArg> for Polarity {
    fn from(arg: PolarityArg) -> Self {
        match arg {
            PolarityArg::High => Polarity::ForegroundHigh,
            PolarityArg::Low => Polarity::ForegroundLow,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "autothresh")]
#[command(version, about = "Binarize every TIFF in a directory with a histogram auto-threshold")]
struct Cli {
    /// Directory holding the input .tif/.tiff images
    #[arg(short, long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Directory for the binarized images (created if missing)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Threshold method, e.g. Otsu, IJDefault, MinErrorI or Manual
    #[arg(long = "thresholdtype", visible_alias = "method", value_name = "METHOD")]
    method: Option<String>,

    /// Threshold used with Manual
    #[arg(long = "thresholdvalue", value_name = "VALUE", allow_negative_numbers = true)]
    threshold_value: Option<f64>,

    /// Number of files processed in parallel
    #[arg(short = 'j', long, value_name = "N")]
    threads: Option<usize>,

    /// Output tile edge in pixels, a multiple of 16
    #[arg(long, value_name = "PX")]
    tile_size: Option<usize>,

    /// Output tile compression: none or deflate
    #[arg(long, value_name = "KIND")]
    compression: Option<Compression>,

    /// Which side of the threshold becomes white
    #[arg(long, value_enum)]
    polarity: Option<PolarityArg>,

    /// Leave intensity 0 out of the histogram
    #[arg(long)]
    ignore_black: bool,

    /// Leave the brightest intensity out of the histogram
    #[arg(long)]
    ignore_white: bool,

    /// Succeed when at least one file was written
    #[arg(long)]
    any_written: bool,

    /// Write per-file thresholds to this JSON file
    #[arg(long, value_name = "FILE")]
    threshold_report: Option<PathBuf>,

    /// JSON batch config; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log per-file details
    #[arg(short, long)]
    verbose: bool,

    /// Emit structured JSON logs through `tracing`
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_log: bool,
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Batch(BatchError::Configuration(e))
    }
}

fn load_config(path: &Path) -> Result<BatchConfig, CliError> {
    BatchConfig::load_json(path).map_err(|e| match e {
        ConfigIoError::Invalid(invalid) => invalid.into(),
        other => CliError::Config(other),
    })
}

impl Cli {
    fn into_config(self) -> Result<BatchConfig, CliError> {
        let method = self
            .method
            .as_deref()
            .map(str::parse::<ThresholdMethod>)
            .transpose()
            .map_err(ConfigError::from)?;
        let mut cfg = match &self.config {
            Some(path) => load_config(path)?,
            None => BatchConfig::new(
                self.input.clone().ok_or(CliError::Missing("--input"))?,
                self.output.clone().ok_or(CliError::Missing("--output"))?,
                method.ok_or(CliError::Missing("--thresholdtype"))?,
            ),
        };
        if let Some(input) = self.input {
            cfg.input_dir = input;
        }
        if let Some(output) = self.output {
            cfg.output_dir = output;
        }
        if let Some(method) = method {
            cfg.method = method;
        }
        if self.threshold_value.is_some() {
            cfg.threshold_value = self.threshold_value;
        }
        if let Some(threads) = self.threads {
            cfg.concurrency = threads;
        }
        if let Some(tile_size) = self.tile_size {
            cfg.tile_size = tile_size;
        }
        if let Some(compression) = self.compression {
            cfg.compression = compression;
        }
        if let Some(polarity) = self.polarity {
            cfg.polarity = polarity.into();
        }
        cfg.ignore_black |= self.ignore_black;
        cfg.ignore_white |= self.ignore_white;
        if self.any_written {
            cfg.success_policy = SuccessPolicy::AnyWritten;
        }
        if self.threshold_report.is_some() {
            cfg.threshold_report = self.threshold_report;
        }
        Ok(cfg)
    }
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    if cli.json_log {
        autothresh::core::init_tracing(true);
        return;
    }
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = autothresh::core::init_with_level(level) {
        eprintln!("logger already installed: {e}");
    }
}

fn run(cli: Cli) -> Result<bool, CliError> {
    let config = cli.into_config()?;
    let report = BatchPipeline::new(config)?.run()?;

    for file in report.failed() {
        if let FileOutcome::Failed { stage, error } = &file.outcome {
            eprintln!(
                "failed: {} (after {:?}): {}",
                file.input.display(),
                stage,
                error
            );
        }
    }
    println!(
        "{} of {} file(s) written",
        report.written(),
        report.files.len()
    );
    Ok(report.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
