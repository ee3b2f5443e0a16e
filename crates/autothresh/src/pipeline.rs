//! Batch driver: discover, then per file decode → threshold → binarize →
//! tile → encode on a bounded worker pool.

use std::fs;
use std::path::{Path, PathBuf};

use autothresh_core::{
    Binarizer, Histogram, HistogramOptions, ThresholdSelector, TileCodec, NO_THRESHOLD,
};
use rayon::prelude::*;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::codec::ImageCodec;
use crate::config::{BatchConfig, SuccessPolicy};
use crate::error::{BatchError, ConfigIoError, FileError};
use crate::tiff_codec::TiffCodec;

/// Last stage a file reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    Discovered,
    Decoded,
    Thresholded,
    Binarized,
    Tiled,
    Written,
}

#[derive(Debug)]
pub enum FileOutcome {
    /// Output committed with the threshold in intensity units (`-1` when the
    /// method did not resolve and the image was copied unchanged).
    Written { threshold: f64 },
    /// Processing stopped after `stage`.
    Failed { stage: FileStage, error: FileError },
}

/// Result for one input file.
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_written(&self) -> bool {
        matches!(self.outcome, FileOutcome::Written { .. })
    }

    pub fn threshold(&self) -> Option<f64> {
        match self.outcome {
            FileOutcome::Written { threshold } => Some(threshold),
            FileOutcome::Failed { .. } => None,
        }
    }
}

/// Outcome of a whole batch, one entry per discovered file in name order.
#[derive(Debug)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub policy: SuccessPolicy,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.files.iter().filter(|f| f.is_written()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_written())
    }

    /// Success under the configured [`SuccessPolicy`]; an empty report never
    /// succeeds.
    pub fn is_success(&self) -> bool {
        match self.policy {
            SuccessPolicy::AllWritten => {
                !self.files.is_empty() && self.written() == self.files.len()
            }
            SuccessPolicy::AnyWritten => self.written() > 0,
        }
    }

    /// Per-file thresholds and failures in serializable form.
    pub fn threshold_records(&self) -> Vec<ThresholdRecord> {
        self.files
            .iter()
            .map(|f| match &f.outcome {
                FileOutcome::Written { threshold } => ThresholdRecord {
                    file: f.input.clone(),
                    threshold: Some(*threshold),
                    stage: FileStage::Written,
                    error: None,
                },
                FileOutcome::Failed { stage, error } => ThresholdRecord {
                    file: f.input.clone(),
                    threshold: None,
                    stage: *stage,
                    error: Some(error.to_string()),
                },
            })
            .collect()
    }

    /// Write [`BatchReport::threshold_records`] as pretty JSON.
    pub fn write_threshold_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(&self.threshold_records())?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// One line of the threshold report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdRecord {
    pub file: PathBuf,
    pub threshold: Option<f64>,
    pub stage: FileStage,
    pub error: Option<String>,
}

/// A validated batch bound to an image codec.
#[derive(Debug)]
pub struct BatchPipeline<C> {
    config: BatchConfig,
    selector: ThresholdSelector,
    binarizer: Binarizer,
    histogram: HistogramOptions,
    codec: C,
}

impl BatchPipeline<TiffCodec> {
    /// TIFF pipeline with the configured compression.
    pub fn new(config: BatchConfig) -> Result<Self, BatchError> {
        let codec = TiffCodec::new(config.compression);
        Self::with_codec(config, codec)
    }
}

impl<C: ImageCodec + Sync> BatchPipeline<C> {
    /// Fails on configuration errors before touching the filesystem.
    pub fn with_codec(config: BatchConfig, codec: C) -> Result<Self, BatchError> {
        let selector = config.validate()?;
        Ok(Self {
            selector,
            binarizer: Binarizer::new(config.polarity),
            histogram: config.histogram_options(),
            config,
            codec,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Files the codec accepts directly inside the input directory, sorted
    /// by name.
    pub fn discover(&self) -> Result<Vec<PathBuf>, BatchError> {
        let input = &self.config.input_dir;
        if !input.is_dir() {
            return Err(BatchError::InputNotFound(input.clone()));
        }
        let unreadable = |source| BatchError::InputUnreadable {
            path: input.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(input).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if path.is_file() && self.codec.accepts(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Run the whole batch. File errors are recorded in the report; only
    /// batch-level problems return `Err`.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self),
            fields(input = %self.config.input_dir.display(), method = %self.config.method)
        )
    )]
    pub fn run(&self) -> Result<BatchReport, BatchError> {
        let files = self.discover()?;
        if files.is_empty() {
            return Err(BatchError::EmptyInput(self.config.input_dir.clone()));
        }
        self.prepare_output()?;

        log::info!(
            "binarizing {} file(s) from {} into {} with {} on {} worker(s)",
            files.len(),
            self.config.input_dir.display(),
            self.config.output_dir.display(),
            self.config.method,
            self.config.concurrency
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.concurrency)
            .thread_name(|i| format!("worker-{i}"))
            .build()?;
        let reports: Vec<FileReport> =
            pool.install(|| files.par_iter().map(|f| self.process_file(f)).collect());

        let report = BatchReport {
            files: reports,
            policy: self.config.success_policy,
        };
        if let Some(path) = &self.config.threshold_report {
            report
                .write_threshold_json(path)
                .map_err(BatchError::Report)?;
        }
        log::info!(
            "batch finished: {} written, {} failed",
            report.written(),
            report.files.len() - report.written()
        );
        Ok(report)
    }

    /// Create the output directory; an existing directory is fine.
    fn prepare_output(&self) -> Result<(), BatchError> {
        let out = &self.config.output_dir;
        fs::create_dir_all(out).map_err(|source| BatchError::OutputUnwritable {
            path: out.clone(),
            source,
        })
    }

    /// Process one file, recording how far it got.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(file = %input.display()))
    )]
    pub fn process_file(&self, input: &Path) -> FileReport {
        let output = match input.file_name() {
            Some(name) => self.config.output_dir.join(name),
            None => self.config.output_dir.clone(),
        };
        let mut stage = FileStage::Discovered;
        let outcome = match self.run_stages(input, &output, &mut stage) {
            Ok(threshold) => FileOutcome::Written { threshold },
            Err(error) => {
                log::warn!("{}: failed after {:?}: {}", input.display(), stage, error);
                FileOutcome::Failed { stage, error }
            }
        };
        FileReport {
            input: input.to_path_buf(),
            output,
            outcome,
        }
    }

    fn run_stages(
        &self,
        input: &Path,
        output: &Path,
        stage: &mut FileStage,
    ) -> Result<f64, FileError> {
        let decoded = self.codec.decode(input)?;
        let (lo, hi) = decoded.buffer.min_max();
        log::debug!(
            "{}: {}x{} {}-bit, intensities {}..={}",
            input.display(),
            decoded.buffer.width(),
            decoded.buffer.height(),
            decoded.metadata.bit_depth.bits(),
            lo,
            hi
        );
        *stage = FileStage::Decoded;

        let mut histogram = Histogram::build(&decoded.buffer);
        histogram.clamp(self.histogram);
        let threshold = self.selector.resolve(histogram.bracket().as_ref());
        if threshold == NO_THRESHOLD {
            log::debug!("{}: no threshold, copying pixels", input.display());
        } else {
            log::debug!("{}: threshold {}", input.display(), threshold);
        }
        *stage = FileStage::Thresholded;

        let binary = self.binarizer.binarize(decoded.buffer, threshold);
        *stage = FileStage::Binarized;

        let tiles =
            TileCodec::for_buffer(&binary, self.config.tile_size, self.codec.byte_order())?;
        let packed = tiles.split(&binary);
        *stage = FileStage::Tiled;

        self.codec.encode(output, tiles.grid(), &decoded.metadata, &packed)?;
        *stage = FileStage::Written;
        Ok(threshold)
    }
}

/// Run a TIFF batch described by `config`.
pub fn run(config: &BatchConfig) -> Result<BatchReport, BatchError> {
    BatchPipeline::new(config.clone())?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<bool>, policy: SuccessPolicy) -> BatchReport {
        let files = outcomes
            .into_iter()
            .map(|ok| FileReport {
                input: PathBuf::from("in.tif"),
                output: PathBuf::from("out.tif"),
                outcome: if ok {
                    FileOutcome::Written { threshold: 3.0 }
                } else {
                    FileOutcome::Failed {
                        stage: FileStage::Discovered,
                        error: FileError::UnsupportedImageShape("RGB(8)".into()),
                    }
                },
            })
            .collect();
        BatchReport { files, policy }
    }

    #[test]
    fn all_written_policy() {
        assert!(report(vec![true, true], SuccessPolicy::AllWritten).is_success());
        assert!(!report(vec![true, false], SuccessPolicy::AllWritten).is_success());
        assert!(!report(vec![], SuccessPolicy::AllWritten).is_success());
    }

    #[test]
    fn any_written_policy() {
        assert!(report(vec![false, true], SuccessPolicy::AnyWritten).is_success());
        assert!(!report(vec![false], SuccessPolicy::AnyWritten).is_success());
        assert!(!report(vec![], SuccessPolicy::AnyWritten).is_success());
    }

    #[test]
    fn threshold_records_keep_failures() {
        let records = report(vec![true, false], SuccessPolicy::AllWritten).threshold_records();
        assert_eq!(records[0].threshold, Some(3.0));
        assert_eq!(records[1].stage, FileStage::Discovered);
        assert!(records[1].error.as_deref().unwrap().contains("RGB"));
    }
}
