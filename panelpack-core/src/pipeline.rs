//! Sequential batch processing: unpack, then optionally repack, per input file

use crate::config::PipelineConfig;
use crate::error::PanelpackError;
use crate::repack::{RepackOutcome, Repacker};
use crate::tool::ToolRunner;
use crate::unpack::{UnpackOutcome, Unpacker};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to a single input file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub unpacked: Option<UnpackOutcome>,
    pub repacked: Option<RepackOutcome>,
    /// Error that stopped processing of this file
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<PanelpackError>,
}

impl FileReport {
    fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            unpacked: None,
            repacked: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.unpacked.is_some() && self.error.is_none()
    }
}

fn serialize_error<S>(error: &Option<PanelpackError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Reports for a whole batch, in input order
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }
}

/// Drives the unpack and repack steps over a list of inputs
pub struct Pipeline<R: ToolRunner> {
    config: PipelineConfig,
    runner: R,
}

impl<R: ToolRunner> Pipeline<R> {
    pub fn new(config: PipelineConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Process one file. Errors are captured in the report, never returned.
    pub fn process_file(&self, input: &Path) -> FileReport {
        let mut report = FileReport::new(input);

        let unpacked = match Unpacker::new(&self.config, &self.runner).unpack(input) {
            Ok(outcome) => outcome,
            Err(e) => {
                log_failure(input, &e);
                report.error = Some(e);
                return report;
            }
        };

        let folder = unpacked.output_dir.clone();
        report.unpacked = Some(unpacked);

        if !self.config.repack {
            tracing::debug!("Repacking disabled, skipping {:?}", folder);
            return report;
        }

        match Repacker::new(&self.config, &self.runner).repack(&folder) {
            Ok(outcome) => report.repacked = Some(outcome),
            Err(e) => {
                log_failure(input, &e);
                report.error = Some(e);
            }
        }

        report
    }

    /// Process every input in order. `on_progress` is called after each file
    /// with its 1-based position, the total, and its report.
    pub fn process_all<P, F>(&self, inputs: &[P], mut on_progress: F) -> BatchSummary
    where
        P: AsRef<Path>,
        F: FnMut(usize, usize, &FileReport),
    {
        let total = inputs.len();
        let mut summary = BatchSummary::default();

        for (i, input) in inputs.iter().enumerate() {
            let input = input.as_ref();
            tracing::info!("Processing {}/{}: {:?}", i + 1, total, input);

            let report = self.process_file(input);
            on_progress(i + 1, total, &report);
            summary.reports.push(report);
        }

        summary
    }
}

fn log_failure(input: &Path, error: &PanelpackError) {
    if error.is_warning() {
        tracing::warn!("{:?}: {}", input, error);
    } else {
        tracing::error!("Failed to process {:?}: {}", input, error);
    }
}
