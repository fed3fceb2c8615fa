//! Batch processing command implementation

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use panelpack_core::{FileReport, Pipeline, PipelineConfig, SystemRunner};
use std::path::PathBuf;

/// Unpack (and optionally repack) each input in order
pub fn process(inputs: &[PathBuf], config: PipelineConfig, json: bool) -> Result<()> {
    if !json {
        println!("Found {} files to process", inputs.len());
    }

    tracing::debug!("Pipeline config: {:?}", config);

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(inputs.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")?
            .progress_chars("##-"),
    );

    let pipeline = Pipeline::new(config, SystemRunner);
    let summary = pipeline.process_all(inputs, |index, total, report| {
        if !json {
            pb.suspend(|| print_report(index, total, report));
        }
        pb.inc(1);
    });

    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\nBatch processing complete:");
    println!("  Success: {}", summary.succeeded());
    println!("  Errors:  {}", summary.failed());

    Ok(())
}

fn print_report(index: usize, total: usize, report: &FileReport) {
    println!("[{}/{}] {}", index, total, report.input.display());

    if let Some(unpacked) = &report.unpacked {
        println!(
            "  Extracted {} images -> {}",
            unpacked.image_count,
            unpacked.output_dir.display()
        );
    }

    if let Some(repacked) = &report.repacked {
        if repacked.produced {
            println!("  Packed -> {}", repacked.expected_output.display());
        } else {
            println!(
                "  Warning: packer finished but {} was not found",
                repacked.expected_output.display()
            );
        }
    }

    if let Some(error) = &report.error {
        let label = if error.is_warning() { "Warning" } else { "Error" };
        println!("  {}: {}", label, error);
    }
}
