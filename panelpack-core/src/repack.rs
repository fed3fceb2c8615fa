//! Repack step: image directory -> device-optimized book via the external packer

use crate::config::PipelineConfig;
use crate::error::{PanelpackError, Result};
use crate::tool::ToolRunner;
use crate::unpack::parent_or_current;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Result of a packer run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepackOutcome {
    /// Where the packed book was expected
    pub expected_output: PathBuf,

    /// Whether the expected file exists after the run
    pub produced: bool,
}

/// Packer argument list, in the order the packer expects
pub fn packer_args(profile: &str, title: &str, output_dir: &Path, folder: &Path) -> Vec<OsString> {
    vec![
        "-p".into(),
        profile.into(),
        "-m".into(),
        "--manga-style".into(),
        "-t".into(),
        title.into(),
        "-o".into(),
        output_dir.into(),
        folder.into(),
    ]
}

/// Path the packer is checked and run at. A bare name means a file in the
/// working directory, never a `PATH` lookup.
pub fn resolve_packer(packer: &Path) -> PathBuf {
    let mut components = packer.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Path::new(".").join(packer),
        _ => packer.to_path_buf(),
    }
}

/// Runs the external packer over an image directory
pub struct Repacker<'a, R: ToolRunner> {
    config: &'a PipelineConfig,
    runner: &'a R,
}

impl<'a, R: ToolRunner> Repacker<'a, R> {
    pub fn new(config: &'a PipelineConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    pub fn repack(&self, folder: &Path) -> Result<RepackOutcome> {
        let packer = &resolve_packer(&self.config.packer);
        let tool_name = packer
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| packer.display().to_string());

        if !packer.is_file() {
            return Err(PanelpackError::ToolNotFound {
                tool: packer.display().to_string(),
                hint: format!("Place {} in the same folder as this program.", tool_name),
            });
        }

        let title = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                PanelpackError::InvalidInput(format!("{} has no folder name", folder.display()))
            })?;
        let output_dir = parent_or_current(folder);

        tracing::info!(
            "Repacking {:?} with {:?} (profile {})",
            title,
            packer,
            self.config.device_profile
        );

        let args = packer_args(&self.config.device_profile, &title, output_dir, folder);
        let output = self.runner.run(packer, &args)?.into_result(&tool_name)?;
        if !output.stdout.is_empty() {
            tracing::debug!("{} output:\n{}", tool_name, output.stdout.trim_end());
        }

        let expected_output =
            output_dir.join(format!("{}.{}", title, self.config.output_extension));
        let produced = expected_output.is_file();

        if produced {
            tracing::info!("Packed book saved as {:?}", expected_output);
        } else {
            tracing::warn!(
                "{} finished but {:?} was not found; check the output directory",
                tool_name,
                expected_output
            );
        }

        Ok(RepackOutcome {
            expected_output,
            produced,
        })
    }
}
