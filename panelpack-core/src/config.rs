//! Pipeline configuration
//!
//! All knobs the unpack and repack steps need are carried by [`PipelineConfig`],
//! which is built from defaults, then environment variables, then whatever the
//! caller layers on top with the `with_*` methods.

use std::path::{Path, PathBuf};

/// Default document-conversion executable, looked up on `PATH`
pub const DEFAULT_CONVERTER: &str = "ebook-convert";

/// Default packer executable name, expected beside the running program
#[cfg(windows)]
pub const DEFAULT_PACKER_NAME: &str = "kcc-c2e.exe";
#[cfg(not(windows))]
pub const DEFAULT_PACKER_NAME: &str = "kcc-c2e";

/// Default device profile (Kindle Paperwhite 5)
pub const DEFAULT_DEVICE_PROFILE: &str = "KPW5";

/// Extension the packer gives its output
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mobi";

pub const ENV_CONVERTER: &str = "PANELPACK_CONVERTER";
pub const ENV_PACKER: &str = "PANELPACK_PACKER";
pub const ENV_PROFILE: &str = "PANELPACK_PROFILE";
pub const ENV_REPACK: &str = "PANELPACK_REPACK";

/// Configuration shared by the unpack and repack steps
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Converter executable: a bare name searched on `PATH`, or a path
    pub converter: String,

    /// Full path to the packer executable
    pub packer: PathBuf,

    /// Device profile passed to the packer (e.g. "KPW5", "KOA3", "KV")
    pub device_profile: String,

    /// Whether to repack after a successful unpack
    pub repack: bool,

    /// Extension of the file the packer is expected to produce
    pub output_extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            converter: DEFAULT_CONVERTER.to_string(),
            packer: default_packer_path(),
            device_profile: DEFAULT_DEVICE_PROFILE.to_string(),
            repack: true,
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `PANELPACK_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(converter) = lookup(ENV_CONVERTER).filter(|v| !v.is_empty()) {
            self.converter = converter;
        }
        if let Some(packer) = lookup(ENV_PACKER).filter(|v| !v.is_empty()) {
            self.packer = PathBuf::from(packer);
        }
        if let Some(profile) = lookup(ENV_PROFILE).filter(|v| !v.is_empty()) {
            self.device_profile = profile;
        }
        if let Some(value) = lookup(ENV_REPACK) {
            match parse_bool(&value) {
                Some(repack) => self.repack = repack,
                None => tracing::warn!("Ignoring {}={:?}: not a boolean", ENV_REPACK, value),
            }
        }
        self
    }

    pub fn with_converter(mut self, converter: impl Into<String>) -> Self {
        self.converter = converter.into();
        self
    }

    pub fn with_packer(mut self, packer: impl Into<PathBuf>) -> Self {
        self.packer = packer.into();
        self
    }

    pub fn with_device_profile(mut self, profile: impl Into<String>) -> Self {
        self.device_profile = profile.into();
        self
    }

    pub fn with_repack(mut self, repack: bool) -> Self {
        self.repack = repack;
        self
    }

    pub fn with_output_extension(mut self, ext: impl Into<String>) -> Self {
        self.output_extension = ext.into();
        self
    }
}

/// Packer location beside the running executable, or in the working
/// directory when that can't be determined
pub fn default_packer_path() -> PathBuf {
    let dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(DEFAULT_PACKER_NAME)
}

/// Parse a permissive boolean ("true", "0", "yes", "off", ...)
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
