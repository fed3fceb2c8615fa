//! Unpack step: e-book -> directory of numbered page images

use crate::config::PipelineConfig;
use crate::error::{PanelpackError, Result};
use crate::extract::extract_images;
use crate::tool::{find_executable, ToolRunner};
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Name of the converter's output inside the scratch directory
const INTERMEDIATE_NAME: &str = "converted.zip";

/// Result of a successful unpack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnpackOutcome {
    pub output_dir: PathBuf,
    pub image_count: usize,
}

/// Directory the images of `input` are written to: a sibling named after
/// the input's stem
pub fn output_dir_for(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            PanelpackError::InvalidInput(format!("{} has no file name", input.display()))
        })?;
    Ok(parent_or_current(input).join(stem))
}

/// Parent directory of `path`, with `.` standing in for a bare file name
pub(crate) fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Converts an e-book with the external converter and extracts its images
pub struct Unpacker<'a, R: ToolRunner> {
    config: &'a PipelineConfig,
    runner: &'a R,
}

impl<'a, R: ToolRunner> Unpacker<'a, R> {
    pub fn new(config: &'a PipelineConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    pub fn unpack(&self, input: &Path) -> Result<UnpackOutcome> {
        let converter = find_executable(&self.config.converter).ok_or_else(|| {
            PanelpackError::ToolNotFound {
                tool: self.config.converter.clone(),
                hint: "Install Calibre and make sure its command-line tools are on PATH."
                    .to_string(),
            }
        })?;

        let output_dir = output_dir_for(input)?;
        fs::create_dir_all(&output_dir)?;
        tracing::info!("Output directory: {:?}", output_dir);

        // Removed on drop, whichever way this function returns
        let scratch = tempfile::Builder::new().prefix("panelpack-").tempdir()?;
        let intermediate = scratch.path().join(INTERMEDIATE_NAME);

        tracing::info!("Converting {:?} with {:?}", input, converter);
        let args: Vec<OsString> = vec![input.into(), intermediate.clone().into()];
        self.runner
            .run(&converter, &args)?
            .into_result(&self.config.converter)?;

        let archive = File::open(&intermediate).map_err(|e| {
            PanelpackError::InvalidArchive(format!("converter produced no archive: {}", e))
        })?;
        let written = extract_images(BufReader::new(archive), &output_dir)?;

        tracing::info!("Extracted {} images to {:?}", written.len(), output_dir);

        Ok(UnpackOutcome {
            output_dir,
            image_count: written.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolOutput;
    use std::cell::RefCell;
    use std::io::{Cursor, Write};
    use tempfile::{tempdir, TempDir};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Stands in for the converter: writes fixed bytes to the output argument
    /// and remembers where it wrote them
    struct FakeConverter {
        payload: Option<Vec<u8>>,
        exit_code: i32,
        seen_outputs: RefCell<Vec<PathBuf>>,
    }

    impl FakeConverter {
        fn producing(payload: Vec<u8>) -> Self {
            Self {
                payload: Some(payload),
                exit_code: 0,
                seen_outputs: RefCell::new(Vec::new()),
            }
        }

        fn failing(code: i32) -> Self {
            Self {
                payload: None,
                exit_code: code,
                seen_outputs: RefCell::new(Vec::new()),
            }
        }
    }

    impl ToolRunner for FakeConverter {
        fn run(&self, _program: &Path, args: &[OsString]) -> std::io::Result<ToolOutput> {
            let out = PathBuf::from(&args[1]);
            if let Some(payload) = &self.payload {
                fs::write(&out, payload)?;
            }
            self.seen_outputs.borrow_mut().push(out);
            Ok(ToolOutput {
                code: Some(self.exit_code),
                stdout: String::new(),
                stderr: "conversion error".to_string(),
            })
        }
    }

    fn zip_with(entries: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut buf));
            for name in entries {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(name.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buf
    }

    /// Workspace with an input book and a converter "executable" file
    fn setup() -> (TempDir, PathBuf, PipelineConfig) {
        let dir = tempdir().unwrap();
        let input = dir.path().join("My Comic.mobi");
        fs::write(&input, b"mobi").unwrap();
        let converter = dir.path().join("ebook-convert");
        fs::write(&converter, b"").unwrap();
        let config = PipelineConfig::default().with_converter(converter.to_string_lossy());
        (dir, input, config)
    }

    fn assert_intermediates_removed(runner: &FakeConverter) {
        let seen = runner.seen_outputs.borrow();
        assert!(!seen.is_empty());
        for path in seen.iter() {
            assert!(!path.exists(), "{:?} left behind", path);
            assert!(!path.parent().unwrap().exists());
        }
    }

    #[test]
    fn test_output_dir_for() {
        assert_eq!(
            output_dir_for(Path::new("/books/One Piece 01.mobi")).unwrap(),
            PathBuf::from("/books/One Piece 01")
        );
        assert_eq!(
            output_dir_for(Path::new("book.azw3")).unwrap(),
            PathBuf::from("./book")
        );
        assert!(matches!(
            output_dir_for(Path::new("/")),
            Err(PanelpackError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parent_or_current() {
        assert_eq!(parent_or_current(Path::new("book")), Path::new("."));
        assert_eq!(parent_or_current(Path::new("./book")), Path::new("."));
        assert_eq!(parent_or_current(Path::new("a/book")), Path::new("a"));
        assert_eq!(parent_or_current(Path::new("/")), Path::new("."));
    }

    #[test]
    fn test_unpack_success() {
        let (dir, input, config) = setup();
        let runner = FakeConverter::producing(zip_with(&[
            "images/00002.jpg",
            "images/00001.jpg",
            "index.html",
        ]));

        let outcome = Unpacker::new(&config, &runner).unpack(&input).unwrap();

        assert_eq!(outcome.output_dir, dir.path().join("My Comic"));
        assert_eq!(outcome.image_count, 2);
        assert_eq!(
            fs::read(outcome.output_dir.join("0001.jpg")).unwrap(),
            b"images/00001.jpg"
        );
        assert!(outcome.output_dir.join("0002.jpg").exists());
        assert_intermediates_removed(&runner);
    }

    #[test]
    fn test_unpack_is_idempotent_on_existing_dir() {
        let (dir, input, config) = setup();
        fs::create_dir_all(dir.path().join("My Comic")).unwrap();
        let runner = FakeConverter::producing(zip_with(&["a.png"]));

        let outcome = Unpacker::new(&config, &runner).unpack(&input).unwrap();
        assert_eq!(outcome.image_count, 1);
    }

    #[test]
    fn test_missing_converter() {
        let (_dir, input, config) = setup();
        let config = config.with_converter("/nonexistent/ebook-convert");
        let runner = FakeConverter::producing(zip_with(&["a.png"]));

        let result = Unpacker::new(&config, &runner).unpack(&input);

        assert!(matches!(result, Err(PanelpackError::ToolNotFound { .. })));
        assert!(runner.seen_outputs.borrow().is_empty());
    }

    #[test]
    fn test_converter_failure() {
        let (_dir, input, config) = setup();
        let runner = FakeConverter::failing(1);

        let result = Unpacker::new(&config, &runner).unpack(&input);

        match result {
            Err(PanelpackError::ToolFailed { code, output, .. }) => {
                assert_eq!(code, Some(1));
                assert!(output.contains("conversion error"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_intermediates_removed(&runner);
    }

    #[test]
    fn test_converter_writes_nothing() {
        let (_dir, input, config) = setup();
        // Exits cleanly without producing the archive
        let runner = FakeConverter::failing(0);

        let result = Unpacker::new(&config, &runner).unpack(&input);
        assert!(matches!(result, Err(PanelpackError::InvalidArchive(_))));
    }

    #[test]
    fn test_malformed_intermediate() {
        let (_dir, input, config) = setup();
        let runner = FakeConverter::producing(b"PK but not really".to_vec());

        let result = Unpacker::new(&config, &runner).unpack(&input);

        assert!(matches!(result, Err(PanelpackError::InvalidArchive(_))));
        assert_intermediates_removed(&runner);
    }

    #[test]
    fn test_no_images() {
        let (dir, input, config) = setup();
        let runner = FakeConverter::producing(zip_with(&["index.html", "toc.ncx"]));

        let result = Unpacker::new(&config, &runner).unpack(&input);

        assert!(matches!(result, Err(PanelpackError::NoImages)));
        let output_dir = dir.path().join("My Comic");
        assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 0);
        assert_intermediates_removed(&runner);
    }
}
