//! Tesseract OCR engine, run as an external process.
//!
//! The executable comes from, in order: an explicit path, a Tesseract
//! folder unpacked from a bundle zip, or `tesseract` on `PATH`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use scan_core::error::{Result, ScanError};
use scan_core::options::ScanOptions;
use scan_core::plugin::OcrEngine;

fn exe_name() -> String {
    format!("tesseract{}", std::env::consts::EXE_SUFFIX)
}

pub struct TesseractEngine {
    program: PathBuf,
    tessdata: Option<PathBuf>,
    // Keeps an unpacked bundle alive for as long as the engine.
    _bundle_dir: Option<TempDir>,
}

impl TesseractEngine {
    /// Resolve the executable from `tesseract_path`, then `tesseract_bundle`,
    /// then `PATH`.
    pub fn from_options(options: &ScanOptions) -> Result<Self> {
        if let Some(program) = &options.tesseract_path {
            log::info!("Using Tesseract at {}", program.display());
            return Ok(Self::with_program(program));
        }
        if let Some(bundle) = &options.tesseract_bundle {
            return Self::from_bundle(bundle, &options.bundle_prefix);
        }
        Ok(Self::with_program(exe_name()))
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            tessdata: None,
            _bundle_dir: None,
        }
    }

    /// Unpack the `prefix` folder of `bundle` into a temp dir and use the
    /// Tesseract executable inside it.
    pub fn from_bundle(bundle: &Path, prefix: &str) -> Result<Self> {
        log::info!(
            "Extracting '{}' from Tesseract bundle {}",
            prefix,
            bundle.display()
        );

        let tmp_dir = TempDir::new()?;
        let extracted = scan_utils::archive::extract_prefix(bundle, prefix, tmp_dir.path())
            .map_err(|e| {
                ScanError::Archive(format!("Failed to extract {}: {}", bundle.display(), e))
            })?;
        if extracted.is_empty() {
            return Err(ScanError::Archive(format!(
                "{} has no entries under '{}'",
                bundle.display(),
                prefix
            )));
        }

        let folder = tmp_dir.path().join(prefix.trim_end_matches('/'));
        let program = [exe_name(), "tesseract.exe".to_string(), "tesseract".to_string()]
            .iter()
            .map(|name| folder.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                ScanError::Archive(format!(
                    "No tesseract executable under '{}' in {}",
                    prefix,
                    bundle.display()
                ))
            })?;

        let tessdata = Some(folder.join("tessdata")).filter(|dir| dir.is_dir());
        log::debug!("Bundled Tesseract unpacked to {}", program.display());

        Ok(Self {
            program,
            tessdata,
            _bundle_dir: Some(tmp_dir),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn tessdata(&self) -> Option<&Path> {
        self.tessdata.as_deref()
    }

    /// Command that prints the text of `image` to stdout.
    fn command(&self, image: &Path, language: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(image).arg("stdout").arg("-l").arg(language);
        if let Some(tessdata) = &self.tessdata {
            cmd.env("TESSDATA_PREFIX", tessdata);
        }
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "Tesseract"
    }

    fn recognize(&self, image: &Path, options: &ScanOptions) -> Result<String> {
        let output = match self.command(image, &options.ocr_language).output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ScanError::Ocr(format!(
                    "{} not found. Install tesseract-ocr, or set tesseract_path / \
                     tesseract_bundle",
                    self.program.display()
                )));
            }
            Err(e) => {
                return Err(ScanError::Ocr(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::Ocr(format!("tesseract failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_bundle(path: &Path, entries: &[(&str, &[u8], u32)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content, mode) in entries {
            let options = SimpleFileOptions::default().unix_permissions(*mode);
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_explicit_path_wins_over_bundle() {
        let mut opts = ScanOptions::default();
        opts.tesseract_path = Some(PathBuf::from("/opt/tess/bin/tesseract"));
        opts.tesseract_bundle = Some(PathBuf::from("/does/not/exist.zip"));

        let engine = TesseractEngine::from_options(&opts).unwrap();
        assert_eq!(engine.program(), Path::new("/opt/tess/bin/tesseract"));
        assert!(engine.tessdata().is_none());
    }

    #[test]
    fn test_default_uses_path_lookup() {
        let engine = TesseractEngine::from_options(&ScanOptions::default()).unwrap();
        assert_eq!(engine.program(), Path::new(&exe_name()));
    }

    #[test]
    fn test_command_arguments() {
        let mut engine = TesseractEngine::with_program("tesseract");
        engine.tessdata = Some(PathBuf::from("/bundle/tessdata"));

        let cmd = engine.command(Path::new("/img/page_1.png"), "deu");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["/img/page_1.png", "stdout", "-l", "deu"]);

        let envs: Vec<_> = cmd.get_envs().collect();
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].0, "TESSDATA_PREFIX");
    }

    #[test]
    fn test_missing_binary_reports_install_hint() {
        let engine = TesseractEngine::with_program("/nonexistent/tesseract");
        let err = engine
            .recognize(Path::new("page_1.png"), &ScanOptions::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::Ocr(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_bundle_without_executable() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("plugin.zip");
        write_bundle(
            &bundle,
            &[("Tesseract-OCR/tessdata/eng.traineddata", b"data", 0o644)],
        );

        let err = TesseractEngine::from_bundle(&bundle, "Tesseract-OCR/")
            .err()
            .unwrap();
        assert!(matches!(err, ScanError::Archive(_)));
    }

    #[test]
    fn test_bundle_without_prefix() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("plugin.zip");
        write_bundle(&bundle, &[("other/readme.txt", b"x", 0o644)]);

        let err = TesseractEngine::from_bundle(&bundle, "Tesseract-OCR/")
            .err()
            .unwrap();
        assert!(err.to_string().contains("no entries"));
    }

    #[cfg(unix)]
    #[test]
    fn test_bundled_engine_runs() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("plugin.zip");
        write_bundle(
            &bundle,
            &[
                (
                    "Tesseract-OCR/tesseract",
                    b"#!/bin/sh\necho \"Chapter 7\"\necho \"lang=$4 data=$TESSDATA_PREFIX\"\n",
                    0o755,
                ),
                ("Tesseract-OCR/tessdata/eng.traineddata", b"data", 0o644),
            ],
        );

        let engine = TesseractEngine::from_bundle(&bundle, "Tesseract-OCR/").unwrap();
        let tessdata = engine.tessdata().unwrap().to_path_buf();
        assert!(tessdata.ends_with("Tesseract-OCR/tessdata"));

        let text = engine
            .recognize(Path::new("page_1.png"), &ScanOptions::default())
            .unwrap();
        assert_eq!(
            text,
            format!("Chapter 7\nlang=eng data={}\n", tessdata.display())
        );
    }
}
