use crate::acquire::{run_with_deadline, OcrEngine};
use crate::error::FacturaError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// OCR backend shelling out to the tesseract binary with a fixed
/// language profile, reading recognized text from stdout.
pub struct TesseractOcr {
    binary: PathBuf,
}

impl TesseractOcr {
    pub fn new() -> Self {
        TesseractOcr {
            binary: PathBuf::from("tesseract"),
        }
    }

    /// Use an explicit tesseract binary instead of relying on PATH.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        TesseractOcr {
            binary: binary.into(),
        }
    }

    /// Check if tesseract is available on the system.
    pub fn is_available() -> bool {
        Command::new("tesseract")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(
        &self,
        image: &Path,
        language: &str,
        timeout: Option<Duration>,
    ) -> Result<String, FacturaError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image).arg("stdout").arg("-l").arg(language);

        let output = run_with_deadline(cmd, "tesseract", timeout).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FacturaError::OcrNotFound,
            std::io::ErrorKind::TimedOut => FacturaError::ToolTimeout {
                tool: "tesseract",
                seconds: timeout.map(|t| t.as_secs()).unwrap_or(0),
            },
            _ => FacturaError::Ocr(format!("tesseract failed: {e}")),
        })?;

        if !output.status.success() {
            return Err(FacturaError::ToolFailed {
                tool: "tesseract",
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn backend_name(&self) -> &str {
        "tesseract"
    }
}
