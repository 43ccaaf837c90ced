use crate::acquire::{map_tool_error, run_with_deadline, AcquireMode, Rasterizer};
use crate::error::FacturaError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Rasterization backend using pdftoppm (from poppler-utils).
///
/// Writes `page-N.png` files into the scoped workspace; quick mode
/// restricts rendering to the first page.
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl PdftoppmRasterizer {
    pub fn new() -> Self {
        PdftoppmRasterizer {
            binary: PathBuf::from("pdftoppm"),
        }
    }

    /// Use an explicit pdftoppm binary instead of relying on PATH.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        PdftoppmRasterizer {
            binary: binary.into(),
        }
    }

    /// Check if pdftoppm is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftoppm")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(
        &self,
        document: &Path,
        mode: AcquireMode,
        dpi: u32,
        workspace: &Path,
        timeout: Option<Duration>,
    ) -> Result<Vec<PathBuf>, FacturaError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-png").arg("-r").arg(dpi.to_string());
        if mode == AcquireMode::Quick {
            cmd.args(["-f", "1", "-l", "1"]);
        }
        cmd.arg(document).arg(workspace.join("page"));

        let output = run_with_deadline(cmd, "pdftoppm", timeout)
            .map_err(|e| map_tool_error(e, "pdftoppm", FacturaError::RasterizerNotFound, timeout))?;

        if !output.status.success() {
            return Err(FacturaError::ToolFailed {
                tool: "pdftoppm",
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        collect_page_images(workspace)
    }

    fn backend_name(&self) -> &str {
        "pdftoppm"
    }
}

static PAGE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"page-(\d+)\.png$").expect("invalid pattern"));

/// Collect `page-N.png` files from the workspace in numeric page order.
/// pdftoppm zero-pads inconsistently across versions, so lexicographic
/// order is not enough.
fn collect_page_images(workspace: &Path) -> Result<Vec<PathBuf>, FacturaError> {
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(workspace)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(caps) = PAGE_IMAGE.captures(name) {
            if let Ok(n) = caps[1].parse::<u32>() {
                pages.push((n, path));
            }
        }
    }
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, p)| p).collect())
}
