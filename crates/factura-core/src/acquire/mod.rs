pub mod pdftoppm;
pub mod preprocess;
pub mod tesseract;

use crate::error::FacturaError;
use crate::model::PAGE_BREAK;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

/// Acquisition mode: `Quick` renders only the first page at low
/// resolution for classification sampling, `Full` renders every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireMode {
    Quick,
    Full,
}

/// Configuration for text acquisition, passed explicitly into
/// [`TextAcquisition::new`] rather than living in process globals.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Tesseract language profile.
    pub language: String,
    /// Rasterization resolution for quick-mode sampling.
    pub quick_dpi: u32,
    /// Rasterization resolution for full extraction.
    pub full_dpi: u32,
    /// Upper bound for each external rasterizer/OCR invocation. A hung
    /// child process is killed when the deadline passes; `None` waits
    /// indefinitely.
    pub page_timeout: Option<Duration>,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        AcquireConfig {
            language: "spa".to_string(),
            quick_dpi: 150,
            full_dpi: 300,
            page_timeout: None,
        }
    }
}

/// External page rasterizer. Renders document pages into image files
/// inside the caller-provided scoped workspace, in page order.
pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        document: &Path,
        mode: AcquireMode,
        dpi: u32,
        workspace: &Path,
        timeout: Option<Duration>,
    ) -> Result<Vec<PathBuf>, FacturaError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// External OCR engine. Turns one page image into raw text.
pub trait OcrEngine: Send + Sync {
    fn recognize(
        &self,
        image: &Path,
        language: &str,
        timeout: Option<Duration>,
    ) -> Result<String, FacturaError>;

    fn backend_name(&self) -> &str;
}

/// A page whose cleaned OCR output is shorter than this is logged as
/// suspicious; the whole document under [`SHORT_DOCUMENT_CHARS`] likewise.
const SHORT_PAGE_CHARS: usize = 30;
const SHORT_DOCUMENT_CHARS: usize = 50;

/// Turns one source document into unified plain text via the external
/// rasterizer and OCR collaborators.
///
/// Acquisition never raises: any rasterization or OCR failure is caught
/// here and degrades to the empty string. Once non-empty text has been
/// produced it is cached on the instance; `force` re-acquires.
pub struct TextAcquisition {
    document: PathBuf,
    rasterizer: Box<dyn Rasterizer>,
    ocr: Box<dyn OcrEngine>,
    config: AcquireConfig,
    cached: Option<String>,
}

impl std::fmt::Debug for TextAcquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAcquisition")
            .field("document", &self.document)
            .field("config", &self.config)
            .field("cached", &self.cached)
            .finish_non_exhaustive()
    }
}

impl TextAcquisition {
    pub fn new(
        document: impl Into<PathBuf>,
        rasterizer: Box<dyn Rasterizer>,
        ocr: Box<dyn OcrEngine>,
        config: AcquireConfig,
    ) -> Self {
        TextAcquisition {
            document: document.into(),
            rasterizer,
            ocr,
            config,
            cached: None,
        }
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Whether non-empty text has already been acquired.
    pub fn has_text(&self) -> bool {
        self.cached.is_some()
    }

    /// Acquire unified text for the document. Soft-failure contract:
    /// returns `""` when the rasterizer or OCR engine is unusable.
    pub fn unified_text(&mut self, mode: AcquireMode, force: bool) -> String {
        if !force {
            if let Some(text) = &self.cached {
                tracing::debug!(document = %self.document.display(), "returning cached OCR text");
                return text.clone();
            }
        }

        match self.acquire(mode) {
            Ok(text) => {
                if text.len() < SHORT_DOCUMENT_CHARS {
                    tracing::warn!(
                        document = %self.document.display(),
                        chars = text.len(),
                        "unified OCR text is empty or very short"
                    );
                }
                if !text.is_empty() {
                    self.cached = Some(text.clone());
                }
                text
            }
            Err(e) => {
                tracing::warn!(
                    document = %self.document.display(),
                    error = %e,
                    "text acquisition failed, degrading to empty text"
                );
                String::new()
            }
        }
    }

    fn acquire(&self, mode: AcquireMode) -> Result<String, FacturaError> {
        // Scoped workspace for page images; removed on every exit path
        // (including timeout) when the TempDir drops.
        let workspace = tempfile::Builder::new()
            .prefix("factura_ocr_")
            .tempdir()?;

        let dpi = match mode {
            AcquireMode::Quick => self.config.quick_dpi,
            AcquireMode::Full => self.config.full_dpi,
        };

        let pages = self.rasterizer.rasterize(
            &self.document,
            mode,
            dpi,
            workspace.path(),
            self.config.page_timeout,
        )?;
        if pages.is_empty() {
            return Err(FacturaError::Rasterize(format!(
                "{} produced no page images",
                self.rasterizer.backend_name()
            )));
        }
        tracing::debug!(
            pages = pages.len(),
            dpi,
            backend = self.rasterizer.backend_name(),
            "rasterized document"
        );

        // Pages are independent; OCR them in parallel. The indexed map
        // plus ordered collect restores deterministic page order.
        let results: Vec<Result<String, FacturaError>> = pages
            .par_iter()
            .enumerate()
            .map(|(i, page)| self.ocr_page(i + 1, page, workspace.path()))
            .collect();

        let mut texts = Vec::with_capacity(results.len());
        for result in results {
            texts.push(result?);
        }

        Ok(texts.join(PAGE_BREAK))
    }

    fn ocr_page(
        &self,
        page_number: usize,
        image: &Path,
        workspace: &Path,
    ) -> Result<String, FacturaError> {
        let prepared = preprocess::prepare_page(image, workspace, page_number)?;
        let raw = self
            .ocr
            .recognize(&prepared, &self.config.language, self.config.page_timeout)?;
        let cleaned = clean_page_text(&raw);
        if cleaned.len() < SHORT_PAGE_CHARS {
            tracing::warn!(
                page = page_number,
                chars = cleaned.len(),
                "very short OCR output for page, possible recognition error"
            );
        }
        Ok(cleaned)
    }
}

static NON_WHITELIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.\-:/]").expect("invalid pattern"));
static WS_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid pattern"));

/// Strip non-whitelisted characters (word chars, whitespace, `.` `-` `:`
/// `/` are kept) and collapse whitespace runs.
pub fn clean_page_text(raw: &str) -> String {
    let stripped = NON_WHITELIST.replace_all(raw, " ");
    WS_RUNS.replace_all(&stripped, " ").trim().to_string()
}

/// Run an external command, enforcing an optional wall-clock deadline.
/// On timeout the child is killed and reaped before returning.
pub(crate) fn run_with_deadline(
    mut cmd: Command,
    tool: &'static str,
    timeout: Option<Duration>,
) -> Result<Output, std::io::Error> {
    let Some(limit) = timeout else {
        return cmd.output();
    };

    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = cmd.spawn()?;
    let started = Instant::now();
    loop {
        match child.try_wait()? {
            Some(_) => return child.wait_with_output(),
            None => {
                if started.elapsed() >= limit {
                    // Kill and reap; the caller maps this to ToolTimeout.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("{tool} timed out"),
                    ));
                }
                std::thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

/// Map an io error from running `tool` to the crate error, distinguishing
/// missing binaries and deadline kills.
pub(crate) fn map_tool_error(
    e: std::io::Error,
    tool: &'static str,
    not_found: FacturaError,
    timeout: Option<Duration>,
) -> FacturaError {
    match e.kind() {
        std::io::ErrorKind::NotFound => not_found,
        std::io::ErrorKind::TimedOut => FacturaError::ToolTimeout {
            tool,
            seconds: timeout.map(|t| t.as_secs()).unwrap_or(0),
        },
        _ => FacturaError::Rasterize(format!("{tool} failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeRasterizer {
        pages: usize,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Rasterizer for FakeRasterizer {
        fn rasterize(
            &self,
            _document: &Path,
            mode: AcquireMode,
            _dpi: u32,
            workspace: &Path,
            _timeout: Option<Duration>,
        ) -> Result<Vec<PathBuf>, FacturaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FacturaError::RasterizerNotFound);
            }
            let count = match mode {
                AcquireMode::Quick => 1,
                AcquireMode::Full => self.pages,
            };
            let mut out = Vec::new();
            for n in 1..=count {
                let path = workspace.join(format!("page-{n}.png"));
                // A real 1x1 white PNG so preprocessing can open it.
                let img = image::GrayImage::from_pixel(1, 1, image::Luma([255u8]));
                img.save(&path).unwrap();
                out.push(path);
            }
            Ok(out)
        }

        fn backend_name(&self) -> &str {
            "fake"
        }
    }

    struct FakeOcr {
        calls: Arc<AtomicUsize>,
    }

    impl OcrEngine for FakeOcr {
        fn recognize(
            &self,
            image: &Path,
            _language: &str,
            _timeout: Option<Duration>,
        ) -> Result<String, FacturaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Page number is baked into the prepared image name.
            Ok(format!("texto de {}", image.file_name().unwrap().to_string_lossy()))
        }

        fn backend_name(&self) -> &str {
            "fake-ocr"
        }
    }

    fn acquisition(pages: usize, fail: bool) -> (TextAcquisition, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let raster_calls = Arc::new(AtomicUsize::new(0));
        let ocr_calls = Arc::new(AtomicUsize::new(0));
        let acq = TextAcquisition::new(
            "/tmp/doc.pdf",
            Box::new(FakeRasterizer {
                pages,
                calls: raster_calls.clone(),
                fail,
            }),
            Box::new(FakeOcr {
                calls: ocr_calls.clone(),
            }),
            AcquireConfig::default(),
        );
        (acq, raster_calls, ocr_calls)
    }

    #[test]
    fn test_quick_mode_single_page_no_markers() {
        let (mut acq, _, ocr_calls) = acquisition(3, false);
        let text = acq.unified_text(AcquireMode::Quick, false);
        assert!(!text.contains("---PAGE_BREAK---"));
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_full_mode_markers_in_page_order() {
        let (mut acq, _, _) = acquisition(3, false);
        let text = acq.unified_text(AcquireMode::Full, false);
        assert_eq!(text.matches("---PAGE_BREAK---").count(), 2);
        let first = text.find("page-1").unwrap();
        let second = text.find("page-2").unwrap();
        let third = text.find("page-3").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_failure_degrades_to_empty() {
        let (mut acq, _, _) = acquisition(1, true);
        assert_eq!(acq.unified_text(AcquireMode::Full, false), "");
        assert!(!acq.has_text());
    }

    #[test]
    fn test_caching_skips_collaborators() {
        let (mut acq, raster_calls, _) = acquisition(2, false);
        let first = acq.unified_text(AcquireMode::Full, false);
        let second = acq.unified_text(AcquireMode::Full, false);
        assert_eq!(first, second);
        assert_eq!(raster_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_force_reacquires() {
        let (mut acq, raster_calls, _) = acquisition(2, false);
        acq.unified_text(AcquireMode::Quick, false);
        acq.unified_text(AcquireMode::Full, true);
        assert_eq!(raster_calls.load(Ordering::SeqCst), 2);
    }

    struct HungRasterizer {
        seen: Arc<std::sync::Mutex<Option<PathBuf>>>,
    }

    impl Rasterizer for HungRasterizer {
        fn rasterize(
            &self,
            _document: &Path,
            _mode: AcquireMode,
            _dpi: u32,
            workspace: &Path,
            timeout: Option<Duration>,
        ) -> Result<Vec<PathBuf>, FacturaError> {
            *self.seen.lock().unwrap() = Some(workspace.to_path_buf());
            Err(FacturaError::ToolTimeout {
                tool: "fake",
                seconds: timeout.map(|t| t.as_secs()).unwrap_or(0),
            })
        }

        fn backend_name(&self) -> &str {
            "hung-fake"
        }
    }

    #[test]
    fn test_deadline_kills_hung_child() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let err = run_with_deadline(cmd, "sleep", Some(Duration::from_millis(80))).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_deadline_allows_fast_child() {
        let cmd = Command::new("true");
        let out = run_with_deadline(cmd, "true", Some(Duration::from_secs(5))).unwrap();
        assert!(out.status.success());
    }

    #[test]
    fn test_tool_error_mapping() {
        let timed = std::io::Error::new(std::io::ErrorKind::TimedOut, "x");
        let mapped = map_tool_error(
            timed,
            "pdftoppm",
            FacturaError::RasterizerNotFound,
            Some(Duration::from_secs(3)),
        );
        assert!(matches!(
            mapped,
            FacturaError::ToolTimeout {
                tool: "pdftoppm",
                seconds: 3
            }
        ));

        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "x");
        assert!(matches!(
            map_tool_error(missing, "pdftoppm", FacturaError::RasterizerNotFound, None),
            FacturaError::RasterizerNotFound
        ));
    }

    #[test]
    fn test_timeout_degrades_to_empty_and_releases_workspace() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let mut acq = TextAcquisition::new(
            "/tmp/doc.pdf",
            Box::new(HungRasterizer { seen: seen.clone() }),
            Box::new(FakeOcr {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            AcquireConfig {
                page_timeout: Some(Duration::from_millis(50)),
                ..AcquireConfig::default()
            },
        );

        assert_eq!(acq.unified_text(AcquireMode::Full, false), "");
        assert!(!acq.has_text());

        // The scoped workspace must be gone once acquisition returns.
        let workspace = seen.lock().unwrap().clone().unwrap();
        assert!(!workspace.exists());
    }

    #[test]
    fn test_clean_page_text_whitelist() {
        let raw = "Total:  $1.234,56 \n NIT 900-123 ¡ñ!";
        let cleaned = clean_page_text(raw);
        assert_eq!(cleaned, "Total: 1.234 56 NIT 900-123 ñ");
    }

    #[test]
    fn test_clean_page_text_collapses_whitespace() {
        assert_eq!(clean_page_text("  a \t b \n\n c  "), "a b c");
    }
}
