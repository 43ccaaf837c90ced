//! Integration tests for the end-to-end document pipeline.
//!
//! Uses mock rasterizer/OCR collaborators that return canned page text
//! without invoking pdftoppm or tesseract, so these tests run without
//! poppler-utils or tesseract-ocr installed.

use factura_core::acquire::{AcquireConfig, AcquireMode, OcrEngine, Rasterizer, TextAcquisition};
use factura_core::error::FacturaError;
use factura_core::model::FormatLabel;
use factura_core::{process_document, Pipeline};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct MockRasterizer {
    page_count: usize,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl Rasterizer for MockRasterizer {
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
            AcquireMode::Full => self.page_count,
        };
        let mut pages = Vec::new();
        for n in 1..=count {
            let path = workspace.join(format!("page-{n}.png"));
            let img = image::GrayImage::from_pixel(1, 1, image::Luma([255u8]));
            img.save(&path).unwrap();
            pages.push(path);
        }
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct MockOcr {
    pages: Vec<String>,
}

impl OcrEngine for MockOcr {
    fn recognize(
        &self,
        image: &Path,
        _language: &str,
        _timeout: Option<Duration>,
    ) -> Result<String, FacturaError> {
        // Prepared images are named page-{n}-bin.png.
        let name = image.file_name().unwrap().to_string_lossy().to_string();
        let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
        let n: usize = digits.parse().unwrap();
        Ok(self.pages[n - 1].clone())
    }

    fn backend_name(&self) -> &str {
        "mock-ocr"
    }
}

fn acquisition(pages: &[&str], fail: bool) -> (TextAcquisition, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let acq = TextAcquisition::new(
        "/tmp/factura.pdf",
        Box::new(MockRasterizer {
            page_count: pages.len(),
            calls: calls.clone(),
            fail,
        }),
        Box::new(MockOcr {
            pages: pages.iter().map(|s| s.to_string()).collect(),
        }),
        AcquireConfig::default(),
    );
    (acq, calls)
}

const BBI_PAGE: &str = "Razón Social: BBI COLOMBIA S.A.S Nombre Comercial: BBI COLOMBIA \
    Nit del Emisor: 900.860.284-1 País: Colombia \
    Adquiriente Número Documento: 901234567 \
    Fecha de Emisión: 15/03/2024 Número de Factura: FE-12345 \
    Subtotal 1.000.000 Total impuesto 190.000 Total factura COP 1.190.000";

// ---------------------------------------------------------------------------
// Test 1: Single-page invoice detected and extracted end to end
// ---------------------------------------------------------------------------
#[test]
fn bbi_invoice_end_to_end() {
    let (mut acq, _) = acquisition(&[BBI_PAGE], false);

    let report = process_document(&mut acq, None).unwrap();

    assert_eq!(report.label, FormatLabel::Bbi);
    assert!(report.success, "missing: {:?}", report.missing);
    assert_eq!(report.field("issue_date"), "15/03/2024");
    assert_eq!(report.field("invoice_number"), "FE-12345");
    assert_eq!(report.field("total"), "1.190.000,00");
    assert_eq!(report.field("issuer_tax_id"), "900860284-1");
}

// ---------------------------------------------------------------------------
// Test 2: Thin quick sample triggers full-mode re-acquisition
// ---------------------------------------------------------------------------
#[test]
fn short_quick_sample_escalates_to_full_mode() {
    // Page 1 alone is under the 100-character classification threshold;
    // the evidence lives on the later pages.
    let pages = [
        "pagina inicial casi vacia",
        "FACTURA POR CUOTAS NIT: 800.123.456-1 FACTURA No.: CU-77 \
         FECHA DE EMISIÓN: 01/06/2024 CLIENTE: PEDRO PEREZ",
        "SUBTOTAL: 120.000 IVA: 22.800 TOTAL A PAGAR: 142.800",
    ];
    let (mut acq, raster_calls) = acquisition(&pages, false);

    let report = process_document(&mut acq, None).unwrap();

    // One quick render plus one forced full render.
    assert_eq!(raster_calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.label, FormatLabel::Cuotas);
    assert!(report.success, "missing: {:?}", report.missing);
    // This family reads a lone dot as the decimal separator.
    assert_eq!(report.field("total"), "142,80");
    assert_eq!(report.field("legal_name"), "PEDRO PEREZ");
}

// ---------------------------------------------------------------------------
// Test 3: Fields beyond page 1 are reachable even when the quick sample
// classifies on its own
// ---------------------------------------------------------------------------
#[test]
fn extraction_covers_pages_beyond_the_quick_sample() {
    // Page 1 passes the classification threshold by itself; the totals
    // block only exists on page 2.
    let pages = [
        "FACTURA POR CUOTAS hoja uno de dos NIT: 800.123.456-1 \
         FACTURA No.: CU-31 FECHA DE EMISIÓN: 02/02/2024 CLIENTE: MARIA RINCON",
        "SUBTOTAL: 120.000 IVA: 22.800 TOTAL A PAGAR: 142.800",
    ];
    let (mut acq, raster_calls) = acquisition(&pages, false);

    let report = process_document(&mut acq, None).unwrap();

    // One quick render for classification, one full render for extraction.
    assert_eq!(raster_calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.label, FormatLabel::Cuotas);
    assert!(report.success, "missing: {:?}", report.missing);
    assert_eq!(report.field("total"), "142,80");
    assert_eq!(report.field("legal_name"), "MARIA RINCON");
}

// ---------------------------------------------------------------------------
// Test 4: Text matching no heuristic terminates as unknown
// ---------------------------------------------------------------------------
#[test]
fn unclassifiable_document_is_terminal() {
    let page = "recibo de caja menor correspondiente al mes de marzo \
        con cargo al presupuesto general de la sede principal";
    let (mut acq, _) = acquisition(&[page], false);

    let result = process_document(&mut acq, None);

    assert!(matches!(result, Err(FacturaError::UnknownFormat)));
}

// ---------------------------------------------------------------------------
// Test 5: Acquisition soft-fails to empty text; pipeline stops cleanly
// ---------------------------------------------------------------------------
#[test]
fn rasterizer_failure_degrades_then_terminates() {
    let (mut acq, raster_calls) = acquisition(&["irrelevante"], true);

    let result = process_document(&mut acq, None);

    assert!(matches!(result, Err(FacturaError::UnknownFormat)));
    // Quick attempt plus the full-mode retry, both degraded to "".
    assert_eq!(raster_calls.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// Test 6: Caller-supplied label bypasses classification
// ---------------------------------------------------------------------------
#[test]
fn manual_label_override_skips_classification() {
    // Generic text that no tier recognizes, long enough to avoid the
    // escalation path. The name label sits last: OCR cleaning flattens
    // pages to one line, and the name pattern captures to end of line.
    let page = "FACTURA No.: POS-2210 FECHA: 18/04/2024 TOTAL: 99.960 \
        NIT: 901.555.123-4 RAZÓN SOCIAL: COMERCIAL ANDINA SAS";
    let (mut acq, _) = acquisition(&[page], false);

    let report = Pipeline::new()
        .process(&mut acq, Some(FormatLabel::Taberna))
        .unwrap();

    assert_eq!(report.label, FormatLabel::Taberna);
    assert!(report.success, "missing: {:?}", report.missing);
    assert_eq!(report.field("legal_name"), "COMERCIAL ANDINA SAS");
}

// ---------------------------------------------------------------------------
// Test 7: Unknown override is rejected before any extractor runs
// ---------------------------------------------------------------------------
#[test]
fn unknown_override_is_rejected() {
    let (mut acq, _) = acquisition(&[BBI_PAGE], false);

    let result = Pipeline::new().process(&mut acq, Some(FormatLabel::Unknown));

    assert!(matches!(result, Err(FacturaError::UnknownFormat)));
}

// ---------------------------------------------------------------------------
// Test 8: Incomplete documents report their missing fields
// ---------------------------------------------------------------------------
#[test]
fn incomplete_invoice_reports_missing_fields() {
    // A BBI header without the totals block or dates.
    let page = "Razón Social: BBI COLOMBIA S.A.S Nombre Comercial: BBI COLOMBIA \
        Nit del Emisor: 900.860.284-1 País: Colombia sin mas datos legibles";
    let (mut acq, _) = acquisition(&[page], false);

    let report = process_document(&mut acq, None).unwrap();

    assert_eq!(report.label, FormatLabel::Bbi);
    assert!(!report.success);
    assert!(report.missing.contains(&"issue_date".to_string()));
    assert!(report.missing.contains(&"total".to_string()));
    // Promised fields stay in the map even when empty.
    assert_eq!(report.field("issue_date"), "");
}
