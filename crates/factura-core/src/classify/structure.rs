//! Structural fallback: layout metrics scored against per-format
//! profiles. Only a subset of formats has a profile; everything else is
//! out of reach for this stage by design of the profiles themselves.

use crate::model::FormatLabel;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Minimum normalized score for a profile to win.
const SCORE_THRESHOLD: f64 = 0.5;

const WEIGHT_LINE_COUNT: f64 = 1.2;
const WEIGHT_KEYWORDS: f64 = 2.5;
const WEIGHT_DEFAULT: f64 = 1.0;

static COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{5,}").expect("invalid pattern"));

static BBI_MARKERS: Lazy<Regex> = Lazy::new(|| ci(r"\bBBI\b|BBICOLOMBIASAS"));
static HELLEN_MARKERS: Lazy<Regex> = Lazy::new(|| ci(r"\bCINE\s+COLOMBIA\b|CINE\s+S\.A\.S\."));
static CUOTAS_MARKERS: Lazy<Regex> = Lazy::new(|| ci(r"\bCUOTAS\b|PLAN\s+DE\s+PAGO"));

fn ci(pat: &str) -> Regex {
    RegexBuilder::new(pat)
        .case_insensitive(true)
        .build()
        .expect("invalid pattern")
}

/// Layout measurements taken over the non-empty lines of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureMetrics {
    pub line_count: usize,
    pub avg_width: f64,
    pub width_variance: f64,
    /// Lines per near-empty line, a proxy for vertical text density.
    pub density: f64,
    pub column_count: usize,
    pub bbi_keywords: usize,
    pub hellen_keywords: usize,
    pub cuotas_keywords: usize,
}

/// Measure a sample; `None` when it has no usable lines.
pub fn measure(text: &str) -> Option<StructureMetrics> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    let line_count = lines.len();
    let widths: Vec<f64> = lines.iter().map(|l| l.chars().count() as f64).collect();
    let avg_width = widths.iter().sum::<f64>() / line_count as f64;
    let width_variance =
        widths.iter().map(|w| (w - avg_width).powi(2)).sum::<f64>() / line_count as f64;

    let near_empty = lines.iter().filter(|l| l.chars().count() < 3).count();
    let density = line_count as f64 / (near_empty + 1) as f64;

    let column_markers = lines.iter().filter(|l| COLUMN_GAP.is_match(l)).count();
    let column_count = if column_markers as f64 > line_count as f64 * 0.1 {
        2
    } else {
        1
    };

    Some(StructureMetrics {
        line_count,
        avg_width,
        width_variance,
        density,
        column_count,
        bbi_keywords: lines.iter().filter(|l| BBI_MARKERS.is_match(l)).count(),
        hellen_keywords: lines.iter().filter(|l| HELLEN_MARKERS.is_match(l)).count(),
        cuotas_keywords: lines.iter().filter(|l| CUOTAS_MARKERS.is_match(l)).count(),
    })
}

/// Inclusive expected range for one metric.
#[derive(Debug, Clone, Copy)]
struct Range(f64, f64);

impl Range {
    /// Proximity to the range center in [0, 1]; 0 outside the range.
    fn proximity(&self, value: f64) -> f64 {
        let Range(min, max) = *self;
        if value < min || value > max {
            return 0.0;
        }
        let size = max - min;
        if size <= 0.0 {
            return 1.0;
        }
        let center = (min + max) / 2.0;
        1.0 - (value - center).abs() / size
    }
}

/// Hand-tuned layout profile for one format.
struct Profile {
    label: FormatLabel,
    line_count: Range,
    avg_width: Range,
    column_count: Range,
    density: Range,
    bbi_keywords: Range,
    hellen_keywords: Range,
    cuotas_keywords: Range,
}

impl Profile {
    fn score(&self, m: &StructureMetrics) -> f64 {
        let checks = [
            (WEIGHT_LINE_COUNT, self.line_count.proximity(m.line_count as f64)),
            (WEIGHT_DEFAULT, self.avg_width.proximity(m.avg_width)),
            (WEIGHT_DEFAULT, self.column_count.proximity(m.column_count as f64)),
            (WEIGHT_DEFAULT, self.density.proximity(m.density)),
            (WEIGHT_KEYWORDS, self.bbi_keywords.proximity(m.bbi_keywords as f64)),
            (WEIGHT_KEYWORDS, self.hellen_keywords.proximity(m.hellen_keywords as f64)),
            (WEIGHT_KEYWORDS, self.cuotas_keywords.proximity(m.cuotas_keywords as f64)),
        ];
        let total: f64 = checks.iter().map(|(w, _)| w).sum();
        let score: f64 = checks.iter().map(|(w, p)| w * p).sum();
        score / total
    }
}

static PROFILES: Lazy<Vec<Profile>> = Lazy::new(|| {
    vec![
        Profile {
            label: FormatLabel::Bbi,
            line_count: Range(100.0, 200.0),
            avg_width: Range(10.0, 20.0),
            column_count: Range(1.0, 2.0),
            density: Range(7.0, 10.0),
            bbi_keywords: Range(1.0, 10.0),
            hellen_keywords: Range(0.0, 0.0),
            cuotas_keywords: Range(0.0, 0.0),
        },
        Profile {
            label: FormatLabel::Hellen,
            line_count: Range(30.0, 60.0),
            avg_width: Range(20.0, 30.0),
            column_count: Range(1.0, 1.0),
            density: Range(3.0, 5.0),
            bbi_keywords: Range(0.0, 0.0),
            hellen_keywords: Range(1.0, 5.0),
            cuotas_keywords: Range(0.0, 0.0),
        },
        Profile {
            label: FormatLabel::Cuotas,
            line_count: Range(20.0, 50.0),
            avg_width: Range(20.0, 40.0),
            column_count: Range(1.0, 1.0),
            density: Range(2.0, 6.0),
            bbi_keywords: Range(0.0, 0.0),
            hellen_keywords: Range(0.0, 0.0),
            cuotas_keywords: Range(1.0, 5.0),
        },
    ]
});

/// Score every profile and return the best label when it clears the
/// confidence threshold.
pub fn structural_scan(text: &str) -> Option<FormatLabel> {
    let metrics = measure(text)?;
    let mut best: Option<(FormatLabel, f64)> = None;
    for profile in PROFILES.iter() {
        let score = profile.score(&metrics);
        tracing::trace!(label = %profile.label, score, "structural profile");
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((profile.label, score));
        }
    }
    match best {
        Some((label, score)) if score >= SCORE_THRESHOLD => Some(label),
        _ => None,
    }
}
