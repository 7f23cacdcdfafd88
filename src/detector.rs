//! Smart PDF type detection by sampling leading pages
//!
//! Classifies a document as text-based or scanned by extracting text from
//! the first few pages. Detection never hard-fails: anything that prevents a
//! confident answer maps to `PdfType::Unknown`.

use crate::SplitError;
use log::warn;
use lopdf::Document;
use serde::Serialize;
use std::path::Path;

/// PDF type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfType {
    /// Extractable text found in the sampled pages
    Text,
    /// No text layer; pages are most likely page-image scans
    Scanned,
    /// Detection failed or stayed inconclusive
    Unknown,
}

impl PdfType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfType::Text => "text",
            PdfType::Scanned => "scanned",
            PdfType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PdfType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of PDF type detection
#[derive(Debug)]
pub struct PdfTypeResult {
    /// Detected PDF type
    pub pdf_type: PdfType,
    /// Number of pages in the document
    pub page_count: u32,
    /// Number of pages sampled for detection
    pub pages_sampled: u32,
    /// Number of sampled pages with qualifying text
    pub pages_with_text: u32,
}

/// Configuration for PDF type detection
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Maximum number of leading pages to sample (default: 3)
    pub sample_pages: u32,
    /// A page qualifies as text when its extracted text has more than this
    /// many non-whitespace characters (default: 10)
    pub min_text_chars: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_pages: 3,
            min_text_chars: 10,
        }
    }
}

/// Probability estimate from an OCR-capable analyzer.
#[derive(Debug, Clone, Copy)]
pub struct ScanAnalysis {
    pub is_scanned_probability: f64,
}

/// Secondary classifier consulted in detailed mode when no sampled page
/// yields text.
pub trait ScanAnalyzer {
    fn analyze_scanned_document(
        &self,
        path: &Path,
        sample_pages: u32,
    ) -> Result<ScanAnalysis, SplitError>;
}

/// Detect PDF type from a file path with default configuration.
pub fn detect_pdf_type<P: AsRef<Path>>(path: P) -> PdfType {
    detect_pdf_type_with_config(path, &DetectionConfig::default(), None)
}

/// Detect PDF type, optionally consulting `analyzer` when no text is found
/// (detailed mode). Detection failures map to `PdfType::Unknown`.
pub fn detect_pdf_type_with_config<P: AsRef<Path>>(
    path: P,
    config: &DetectionConfig,
    analyzer: Option<&dyn ScanAnalyzer>,
) -> PdfType {
    match try_detect(path.as_ref(), config, analyzer) {
        Ok(result) => result.pdf_type,
        Err(e) => {
            warn!("PDF type detection failed: {}", e);
            PdfType::Unknown
        }
    }
}

/// Fallible detection returning sampling details alongside the class.
pub fn try_detect(
    path: &Path,
    config: &DetectionConfig,
    analyzer: Option<&dyn ScanAnalyzer>,
) -> Result<PdfTypeResult, SplitError> {
    let doc = Document::load(path)?;
    let page_count = doc.get_pages().len() as u32;
    let pages_sampled = config.sample_pages.min(page_count);

    for page in 1..=pages_sampled {
        // Per-page extraction errors are skipped, not propagated.
        let text = match doc.extract_text(&[page]) {
            Ok(text) => text,
            Err(_) => continue,
        };
        if non_whitespace_chars(&text) > config.min_text_chars {
            return Ok(PdfTypeResult {
                pdf_type: PdfType::Text,
                page_count,
                pages_sampled,
                pages_with_text: 1,
            });
        }
    }

    Ok(PdfTypeResult {
        pdf_type: classify_without_text(path, analyzer),
        page_count,
        pages_sampled,
        pages_with_text: 0,
    })
}

/// Verdict for a document whose sampled pages had no usable text layer:
/// `Scanned` by default, but an analyzer can demote it to `Unknown` when its
/// scan probability is low (or the analysis itself fails).
fn classify_without_text(path: &Path, analyzer: Option<&dyn ScanAnalyzer>) -> PdfType {
    let Some(analyzer) = analyzer else {
        return PdfType::Scanned;
    };

    match analyzer.analyze_scanned_document(path, 2) {
        Ok(analysis) if analysis.is_scanned_probability > 0.5 => PdfType::Scanned,
        Ok(_) => PdfType::Unknown,
        Err(e) => {
            warn!("scanned-document analysis failed: {}", e);
            PdfType::Unknown
        }
    }
}

pub(crate) fn non_whitespace_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
