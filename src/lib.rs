//! Fixed-size PDF chapter splitting with smart scanned/text detection
//!
//! This crate provides:
//! - Fast detection of scanned vs text-based PDFs by sampling leading pages
//! - A page-range splitter that copies chapters into standalone PDFs
//! - An orchestrator that routes scanned documents through an external OCR
//!   toolchain and falls back to the plain splitter when OCR fails

pub mod detector;
pub mod ocr;
pub mod pipeline;
pub mod report;
pub mod splitter;

pub use detector::{
    detect_pdf_type, DetectionConfig, PdfType, PdfTypeResult, ScanAnalysis, ScanAnalyzer,
};
pub use ocr::{OcrConfig, OcrEngine, TesseractOcr};
pub use pipeline::{ChapterSplitter, SplitOptions};
pub use report::{ProcessingMode, ProcessingReport};
pub use splitter::{chapter_ranges, split_into_chapters, ChapterRange, SplitOutcome};

use std::path::PathBuf;

/// Errors raised while splitting or classifying a document.
///
/// Validation variants (`NotFound`, `InvalidExtension`) fire before any file
/// is opened. `OcrUnavailable` and `OcrFailed` are recoverable: the pipeline
/// falls back to the basic splitter on either.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a PDF file: {}", .0.display())]
    InvalidExtension(PathBuf),
    #[error("document has no pages")]
    EmptyDocument,
    #[error("PDF parsing error: {0}")]
    InvalidFormat(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR is not available: {0}")]
    OcrUnavailable(String),
    #[error("OCR processing failed: {0}")]
    OcrFailed(String),
}

impl From<lopdf::Error> for SplitError {
    fn from(e: lopdf::Error) -> Self {
        SplitError::InvalidFormat(e.to_string())
    }
}
