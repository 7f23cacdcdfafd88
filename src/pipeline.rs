//! Run orchestration: input validation, type detection, OCR routing with
//! fallback, and report assembly.

use crate::detector::{self, DetectionConfig, PdfType};
use crate::ocr::{OcrConfig, OcrEngine, TesseractOcr};
use crate::report::{self, ProcessingMode, ProcessingReport};
use crate::splitter::{self, file_stem, SplitOutcome};
use crate::SplitError;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Options for one splitter instance.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub pages_per_chapter: u32,
    /// Probe and resolve the OCR toolchain at construction
    pub use_ocr: bool,
    pub ocr: OcrConfig,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            pages_per_chapter: 20,
            use_ocr: false,
            ocr: OcrConfig::default(),
        }
    }
}

/// Splits PDFs into fixed-size chapters, routing scanned documents through
/// OCR when an engine is available.
pub struct ChapterSplitter {
    pages_per_chapter: u32,
    detection: DetectionConfig,
    /// Resolved once at construction; `None` means every run is basic-mode.
    ocr: Option<Box<dyn OcrEngine>>,
}

impl ChapterSplitter {
    /// Create a splitter, probing the OCR toolchain once when `use_ocr` is
    /// set. An unavailable toolchain disables OCR for the lifetime of the
    /// splitter instead of failing.
    pub fn new(options: SplitOptions) -> Self {
        let ocr: Option<Box<dyn OcrEngine>> = if options.use_ocr {
            let engine = TesseractOcr::new(options.ocr.clone());
            if engine.is_available() {
                info!(
                    "OCR processor initialized (lang: {}, preprocessing: {}, {} dpi)",
                    options.ocr.lang,
                    if options.ocr.preprocess {
                        "enabled"
                    } else {
                        "disabled"
                    },
                    options.ocr.dpi
                );
                Some(Box::new(engine))
            } else {
                warn!("OCR toolchain unavailable (pdftoppm/tesseract), using basic mode");
                None
            }
        } else {
            info!("initialized splitter (basic mode)");
            None
        };
        info!("pages per chapter: {}", options.pages_per_chapter);

        Self {
            pages_per_chapter: options.pages_per_chapter,
            detection: DetectionConfig::default(),
            ocr,
        }
    }

    /// Create a splitter with a caller-supplied OCR engine, bypassing the
    /// availability probe.
    pub fn with_engine(options: SplitOptions, engine: Option<Box<dyn OcrEngine>>) -> Self {
        Self {
            pages_per_chapter: options.pages_per_chapter,
            detection: DetectionConfig::default(),
            ocr: engine,
        }
    }

    pub fn ocr_available(&self) -> bool {
        self.ocr.is_some()
    }

    /// Classify the input document. Detailed mode consults the OCR engine's
    /// analyzer when one is resolved.
    pub fn detect(&self, input: &Path, detailed: bool) -> PdfType {
        let analyzer = if detailed {
            self.ocr.as_ref().and_then(|engine| engine.analyzer())
        } else {
            None
        };
        detector::detect_pdf_type_with_config(input, &self.detection, analyzer)
    }

    /// Process one document end to end and return its report.
    ///
    /// Validation failures return a failure report without touching the
    /// filesystem; anything later creates the output directory and writes
    /// the JSON report file alongside the chapters.
    pub fn process(&self, input: &Path, output_dir: &Path, force_ocr: bool) -> ProcessingReport {
        let start_time = Utc::now();

        if let Err(e) = validate_input(input) {
            warn!("{}", e);
            let report = assemble_report(
                input,
                output_dir,
                start_time,
                Utc::now(),
                None,
                None,
                self.pages_per_chapter,
                Err(e),
            );
            report::print_summary(&report);
            return report;
        }

        let (mode, pdf_type, result) = self.split_validated(input, output_dir, force_ocr);
        let report = assemble_report(
            input,
            output_dir,
            start_time,
            Utc::now(),
            Some(mode),
            Some(pdf_type),
            self.pages_per_chapter,
            result,
        );

        match report::write_report(&report, output_dir, &file_stem(input)) {
            Ok(path) => info!("processing report: {}", path.display()),
            Err(e) => warn!("failed to write processing report: {}", e),
        }

        report::print_summary(&report);
        report
    }

    /// Detection plus the OCR/basic decision for an already validated input.
    fn split_validated(
        &self,
        input: &Path,
        output_dir: &Path,
        force_ocr: bool,
    ) -> (ProcessingMode, PdfType, Result<SplitOutcome, SplitError>) {
        if let Err(e) = fs::create_dir_all(output_dir) {
            return (ProcessingMode::Basic, PdfType::Unknown, Err(e.into()));
        }

        info!("processing {}", input.display());
        info!("output directory: {}", output_dir.display());
        info!(
            "OCR mode: {}",
            if self.ocr.is_some() {
                "enabled"
            } else {
                "disabled"
            }
        );

        info!("detecting PDF type...");
        let pdf_type = self.detect(input, false);
        info!("detected type: {}", pdf_type);

        let want_ocr = if force_ocr {
            info!("forcing OCR mode");
            true
        } else if pdf_type == PdfType::Scanned {
            info!("scanned document detected, using OCR mode");
            true
        } else if pdf_type == PdfType::Unknown && self.ocr.is_some() {
            info!("PDF type unknown, attempting OCR mode");
            true
        } else {
            info!("using text mode");
            false
        };

        if want_ocr {
            if let Some(engine) = &self.ocr {
                info!("starting OCR processing...");
                let mut progress = |percent: u8, message: &str| {
                    info!("progress: {}% - {}", percent, message);
                };
                match engine.process_scanned_pdf(
                    input,
                    output_dir,
                    self.pages_per_chapter,
                    &mut progress,
                ) {
                    Ok(outcome) => return (ProcessingMode::Ocr, pdf_type, Ok(outcome)),
                    Err(e) => {
                        warn!("OCR processing failed, falling back to basic mode: {}", e);
                        let outcome = splitter::split_into_chapters(
                            input,
                            output_dir,
                            self.pages_per_chapter,
                        );
                        return (ProcessingMode::BasicFallback, pdf_type, outcome);
                    }
                }
            }
            warn!("OCR mode wanted but no engine is available, using basic mode");
        }

        info!("using basic split mode...");
        let outcome = splitter::split_into_chapters(input, output_dir, self.pages_per_chapter);
        (ProcessingMode::Basic, pdf_type, outcome)
    }
}

/// Input checks that run before any side effect: the file must exist and
/// carry a `.pdf` extension (case-insensitive).
fn validate_input(input: &Path) -> Result<(), SplitError> {
    if !input.exists() {
        return Err(SplitError::NotFound(input.to_path_buf()));
    }
    let is_pdf = input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(SplitError::InvalidExtension(input.to_path_buf()));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn assemble_report(
    input: &Path,
    output_dir: &Path,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    mode: Option<ProcessingMode>,
    pdf_type: Option<PdfType>,
    pages_per_chapter: u32,
    result: Result<SplitOutcome, SplitError>,
) -> ProcessingReport {
    let processing_time = (end_time - start_time).num_milliseconds() as f64 / 1000.0;
    let base = ProcessingReport {
        success: false,
        error: None,
        processing_mode: mode,
        pdf_type,
        total_pages: 0,
        chapters_created: 0,
        pages_per_chapter,
        chapters: Vec::new(),
        text_files: Vec::new(),
        total_text_chars: None,
        input_file: input.display().to_string(),
        output_dir: output_dir.display().to_string(),
        start_time,
        end_time,
        processing_time,
    };

    match result {
        Ok(outcome) => ProcessingReport {
            success: true,
            total_pages: outcome.total_pages,
            chapters_created: outcome.chapters.len() as u32,
            chapters: outcome
                .chapters
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            text_files: outcome
                .text_files
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            total_text_chars: outcome.total_text_chars,
            ..base
        },
        Err(e) => ProcessingReport {
            error: Some(e.to_string()),
            ..base
        },
    }
}
