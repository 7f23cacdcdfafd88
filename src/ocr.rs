//! External OCR toolchain integration
//!
//! OCR is an opaque collaborator: the pipeline only depends on the
//! [`OcrEngine`] trait. The bundled [`TesseractOcr`] engine shells out to
//! `pdftoppm` and `tesseract`, so availability means both executables answer
//! a version probe on PATH.

use crate::detector::{non_whitespace_chars, ScanAnalysis, ScanAnalyzer};
use crate::splitter::{chapter_ranges, file_stem, write_chapter, SplitOutcome, Stage};
use crate::SplitError;
use log::{debug, info};
use lopdf::Document;
use std::fs;
use std::path::Path;
use std::process::Command;

/// OCR tuning options, resolved once at startup and passed down.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language spec, e.g. "eng" or "eng+chi_sim"
    pub lang: String,
    /// Convert page images to grayscale before recognition
    pub preprocess: bool,
    /// Rasterization resolution for page images
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: "eng+chi_sim".to_string(),
            preprocess: true,
            dpi: 200,
        }
    }
}

/// An OCR processor able to split a scanned PDF into chapters with text.
pub trait OcrEngine {
    /// Whether the OCR dependency chain is usable.
    fn is_available(&self) -> bool;

    /// Recognize every page of `input`, writing chapter PDFs plus
    /// per-chapter text files into `output_dir`. `progress` receives
    /// percent-complete updates with a short message.
    fn process_scanned_pdf(
        &self,
        input: &Path,
        output_dir: &Path,
        pages_per_chapter: u32,
        progress: &mut dyn FnMut(u8, &str),
    ) -> Result<SplitOutcome, SplitError>;

    /// Optional scanned-probability analyzer for detailed type detection.
    fn analyzer(&self) -> Option<&dyn ScanAnalyzer> {
        None
    }
}

/// OCR engine backed by the poppler and tesseract command line tools.
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Rasterize one page with pdftoppm and recognize it with tesseract.
    fn ocr_page(
        &self,
        pdf_path: &Path,
        page_number: u32,
        scratch: &Path,
    ) -> Result<String, SplitError> {
        let output_root = scratch.join(format!("page_{}", page_number));
        let png_path = scratch.join(format!("page_{}.png", page_number));

        let mut pdftoppm = Command::new("pdftoppm");
        pdftoppm
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-r")
            .arg(self.config.dpi.to_string())
            .arg("-singlefile")
            .arg("-png");
        if self.config.preprocess {
            pdftoppm.arg("-gray");
        }
        let output = pdftoppm
            .arg(pdf_path)
            .arg(&output_root)
            .output()
            .map_err(|e| SplitError::OcrFailed(format!("failed to execute pdftoppm: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SplitError::OcrFailed(format!(
                "pdftoppm returned non-zero exit status for page {}: {}",
                page_number,
                stderr.trim()
            )));
        }
        if !png_path.exists() {
            return Err(SplitError::OcrFailed(format!(
                "pdftoppm did not produce an image for page {}",
                page_number
            )));
        }

        let output = Command::new("tesseract")
            .arg(&png_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.lang)
            .output()
            .map_err(|e| SplitError::OcrFailed(format!("failed to execute tesseract: {}", e)))?;

        let _ = fs::remove_file(&png_path);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SplitError::OcrFailed(format!(
                "tesseract returned non-zero exit status for page {}: {}",
                page_number,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .replace('\u{0000}', "")
            .trim()
            .to_string())
    }
}

impl OcrEngine for TesseractOcr {
    fn is_available(&self) -> bool {
        command_available("pdftoppm") && command_available("tesseract")
    }

    fn process_scanned_pdf(
        &self,
        input: &Path,
        output_dir: &Path,
        pages_per_chapter: u32,
        progress: &mut dyn FnMut(u8, &str),
    ) -> Result<SplitOutcome, SplitError> {
        let buffer = fs::read(input)?;
        let total_pages = Document::load_mem(&buffer)?.get_pages().len() as u32;
        if total_pages == 0 {
            return Err(SplitError::EmptyDocument);
        }

        let stem = file_stem(input);
        let mut stage = Stage::new(output_dir)?;
        let scratch = tempfile::tempdir()?;

        // Recognize every page before writing anything; a page that fails
        // recognition aborts the run with the stage still uncommitted.
        let mut page_texts = Vec::with_capacity(total_pages as usize);
        for page in 1..=total_pages {
            let text = self.ocr_page(input, page, scratch.path())?;
            debug!("OCR page {}/{}: {} chars", page, total_pages, text.len());
            page_texts.push(text);
            let percent = (page * 90 / total_pages) as u8;
            progress(percent, &format!("recognized page {}/{}", page, total_pages));
        }

        let ranges = chapter_ranges(total_pages, pages_per_chapter);
        let mut chapter_names = Vec::with_capacity(ranges.len());
        let mut text_names = Vec::with_capacity(ranges.len());

        for (index, range) in ranges.iter().enumerate() {
            let pdf_name = format!("{}_chapter_{:03}.pdf", stem, index + 1);
            write_chapter(&buffer, total_pages, *range, &stage.add(&pdf_name))?;

            let txt_name = format!("{}_chapter_{:03}.txt", stem, index + 1);
            let chapter_text =
                page_texts[range.start as usize..range.end as usize].join("\n\n");
            fs::write(stage.add(&txt_name), &chapter_text)?;

            info!(
                "created chapter {}: {} (pages {}-{})",
                index + 1,
                pdf_name,
                range.start + 1,
                range.end
            );
            chapter_names.push(pdf_name);
            text_names.push(txt_name);
        }

        stage.commit()?;
        progress(100, "chapters written");

        let total_text_chars = page_texts
            .iter()
            .map(|text| text.chars().count() as u64)
            .sum();

        Ok(SplitOutcome {
            total_pages,
            chapters: chapter_names
                .iter()
                .map(|name| output_dir.join(name))
                .collect(),
            text_files: text_names
                .iter()
                .map(|name| output_dir.join(name))
                .collect(),
            total_text_chars: Some(total_text_chars),
        })
    }

    fn analyzer(&self) -> Option<&dyn ScanAnalyzer> {
        Some(self)
    }
}

impl ScanAnalyzer for TesseractOcr {
    /// Estimate whether a document is a scan by recognizing a few pages: the
    /// reported probability is the fraction of sampled pages where OCR found
    /// any text.
    fn analyze_scanned_document(
        &self,
        path: &Path,
        sample_pages: u32,
    ) -> Result<ScanAnalysis, SplitError> {
        if !self.is_available() {
            return Err(SplitError::OcrUnavailable(
                "pdftoppm/tesseract not found on PATH".to_string(),
            ));
        }

        let total_pages = Document::load(path)?.get_pages().len() as u32;
        let sampled = sample_pages.min(total_pages);
        if sampled == 0 {
            return Ok(ScanAnalysis {
                is_scanned_probability: 0.0,
            });
        }

        let scratch = tempfile::tempdir()?;
        let mut pages_with_text = 0u32;
        for page in 1..=sampled {
            let text = self.ocr_page(path, page, scratch.path())?;
            if non_whitespace_chars(&text) > 0 {
                pages_with_text += 1;
            }
        }

        Ok(ScanAnalysis {
            is_scanned_probability: f64::from(pages_with_text) / f64::from(sampled),
        })
    }
}

/// Probe for an executable by asking it for its version.
pub(crate) fn command_available(program: &str) -> bool {
    Command::new(program).arg("--version").output().is_ok()
}
