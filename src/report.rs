//! Per-run processing reports
//!
//! One report is created per invocation, serialized as pretty-printed JSON
//! next to the chapter files, and logged as a summary block. Reports are
//! never mutated after assembly.

use crate::detector::PdfType;
use crate::SplitError;
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How the run produced its chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    Basic,
    Ocr,
    BasicFallback,
}

impl ProcessingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::Basic => "basic",
            ProcessingMode::Ocr => "ocr",
            ProcessingMode::BasicFallback => "basic_fallback",
        }
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one processing run.
///
/// `processing_mode` and `pdf_type` are absent when the run failed input
/// validation before any work began.
#[derive(Debug, Serialize)]
pub struct ProcessingReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_mode: Option<ProcessingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_type: Option<PdfType>,
    pub total_pages: u32,
    pub chapters_created: u32,
    pub pages_per_chapter: u32,
    pub chapters: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_text_chars: Option<u64>,
    pub input_file: String,
    pub output_dir: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Wall-clock seconds between start and end
    pub processing_time: f64,
}

/// Write the report as `<stem>_processing_report.json` in `output_dir`,
/// overwriting any previous report with the same name. Pretty-printed UTF-8;
/// non-ASCII stays unescaped.
pub fn write_report(
    report: &ProcessingReport,
    output_dir: &Path,
    stem: &str,
) -> Result<PathBuf, SplitError> {
    let path = output_dir.join(format!("{}_processing_report.json", stem));
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| SplitError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Log the end-of-run summary block.
pub fn print_summary(report: &ProcessingReport) {
    let rule = "=".repeat(60);
    info!("{}", rule);
    info!("processing summary");
    info!("{}", rule);

    if report.success {
        info!("processing succeeded");
        if let Some(mode) = report.processing_mode {
            info!("  mode: {}", mode);
        }
        if let Some(pdf_type) = report.pdf_type {
            info!("  pdf type: {}", pdf_type);
        }
        info!("  total pages: {}", report.total_pages);
        info!("  chapters created: {}", report.chapters_created);
        info!("  processing time: {:.1}s", report.processing_time);
        info!("  output dir: {}", report.output_dir);
        if let Some(chars) = report.total_text_chars {
            info!("  total text chars: {}", chars);
        }
        for (index, chapter) in report.chapters.iter().take(5).enumerate() {
            info!("  {:2}. {}", index + 1, chapter);
        }
        if report.chapters.len() > 5 {
            info!("  ... and {} more", report.chapters.len() - 5);
        }
        if !report.text_files.is_empty() {
            info!("  text files: {}", report.text_files.len());
        }
    } else {
        error!(
            "processing failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    info!("{}", rule);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ProcessingReport {
        let now = Utc::now();
        ProcessingReport {
            success: true,
            error: None,
            processing_mode: Some(ProcessingMode::Basic),
            pdf_type: Some(PdfType::Text),
            total_pages: 45,
            chapters_created: 3,
            pages_per_chapter: 20,
            chapters: vec!["out/书_chapter_001.pdf".to_string()],
            text_files: Vec::new(),
            total_text_chars: None,
            input_file: "书.pdf".to_string(),
            output_dir: "out".to_string(),
            start_time: now,
            end_time: now,
            processing_time: 0.0,
        }
    }

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(ProcessingMode::Basic.as_str(), "basic");
        assert_eq!(ProcessingMode::Ocr.as_str(), "ocr");
        assert_eq!(ProcessingMode::BasicFallback.as_str(), "basic_fallback");
    }

    #[test]
    fn test_success_report_omits_error_and_keeps_non_ascii() {
        let json = serde_json::to_string_pretty(&sample_report()).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"processing_mode\": \"basic\""));
        assert!(json.contains("\"pdf_type\": \"text\""));
        assert!(json.contains("书"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_failure_report_carries_error() {
        let report = ProcessingReport {
            success: false,
            error: Some("document has no pages".to_string()),
            processing_mode: Some(ProcessingMode::Basic),
            pdf_type: Some(PdfType::Scanned),
            total_pages: 0,
            chapters_created: 0,
            ..sample_report()
        };
        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("\"success\": false"));
        assert!(json.contains("document has no pages"));
    }
}
