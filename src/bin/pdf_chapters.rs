//! CLI for splitting PDFs into fixed-size chapters

use clap::Parser;
use log::{error, info, warn};
use pdf_chapters::{ChapterSplitter, OcrConfig, PdfType, SplitOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Split PDF documents into fixed-size chapters, with OCR support for
/// scanned books.
#[derive(Parser, Debug)]
#[command(name = "pdf-chapters", version, about)]
struct Cli {
    /// Input PDF file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Output directory for chapter files
    #[arg(short, long, default_value = "./pdf_chapters", value_name = "DIR")]
    output: PathBuf,

    /// Pages per chapter
    #[arg(
        short,
        long,
        default_value_t = 20,
        value_parser = clap::value_parser!(u32).range(1..),
        value_name = "NUM"
    )]
    pages: u32,

    /// Enable OCR for scanned documents
    #[arg(long, default_value_t = false)]
    ocr: bool,

    /// Force OCR mode regardless of detected type
    #[arg(long, default_value_t = false)]
    force_ocr: bool,

    /// OCR language spec passed to tesseract
    #[arg(long, default_value = "eng+chi_sim", value_name = "LANG")]
    ocr_lang: String,

    /// Disable image preprocessing before recognition
    #[arg(long, default_value_t = false)]
    no_preprocess: bool,

    /// Rasterization resolution for OCR page images
    #[arg(long, default_value_t = 200, value_name = "DPI")]
    dpi: u32,

    /// Only detect and print the PDF type
    #[arg(long, default_value_t = false)]
    detect_type: bool,

    /// Only probe OCR availability
    #[arg(long, default_value_t = false)]
    test_ocr: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut cli = Cli::parse();

    info!("input file: {}", cli.input.display());
    info!("output directory: {}", cli.output.display());

    if cli.test_ocr && !cli.ocr {
        warn!("--test-ocr needs OCR enabled, assuming --ocr");
        cli.ocr = true;
    }

    let splitter = ChapterSplitter::new(SplitOptions {
        pages_per_chapter: cli.pages,
        use_ocr: cli.ocr,
        ocr: OcrConfig {
            lang: cli.ocr_lang.clone(),
            preprocess: !cli.no_preprocess,
            dpi: cli.dpi,
        },
    });

    if cli.test_ocr {
        info!("testing OCR availability...");
        if splitter.ocr_available() {
            info!("OCR toolchain is available");
            let pdf_type = splitter.detect(&cli.input, false);
            info!("PDF type: {}", pdf_type);
            match pdf_type {
                PdfType::Scanned => info!("suggestion: process this file with OCR mode"),
                _ => info!("suggestion: OCR mode is optional, basic mode should work"),
            }
        } else {
            error!("OCR toolchain is not available");
            info!("install poppler-utils (pdftoppm) and tesseract-ocr");
        }
        return ExitCode::SUCCESS;
    }

    if cli.detect_type {
        info!("detecting PDF type...");
        let pdf_type = splitter.detect(&cli.input, true);
        info!("detection result: {}", pdf_type);
        match pdf_type {
            PdfType::Text => info!("suggestion: use basic mode (no --ocr needed)"),
            PdfType::Scanned => info!("suggestion: use OCR mode (add --ocr)"),
            PdfType::Unknown => info!("suggestion: try OCR mode or --force-ocr"),
        }
        return ExitCode::SUCCESS;
    }

    info!("pages per chapter: {}", cli.pages);
    if cli.ocr {
        info!("OCR language: {}", cli.ocr_lang);
        info!(
            "image preprocessing: {}",
            if cli.no_preprocess {
                "disabled"
            } else {
                "enabled"
            }
        );
        info!("image resolution: {} dpi", cli.dpi);
    }

    let report = splitter.process(&cli.input, &cli.output, cli.force_ocr);
    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
