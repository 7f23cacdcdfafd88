//! Page-range chapter splitting built on lopdf page-copy primitives
//!
//! Chapters are contiguous half-open page ranges over the source document.
//! Output files are written into a staging directory and renamed into place
//! only after the last chapter has been saved, so a failed run leaves no
//! partial chapter set behind.

use crate::SplitError;
use log::info;
use lopdf::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A contiguous chapter range, half-open over `[0, total_pages)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterRange {
    pub start: u32,
    pub end: u32,
}

impl ChapterRange {
    /// Number of pages covered by this range.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Files produced by a split run (basic or OCR).
#[derive(Debug, Default)]
pub struct SplitOutcome {
    pub total_pages: u32,
    pub chapters: Vec<PathBuf>,
    /// Per-chapter OCR text sidecars; empty for basic splits.
    pub text_files: Vec<PathBuf>,
    /// Total recognized characters across all pages; OCR runs only.
    pub total_text_chars: Option<u64>,
}

/// Compute the chapter partition of `total_pages` pages.
///
/// Produces `ceil(total_pages / pages_per_chapter)` contiguous ranges with no
/// gaps or overlaps; only the last range may be short.
pub fn chapter_ranges(total_pages: u32, pages_per_chapter: u32) -> Vec<ChapterRange> {
    assert!(pages_per_chapter > 0, "pages_per_chapter must be positive");

    let num_chapters = total_pages.div_ceil(pages_per_chapter);
    (0..num_chapters)
        .map(|i| {
            let start = i * pages_per_chapter;
            ChapterRange {
                start,
                end: (start + pages_per_chapter).min(total_pages),
            }
        })
        .collect()
}

/// Split `input` into chapter PDFs of `pages_per_chapter` pages each.
///
/// Chapter files are named `<stem>_chapter_NNN.pdf` and written to
/// `output_dir`. The operation is all-or-nothing: on any error nothing is
/// left behind in `output_dir`.
pub fn split_into_chapters(
    input: &Path,
    output_dir: &Path,
    pages_per_chapter: u32,
) -> Result<SplitOutcome, SplitError> {
    let buffer = fs::read(input)?;
    let total_pages = Document::load_mem(&buffer)?.get_pages().len() as u32;

    if total_pages == 0 {
        return Err(SplitError::EmptyDocument);
    }

    let stem = file_stem(input);
    let mut stage = Stage::new(output_dir)?;
    let ranges = chapter_ranges(total_pages, pages_per_chapter);
    let mut chapter_names = Vec::with_capacity(ranges.len());

    for (index, range) in ranges.iter().enumerate() {
        let filename = format!("{}_chapter_{:03}.pdf", stem, index + 1);
        write_chapter(&buffer, total_pages, *range, &stage.add(&filename))?;
        info!(
            "created chapter {}: {} (pages {}-{})",
            index + 1,
            filename,
            range.start + 1,
            range.end
        );
        chapter_names.push(filename);
    }

    stage.commit()?;

    Ok(SplitOutcome {
        total_pages,
        chapters: chapter_names
            .iter()
            .map(|name| output_dir.join(name))
            .collect(),
        text_files: Vec::new(),
        total_text_chars: None,
    })
}

/// Write the pages of `range` into a standalone PDF at `path`.
///
/// The document is reloaded from the source buffer and every page outside
/// the range is deleted; lopdf numbers pages from 1.
pub(crate) fn write_chapter(
    buffer: &[u8],
    total_pages: u32,
    range: ChapterRange,
    path: &Path,
) -> Result<(), SplitError> {
    let mut doc = Document::load_mem(buffer)?;

    let pages_to_remove: Vec<u32> = (1..=range.start)
        .chain(range.end + 1..=total_pages)
        .collect();
    if !pages_to_remove.is_empty() {
        doc.delete_pages(&pages_to_remove);
    }

    doc.prune_objects();
    doc.renumber_objects();
    doc.compress();
    doc.save(path)?;
    Ok(())
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Staging directory for atomic output.
///
/// Files are written under a temp directory inside the output directory and
/// renamed into place on commit. Dropping an uncommitted stage removes
/// everything it holds.
pub(crate) struct Stage {
    dir: TempDir,
    output_dir: PathBuf,
    files: Vec<String>,
}

impl Stage {
    pub fn new(output_dir: &Path) -> Result<Self, SplitError> {
        let dir = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(output_dir)?;
        Ok(Stage {
            dir,
            output_dir: output_dir.to_path_buf(),
            files: Vec::new(),
        })
    }

    /// Register `filename` and return the staged path to write it to.
    pub fn add(&mut self, filename: &str) -> PathBuf {
        self.files.push(filename.to_string());
        self.dir.path().join(filename)
    }

    /// Move every staged file into the output directory, overwriting any
    /// previous files with the same names.
    pub fn commit(self) -> Result<(), SplitError> {
        for name in &self.files {
            fs::rename(self.dir.path().join(name), self.output_dir.join(name))?;
        }
        Ok(())
    }
}
