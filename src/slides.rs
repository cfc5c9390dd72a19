//! Slide source adapter: turns a PDF into an ordered sequence of page images.
//!
//! Rasterization is delegated to the system `pdftoppm` binary (poppler), the
//! same way encoding is delegated to the system `ffmpeg`. The call is
//! all-or-nothing: either every page rasterizes or the whole call fails.

use std::path::Path;
use std::process::Command;

use anyhow::Context as _;
use tracing::info;

use crate::foundation::error::{DeckcastError, DeckcastResult};

/// Linear oversampling factor for print-quality output. `pdftoppm` takes a
/// DPI, so this maps to `72 * RASTER_ZOOM`.
pub const RASTER_ZOOM: f64 = 2.0;

const PDF_BASE_DPI: f64 = 72.0;

/// One rasterized page. Immutable once produced.
#[derive(Clone, Debug)]
pub struct SlideImage {
    /// 1-based page number; order equals page order.
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub png_bytes: Vec<u8>,
}

/// Return `true` when `pdftoppm` can be invoked from `PATH`.
pub fn is_pdftoppm_on_path() -> bool {
    Command::new("pdftoppm")
        .arg("-v")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Rasterize every page of `pdf_path` at `zoom` into PNG slide images.
///
/// Fails with [`DeckcastError::Document`] when the document cannot be opened,
/// the rasterizer is missing or fails, or the document has zero pages.
pub fn rasterize_pdf(pdf_path: &Path, zoom: f64) -> DeckcastResult<Vec<SlideImage>> {
    if !(zoom > 0.0) {
        return Err(DeckcastError::validation("raster zoom must be positive"));
    }
    if !pdf_path.is_file() {
        return Err(DeckcastError::document(format!(
            "'{}' does not exist or is not a file",
            pdf_path.display()
        )));
    }

    let workdir = tempfile::tempdir()
        .context("create rasterizer working directory")
        .map_err(DeckcastError::Other)?;
    let prefix = workdir.path().join("page");

    let dpi = (PDF_BASE_DPI * zoom).round() as u32;
    let out = Command::new("pdftoppm")
        .args(["-png", "-r", &dpi.to_string()])
        .arg(pdf_path)
        .arg(&prefix)
        .output()
        .map_err(|e| {
            DeckcastError::document(format!(
                "failed to run pdftoppm (is poppler installed and on PATH?): {e}"
            ))
        })?;
    if !out.status.success() {
        return Err(DeckcastError::document(format!(
            "pdftoppm failed for '{}': {}",
            pdf_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let slides = collect_pages(workdir.path())?;
    if slides.is_empty() {
        return Err(DeckcastError::document(format!(
            "'{}' produced zero pages",
            pdf_path.display()
        )));
    }
    info!(pages = slides.len(), dpi, "rasterized document");
    Ok(slides)
}

/// Gather `page-<n>.png` outputs in page order and renumber them 1..=N.
///
/// `pdftoppm` zero-pads page numbers depending on the page count, so the
/// suffix is parsed numerically rather than sorted lexically.
fn collect_pages(dir: &Path) -> DeckcastResult<Vec<SlideImage>> {
    let mut numbered = Vec::<(u32, std::path::PathBuf)>::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("list rasterizer output '{}'", dir.display()))
        .map_err(DeckcastError::Other)?;
    for entry in entries {
        let path = entry
            .context("read rasterizer output entry")
            .map_err(DeckcastError::Other)?
            .path();
        let Some(page_num) = parse_page_number(&path) else {
            continue;
        };
        numbered.push((page_num, path));
    }
    numbered.sort_by_key(|(n, _)| *n);

    let mut slides = Vec::with_capacity(numbered.len());
    for (ordinal, (_, path)) in numbered.iter().enumerate() {
        let png_bytes = std::fs::read(path)
            .with_context(|| format!("read rasterized page '{}'", path.display()))
            .map_err(DeckcastError::Other)?;
        let (width, height) = png_dimensions(&png_bytes)?;
        slides.push(SlideImage {
            index: ordinal as u32 + 1,
            width,
            height,
            png_bytes,
        });
    }
    Ok(slides)
}

fn parse_page_number(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}

fn png_dimensions(png_bytes: &[u8]) -> DeckcastResult<(u32, u32)> {
    let img = image::load_from_memory(png_bytes)
        .context("decode rasterized page")
        .map_err(DeckcastError::Other)?;
    Ok((img.width(), img.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn page_number_parses_padded_and_unpadded() {
        assert_eq!(parse_page_number(&PathBuf::from("/t/page-1.png")), Some(1));
        assert_eq!(parse_page_number(&PathBuf::from("/t/page-07.png")), Some(7));
        assert_eq!(parse_page_number(&PathBuf::from("/t/page-12.png")), Some(12));
        assert_eq!(parse_page_number(&PathBuf::from("/t/other-1.png")), None);
        assert_eq!(parse_page_number(&PathBuf::from("/t/page-1.ppm")), None);
    }

    #[test]
    fn rasterize_rejects_missing_file() {
        let err = rasterize_pdf(Path::new("/nonexistent/deck.pdf"), RASTER_ZOOM).unwrap_err();
        assert!(err.to_string().contains("document error"));
    }

    #[test]
    fn rasterize_rejects_bad_zoom() {
        let err = rasterize_pdf(Path::new("/nonexistent/deck.pdf"), 0.0).unwrap_err();
        assert!(err.to_string().contains("validation error"));
    }
}
