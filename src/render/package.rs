//! Downloadable bundle: the slideshow document plus a short usage note,
//! packed as a deflate zip.

use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use zip::write::SimpleFileOptions;

use crate::foundation::error::{DeckcastError, DeckcastResult};

const README: &str = "\
Slideshow Package
=================

Contents:
- slideshow.html: interactive presentation viewer, fully self-contained

How to use:
1. Open slideshow.html in any web browser.
2. Press Play (or Space) for automatic playback with narration.
3. Navigate manually with the buttons or the arrow keys.

Controls:
- Play/Pause: Space bar or Play button
- Next slide: Right arrow or Next button
- Previous slide: Left arrow or Previous button
- Reset: Home key or Reset button
";

/// Write a zip at `out_path` containing the rendered `html` and a README.
pub fn write_bundle(html: &str, out_path: &Path) -> DeckcastResult<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })
                .map_err(DeckcastError::Other)?;
        }
    }

    let file = std::fs::File::create(out_path)
        .with_context(|| format!("create bundle '{}'", out_path.display()))
        .map_err(DeckcastError::Other)?;
    let mut archive = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    archive
        .start_file("slideshow.html", options)
        .context("add slideshow.html to bundle")
        .map_err(DeckcastError::Other)?;
    archive
        .write_all(html.as_bytes())
        .context("write slideshow.html into bundle")
        .map_err(DeckcastError::Other)?;

    archive
        .start_file("README.txt", options)
        .context("add README.txt to bundle")
        .map_err(DeckcastError::Other)?;
    archive
        .write_all(README.as_bytes())
        .context("write README.txt into bundle")
        .map_err(DeckcastError::Other)?;

    archive
        .finish()
        .context("finalize bundle")
        .map_err(DeckcastError::Other)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn bundle_contains_viewer_and_readme() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bundle.zip");
        write_bundle("<html>hi</html>", &out).unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_owned())
            .collect();
        assert_eq!(names, vec!["slideshow.html", "README.txt"]);

        let mut html = String::new();
        archive
            .by_name("slideshow.html")
            .unwrap()
            .read_to_string(&mut html)
            .unwrap();
        assert_eq!(html, "<html>hi</html>");
    }
}
