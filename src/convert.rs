//! Run orchestration: one document plus a set of narration clips in, one or
//! both artifacts out. Single-threaded, run-to-completion; each run owns its
//! working set and releases it when the run ends, success or failure.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::audio::AudioClip;
use crate::audio::bind::{FfprobeDurationProbe, bind_audio};
use crate::foundation::error::DeckcastResult;
use crate::render::{interactive, package, video};
use crate::report::ConvertReport;
use crate::slides;
use crate::timeline::Timeline;

/// Which artifacts to produce from the timeline.
#[derive(Clone, Debug, Default)]
pub struct OutputSelection {
    /// MP4 output path, if the video artifact is wanted.
    pub video: Option<PathBuf>,
    /// Standalone HTML output path, if the interactive artifact is wanted.
    pub html: Option<PathBuf>,
    /// Zip bundle path (HTML + usage note), if wanted.
    pub bundle: Option<PathBuf>,
}

/// One conversion request.
#[derive(Clone, Debug)]
pub struct ConvertRequest {
    pub pdf_path: PathBuf,
    pub audio_paths: Vec<PathBuf>,
    pub zoom: f64,
    pub video_config: video::VideoConfig,
    pub outputs: OutputSelection,
}

impl ConvertRequest {
    pub fn new(pdf_path: impl Into<PathBuf>) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            audio_paths: Vec::new(),
            zoom: slides::RASTER_ZOOM,
            video_config: video::VideoConfig::default(),
            outputs: OutputSelection::default(),
        }
    }
}

/// Run the full pipeline: rasterize, bind, build the timeline, render the
/// selected artifacts. Fatal errors abort; recoverable ones accumulate into
/// the report's warnings, so a degraded run is still reported as a success.
pub fn convert(request: &ConvertRequest) -> DeckcastResult<ConvertReport> {
    let slides = slides::rasterize_pdf(&request.pdf_path, request.zoom)?;

    let clips = load_clips(&request.audio_paths);
    let (entries, bind_warnings) = bind_audio(slides, &clips, &FfprobeDurationProbe);
    let timeline = Timeline::build(entries)?;
    info!(
        slides = timeline.entries().len(),
        total_seconds = timeline.total_duration_seconds(),
        "timeline built"
    );

    let mut report = ConvertReport {
        artifacts: Vec::new(),
        warnings: bind_warnings,
    };

    if let Some(out) = &request.outputs.video {
        let render_warnings = video::render_video(&timeline, &request.video_config, out)?;
        report.warnings.extend(render_warnings);
        report.artifacts.push(out.clone());
    }

    if request.outputs.html.is_some() || request.outputs.bundle.is_some() {
        let html = interactive::render_html(&timeline)?;
        if let Some(out) = &request.outputs.html {
            write_html(&html, out)?;
            report.artifacts.push(out.clone());
        }
        if let Some(out) = &request.outputs.bundle {
            package::write_bundle(&html, out)?;
            report.artifacts.push(out.clone());
        }
    }

    for warning in &report.warnings {
        warn!(%warning, "conversion degraded");
    }
    Ok(report)
}

/// Load clips in caller order, skipping unreadable or unsupported uploads.
/// Skipped clips simply never bind; the affected slides fall back to the
/// default duration like any other unbound slide.
fn load_clips(paths: &[PathBuf]) -> Vec<AudioClip> {
    let mut clips = Vec::with_capacity(paths.len());
    for path in paths {
        match AudioClip::from_path(path) {
            Ok(clip) => clips.push(clip),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping audio upload"),
        }
    }
    clips
}

fn write_html(html: &str, out_path: &Path) -> DeckcastResult<()> {
    use anyhow::Context as _;
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })
                .map_err(crate::foundation::error::DeckcastError::Other)?;
        }
    }
    std::fs::write(out_path, html)
        .with_context(|| format!("write html '{}'", out_path.display()))
        .map_err(crate::foundation::error::DeckcastError::Other)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_are_the_documented_constants() {
        let req = ConvertRequest::new("/tmp/deck.pdf");
        assert_eq!(req.zoom, 2.0);
        assert_eq!(req.video_config.fps, 30);
        assert!(req.outputs.video.is_none());
        assert!(req.outputs.html.is_none());
    }

    #[test]
    fn load_clips_skips_unsupported_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("slide_1.mp3");
        let b = dir.path().join("notes.txt");
        let c = dir.path().join("slide_2.wav");
        std::fs::write(&a, b"mp3").unwrap();
        std::fs::write(&b, b"txt").unwrap();
        std::fs::write(&c, b"wav").unwrap();

        let clips = load_clips(&[a, b, c]);
        let names: Vec<&str> = clips.iter().map(|c| c.source_name.as_str()).collect();
        assert_eq!(names, vec!["slide_1.mp3", "slide_2.wav"]);
    }

    #[test]
    fn convert_fails_fast_on_missing_document() {
        let req = ConvertRequest::new("/nonexistent/deck.pdf");
        let err = convert(&req).unwrap_err();
        assert!(err.to_string().contains("document error"));
    }
}
