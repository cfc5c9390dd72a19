//! The timeline is the shared structure both renderers consume: an ordered,
//! gapless sequence of slides with resolved durations and cumulative start
//! offsets. It is built once per conversion and never mutated afterwards.

use serde::Serialize;

use crate::audio::AudioClip;
use crate::foundation::error::{DeckcastError, DeckcastResult};
use crate::slides::SlideImage;

/// Display time for a slide with no usable narration.
pub const DEFAULT_DURATION_SECONDS: f64 = 10.0;

/// A narration clip bound to one slide, with its probed play length.
#[derive(Clone, Debug)]
pub struct BoundAudio {
    pub clip: AudioClip,
    pub duration_seconds: f64,
}

/// One slide with its resolved duration and optional narration.
#[derive(Clone, Debug)]
pub struct SlideEntry {
    /// 1-based, contiguous, equal to the page order of the source document.
    pub slide_index: u32,
    pub image: SlideImage,
    /// At most one clip binds to a slide; clips are never shared across slides.
    pub audio: Option<BoundAudio>,
    /// Audio duration when bound and probeable, otherwise [`DEFAULT_DURATION_SECONDS`].
    pub duration_seconds: f64,
}

impl SlideEntry {
    pub fn new(slide_index: u32, image: SlideImage, audio: Option<BoundAudio>) -> Self {
        let duration_seconds = audio
            .as_ref()
            .map(|a| a.duration_seconds)
            .unwrap_or(DEFAULT_DURATION_SECONDS);
        Self {
            slide_index,
            image,
            audio,
            duration_seconds,
        }
    }
}

/// The full presentation run: entries in slide order plus the summed length.
#[derive(Clone, Debug)]
pub struct Timeline {
    entries: Vec<SlideEntry>,
    total_duration_seconds: f64,
}

impl Timeline {
    /// Pure fold over the bound entries. Fails on zero entries; trusts the
    /// binder for everything else (contiguous indices, positive durations).
    pub fn build(entries: Vec<SlideEntry>) -> DeckcastResult<Self> {
        if entries.is_empty() {
            return Err(DeckcastError::EmptyTimeline);
        }
        for entry in &entries {
            if !(entry.duration_seconds > 0.0) {
                return Err(DeckcastError::validation(format!(
                    "slide {} has non-positive duration {}",
                    entry.slide_index, entry.duration_seconds
                )));
            }
        }
        let total_duration_seconds = entries.iter().map(|e| e.duration_seconds).sum();
        Ok(Self {
            entries,
            total_duration_seconds,
        })
    }

    pub fn entries(&self) -> &[SlideEntry] {
        &self.entries
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.total_duration_seconds
    }

    /// Start offset of entry `i`: the sum of all prior durations. Derived,
    /// not stored, so it can never drift from the entry order.
    pub fn start_offset_seconds(&self, i: usize) -> f64 {
        self.entries[..i].iter().map(|e| e.duration_seconds).sum()
    }

    /// `(entry, start_offset)` pairs in slide order.
    pub fn iter_with_offsets(&self) -> impl Iterator<Item = (&SlideEntry, f64)> {
        let mut offset = 0.0f64;
        self.entries.iter().map(move |entry| {
            let start = offset;
            offset += entry.duration_seconds;
            (entry, start)
        })
    }
}

/// Flat per-slide record for serialization into the interactive document.
#[derive(Clone, Debug, Serialize)]
pub struct TimelineManifestEntry {
    pub slide_index: u32,
    pub duration_ms: f64,
    pub start_ms: f64,
    pub has_audio: bool,
}

impl Timeline {
    pub fn manifest(&self) -> Vec<TimelineManifestEntry> {
        self.iter_with_offsets()
            .map(|(entry, start)| TimelineManifestEntry {
                slide_index: entry.slide_index,
                duration_ms: entry.duration_seconds * 1000.0,
                start_ms: start * 1000.0,
                has_audio: entry.audio.is_some(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::SlideImage;

    fn img(index: u32) -> SlideImage {
        SlideImage {
            index,
            width: 64,
            height: 48,
            png_bytes: Vec::new(),
        }
    }

    fn entry(index: u32, duration: f64) -> SlideEntry {
        SlideEntry {
            slide_index: index,
            image: img(index),
            audio: None,
            duration_seconds: duration,
        }
    }

    #[test]
    fn build_rejects_empty() {
        assert!(matches!(
            Timeline::build(Vec::new()),
            Err(DeckcastError::EmptyTimeline)
        ));
    }

    #[test]
    fn build_rejects_non_positive_duration() {
        assert!(Timeline::build(vec![entry(1, 0.0)]).is_err());
        assert!(Timeline::build(vec![entry(1, -1.0)]).is_err());
    }

    #[test]
    fn offsets_are_cumulative_and_gapless() {
        let t = Timeline::build(vec![entry(1, 5.2), entry(2, 10.0), entry(3, 7.0)]).unwrap();
        assert_eq!(t.start_offset_seconds(0), 0.0);
        assert_eq!(t.start_offset_seconds(1), 5.2);
        assert_eq!(t.start_offset_seconds(2), 15.2);
        assert!((t.total_duration_seconds() - 22.2).abs() < 1e-9);

        let offsets: Vec<f64> = t.iter_with_offsets().map(|(_, s)| s).collect();
        assert_eq!(offsets, vec![0.0, 5.2, 15.2]);
    }

    #[test]
    fn last_offset_plus_last_duration_is_total() {
        let t = Timeline::build(vec![entry(1, 3.5), entry(2, 1.25), entry(3, 8.0)]).unwrap();
        let n = t.entries().len();
        let last = &t.entries()[n - 1];
        assert_eq!(
            t.start_offset_seconds(n - 1) + last.duration_seconds,
            t.total_duration_seconds()
        );
    }

    #[test]
    fn single_entry_timeline() {
        let t = Timeline::build(vec![entry(1, DEFAULT_DURATION_SECONDS)]).unwrap();
        assert_eq!(t.entries().len(), 1);
        assert_eq!(t.start_offset_seconds(0), 0.0);
        assert_eq!(t.total_duration_seconds(), 10.0);
    }

    #[test]
    fn manifest_carries_millisecond_offsets() {
        let t = Timeline::build(vec![entry(1, 2.0), entry(2, 3.0)]).unwrap();
        let m = t.manifest();
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].start_ms, 0.0);
        assert_eq!(m[1].start_ms, 2000.0);
        assert_eq!(m[1].duration_ms, 3000.0);
        assert!(!m[0].has_audio);
    }
}
