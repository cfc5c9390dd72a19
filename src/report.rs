//! Non-fatal degradations accumulated across a conversion run. A run that
//! loses audio still succeeds, but every loss is surfaced next to the result.

use std::fmt;
use std::path::PathBuf;

/// One recoverable problem, attributed to a slide where applicable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// The clip bound to this slide could not be probed; its slide fell back
    /// to the default duration.
    AudioProbeFailed { slide_index: u32, reason: String },
    /// The clip bound to this slide failed to decode during video rendering;
    /// its segment was replaced with silence.
    SegmentAudioDropped { slide_index: u32, reason: String },
    /// The entire audio track was dropped; the video was encoded silent.
    SilentVideo { reason: String },
}

impl Warning {
    pub fn slide_index(&self) -> Option<u32> {
        match self {
            Self::AudioProbeFailed { slide_index, .. }
            | Self::SegmentAudioDropped { slide_index, .. } => Some(*slide_index),
            Self::SilentVideo { .. } => None,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AudioProbeFailed {
                slide_index,
                reason,
            } => write!(
                f,
                "slide {slide_index}: audio unreadable, using default duration ({reason})"
            ),
            Self::SegmentAudioDropped {
                slide_index,
                reason,
            } => write!(
                f,
                "slide {slide_index}: audio dropped from video segment ({reason})"
            ),
            Self::SilentVideo { reason } => {
                write!(f, "video encoded without audio track ({reason})")
            }
        }
    }
}

/// Outcome of a successful (possibly degraded) conversion run.
#[derive(Debug, Default)]
pub struct ConvertReport {
    /// Artifacts written, in the order they were produced.
    pub artifacts: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
}

impl ConvertReport {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_display_names_the_slide() {
        let w = Warning::AudioProbeFailed {
            slide_index: 2,
            reason: "corrupt header".into(),
        };
        assert!(w.to_string().contains("slide 2"));
        assert_eq!(w.slide_index(), Some(2));

        let w = Warning::SilentVideo {
            reason: "mix failed".into(),
        };
        assert_eq!(w.slide_index(), None);
    }

    #[test]
    fn report_degradation_tracks_warnings() {
        let mut report = ConvertReport::default();
        assert!(!report.is_degraded());
        report.warnings.push(Warning::SilentVideo {
            reason: "x".into(),
        });
        assert!(report.is_degraded());
    }
}
