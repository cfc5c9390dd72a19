//! Narration audio: clip model, external probe/decode collaborators, and the
//! naming-convention binder that pairs clips with slides.

pub mod bind;
pub mod probe;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{DeckcastError, DeckcastResult};

/// Container formats accepted by the binding convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn from_extension(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".mp3") {
            Some(Self::Mp3)
        } else if lower.ends_with(".wav") {
            Some(Self::Wav)
        } else {
            None
        }
    }

    /// MIME subtype used for data-URI embedding.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
        }
    }
}

/// One caller-supplied narration resource. Immutable; referenced by at most
/// one slide entry.
#[derive(Clone, Debug)]
pub struct AudioClip {
    /// Name as provided by the caller (basename of the upload).
    pub source_name: String,
    pub format: AudioFormat,
    /// On-disk location, used by the ffmpeg/ffprobe collaborators.
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl AudioClip {
    /// Load a clip from disk, rejecting unsupported extensions.
    pub fn from_path(path: &Path) -> DeckcastResult<Self> {
        let source_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                DeckcastError::validation(format!(
                    "audio path '{}' has no usable file name",
                    path.display()
                ))
            })?
            .to_owned();
        let format = AudioFormat::from_extension(&source_name).ok_or_else(|| {
            DeckcastError::validation(format!(
                "unsupported audio format for '{source_name}' (expected .mp3 or .wav)"
            ))
        })?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("read audio file '{}'", path.display()))
            .map_err(DeckcastError::Other)?;
        Ok(Self {
            source_name,
            format,
            path: path.to_path_buf(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(AudioFormat::from_extension("a.mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension("A.MP3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension("b.WaV"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_extension("c.ogg"), None);
        assert_eq!(AudioFormat::from_extension("noext"), None);
    }

    #[test]
    fn clip_rejects_unsupported_extension() {
        let err = AudioClip::from_path(Path::new("/tmp/narration.ogg")).unwrap_err();
        assert!(err.to_string().contains("unsupported audio format"));
    }
}
