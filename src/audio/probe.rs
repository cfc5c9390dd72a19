//! External audio collaborators: duration probing through `ffprobe` and PCM
//! decoding through `ffmpeg`. Both shell out to the system binaries; callers
//! decide whether a failure is fatal (it usually is not).

use std::path::Path;
use std::process::Command;

use crate::foundation::error::{DeckcastError, DeckcastResult};

/// Sample rate the video renderer mixes at.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

/// Probe a clip's play duration in seconds through `ffprobe`.
pub fn probe_duration(path: &Path) -> DeckcastResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| DeckcastError::validation(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(DeckcastError::validation(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| DeckcastError::validation(format!("ffprobe json parse failed: {e}")))?;
    let duration: f64 = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| {
            DeckcastError::validation(format!(
                "ffprobe reported no duration for '{}'",
                path.display()
            ))
        })?
        .parse()
        .map_err(|e| DeckcastError::validation(format!("ffprobe duration parse failed: {e}")))?;
    if !(duration > 0.0) {
        return Err(DeckcastError::validation(format!(
            "ffprobe reported non-positive duration for '{}'",
            path.display()
        )));
    }
    Ok(duration)
}

/// Decode a media file to stereo interleaved `f32` PCM at `sample_rate`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> DeckcastResult<AudioPcm> {
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            DeckcastError::validation(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(DeckcastError::validation(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if out.stdout.len() % 4 != 0 {
        return Err(DeckcastError::validation(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: pcm,
    })
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn are_ffmpeg_tools_on_path() -> bool {
    let check = |bin: &str| {
        Command::new(bin)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    };
    check("ffmpeg") && check("ffprobe")
}

// No unit tests here: these functions shell out to `ffprobe`/`ffmpeg` and are
// exercised by integration tests that skip when the tools are unavailable.
