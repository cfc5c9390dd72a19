//! Video renderer: plays the timeline out as one MP4.
//!
//! Frames are streamed as raw RGBA into the system `ffmpeg` binary; the audio
//! track is a single silence-initialized PCM mix with each bound clip copied
//! in at its entry's start offset. Output presets are fixed: libx264 +
//! yuv420p video, aac audio, `+faststart`.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context as _;
use image::imageops::FilterType;
use tracing::{info, warn};

use crate::audio::probe::{self, MIX_SAMPLE_RATE};
use crate::foundation::error::{DeckcastError, DeckcastResult};
use crate::report::Warning;
use crate::timeline::Timeline;

/// Fixed-preset encoder configuration; only the frame rate and background
/// vary per call.
#[derive(Clone, Debug)]
pub struct VideoConfig {
    pub fps: u32,
    /// Letterbox/background color behind slides that do not fill the canvas.
    pub bg_rgb: [u8; 3],
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            bg_rgb: [0, 0, 0],
            overwrite: true,
        }
    }
}

/// Encode `timeline` to an MP4 at `out_path`.
///
/// Slide order and per-slide frame counts are exact functions of the
/// timeline; losing audio degrades the result (warnings) but never fails it.
/// A missing or broken `ffmpeg` is fatal here since it is the encoder itself.
pub fn render_video(
    timeline: &Timeline,
    cfg: &VideoConfig,
    out_path: &Path,
) -> DeckcastResult<Vec<Warning>> {
    if cfg.fps == 0 {
        return Err(DeckcastError::validation("video fps must be non-zero"));
    }
    ensure_parent_dir(out_path)?;
    if !cfg.overwrite && out_path.exists() {
        return Err(DeckcastError::validation(format!(
            "output file '{}' already exists",
            out_path.display()
        )));
    }
    if !is_ffmpeg_on_path() {
        return Err(DeckcastError::encode(
            "ffmpeg is required for MP4 encoding, but was not found on PATH",
        ));
    }

    let canvas = canvas_for(timeline)?;
    let frame_counts: Vec<u64> = timeline
        .entries()
        .iter()
        .map(|e| frame_count(e.duration_seconds, cfg.fps))
        .collect();

    let mut warnings = Vec::new();

    // The mix file must outlive the ffmpeg child, so the guard stays in scope
    // until after wait().
    let mut mix_file = None;
    let audio_path = match build_audio_mix(timeline, &frame_counts, cfg.fps, &mut warnings) {
        Ok(Some(path_guard)) => {
            let path = path_guard.path().to_path_buf();
            mix_file = Some(path_guard);
            Some(path)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "audio mix failed, encoding silent video");
            warnings.push(Warning::SilentVideo {
                reason: e.to_string(),
            });
            None
        }
    };

    encode_frames(timeline, cfg, canvas, &frame_counts, audio_path.as_deref(), out_path)?;
    drop(mix_file);

    info!(
        out = %out_path.display(),
        slides = timeline.entries().len(),
        frames = frame_counts.iter().sum::<u64>(),
        silent = audio_path.is_none(),
        "encoded video"
    );
    Ok(warnings)
}

/// Output canvas: the first slide's dimensions, rounded down to even as
/// required for yuv420p output.
fn canvas_for(timeline: &Timeline) -> DeckcastResult<(u32, u32)> {
    let first = &timeline.entries()[0].image;
    let width = (first.width / 2) * 2;
    let height = (first.height / 2) * 2;
    if width == 0 || height == 0 {
        return Err(DeckcastError::validation(
            "slide dimensions too small for video encoding",
        ));
    }
    Ok((width, height))
}

fn frame_count(duration_seconds: f64, fps: u32) -> u64 {
    let frames = (duration_seconds * f64::from(fps)).round() as u64;
    frames.max(1)
}

fn frames_to_samples(frames: u64, fps: u32) -> u64 {
    let num = u128::from(frames) * u128::from(MIX_SAMPLE_RATE);
    let den = u128::from(fps);
    ((num + den / 2) / den) as u64
}

/// Build the timeline-length stereo mix and write it as a temp f32le file.
///
/// Returns `Ok(None)` when no entry has bound audio. Per-clip decode failures
/// leave that segment silent and push a warning; only mix-wide failures (no
/// decodable clip at all, or the file write) surface as errors for the caller
/// to downgrade.
fn build_audio_mix(
    timeline: &Timeline,
    frame_counts: &[u64],
    fps: u32,
    warnings: &mut Vec<Warning>,
) -> DeckcastResult<Option<tempfile::NamedTempFile>> {
    if timeline.entries().iter().all(|e| e.audio.is_none()) {
        return Ok(None);
    }

    let total_frames: u64 = frame_counts.iter().sum();
    let total_samples = frames_to_samples(total_frames, fps);
    let mut mix = vec![0.0f32; total_samples as usize * 2];

    let mut any_decoded = false;
    let mut elapsed_frames = 0u64;
    for (entry, frames) in timeline.entries().iter().zip(frame_counts) {
        let start_sample = frames_to_samples(elapsed_frames, fps);
        let end_sample = frames_to_samples(elapsed_frames + frames, fps);
        elapsed_frames += frames;

        let Some(bound) = &entry.audio else {
            continue;
        };
        let pcm = match probe::decode_audio_f32_stereo(&bound.clip.path, MIX_SAMPLE_RATE) {
            Ok(pcm) => pcm,
            Err(e) => {
                warn!(slide = entry.slide_index, error = %e, "segment audio decode failed, substituting silence");
                warnings.push(Warning::SegmentAudioDropped {
                    slide_index: entry.slide_index,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        // Clamp to the segment: a clip that outlives its resolved duration
        // is truncated at the segment border.
        let segment_samples = (end_sample - start_sample) as usize;
        let clip_samples = (pcm.interleaved_f32.len() / 2).min(segment_samples);
        let dst_base = start_sample as usize * 2;
        let copy_len = clip_samples * 2;
        mix[dst_base..dst_base + copy_len].copy_from_slice(&pcm.interleaved_f32[..copy_len]);
        any_decoded = true;
    }

    if !any_decoded {
        return Err(DeckcastError::validation(
            "no bound audio clip could be decoded",
        ));
    }

    let mut bytes = Vec::<u8>::with_capacity(mix.len() * 4);
    for &sample in &mix {
        bytes.extend_from_slice(&sample.clamp(-1.0, 1.0).to_le_bytes());
    }
    let mix_file = tempfile::NamedTempFile::new()
        .context("create audio mix temp file")
        .map_err(DeckcastError::Other)?;
    std::fs::write(mix_file.path(), bytes)
        .context("write audio mix temp file")
        .map_err(DeckcastError::Other)?;
    Ok(Some(mix_file))
}

fn encode_frames(
    timeline: &Timeline,
    cfg: &VideoConfig,
    canvas: (u32, u32),
    frame_counts: &[u64],
    audio_path: Option<&Path>,
    out_path: &Path,
) -> DeckcastResult<()> {
    let (width, height) = canvas;

    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    if cfg.overwrite {
        cmd.arg("-y");
    } else {
        cmd.arg("-n");
    }
    cmd.args([
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{width}x{height}"),
        "-r",
        &cfg.fps.to_string(),
        "-i",
        "pipe:0",
    ]);
    if let Some(audio) = audio_path {
        cmd.args([
            "-f",
            "f32le",
            "-ar",
            &MIX_SAMPLE_RATE.to_string(),
            "-ac",
            "2",
            "-i",
        ])
        .arg(audio)
        .args([
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
            "-movflags",
            "+faststart",
        ]);
    } else {
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
    }
    cmd.arg(out_path);

    let mut child = cmd.spawn().map_err(|e| {
        DeckcastError::encode(format!(
            "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
        ))
    })?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| DeckcastError::encode("failed to open ffmpeg stdin (unexpected)"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| DeckcastError::encode("failed to open ffmpeg stderr (unexpected)"))?;
    let stderr_drain = std::thread::spawn(move || {
        let mut stderr_bytes = Vec::new();
        stderr.read_to_end(&mut stderr_bytes)?;
        Ok::<_, std::io::Error>(stderr_bytes)
    });

    let mut write_result = Ok(());
    'write: for (entry, frames) in timeline.entries().iter().zip(frame_counts) {
        let frame = compose_frame(&entry.image.png_bytes, width, height, cfg.bg_rgb)?;
        for _ in 0..*frames {
            use std::io::Write as _;
            if let Err(e) = stdin.write_all(&frame) {
                // ffmpeg closing the pipe early means it already failed; the
                // exit status below carries the real diagnostic.
                write_result = Err(e);
                break 'write;
            }
        }
    }
    drop(stdin);

    let status = child
        .wait()
        .map_err(|e| DeckcastError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
    let stderr_bytes = stderr_drain
        .join()
        .map_err(|_| DeckcastError::encode("ffmpeg stderr drain thread panicked"))?
        .map_err(|e| DeckcastError::encode(format!("ffmpeg stderr read failed: {e}")))?;

    if !status.success() {
        return Err(DeckcastError::encode(format!(
            "ffmpeg exited with status {}: {}",
            status,
            String::from_utf8_lossy(&stderr_bytes).trim()
        )));
    }
    if let Err(e) = write_result {
        return Err(DeckcastError::encode(format!(
            "failed to write frames to ffmpeg stdin: {e}"
        )));
    }
    Ok(())
}

/// Decode a slide PNG and letterbox it onto an opaque RGBA canvas.
fn compose_frame(
    png_bytes: &[u8],
    width: u32,
    height: u32,
    bg_rgb: [u8; 3],
) -> DeckcastResult<Vec<u8>> {
    let slide = image::load_from_memory(png_bytes)
        .context("decode slide image")
        .map_err(DeckcastError::Other)?
        .to_rgba8();

    let mut canvas = image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([bg_rgb[0], bg_rgb[1], bg_rgb[2], 255]),
    );

    let scaled = if slide.width() == width && slide.height() == height {
        slide
    } else {
        let scale = f64::min(
            f64::from(width) / f64::from(slide.width()),
            f64::from(height) / f64::from(slide.height()),
        );
        let w = ((f64::from(slide.width()) * scale) as u32).clamp(1, width);
        let h = ((f64::from(slide.height()) * scale) as u32).clamp(1, height);
        image::imageops::resize(&slide, w, h, FilterType::Triangle)
    };

    let x = i64::from((width - scaled.width()) / 2);
    let y = i64::from((height - scaled.height()) / 2);
    image::imageops::overlay(&mut canvas, &scaled, x, y);
    Ok(canvas.into_raw())
}

fn ensure_parent_dir(path: &Path) -> DeckcastResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })
                .map_err(DeckcastError::Other)?;
        }
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_rounds_and_never_drops_to_zero() {
        assert_eq!(frame_count(10.0, 30), 300);
        assert_eq!(frame_count(5.2, 30), 156);
        assert_eq!(frame_count(0.001, 30), 1);
    }

    #[test]
    fn frames_to_samples_is_monotonic_and_exact_at_integers() {
        assert_eq!(frames_to_samples(30, 30), 48_000);
        assert_eq!(frames_to_samples(0, 30), 0);
        let a = frames_to_samples(100, 30);
        let b = frames_to_samples(101, 30);
        assert!(b > a);
    }

    #[test]
    fn compose_frame_letterboxes_smaller_slide() {
        let slide = image::RgbaImage::from_pixel(10, 10, image::Rgba([255, 255, 255, 255]));
        let mut png = Vec::new();
        slide
            .write_to(
                &mut std::io::Cursor::new(&mut png),
                image::ImageFormat::Png,
            )
            .unwrap();

        let frame = compose_frame(&png, 40, 20, [0, 0, 0]).unwrap();
        assert_eq!(frame.len(), 40 * 20 * 4);
        // Top-left corner is background, center is slide content.
        assert_eq!(&frame[0..4], &[0, 0, 0, 255]);
        let center = ((10 * 40) + 20) * 4;
        assert_eq!(&frame[center..center + 4], &[255, 255, 255, 255]);
    }

    #[test]
    fn compose_frame_rejects_garbage_png() {
        assert!(compose_frame(b"not a png", 16, 16, [0, 0, 0]).is_err());
    }
}
