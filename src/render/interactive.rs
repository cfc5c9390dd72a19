//! Interactive renderer: emits a single self-contained HTML document that
//! reproduces the timeline client-side.
//!
//! Every slide image and bound clip is embedded as a base64 data URI, so the
//! artifact opens from disk with no external dependencies. The embedded
//! script is a small stopped/playing/paused state machine; slide advance is
//! driven by audio end (or a duration timer for unbound slides), never by
//! the cosmetic progress clock.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use tracing::info;

use crate::foundation::error::{DeckcastError, DeckcastResult};
use crate::timeline::Timeline;

/// Per-slide payload serialized into the document.
#[derive(Serialize)]
struct SlidePayload {
    slide_index: u32,
    duration_ms: f64,
    start_ms: f64,
    image_src: String,
    audio_src: Option<String>,
}

/// Render the timeline as a standalone HTML slideshow document.
pub fn render_html(timeline: &Timeline) -> DeckcastResult<String> {
    let payloads: Vec<SlidePayload> = timeline
        .iter_with_offsets()
        .map(|(entry, start)| SlidePayload {
            slide_index: entry.slide_index,
            duration_ms: entry.duration_seconds * 1000.0,
            start_ms: start * 1000.0,
            image_src: format!(
                "data:image/png;base64,{}",
                BASE64.encode(&entry.image.png_bytes)
            ),
            audio_src: entry.audio.as_ref().map(|bound| {
                format!(
                    "data:{};base64,{}",
                    bound.clip.format.mime(),
                    BASE64.encode(&bound.clip.bytes)
                )
            }),
        })
        .collect();

    let slides_json = serde_json::to_string(&payloads)
        .map_err(|e| DeckcastError::validation(format!("slide manifest serialization: {e}")))?;

    let total_ms = timeline.total_duration_seconds() * 1000.0;
    let total_secs = timeline.total_duration_seconds() as u64;
    let total_label = format!("{:02}:{:02}", total_secs / 60, total_secs % 60);

    let html = TEMPLATE
        .replace("__SLIDES_JSON__", &slides_json)
        .replace("__SLIDE_COUNT__", &timeline.entries().len().to_string())
        .replace("__TOTAL_MS__", &format!("{total_ms:.3}"))
        .replace("__TOTAL_LABEL__", &total_label);

    info!(
        slides = timeline.entries().len(),
        bytes = html.len(),
        "rendered interactive slideshow"
    );
    Ok(html)
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Slideshow</title>
<style>
  body { margin: 0; padding: 20px; font-family: Arial, sans-serif; background: #000;
         color: white; display: flex; flex-direction: column; align-items: center;
         min-height: 100vh; }
  .slideshow-container { position: relative; max-width: 90vw; max-height: 80vh;
         margin: auto; background: white; border-radius: 10px; overflow: hidden; }
  .slide { display: none; width: 100%; height: auto; }
  .slide.active { display: block; }
  .slide img { width: 100%; height: auto; display: block; }
  .controls { margin: 20px 0; text-align: center; }
  .controls button { background: #007bff; color: white; border: none; padding: 10px 20px;
         margin: 0 5px; border-radius: 5px; cursor: pointer; font-size: 16px; }
  .controls button:hover { background: #0056b3; }
  .progress-bar { width: 80%; height: 6px; background: #ddd; border-radius: 3px;
         margin: 10px 0; overflow: hidden; }
  .progress { height: 100%; background: #007bff; width: 0%; }
  .slide-info { margin: 10px 0; font-size: 18px; }
  .duration-info { margin: 5px 0; font-size: 14px; color: #ccc; }
</style>
</head>
<body>
<div class="slideshow-container"><div id="slides"></div></div>
<div class="slide-info"><span id="slide-counter">Slide 1 of __SLIDE_COUNT__</span></div>
<div class="progress-bar"><div class="progress" id="progress"></div></div>
<div class="duration-info"><span id="time-info">00:00 / __TOTAL_LABEL__</span></div>
<div class="controls">
  <button onclick="previousSlide()">&#9194; Previous</button>
  <button id="playBtn" onclick="togglePlay()">&#9654; Play</button>
  <button onclick="nextSlide()">Next &#9193;</button>
  <button onclick="resetShow()">&#128260; Reset</button>
</div>
<script>
const slidesData = __SLIDES_JSON__;
const totalMs = __TOTAL_MS__;

// State machine: 'stopped' | 'playing' | 'paused'.
let state = 'stopped';
let currentSlide = 0;
let currentAudio = null;
let advanceTimer = null;
let playStartedAt = 0;
let progressRaf = null;

function initSlides() {
  const container = document.getElementById('slides');
  slidesData.forEach((slide, index) => {
    const div = document.createElement('div');
    div.className = index === 0 ? 'slide active' : 'slide';
    const img = document.createElement('img');
    img.src = slide.image_src;
    img.alt = 'Slide ' + slide.slide_index;
    div.appendChild(img);
    container.appendChild(div);
  });
}

// Cancel any in-flight audio or timer before anything else starts. This is
// what guarantees a single advance trigger per slide.
function silence() {
  if (currentAudio) { currentAudio.pause(); currentAudio = null; }
  if (advanceTimer) { clearTimeout(advanceTimer); advanceTimer = null; }
}

function showSlide(n) {
  currentSlide = Math.min(Math.max(n, 0), slidesData.length - 1);
  document.querySelectorAll('.slide').forEach((el, i) => {
    el.classList.toggle('active', i === currentSlide);
  });
  document.getElementById('slide-counter').textContent =
    'Slide ' + (currentSlide + 1) + ' of ' + slidesData.length;
}

function startCurrentSlide() {
  silence();
  const slide = slidesData[currentSlide];
  if (slide.audio_src) {
    currentAudio = new Audio(slide.audio_src);
    currentAudio.onended = () => {
      if (state !== 'playing') return;
      advanceTimer = setTimeout(advance, 100);
    };
    currentAudio.play().catch(() => {});
  } else {
    advanceTimer = setTimeout(() => {
      if (state === 'playing') advance();
    }, slide.duration_ms);
  }
}

function advance() {
  if (currentSlide < slidesData.length - 1) {
    showSlide(currentSlide + 1);
    startCurrentSlide();
  } else {
    // End of the last slide: stop, do not loop, do not reset position.
    stopPlayback();
  }
}

function nextSlide() {
  if (currentSlide < slidesData.length - 1) {
    showSlide(currentSlide + 1);
    if (state === 'playing') startCurrentSlide(); else silence();
  }
}

function previousSlide() {
  if (currentSlide > 0) {
    showSlide(currentSlide - 1);
    if (state === 'playing') startCurrentSlide(); else silence();
  }
}

function togglePlay() {
  if (state === 'playing') {
    state = 'paused';
    if (currentAudio) currentAudio.pause();
    if (advanceTimer) { clearTimeout(advanceTimer); advanceTimer = null; }
    document.getElementById('playBtn').innerHTML = '&#9654; Play';
  } else if (state === 'paused') {
    state = 'playing';
    if (currentAudio) {
      currentAudio.play().catch(() => {});
    } else {
      startCurrentSlide();
    }
    playStartedAt = Date.now() - elapsedAtSlideStart();
    document.getElementById('playBtn').innerHTML = '&#9208; Pause';
    updateProgress();
  } else {
    state = 'playing';
    playStartedAt = Date.now() - elapsedAtSlideStart();
    startCurrentSlide();
    document.getElementById('playBtn').innerHTML = '&#9208; Pause';
    updateProgress();
  }
}

function stopPlayback() {
  state = 'stopped';
  silence();
  if (progressRaf) { cancelAnimationFrame(progressRaf); progressRaf = null; }
  document.getElementById('playBtn').innerHTML = '&#9654; Play';
}

function resetShow() {
  stopPlayback();
  showSlide(0);
  document.getElementById('progress').style.width = '0%';
  document.getElementById('time-info').textContent = '00:00 / __TOTAL_LABEL__';
}

function elapsedAtSlideStart() {
  return slidesData[currentSlide].start_ms;
}

// Cosmetic only: the progress clock never drives slide advance, so clock
// drift can never cause a double-advance.
function updateProgress() {
  if (state !== 'playing') return;
  const elapsedMs = Math.min(Date.now() - playStartedAt, totalMs);
  document.getElementById('progress').style.width =
    (elapsedMs / totalMs * 100) + '%';
  const secs = Math.floor(elapsedMs / 1000);
  const label = String(Math.floor(secs / 60)).padStart(2, '0') + ':' +
    String(secs % 60).padStart(2, '0');
  document.getElementById('time-info').textContent = label + ' / __TOTAL_LABEL__';
  progressRaf = requestAnimationFrame(updateProgress);
}

document.addEventListener('keydown', (e) => {
  switch (e.key) {
    case 'ArrowLeft': previousSlide(); break;
    case 'ArrowRight': nextSlide(); break;
    case ' ': e.preventDefault(); togglePlay(); break;
    case 'Home': resetShow(); break;
  }
});

initSlides();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioClip, AudioFormat};
    use crate::slides::SlideImage;
    use crate::timeline::{BoundAudio, SlideEntry, Timeline};
    use std::path::PathBuf;

    fn timeline_with_audio_on_first() -> Timeline {
        let clip = AudioClip {
            source_name: "slide_1.mp3".into(),
            format: AudioFormat::Mp3,
            path: PathBuf::from("slide_1.mp3"),
            bytes: vec![0xAA, 0xBB],
        };
        let entries = vec![
            SlideEntry::new(
                1,
                SlideImage {
                    index: 1,
                    width: 8,
                    height: 8,
                    png_bytes: vec![1, 2, 3],
                },
                Some(BoundAudio {
                    clip,
                    duration_seconds: 5.0,
                }),
            ),
            SlideEntry::new(
                2,
                SlideImage {
                    index: 2,
                    width: 8,
                    height: 8,
                    png_bytes: vec![4, 5, 6],
                },
                None,
            ),
        ];
        Timeline::build(entries).unwrap()
    }

    #[test]
    fn html_is_self_contained() {
        let html = render_html(&timeline_with_audio_on_first()).unwrap();
        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains("data:audio/mpeg;base64,"));
        // No external references left behind.
        assert!(!html.contains("__SLIDES_JSON__"));
        assert!(!html.contains("__TOTAL_MS__"));
        assert!(!html.contains("src=\"http"));
    }

    #[test]
    fn html_embeds_timeline_offsets() {
        let html = render_html(&timeline_with_audio_on_first()).unwrap();
        assert!(html.contains("\"duration_ms\":5000.0"));
        assert!(html.contains("\"start_ms\":5000.0"));
        assert!(html.contains("\"duration_ms\":10000.0"));
        assert!(html.contains("Slide 1 of 2"));
    }

    #[test]
    fn state_machine_covers_all_states_and_stops_at_end() {
        let html = render_html(&timeline_with_audio_on_first()).unwrap();
        for token in ["'stopped'", "'playing'", "'paused'"] {
            assert!(html.contains(token), "missing state token {token}");
        }
        // End-of-deck stops without resetting the slide position.
        assert!(html.contains("stopPlayback();"));
        assert!(html.contains("do not loop, do not reset position"));
        // Starting a slide always silences the previous one first.
        assert!(html.contains("function startCurrentSlide() {\n  silence();"));
    }

    #[test]
    fn unbound_slide_has_null_audio() {
        let html = render_html(&timeline_with_audio_on_first()).unwrap();
        assert!(html.contains("\"audio_src\":null"));
    }
}
