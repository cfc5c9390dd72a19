//! Deckcast converts a narrated PDF slide deck into a timed presentation.
//!
//! The pipeline is a strict downstream flow:
//!
//! 1. **Rasterize**: `PDF -> Vec<SlideImage>` (system `pdftoppm`, one image per page)
//! 2. **Bind**: pair each slide with at most one clip by the `slide_<N>.mp3|wav`
//!    naming convention and resolve its display duration (ffprobe, 10 s fallback)
//! 3. **Build**: fold the entries into an ordered, gapless [`Timeline`]
//! 4. **Render**: consume the timeline as an MP4 (system `ffmpeg`) or as a
//!    self-contained interactive HTML slideshow — both read the identical
//!    structure, so binding and duration policy can never diverge between them
//!
//! Fatal problems (unreadable document, empty timeline, broken encoder) abort
//! the run; everything recoverable degrades and accumulates into
//! [`ConvertReport::warnings`], so a run that loses audio still succeeds and
//! says so.
#![forbid(unsafe_code)]

pub mod audio;
pub mod convert;
pub mod foundation;
pub mod render;
pub mod report;
pub mod slides;
pub mod timeline;

pub use audio::bind::{DurationProbe, FfprobeDurationProbe, bind_audio};
pub use audio::{AudioClip, AudioFormat};
pub use convert::{ConvertRequest, OutputSelection, convert};
pub use foundation::error::{DeckcastError, DeckcastResult};
pub use render::interactive::render_html;
pub use render::package::write_bundle;
pub use render::video::{VideoConfig, is_ffmpeg_on_path, render_video};
pub use report::{ConvertReport, Warning};
pub use slides::{RASTER_ZOOM, SlideImage, is_pdftoppm_on_path, rasterize_pdf};
pub use timeline::{BoundAudio, DEFAULT_DURATION_SECONDS, SlideEntry, Timeline};
