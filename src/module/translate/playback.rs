//! Frame composition and playback scheduling.
//!
//! Resolved sign entries are composed onto a fixed-size letterboxed canvas
//! once per conversion; the scheduler then steps through the sequence at a
//! fixed per-frame duration. One active sequence at a time, no looping; a
//! new conversion replaces the scheduler wholesale.

use std::time::{Duration, Instant};

use image::{imageops, imageops::FilterType, Rgb, RgbImage};

use super::resolve::{SignEntry, SignKind};
use crate::module::util::conf;

// Canvas background.
const CANVAS_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// A composed playback frame. The caption travels as metadata and is
/// surfaced by the front end alongside the image.
pub struct PlayFrame {
    pub label: String,
    pub image: RgbImage,
}

/// Compose one frame per resolved entry.
///
/// Pauses render a plain canvas. An entry whose image file is missing or
/// unreadable renders a `MISSING: <token>` placeholder frame instead of
/// aborting the sequence.
pub fn build_frames(entries: &[SignEntry], conf: &conf::Playback) -> Vec<PlayFrame> {
    entries.iter().map(|e| compose(e, conf)).collect()
}

fn compose(entry: &SignEntry, conf: &conf::Playback) -> PlayFrame {
    match (&entry.kind, &entry.image) {
        // Separator pauses carry "..."; a pause standing in for a token
        // keeps that token as its caption.
        (SignKind::Pause, _) | (_, None) => PlayFrame {
            label: entry.text.clone(),
            image: canvas(conf.width, conf.height),
        },
        (kind, Some(path)) => match image::open(path) {
            Ok(img) => PlayFrame {
                label: format!("{}: {}", kind.as_str().to_uppercase(), entry.text),
                image: letterbox(&img, conf.width, conf.height),
            },
            Err(e) => {
                log::warn!("Can't open example image {}: {}", path.display(), e);
                PlayFrame {
                    label: format!("MISSING: {}", entry.text),
                    image: canvas(conf.width, conf.height),
                }
            }
        },
    }
}

fn canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, CANVAS_COLOR)
}

/// Aspect-preserving downscale centered on the canvas. A source that
/// already fits is pasted at its native size, never upscaled.
fn letterbox(img: &image::DynamicImage, width: u32, height: u32) -> RgbImage {
    let scaled = if img.width() > width || img.height() > height {
        img.resize(width, height, FilterType::Lanczos3).to_rgb8()
    } else {
        img.to_rgb8()
    };
    let mut bg = canvas(width, height);
    let x = (width.saturating_sub(scaled.width()) / 2) as i64;
    let y = (height.saturating_sub(scaled.height()) / 2) as i64;
    imageops::overlay(&mut bg, &scaled, x, y);
    bg
}

/// Cooperative fixed-interval scheduler over a composed frame sequence.
///
/// The first frame is due immediately; each subsequent frame is due
/// exactly one frame duration after the previous one. The owner polls
/// `next_frame` with the current instant.
pub struct FrameScheduler {
    frames: Vec<PlayFrame>,
    index: usize,
    frame_duration: Duration,
    next_due: Instant,
}

impl FrameScheduler {
    pub fn new(frames: Vec<PlayFrame>, frame_duration: Duration, now: Instant) -> Self {
        Self {
            frames,
            index: 0,
            frame_duration,
            next_due: now,
        }
    }

    /// Returns the next frame once it is due, advancing the sequence.
    /// Returns `None` while the current frame still holds or after the
    /// sequence finished.
    pub fn next_frame(&mut self, now: Instant) -> Option<&PlayFrame> {
        if self.index >= self.frames.len() || now < self.next_due {
            return None;
        }
        let frame = &self.frames[self.index];
        self.index += 1;
        self.next_due += self.frame_duration;
        Some(frame)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.frames.len()
    }

    /// 1-based position of the last dispensed frame.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.frames.len()
    }
}
