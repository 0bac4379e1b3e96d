//! Frame producers and the single-slot hand-off to the render thread.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use depthframe::{ChannelOrder, ColorFrame, DepthFrame, FrameDims, PixelFormat, RawFrame};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// One depth map and its aligned color image.
#[derive(Debug, Clone)]
pub struct FramePair {
    pub depth: DepthFrame,
    pub color: ColorFrame,
}

/// Latest-frame-wins mailbox with room for a single pair.
///
/// Posting while a pair is still waiting evicts the stale pair, so the render
/// thread always sees the newest frame and never a backlog.
#[derive(Clone)]
pub struct FrameMailbox {
    tx: Sender<FramePair>,
    rx: Receiver<FramePair>,
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameMailbox {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    /// Posts `pair`, returning `true` if an unconsumed pair was dropped.
    pub fn post(&self, pair: FramePair) -> bool {
        let mut pending = pair;
        let mut evicted = false;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return evicted,
                Err(TrySendError::Full(back)) => {
                    evicted |= self.rx.try_recv().is_ok();
                    pending = back;
                }
                // Unreachable while `self` holds a receiver.
                Err(TrySendError::Disconnected(_)) => return evicted,
            }
        }
    }

    pub fn take_latest(&self) -> Option<FramePair> {
        self.rx.try_recv().ok()
    }
}

/// Animated ripple surface with a matching BGR gradient, for running without
/// a capture device.
pub fn synthetic_pair(dims: FrameDims, t: f32) -> Result<FramePair> {
    let (w, h) = (dims.width as usize, dims.height as usize);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);

    let mut depth = Vec::with_capacity(w * h);
    let mut color = Vec::with_capacity(w * h * 3);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let r = (dx * dx + dy * dy).sqrt();
            let z = (r * 0.05 - t).sin() * 20.0;
            depth.push(z);

            let shade = ((z + 20.0) / 40.0 * 255.0) as u8;
            let blue = (x * 255 / w.max(1)) as u8;
            let green = (y * 255 / h.max(1)) as u8;
            color.extend_from_slice(&[blue, green, shade]);
        }
    }

    Ok(FramePair {
        depth: DepthFrame::new(dims.width, dims.height, depth)?,
        color: ColorFrame::new(dims.width, dims.height, ChannelOrder::Bgr, color)?,
    })
}

/// Loads a color image and an optional raw `f32` depth grid.
///
/// Both must already have the configured size; nothing is resized.
pub fn load_static_pair(dims: FrameDims, color_path: &Path, depth_path: Option<&Path>) -> Result<FramePair> {
    let rgb = image::open(color_path)
        .with_context(|| format!("Failed to open color image {}", color_path.display()))?
        .to_rgb8();
    let raw_color = RawFrame::new(rgb.width(), rgb.height(), PixelFormat::Rgb8, rgb.into_raw());
    let color = ColorFrame::from_raw(raw_color)
        .with_context(|| format!("Unusable color image {}", color_path.display()))?;
    color
        .validate_against(dims)
        .with_context(|| format!("Color image {} has the wrong size", color_path.display()))?;

    let depth = match depth_path {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read depth file {}", path.display()))?;
            let raw = RawFrame::new(dims.width, dims.height, PixelFormat::Depth32F, bytes);
            DepthFrame::from_raw(raw)
                .with_context(|| format!("Unusable depth file {}", path.display()))?
        }
        None => DepthFrame::zeros(dims)?,
    };

    Ok(FramePair { depth, color })
}

fn frame_interval(fps: f64) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(0.1))
}

/// Posts a new synthetic pair every `1 / fps` seconds until `stop` is set.
pub fn spawn_synthetic(
    dims: FrameDims,
    fps: f64,
    mailbox: FrameMailbox,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let interval = frame_interval(fps);
        let mut t = 0.0f32;
        log::info!("Synthetic source started ({} @ {:.1} fps)", dims, fps);

        while !stop.load(Ordering::Relaxed) {
            match synthetic_pair(dims, t) {
                Ok(pair) => {
                    if mailbox.post(pair) {
                        log::trace!("Dropped stale frame (render thread busy)");
                    }
                }
                Err(e) => {
                    log::error!("Synthetic source failed: {:#}", e);
                    return;
                }
            }
            t += interval.as_secs_f32() * 2.0;
            thread::sleep(interval);
        }

        log::info!("Synthetic source stopped");
    })
}

/// Re-posts the same pair at `fps`, standing in for a live device.
pub fn spawn_static(
    pair: FramePair,
    fps: f64,
    mailbox: FrameMailbox,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let interval = frame_interval(fps);
        log::info!("Static source started ({} @ {:.1} fps)", pair.depth.dims(), fps);

        while !stop.load(Ordering::Relaxed) {
            mailbox.post(pair.clone());
            thread::sleep(interval);
        }

        log::info!("Static source stopped");
    })
}
