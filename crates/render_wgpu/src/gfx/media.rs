//! Media sources for the dome screen: stills, a test pattern, and
//! pre-decoded frame sequences. No codec work happens here; a "video" is a
//! directory of stills played back at a fixed rate.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no frames under {0}")]
    EmptySequence(PathBuf),
}

/// Decode a still image to RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, MediaError> {
    let img = image::open(path).map_err(|source| MediaError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Downscale to the device texture limit, preserving aspect. Images within
/// the limit pass through untouched.
#[must_use]
pub fn clamp_to_device_limit(img: RgbaImage, max_dim: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w <= max_dim && h <= max_dim {
        return img;
    }
    let scale = max_dim as f32 / w.max(h) as f32;
    let nw = ((w as f32 * scale) as u32).max(1);
    let nh = ((h as f32 * scale) as u32).max(1);
    log::warn!("media {w}x{h} exceeds device limit {max_dim}; scaling to {nw}x{nh}");
    image::imageops::resize(&img, nw, nh, image::imageops::FilterType::Triangle)
}

/// Polar alignment grid used before any media is loaded and as a projection
/// check: concentric rings plus radial spokes around the dome zenith.
#[must_use]
pub fn test_pattern(size: u32) -> RgbaImage {
    let size = size.max(64);
    let center = size as f32 * 0.5;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = (x as f32 + 0.5 - center) / center;
        let dy = (y as f32 + 0.5 - center) / center;
        let r = (dx * dx + dy * dy).sqrt();
        if r > 1.0 {
            return image::Rgba([0, 0, 0, 255]);
        }
        let ring = (r * 10.0).fract() < 0.08;
        let spoke = (dy.atan2(dx) / std::f32::consts::TAU * 24.0).fract().abs() < 0.02;
        if ring || spoke {
            image::Rgba([230, 230, 230, 255])
        } else {
            let g = 30 + (40.0 * (1.0 - r)) as u8;
            image::Rgba([g / 2, g / 2, g, 255])
        }
    })
}

/// A directory of stills played back at a fixed rate, looping.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<RgbaImage>,
    fps: f32,
    clock: f32,
    current: Option<usize>,
}

impl FrameSequence {
    #[must_use]
    pub fn from_frames(frames: Vec<RgbaImage>, fps: f32) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            frames,
            fps: fps.max(0.1),
            clock: 0.0,
            current: None,
        })
    }

    /// Decode every image file under `dir` in name order.
    pub fn from_dir(dir: &Path, fps: f32) -> Result<Self, MediaError> {
        let entries = std::fs::read_dir(dir).map_err(|source| MediaError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("png" | "jpg" | "jpeg" | "bmp")
                )
            })
            .collect();
        paths.sort();
        let mut frames = Vec::with_capacity(paths.len());
        for p in paths {
            frames.push(load_image(&p)?);
        }
        Self::from_frames(frames, fps).ok_or_else(|| MediaError::EmptySequence(dir.to_path_buf()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Advance the playback clock; returns the frame to display when it
    /// changed since the last call, so callers only re-upload on change.
    pub fn advance(&mut self, dt: f32) -> Option<&RgbaImage> {
        self.clock += dt.max(0.0);
        let idx = ((self.clock * self.fps) as usize) % self.frames.len();
        if self.current == Some(idx) {
            return None;
        }
        self.current = Some(idx);
        Some(&self.frames[idx])
    }
}
