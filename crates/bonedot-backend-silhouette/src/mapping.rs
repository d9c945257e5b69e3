//! Pixel to object-local coordinate mapping.
//!
//! A sprite of W×H pixels at scale `s` spans `W·s` by `H·s` units centered on
//! the object origin. Image `y` grows downwards while local `y` grows up.

use serde::{Deserialize, Serialize};

use crate::contour::Pixel;

/// A point in object-local sprite space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
}

impl LocalPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Maps pixels of a fixed-size image into local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelMapper {
    width: f64,
    height: f64,
    scale: f64,
}

impl PixelMapper {
    /// Mapper for a `width`×`height` image at `scale` units per pixel.
    pub fn new(width: u32, height: u32, scale: f64) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
            scale,
        }
    }

    /// `u = x/W`, `v = 1 - y/H`, local = `((u - 0.5)·W·s, (v - 0.5)·H·s)`.
    pub fn map(&self, pixel: Pixel) -> LocalPoint {
        let u = pixel.x as f64 / self.width;
        let v = 1.0 - pixel.y as f64 / self.height;
        LocalPoint::new(
            (u - 0.5) * self.width * self.scale,
            (v - 0.5) * self.height * self.scale,
        )
    }

    pub fn map_all(&self, pixels: &[Pixel]) -> Vec<LocalPoint> {
        pixels.iter().map(|p| self.map(*p)).collect()
    }

    /// Inverse of [`map`](Self::map), returning fractional pixel coordinates.
    pub fn unmap(&self, point: LocalPoint) -> (f64, f64) {
        let u = point.x / (self.width * self.scale) + 0.5;
        let v = point.y / (self.height * self.scale) + 0.5;
        (u * self.width, (1.0 - v) * self.height)
    }

    /// Local-space box covered by the image, as `(min, max)` corners.
    pub fn bounds(&self) -> (LocalPoint, LocalPoint) {
        let hw = self.width * self.scale / 2.0;
        let hh = self.height * self.scale / 2.0;
        (LocalPoint::new(-hw, -hh), LocalPoint::new(hw, hh))
    }
}
