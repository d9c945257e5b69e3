//! Stride subsampling of contours.

use crate::contour::Pixel;

/// Keeps every `stride`-th point starting with the first.
///
/// A stride of 0 is treated as 1. The result has `ceil(len / stride)` points.
pub fn simplify(points: &[Pixel], stride: usize) -> Vec<Pixel> {
    points.iter().step_by(stride.max(1)).copied().collect()
}
