//! Moore-neighbor contour tracing.
//!
//! The tracer walks the outer boundary of the first opaque region found in a
//! row-major scan. Each step probes the eight neighbors clockwise, starting
//! just past the direction it arrived from, and moves to the first opaque
//! one. The walk ends when it returns to the start pixel or when the start
//! pixel has no opaque neighbor at all.
//!
//! Masks with checkerboard patterns or one-pixel-wide diagonal strands can
//! make the walk skip a concavity or run out along a spur and back. Those
//! masks produce a valid but imperfect outline.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::mask::OpacityMask;

/// Integer pixel coordinate, `y` growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
}

impl Pixel {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// True when `other` is one of the eight neighbors of `self`.
    pub fn is_neighbor(&self, other: &Pixel) -> bool {
        let dx = (self.x as i64 - other.x as i64).abs();
        let dy = (self.y as i64 - other.y as i64).abs();
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}

impl From<(u32, u32)> for Pixel {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Neighbor offsets, clockwise from north-west: NW, N, NE, E, SE, S, SW, W.
pub const DIRECTIONS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Back-direction the walk starts with (west).
const INITIAL_BACK_DIRECTION: usize = 7;

/// An ordered boundary path. The first pixel closes the loop and is not
/// repeated at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Pixel>,
    truncated: bool,
}

impl Contour {
    pub fn points(&self) -> &[Pixel] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the walk hit its step bound before closing.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pixel> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a Contour {
    type Item = &'a Pixel;
    type IntoIter = std::slice::Iter<'a, Pixel>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// First opaque pixel, in row-major order, with a transparent or
/// out-of-bounds neighbor.
pub fn find_start(mask: &OpacityMask) -> Option<Pixel> {
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            let (xi, yi) = (x as i64, y as i64);
            if !mask.is_opaque(xi, yi) {
                continue;
            }
            let on_boundary = DIRECTIONS
                .iter()
                .any(|(dx, dy)| !mask.is_opaque(xi + dx, yi + dy));
            if on_boundary {
                return Some(Pixel::new(x, y));
            }
        }
    }
    None
}

/// Traces the outer boundary of the first opaque region in `mask`.
///
/// Returns an empty contour when the mask has no opaque boundary pixel.
pub fn trace(mask: &OpacityMask) -> Contour {
    let Some(start) = find_start(mask) else {
        debug!("No opaque boundary pixel, contour is empty");
        return Contour::default();
    };

    let max_steps = 8 * mask.width() as usize * mask.height() as usize;
    let mut points = vec![start];
    let mut current = start;
    let mut back = INITIAL_BACK_DIRECTION;
    let mut truncated = false;

    for step in 0.. {
        if step >= max_steps {
            warn!(
                start_x = start.x,
                start_y = start.y,
                steps = max_steps,
                "Contour walk did not close, returning partial contour"
            );
            truncated = true;
            break;
        }

        let (cx, cy) = (current.x as i64, current.y as i64);
        let next = (1..=8).map(|i| (back + i) % 8).find(|&d| {
            let (dx, dy) = DIRECTIONS[d];
            mask.is_opaque(cx + dx, cy + dy)
        });
        let Some(dir) = next else {
            break;
        };

        let (dx, dy) = DIRECTIONS[dir];
        // is_opaque guarantees the neighbor is in bounds
        let pixel = Pixel::new((cx + dx) as u32, (cy + dy) as u32);
        back = (dir + 4) % 8;

        if pixel == start {
            break;
        }
        points.push(pixel);
        current = pixel;
    }

    debug!(
        points = points.len(),
        start_x = start.x,
        start_y = start.y,
        "Traced contour"
    );

    Contour { points, truncated }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn square(size: u32, x0: u32, y0: u32, side: u32) -> OpacityMask {
        OpacityMask::from_fn(size, size, |x, y| {
            x >= x0 && x < x0 + side && y >= y0 && y < y0 + side
        })
    }

    fn assert_eight_connected(contour: &Contour) {
        for pair in contour.points().windows(2) {
            assert!(
                pair[0].is_neighbor(&pair[1]),
                "{:?} and {:?} are not neighbors",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_empty_mask() {
        let mask = OpacityMask::from_fn(10, 10, |_, _| false);
        let contour = trace(&mask);
        assert!(contour.is_empty());
        assert!(!contour.is_truncated());
    }

    #[test]
    fn test_isolated_pixel() {
        let mask = OpacityMask::from_rows(&["...", ".#.", "..."]);
        let contour = trace(&mask);
        assert_eq!(contour.points(), &[Pixel::new(1, 1)]);
    }

    #[test]
    fn test_three_by_three() {
        let mask = OpacityMask::from_rows(&[".....", ".###.", ".###.", ".###.", "....."]);
        let contour = trace(&mask);
        assert_eq!(
            contour.points(),
            &[
                Pixel::new(1, 1),
                Pixel::new(2, 1),
                Pixel::new(3, 1),
                Pixel::new(3, 2),
                Pixel::new(3, 3),
                Pixel::new(2, 3),
                Pixel::new(1, 3),
                Pixel::new(1, 2),
            ]
        );
    }

    #[test]
    fn test_square_boundary() {
        let mask = square(100, 25, 25, 50);
        let contour = trace(&mask);

        assert_eq!(contour.len(), 196);
        assert_eq!(contour.points()[0], Pixel::new(25, 25));
        assert_eq!(contour.points()[1], Pixel::new(26, 25));
        assert!(!contour.is_truncated());
        assert_eight_connected(&contour);
        assert!(contour.points()[0].is_neighbor(contour.points().last().unwrap()));

        let traced: BTreeSet<Pixel> = contour.iter().copied().collect();
        let boundary: BTreeSet<Pixel> = (25..75)
            .flat_map(|y| (25..75).map(move |x| Pixel::new(x, y)))
            .filter(|p| p.x == 25 || p.x == 74 || p.y == 25 || p.y == 74)
            .collect();
        assert_eq!(traced, boundary);
    }

    #[test]
    fn test_full_image_is_bounded_by_edges() {
        let mask = OpacityMask::from_fn(4, 4, |_, _| true);
        let contour = trace(&mask);
        assert_eq!(contour.len(), 12);
        assert_eq!(contour.points()[0], Pixel::new(0, 0));
    }

    #[test]
    fn test_first_region_only() {
        let mask = OpacityMask::from_rows(&["##....", "##....", "....##", "....##"]);
        let contour = trace(&mask);
        assert_eq!(contour.len(), 4);
        assert!(contour.iter().all(|p| p.x < 2 && p.y < 2));
    }

    #[test]
    fn test_spur_is_walked_out_and_back() {
        let mask = OpacityMask::from_rows(&["###"]);
        let contour = trace(&mask);
        assert_eq!(
            contour.points(),
            &[
                Pixel::new(0, 0),
                Pixel::new(1, 0),
                Pixel::new(2, 0),
                Pixel::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_diamond_is_eight_connected() {
        let mask = OpacityMask::from_fn(21, 21, |x, y| {
            (x as i64 - 10).abs() + (y as i64 - 10).abs() <= 7
        });
        let contour = trace(&mask);
        assert!(!contour.is_empty());
        assert_eq!(contour.points()[0], Pixel::new(10, 3));
        assert_eight_connected(&contour);
    }
}
