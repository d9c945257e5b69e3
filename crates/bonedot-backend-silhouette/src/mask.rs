//! Opacity masks built from image alpha.

use crate::image::RasterImage;

/// A W×H boolean grid; `true` marks an opaque pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpacityMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl OpacityMask {
    /// Builds a mask from rows of `'#'` (opaque) and any other character.
    ///
    /// All rows must be the same length.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
        let cells = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// Builds a mask by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when `(x, y)` lies inside the grid and is opaque.
    ///
    /// Takes signed coordinates so neighbor probes can step off the edge.
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Number of opaque cells.
    pub fn opaque_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| !c)
    }
}

/// Thresholds image alpha: a pixel is opaque when `alpha >= threshold`.
pub fn build_mask(image: &RasterImage, threshold: u8) -> OpacityMask {
    OpacityMask::from_fn(image.width(), image.height(), |x, y| {
        image.alpha(x, y) >= threshold
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        let image = RasterImage::from_fn(4, 1, |x, _| [0, 0, 0, [0, 1, 127, 255][x as usize]]);

        let mask = build_mask(&image, 1);
        assert_eq!(mask.width(), 4);
        assert_eq!(mask.height(), 1);
        assert!(!mask.is_opaque(0, 0));
        assert!(mask.is_opaque(1, 0));
        assert_eq!(mask.opaque_count(), 3);

        let mask = build_mask(&image, 128);
        assert_eq!(mask.opaque_count(), 1);
        assert!(mask.is_opaque(3, 0));
    }

    #[test]
    fn test_out_of_bounds_is_transparent() {
        let mask = OpacityMask::from_rows(&["##", "##"]);
        assert!(mask.is_opaque(1, 1));
        assert!(!mask.is_opaque(-1, 0));
        assert!(!mask.is_opaque(0, 2));
        assert!(!mask.is_opaque(2, 0));
    }

    #[test]
    fn test_empty() {
        let image = RasterImage::from_fn(3, 3, |_, _| [255, 255, 255, 0]);
        assert!(build_mask(&image, 1).is_empty());
    }
}
