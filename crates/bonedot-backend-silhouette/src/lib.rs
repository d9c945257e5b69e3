//! BoneDot silhouette backend
//!
//! Turns the alpha channel of a sprite image into a cutter mesh that splits
//! the sprite plane along its visible outline:
//!
//! 1. [`mask::build_mask`] thresholds alpha into an [`OpacityMask`]
//! 2. [`contour::trace`] walks the outer boundary with Moore-neighbor tracing
//! 3. [`simplify::simplify`] keeps every k-th contour point
//! 4. [`PixelMapper`] maps pixels into object-local space
//! 5. [`cutter::build_cutter_mesh`] builds a single-face planar mesh
//!
//! [`CutPipeline`] runs these steps per object against a [`CutHost`], which
//! owns the actual knife projection.
//!
//! The crate also holds the host-side sprite utilities that work on scene
//! documents: sprite quad import, UV-to-vertex sync and triangulation.
//!
//! # Example
//!
//! ```
//! use bonedot_backend_silhouette::{build_mask, simplify, trace, OpacityMask, PixelMapper};
//! use bonedot_backend_silhouette::image::RasterImage;
//!
//! let image = RasterImage::from_fn(8, 8, |x, y| {
//!     let a = if (2..6).contains(&x) && (2..6).contains(&y) { 255 } else { 0 };
//!     [0, 0, 0, a]
//! });
//! let contour = trace(&build_mask(&image, 1));
//! assert_eq!(contour.len(), 12);
//!
//! let kept = simplify(contour.points(), 4);
//! let local = PixelMapper::new(8, 8, 0.01).map_all(&kept);
//! assert_eq!(local.len(), 3);
//! ```

pub mod contour;
pub mod cutter;
pub mod error;
pub mod image;
pub mod mapping;
pub mod mask;
pub mod pipeline;
pub mod simplify;
pub mod sprite;
pub mod triangulate;
pub mod uv_sync;

pub use contour::{trace, Contour, Pixel};
pub use cutter::{build_cutter_mesh, CutterMesh, CutterPolygon};
pub use error::{SilhouetteError, SilhouetteResult};
pub use mapping::{LocalPoint, PixelMapper};
pub use mask::{build_mask, OpacityMask};
pub use pipeline::{
    inspect_scene, silhouette_polygon, validate_target, CutHost, CutPipeline, TargetInfo,
};
pub use simplify::simplify;
