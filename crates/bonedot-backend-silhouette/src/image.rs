//! RGBA raster images and PNG decoding.
//!
//! Every PNG color type and bit depth is normalized to 8-bit RGBA on load.
//! Images without an alpha channel decode as fully opaque.

use std::io::Cursor;
use std::path::Path;

use png::{BitDepth, ColorType, Encoder, Transformations};

use crate::error::{SilhouetteError, SilhouetteResult};

/// An 8-bit RGBA image stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl RasterImage {
    /// Wraps an RGBA8 buffer of `width * height * 4` bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> SilhouetteResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(SilhouetteError::SizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_rgba8(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA of the pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }

    /// Alpha of the pixel at `(x, y)`. Panics when out of bounds.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.rgba[(y as usize * self.width as usize + x as usize) * 4 + 3]
    }
}

/// Decodes PNG bytes into an RGBA image.
pub fn decode_png(bytes: &[u8]) -> SilhouetteResult<RasterImage> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| SilhouetteError::decode(format!("failed to read PNG header: {}", e)))?;

    let mut pixels = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut pixels)
        .map_err(|e| SilhouetteError::decode(format!("failed to decode PNG frame: {}", e)))?;
    pixels.truncate(info.buffer_size());

    let channels = match info.color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => {
            return Err(SilhouetteError::decode("indexed PNG was not expanded"));
        }
    };

    let rgba = if channels == 4 {
        pixels
    } else {
        let mut out = Vec::with_capacity(pixels.len() / channels * 4);
        for px in pixels.chunks_exact(channels) {
            let rgba = match channels {
                1 => [px[0], px[0], px[0], 255],
                2 => [px[0], px[0], px[0], px[1]],
                _ => [px[0], px[1], px[2], 255],
            };
            out.extend_from_slice(&rgba);
        }
        out
    };

    RasterImage::from_rgba8(info.width, info.height, rgba)
}

/// Reads and decodes a PNG file.
pub fn load_png(path: &Path) -> SilhouetteResult<RasterImage> {
    if !path.exists() {
        return Err(SilhouetteError::ImageNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path)?;
    decode_png(&bytes)
}

/// Reads only the PNG header and returns `(width, height)`.
pub fn png_dimensions(path: &Path) -> SilhouetteResult<(u32, u32)> {
    if !path.exists() {
        return Err(SilhouetteError::ImageNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = std::io::BufReader::new(std::fs::File::open(path)?);
    let reader = png::Decoder::new(file)
        .read_info()
        .map_err(|e| SilhouetteError::decode(format!("failed to read PNG header: {}", e)))?;
    let info = reader.info();
    Ok((info.width, info.height))
}

/// Encodes an image as an 8-bit RGBA PNG.
pub fn encode_png(image: &RasterImage) -> SilhouetteResult<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = Encoder::new(&mut out, image.width, image.height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(|e| SilhouetteError::Encode {
            message: e.to_string(),
        })?;
        writer
            .write_image_data(&image.rgba)
            .map_err(|e| SilhouetteError::Encode {
                message: e.to_string(),
            })?;
    }
    Ok(out)
}
