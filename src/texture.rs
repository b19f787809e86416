use crate::math::Rgba;
use log::debug;
use std::path::Path;
use thiserror::Error;

/// Edge lengths a texture may have. Textures must also be square.
pub const ALLOWED_EDGES: [u32; 2] = [256, 512];

/// Why an image was refused for a texture slot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureRejected {
    #[error("image could not be decoded: {0}")]
    DecodeFailed(String),
    #[error("image must be 256x256 or 512x512, got {width}x{height}")]
    SizeInvalid { width: u32, height: u32 },
}

/// Checks that an image is square with an edge of 256 or 512 pixels
pub fn validate_size(width: u32, height: u32) -> Result<(), TextureRejected> {
    if width == height && ALLOWED_EDGES.contains(&width) {
        Ok(())
    } else {
        Err(TextureRejected::SizeInvalid { width, height })
    }
}

/// A decoded, validated RGBA8 texture
#[derive(Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Texture {
    /// Decodes an encoded image (PNG, JPEG or BMP) and validates its size
    pub fn decode(bytes: &[u8]) -> Result<Self, TextureRejected> {
        let image = image::load_from_memory(bytes)
            .map_err(|err| TextureRejected::DecodeFailed(err.to_string()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        debug!("decoded {}x{} image ({} bytes)", width, height, bytes.len());
        Self::from_rgba(width, height, image.into_raw())
    }

    /// Reads and decodes an image file. A file that cannot be read counts as
    /// a decode failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureRejected> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|err| TextureRejected::DecodeFailed(format!("{}: {}", path.display(), err)))?;
        Self::decode(&bytes)
    }

    /// Wraps raw RGBA8 pixels, rows top to bottom
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TextureRejected> {
        validate_size(width, height)?;
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TextureRejected::DecodeFailed(format!(
                "expected {} bytes of RGBA data, got {}",
                expected,
                pixels.len()
            )));
        }
        Ok(Texture {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texels carry no alpha; the image's own alpha channel is ignored
    fn texel(&self, x: i64, y: i64) -> Rgba {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        let offset = (y * self.width as usize + x) * 4;
        let p = &self.pixels[offset..offset + 4];
        [
            p[0] as f64 / 255.0,
            p[1] as f64 / 255.0,
            p[2] as f64 / 255.0,
            1.0,
        ]
    }

    /// Bilinear sample with repeat wrapping; `v = 0` is the bottom row.
    pub fn sample(&self, u: f64, v: f64) -> Rgba {
        let x = u * self.width as f64 - 0.5;
        let y = (1.0 - v) * self.height as f64 - 0.5;
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let a = self.texel(x0, y0);
        let b = self.texel(x0 + 1, y0);
        let c = self.texel(x0, y0 + 1);
        let d = self.texel(x0 + 1, y0 + 1);

        let mut out = [0.0; 4];
        for i in 0..4 {
            let top = a[i] * (1.0 - fx) + b[i] * fx;
            let bottom = c[i] * (1.0 - fx) + d[i] * fx;
            out[i] = top * (1.0 - fy) + bottom * fy;
        }
        out
    }
}
