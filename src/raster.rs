//! Pixel buffers and texture sources.
//!
//! [`Raster`] is the owned pixel buffer everything composes into: row-major
//! `0xAARRGGBB`, with clipped alpha-blending blits and nearest-neighbor
//! scaling. [`RasterSource`] is the capability the rest of the crate consumes
//! for textures and backgrounds — the core only ever asks a source to
//! re-target its size and hand back the current image. Decoding files, text,
//! or in-memory images into sources is the host's job; the one built-in
//! source is [`SolidSource`], a uniform color at any size.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::fmt;

/// Error returned by [`Raster::blit`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RasterError {
    /// The source buffer does not hold `width * height` pixels.
    #[error("malformed raster: {actual} pixels for {width}x{height} (expected {expected})")]
    Malformed {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// An owned pixel buffer, row-major `0xAARRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Raster {
    /// A fully transparent buffer of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /// A buffer of the given size with every pixel set to `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Build a raster from raw parts without validating the pixel count.
    ///
    /// Intended for sources that own their buffers; a mismatched length is
    /// caught later by [`Raster::blit`].
    #[must_use]
    pub fn from_parts(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        Self { width, height, pixels }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel at (x, y), or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y as usize) * self.width as usize + x as usize).copied()
    }

    /// Draw `src` onto this buffer with its top-left corner at (x, y).
    ///
    /// Placement may be negative or extend past the buffer; out-of-bounds
    /// pixels are clipped. Source pixels are alpha-blended over the
    /// destination.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Malformed`] if either buffer does not match
    /// its declared dimensions. The destination is untouched in that case.
    pub fn blit(&mut self, src: &Raster, x: i32, y: i32) -> Result<(), RasterError> {
        src.validate()?;
        self.validate()?;

        for sy in 0..src.height {
            let Some(dy) = checked_dest(y, sy, self.height) else {
                continue;
            };
            let src_row = sy as usize * src.width as usize;
            let dst_row = dy as usize * self.width as usize;
            for sx in 0..src.width {
                let Some(dx) = checked_dest(x, sx, self.width) else {
                    continue;
                };
                let di = dst_row + dx as usize;
                self.pixels[di] = blend(src.pixels[src_row + sx as usize], self.pixels[di]);
            }
        }
        Ok(())
    }

    /// Nearest-neighbor resample to the given size.
    #[must_use]
    pub fn scaled(&self, width: u32, height: u32) -> Raster {
        if width == 0 || height == 0 || self.width == 0 || self.height == 0 {
            return Raster::new(width, height);
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for oy in 0..height {
            let sy = (u64::from(oy) * u64::from(self.height) / u64::from(height)) as u32;
            let row = sy as usize * self.width as usize;
            for ox in 0..width {
                let sx = (u64::from(ox) * u64::from(self.width) / u64::from(width)) as u32;
                pixels.push(self.pixels[row + sx as usize]);
            }
        }
        Raster { width, height, pixels }
    }

    /// Check that the pixel buffer matches the declared dimensions.
    fn validate(&self) -> Result<(), RasterError> {
        let expected = self.width as usize * self.height as usize;
        if self.pixels.len() == expected {
            Ok(())
        } else {
            Err(RasterError::Malformed {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixels.len(),
            })
        }
    }

    /// A copy with every pixel's alpha channel multiplied by `factor`
    /// (clamped to 0..=1). Color channels are untouched.
    #[must_use]
    pub fn with_alpha(&self, factor: f32) -> Raster {
        let factor = factor.clamp(0.0, 1.0);
        let pixels = self
            .pixels
            .iter()
            .map(|&p| {
                let a = (p >> 24) as f32 * factor;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let a = a.round() as u32;
                (a << 24) | (p & 0x00FF_FFFF)
            })
            .collect();
        Raster { width: self.width, height: self.height, pixels }
    }
}

/// Destination coordinate for source offset `s` placed at `origin`, or `None`
/// when it falls outside `0..limit`.
fn checked_dest(origin: i32, s: u32, limit: u32) -> Option<u32> {
    let d = i64::from(origin) + i64::from(s);
    if d < 0 || d >= i64::from(limit) {
        return None;
    }
    u32::try_from(d).ok()
}

/// Alpha-blend `src` over `dst` (both `0xAARRGGBB`).
fn blend(src: u32, dst: u32) -> u32 {
    let sa = (src >> 24) & 0xFF;
    if sa == 0xFF {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mix = |shift: u32| {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        ((s * sa + d * inv + 127) / 255) & 0xFF
    };
    let da = (dst >> 24) & 0xFF;
    let a = sa + (da * inv + 127) / 255;
    (a.min(255) << 24) | (mix(16) << 16) | (mix(8) << 8) | mix(0)
}

/// A sized texture the compositor can read.
///
/// Sources are stateful: [`resize`](RasterSource::resize) re-targets the
/// output size and [`image`](RasterSource::image) returns the current raster
/// at that size. `clone_box` lets items be copied by value, so scene
/// snapshots never alias a live source.
pub trait RasterSource: Send + fmt::Debug {
    /// Re-target the source's output size. Subsequent [`image`](RasterSource::image)
    /// calls return a raster of exactly this size.
    fn resize(&mut self, width: u32, height: u32);

    /// The current raster at the last-resized size.
    fn image(&self) -> Raster;

    /// A deep, independently-owned copy of this source.
    fn clone_box(&self) -> Box<dyn RasterSource>;
}

impl Clone for Box<dyn RasterSource> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A uniform-color source. Resizing is free; the raster is synthesized on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidSource {
    color: u32,
    width: u32,
    height: u32,
}

impl SolidSource {
    /// A 1×1 source of the given `0xAARRGGBB` color.
    #[must_use]
    pub fn new(color: u32) -> Self {
        Self { color, width: 1, height: 1 }
    }

    #[must_use]
    pub fn color(&self) -> u32 {
        self.color
    }
}

impl RasterSource for SolidSource {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn image(&self) -> Raster {
        Raster::filled(self.width, self.height, self.color)
    }

    fn clone_box(&self) -> Box<dyn RasterSource> {
        Box::new(self.clone())
    }
}
