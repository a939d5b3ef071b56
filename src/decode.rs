use crate::error::{HarnessError, Result};
use crate::memory::FrameView;
use crate::{BACKGROUND, FOREGROUND};
use itertools::Itertools;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub fn rgba(self) -> [u8; 4] {
        [self.0, self.1, self.2, 0xff]
    }
}

/// How a backend encodes the samples in its frame buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    /// One sample per display cell: nonzero is on, zero is off. Cells are drawn as
    /// `scale`×`scale` blocks.
    Monochrome,
    /// One sample per pixel, the gray level from 0 (black) to 255 (white).
    Grayscale,
}

/// Dimensions and encoding of a backend's display.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    /// Size in pixels of one monochrome cell. Grayscale displays ignore it.
    pub scale: usize,
}

impl Geometry {
    pub const fn monochrome(width: usize, height: usize, scale: usize) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Monochrome,
            scale,
        }
    }

    pub const fn grayscale(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Grayscale,
            scale: 1,
        }
    }

    /// Number of samples in one frame.
    pub fn samples(&self) -> usize {
        self.width * self.height
    }

    /// Size in pixels of the surface this display renders to.
    pub fn surface_size(&self) -> (usize, usize) {
        match self.format {
            PixelFormat::Monochrome => (self.width * self.scale, self.height * self.scale),
            PixelFormat::Grayscale => (self.width, self.height),
        }
    }
}

/// An RGBA pixel buffer that frames are decoded into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        let mut surface = Self {
            width,
            height,
            pixels: vec![0; 4 * width * height],
        };
        surface.clear(BACKGROUND);
        surface
    }

    pub fn for_geometry(geometry: &Geometry) -> Self {
        let (width, height) = geometry.surface_size();
        Self::new(width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The raw RGBA bytes, row by row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = 4 * (y * self.width + x);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn clear(&mut self, color: Color) {
        let rgba = color.rgba();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, color: Color) {
        let rgba = color.rgba();
        for row in y..y + height {
            let start = 4 * (row * self.width + x);
            for px in self.pixels[start..start + 4 * width].chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }
}

/// Renders one frame from `view` into `surface`.
///
/// The view has to hold exactly one frame of samples, and the surface has to be
/// sized for `geometry` (see [`Surface::for_geometry`]). Nothing is written otherwise.
pub fn decode(view: &FrameView<'_>, geometry: &Geometry, surface: &mut Surface) -> Result<()> {
    if view.len() != geometry.samples() {
        return Err(HarnessError::FrameSizeMismatch {
            expected: geometry.samples(),
            actual: view.len(),
        });
    }
    if (surface.width, surface.height) != geometry.surface_size() {
        return Err(HarnessError::SurfaceMismatch {
            expected: geometry.surface_size(),
            actual: (surface.width, surface.height),
        });
    }

    match geometry.format {
        PixelFormat::Monochrome => decode_monochrome(view.samples(), geometry, surface),
        PixelFormat::Grayscale => decode_grayscale(view.samples(), surface),
    }

    Ok(())
}

fn decode_monochrome(samples: &[u8], geometry: &Geometry, surface: &mut Surface) {
    // cells that were on last frame must not survive
    surface.clear(BACKGROUND);

    let scale = geometry.scale;
    for (y, x) in (0..geometry.height).cartesian_product(0..geometry.width) {
        if samples[y * geometry.width + x] != 0 {
            surface.fill_rect(x * scale, y * scale, scale, scale, FOREGROUND);
        }
    }
}

fn decode_grayscale(samples: &[u8], surface: &mut Surface) {
    for (px, &level) in surface.pixels.chunks_exact_mut(4).zip(samples) {
        px.copy_from_slice(&[level, level, level, 0xff]);
    }
}
