//! Core types for PDF rendering and search

/// Page dimensions in PDF points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// US Letter, used as a fallback when a page reports empty bounds
    pub const LETTER: Self = Self::new(612.0, 792.0);
}

/// Axis-aligned rectangle.
///
/// Search hits are stored in page space (PDF points) and only scaled to
/// canvas pixels when drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl HitRect {
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Multiply every coordinate by `factor`
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            x0: self.x0 * factor,
            y0: self.y0 * factor,
            x1: self.x1 * factor,
            y1: self.y1 * factor,
        }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// A search match: page index plus the match rectangle on that page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchHit {
    pub page: usize,
    pub rect: HitRect,
}

/// Rendered page image.
///
/// Packed RGB, 3 bytes per pixel. One canvas pixel is half a terminal cell
/// vertically, so a cell row covers two pixel rows.
#[derive(Clone)]
pub struct PageImage {
    /// Raw RGB pixel data
    pub pixels: Vec<u8>,
    /// Image width in pixels
    pub width_px: u32,
    /// Image height in pixels
    pub height_px: u32,
    /// Page number (0-indexed)
    pub page: usize,
    /// Magnification from page space to image pixels
    pub scale: f32,
}

impl PageImage {
    /// RGB value at `(x, y)`, `None` outside the image
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        let idx = (y as usize * self.width_px as usize + x as usize) * 3;
        let px = self.pixels.get(idx..idx + 3)?;
        Some((px[0], px[1], px[2]))
    }

    /// Number of terminal rows the image spans
    #[must_use]
    pub fn height_rows(&self) -> u32 {
        self.height_px.div_ceil(2)
    }
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("page", &self.page)
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

/// Terminal cell dimensions in canvas pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl CellSize {
    /// A half-block cell: one pixel wide, two pixels tall
    pub const HALF_BLOCK: Self = Self::new(1, 2);

    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}
