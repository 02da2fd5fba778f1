//! Page rasterization
//!
//! MuPDF renders the page supersampled, the result is converted to packed
//! RGB and downsampled to canvas resolution with the `image` crate.

use image::RgbImage;
use image::imageops::{self, FilterType};
use log::debug;
use mupdf::{Colorspace, Matrix, Page, Pixmap};
use ratatui::layout::Rect;

use super::error::DocumentError;
use super::types::{CellSize, PageImage, PageSize};

/// Largest output dimension in canvas pixels
pub const MAX_RASTER_DIMENSION: f32 = 2048.0;

/// Render at this multiple of the target size before downsampling
pub const SUPERSAMPLE: f32 = 2.0;

/// Parameters for rendering a page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    /// Viewport area in terminal cells
    pub area: Rect,
    /// User zoom factor
    pub scale: f32,
    /// Terminal cell dimensions in canvas pixels
    pub cell_size: CellSize,
}

impl RenderParams {
    /// Viewport size in canvas pixels
    #[must_use]
    pub fn viewport_px(&self) -> (f32, f32) {
        (
            f32::from(self.area.width) * f32::from(self.cell_size.width),
            f32::from(self.area.height) * f32::from(self.cell_size.height),
        )
    }
}

/// Pre-computed rasterization parameters for a page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterSpec {
    pub output_width: f32,
    pub output_height: f32,
    pub mag: f32,
}

impl RasterSpec {
    #[must_use]
    pub fn compute(page: PageSize, viewport_px: (f32, f32), user_scale: f32) -> Self {
        let page_width = if page.width > 0.0 {
            page.width
        } else {
            PageSize::LETTER.width
        };
        let page_height = if page.height > 0.0 {
            page.height
        } else {
            PageSize::LETTER.height
        };
        let (view_width, view_height) = viewport_px;

        let base_mag = if view_width <= 0.0 || view_height <= 0.0 {
            1.0
        } else if page_width / page_height > view_width / view_height {
            view_height / page_height
        } else {
            view_width / page_width
        };

        let mut mag = base_mag * user_scale;
        let mut out_width = page_width * mag;
        let mut out_height = page_height * mag;

        let max_dim = out_width.max(out_height);
        if max_dim > MAX_RASTER_DIMENSION {
            let reduction = MAX_RASTER_DIMENSION / max_dim;
            mag *= reduction;
            out_width *= reduction;
            out_height *= reduction;
        }

        Self {
            output_width: out_width.round().max(1.0),
            output_height: out_height.round().max(1.0),
            mag,
        }
    }
}

/// Page size in points from the page bounds
pub fn page_size(page: &Page) -> Result<PageSize, DocumentError> {
    let bounds = page.bounds()?;
    Ok(PageSize::new(
        (bounds.x1 - bounds.x0).abs(),
        (bounds.y1 - bounds.y0).abs(),
    ))
}

/// Render a single page to canvas pixels
pub fn render_page(
    page: &Page,
    page_num: usize,
    params: &RenderParams,
) -> Result<PageImage, DocumentError> {
    let size = page_size(page)?;
    let spec = RasterSpec::compute(size, params.viewport_px(), params.scale);

    let supersample_mag = spec.mag * SUPERSAMPLE;
    let transform = Matrix::new_scale(supersample_mag, supersample_mag);
    let rgb = Colorspace::device_rgb();
    let pixmap = page.to_pixmap(&transform, &rgb, false, false)?;

    let pixels = pixmap_to_rgb(&pixmap)?;
    let target = (spec.output_width as u32, spec.output_height as u32);
    let (pixels, width_px, height_px) =
        downsample(pixels, (pixmap.width(), pixmap.height()), target)?;

    debug!(
        "Rendered page {page_num} at mag {:.3}: {width_px}x{height_px}",
        spec.mag
    );

    Ok(PageImage {
        pixels,
        width_px,
        height_px,
        page: page_num,
        scale: width_px as f32 / size.width.max(1.0),
    })
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, DocumentError> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(DocumentError::raster(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(DocumentError::raster("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}

/// Resize packed RGB to `target`, returning the pixels and final dimensions
pub fn downsample(
    pixels: Vec<u8>,
    source: (u32, u32),
    target: (u32, u32),
) -> Result<(Vec<u8>, u32, u32), DocumentError> {
    let target = (target.0.max(1), target.1.max(1));
    if source == target {
        return Ok((pixels, source.0, source.1));
    }

    let img = RgbImage::from_raw(source.0, source.1, pixels)
        .ok_or_else(|| DocumentError::raster("Pixel buffer does not match dimensions"))?;
    let resized = imageops::resize(&img, target.0, target.1, FilterType::Triangle);
    let (width, height) = resized.dimensions();
    Ok((resized.into_raw(), width, height))
}
