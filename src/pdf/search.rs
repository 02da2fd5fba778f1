//! Text search backed by MuPDF's page search

use mupdf::{Page, Quad};

use super::types::HitRect;

/// Upper bound on quads MuPDF collects for one page
pub const MAX_HITS_PER_PAGE: u32 = 1024;

/// Every match of `query` on `page`, in page space.
///
/// MuPDF matches case-insensitively and treats any run of whitespace,
/// line breaks included, as a single space. A match that wraps onto the
/// next line comes back as one quad per line.
pub fn search_page(page: &Page, query: &str) -> Result<Vec<HitRect>, mupdf::error::Error> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let quads = page.search(query, MAX_HITS_PER_PAGE)?;
    Ok(quads.iter().map(quad_bounds).collect())
}

/// Axis-aligned bounding box of a (possibly rotated) quad
pub fn quad_bounds(quad: &Quad) -> HitRect {
    let xs = [quad.ul.x, quad.ur.x, quad.ll.x, quad.lr.x];
    let ys = [quad.ul.y, quad.ur.y, quad.ll.y, quad.lr.y];
    HitRect::new(
        xs.iter().copied().fold(f32::INFINITY, f32::min),
        ys.iter().copied().fold(f32::INFINITY, f32::min),
        xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
    )
}
