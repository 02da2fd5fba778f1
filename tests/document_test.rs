use folio::pdf::{CellSize, DocumentError, MupdfDocument, PageSize, PageSource, RenderParams};
use folio::test_utils::test_helpers::write_sample_pdf;
use ratatui::layout::Rect;

fn open_sample(pages: &[&str]) -> (tempfile::TempDir, MupdfDocument) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.pdf");
    write_sample_pdf(&path, pages).unwrap();
    let doc = MupdfDocument::open(&path).unwrap();
    (dir, doc)
}

fn params(width: u16, height: u16, scale: f32) -> RenderParams {
    RenderParams {
        area: Rect::new(0, 0, width, height),
        scale,
        cell_size: CellSize::HALF_BLOCK,
    }
}

#[test]
fn test_page_count_and_size() {
    let (_dir, doc) = open_sample(&["one", "two", "three"]);
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.title(), None);

    let size = doc.page_size(0).unwrap();
    assert_eq!(size, PageSize::LETTER);
    assert!(matches!(
        doc.page_size(3),
        Err(DocumentError::PageOutOfRange { page: 3, page_count: 3 })
    ));
}

#[test]
fn test_render_fits_viewport_width() {
    let (_dir, doc) = open_sample(&["Rendered text"]);
    let image = doc.render(0, &params(80, 20, 1.0)).unwrap();

    assert_eq!(image.width_px, 80);
    assert_eq!(image.height_px, 104);
    assert_eq!(image.pixels.len(), (80 * 104 * 3) as usize);
    assert!((image.scale - 80.0 / 612.0).abs() < 1e-4);

    // page background is white
    assert_eq!(image.pixel(0, 0), Some((255, 255, 255)));
}

#[test]
fn test_zoomed_render_is_larger() {
    let (_dir, doc) = open_sample(&["Zoom"]);
    let fitted = doc.render(0, &params(80, 20, 1.0)).unwrap();
    let zoomed = doc.render(0, &params(80, 20, 2.0)).unwrap();
    assert_eq!(zoomed.width_px, fitted.width_px * 2);
}

#[test]
fn test_search_finds_text_position() {
    let (_dir, doc) = open_sample(&["Hello World", "hello again"]);

    let hits = doc.search_page(0, "world").unwrap();
    assert_eq!(hits.len(), 1);
    let rect = hits[0];
    // text starts at x=72, baseline 700 points from the bottom
    assert!(rect.x0 > 72.0 && rect.x1 < 300.0);
    assert!(rect.y0 > 60.0 && rect.y1 < 120.0);
    assert!(rect.width() > 0.0 && rect.height() > 0.0);

    assert_eq!(doc.search_page(1, "HELLO").unwrap().len(), 1);
    assert!(doc.search_page(1, "world").unwrap().is_empty());
}

#[test]
fn test_search_spans_line_break() {
    let (_dir, doc) = open_sample(&["Hello\nWorld"]);

    let hits = doc.search_page(0, "hello world").unwrap();
    assert!(!hits.is_empty());
    // both lines are covered: 28pt leading, 24pt text
    let top = hits.iter().map(|h| h.y0).fold(f32::INFINITY, f32::min);
    let bottom = hits.iter().map(|h| h.y1).fold(f32::NEG_INFINITY, f32::max);
    assert!(bottom - top > 40.0);
    assert!(hits.iter().all(|h| h.x0 >= 70.0 && h.x0 < 80.0));
}

#[test]
fn test_search_squashes_whitespace() {
    let (_dir, doc) = open_sample(&["Hello World"]);
    assert_eq!(doc.search_page(0, "hello    world").unwrap().len(), 1);
    assert!(doc.search_page(0, "   ").unwrap().is_empty());
}

#[test]
fn test_document_without_pages_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pdf");
    write_sample_pdf(&path, &[]).unwrap();

    assert!(matches!(
        MupdfDocument::open(&path),
        Err(DocumentError::Empty | DocumentError::Engine(_))
    ));
}

#[test]
fn test_garbage_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.pdf");
    std::fs::write(&path, b"not a pdf at all").unwrap();
    assert!(MupdfDocument::open(&path).is_err());
}
