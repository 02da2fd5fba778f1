//! Half-block page canvas
//!
//! Every terminal cell shows two vertically stacked pixels: the upper one
//! as the foreground of `▀`, the lower one as its background. Pages
//! narrower or shorter than the viewport are centered on a gray
//! background. Search hits are drawn as outlines on top of the page.

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState, Widget},
};

use crate::pdf::{HitRect, PageImage};

const UPPER_HALF_BLOCK: &str = "▀";

pub const CANVAS_BACKGROUND: Color = Color::Rgb(128, 128, 128);

pub struct PageCanvas<'a> {
    image: &'a PageImage,
    /// (pixels from left, rows from top)
    pan: (u32, u32),
    highlights: &'a [(bool, HitRect)],
    current_color: Color,
    other_color: Color,
}

impl<'a> PageCanvas<'a> {
    pub fn new(image: &'a PageImage, pan: (u32, u32)) -> Self {
        Self {
            image,
            pan,
            highlights: &[],
            current_color: Color::Yellow,
            other_color: Color::Red,
        }
    }

    /// Hit rectangles in image pixels, flagged when current
    pub fn highlights(mut self, highlights: &'a [(bool, HitRect)]) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn highlight_colors(mut self, current: Color, other: Color) -> Self {
        self.current_color = current;
        self.other_color = other;
        self
    }

    /// Offset of the image inside the viewport when it is smaller, in (columns, rows)
    fn centering_offset(&self, area: Rect) -> (u32, u32) {
        let width = self.image.width_px;
        let rows = self.image.height_rows();
        (
            u32::from(area.width).saturating_sub(width) / 2,
            u32::from(area.height).saturating_sub(rows) / 2,
        )
    }

    fn color_at(&self, x: i64, y: i64) -> Color {
        if x < 0 || y < 0 {
            return CANVAS_BACKGROUND;
        }
        let (x, y) = (x as u32, y as u32);

        // current hit last so it wins where outlines overlap
        let outline = self
            .highlights
            .iter()
            .filter(|(is_current, _)| !is_current)
            .chain(self.highlights.iter().filter(|(is_current, _)| *is_current))
            .filter(|(_, rect)| on_outline(rect, x, y))
            .last();
        if let Some((is_current, _)) = outline {
            return if *is_current {
                self.current_color
            } else {
                self.other_color
            };
        }

        match self.image.pixel(x, y) {
            Some((r, g, b)) => Color::Rgb(r, g, b),
            None => CANVAS_BACKGROUND,
        }
    }
}

/// Whether pixel `(x, y)` lies on the one pixel wide border of `rect`
fn on_outline(rect: &HitRect, x: u32, y: u32) -> bool {
    let x0 = rect.x0.floor().max(0.0) as u32;
    let y0 = rect.y0.floor().max(0.0) as u32;
    let x1 = (rect.x1.ceil().max(0.0) as u32).max(x0 + 1);
    let y1 = (rect.y1.ceil().max(0.0) as u32).max(y0 + 1);

    if x < x0 || x >= x1 || y < y0 || y >= y1 {
        return false;
    }
    x == x0 || x == x1 - 1 || y == y0 || y == y1 - 1
}

impl Widget for PageCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        let (offset_x, offset_y) = self.centering_offset(area);

        for row in 0..area.height {
            let image_row =
                i64::from(row) + i64::from(self.pan.1) - i64::from(offset_y);
            for col in 0..area.width {
                let x = i64::from(col) + i64::from(self.pan.0) - i64::from(offset_x);
                let upper = self.color_at(x, image_row * 2);
                let lower = self.color_at(x, image_row * 2 + 1);

                buf[(area.x + col, area.y + row)]
                    .set_symbol(UPPER_HALF_BLOCK)
                    .set_fg(upper)
                    .set_bg(lower);
            }
        }
    }
}

/// Fill an empty canvas with the background color
pub fn render_empty(area: Rect, buf: &mut Buffer) {
    let area = area.intersection(buf.area);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            buf[(x, y)].set_symbol(" ").set_bg(CANVAS_BACKGROUND);
        }
    }
}

/// Scrollbars on the right and bottom edge when the page overflows the viewport
pub fn render_scrollbars(f: &mut Frame, area: Rect, image: &PageImage, pan: (u32, u32)) {
    let rows = image.height_rows() as usize;
    let viewport_rows = area.height as usize;
    if rows > viewport_rows {
        let mut state = ScrollbarState::new(rows.saturating_sub(viewport_rows))
            .position(pan.1 as usize)
            .viewport_content_length(viewport_rows);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }

    let columns = image.width_px as usize;
    let viewport_columns = area.width as usize;
    if columns > viewport_columns {
        let mut state = ScrollbarState::new(columns.saturating_sub(viewport_columns))
            .position(pan.0 as usize)
            .viewport_content_length(viewport_columns);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::HorizontalBottom)
                .begin_symbol(Some("◄"))
                .end_symbol(Some("►")),
            area,
            &mut state,
        );
    }
}
