use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Base16Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
    Open,
    Prev,
    Next,
    ZoomIn,
    ZoomOut,
    Find,
    GoTo,
}

impl ToolbarButton {
    pub const ALL: [ToolbarButton; 7] = [
        ToolbarButton::Open,
        ToolbarButton::Prev,
        ToolbarButton::Next,
        ToolbarButton::ZoomIn,
        ToolbarButton::ZoomOut,
        ToolbarButton::Find,
        ToolbarButton::GoTo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToolbarButton::Open => "Open",
            ToolbarButton::Prev => "◀",
            ToolbarButton::Next => "▶",
            ToolbarButton::ZoomIn => "+",
            ToolbarButton::ZoomOut => "-",
            ToolbarButton::Find => "Find",
            ToolbarButton::GoTo => "Go to",
        }
    }

    /// Everything but Open needs a document
    pub fn needs_document(&self) -> bool {
        !matches!(self, ToolbarButton::Open)
    }

    fn width(&self) -> u16 {
        // one cell of padding on each side
        self.label().width() as u16 + 2
    }
}

const BUTTON_GAP: u16 = 1;

/// Button positions for a toolbar drawn in `area`, left to right.
///
/// Buttons that do not fit are left out.
pub fn layout_buttons(area: Rect) -> Vec<(ToolbarButton, Rect)> {
    let mut rects = Vec::with_capacity(ToolbarButton::ALL.len());
    let mut x = area.x;
    let right = area.right();

    for button in ToolbarButton::ALL {
        let width = button.width();
        if x.saturating_add(width) > right {
            break;
        }
        rects.push((button, Rect::new(x, area.y, width, 1)));
        x = x.saturating_add(width + BUTTON_GAP);
    }
    rects
}

/// Single-row toolbar with clickable buttons and the page label
#[derive(Default)]
pub struct Toolbar {
    buttons: Vec<(ToolbarButton, Rect)>,
    has_document: bool,
}

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        page_label: &str,
        has_document: bool,
        palette: &Base16Palette,
    ) {
        self.buttons = layout_buttons(area);
        self.has_document = has_document;

        let mut spans = Vec::new();
        for (i, (button, _)) in self.buttons.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" ".repeat(BUTTON_GAP as usize)));
            }
            let enabled = has_document || !button.needs_document();
            let (fg, bg) = palette.button_colors(enabled);
            let mut style = Style::default().fg(fg).bg(bg);
            if enabled {
                style = style.add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(format!(" {} ", button.label()), style));
        }

        let bar_style = Style::default().bg(palette.base_01).fg(palette.base_05);
        f.render_widget(Paragraph::new(Line::from(spans)).style(bar_style), area);

        let label_width = page_label.width() as u16 + 1;
        let used = self
            .buttons
            .last()
            .map(|(_, rect)| rect.right() + BUTTON_GAP)
            .unwrap_or(area.x);
        if area.right().saturating_sub(used) >= label_width {
            let label_area = Rect::new(area.right() - label_width, area.y, label_width, 1);
            f.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    page_label.to_string(),
                    Style::default().fg(palette.base_06),
                )))
                .style(bar_style),
                label_area,
            );
        }
    }

    /// Button under a mouse position; disabled buttons are not clickable
    pub fn button_at(&self, column: u16, row: u16) -> Option<ToolbarButton> {
        self.buttons
            .iter()
            .find(|(_, rect)| {
                rect.y == row && column >= rect.x && column < rect.right()
            })
            .map(|(button, _)| *button)
            .filter(|button| self.has_document || !button.needs_document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_are_laid_out_left_to_right() {
        let rects = layout_buttons(Rect::new(0, 0, 80, 1));
        assert_eq!(rects.len(), ToolbarButton::ALL.len());
        assert_eq!(rects[0], (ToolbarButton::Open, Rect::new(0, 0, 6, 1)));
        assert_eq!(rects[1], (ToolbarButton::Prev, Rect::new(7, 0, 3, 1)));
        assert_eq!(rects[2], (ToolbarButton::Next, Rect::new(11, 0, 3, 1)));
    }

    #[test]
    fn narrow_toolbar_drops_trailing_buttons() {
        let rects = layout_buttons(Rect::new(0, 0, 12, 1));
        let buttons: Vec<_> = rects.iter().map(|(b, _)| *b).collect();
        assert_eq!(buttons, vec![ToolbarButton::Open, ToolbarButton::Prev]);
    }

    #[test]
    fn disabled_buttons_are_not_clickable() {
        let mut toolbar = Toolbar::new();
        toolbar.buttons = layout_buttons(Rect::new(0, 0, 80, 1));

        toolbar.has_document = false;
        assert_eq!(toolbar.button_at(1, 0), Some(ToolbarButton::Open));
        assert_eq!(toolbar.button_at(8, 0), None);

        toolbar.has_document = true;
        assert_eq!(toolbar.button_at(8, 0), Some(ToolbarButton::Prev));
        assert_eq!(toolbar.button_at(6, 0), None);
        assert_eq!(toolbar.button_at(1, 1), None);
    }
}
