use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Base16Palette;
use crate::widget::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Text,
    /// Digits only, `1..=max`
    PageNumber { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    Submit(String),
    Cancel,
}

/// Single-line input popup
#[derive(Debug, Clone)]
pub struct Prompt {
    title: String,
    label: String,
    kind: PromptKind,
    input: String,
}

impl Prompt {
    pub fn new(title: impl Into<String>, label: impl Into<String>, kind: PromptKind) -> Self {
        Self {
            title: title.into(),
            label: label.into(),
            kind,
            input: String::new(),
        }
    }

    pub fn find() -> Self {
        Self::new("Find", "Text:", PromptKind::Text)
    }

    pub fn go_to_page(max: usize) -> Self {
        Self::new(
            "Go to page",
            format!("1 – {max}"),
            PromptKind::PageNumber { max },
        )
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    fn accepts(&self, c: char) -> bool {
        match self.kind {
            PromptKind::Text => !c.is_control(),
            PromptKind::PageNumber { .. } => c.is_ascii_digit(),
        }
    }

    /// Empty input on Enter counts as cancel
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptAction> {
        match key.code {
            KeyCode::Esc => Some(PromptAction::Cancel),
            KeyCode::Enter => {
                if self.input.is_empty() {
                    Some(PromptAction::Cancel)
                } else {
                    Some(PromptAction::Submit(self.input.clone()))
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.accepts(c) {
                    self.input.push(c);
                }
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let width = 44.min(area.width);
        let popup_area = centered_rect(width, 4, area);

        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.base_0d))
            .style(Style::default().bg(palette.base_00));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let lines = vec![
            Line::from(Span::styled(
                self.label.clone(),
                Style::default().fg(palette.base_04),
            )),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(palette.base_0d)),
                Span::styled(self.input.clone(), Style::default().fg(palette.base_06)),
            ]),
        ];
        f.render_widget(Paragraph::new(lines), inner);

        if inner.height >= 2 {
            let cursor_x = inner.x + 2 + self.input.width() as u16;
            if cursor_x < inner.right() {
                f.set_cursor_position(Position::new(cursor_x, inner.y + 1));
            }
        }
    }
}
