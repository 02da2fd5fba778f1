use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Base16Palette;
use crate::widget::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

/// Modal message box, closed with Enter or Esc
#[derive(Debug, Clone)]
pub struct MessageDialog {
    pub level: MessageLevel,
    pub title: String,
    pub message: String,
}

impl MessageDialog {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    /// True when the key closes the dialog
    pub fn handle_key(&self, key: KeyEvent) -> bool {
        matches!(
            key.code,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q')
        )
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let longest = self
            .message
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .max(self.title.width() + 4);
        let width = u16::try_from(longest)
            .unwrap_or(u16::MAX)
            .saturating_add(6)
            .clamp(24, 70)
            .min(area.width);
        let text_width = width.saturating_sub(4).max(1) as usize;
        let text_rows: usize = self
            .message
            .lines()
            .map(|line| line.width().div_ceil(text_width).max(1))
            .sum();
        let height = u16::try_from(text_rows)
            .unwrap_or(u16::MAX)
            .saturating_add(4)
            .min(area.height);
        let popup_area = centered_rect(width, height, area);

        let accent = match self.level {
            MessageLevel::Info => palette.base_0d,
            MessageLevel::Error => palette.base_08,
        };

        f.render_widget(Clear, popup_area);

        let mut lines: Vec<Line> = self
            .message
            .lines()
            .map(|line| {
                Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(palette.base_06),
                ))
            })
            .collect();
        lines.push(Line::default());
        lines.push(
            Line::from(Span::styled(
                "[ OK ]",
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(format!(" {} ", self.title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(accent))
                    .style(Style::default().bg(palette.base_00)),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn error_dialog_has_fixed_title() {
        let dialog = MessageDialog::error("Cannot open file");
        assert_eq!(dialog.title, "Error");
        assert_eq!(dialog.level, MessageLevel::Error);
    }

    #[test]
    fn enter_and_escape_close() {
        let dialog = MessageDialog::info("Find", "No matches found");
        assert!(dialog.handle_key(key(KeyCode::Enter)));
        assert!(dialog.handle_key(key(KeyCode::Esc)));
        assert!(!dialog.handle_key(key(KeyCode::Char('x'))));
    }

    #[test]
    fn oversized_message_is_clipped_to_screen() {
        let path = "d/".repeat(40_000);
        let dialog = MessageDialog::error(format!("Cannot open {path}\nno such file"));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| dialog.render(f, f.area(), crate::theme::current_theme()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let top: String = (0..80).map(|x| buffer[(x, 0)].symbol()).collect();
        assert!(top.contains("Error"));
    }
}
