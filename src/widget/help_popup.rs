use crate::theme::Base16Palette;
use crate::widget::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

pub enum HelpPopupAction {
    Close,
}

pub struct HelpPopup {
    content: &'static str,
    scroll_offset: usize,
    last_popup_area: Option<Rect>,
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpPopup {
    pub fn new() -> Self {
        HelpPopup {
            content: include_str!("../../readme.txt"),
            scroll_offset: 0,
            last_popup_area: None,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let max_content_width = self
            .content
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(60);

        // 2 chars of margin on each side plus borders
        let width = (max_content_width as u16 + 6).min(area.width);
        let height = (area.height * 9 / 10).max(3).min(area.height);
        let popup_area = centered_rect(width, height, area);
        self.last_popup_area = Some(popup_area);

        f.render_widget(Clear, popup_area);

        let lines: Vec<Line> = self
            .content
            .lines()
            .skip(self.scroll_offset)
            .map(|line| {
                Line::from(Span::styled(
                    format!("  {line}"),
                    Style::default().fg(palette.base_05),
                ))
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Help - Press ? or ESC to close ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_0c))
                    .style(Style::default().bg(palette.base_00)),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, popup_area);
    }

    fn max_offset(&self) -> usize {
        self.content.lines().count().saturating_sub(1)
    }

    fn page_size(&self) -> usize {
        self.last_popup_area
            .map(|area| (area.height as usize / 2).max(1))
            .unwrap_or(10)
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(self.max_offset());
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<HelpPopupAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_up(1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_down(self.page_size()),
            KeyCode::PageUp => self.scroll_up(self.page_size()),
            KeyCode::Home | KeyCode::Char('g') => self.scroll_offset = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll_offset = self.max_offset(),
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                return Some(HelpPopupAction::Close);
            }
            _ => {}
        }
        None
    }
}
