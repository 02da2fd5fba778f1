pub mod test_helpers {
    use std::cell::Cell;
    use std::fmt::Write as _;
    use std::path::Path;
    use std::rc::Rc;

    use crate::event_source::{Event, KeyCode, KeyModifiers, MouseEventKind, SimulatedEventSource};
    use crate::pdf::{
        DocumentError, HitRect, PageImage, PageSize, PageSource, RasterSpec, RenderParams,
    };
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    #[derive(Default)]
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events
                .push(SimulatedEventSource::key_event(code, KeyModifiers::empty()));
            self
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_ctrl_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::ctrl_char_key(c));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press_key(KeyCode::Enter)
        }

        pub fn press_esc(self) -> Self {
            self.press_key(KeyCode::Esc)
        }

        /// Type text into whatever input is focused
        pub fn type_text(mut self, text: &str) -> Self {
            for c in text.chars() {
                self.events.push(SimulatedEventSource::char_key(c));
            }
            self
        }

        pub fn next_page(self) -> Self {
            self.press_key(KeyCode::Right)
        }

        pub fn prev_page(self) -> Self {
            self.press_key(KeyCode::Left)
        }

        pub fn zoom_in(self) -> Self {
            self.press_char('+')
        }

        pub fn zoom_out(self) -> Self {
            self.press_char('-')
        }

        /// Ctrl+F, the query, Enter
        pub fn find(self, query: &str) -> Self {
            self.press_ctrl_char('f').type_text(query).press_enter()
        }

        /// "g", the page number, Enter
        pub fn go_to_page(self, number: usize) -> Self {
            self.press_char('g')
                .type_text(&number.to_string())
                .press_enter()
        }

        pub fn open_dialog(self) -> Self {
            self.press_ctrl_char('o')
        }

        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::click(column, row));
            self
        }

        pub fn scroll_down(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::mouse_event(
                MouseEventKind::ScrollDown,
                column,
                row,
            ));
            self
        }

        /// Quit the application (press 'q')
        pub fn quit(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key('q'));
            self
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }

    const FAKE_MARGIN: f32 = 72.0;
    const FAKE_CHAR_WIDTH: f32 = 7.0;
    const FAKE_LINE_HEIGHT: f32 = 14.0;

    /// In-memory document with letter-sized pages.
    ///
    /// Text is laid out monospaced from the top-left margin, one line per
    /// `\n`. Renders are plain white and counted.
    pub struct FakeDocument {
        pages: Vec<String>,
        renders: Rc<Cell<usize>>,
        fail_render: bool,
    }

    impl FakeDocument {
        pub fn with_pages(pages: &[&str]) -> Self {
            Self {
                pages: pages.iter().map(|p| p.to_string()).collect(),
                renders: Rc::new(Cell::new(0)),
                fail_render: false,
            }
        }

        /// Every render fails with a raster error
        pub fn failing_render(mut self) -> Self {
            self.fail_render = true;
            self
        }

        /// Shared counter of successful renders
        pub fn render_counter(&self) -> Rc<Cell<usize>> {
            Rc::clone(&self.renders)
        }

        fn check_page(&self, page: usize) -> Result<&str, DocumentError> {
            self.pages
                .get(page)
                .map(String::as_str)
                .ok_or(DocumentError::PageOutOfRange {
                    page,
                    page_count: self.pages.len(),
                })
        }

        /// Case-insensitive, non-overlapping matches within each line
        fn find(text: &str, query: &str) -> Vec<HitRect> {
            let needle: Vec<char> = query.to_lowercase().chars().collect();
            if needle.is_empty() {
                return Vec::new();
            }

            let mut hits = Vec::new();
            for (row, line) in text.lines().enumerate() {
                let haystack: Vec<char> = line.to_lowercase().chars().collect();
                let y0 = FAKE_MARGIN + row as f32 * FAKE_LINE_HEIGHT;
                let mut i = 0;
                while i + needle.len() <= haystack.len() {
                    if haystack[i..i + needle.len()] == needle[..] {
                        let x0 = FAKE_MARGIN + i as f32 * FAKE_CHAR_WIDTH;
                        let x1 = x0 + needle.len() as f32 * FAKE_CHAR_WIDTH;
                        hits.push(HitRect::new(x0, y0, x1, y0 + FAKE_LINE_HEIGHT));
                        i += needle.len();
                    } else {
                        i += 1;
                    }
                }
            }
            hits
        }
    }

    impl PageSource for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn title(&self) -> Option<&str> {
            None
        }

        fn page_size(&self, page: usize) -> Result<PageSize, DocumentError> {
            self.check_page(page)?;
            Ok(PageSize::LETTER)
        }

        fn render(&self, page: usize, params: &RenderParams) -> Result<PageImage, DocumentError> {
            self.check_page(page)?;
            if self.fail_render {
                return Err(DocumentError::raster("fake render failure"));
            }

            let spec = RasterSpec::compute(PageSize::LETTER, params.viewport_px(), params.scale);
            let width_px = spec.output_width as u32;
            let height_px = spec.output_height as u32;
            self.renders.set(self.renders.get() + 1);

            Ok(PageImage {
                pixels: vec![255; (width_px * height_px * 3) as usize],
                width_px,
                height_px,
                page,
                scale: width_px as f32 / PageSize::LETTER.width,
            })
        }

        fn search_page(&self, page: usize, query: &str) -> Result<Vec<HitRect>, DocumentError> {
            let text = self.check_page(page)?;
            Ok(Self::find(text, query))
        }
    }

    fn escape_pdf_string(text: &str) -> String {
        text.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Write a minimal PDF in 24pt Helvetica, one page per entry.
    ///
    /// A `\n` in a page's text starts a new line 28 points lower.
    pub fn write_sample_pdf(path: &Path, pages: &[&str]) -> std::io::Result<()> {
        let mut objects: Vec<String> = Vec::new();
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push(format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            pages.len()
        ));
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        for (i, text) in pages.iter().enumerate() {
            let lines = text
                .split('\n')
                .map(|line| format!("({}) Tj", escape_pdf_string(line)))
                .collect::<Vec<_>>()
                .join(" T* ");
            let content = format!("BT /F1 24 Tf 28 TL 72 700 Td {lines} ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                page_ids[i] + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{body}\nendobj\n", i + 1);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        );

        std::fs::write(path, out)
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use crate::pdf::PageSource;

    #[test]
    fn test_scenario_builder() {
        let scenario = TestScenarioBuilder::new()
            .next_page()
            .find("cat")
            .go_to_page(12)
            .quit()
            .build();

        // Right, Ctrl+F, 3 chars, Enter, g, 2 digits, Enter, q
        assert_eq!(scenario.events.len(), 11);
    }

    #[test]
    fn fake_document_search_uses_monospace_layout() {
        let doc = FakeDocument::with_pages(&["ab cat\ncat"]);
        let hits = doc.search_page(0, "cat").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].x0, 72.0 + 3.0 * 7.0);
        assert_eq!(hits[1].y0, 72.0 + 14.0);
        assert!(doc.search_page(1, "cat").is_err());
    }

    #[test]
    fn sample_pdf_has_valid_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.pdf");
        write_sample_pdf(&path, &["first (page)", "one\ntwo"]).unwrap();

        let bytes = std::fs::read_to_string(&path).unwrap();
        assert!(bytes.starts_with("%PDF-1.4"));
        assert!(bytes.contains("/Count 2"));
        assert!(bytes.contains("(first \\(page\\)) Tj"));
        assert!(bytes.contains("(one) Tj T* (two) Tj"));

        let startxref: usize = bytes
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert!(bytes[startxref..].starts_with("xref"));
    }
}
