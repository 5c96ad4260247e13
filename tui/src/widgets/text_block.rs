//! TextBlock Widget
//!
//! A borderless wrapped text region. Embedded line breaks are kept, blank
//! lines included, and wrapping is width-aware so CJK text breaks cleanly.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use textwrap::wrap;

/// A borderless, wrapped text block
pub struct TextBlock<'a> {
    content: &'a str,
    style: Style,
    fill: bool,
}

impl<'a> TextBlock<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            style: Style::default(),
            fill: false,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Paint the whole area with the style first, not just the glyphs
    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Lines after wrapping to `width`
    pub fn wrapped_lines(&self, width: u16) -> Vec<String> {
        wrap_preserving_breaks(self.content, width)
    }

    /// Rows needed to show everything at `width`
    pub fn height(&self, width: u16) -> u16 {
        u16::try_from(self.wrapped_lines(width).len()).unwrap_or(u16::MAX)
    }
}

impl Widget for TextBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        if self.fill {
            buf.set_style(area, self.style);
        }

        for (i, line) in self
            .wrapped_lines(area.width)
            .iter()
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            buf.set_stringn(area.x, y, line, area.width as usize, self.style);
        }
    }
}

/// Wrap each source line separately so explicit breaks survive
pub fn wrap_preserving_breaks(content: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    content
        .lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.into_owned())
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn test_line_breaks_preserved() {
        let lines = wrap_preserving_breaks("一行目\n\n三行目", 20);
        assert_eq!(lines, vec!["一行目", "", "三行目"]);
    }

    #[test]
    fn test_cjk_wraps_within_width() {
        let text = "夜行性で、週末になると巣穴から一歩も出てこないことで知られている。";
        for line in wrap_preserving_breaks(text, 12) {
            assert!(line.width() <= 12, "{line:?} is wider than 12");
        }
    }

    #[test]
    fn test_render_fills_and_clips() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 2));
        let style = Style::default().bg(ratatui::style::Color::Yellow);
        TextBlock::new("ab\ncd\nef")
            .style(style)
            .fill(true)
            .render(Rect::new(0, 0, 6, 2), &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), "a");
        assert_eq!(buf[(0, 1)].symbol(), "c");
        assert_eq!(buf[(5, 1)].bg, ratatui::style::Color::Yellow);
        assert_eq!(TextBlock::new("ab\ncd\nef").height(6), 3);
    }
}
