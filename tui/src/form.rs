//! Input Form
//!
//! Focus tracking, keystroke-to-value edits and rendering for the three
//! input fields. The draft itself lives in the orchestrator; the form only
//! computes what a field's next value would be.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Widget};
use unicode_width::UnicodeWidthStr;

use exhibit_core::labels;
use exhibit_core::{InputField, TransitionError, UserInput};

use crate::display::{DisplayState, Phase};
use crate::theme;
use crate::widgets::{wrap_preserving_breaks, TextBlock};

/// Widest the form grows
pub const MAX_FORM_WIDTH: u16 = 72;

/// Text rows inside a multi-line field's box
const MULTILINE_ROWS: u16 = 3;

/// A single keystroke applied to the focused field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldEdit {
    /// Append a character
    Insert(char),
    /// Append a line break (multi-line fields only)
    Newline,
    /// Remove the last character
    Backspace,
}

/// Focus and validation hint
#[derive(Clone, Debug)]
pub struct FormState {
    focus: InputField,
    hint: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            focus: InputField::Name,
            hint: None,
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focused field
    pub fn focus(&self) -> InputField {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Validation hint under the form
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn clear_hint(&mut self) {
        self.hint = None;
    }

    /// New value of the focused field after `edit`, or `None` if the edit
    /// does not apply
    pub fn apply_edit(&self, draft: &UserInput, edit: FieldEdit) -> Option<String> {
        let mut value = draft.field(self.focus).to_string();
        match edit {
            FieldEdit::Insert(c) => value.push(c),
            FieldEdit::Newline if self.focus.is_multiline() => value.push('\n'),
            FieldEdit::Newline => return None,
            FieldEdit::Backspace => {
                value.pop()?;
            }
        }
        Some(value)
    }

    /// Reflect a refused transition in the form
    pub fn reject(&mut self, error: &TransitionError) {
        match error {
            TransitionError::MissingField(field) => {
                self.focus = *field;
                self.hint = Some(format!("{}を入力してください", field.label()));
            }
            TransitionError::FieldTooLong { field, max } => {
                self.focus = *field;
                self.hint = Some(format!("{}は{}文字以内で入力してください", field.label(), max));
            }
            _ => {}
        }
    }
}

/// Rows a field's box takes, borders included
fn box_height(field: InputField) -> u16 {
    if field.is_multiline() {
        MULTILINE_ROWS + 2
    } else {
        3
    }
}

/// Render the form into `buf`, whose area starts at the origin
pub fn render_form(buf: &mut Buffer, display: &DisplayState, form: &FormState) {
    let area = buf.area;
    if area.width < 12 || area.height < 4 {
        return;
    }
    let width = area.width.min(MAX_FORM_WIDTH);
    let x = (area.width - width) / 2;
    let loading = display.phase == Phase::Loading;
    let mut y = 0;

    // Failure banner above the fields
    if let Some(error) = &display.error {
        let banner = TextBlock::new(error).style(
            Style::default()
                .fg(theme::SIGN_CREAM)
                .bg(theme::DANGER_RED)
                .add_modifier(Modifier::BOLD),
        );
        let rows = banner.height(width.saturating_sub(2)).min(area.height);
        let rect = Rect::new(x, 0, width, rows);
        buf.set_style(rect, Style::default().bg(theme::DANGER_RED));
        banner.render(Rect::new(x + 1, 0, width.saturating_sub(2), rows), buf);
        y = rows + 1;
    }

    for field in InputField::ALL {
        let focused = field == form.focus() && !loading;
        if y >= area.height {
            return;
        }

        let label_style = if focused {
            Style::default().fg(theme::FOCUS).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme::DIM_GRAY)
        };
        buf.set_stringn(x, y, field.label(), usize::from(width), label_style);
        y += 1;

        let rect = Rect::new(x, y, width, box_height(field)).intersection(area);
        if rect.height < 3 {
            return;
        }
        let border = if focused { theme::FOCUS } else { theme::DIM_GRAY };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border));
        let inner = block.inner(rect);
        block.render(rect, buf);

        let value = display.draft.field(field);
        if value.is_empty() {
            TextBlock::new(field.placeholder())
                .style(
                    Style::default()
                        .fg(theme::DIM_GRAY)
                        .add_modifier(Modifier::ITALIC),
                )
                .render(inner, buf);
        } else {
            render_value(buf, inner, value, focused);
        }
        y += rect.height;
    }

    y += 1;
    if y >= area.height {
        return;
    }
    if loading {
        let status = display.status.as_deref().unwrap_or_default();
        buf.set_stringn(
            x,
            y,
            format!("{} {status}", display.spinner()),
            usize::from(width),
            Style::default().fg(theme::ACCENT),
        );
    } else {
        let button = format!("[ {} ]", labels::SUBMIT_LABEL);
        let bx = x + width.saturating_sub(width_u16(&button)) / 2;
        buf.set_stringn(
            bx,
            y,
            &button,
            usize::from(width),
            Style::default()
                .fg(theme::INK)
                .bg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        );
    }

    y += 2;
    if let Some(message) = form.hint() {
        if y < area.height {
            let rect = Rect::new(x, y, width, area.height - y);
            TextBlock::new(message)
                .style(Style::default().fg(theme::ERROR_RED))
                .render(rect, buf);
        }
    }
}

/// Field contents, scrolled so the end (and the cursor) stays visible
fn render_value(buf: &mut Buffer, inner: Rect, value: &str, focused: bool) {
    let text = if focused {
        format!("{value}_")
    } else {
        value.to_string()
    };
    let lines = wrap_preserving_breaks(&text, inner.width);
    let skip = lines.len().saturating_sub(usize::from(inner.height));
    for (i, line) in lines.iter().skip(skip).enumerate() {
        let y = inner.y + i as u16;
        if y >= inner.y + inner.height {
            break;
        }
        buf.set_stringn(
            inner.x,
            y,
            line,
            usize::from(inner.width),
            Style::default().fg(theme::SIGN_CREAM),
        );
    }
}

fn width_u16(s: &str) -> u16 {
    u16::try_from(s.width()).unwrap_or(u16::MAX)
}

/// Rows the form needs without a failure banner
pub fn form_height() -> u16 {
    InputField::ALL
        .into_iter()
        .map(|f| 1 + box_height(f))
        .sum::<u16>()
        + 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
        }
        out.chars().filter(|c| *c != ' ').collect()
    }

    #[test]
    fn test_focus_cycles() {
        let mut form = FormState::new();
        assert_eq!(form.focus(), InputField::Name);
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focus(), InputField::Worry);
        form.focus_next();
        assert_eq!(form.focus(), InputField::Name);
        form.focus_prev();
        assert_eq!(form.focus(), InputField::Worry);
    }

    #[test]
    fn test_edits() {
        let mut form = FormState::new();
        let draft = UserInput::new("タロ", "", "眠い");

        assert_eq!(
            form.apply_edit(&draft, FieldEdit::Insert('ウ')).as_deref(),
            Some("タロウ")
        );
        assert_eq!(form.apply_edit(&draft, FieldEdit::Backspace).as_deref(), Some("タ"));
        // Single-line fields refuse line breaks
        assert_eq!(form.apply_edit(&draft, FieldEdit::Newline), None);

        form.focus_next();
        // Nothing to delete
        assert_eq!(form.apply_edit(&draft, FieldEdit::Backspace), None);

        form.focus_next();
        assert_eq!(
            form.apply_edit(&draft, FieldEdit::Newline).as_deref(),
            Some("眠い\n")
        );
    }

    #[test]
    fn test_missing_field_focuses_and_hints() {
        let mut form = FormState::new();
        form.reject(&TransitionError::MissingField(InputField::Hobby));

        assert_eq!(form.focus(), InputField::Hobby);
        assert_eq!(
            form.hint(),
            Some(format!("{}を入力してください", labels::HOBBY_LABEL).as_str())
        );

        form.reject(&TransitionError::Busy);
        assert!(form.hint().is_some());
        form.clear_hint();
        assert_eq!(form.hint(), None);
    }

    #[test]
    fn test_render_shows_placeholders_and_submit() {
        let display = DisplayState::new();
        let form = FormState::new();
        let mut buf = Buffer::empty(Rect::new(0, 0, 80, form_height() + 2));
        render_form(&mut buf, &display, &form);

        let shown = text(&buf);
        assert!(shown.contains("展示名"));
        assert!(shown.contains("例：山田"));
        assert!(shown.contains(labels::SUBMIT_LABEL));
    }

    #[test]
    fn test_render_loading_shows_status() {
        let mut display = DisplayState::new();
        display.apply_message(exhibit_core::ExhibitMessage::LoadingStarted {
            status: labels::LOADING_MESSAGES[0].to_string(),
        });
        let mut buf = Buffer::empty(Rect::new(0, 0, 80, form_height() + 2));
        render_form(&mut buf, &display, &FormState::new());

        let shown = text(&buf);
        assert!(shown.contains("飼育員があなたの生態を観察しています"));
        assert!(!shown.contains(labels::SUBMIT_LABEL));
    }

    #[test]
    fn test_render_error_banner() {
        let mut display = DisplayState::new();
        display.apply_message(exhibit_core::ExhibitMessage::GenerationFailed {
            message: labels::GENERATION_FAILED.to_string(),
        });
        let mut buf = Buffer::empty(Rect::new(0, 0, 80, form_height() + 4));
        render_form(&mut buf, &display, &FormState::new());

        assert!(text(&buf).contains("飼育データの解析に失敗しました"));
        // The banner sits on top, the fields below it
        assert_eq!(buf[(4, 0)].bg, theme::DANGER_RED);
        assert!(text(&buf).contains(labels::SUBMIT_LABEL));
    }
}
