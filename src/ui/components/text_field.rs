use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// One line showing `input` with a block cursor when focused, or
/// `placeholder` in muted text when empty and unfocused.
pub fn input_line<'a>(
    input: &'a LineInput,
    focused: bool,
    placeholder: &'a str,
    theme: &Theme,
) -> Line<'a> {
    let colors = &theme.colors;
    let text_style = Style::default().fg(colors.fg());

    if !focused {
        if input.value().is_empty() {
            return Line::from(Span::styled(placeholder, Style::default().fg(colors.muted())));
        }
        return Line::from(Span::styled(input.value(), text_style));
    }

    let cursor_style = Style::default()
        .fg(colors.bg())
        .bg(colors.accent())
        .add_modifier(Modifier::BOLD);
    let (before, cursor, after) = input.render_parts();
    let cursor_text = cursor.map_or_else(|| " ".to_string(), |ch| ch.to_string());
    Line::from(vec![
        Span::styled(before, text_style),
        Span::styled(cursor_text, cursor_style),
        Span::styled(after, text_style),
    ])
}
