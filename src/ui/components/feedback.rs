use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::ui::components::text_field::input_line;
use crate::ui::layout::centered_rect;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Modal over the current view collecting one line of feedback.
pub struct FeedbackPopup<'a> {
    pub input: &'a LineInput,
    pub error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> FeedbackPopup<'a> {
    pub fn new(input: &'a LineInput, error: Option<&'a str>, theme: &'a Theme) -> Self {
        Self { input, error, theme }
    }
}

impl Widget for FeedbackPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let popup = centered_rect(60, 30, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" Share Your Feedback ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(popup);
        block.render(popup, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            " We'd love to hear how we can improve K53 Prep.",
            Style::default().fg(colors.fg()),
        )))
        .wrap(Wrap { trim: false })
        .render(layout[0], buf);

        Paragraph::new(input_line(self.input, true, "", self.theme))
            .block(Block::bordered().border_style(Style::default().fg(colors.border_focused())))
            .render(layout[1], buf);

        if let Some(error) = self.error {
            Paragraph::new(Span::styled(format!(" {error}"), Style::default().fg(colors.error())))
                .render(layout[2], buf);
        }

        Paragraph::new(Span::styled(
            " [Enter] Submit  [Esc] Cancel",
            Style::default().fg(colors.muted()),
        ))
        .render(layout[3], buf);
    }
}
