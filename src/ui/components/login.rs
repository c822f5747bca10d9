use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::ui::components::text_field::input_line;
use crate::ui::layout::centered_rect;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub struct LoginView<'a> {
    pub input: &'a LineInput,
    pub error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> LoginView<'a> {
    pub fn new(input: &'a LineInput, error: Option<&'a str>, theme: &'a Theme) -> Self {
        Self { input, error, theme }
    }
}

impl Widget for LoginView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let popup = centered_rect(40, 40, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" Welcome ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(popup);
        block.render(popup, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "K53 Prep",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Learner's and driver's licence practice",
                Style::default().fg(colors.muted()),
            )),
        ])
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        Paragraph::new(input_line(self.input, true, "", self.theme))
            .block(
                Block::bordered()
                    .title(" Your name ")
                    .border_style(Style::default().fg(colors.border_focused())),
            )
            .render(layout[1], buf);

        if let Some(error) = self.error {
            Paragraph::new(Span::styled(error, Style::default().fg(colors.error())))
                .alignment(Alignment::Center)
                .render(layout[2], buf);
        }

        Paragraph::new(Span::styled(
            "[Enter] Get started  [Esc] Quit",
            Style::default().fg(colors.muted()),
        ))
        .alignment(Alignment::Center)
        .render(layout[3], buf);
    }
}
