use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::router::View;
use crate::ui::theme::Theme;

/// Navigation rail listing every view with its number key.
pub struct Sidebar<'a> {
    pub current: View,
    pub user_name: Option<&'a str>,
    pub backend: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Sidebar<'a> {
    pub fn new(current: View, user_name: Option<&'a str>, backend: &'a str, theme: &'a Theme) -> Self {
        Self {
            current,
            user_name,
            backend,
            theme,
        }
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "K53 Prep",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.user_name.unwrap_or(""),
                Style::default().fg(colors.muted()),
            )),
        ])
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let items: Vec<Line> = View::ALL
            .iter()
            .enumerate()
            .map(|(i, &view)| {
                let selected = view == self.current;
                let indicator = if selected { ">" } else { " " };
                let style = if selected {
                    Style::default()
                        .fg(colors.accent())
                        .bg(colors.accent_dim())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(
                    format!(" {indicator} [{}] {}", i + 1, view.label()),
                    style,
                ))
            })
            .collect();
        Paragraph::new(items).render(layout[1], buf);

        let footer = Paragraph::new(Line::from(Span::styled(
            format!(" AI: {}", self.backend),
            Style::default().fg(colors.muted()),
        )));
        footer.render(layout[2], buf);
    }
}
