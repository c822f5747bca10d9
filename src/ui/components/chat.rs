use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::chat::{ChatSession, Role};
use crate::ui::components::text_field::input_line;
use crate::ui::layout::wrapped_line_count;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

const PLACEHOLDER: &str = "Press Enter to ask about K53 rules, signs or manoeuvres...";

pub struct ChatView<'a> {
    pub chat: &'a ChatSession,
    pub input: &'a LineInput,
    pub editing: bool,
    pub theme: &'a Theme,
}

impl<'a> ChatView<'a> {
    pub fn new(chat: &'a ChatSession, input: &'a LineInput, editing: bool, theme: &'a Theme) -> Self {
        Self {
            chat,
            input,
            editing,
            theme,
        }
    }

    /// Transcript as (speaker, text) rows, plus the status row if any.
    fn rows(&self) -> Vec<(Span<'a>, Style, &'a str)> {
        let colors = &self.theme.colors;
        let mut rows: Vec<(Span<'a>, Style, &'a str)> = self
            .chat
            .messages()
            .iter()
            .map(|m| match m.role {
                Role::User => (
                    Span::styled("You", Style::default().fg(colors.user_msg()).add_modifier(Modifier::BOLD)),
                    Style::default().fg(colors.fg()),
                    m.text.as_str(),
                ),
                Role::Model => (
                    Span::styled("Tutor", Style::default().fg(colors.model_msg()).add_modifier(Modifier::BOLD)),
                    Style::default().fg(colors.fg()),
                    m.text.as_str(),
                ),
            })
            .collect();

        if self.chat.is_pending() {
            rows.push((
                Span::styled("Tutor", Style::default().fg(colors.model_msg())),
                Style::default().fg(colors.muted()).add_modifier(Modifier::ITALIC),
                "is typing...",
            ));
        } else if let Some(ref error) = self.chat.error {
            rows.push((Span::raw(""), Style::default().fg(colors.error()), error.as_str()));
        }
        rows
    }
}

impl Widget for ChatView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(3)])
            .split(area);

        let transcript_block = Block::bordered()
            .title(" AI Tutor ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let transcript_area = transcript_block.inner(layout[0]);
        transcript_block.render(layout[0], buf);

        let width = transcript_area.width as usize;
        let mut lines: Vec<Line> = Vec::new();
        let mut height = 0usize;
        for (speaker, style, text) in self.rows() {
            if !speaker.content.is_empty() {
                lines.push(Line::from(speaker));
                height += 1;
            }
            for part in text.split('\n') {
                lines.push(Line::from(Span::styled(format!("  {part}"), style)));
            }
            height += wrapped_line_count(&format!("  {text}"), width);
            lines.push(Line::from(""));
            height += 1;
        }

        // Keep the newest message in view
        let scroll = height.saturating_sub(transcript_area.height as usize) as u16;
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(transcript_area, buf);

        let border = if self.editing {
            colors.border_focused()
        } else {
            colors.border()
        };
        Paragraph::new(input_line(self.input, self.editing, PLACEHOLDER, self.theme))
            .block(
                Block::bordered()
                    .title(" Message ")
                    .border_style(Style::default().fg(border)),
            )
            .render(layout[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::session::chat::GREETING;

    fn screen(chat: &ChatSession, height: u16) -> String {
        let theme = Theme::default();
        let input = LineInput::new("");
        let area = Rect::new(0, 0, 60, height);
        let mut buf = Buffer::empty(area);
        ChatView::new(chat, &input, false, &theme).render(area, &mut buf);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_greeting_and_placeholder_visible() {
        let chat = ChatSession::new();
        let text = screen(&chat, 14);
        assert!(text.contains(&GREETING[..20]));
        assert!(text.contains("Press Enter to ask"));
    }

    #[test]
    fn test_scrolls_to_newest_message() {
        let mut chat = ChatSession::new();
        for i in 0..6 {
            chat.send(&MockGateway, &format!("question number {i}"));
        }
        let text = screen(&chat, 12);
        assert!(!text.contains("Hello! I'm your K53"));
        assert!(text.contains("Mock Response"));
    }
}
