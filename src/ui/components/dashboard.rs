use chrono::Utc;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::router::View;
use crate::session::progress::{Activity, ProgressLog, relative_time};
use crate::ui::theme::Theme;

const RECENT_LIMIT: usize = 6;

fn card_description(view: View) -> &'static str {
    match view {
        View::Learners => "AI-generated multiple choice questions on rules, signs and controls.",
        View::Drivers => "Review a simulated drive and get AI feedback on your technique.",
        View::Progress => "Quiz scores and simulator reviews from this session.",
        View::Chatbot => "Ask the AI tutor anything about the K53 tests.",
        _ => "",
    }
}

pub struct Dashboard<'a> {
    pub name: &'a str,
    pub days_to_target: Option<i64>,
    pub cards: &'a [View],
    pub selected: usize,
    pub progress: &'a ProgressLog,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        name: &'a str,
        days_to_target: Option<i64>,
        cards: &'a [View],
        selected: usize,
        progress: &'a ProgressLog,
        theme: &'a Theme,
    ) -> Self {
        Self {
            name,
            days_to_target,
            cards,
            selected,
            progress,
            theme,
        }
    }

    fn countdown(&self) -> Span<'static> {
        let colors = &self.theme.colors;
        match self.days_to_target {
            None => Span::styled(
                "Set a target test date on your profile.",
                Style::default().fg(colors.muted()),
            ),
            Some(days) if days > 1 => Span::styled(
                format!("{days} days until your test."),
                Style::default().fg(colors.highlight()),
            ),
            Some(1) => Span::styled("Your test is tomorrow!", Style::default().fg(colors.warning())),
            Some(0) => Span::styled("Your test is today. Good luck!", Style::default().fg(colors.warning())),
            Some(_) => Span::styled(
                "Your target date has passed; pick a new one on your profile.",
                Style::default().fg(colors.muted()),
            ),
        }
    }

    fn activity_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let recent = self.progress.recent(RECENT_LIMIT);
        if recent.is_empty() {
            return vec![Line::from(Span::styled(
                "  No activity yet. Take a practice test to get started.",
                Style::default().fg(colors.muted()),
            ))];
        }

        let now = Utc::now();
        recent
            .iter()
            .map(|activity| {
                let when = relative_time(now, activity.finished_at());
                let (label, detail) = match activity {
                    Activity::Quiz(q) => (
                        "Learner's test".to_string(),
                        format!("{}/{} ({}%)", q.score, q.total, q.percentage),
                    ),
                    Activity::Analysis(a) => (
                        "Simulator review".to_string(),
                        format!("peak {:.0} km/h", a.summary.peak_speed),
                    ),
                };
                Line::from(vec![
                    Span::styled(format!("  {label:<18}"), Style::default().fg(colors.fg())),
                    Span::styled(format!("{detail:<18}"), Style::default().fg(colors.accent())),
                    Span::styled(when, Style::default().fg(colors.muted())),
                ])
            })
            .collect()
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Dashboard ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(self.cards.len() as u16 * 3),
                Constraint::Length(1),
                Constraint::Min(3),
            ])
            .split(inner);

        let greeting = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("  Welcome back, {}!", self.name),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![Span::raw("  "), self.countdown()]),
        ]);
        greeting.render(layout[0], buf);

        let card_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(self.cards.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
            .split(layout[1]);
        for (i, (&view, row)) in self.cards.iter().zip(card_rows.iter()).enumerate() {
            let selected = i == self.selected;
            let indicator = if selected { ">" } else { " " };
            let label_style = Style::default()
                .fg(if selected { colors.accent() } else { colors.fg() })
                .add_modifier(if selected { Modifier::BOLD } else { Modifier::empty() });
            Paragraph::new(vec![
                Line::from(Span::styled(format!(" {indicator} {}", view.label()), label_style)),
                Line::from(Span::styled(
                    format!("     {}", card_description(view)),
                    Style::default().fg(colors.muted()),
                )),
            ])
            .wrap(Wrap { trim: false })
            .render(*row, buf);
        }

        Paragraph::new(Line::from(Span::styled(
            "  Recent activity",
            Style::default().fg(colors.highlight()).add_modifier(Modifier::BOLD),
        )))
        .render(layout[2], buf);
        Paragraph::new(self.activity_lines()).render(layout[3], buf);
    }
}
