use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::simulator::SimulatorSession;
use crate::telemetry::generator::{MAX_SPEED, MAX_STEERING, SESSION_SECONDS};
use crate::telemetry::summary::URBAN_SPEED_LIMIT;
use crate::ui::components::chart::LineChart;
use crate::ui::theme::Theme;

pub struct SimulatorView<'a> {
    pub session: &'a SimulatorSession,
    pub analysis_scroll: u16,
    pub theme: &'a Theme,
}

impl<'a> SimulatorView<'a> {
    pub fn new(session: &'a SimulatorSession, analysis_scroll: u16, theme: &'a Theme) -> Self {
        Self {
            session,
            analysis_scroll,
            theme,
        }
    }

    fn summary_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let s = self.session.summary();
        let label = Style::default().fg(colors.muted());
        let value = Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD);
        let flagged = |count: u32| {
            if count > 0 {
                Style::default().fg(colors.warning()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.success())
            }
        };

        vec![
            Line::from(vec![
                Span::styled(" Peak speed ", label),
                Span::styled(format!("{:.1} km/h", s.peak_speed), value),
                Span::styled("   Average ", label),
                Span::styled(format!("{:.1} km/h", s.average_speed), value),
                Span::styled("   Max steering ", label),
                Span::styled(format!("{:.0}\u{b0}", s.max_steering), value),
            ]),
            Line::from(vec![
                Span::styled(format!(" Over {URBAN_SPEED_LIMIT:.0} km/h "), label),
                Span::styled(format!("{} s", s.seconds_over_limit), flagged(s.seconds_over_limit)),
                Span::styled("   Harsh braking ", label),
                Span::styled(format!("{} s", s.harsh_brake_seconds), flagged(s.harsh_brake_seconds)),
                Span::styled("   Steering wheel: not connected", label),
            ]),
        ]
    }

    fn analysis_paragraph(&self) -> Paragraph<'a> {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" AI Instructor Analysis ")
            .border_style(Style::default().fg(colors.border()));

        let lines: Vec<Line> = if self.session.is_analyzing() {
            vec![Line::from(Span::styled("Analyzing...", Style::default().fg(colors.highlight())))]
        } else if let Some(ref error) = self.session.error {
            vec![Line::from(Span::styled(error.as_str(), Style::default().fg(colors.error())))]
        } else if let Some(ref analysis) = self.session.analysis {
            analysis
                .lines()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.model_msg()))))
                .collect()
        } else {
            vec![Line::from(Span::styled(
                "Press [a] to get AI feedback on this drive.",
                Style::default().fg(colors.muted()),
            ))]
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.analysis_scroll, 0))
    }
}

impl Widget for SimulatorView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Driver's Simulator Replay ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Percentage(55),
                Constraint::Min(4),
            ])
            .split(inner);

        Paragraph::new(self.summary_lines()).render(layout[0], buf);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);

        let telemetry = self.session.telemetry();
        let speed: Vec<(f64, f64)> = telemetry.iter().map(|p| (p.time as f64, p.speed)).collect();
        let steering: Vec<(f64, f64)> = telemetry
            .iter()
            .map(|p| (p.time as f64, p.steering_angle))
            .collect();
        let x_bounds = [0.0, (SESSION_SECONDS - 1) as f64];

        LineChart::new("Speed", self.theme)
            .series("speed", &speed, colors.success())
            .x_axis("Time (s)", x_bounds)
            .y_axis("km/h", [0.0, MAX_SPEED])
            .render(charts[0], buf);
        LineChart::new("Steering Angle", self.theme)
            .series("steering", &steering, colors.accent())
            .x_axis("Time (s)", x_bounds)
            .y_axis("deg", [-MAX_STEERING, MAX_STEERING])
            .render(charts[1], buf);

        self.analysis_paragraph().render(layout[2], buf);
    }
}
