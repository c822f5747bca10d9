use chrono::Utc;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::progress::{ProgressLog, relative_time};
use crate::ui::components::chart::LineChart;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

pub struct ProgressView<'a> {
    pub readiness: u32,
    pub log: &'a ProgressLog,
    pub theme: &'a Theme,
}

impl<'a> ProgressView<'a> {
    pub fn new(readiness: u32, log: &'a ProgressLog, theme: &'a Theme) -> Self {
        Self { readiness, log, theme }
    }

    fn stats_line(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.muted());
        let value = Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD);
        let average = self
            .log
            .average_percentage()
            .map_or_else(|| "-".to_string(), |avg| format!("{avg:.0}%"));
        let best = self
            .log
            .best_percentage()
            .map_or_else(|| "-".to_string(), |best| format!("{best}%"));
        Line::from(vec![
            Span::styled(" Tests taken ", label),
            Span::styled(self.log.quizzes().len().to_string(), value),
            Span::styled("   Average score ", label),
            Span::styled(average, value),
            Span::styled("   Best ", label),
            Span::styled(best, value),
            Span::styled("   Simulator reviews ", label),
            Span::styled(self.log.analyses().len().to_string(), value),
        ])
    }

    fn analysis_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        if self.log.analyses().is_empty() {
            return vec![Line::from(Span::styled(
                " No simulator sessions reviewed yet.",
                Style::default().fg(colors.muted()),
            ))];
        }
        let now = Utc::now();
        self.log
            .analyses()
            .iter()
            .rev()
            .map(|a| {
                Line::from(vec![
                    Span::styled(
                        format!(" {:<10}", relative_time(now, a.finished_at)),
                        Style::default().fg(colors.muted()),
                    ),
                    Span::styled(
                        format!(
                            "{}s drive, peak {:.0} km/h, {}s harsh braking  ",
                            a.summary.duration_secs, a.summary.peak_speed, a.summary.harsh_brake_seconds
                        ),
                        Style::default().fg(colors.fg()),
                    ),
                    Span::styled(a.excerpt.clone(), Style::default().fg(colors.model_msg())),
                ])
            })
            .collect()
    }
}

impl Widget for ProgressView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Progress Report ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(6),
            ])
            .split(inner);

        ProgressBar::new("Test readiness", self.readiness as f64 / 100.0, self.theme)
            .caption(format!("{}% (latest test score)", self.readiness))
            .render(layout[0], buf);

        Paragraph::new(self.stats_line()).render(layout[1], buf);

        let points = self.log.chart_points();
        let max_x = points.last().map_or(2.0, |&(x, _)| x.max(2.0));
        LineChart::new("Score History", self.theme)
            .series("score", &points, colors.success())
            .x_axis("Test #", [1.0, max_x])
            .y_axis("%", [0.0, 100.0])
            .render(layout[2], buf);

        Paragraph::new(self.analysis_lines())
            .block(
                Block::bordered()
                    .title(" Simulator Reviews ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(layout[3], buf);
    }
}
