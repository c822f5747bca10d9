use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::quiz::{QuizPhase, QuizSession};
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

const OPTION_KEYS: [char; 4] = ['A', 'B', 'C', 'D'];

pub struct QuizView<'a> {
    pub quiz: &'a QuizSession,
    pub question_count: usize,
    pub review_scroll: u16,
    pub theme: &'a Theme,
}

impl<'a> QuizView<'a> {
    pub fn new(quiz: &'a QuizSession, question_count: usize, review_scroll: u16, theme: &'a Theme) -> Self {
        Self {
            quiz,
            question_count,
            review_scroll,
            theme,
        }
    }

    fn render_intro(&self, area: Rect, buf: &mut Buffer, loading: bool) {
        let colors = &self.theme.colors;
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Learner's Licence Practice Test",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "{} multiple choice questions on road signs, rules of the road and vehicle controls.",
                    self.question_count
                ),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        if loading {
            lines.push(Line::from(Span::styled(
                "Generating questions...",
                Style::default().fg(colors.highlight()),
            )));
        } else {
            if let Some(ref error) = self.quiz.error {
                lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(colors.error()))));
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                "Press Enter to start the test",
                Style::default().fg(colors.accent()),
            )));
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_active(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(question) = self.quiz.current_question() else {
            return;
        };
        let total = self.quiz.questions.len();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(question.options.len() as u16 * 2),
            ])
            .split(area);

        ProgressBar::new("Progress", self.quiz.current as f64 / total as f64, self.theme)
            .caption(format!("Question {} of {}", self.quiz.current + 1, total))
            .render(layout[0], buf);

        Paragraph::new(Line::from(Span::styled(
            question.prompt.as_str(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true })
        .render(layout[2], buf);

        let options: Vec<Line> = question
            .options
            .iter()
            .enumerate()
            .flat_map(|(i, option)| {
                let selected = i == self.quiz.selected;
                let style = if selected {
                    Style::default()
                        .fg(colors.accent())
                        .bg(colors.accent_dim())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                let key = OPTION_KEYS.get(i).copied().unwrap_or(' ');
                [
                    Line::from(Span::styled(format!(" {key}) {option}"), style)),
                    Line::from(""),
                ]
            })
            .collect();
        Paragraph::new(options).render(layout[3], buf);
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let percentage = self.quiz.percentage();
        let score_color = match percentage {
            80.. => colors.success(),
            50..=79 => colors.warning(),
            _ => colors.error(),
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        Paragraph::new(vec![
            Line::from(Span::styled(
                "Test Complete",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("You scored ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{} / {} ({percentage}%)", self.quiz.score, self.quiz.questions.len()),
                    Style::default().fg(score_color).add_modifier(Modifier::BOLD),
                ),
            ]),
        ])
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let mut review: Vec<Line> = Vec::new();
        for (i, question) in self.quiz.questions.iter().enumerate() {
            let answer = self.quiz.answers.get(i).map_or("", String::as_str);
            let correct = self.quiz.is_correct(i);
            let (mark, mark_color) = if correct {
                ("correct", colors.success())
            } else {
                ("incorrect", colors.error())
            };
            review.push(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(colors.muted())),
                Span::styled(question.prompt.as_str(), Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)),
            ]));
            review.push(Line::from(vec![
                Span::styled("   Your answer: ", Style::default().fg(colors.muted())),
                Span::styled(answer, Style::default().fg(mark_color)),
                Span::styled(format!(" ({mark})"), Style::default().fg(mark_color)),
            ]));
            if !correct {
                review.push(Line::from(vec![
                    Span::styled("   Correct answer: ", Style::default().fg(colors.muted())),
                    Span::styled(question.correct_answer.as_str(), Style::default().fg(colors.success())),
                ]));
            }
            if !question.explanation.is_empty() {
                review.push(Line::from(Span::styled(
                    format!("   {}", question.explanation),
                    Style::default().fg(colors.muted()),
                )));
            }
            review.push(Line::from(""));
        }

        Paragraph::new(review)
            .block(
                Block::bordered()
                    .title(" Review ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.review_scroll, 0))
            .render(layout[1], buf);
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Learner's Test ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        match self.quiz.phase {
            QuizPhase::Idle => self.render_intro(inner, buf, false),
            QuizPhase::Loading => self.render_intro(inner, buf, true),
            QuizPhase::Active => self.render_active(inner, buf),
            QuizPhase::Results => self.render_results(inner, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;

    fn rendered_text(quiz: &QuizSession) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 90, 30);
        let mut buf = Buffer::empty(area);
        QuizView::new(quiz, 10, 0, &theme).render(area, &mut buf);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_idle_shows_error() {
        let mut quiz = QuizSession::new();
        quiz.error = Some("Could not load questions. Please try again.".to_string());
        assert!(rendered_text(&quiz).contains("Could not load questions"));
    }

    #[test]
    fn test_active_shows_question_and_options() {
        let mut quiz = QuizSession::new();
        quiz.start(&MockGateway, 2);
        let text = rendered_text(&quiz);
        assert!(text.contains("Question 1 of 2"));
        assert!(text.contains("C) No Entry"));
    }

    #[test]
    fn test_results_show_score() {
        let mut quiz = QuizSession::new();
        quiz.start(&MockGateway, 2);
        quiz.answer("No Entry");
        quiz.answer("Stop");
        let text = rendered_text(&quiz);
        assert!(text.contains("1 / 2 (50%)"));
        assert!(text.contains("Correct answer: No Entry"));
    }
}
