use chrono::{DateTime, Utc};

use crate::session::quiz::QuizSession;
use crate::telemetry::summary::TelemetrySummary;

const EXCERPT_CHARS: usize = 90;

#[derive(Clone, Debug, PartialEq)]
pub struct QuizRecord {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub finished_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisRecord {
    pub summary: TelemetrySummary,
    pub excerpt: String,
    pub finished_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Activity<'a> {
    Quiz(&'a QuizRecord),
    Analysis(&'a AnalysisRecord),
}

impl Activity<'_> {
    pub fn finished_at(&self) -> DateTime<Utc> {
        match self {
            Activity::Quiz(r) => r.finished_at,
            Activity::Analysis(r) => r.finished_at,
        }
    }
}

/// What the user did this run. Not persisted.
#[derive(Default)]
pub struct ProgressLog {
    quizzes: Vec<QuizRecord>,
    analyses: Vec<AnalysisRecord>,
}

impl ProgressLog {
    pub fn record_quiz(&mut self, quiz: &QuizSession) -> &QuizRecord {
        self.quizzes.push(QuizRecord {
            score: quiz.score,
            total: quiz.questions.len(),
            percentage: quiz.percentage(),
            finished_at: Utc::now(),
        });
        &self.quizzes[self.quizzes.len() - 1]
    }

    pub fn record_analysis(&mut self, summary: TelemetrySummary, feedback: &str) {
        self.analyses.push(AnalysisRecord {
            summary,
            excerpt: excerpt(feedback),
            finished_at: Utc::now(),
        });
    }

    pub fn quizzes(&self) -> &[QuizRecord] {
        &self.quizzes
    }

    pub fn analyses(&self) -> &[AnalysisRecord] {
        &self.analyses
    }

    pub fn average_percentage(&self) -> Option<f64> {
        if self.quizzes.is_empty() {
            return None;
        }
        let total: u32 = self.quizzes.iter().map(|q| q.percentage).sum();
        Some(total as f64 / self.quizzes.len() as f64)
    }

    pub fn best_percentage(&self) -> Option<u32> {
        self.quizzes.iter().map(|q| q.percentage).max()
    }

    /// (attempt number, percentage) pairs for charting.
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.quizzes
            .iter()
            .enumerate()
            .map(|(i, q)| ((i + 1) as f64, q.percentage as f64))
            .collect()
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Vec<Activity<'_>> {
        let mut items: Vec<Activity<'_>> = self
            .quizzes
            .iter()
            .map(Activity::Quiz)
            .chain(self.analyses.iter().map(Activity::Analysis))
            .collect();
        items.sort_by_key(|a| std::cmp::Reverse(a.finished_at()));
        items.truncate(limit);
        items
    }
}

/// First line of the feedback, cut to a readable length.
fn excerpt(text: &str) -> String {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if first.chars().count() <= EXCERPT_CHARS {
        first.to_string()
    } else {
        let cut: String = first.chars().take(EXCERPT_CHARS - 1).collect();
        format!("{}\u{2026}", cut.trim_end())
    }
}

pub fn relative_time(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(then).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{} min ago", secs / 60),
        3600..=86_399 => format!("{} h ago", secs / 3600),
        _ => format!("{} d ago", secs / 86_400),
    }
}
