use serde::{Deserialize, Serialize};

use crate::gateway::{AiGateway, GatewayError};

pub const EMPTY_RESULT_MESSAGE: &str = "Could not load questions. Please try again.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch questions. Check your connection or API key.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == 4 && self.options.contains(&self.correct_answer)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    Idle,
    Loading,
    Active,
    Results,
}

pub struct QuizSession {
    pub phase: QuizPhase,
    pub questions: Vec<Question>,
    pub answers: Vec<String>,
    pub current: usize,
    pub score: usize,
    pub error: Option<String>,
    /// Highlighted option on the active question.
    pub selected: usize,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            phase: QuizPhase::Idle,
            questions: Vec::new(),
            answers: Vec::new(),
            current: 0,
            score: 0,
            error: None,
            selected: 0,
        }
    }

    /// Enter Loading. Returns false if a fetch is already in flight.
    pub fn begin_start(&mut self) -> bool {
        if self.phase == QuizPhase::Loading {
            return false;
        }
        self.phase = QuizPhase::Loading;
        self.error = None;
        true
    }

    pub fn finish_start(&mut self, result: Result<Vec<Question>, GatewayError>) {
        if self.phase != QuizPhase::Loading {
            return;
        }
        match result {
            Ok(questions) if !questions.is_empty() => {
                self.questions = questions;
                self.answers.clear();
                self.current = 0;
                self.score = 0;
                self.selected = 0;
                self.phase = QuizPhase::Active;
            }
            Ok(_) => {
                tracing::warn!("question generation returned nothing");
                self.error = Some(EMPTY_RESULT_MESSAGE.to_string());
                self.phase = QuizPhase::Idle;
            }
            Err(err) => {
                tracing::error!(%err, "question generation failed");
                self.error = Some(FETCH_FAILED_MESSAGE.to_string());
                self.phase = QuizPhase::Idle;
            }
        }
    }

    /// Synchronous start, for callers that can block on the gateway.
    pub fn start(&mut self, gateway: &dyn AiGateway, count: usize) {
        if self.begin_start() {
            let result = gateway.generate_questions(count);
            self.finish_start(result);
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == QuizPhase::Active {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    /// Record `choice` for the current question. Returns true when this
    /// answer completed the quiz.
    pub fn answer(&mut self, choice: &str) -> bool {
        let Some(question) = self.current_question() else {
            return false;
        };
        if choice == question.correct_answer {
            self.score += 1;
        }
        self.answers.push(choice.to_string());
        self.selected = 0;

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            false
        } else {
            self.phase = QuizPhase::Results;
            true
        }
    }

    pub fn answer_selected(&mut self) -> bool {
        let choice = self
            .current_question()
            .and_then(|q| q.options.get(self.selected))
            .cloned();
        match choice {
            Some(choice) => self.answer(&choice),
            None => false,
        }
    }

    fn option_count(&self) -> usize {
        self.current_question().map_or(0, |q| q.options.len())
    }

    pub fn select_next(&mut self) {
        let len = self.option_count();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.option_count();
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        }
    }

    /// Back to Idle; results are discarded.
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    pub fn percentage(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        (100.0 * self.score as f64 / self.questions.len() as f64).round() as u32
    }

    pub fn is_correct(&self, index: usize) -> bool {
        match (self.questions.get(index), self.answers.get(index)) {
            (Some(q), Some(a)) => *a == q.correct_answer,
            _ => false,
        }
    }
}
