#[cfg(feature = "network")]
pub mod gemini;
pub mod mock;
pub mod prompts;

use std::sync::Arc;

use crate::config::{BackendChoice, Config, ConfigError};
use crate::session::chat::ChatMessage;
use crate::session::quiz::Question;
use crate::telemetry::TelemetryPoint;

pub use mock::MockGateway;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[cfg(feature = "network")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("model endpoint returned status {0}")]
    Status(u16),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The three model round-trips the app makes. Every call is attempt-once:
/// no retry, no caching, no partial results.
pub trait AiGateway: Send + Sync {
    fn generate_questions(&self, count: usize) -> Result<Vec<Question>, GatewayError>;

    /// Free-form driving feedback for a session. Implementations send at most
    /// `prompts::ANALYSIS_SAMPLE_LIMIT` samples.
    fn analyze_session(&self, telemetry: &[TelemetryPoint]) -> Result<String, GatewayError>;

    /// `history` is the transcript before `message`; `message` is the new
    /// user turn.
    fn converse(&self, history: &[ChatMessage], message: &str) -> Result<String, GatewayError>;

    fn name(&self) -> &'static str;
}

/// Pick the gateway once at startup. `force_mock` comes from the CLI.
pub fn from_config(config: &Config, force_mock: bool) -> Result<Arc<dyn AiGateway>, ConfigError> {
    if force_mock {
        return Ok(Arc::new(MockGateway));
    }
    match config.backend_choice()? {
        BackendChoice::Mock => Ok(Arc::new(MockGateway)),
        #[cfg(feature = "network")]
        BackendChoice::Gemini { api_key } => match gemini::GeminiGateway::new(&config.ai, api_key) {
            Ok(gateway) => Ok(Arc::new(gateway)),
            Err(err) => {
                tracing::error!(%err, "could not build HTTP client, using mock backend");
                Ok(Arc::new(MockGateway))
            }
        },
        #[cfg(not(feature = "network"))]
        BackendChoice::Gemini { .. } => {
            tracing::warn!("built without the network feature, using mock backend");
            Ok(Arc::new(MockGateway))
        }
    }
}

/// Drop questions the quiz could never score: anything without exactly four
/// options, or whose answer is not one of them.
pub fn retain_valid(questions: Vec<Question>) -> Vec<Question> {
    let before = questions.len();
    let valid: Vec<Question> = questions.into_iter().filter(Question::is_well_formed).collect();
    if valid.len() != before {
        tracing::warn!(discarded = before - valid.len(), "discarded malformed questions");
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], answer: &str) -> Question {
        Question {
            prompt: "?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: answer.to_string(),
            explanation: String::new(),
        }
    }

    #[test]
    fn test_retain_valid_filters_malformed() {
        let questions = vec![
            question(&["a", "b", "c", "d"], "c"),
            question(&["a", "b", "c"], "a"),
            question(&["a", "b", "c", "d"], "e"),
            question(&["a", "b", "c", "d"], "A"),
        ];
        let kept = retain_valid(questions);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].correct_answer, "c");
    }

    #[test]
    fn test_force_mock_wins() {
        let mut config = Config::default();
        config.ai.backend = "gemini".to_string();
        config.ai.api_key = Some("key".to_string());
        let gateway = from_config(&config, true).unwrap();
        assert_eq!(gateway.name(), "mock");
    }

    #[test]
    fn test_mock_backend_from_config() {
        let mut config = Config::default();
        config.ai.backend = "mock".to_string();
        let gateway = from_config(&config, false).unwrap();
        assert_eq!(gateway.name(), "mock");
    }
}
