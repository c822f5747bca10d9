use crate::gateway::{AiGateway, GatewayError};
use crate::session::chat::ChatMessage;
use crate::session::quiz::Question;
use crate::telemetry::TelemetryPoint;

pub const MOCK_ANALYSIS: &str = "Mock Analysis: The driver showed good control but had instances of harsh braking around the 30-second mark. Speed was generally well-maintained within limits. Steering was smooth through corners.";

pub const MOCK_REPLY: &str = "Mock Response: To perform a three-point turn, you should signal, check your mirrors and blind spots, and then proceed when it is safe to do so. Ensure you do not hit the curb.";

/// Offline backend with fixed content. Never fails.
pub struct MockGateway;

impl MockGateway {
    pub fn sample_question() -> Question {
        Question {
            prompt: "What does this road sign mean?".to_string(),
            options: vec![
                "Stop".to_string(),
                "Yield".to_string(),
                "No Entry".to_string(),
                "Speed Limit".to_string(),
            ],
            correct_answer: "No Entry".to_string(),
            explanation: "This sign indicates that vehicles are not allowed to enter this area."
                .to_string(),
        }
    }
}

impl AiGateway for MockGateway {
    fn generate_questions(&self, count: usize) -> Result<Vec<Question>, GatewayError> {
        Ok(vec![Self::sample_question(); count])
    }

    fn analyze_session(&self, _telemetry: &[TelemetryPoint]) -> Result<String, GatewayError> {
        Ok(MOCK_ANALYSIS.to_string())
    }

    fn converse(&self, _history: &[ChatMessage], _message: &str) -> Result<String, GatewayError> {
        Ok(MOCK_REPLY.to_string())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
