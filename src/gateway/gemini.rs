//! Client for the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AiConfig;
use crate::gateway::{AiGateway, GatewayError, prompts, retain_valid};
use crate::session::chat::{ChatMessage, Role};
use crate::session::quiz::Question;
use crate::telemetry::TelemetryPoint;

pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiGateway {
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        tracing::debug!(model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "model request rejected");
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response.json()?;
        body.text().ok_or(GatewayError::EmptyResponse)
    }
}

impl AiGateway for GeminiGateway {
    fn generate_questions(&self, count: usize) -> Result<Vec<Question>, GatewayError> {
        let text = self.generate(&questions_request(count))?;
        let questions = parse_questions(&text)?;
        tracing::info!(requested = count, received = questions.len(), "questions generated");
        Ok(questions)
    }

    fn analyze_session(&self, telemetry: &[TelemetryPoint]) -> Result<String, GatewayError> {
        self.generate(&analysis_request(telemetry)?)
    }

    fn converse(&self, history: &[ChatMessage], message: &str) -> Result<String, GatewayError> {
        self.generate(&chat_request(history, message))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&'static str>, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, None if blank.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

#[derive(Debug, Deserialize)]
struct QuestionsEnvelope {
    questions: Vec<Question>,
}

fn questions_request(count: usize) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content::text(Some("user"), &prompts::questions_prompt(count))],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json",
            response_schema: prompts::questions_schema(),
        }),
    }
}

fn analysis_request(telemetry: &[TelemetryPoint]) -> Result<GenerateRequest, GatewayError> {
    Ok(GenerateRequest {
        contents: vec![Content::text(Some("user"), &prompts::analysis_prompt(telemetry)?)],
        system_instruction: None,
        generation_config: None,
    })
}

fn chat_request(history: &[ChatMessage], message: &str) -> GenerateRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Model => "model",
            };
            Content::text(Some(role), &msg.text)
        })
        .collect();
    contents.push(Content::text(Some("user"), message));

    GenerateRequest {
        contents,
        system_instruction: Some(Content::text(None, prompts::CHAT_SYSTEM_INSTRUCTION)),
        generation_config: None,
    }
}

fn parse_questions(text: &str) -> Result<Vec<Question>, GatewayError> {
    let envelope: QuestionsEnvelope = serde_json::from_str(text.trim())?;
    Ok(retain_valid(envelope.questions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let history = vec![
            ChatMessage::model("Hello!"),
            ChatMessage::user("What is a stop street?"),
            ChatMessage::model("A junction where you must stop."),
        ];
        let request = chat_request(&history, "And a yield sign?");
        let json = serde_json::to_value(&request).unwrap();

        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 4);
        assert_eq!(contents[0]["role"], "model");
        assert_eq!(contents[1]["role"], "user");
        assert_eq!(contents[3]["parts"][0]["text"], "And a yield sign?");
        assert!(
            json["systemInstruction"]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("K53")
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_questions_request_asks_for_json() {
        let json = serde_json::to_value(questions_request(10)).unwrap();
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Keep "},{"text":"left."}],"role":"model"}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text().as_deref(), Some("Keep left."));
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(blocked.text().is_none());
    }

    #[test]
    fn test_parse_questions_keeps_valid_only() {
        let text = r#"{"questions":[
            {"question":"Q1","options":["a","b","c","d"],"correctAnswer":"b","explanation":"e"},
            {"question":"Q2","options":["a","b"],"correctAnswer":"a","explanation":"e"}
        ]}"#;
        let questions = parse_questions(text).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "Q1");
    }

    #[test]
    fn test_parse_questions_rejects_garbage() {
        assert!(matches!(
            parse_questions("Sure! Here are your questions"),
            Err(GatewayError::Decode(_))
        ));
    }
}
