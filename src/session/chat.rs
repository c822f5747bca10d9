use serde::{Deserialize, Serialize};

use crate::gateway::{AiGateway, GatewayError};

pub const GREETING: &str =
    "Hello! I'm your K53 AI Tutor. Ask me anything about the learner's or driver's license tests.";
pub const SEND_FAILED_MESSAGE: &str = "Sorry, I couldn't get a response. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: &str) -> Self {
        Self {
            role: Role::User,
            text: text.to_string(),
        }
    }

    pub fn model(text: &str) -> Self {
        Self {
            role: Role::Model,
            text: text.to_string(),
        }
    }
}

/// Payload for one `converse` round-trip.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub history: Vec<ChatMessage>,
    pub message: String,
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    pending: bool,
    pub error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::model(GREETING)],
            pending: false,
            error: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Append the user turn and hand back the request to run. None when the
    /// text is blank or a reply is still outstanding.
    pub fn begin_send(&mut self, text: &str) -> Option<ChatRequest> {
        if text.trim().is_empty() || self.pending {
            return None;
        }
        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(text));
        self.pending = true;
        self.error = None;
        Some(ChatRequest {
            history,
            message: text.to_string(),
        })
    }

    /// The user turn stays in the transcript whether or not the reply arrived.
    pub fn finish_send(&mut self, result: Result<String, GatewayError>) {
        if !self.pending {
            return;
        }
        self.pending = false;
        match result {
            Ok(reply) => self.messages.push(ChatMessage::model(&reply)),
            Err(err) => {
                tracing::error!(%err, "chat turn failed");
                self.error = Some(SEND_FAILED_MESSAGE.to_string());
            }
        }
    }

    pub fn send(&mut self, gateway: &dyn AiGateway, text: &str) {
        if let Some(request) = self.begin_send(text) {
            let result = gateway.converse(&request.history, &request.message);
            self.finish_send(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::session::quiz::Question;
    use crate::telemetry::TelemetryPoint;
    use std::sync::Mutex;

    /// Records what it was asked and fails on demand.
    struct ScriptedGateway {
        fail: bool,
        seen: Mutex<Vec<(usize, String)>>,
    }

    impl AiGateway for ScriptedGateway {
        fn generate_questions(&self, _count: usize) -> Result<Vec<Question>, GatewayError> {
            Ok(Vec::new())
        }

        fn analyze_session(&self, _telemetry: &[TelemetryPoint]) -> Result<String, GatewayError> {
            Ok(String::new())
        }

        fn converse(&self, history: &[ChatMessage], message: &str) -> Result<String, GatewayError> {
            self.seen
                .lock()
                .unwrap()
                .push((history.len(), message.to_string()));
            if self.fail {
                Err(GatewayError::Status(503))
            } else {
                Ok(format!("echo: {message}"))
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn scripted(fail: bool) -> ScriptedGateway {
        ScriptedGateway {
            fail,
            seen: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_starts_with_greeting() {
        let chat = ChatSession::new();
        assert_eq!(chat.messages(), &[ChatMessage::model(GREETING)]);
    }

    #[test]
    fn test_successful_sends_grow_by_pairs() {
        let mut chat = ChatSession::new();
        for n in 1..=4 {
            chat.send(&MockGateway, &format!("question {n}"));
            assert_eq!(chat.messages().len(), 1 + 2 * n);
        }
        assert_eq!(chat.messages()[1].role, Role::User);
        assert_eq!(chat.messages()[2].role, Role::Model);
    }

    #[test]
    fn test_failed_send_keeps_user_message() {
        let mut chat = ChatSession::new();
        chat.send(&MockGateway, "first");
        chat.send(&scripted(true), "second");
        assert_eq!(chat.messages().len(), 1 + 2 + 1);
        assert_eq!(chat.messages().last(), Some(&ChatMessage::user("second")));
        assert_eq!(chat.error.as_deref(), Some(SEND_FAILED_MESSAGE));
        assert!(!chat.is_pending());
    }

    #[test]
    fn test_history_excludes_new_message() {
        let gateway = scripted(false);
        let mut chat = ChatSession::new();
        chat.send(&gateway, "one");
        chat.send(&gateway, "two");
        let seen = gateway.seen.lock().unwrap();
        assert_eq!(*seen, vec![(1, "one".to_string()), (3, "two".to_string())]);
        assert_eq!(chat.messages()[4].text, "echo: two");
    }

    #[test]
    fn test_blank_input_ignored() {
        let mut chat = ChatSession::new();
        assert!(chat.begin_send("   ").is_none());
        assert!(chat.begin_send("").is_none());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn test_send_rejected_while_pending() {
        let mut chat = ChatSession::new();
        let request = chat.begin_send("first").unwrap();
        assert_eq!(request.history.len(), 1);
        assert!(chat.begin_send("second").is_none());
        assert_eq!(chat.messages().len(), 2);
        chat.finish_send(Ok("reply".to_string()));
        assert!(chat.begin_send("second").is_some());
    }

    #[test]
    fn test_error_cleared_by_next_send() {
        let mut chat = ChatSession::new();
        chat.send(&scripted(true), "first");
        assert!(chat.error.is_some());
        chat.send(&MockGateway, "again");
        assert!(chat.error.is_none());
        assert_eq!(chat.messages().len(), 4);
    }
}
