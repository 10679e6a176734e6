// 🤖 AI Query Client - spending advice from a local generate endpoint
//
// Packages the current bills and a question into the fixed request shape,
// posts it, and pulls the `response` text out of the reply. Failures are
// logged and surface as "no reply"; the rest of the app never depends on
// the endpoint being up.

use crate::bill::Bill;
use crate::config::AiSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Instruction placed in front of every question
pub const SYSTEM_INSTRUCTION: &str =
    "You are a smart bill analysis assistant. Analyze the following bills and give spending advice:";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI is disabled in settings")]
    Disabled,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// WIRE TYPES
// ============================================================================

/// Inner payload, JSON-encoded into `GenerateRequest::prompt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub prompt: String,
    /// JSON array of the bills, as a string
    pub bills: String,
    pub msg: String,
}

/// Body of `POST /api/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub bills: String,
    pub stream: bool,
    pub prompt: String,
}

/// Assemble the request for `question` over `bills`.
pub fn build_request(model: &str, bills: &[Bill], question: &str) -> Result<GenerateRequest, AiError> {
    let bills_json = serde_json::to_string(bills)?;

    let message = PromptMessage {
        prompt: SYSTEM_INSTRUCTION.to_string(),
        bills: bills_json.clone(),
        msg: question.to_string(),
    };

    Ok(GenerateRequest {
        model: model.to_string(),
        bills: bills_json,
        stream: false,
        prompt: serde_json::to_string(&message)?,
    })
}

/// Text of the `response` key; empty when the key is absent or null.
pub fn extract_response(body: &str) -> Result<String, AiError> {
    let root: Value = serde_json::from_str(body)?;
    Ok(match root.get("response") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    enabled: bool,
}

impl AiClient {
    pub fn new(settings: &AiSettings) -> Result<Self, AiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(AiClient {
            http,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            enabled: settings.enabled,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Blocking call. Run it off the UI thread (see [`spawn_query`]).
    pub fn ask(&self, bills: &[Bill], question: &str) -> Result<String, AiError> {
        if !self.enabled {
            return Err(AiError::Disabled);
        }

        let request = build_request(&self.model, bills, question)?;
        info!(endpoint = %self.endpoint, bills = bills.len(), "sending AI query");

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_response(&body)
    }

    /// Like [`AiClient::ask`] but any failure is logged and becomes None.
    pub fn reply(&self, bills: &[Bill], question: &str) -> Option<String> {
        match self.ask(bills, question) {
            Ok(text) => Some(text),
            Err(e) => {
                error!("AI query failed: {}", e);
                None
            }
        }
    }
}

// ============================================================================
// BACKGROUND QUERIES
// ============================================================================

/// Outcome of one background query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiReply {
    pub question: String,
    pub reply: Option<String>,
}

impl AiReply {
    /// Chat line shown for this reply
    pub fn display_text(&self) -> String {
        match &self.reply {
            Some(text) => format!("AI: {}", text),
            None => "AI: (no reply)".to_string(),
        }
    }
}

/// Run the query on a worker thread. The caller polls the receiver from its
/// own loop and applies the reply there.
pub fn spawn_query(client: AiClient, bills: Vec<Bill>, question: String) -> Receiver<AiReply> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let reply = client.reply(&bills, &question);
        // Receiver gone means the UI already quit
        let _ = tx.send(AiReply { question, reply });
    });

    rx
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn sample_bills() -> Vec<Bill> {
        vec![Bill::new("2025-01-01 10:00", "Lunch", "Restaurant", "50 RMB", "Food")]
    }

    fn client_for(endpoint: String) -> AiClient {
        AiClient::new(&AiSettings {
            endpoint,
            timeout_secs: 5,
            ..AiSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_extract_response_valid() {
        let body = r#"{"model":"qwen2.5:0.5b","created_at":"2025-05-23T15:56:15.566Z","response":"This is the AI response.","done":true}"#;
        assert_eq!(extract_response(body).unwrap(), "This is the AI response.");
    }

    #[test]
    fn test_extract_response_missing_field() {
        let body = r#"{"model":"qwen2.5:0.5b","done":true}"#;
        assert_eq!(extract_response(body).unwrap(), "");
    }

    #[test]
    fn test_extract_response_invalid_json() {
        assert!(matches!(extract_response("this is not json"), Err(AiError::Json(_))));
    }

    #[test]
    fn test_build_request_shape() {
        let request = build_request("qwen2.5:0.5b", &sample_bills(), "Where did I spend most?").unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "qwen2.5:0.5b");
        assert_eq!(json["stream"], false);

        let message: PromptMessage = serde_json::from_str(&request.prompt).unwrap();
        assert_eq!(message.prompt, SYSTEM_INSTRUCTION);
        assert_eq!(message.msg, "Where did I spend most?");

        let bills: Vec<Bill> = serde_json::from_str(&message.bills).unwrap();
        assert_eq!(bills, sample_bills());
        assert_eq!(request.bills, message.bills);
        assert!(message.bills.contains("\"type\":\"Food\""));
    }

    #[test]
    fn test_ask_returns_response_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .header("content-type", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "response": "Eat out less.", "done": true }));
        });

        let client = client_for(server.url("/api/generate"));
        let text = client.ask(&sample_bills(), "Any advice?").unwrap();

        mock.assert();
        assert_eq!(text, "Eat out less.");
    }

    #[test]
    fn test_error_status_becomes_no_reply() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(500).body("model not loaded");
        });

        let client = client_for(server.url("/api/generate"));
        assert!(matches!(
            client.ask(&sample_bills(), "Any advice?"),
            Err(AiError::Status { status: 500, .. })
        ));
        assert_eq!(client.reply(&sample_bills(), "Any advice?"), None);
    }

    #[test]
    fn test_unreachable_endpoint_is_not_fatal() {
        // Port 9 (discard) is not expected to run an HTTP server
        let client = client_for("http://127.0.0.1:9/api/generate".to_string());
        assert_eq!(client.reply(&sample_bills(), "hello"), None);
    }

    #[test]
    fn test_disabled_client_never_sends() {
        let client = AiClient::new(&AiSettings {
            enabled: false,
            ..AiSettings::default()
        })
        .unwrap();

        assert!(matches!(client.ask(&[], "hi"), Err(AiError::Disabled)));
    }

    #[test]
    fn test_spawn_query_delivers_reply() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200).json_body(serde_json::json!({ "response": "ok" }));
        });

        let rx = spawn_query(
            client_for(server.url("/api/generate")),
            sample_bills(),
            "status?".to_string(),
        );
        let reply = rx.recv_timeout(Duration::from_secs(10)).unwrap();

        assert_eq!(reply.question, "status?");
        assert_eq!(reply.display_text(), "AI: ok");
    }

    #[test]
    fn test_no_reply_display() {
        let reply = AiReply {
            question: "q".to_string(),
            reply: None,
        };
        assert_eq!(reply.display_text(), "AI: (no reply)");
    }
}
