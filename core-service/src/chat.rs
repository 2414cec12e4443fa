//! Advising conversations.

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use core_auth::AuthGateway;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

const CHATS_PATH: &str = "/api/chats";
const SEND_PATH: &str = "/api/chat/send";

fn chat_path(chat_id: &str) -> String {
    format!("/api/chat/{}", chat_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Policy the advisor cited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub vault_id: String,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Structured answer produced by the advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorResponse {
    pub direct_answer: String,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub sources_used: Vec<SourceRef>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub advisor_needed: bool,
    #[serde(default)]
    pub clarifying_question: Option<String>,
    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub structured_response: Option<AdvisorResponse>,
}

/// Sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: Option<&'a str>,
    message: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendMessageResponse {
    pub chat_id: String,
    pub response: AdvisorResponse,
}

#[derive(Debug, Clone)]
pub struct ChatApi {
    gateway: Arc<AuthGateway>,
}

impl ChatApi {
    pub fn new(gateway: Arc<AuthGateway>) -> Self {
        Self { gateway }
    }

    /// The signed-in student's conversations, most recent first.
    pub async fn list(&self) -> ApiResult<Vec<ChatSummary>> {
        Ok(self.gateway.get_json(CHATS_PATH).await?)
    }

    pub async fn get(&self, chat_id: &str) -> ApiResult<ChatSession> {
        Ok(self.gateway.get_json(&chat_path(chat_id)).await?)
    }

    /// Ask the advisor. Without `chat_id` a new conversation is started.
    #[instrument(skip(self, message), fields(new_chat = chat_id.is_none()))]
    pub async fn send(&self, chat_id: Option<&str>, message: &str) -> ApiResult<SendMessageResponse> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ApiError::Validation("Message cannot be empty".to_string()));
        }

        let response: SendMessageResponse = self
            .gateway
            .post_json(SEND_PATH, &SendMessageRequest { chat_id, message })
            .await?;
        debug!(chat_id = %response.chat_id, risk = ?response.response.risk_level, "Advisor replied");
        Ok(response)
    }

    pub async fn delete(&self, chat_id: &str) -> ApiResult<()> {
        Ok(self.gateway.delete(&chat_path(chat_id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Backend, TestClient};
    use bridge_traits::HttpMethod;

    const REPLY: &str = r#"{
        "chat_id": "chat_5d1e",
        "response": {
            "direct_answer": "You can still withdraw until April 3rd.",
            "next_steps": ["Talk to your advisor", "Check your aid status"],
            "sources_used": [{"vault_id": "PSU-CAL-001", "title": "Academic Calendar", "link": "https://example.edu/cal"}],
            "risk_level": "medium",
            "advisor_needed": true,
            "clarifying_question": null,
            "confidence": 0.8
        }
    }"#;

    #[tokio::test]
    async fn test_send_new_chat() {
        let backend = Backend::new().on(HttpMethod::Post, SEND_PATH, 200, REPLY);
        let client = TestClient::signed_in(backend, true).await;

        let reply = client
            .chat()
            .send(None, "  Can I still drop a class?  ")
            .await
            .expect("reply");

        assert_eq!(reply.chat_id, "chat_5d1e");
        assert_eq!(reply.response.risk_level, RiskLevel::Medium);
        assert!(reply.response.advisor_needed);
        assert_eq!(reply.response.sources_used[0].vault_id, "PSU-CAL-001");
        assert!(reply.response.extra.contains_key("confidence"));

        let sent: serde_json::Value =
            serde_json::from_slice(&client.backend.last_body().expect("body")).expect("json");
        assert_eq!(sent["chat_id"], serde_json::Value::Null);
        assert_eq!(sent["message"], "Can I still drop a class?");
    }

    #[tokio::test]
    async fn test_empty_message_rejected_locally() {
        let client = TestClient::signed_in(Backend::new(), true).await;

        let err = client.chat().send(Some("chat_5d1e"), "   ").await.expect_err("empty");

        assert!(err.is_validation());
        assert_eq!(client.backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_get_session_with_messages() {
        let backend = Backend::new().on(
            HttpMethod::Get,
            "/api/chat/chat_5d1e",
            200,
            r#"{
                "id": "chat_5d1e",
                "title": "Dropping a class",
                "messages": [
                    {"role": "user", "content": "Can I drop?", "timestamp": "2026-02-01T10:00:00Z"},
                    {"role": "assistant", "content": "Yes.", "structured_response": {"direct_answer": "Yes."}}
                ]
            }"#,
        );
        let client = TestClient::signed_in(backend, true).await;

        let session = client.chat().get("chat_5d1e").await.expect("session");

        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].role, Role::User);
        assert!(session.messages[0].timestamp.is_some());
        assert_eq!(
            session.messages[1]
                .structured_response
                .as_ref()
                .map(|r| r.risk_level),
            Some(RiskLevel::Low)
        );
    }

    #[tokio::test]
    async fn test_delete_missing_chat_is_not_found() {
        let backend = Backend::new().on(
            HttpMethod::Delete,
            "/api/chat/gone",
            404,
            r#"{"detail":"Chat session not found"}"#,
        );
        let client = TestClient::signed_in(backend, true).await;

        let err = client.chat().delete("gone").await.expect_err("missing");

        assert!(matches!(err, ApiError::NotFound(ref detail) if detail == "Chat session not found"));
    }

    #[tokio::test]
    async fn test_expired_session_while_listing() {
        let backend = Backend::new().on(HttpMethod::Get, CHATS_PATH, 401, "");
        let client = TestClient::signed_in(backend, true).await;

        let err = client.chat().list().await.expect_err("expired");

        assert!(matches!(err, ApiError::Unauthenticated));
        assert!(!client.auth().is_authenticated());
        assert_eq!(
            client.navigator.history.lock().expect("nav").last().map(|(p, _)| p.clone()),
            Some("/login".to_string())
        );
    }
}
