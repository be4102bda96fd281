use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::types::{strip_code_fences, ReasoningRequest, ReasoningResponse};
use super::{ReasoningError, TokenProvider};
use crate::config::ReasoningConfig;
use crate::pipeline::recovery::DecodingError;

/// One round trip to the reasoning service: system prompt + user message in, text out.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Returned text has surrounding code fences removed.
    async fn send(&self, system_prompt: &str, user_message: &str)
        -> Result<String, ReasoningError>;
}

/// Authenticated HTTPS client for the reasoning proxy.
pub struct HttpReasoningClient {
    config: ReasoningConfig,
    client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpReasoningClient {
    pub fn new(
        config: ReasoningConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ReasoningError> {
        reqwest::Url::parse(&config.endpoint).map_err(|e| {
            ReasoningError::Config(format!("invalid endpoint {}: {e}", config.endpoint))
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReasoningError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            tokens,
        })
    }

    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }

    fn classify_transport(&self, e: reqwest::Error) -> ReasoningError {
        if e.is_timeout() {
            ReasoningError::Network(format!(
                "Request timed out after {}s",
                self.config.timeout.as_secs()
            ))
        } else if e.is_connect() {
            ReasoningError::Network(format!(
                "Could not reach the analysis service at {}",
                self.config.endpoint
            ))
        } else {
            ReasoningError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl ReasoningClient for HttpReasoningClient {
    async fn send(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ReasoningError> {
        let token = self
            .tokens
            .id_token()
            .await
            .filter(|t| !t.is_empty())
            .ok_or(ReasoningError::AuthenticationRequired)?;

        let body = ReasoningRequest::single_turn(
            &self.config.model,
            self.config.max_tokens,
            system_prompt,
            user_message,
        );

        tracing::debug!(
            model = %self.config.model,
            system_len = system_prompt.len(),
            message_len = user_message.len(),
            "Sending reasoning request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(ReasoningError::AuthenticationRequired),
            StatusCode::TOO_MANY_REQUESTS => return Err(ReasoningError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "Reasoning service returned error status");
                return Err(ReasoningError::Http {
                    status: status.as_u16(),
                    body,
                });
            }
        }

        let raw = response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let parsed: ReasoningResponse =
            serde_json::from_str(&raw).map_err(|source| DecodingError {
                schema: "reasoning envelope",
                source,
            })?;

        let text = parsed.first_text().ok_or(ReasoningError::NoContent)?;
        tracing::debug!(
            response_len = text.len(),
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("none"),
            "Reasoning response received"
        );

        Ok(strip_code_fences(text))
    }
}

// ═══════════════════════════════════════════════════════════
// Mock client
// ═══════════════════════════════════════════════════════════

/// Scripted reply for [`MockReasoningClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful text, fence-stripped like the real client.
    Text(String),
    /// Successful text after a delay.
    Delayed(Duration, String),
    /// Never resolves. Only cancellation ends the call.
    Pending,
    Timeout,
    RateLimited,
    AuthenticationRequired,
    Status(u16, String),
    NoContent,
}

impl MockReply {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// A recorded call to [`MockReasoningClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_message: String,
}

/// Mock reasoning client for testing. Replies are consumed in order;
/// the last one repeats once the script runs out.
pub struct MockReasoningClient {
    replies: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockReasoningClient {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: MockReply) -> Self {
        Self::new(vec![reply])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn next_reply(&self) -> MockReply {
        let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
        if replies.len() > 1 {
            replies.pop_front().unwrap_or(MockReply::NoContent)
        } else {
            replies.front().cloned().unwrap_or(MockReply::NoContent)
        }
    }
}

#[async_trait]
impl ReasoningClient for MockReasoningClient {
    async fn send(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ReasoningError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                user_message: user_message.to_string(),
            });

        match self.next_reply() {
            MockReply::Text(text) => Ok(strip_code_fences(&text)),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(strip_code_fences(&text))
            }
            MockReply::Pending => std::future::pending::<Result<String, ReasoningError>>().await,
            MockReply::Timeout => Err(ReasoningError::Network(
                "Request timed out after 90s".into(),
            )),
            MockReply::RateLimited => Err(ReasoningError::RateLimited),
            MockReply::AuthenticationRequired => Err(ReasoningError::AuthenticationRequired),
            MockReply::Status(status, body) => Err(ReasoningError::Http { status, body }),
            MockReply::NoContent => Err(ReasoningError::NoContent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::reasoning::StaticTokenProvider;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> HttpReasoningClient {
        let config = ReasoningConfig::default().with_endpoint(server.uri());
        let tokens: Arc<dyn TokenProvider> = match token {
            Some(t) => Arc::new(StaticTokenProvider::new(t)),
            None => Arc::new(StaticTokenProvider::signed_out()),
        };
        HttpReasoningClient::new(config, tokens).unwrap()
    }

    fn text_body(text: &str) -> serde_json::Value {
        json!({
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn"
        })
    }

    #[tokio::test]
    async fn sends_expected_request_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer test_token"))
            .and(body_json(json!({
                "model": "claude-haiku-4-5-20251001",
                "max_tokens": 2048,
                "system": "be brief",
                "messages": [{"role": "user", "content": "my knee hurts"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("{\"ok\":true}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test_token"));
        let text = client.send("be brief", "my knee hurts").await.unwrap();
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn strips_fences_from_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_body("```json\n{\"a\":1}\n```")),
            )
            .mount(&server)
            .await;

        let text = client_for(&server, Some("t")).send("s", "u").await.unwrap();
        assert_eq!(text, "{\"a\":1}");
    }

    #[tokio::test]
    async fn missing_token_fails_without_calling_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("x")))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, None).send("s", "u").await.unwrap_err();
        assert!(matches!(err, ReasoningError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn unauthorized_is_authentication_required() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid or expired token"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, Some("stale")).send("s", "u").await.unwrap_err();
        assert!(matches!(err, ReasoningError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": "Rate limit exceeded. Please wait before trying again."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("t")).send("s", "u").await.unwrap_err();
        assert!(matches!(err, ReasoningError::RateLimited));
    }

    #[tokio::test]
    async fn other_status_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(502).set_body_json(json!({"error": "Failed to reach AI service"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, Some("t")).send("s", "u").await.unwrap_err();
        match &err {
            ReasoningError::Http { status, body } => {
                assert_eq!(*status, 502);
                assert!(body.contains("Failed to reach AI service"));
            }
            other => panic!("expected Http, got {other:?}"),
        }
        assert_eq!(err.user_message(), "API error (502): Failed to reach AI service");
    }

    #[tokio::test]
    async fn empty_text_is_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("")))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("t")).send("s", "u").await.unwrap_err();
        assert!(matches!(err, ReasoningError::NoContent));
    }

    #[tokio::test]
    async fn malformed_envelope_is_decoding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("t")).send("s", "u").await.unwrap_err();
        assert!(matches!(err, ReasoningError::Decoding(_)));
    }

    #[tokio::test]
    async fn slow_service_times_out_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_body("late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = ReasoningConfig::default()
            .with_endpoint(server.uri())
            .with_timeout(Duration::from_millis(200));
        let client =
            HttpReasoningClient::new(config, Arc::new(StaticTokenProvider::new("t"))).unwrap();

        let err = client.send("s", "u").await.unwrap_err();
        assert!(matches!(err, ReasoningError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        let config = ReasoningConfig::default().with_endpoint("http://127.0.0.1:9/analyze");
        let client =
            HttpReasoningClient::new(config, Arc::new(StaticTokenProvider::new("t"))).unwrap();
        let err = client.send("s", "u").await.unwrap_err();
        assert!(matches!(err, ReasoningError::Network(_)), "got {err:?}");
    }

    #[test]
    fn invalid_endpoint_is_config_error() {
        let config = ReasoningConfig::default().with_endpoint("not a url");
        let result = HttpReasoningClient::new(config, Arc::new(StaticTokenProvider::new("t")));
        assert!(matches!(result, Err(ReasoningError::Config(_))));
    }

    #[tokio::test]
    async fn mock_replays_script_then_repeats_last() {
        let mock = MockReasoningClient::new(vec![
            MockReply::Timeout,
            MockReply::text("```json\n{}\n```"),
        ]);
        assert!(matches!(
            mock.send("s", "1").await,
            Err(ReasoningError::Network(_))
        ));
        assert_eq!(mock.send("s", "2").await.unwrap(), "{}");
        assert_eq!(mock.send("s", "3").await.unwrap(), "{}");
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.calls()[1].user_message, "2");
    }
}
