//! REST client for the form submission endpoints.
//!
//! Sends a [`SubmissionRequest`] as exactly one POST and interprets the
//! response: 2xx yields a [`SubmissionResult`], anything else a
//! [`SubmissionError`]. There are no retries; submissions are not
//! idempotent.

use std::time::{Duration, Instant};

use quoteflow_core::submission::{
    SubmissionError, SubmissionRequest, SubmissionResult, Submitter, APPLICATION_DATA_PART,
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::config::ClientConfig;

/// HTTP client for the agency's form API.
#[derive(Debug, Clone)]
pub struct QuoteApi {
    client: reqwest::Client,
    base_url: String,
}

impl QuoteApi {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a form endpoint. Absolute endpoints pass through.
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Perform one submission.
    pub async fn send(
        &self,
        request: &SubmissionRequest,
    ) -> Result<SubmissionResult, SubmissionError> {
        let url = self.url_for(request.endpoint());
        let started = Instant::now();

        let builder = match request {
            SubmissionRequest::Json { body, .. } => self.client.post(&url).json(body),
            SubmissionRequest::Multipart {
                application_data,
                files,
                ..
            } => {
                let mut form = Form::new().text(APPLICATION_DATA_PART, application_data.to_string());
                for file in files {
                    let part = Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.content_type)
                        .map_err(|e| {
                            SubmissionError::Network(format!(
                                "Could not prepare '{}' for upload: {e}",
                                file.file_name
                            ))
                        })?;
                    form = form.part(file.slot.clone(), part);
                }
                self.client.post(&url).multipart(form)
            }
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Form submission request failed");
                return Err(network_error(&e));
            }
        };

        let status = response.status();
        tracing::info!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Form submission response"
        );
        Self::interpret(response).await
    }

    // ---- private helpers ----

    /// Map a response to the result channel.
    async fn interpret(response: reqwest::Response) -> Result<SubmissionResult, SubmissionError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| network_error(&e))?;

        if status.is_success() {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(SubmissionResult::default());
            }
            return Ok(serde_json::from_slice(&body).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Success response body is not a submission result");
                SubmissionResult::default()
            }));
        }

        let message = error_message(&body).unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("Submission failed (HTTP {} {reason})", status.as_u16()),
            None => format!("Submission failed (HTTP {})", status.as_u16()),
        });
        Err(SubmissionError::ServerRejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait::async_trait]
impl Submitter for QuoteApi {
    async fn submit(
        &self,
        request: &SubmissionRequest,
    ) -> Result<SubmissionResult, SubmissionError> {
        self.send(request).await
    }
}

/// Best-effort `message` (then `error`) from a JSON error body.
fn error_message(body: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| json.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn network_error(e: &reqwest::Error) -> SubmissionError {
    let message = if e.is_timeout() {
        "The request timed out. Please try again.".to_string()
    } else if e.is_connect() {
        "Could not reach the server. Check your connection and try again.".to_string()
    } else {
        format!("Network error: {e}")
    };
    SubmissionError::Network(message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let api = QuoteApi::with_client(reqwest::Client::new(), "http://localhost:3000/");
        assert_eq!(
            api.url_for("/api/contact"),
            "http://localhost:3000/api/contact"
        );
        assert_eq!(
            api.url_for("api/contact"),
            "http://localhost:3000/api/contact"
        );
        assert_eq!(
            api.url_for("https://forms.example.com/x"),
            "https://forms.example.com/x"
        );
    }

    #[test]
    fn error_message_prefers_message_then_error() {
        assert_eq!(
            error_message(br#"{"message":"internal error"}"#).as_deref(),
            Some("internal error")
        );
        assert_eq!(
            error_message(br#"{"error":"Email already subscribed","code":"CONFLICT"}"#).as_deref(),
            Some("Email already subscribed")
        );
        assert_eq!(
            error_message(br#"{"message":"  ","error":"fallback"}"#).as_deref(),
            Some("fallback")
        );
        assert_eq!(error_message(b"<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(b""), None);
    }

    #[test]
    fn new_builds_from_config() {
        let api = QuoteApi::new(&ClientConfig {
            base_url: "http://127.0.0.1:9/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:9");
    }
}
