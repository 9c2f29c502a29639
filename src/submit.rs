//! Claim submission endpoints
//!
//! The wizard engine hands the finished record to a [`SubmitEndpoint`].
//! [`HttpSubmitEndpoint`] posts it as JSON to the claims REST API, together
//! with the metadata of any attached files, in a single request.

use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::attachments::Attachment;
use crate::config::Config;
use crate::error::SubmitError;

/// Resource created by a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    /// Identifier assigned by the server
    pub id: String,

    /// Any other fields the server returned alongside the id
    pub extra: Map<String, Value>,
}

impl Created {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }

    /// Parse a `{ "id": ..., ... }` response body
    ///
    /// Numeric ids are accepted and converted to their decimal text.
    pub fn from_value(value: Value) -> Result<Self, SubmitError> {
        let Value::Object(mut fields) = value else {
            return Err(SubmitError::InvalidResponse(
                "expected a JSON object".to_string(),
            ));
        };

        let id = match fields.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(Value::Number(id)) => id.to_string(),
            Some(other) => {
                return Err(SubmitError::InvalidResponse(format!(
                    "unusable id: {}",
                    other
                )))
            }
            None => {
                return Err(SubmitError::InvalidResponse(
                    "response has no id".to_string(),
                ))
            }
        };

        Ok(Self { id, extra: fields })
    }
}

/// Remote endpoint that accepts a finished record
///
/// The whole record is passed in one call; there is no partial submission.
pub trait SubmitEndpoint<R> {
    fn submit(&self, record: &R) -> Result<Created, SubmitError>;
}

impl<R, F> SubmitEndpoint<R> for F
where
    F: Fn(&R) -> Result<Created, SubmitError>,
{
    fn submit(&self, record: &R) -> Result<Created, SubmitError> {
        self(record)
    }
}

/// JSON-over-HTTP endpoint
#[derive(Clone)]
pub struct HttpSubmitEndpoint {
    agent: ureq::Agent,
    url: String,
    attachments: Vec<Attachment>,
}

impl HttpSubmitEndpoint {
    /// Create an endpoint posting to `base_url` + `path`
    pub fn new(base_url: &str, path: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(&format!("claimdesk/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            url: join_url(base_url, path),
            attachments: Vec::new(),
        }
    }

    /// Send these attachments under `"attachments"` with every claim
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Endpoint for driver claims as configured
    pub fn driver_claims(config: &Config) -> Self {
        Self::new(
            &config.api_base_url,
            &config.driver_claims_path,
            config.request_timeout(),
        )
    }

    /// Endpoint for third-party claims as configured
    pub fn third_party_claims(config: &Config) -> Self {
        Self::new(
            &config.api_base_url,
            &config.third_party_claims_path,
            config.request_timeout(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// JSON body posted for `record`
    ///
    /// The record's fields sit at the top level. Attachments, when present,
    /// are added as an `"attachments"` array, so the record must serialize
    /// to a JSON object.
    pub fn request_body<R: Serialize>(&self, record: &R) -> Result<Value, SubmitError> {
        let mut body =
            serde_json::to_value(record).map_err(|e| SubmitError::Encode(e.to_string()))?;

        if self.attachments.is_empty() {
            return Ok(body);
        }

        let Value::Object(fields) = &mut body else {
            return Err(SubmitError::Encode(
                "attachments need a record that encodes as a JSON object".to_string(),
            ));
        };
        let attachments = serde_json::to_value(&self.attachments)
            .map_err(|e| SubmitError::Encode(e.to_string()))?;
        fields.insert("attachments".to_string(), attachments);

        Ok(body)
    }
}

impl<R: Serialize> SubmitEndpoint<R> for HttpSubmitEndpoint {
    fn submit(&self, record: &R) -> Result<Created, SubmitError> {
        let body = self.request_body(record)?;

        tracing::info!(
            target: "claimdesk::submit",
            url = %self.url,
            attachments = self.attachments.len(),
            "Submitting claim"
        );

        let response = match self
            .agent
            .post(&self.url)
            .set("Accept", "application/json")
            .send_json(body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                let message = error_message(&body).unwrap_or_else(|| {
                    format!("Server returned status {}", status)
                });
                tracing::error!(target: "claimdesk::submit", status, "{}", message);
                return Err(SubmitError::Rejected { status, message });
            }
            Err(e) => {
                tracing::error!(target: "claimdesk::submit", "Network error: {}", e);
                return Err(SubmitError::Network(e.to_string()));
            }
        };

        let value: Value = response
            .into_json()
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;

        let created = Created::from_value(value)?;
        tracing::info!(target: "claimdesk::submit", id = %created.id, "Claim accepted");
        Ok(created)
    }
}

/// Join a base URL and a path with exactly one slash between them
fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Pull a human-readable message out of an error body
///
/// The API answers errors with `{"message": ...}` or `{"error": ...}`;
/// plain-text bodies are used as-is.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        Ok(_) => None,
        Err(_) => Some(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_created_from_string_id() {
        let created = Created::from_value(json!({"id": "abc", "status": "open"})).unwrap();
        assert_eq!(created.id, "abc");
        assert_eq!(created.extra.get("status"), Some(&json!("open")));
        assert!(!created.extra.contains_key("id"));
    }

    #[test]
    fn test_created_from_numeric_id() {
        let created = Created::from_value(json!({"id": 42})).unwrap();
        assert_eq!(created.id, "42");
    }

    #[test]
    fn test_created_rejects_missing_id() {
        assert!(matches!(
            Created::from_value(json!({"status": "open"})),
            Err(SubmitError::InvalidResponse(_))
        ));
        assert!(matches!(
            Created::from_value(json!({"id": ""})),
            Err(SubmitError::InvalidResponse(_))
        ));
        assert!(matches!(
            Created::from_value(json!(["abc"])),
            Err(SubmitError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://api/", "/claims"), "http://api/claims");
        assert_eq!(join_url("http://api", "claims"), "http://api/claims");
        assert_eq!(join_url("http://api/", ""), "http://api");
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"message": "Policy expired"}"#),
            Some("Policy expired".to_string())
        );
        assert_eq!(
            error_message(r#"{"error": "Duplicate claim"}"#),
            Some("Duplicate claim".to_string())
        );
        assert_eq!(error_message("Bad Gateway"), Some("Bad Gateway".to_string()));
        assert_eq!(error_message(r#"{"code": 7}"#), None);
        assert_eq!(error_message("  "), None);
    }

    #[test]
    fn test_closure_endpoint() {
        let endpoint = |record: &String| -> Result<Created, SubmitError> {
            Ok(Created::new(format!("id-{}", record)))
        };
        let created = SubmitEndpoint::submit(&endpoint, &"7".to_string()).unwrap();
        assert_eq!(created.id, "id-7");
    }

    #[test]
    fn test_request_body_carries_attachments() {
        let endpoint = HttpSubmitEndpoint::new("http://api", "/claims", Duration::from_secs(5))
            .with_attachments(vec![
                Attachment::new("front.jpg", "image/jpeg", 2048),
                Attachment::new("report.pdf", "application/pdf", 512),
            ]);

        let body = endpoint
            .request_body(&json!({"policy_number": "POL-100200"}))
            .unwrap();
        assert_eq!(body["policy_number"], "POL-100200");
        assert_eq!(body["attachments"][0]["name"], "front.jpg");
        assert_eq!(body["attachments"][1]["content_type"], "application/pdf");
        assert_eq!(body["attachments"][1]["size"], 512);
    }

    #[test]
    fn test_request_body_without_attachments() {
        let endpoint = HttpSubmitEndpoint::new("http://api", "/claims", Duration::from_secs(5));
        let body = endpoint.request_body(&json!({"a": 1})).unwrap();
        assert_eq!(body, json!({"a": 1}));
        assert!(endpoint.attachments().is_empty());
    }

    #[test]
    fn test_request_body_rejects_non_object_with_attachments() {
        let endpoint = HttpSubmitEndpoint::new("http://api", "/claims", Duration::from_secs(5))
            .with_attachments(vec![Attachment::new("a.jpg", "image/jpeg", 1)]);
        assert!(matches!(
            endpoint.request_body(&"plain text"),
            Err(SubmitError::Encode(_))
        ));
    }

    #[test]
    fn test_http_endpoint_url() {
        let endpoint = HttpSubmitEndpoint::new("http://localhost:8080/api/", "/claims", Duration::from_secs(5));
        assert_eq!(endpoint.url(), "http://localhost:8080/api/claims");
    }
}
