//! Platform invocation envelope: the HTTP-shaped event a function receives and
//! the response object it hands back.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const ALLOWED_ORIGIN: &str = "*";
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
/// Preflight cache lifetime in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// HTTP-shaped event delivered by the hosting platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Missing method is treated as `GET`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// JSON-encoded request body. Absent means `{}`; an explicit `null`
    /// is kept as `Some(None)`.
    #[serde(
        default,
        deserialize_with = "present_body",
        skip_serializing_if = "Option::is_none"
    )]
    pub body: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl InboundEvent {
    pub fn new(method: impl Into<String>, body: Option<String>) -> Self {
        Self {
            http_method: Some(method.into()),
            body: body.map(Some),
            ..Self::default()
        }
    }

    pub fn method(&self) -> &str {
        self.http_method.as_deref().unwrap_or("GET")
    }

    /// Correlation id carried inside the event, if the platform put one there.
    pub fn request_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.request_id.as_deref())
    }
}

// Only called when the key is present, so `null` lands in the inner option.
fn present_body<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Per-invocation metadata supplied by the hosting platform.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request_id: String,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Context with a freshly generated correlation id.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Response object returned to the hosting platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl OutboundResponse {
    /// CORS preflight answer: 200, empty body, no content type.
    pub fn preflight() -> Self {
        let headers = BTreeMap::from([
            ("Access-Control-Allow-Origin".to_string(), ALLOWED_ORIGIN.to_string()),
            ("Access-Control-Allow-Methods".to_string(), ALLOWED_METHODS.to_string()),
            ("Access-Control-Allow-Headers".to_string(), ALLOWED_HEADERS.to_string()),
            ("Access-Control-Max-Age".to_string(), PREFLIGHT_MAX_AGE.to_string()),
        ]);

        Self {
            status_code: 200,
            headers,
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    /// JSON response with the standard content type and origin headers.
    pub fn json(status_code: u16, body: &Value) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), ALLOWED_ORIGIN.to_string()),
        ]);

        Self {
            status_code,
            headers,
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self::json(status_code, &serde_json::json!({ "error": message.into() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;

    #[test]
    fn test_event_defaults_to_get() {
        let event: InboundEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(event.method(), "GET");
        assert!(event.body.is_none());
        assert!(event.request_id().is_none());
    }

    #[test]
    fn test_event_parses_platform_shape() {
        let raw = r#"{
            "httpMethod": "POST",
            "headers": {"Content-Type": "application/json"},
            "body": "{\"message\": \"hi\"}",
            "isBase64Encoded": false,
            "requestContext": {"requestId": "req-42", "identity": {}}
        }"#;

        let event: InboundEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.method(), "POST");
        assert_eq!(event.body, Some(Some("{\"message\": \"hi\"}".to_string())));
        assert_eq!(event.request_id(), Some("req-42"));
    }

    #[test]
    fn test_null_body_differs_from_absent() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"httpMethod": "POST", "body": null}"#).unwrap();
        assert_eq!(event.body, Some(None));

        let event: InboundEvent = serde_json::from_str(r#"{"httpMethod": "POST"}"#).unwrap();
        assert_eq!(event.body, None);
    }

    #[test]
    fn test_null_body_serializes_as_null() {
        let event = InboundEvent {
            body: Some(None),
            ..InboundEvent::new("POST", None)
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["body"], Value::Null);
        assert!(value.as_object().unwrap().contains_key("body"));
    }

    #[test]
    fn test_preflight_shape() {
        assert_json_snapshot!(OutboundResponse::preflight(), @r#"
        {
          "statusCode": 200,
          "headers": {
            "Access-Control-Allow-Headers": "Content-Type",
            "Access-Control-Allow-Methods": "POST, OPTIONS",
            "Access-Control-Allow-Origin": "*",
            "Access-Control-Max-Age": "86400"
          },
          "body": "",
          "isBase64Encoded": false
        }
        "#);
    }

    #[test]
    fn test_error_response() {
        let response = OutboundResponse::error(405, "Method not allowed");

        assert_eq!(response.status_code, 405);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert!(!response.is_base64_encoded);

        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Method not allowed"}));
    }

    #[test]
    fn test_generated_context_ids_are_unique() {
        let a = InvocationContext::generate();
        let b = InvocationContext::generate();
        assert_ne!(a.request_id, b.request_id);
    }
}
