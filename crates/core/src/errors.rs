//! Error message composition for failed Mixpost API calls
//!
//! The shell hands over the HTTP status and whatever JSON the server sent back; the
//! functions here decide the human-readable message and the optional detail payload.

use serde_json::Value;

/// Classified failure for an HTTP response outside the 2xx range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
    /// Pretty-printed `errors` object when the server reported per-field errors
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    Validation,
    RateLimited,
    NotFound,
    Other,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => FailureKind::Unauthorized,
            422 => FailureKind::Validation,
            429 => FailureKind::RateLimited,
            404 => FailureKind::NotFound,
            _ => FailureKind::Other,
        }
    }
}

/// Text used when the server gives no message of its own
pub fn fallback_status_message(status: u16) -> String {
    format!("Request failed with status code {status}")
}

/// Build the failure for an HTTP error response.
///
/// # Arguments
/// * `status` - HTTP status code
/// * `body` - Parsed response body, `Value::Null` when the body was empty or not JSON
/// * `retry_after_header` - Value of the `Retry-After` header, used when the body has no `retry_after`
pub fn compose_api_failure(
    status: u16,
    body: &Value,
    retry_after_header: Option<&str>,
) -> ApiFailure {
    let kind = FailureKind::from_status(status);
    let errors = body.get("errors").filter(|v| is_present(v));

    let reason = match kind {
        FailureKind::Unauthorized => {
            "Invalid or expired access token. Please check your credentials.".to_string()
        }
        FailureKind::Validation => {
            let detail = errors
                .or_else(|| body.get("message"))
                .cloned()
                .unwrap_or(Value::Null);
            format!("Validation failed: {detail}")
        }
        FailureKind::RateLimited => {
            let hint = body
                .get("retry_after")
                .filter(|v| is_present(v))
                .map(scalar_text)
                .or_else(|| retry_after_header.map(|h| h.trim().to_string()))
                .filter(|h| !h.is_empty());
            match hint {
                Some(seconds) => format!("Rate limit exceeded. Retry after {seconds} seconds."),
                None => "Rate limit exceeded.".to_string(),
            }
        }
        FailureKind::NotFound => "Resource not found. Verify the ID is correct.".to_string(),
        FailureKind::Other => body
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_status_message(status)),
    };

    ApiFailure {
        status,
        message: format!("Mixpost API Error ({status}): {reason}"),
        description: errors.and_then(|e| serde_json::to_string_pretty(e).ok()),
    }
}

/// JSON values a server uses to mean "nothing here"
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_kind_from_status() {
        assert_eq!(FailureKind::from_status(401), FailureKind::Unauthorized);
        assert_eq!(FailureKind::from_status(422), FailureKind::Validation);
        assert_eq!(FailureKind::from_status(500), FailureKind::Other);
    }

    #[test]
    fn test_unauthorized_message() {
        let failure = compose_api_failure(401, &json!({"message": "Unauthenticated."}), None);
        assert!(failure.message.contains("Invalid or expired access token"));
        assert!(failure.message.starts_with("Mixpost API Error (401): "));
        assert_eq!(failure.description, None);
    }

    #[test]
    fn test_validation_message_embeds_field_errors() {
        let body = json!({
            "message": "The given data was invalid.",
            "errors": {"content": ["The content field is required."]}
        });

        let failure = compose_api_failure(422, &body, None);

        assert_eq!(
            failure.message,
            r#"Mixpost API Error (422): Validation failed: {"content":["The content field is required."]}"#
        );
        let description = failure.description.unwrap();
        assert!(description.contains("\"content\": ["));
        assert!(description.contains('\n'));
    }

    #[test]
    fn test_validation_message_falls_back_to_server_message() {
        let failure = compose_api_failure(422, &json!({"message": "Bad schedule"}), None);
        assert_eq!(
            failure.message,
            "Mixpost API Error (422): Validation failed: \"Bad schedule\""
        );
        assert_eq!(failure.description, None);
    }

    #[test]
    fn test_rate_limit_with_body_hint() {
        let failure = compose_api_failure(429, &json!({"retry_after": 30}), None);
        assert_eq!(
            failure.message,
            "Mixpost API Error (429): Rate limit exceeded. Retry after 30 seconds."
        );
    }

    #[test]
    fn test_rate_limit_with_header_hint() {
        let failure = compose_api_failure(429, &Value::Null, Some("12"));
        assert!(failure.message.ends_with("Retry after 12 seconds."));
    }

    #[test]
    fn test_rate_limit_without_hint() {
        let failure = compose_api_failure(429, &json!({}), None);
        assert_eq!(failure.message, "Mixpost API Error (429): Rate limit exceeded.");
    }

    #[test]
    fn test_not_found_message() {
        let failure = compose_api_failure(404, &json!({"message": "No query results"}), None);
        assert!(failure.message.contains("Resource not found"));
    }

    #[test]
    fn test_other_status_uses_server_message() {
        let failure = compose_api_failure(403, &json!({"message": "Forbidden workspace"}), None);
        assert_eq!(failure.message, "Mixpost API Error (403): Forbidden workspace");
    }

    #[test]
    fn test_other_status_without_body_uses_fallback() {
        let failure = compose_api_failure(500, &Value::Null, None);
        assert_eq!(
            failure.message,
            "Mixpost API Error (500): Request failed with status code 500"
        );
    }

    #[test]
    fn test_empty_errors_object_is_still_a_description() {
        let failure = compose_api_failure(400, &json!({"errors": {}}), None);
        assert_eq!(failure.description.as_deref(), Some("{}"));
    }
}
