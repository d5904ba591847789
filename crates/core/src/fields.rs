//! Per-record field models and request payload builders
//!
//! Hosts resolve field values per input record; the shell reads them into these structs
//! and the builders below turn them into the JSON bodies and query strings the Mixpost
//! API expects. Optional values are only sent when the caller set them.

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use thiserror::Error;

/// Page size used when a caller asks for a bounded list
pub const DEFAULT_LIMIT: u32 = 50;
/// Largest page the API serves
pub const MAX_LIMIT: u32 = 100;
/// Status sent on create when none was chosen
pub const DEFAULT_STATUS: &str = "draft";
/// Binary property read by media uploads when none is named
pub const DEFAULT_BINARY_PROPERTY: &str = "data";

const SCHEDULE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Missing required field '{0}'")]
    Missing(String),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl FieldError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FieldError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Optional fields of posts:create
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalFields {
    pub media: Option<Vec<u64>>,
    pub scheduled_at: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePost {
    pub content: String,
    pub accounts: Vec<u64>,
    pub additional: AdditionalFields,
}

/// Fields of posts:update; `None` means "leave unchanged"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFields {
    pub content: Option<String>,
    pub accounts: Option<Vec<u64>>,
    pub media: Option<Vec<u64>>,
    pub scheduled_at: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilters {
    pub status: Option<String>,
    pub account_id: Option<u64>,
}

/// How many list items the caller wants back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Limit(u32),
}

/// Body for `POST /posts`
pub fn create_post_body(post: &CreatePost) -> Value {
    let mut body = Map::new();
    body.insert("content".into(), Value::String(post.content.clone()));
    body.insert("accounts".into(), id_array(&post.accounts));
    body.insert(
        "status".into(),
        Value::String(
            post.additional
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        ),
    );

    if let Some(media) = &post.additional.media {
        body.insert("media".into(), id_array(media));
    }

    if let Some(scheduled_at) = &post.additional.scheduled_at {
        body.insert("scheduled_at".into(), Value::String(scheduled_at.clone()));
    }

    Value::Object(body)
}

/// Partial body for `PUT /posts/{id}`
pub fn update_post_body(fields: &UpdateFields) -> Value {
    let mut body = Map::new();

    if let Some(content) = &fields.content {
        body.insert("content".into(), Value::String(content.clone()));
    }
    if let Some(accounts) = &fields.accounts {
        body.insert("accounts".into(), id_array(accounts));
    }
    if let Some(media) = &fields.media {
        body.insert("media".into(), id_array(media));
    }
    if let Some(scheduled_at) = &fields.scheduled_at {
        body.insert("scheduled_at".into(), Value::String(scheduled_at.clone()));
    }
    if let Some(status) = &fields.status {
        body.insert("status".into(), Value::String(status.clone()));
    }

    Value::Object(body)
}

/// Query for `GET /posts` filters
pub fn post_filter_query(filters: &ListFilters) -> Map<String, Value> {
    let mut query = Map::new();

    if let Some(status) = &filters.status {
        query.insert("status".into(), Value::String(status.clone()));
    }
    if let Some(account_id) = filters.account_id {
        query.insert("account_id".into(), Value::from(account_id));
    }

    query
}

/// Add the page size of a bounded list to `query`
pub fn with_limit(mut query: Map<String, Value>, limit: u32) -> Map<String, Value> {
    query.insert("per_page".into(), Value::from(limit));
    query
}

pub fn validate_limit(limit: u64) -> Result<u32, FieldError> {
    if (1..=MAX_LIMIT as u64).contains(&limit) {
        Ok(limit as u32)
    } else {
        Err(FieldError::invalid(
            "limit",
            format!("must be between 1 and {MAX_LIMIT}, got {limit}"),
        ))
    }
}

/// Accept RFC 3339 or a plain `YYYY-MM-DD HH:MM[:SS]` timestamp.
pub fn validate_schedule(value: &str) -> Result<(), FieldError> {
    if DateTime::parse_from_rfc3339(value).is_ok()
        || SCHEDULE_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
    {
        return Ok(());
    }

    Err(FieldError::invalid(
        "scheduled_at",
        format!("'{value}' is not a date-time (use RFC 3339 or YYYY-MM-DD HH:MM:SS)"),
    ))
}

pub fn validate_status(field: &str, value: &str) -> Result<(), FieldError> {
    value
        .parse::<crate::types::PostStatus>()
        .map(|_| ())
        .map_err(|reason| FieldError::invalid(field, reason))
}

/// Parse a single ID from a JSON number or a numeric string.
pub fn parse_id(field: &str, value: &Value) -> Result<u64, FieldError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| FieldError::invalid(field, format!("{n} is not a positive integer ID"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| FieldError::invalid(field, format!("'{s}' is not a numeric ID"))),
        other => Err(FieldError::invalid(
            field,
            format!("expected an ID, got {other}"),
        )),
    }
}

/// Parse an ID list from an array, a single ID, or a comma-separated string.
pub fn parse_id_list(field: &str, value: &Value) -> Result<Vec<u64>, FieldError> {
    match value {
        Value::Array(items) => items.iter().map(|v| parse_id(field, v)).collect(),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => s
            .split(',')
            .map(|part| parse_id(field, &Value::String(part.to_string())))
            .collect(),
        other => parse_id(field, other).map(|id| vec![id]),
    }
}

fn id_array(ids: &[u64]) -> Value {
    Value::Array(ids.iter().copied().map(Value::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_post(additional: AdditionalFields) -> CreatePost {
        CreatePost {
            content: "Launch day".to_string(),
            accounts: vec![1, 2],
            additional,
        }
    }

    #[test]
    fn test_create_body_defaults_to_draft_and_omits_optionals() {
        let body = create_post_body(&create_post(AdditionalFields::default()));

        assert_eq!(
            body,
            json!({"content": "Launch day", "accounts": [1, 2], "status": "draft"})
        );
        assert!(body.get("media").is_none());
        assert!(body.get("scheduled_at").is_none());
    }

    #[test]
    fn test_create_body_with_all_additional_fields() {
        let body = create_post_body(&create_post(AdditionalFields {
            media: Some(vec![9]),
            scheduled_at: Some("2026-03-01 09:30:00".to_string()),
            status: Some("scheduled".to_string()),
        }));

        assert_eq!(body["status"], "scheduled");
        assert_eq!(body["media"], json!([9]));
        assert_eq!(body["scheduled_at"], "2026-03-01 09:30:00");
    }

    #[test]
    fn test_create_body_keeps_explicitly_empty_media() {
        let body = create_post_body(&create_post(AdditionalFields {
            media: Some(vec![]),
            ..Default::default()
        }));
        assert_eq!(body["media"], json!([]));
    }

    #[test]
    fn test_update_body_only_contains_set_fields() {
        let body = update_post_body(&UpdateFields {
            content: Some("Edited".to_string()),
            status: Some("scheduled".to_string()),
            ..Default::default()
        });
        assert_eq!(body, json!({"content": "Edited", "status": "scheduled"}));

        let empty = update_post_body(&UpdateFields::default());
        assert_eq!(empty, json!({}));
    }

    #[test]
    fn test_post_filter_query() {
        let query = post_filter_query(&ListFilters {
            status: Some("published".to_string()),
            account_id: Some(4),
        });
        assert_eq!(Value::Object(query), json!({"status": "published", "account_id": 4}));

        assert!(post_filter_query(&ListFilters::default()).is_empty());
    }

    #[test]
    fn test_with_limit_sets_per_page() {
        let query = with_limit(Map::new(), 25);
        assert_eq!(query["per_page"], 25);
    }

    #[test]
    fn test_validate_limit_bounds() {
        assert_eq!(validate_limit(1), Ok(1));
        assert_eq!(validate_limit(100), Ok(100));
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(101).is_err());
    }

    #[test]
    fn test_validate_schedule_formats() {
        assert!(validate_schedule("2026-03-01T09:30:00+02:00").is_ok());
        assert!(validate_schedule("2026-03-01T09:30:00.000Z").is_ok());
        assert!(validate_schedule("2026-03-01 09:30:00").is_ok());
        assert!(validate_schedule("2026-03-01 09:30").is_ok());
        assert!(validate_schedule("2026-03-01T09:30:00").is_ok());
        assert!(validate_schedule("next tuesday").is_err());
    }

    #[test]
    fn test_validate_status() {
        assert!(validate_status("status", "draft").is_ok());
        assert!(validate_status("status", "archived").is_err());
    }

    #[test]
    fn test_parse_id_list_shapes() {
        assert_eq!(parse_id_list("accounts", &json!([1, "2"])), Ok(vec![1, 2]));
        assert_eq!(parse_id_list("accounts", &json!("3, 4")), Ok(vec![3, 4]));
        assert_eq!(parse_id_list("accounts", &json!(5)), Ok(vec![5]));
        assert_eq!(parse_id_list("accounts", &json!("")), Ok(vec![]));
        assert!(parse_id_list("accounts", &json!(["x"])).is_err());
        assert!(parse_id_list("accounts", &json!(-1)).is_err());
    }
}
