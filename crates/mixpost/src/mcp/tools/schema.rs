use mixpost_core::fields::{DEFAULT_BINARY_PROPERTY, DEFAULT_LIMIT, MAX_LIMIT};
use mixpost_core::operation::Operation;
use serde_json::{json, Value};

fn id_list(description: &str) -> Value {
    json!({
        "oneOf": [
            {"type": "array", "items": {"type": "integer"}},
            {"type": "string"}
        ],
        "description": format!("{description} (array of IDs or comma-separated string)")
    })
}

fn status() -> Value {
    json!({"type": "string", "enum": ["draft", "scheduled"]})
}

fn scheduled_at() -> Value {
    json!({
        "type": "string",
        "description": "Publish time, RFC 3339 or 'YYYY-MM-DD HH:MM'"
    })
}

fn post_id() -> Value {
    json!({"type": ["integer", "string"], "description": "ID of the post"})
}

fn list_scope() -> Value {
    json!({
        "returnAll": {
            "type": "boolean",
            "description": "Fetch every page (default: false)"
        },
        "limit": {
            "type": "integer",
            "minimum": 1,
            "maximum": MAX_LIMIT,
            "description": format!("Maximum number of results when returnAll is false (default: {DEFAULT_LIMIT})")
        }
    })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// JSON schema of a single record's params for `operation`
pub fn input_schema(operation: Operation) -> Value {
    match operation {
        Operation::CreatePost => object(
            json!({
                "content": {"type": "string", "description": "Text content of the post"},
                "accounts": id_list("Social account IDs to publish to"),
                "additionalFields": {
                    "type": "object",
                    "properties": {
                        "media": id_list("Media IDs to attach"),
                        "scheduled_at": scheduled_at(),
                        "status": status()
                    }
                }
            }),
            &["content", "accounts"],
        ),
        Operation::ListPosts => {
            let mut properties = list_scope();
            properties["filters"] = json!({
                "type": "object",
                "properties": {
                    "status": {"type": "string", "enum": ["draft", "scheduled", "published", "failed"]},
                    "account_id": {"type": ["integer", "string"]}
                }
            });
            object(properties, &[])
        }
        Operation::GetPost | Operation::DeletePost | Operation::PublishPost => {
            object(json!({"postId": post_id()}), &["postId"])
        }
        Operation::UpdatePost => object(
            json!({
                "postId": post_id(),
                "updateFields": {
                    "type": "object",
                    "properties": {
                        "content": {"type": "string"},
                        "accounts": id_list("Social account IDs"),
                        "media": id_list("Media IDs"),
                        "scheduled_at": scheduled_at(),
                        "status": status()
                    }
                }
            }),
            &["postId"],
        ),
        Operation::UploadMedia => object(
            json!({
                "binaryPropertyName": {
                    "type": "string",
                    "description": format!("Key of the attachment in 'binary' (default: {DEFAULT_BINARY_PROPERTY})")
                },
                "binary": {
                    "type": "object",
                    "description": "Attachments keyed by property name",
                    "additionalProperties": {
                        "type": "object",
                        "properties": {
                            "fileName": {"type": "string"},
                            "mimeType": {"type": "string"},
                            "data": {"type": "string", "description": "Base64 content"},
                            "path": {"type": "string", "description": "Local file path"}
                        }
                    }
                }
            }),
            &["binary"],
        ),
        Operation::DownloadMediaUrl => object(
            json!({"url": {"type": "string", "description": "URL of the media file"}}),
            &["url"],
        ),
        Operation::ListMedia => object(list_scope(), &[]),
        Operation::ListAccounts => object(json!({}), &[]),
    }
}
