//! Domain models mirroring the Mixpost REST API
//!
//! These types are read-only views over server responses. Output records handed back
//! to hosts stay as raw JSON; the typed models are used where the shell needs to look
//! inside a response (table rendering, pagination metadata).

use serde::{Deserialize, Serialize};

/// Lifecycle state of a post, owned by the remote service
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "scheduled" => Ok(PostStatus::Scheduled),
            "published" => Ok(PostStatus::Published),
            "failed" => Ok(PostStatus::Failed),
            other => Err(format!(
                "unknown post status '{other}' (expected draft, scheduled, published or failed)"
            )),
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Account {
    pub id: u64,
    pub name: String,
    /// Provider key as the server reports it, e.g. `facebook_page`
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Media {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub hex_color: Option<String>,
}

/// Per-account variant of a post's content
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PostVersion {
    pub id: u64,
    pub account_id: u64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub content: String,
    pub status: PostStatus,
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub versions: Option<Vec<PostVersion>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Pagination block attached to list responses
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_deserializes_with_nested_entities() {
        let value = json!({
            "id": 42,
            "content": "Hello",
            "status": "scheduled",
            "scheduled_at": "2026-01-01 10:00:00",
            "accounts": [{"id": 1, "name": "Acme", "platform": "mastodon", "username": "acme"}],
            "media": [{"id": 7, "name": "logo.png", "mime_type": "image/png", "size": 1024}],
            "tags": [{"id": 3, "name": "launch", "hex_color": "#ff0000"}],
            "created_at": "2025-12-01",
            "updated_at": "2025-12-02"
        });

        let post: Post = serde_json::from_value(value).unwrap();

        assert_eq!(post.id, 42);
        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(post.accounts[0].platform, "mastodon");
        assert_eq!(post.media[0].size, Some(1024));
        assert_eq!(post.tags[0].hex_color.as_deref(), Some("#ff0000"));
        assert!(post.versions.is_none());
    }

    #[test]
    fn test_platform_keeps_the_server_value() {
        let account: Account =
            serde_json::from_value(json!({"id": 9, "name": "Shop", "platform": "facebook_page"}))
                .unwrap();
        assert_eq!(account.platform, "facebook_page");

        let account: Account =
            serde_json::from_value(json!({"id": 10, "name": "Bare"})).unwrap();
        assert_eq!(account.platform, "");
    }

    #[test]
    fn test_post_status_from_str() {
        assert_eq!("failed".parse::<PostStatus>(), Ok(PostStatus::Failed));
        assert!("archived".parse::<PostStatus>().is_err());
    }
}
