//! Resource/operation selectors
//!
//! Hosts pick an operation with two strings (`resource`, `operation`). They are parsed
//! once into [`Operation`] so dispatch is an exhaustive match instead of string checks.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Posts,
    Media,
    Accounts,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Posts, Resource::Media, Resource::Accounts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Posts => "posts",
            Resource::Media => "media",
            Resource::Accounts => "accounts",
        }
    }
}

impl std::str::FromStr for Resource {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| OperationError::UnknownResource(s.to_string()))
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreatePost,
    ListPosts,
    GetPost,
    UpdatePost,
    DeletePost,
    PublishPost,
    UploadMedia,
    DownloadMediaUrl,
    ListMedia,
    ListAccounts,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Unknown resource '{0}' (expected posts, media or accounts)")]
    UnknownResource(String),

    #[error("Unknown operation '{operation}' for resource '{resource}'")]
    UnknownOperation { resource: String, operation: String },
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::CreatePost,
        Operation::ListPosts,
        Operation::GetPost,
        Operation::UpdatePost,
        Operation::DeletePost,
        Operation::PublishPost,
        Operation::UploadMedia,
        Operation::DownloadMediaUrl,
        Operation::ListMedia,
        Operation::ListAccounts,
    ];

    /// Parse the host's two selector values.
    pub fn parse(resource: &str, operation: &str) -> Result<Self, OperationError> {
        let resource: Resource = resource.parse()?;
        Operation::ALL
            .into_iter()
            .find(|op| op.resource() == resource && op.name() == operation)
            .ok_or_else(|| OperationError::UnknownOperation {
                resource: resource.as_str().to_string(),
                operation: operation.to_string(),
            })
    }

    pub fn resource(&self) -> Resource {
        match self {
            Operation::CreatePost
            | Operation::ListPosts
            | Operation::GetPost
            | Operation::UpdatePost
            | Operation::DeletePost
            | Operation::PublishPost => Resource::Posts,
            Operation::UploadMedia | Operation::DownloadMediaUrl | Operation::ListMedia => {
                Resource::Media
            }
            Operation::ListAccounts => Resource::Accounts,
        }
    }

    /// Operation selector value as hosts send it
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreatePost => "create",
            Operation::ListPosts | Operation::ListMedia | Operation::ListAccounts => "list",
            Operation::GetPost => "get",
            Operation::UpdatePost => "update",
            Operation::DeletePost => "delete",
            Operation::PublishPost => "publish",
            Operation::UploadMedia => "upload",
            Operation::DownloadMediaUrl => "downloadUrl",
        }
    }

    /// Short imperative label, e.g. "Create a post"
    pub fn action(&self) -> &'static str {
        match self {
            Operation::CreatePost => "Create a post",
            Operation::ListPosts => "List all posts",
            Operation::GetPost => "Get a post",
            Operation::UpdatePost => "Update a post",
            Operation::DeletePost => "Delete a post",
            Operation::PublishPost => "Publish a post immediately",
            Operation::UploadMedia => "Upload media",
            Operation::DownloadMediaUrl => "Download media from URL",
            Operation::ListMedia => "List all media",
            Operation::ListAccounts => "List all connected social accounts",
        }
    }

    /// Operations that run once per execution rather than once per input record
    pub fn runs_once(&self) -> bool {
        matches!(self, Operation::ListAccounts)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_operation_round_trips_through_its_selectors() {
        for op in Operation::ALL {
            let parsed = Operation::parse(op.resource().as_str(), op.name()).unwrap();
            assert_eq!(parsed, op);
        }
    }

    #[test]
    fn test_list_is_scoped_by_resource() {
        assert_eq!(
            Operation::parse("posts", "list").unwrap(),
            Operation::ListPosts
        );
        assert_eq!(
            Operation::parse("media", "list").unwrap(),
            Operation::ListMedia
        );
        assert_eq!(
            Operation::parse("accounts", "list").unwrap(),
            Operation::ListAccounts
        );
    }

    #[test]
    fn test_unknown_resource() {
        assert_eq!(
            Operation::parse("tags", "list"),
            Err(OperationError::UnknownResource("tags".to_string()))
        );
    }

    #[test]
    fn test_operation_not_available_on_resource() {
        let err = Operation::parse("accounts", "create").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown operation 'create' for resource 'accounts'"
        );
    }

    #[test]
    fn test_only_account_listing_runs_once() {
        let once: Vec<_> = Operation::ALL.into_iter().filter(|op| op.runs_once()).collect();
        assert_eq!(once, vec![Operation::ListAccounts]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Operation::DownloadMediaUrl.to_string(), "media:downloadUrl");
    }
}
