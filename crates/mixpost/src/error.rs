use mixpost_core::errors::ApiFailure;
use mixpost_core::fields::FieldError;
use mixpost_core::operation::OperationError;

#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// HTTP response outside 2xx; `message` is already fully composed
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        description: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Media upload failed: {0}")]
    UploadFailed(String),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Binary property '{0}' not found on the input item")]
    MissingBinary(String),

    #[error("Invalid binary property '{property}': {reason}")]
    InvalidBinary { property: String, reason: String },

    #[error("Pagination stopped after {0} pages without reaching the last page")]
    PaginationLimit(u32),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Detail payload shown under the message, e.g. per-field validation errors
    pub fn description(&self) -> Option<&str> {
        match self {
            Error::Api { description, .. } => description.as_deref(),
            _ => None,
        }
    }
}

impl From<ApiFailure> for Error {
    fn from(failure: ApiFailure) -> Self {
        Error::Api {
            status: failure.status,
            message: failure.message,
            description: failure.description,
        }
    }
}
