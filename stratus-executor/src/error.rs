//! Error types for the executor crate.
//!
//! Every variant's `Display` text is what callers see in the `error` field of
//! an `execution_failed` envelope, so messages favour the wording snippet
//! authors already know from the management SDKs.

use stratus_core::CoreError;

/// Errors that can occur while executing a snippet.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// The token endpoint rejected the credential or could not be reached.
    #[error("ClientSecretCredential.get_token failed: {reason}")]
    Authentication { reason: String },

    /// A service client (or the credential's transport) could not be built.
    #[error("failed to construct {client}: {reason}")]
    ClientConstruction { client: &'static str, reason: String },

    /// The snippet is not valid source.
    #[error(transparent)]
    Syntax(#[from] CoreError),

    /// A code payload that is not a string.
    #[error("code snippet must be a string, not {found}")]
    InvalidSnippet { found: &'static str },

    /// A name that is neither bound in the namespace nor a built-in.
    #[error("name '{0}' is not defined")]
    Name(String),

    /// An attribute or method missing on a value.
    #[error("'{type_name}' object has no attribute '{attribute}'")]
    Attribute { type_name: String, attribute: String },

    /// A value of the wrong type, or a call with the wrong arguments.
    #[error("{0}")]
    Type(String),

    /// A sequence index outside the sequence.
    #[error("{0}")]
    Index(String),

    /// A mapping key that is not present.
    #[error("'{0}'")]
    Key(String),

    /// The service answered with a non-success status.
    #[error("({code}) {message}")]
    HttpResponse {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// A URL could not be built from the endpoint and path parameters.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A long-running operation reached a terminal state other than success.
    #[error("long-running operation ended with status '{status}': {message}")]
    OperationFailed { status: String, message: String },

    /// A response body that is not the JSON the operation promises.
    #[error("response could not be decoded: {0}")]
    Decode(String),
}

impl ExecutorError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub(crate) fn attribute(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::Attribute {
            type_name: type_name.into(),
            attribute: attribute.into(),
        }
    }
}
