use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while handling a uuShare deep link.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("no payload supplied")]
    MissingInput,

    #[error("malformed payload: expected at least {required} fields, got {found}")]
    MalformedPayload { found: usize, required: usize },

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("unsigned payloads are not accepted")]
    UnsignedRejected,

    #[error("no signing key configured")]
    MissingKey,

    #[error("credential decode error: {0}")]
    CredentialDecode(String),

    #[error("failed to parse document: {0}")]
    DocumentParse(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("failed to serialize document: {0}")]
    DocumentWrite(String),

    #[error("{}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {}: {source}", .path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShareError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ShareError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// True when the error was raised before any document was touched.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ShareError::MissingInput
                | ShareError::MalformedPayload { .. }
                | ShareError::SignatureMismatch
                | ShareError::UnsignedRejected
                | ShareError::MissingKey
                | ShareError::CredentialDecode(_)
        )
    }
}

impl From<base64::DecodeError> for ShareError {
    fn from(e: base64::DecodeError) -> Self {
        ShareError::CredentialDecode(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ShareError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        ShareError::CredentialDecode(e.to_string())
    }
}

impl From<xmltree::ParseError> for ShareError {
    fn from(e: xmltree::ParseError) -> Self {
        ShareError::DocumentParse(e.to_string())
    }
}

impl From<xmltree::Error> for ShareError {
    fn from(e: xmltree::Error) -> Self {
        ShareError::DocumentWrite(e.to_string())
    }
}

pub type ShareResult<T> = Result<T, ShareError>;
