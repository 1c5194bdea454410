use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Capability, RequestCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Ends the session after a single notice.
    Fatal,
    /// Handed to a fallback handler; never escalated.
    Delegated,
    /// Dropped silently.
    Dropped,
    Configuration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("required permission missing: {}", join_capabilities(.denied))]
    PermissionDenied { denied: Vec<Capability> },
    #[error("permission result for unrecognized request code {}", .request_code.0)]
    UnrecognizedRequest { request_code: RequestCode },
    #[error("malformed gesture input: {0}")]
    MalformedGesture(&'static str),
    #[error("invalid permission set: {0}")]
    InvalidPermissionSet(String),
    #[error("render option bound must be at least 1, got {0}")]
    InvalidOptionBound(u32),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ShellError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::PermissionDenied { .. } => ErrorKind::Fatal,
            ShellError::UnrecognizedRequest { .. } => ErrorKind::Delegated,
            ShellError::MalformedGesture(_) => ErrorKind::Dropped,
            ShellError::InvalidPermissionSet(_)
            | ShellError::InvalidOptionBound(_)
            | ShellError::Config(_) => ErrorKind::Configuration,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}

fn join_capabilities(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(Capability::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
