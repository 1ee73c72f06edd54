//! Error types for the driver core
//!
//! Simple, flat error hierarchy. Routing failures are expected traffic and get
//! translated at the dispatch boundary; everything else is a command failure
//! reported to the client with a wire status code.

use thiserror::Error;

use crate::introspect::CollaboratorError;
use crate::protocol::{status, Command, ElementId, Method};

pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("No such resource: {0}")]
    RoutingNotFound(String),

    #[error("Method {0} is not allowed here")]
    MethodNotAllowed(Method),

    #[error("Unable to locate element using {using}={value:?}")]
    NoSuchElement { using: String, value: String },

    #[error("Element {0} is not known to this session")]
    StaleElementReference(ElementId),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Path segment already mounted: {0}")]
    AlreadyMounted(String),

    #[error("UI thread is no longer running")]
    UiThreadGone,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriverError {
    /// A command that routed to a node which has no handler for the method.
    pub fn unknown_command(command: &Command<'_>) -> Self {
        DriverError::RoutingNotFound(format!("{} {}", command.method, command.path))
    }

    /// Kind name carried in error replies.
    pub fn kind(&self) -> &'static str {
        match self {
            DriverError::RoutingNotFound(_) => "RoutingNotFound",
            DriverError::MethodNotAllowed(_) => "MethodNotAllowed",
            DriverError::NoSuchElement { .. } => "NoSuchElement",
            DriverError::StaleElementReference(_) => "StaleElementReference",
            DriverError::Collaborator(_) => "CollaboratorFailure",
            DriverError::InvalidArgument(_) | DriverError::Json(_) => "InvalidArgument",
            DriverError::AlreadyMounted(_) | DriverError::UiThreadGone | DriverError::Io(_) => {
                "UnknownError"
            }
        }
    }

    /// True for errors that are normal protocol traffic rather than faults.
    pub fn is_routing(&self) -> bool {
        matches!(
            self,
            DriverError::RoutingNotFound(_) | DriverError::MethodNotAllowed(_)
        )
    }

    /// JSON wire protocol status code.
    pub fn wire_status(&self) -> u32 {
        match self {
            DriverError::RoutingNotFound(_) | DriverError::MethodNotAllowed(_) => {
                status::UNKNOWN_COMMAND
            }
            DriverError::NoSuchElement { .. } => status::NO_SUCH_ELEMENT,
            DriverError::StaleElementReference(_) => status::STALE_ELEMENT_REFERENCE,
            DriverError::Collaborator(CollaboratorError::UnsupportedStrategy(_)) => {
                status::INVALID_SELECTOR
            }
            _ => status::UNKNOWN_ERROR,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            DriverError::RoutingNotFound(_) => 404,
            DriverError::MethodNotAllowed(_) => 405,
            DriverError::InvalidArgument(_) | DriverError::Json(_) => 400,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = DriverError::NoSuchElement {
            using: "name".to_string(),
            value: "foo".to_string(),
        };
        assert_eq!(err.kind(), "NoSuchElement");
        assert_eq!(err.wire_status(), 7);
        assert_eq!(err.http_status(), 500);

        let err = DriverError::StaleElementReference(4);
        assert_eq!(err.wire_status(), 10);

        let err: DriverError = CollaboratorError::UnsupportedStrategy("xpath".to_string()).into();
        assert_eq!(err.kind(), "CollaboratorFailure");
        assert_eq!(err.wire_status(), 32);

        let err = DriverError::MethodNotAllowed(Method::Delete);
        assert!(err.is_routing());
        assert_eq!(err.http_status(), 405);
    }
}
