//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::{RepositoryError, RepositoryErrorKind};
use crate::sorting::SortingError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid site assembly, detected once at startup
///
/// These are programming errors in the admin declaration. Startup fails
/// instead of serving a partially working site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Two children of the same group share a name
    #[error("duplicate view name '{name}' under '{parent}'")]
    DuplicateName {
        /// Route name of the group
        parent: String,
        /// The repeated child name
        name: String,
    },

    /// Two views resolve to the same method and path
    #[error("route {method} {path} is registered by both '{first}' and '{second}'")]
    DuplicateRoute {
        /// HTTP method
        method: String,
        /// Full path
        path: String,
        /// Route name registered first
        first: String,
        /// Route name registered second
        second: String,
    },

    /// A sortable field is not one of the list fields
    #[error("sortable field '{field}' of '{view}' is not a list field")]
    UnknownSortableField {
        /// View name
        view: String,
        /// Offending field key
        field: String,
    },

    /// A query field is not one of the list fields
    #[error("query field '{field}' of '{view}' is not a list field")]
    UnknownQueryField {
        /// View name
        view: String,
        /// Offending field key
        field: String,
    },

    /// A list field key appears twice
    #[error("list field '{field}' of '{view}' is declared twice")]
    DuplicateField {
        /// View name
        view: String,
        /// Repeated field key
        field: String,
    },

    /// A required attribute was never provided
    #[error("view '{view}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// View name
        view: String,
        /// Attribute name
        attribute: &'static str,
    },

    /// The configured index view is not a leaf of the group
    #[error("index view '{index}' is not a view of '{viewset}'")]
    UnknownIndexView {
        /// Group name
        viewset: String,
        /// Configured index view name
        index: String,
    },

    /// A view name or path cannot be used in a route
    #[error("invalid {what} '{value}': {reason}")]
    Invalid {
        /// What was being validated ("name", "path", ...)
        what: &'static str,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Malformed client input in the query string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A numeric parameter is not a non-negative integer
    #[error("query parameter '{name}' must be a non-negative integer, got '{value}'")]
    MalformedInteger {
        /// Parameter name
        name: &'static str,
        /// Raw value as received
        value: String,
    },

    /// `limit=0` reached a list view
    #[error("query parameter 'limit' must be at least 1")]
    ZeroLimit,
}

/// Main error type for admin operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file or environment error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Invalid site assembly
    #[error("Invalid admin configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Malformed query parameters
    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    /// Sorting precondition violation
    #[error("Sorting error: {0}")]
    Sorting(#[from] SortingError),

    /// Structured repository error with operation context
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Template lookup or rendering error
    #[error("Template error: {0}")]
    Template(Box<minijinja::Error>),

    /// Unknown route name or missing URL parameter
    #[error("Routing error: {0}")]
    Routing(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Error::Template(Box::new(err))
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl Error {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Query(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Repository(e) => match e.kind {
                RepositoryErrorKind::NotFound => StatusCode::NOT_FOUND,
                RepositoryErrorKind::AlreadyExists | RepositoryErrorKind::ConstraintViolation => {
                    StatusCode::CONFLICT
                }
                RepositoryErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
                RepositoryErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                RepositoryErrorKind::ConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_response = match self {
            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                ErrorResponse::with_code(status, "CONFIG_ERROR", e.to_string())
            }

            Error::Configuration(e) => {
                tracing::error!("Invalid admin configuration: {}", e);
                ErrorResponse::with_code(status, "ADMIN_CONFIGURATION_ERROR", e.to_string())
            }

            Error::Query(e) => ErrorResponse::with_code(status, "INVALID_QUERY", e.to_string()),

            Error::Sorting(e) => {
                tracing::error!("Sorting error: {}", e);
                ErrorResponse::with_code(status, "SORTING_ERROR", "Invalid sort request")
            }

            Error::Repository(ref e) => {
                tracing::error!(
                    operation = %e.operation,
                    kind = %e.kind,
                    entity_type = ?e.entity_type,
                    entity_id = ?e.entity_id,
                    retriable = e.is_retriable(),
                    "Repository error: {}", e.message
                );

                let code = format!("REPOSITORY_{}", e.kind.to_string().to_uppercase());

                // User-facing message (don't expose internal details)
                let user_message = match e.kind {
                    RepositoryErrorKind::NotFound => "Resource not found",
                    RepositoryErrorKind::AlreadyExists
                    | RepositoryErrorKind::ConstraintViolation => {
                        "Operation conflicts with existing data"
                    }
                    RepositoryErrorKind::ValidationFailed => "Changes were rejected",
                    RepositoryErrorKind::Timeout => "Repository operation timed out",
                    RepositoryErrorKind::ConnectionFailed => "Repository unavailable",
                    _ => "Repository operation failed",
                };

                ErrorResponse::with_code(status, code, user_message)
            }

            Error::Template(e) => {
                tracing::error!("Template error: {:#}", e);
                ErrorResponse::with_code(status, "TEMPLATE_ERROR", "Failed to render page")
            }

            Error::Routing(msg) => {
                tracing::error!("Routing error: {}", msg);
                ErrorResponse::with_code(status, "ROUTING_ERROR", "Failed to build URL")
            }

            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                ErrorResponse::with_code(status, "IO_ERROR", "I/O operation failed")
            }

            Error::NotFound(msg) => ErrorResponse::with_code(status, "NOT_FOUND", msg),

            Error::BadRequest(msg) => ErrorResponse::with_code(status, "BAD_REQUEST", msg),

            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse::with_code(status, "INTERNAL_ERROR", "Internal server error")
            }
        };

        (status, Json(error_response)).into_response()
    }
}
