//! Repository error types
//!
//! Structured errors for the data-access collaborator. Admin views never catch
//! or retry these; they are propagated to the request layer and mapped to an
//! HTTP status by [`RepositoryErrorKind`].
//!
//! # Example
//!
//! ```rust
//! use acton_admin::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("MyModel", "item_42");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert_eq!(error.entity_id.as_deref(), Some("item_42"));
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Acquiring a request-scoped repository
    Acquire,
    /// Listing a page of entities
    List,
    /// Looking up a single entity by key
    GetByKey,
    /// Applying changes to an existing entity
    Update,
    /// Creating a new entity
    Create,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquire => write!(f, "acquire"),
            Self::List => write!(f, "list"),
            Self::GetByKey => write!(f, "get_by_key"),
            Self::Update => write!(f, "update"),
            Self::Create => write!(f, "create"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Entity already exists (duplicate key)
    AlreadyExists,
    /// Storage constraint violation
    ConstraintViolation,
    /// Changes were rejected before reaching storage
    ValidationFailed,
    /// Failed to connect to the data store
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Serialization or deserialization error
    SerializationError,
    /// The repository returned results that break the list contract
    ContractViolation,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::ContractViolation => write!(f, "contract_violation"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "User", "Order")
    pub entity_type: Option<String>,
    /// The key of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::GetByKey,
            RepositoryErrorKind::NotFound,
            "Entity not found",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Create an "already exists" error with entity context
    pub fn already_exists(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Create,
            RepositoryErrorKind::AlreadyExists,
            "Entity already exists",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Create a validation failed error
    pub fn validation_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ValidationFailed, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Acquire,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a timeout error
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Create a serialization error
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_admin::repository::{RepositoryError, RepositoryOperation};
    ///
    /// let error = RepositoryError::serialization_error(
    ///     RepositoryOperation::Update,
    ///     "field 'label' expects a string",
    /// );
    /// assert!(!error.is_retriable());
    /// ```
    pub fn serialization_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::SerializationError, message)
    }

    /// Create a list-contract violation error
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::List,
            RepositoryErrorKind::ContractViolation,
            message,
        )
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    ///
    /// Retrying is the repository's business; this only classifies the error.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
