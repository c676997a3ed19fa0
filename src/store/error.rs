//! Failures surfaced by event store implementations.
//!
//! Every failure carries an [`ErrorContext`] naming the operation and the
//! record involved, so a log line is enough to locate the write that failed.
//! The append path consults [`StoreError::is_retryable`] to decide whether
//! another attempt can help; validation and configuration failures never can.

use std::fmt;

/// Result type for event store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for event store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached. Pool checkout failures and dropped
    /// connections land here and are always worth retrying.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// A statement reached the store and failed there.
    #[error("Query error: {message} {context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    /// The requested record does not exist.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A record failed validation on its way in or out of the store.
    #[error("Data validation error: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// The store was configured wrong and never became usable.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// A bug or an unclassifiable backend failure.
    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },

    /// The store did not answer in time.
    #[error("Timeout error: {message} {context}")]
    TimeoutError {
        message: String,
        context: ErrorContext,
    },
}

impl StoreError {
    /// Connection failure with an empty context.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::connection_with_context(message, ErrorContext::default())
    }

    /// Connection failure. The context is force-marked retryable.
    pub fn connection_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: context.retryable(),
        }
    }

    /// Query failure, not retryable unless the context says otherwise.
    pub fn query(message: impl Into<String>) -> Self {
        Self::query_with_context(message, ErrorContext::default())
    }

    /// Query failure with context.
    pub fn query_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::QueryError {
            message: message.into(),
            context,
        }
    }

    /// Missing record.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Rejected record.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Unusable store configuration.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Unexpected failure with an empty context.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::internal_with_context(message, ErrorContext::default())
    }

    /// Unexpected failure with context.
    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InternalError {
            message: message.into(),
            context,
        }
    }

    /// Timed-out operation. The context is force-marked retryable.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Whether a fresh attempt at the same operation can succeed.
    ///
    /// Connection and timeout failures always can. Query failures only when
    /// the backend marked them so (serialization conflicts). Everything else
    /// fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError { .. } | Self::TimeoutError { .. } => true,
            Self::QueryError { context, .. } => context.retryable,
            _ => false,
        }
    }

    /// The context attached to this error.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. }
            | Self::TimeoutError { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. }
            | Self::TimeoutError { context, .. } => context,
        }
    }

    /// Set or replace the operation name in the attached context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }
}

/// Where an error happened.
///
/// Built up with the `with_*` methods at the failure site. Rendered inline
/// after the error message as `[operation=..., entity=..., ...]`, empty
/// fields omitted.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Store operation that failed (e.g. "append_event")
    pub operation: Option<String>,
    /// Kind of record involved (e.g. "clock_event")
    pub entity: Option<String>,
    /// Identifier of the record involved, if one exists yet
    pub entity_id: Option<String>,
    /// Free-form extra detail
    pub details: Option<String>,
    /// Whether a retry of the failed operation can succeed
    pub retryable: bool,
}

impl ErrorContext {
    /// Context naming the failed operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Name the kind of record involved.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Name the specific record involved.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Attach free-form detail.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Mark the failed operation as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("operation", self.operation.as_deref()),
            ("entity", self.entity.as_deref()),
            ("id", self.entity_id.as_deref()),
            ("details", self.details.as_deref()),
        ];

        write!(f, "[")?;
        let mut sep = "";
        for (name, value) in fields {
            if let Some(value) = value {
                write!(f, "{}{}={}", sep, name, value)?;
                sep = ", ";
            }
        }
        if self.retryable {
            write!(f, "{}retryable=true", sep)?;
        }
        write!(f, "]")
    }
}

impl From<String> for StoreError {
    fn from(s: String) -> Self {
        StoreError::internal(s)
    }
}

impl From<&str> for StoreError {
    fn from(s: &str) -> Self {
        StoreError::internal(s.to_string())
    }
}

#[cfg(feature = "postgres-store")]
impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => StoreError::not_found("Record not found"),
            Error::DatabaseError(kind, info) => {
                let mut context =
                    ErrorContext::default().with_details(format!("db_error_kind={:?}", kind));
                // A serialization conflict clears once the competing
                // transaction finishes.
                if matches!(kind, DatabaseErrorKind::SerializationFailure) {
                    context = context.retryable();
                }
                StoreError::QueryError {
                    message: info.message().to_string(),
                    context,
                }
            }
            Error::QueryBuilderError(e) => {
                StoreError::query(format!("Query builder error: {}", e))
            }
            Error::DeserializationError(e) => {
                StoreError::internal(format!("Deserialization error: {}", e))
            }
            Error::SerializationError(e) => {
                StoreError::internal(format!("Serialization error: {}", e))
            }
            other => StoreError::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-store")]
impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::connection_with_context(
            err.to_string(),
            ErrorContext::default().with_details("pool_error"),
        )
    }
}
