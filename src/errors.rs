use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClosureGraphError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("fact source error: {0}")]
    SourceError(String),
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("query error: {0}")]
    QueryError(String),
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl ClosureGraphError {
    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        ClosureGraphError::InvalidArgument(msg.into())
    }

    pub fn unsupported<T: Into<String>>(msg: T) -> Self {
        ClosureGraphError::UnsupportedOperation(msg.into())
    }

    pub fn fact_source<T: Into<String>>(msg: T) -> Self {
        ClosureGraphError::SourceError(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        ClosureGraphError::ConnectionError(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        ClosureGraphError::SchemaError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        ClosureGraphError::QueryError(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ClosureGraphError::SerializationError(msg.into())
    }
}
