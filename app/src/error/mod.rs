use sea_orm::{DbErr, SqlErr, TransactionError};

/// Application failure taxonomy. Callers branch on the kind, never on
/// driver-specific error text.
#[derive(Debug)]
pub enum AppError {
    /// Malformed input, rejected before any state was mutated.
    Validation(String),
    /// Unknown session/tournament/match/player.
    NotFound(String),
    /// Duplicate join, full tournament/session, already-generated bracket.
    Conflict(String),
    /// Storage or log temporarily unavailable; retryable.
    Transient(String),
    /// Anything else; a bug or an unexpected driver failure.
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Transient(m)
            | Self::Internal(m) => m,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(m)) => Self::Conflict(m),
            Some(SqlErr::ForeignKeyConstraintViolation(m)) => Self::Conflict(m),
            _ => match err {
                DbErr::RecordNotFound(m) => Self::NotFound(m),
                DbErr::Conn(e) => Self::Transient(e.to_string()),
                DbErr::ConnectionAcquire(e) => Self::Transient(e.to_string()),
                other => Self::Internal(other.to_string()),
            },
        }
    }
}

impl From<TransactionError<AppError>> for AppError {
    fn from(err: TransactionError<AppError>) -> Self {
        match err {
            TransactionError::Connection(e) => e.into(),
            TransactionError::Transaction(e) => e,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
