//! Application error type.
//!
//! Every failure carries an [`ErrorKind`] (what went wrong, for callers that
//! branch on it) and a human-readable message (for the terminal). The binary
//! maps the kind to a process exit code.

/// Error taxonomy for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-200 response (or transport failure) from the pricing API.
    ExternalService,
    /// Archival document or table is missing expected structure/columns.
    MalformedInput,
    /// Optimizer failure or structurally insufficient data.
    Estimation,
    /// Operation not valid in the model's current state.
    InvalidState,
    /// Bad configuration, hyperparameters, or missing credential.
    Config,
    /// Bad caller-supplied argument.
    InvalidInput,
    /// Filesystem failure.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::InvalidInput | ErrorKind::Io | ErrorKind::MalformedInput => 2,
            ErrorKind::Estimation => 3,
            ErrorKind::ExternalService => 4,
            ErrorKind::InvalidState => 5,
        }
    }
}

#[derive(Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedInput, message)
    }

    pub fn estimation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Estimation, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}
