use std::fmt;

/// Errors raised by a [`RecordStore`](crate::store::RecordStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record store unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },
    #[error("record store rejected the request (status {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed response from record store: {0}")]
    MalformedResponse(String),
    #[error("http client error: {0}")]
    HttpClient(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The store call an intake submission was making when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    LookupPatient,
    CreatePatient,
    CreateAppointment,
    CreateAnamnesis,
}

impl fmt::Display for WriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            WriteStep::LookupPatient => "look up patient",
            WriteStep::CreatePatient => "create patient",
            WriteStep::CreateAppointment => "create appointment",
            WriteStep::CreateAnamnesis => "record anamnesis",
        };
        f.write_str(step)
    }
}

/// Broad category of an [`IntakeError`], used by the outer surfaces to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Connectivity,
    WriteFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::WriteFailure => "write_failure",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("failed to {step}: {source}")]
    Connectivity {
        step: WriteStep,
        #[source]
        source: StoreError,
    },
    #[error("failed to {step}: {source}")]
    WriteFailure {
        step: WriteStep,
        #[source]
        source: StoreError,
    },
}

impl IntakeError {
    /// Wraps a store error raised while performing `step`.
    ///
    /// An unreachable store is a connectivity problem; anything the store answered with is a
    /// write failure.
    pub fn store(step: WriteStep, source: StoreError) -> Self {
        match source {
            StoreError::Unreachable { .. } => IntakeError::Connectivity { step, source },
            _ => IntakeError::WriteFailure { step, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            IntakeError::InvalidInput(_) => ErrorKind::Validation,
            IntakeError::Configuration(_) => ErrorKind::Configuration,
            IntakeError::Connectivity { .. } => ErrorKind::Connectivity,
            IntakeError::WriteFailure { .. } => ErrorKind::WriteFailure,
        }
    }

    /// The step that failed, for errors raised after validation.
    pub fn step(&self) -> Option<WriteStep> {
        match self {
            IntakeError::Connectivity { step, .. } | IntakeError::WriteFailure { step, .. } => {
                Some(*step)
            }
            _ => None,
        }
    }
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
