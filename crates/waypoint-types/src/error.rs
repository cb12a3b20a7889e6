use thiserror::Error;

/// Boxed error returned by user step operations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from checkpoint store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Category of a step failure, independent of its source error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepErrorKind {
    StorageFailure,
    CorruptRecord,
    LogicFailure,
    PersistFailure,
}

/// Errors raised by a single step invocation.
///
/// Every variant carries the caller-given step name so that failures can be
/// attributed when they surface from the workflow runner.
#[derive(Debug, Error)]
pub enum StepError {
    /// Looking up the checkpoint failed; the operation was not run.
    #[error("storage error checking step '{step}': {source}")]
    StorageFailure {
        step: String,
        #[source]
        source: RepositoryError,
    },

    /// A persisted result could not be decoded into the expected type.
    #[error("corrupt record for step '{step}': {source}")]
    CorruptRecord {
        step: String,
        #[source]
        source: serde_json::Error,
    },

    /// The step operation itself failed. Nothing was persisted.
    #[error("logic failed in step '{step}': {source}")]
    LogicFailure {
        step: String,
        #[source]
        source: BoxError,
    },

    /// The operation ran but its result was not recorded. A resumed run
    /// executes it again.
    #[error("could not persist result of step '{step}': {source}")]
    PersistFailure {
        step: String,
        #[source]
        source: RepositoryError,
    },
}

impl StepError {
    pub fn kind(&self) -> StepErrorKind {
        match self {
            StepError::StorageFailure { .. } => StepErrorKind::StorageFailure,
            StepError::CorruptRecord { .. } => StepErrorKind::CorruptRecord,
            StepError::LogicFailure { .. } => StepErrorKind::LogicFailure,
            StepError::PersistFailure { .. } => StepErrorKind::PersistFailure,
        }
    }

    /// Name of the step that failed.
    pub fn step(&self) -> &str {
        match self {
            StepError::StorageFailure { step, .. }
            | StepError::CorruptRecord { step, .. }
            | StepError::LogicFailure { step, .. }
            | StepError::PersistFailure { step, .. } => step,
        }
    }
}
