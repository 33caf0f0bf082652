/// Errors surfaced by the scoring engine.
///
/// `DataLoad` and `Configuration` are fatal during initialization; `InvalidArgument`
/// and `NotReady` reject a single query and leave the engine serving.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Source input is malformed or incomplete.
    #[error("data load error: {0}")]
    DataLoad(String),
    /// Source input parsed but is semantically unusable (e.g. all-zero sector weights).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Unknown province/sector name or a non-positive top-N.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A query arrived before the first engine was published.
    #[error("engine not ready: initialization has not completed")]
    NotReady,
}

impl EngineError {
    pub(crate) fn data_load(msg: impl Into<String>) -> Self {
        EngineError::DataLoad(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        EngineError::InvalidArgument(msg.into())
    }

    /// Whether the caller can retry or fix the request without restarting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::InvalidArgument(_) | EngineError::NotReady)
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
