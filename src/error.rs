use crate::types::SequenceNumber;

/// Errors returned while dispatching or handling a command.
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    /// No chain is bound to the command type.
    #[error("no handler registered for {0}")]
    HandlerNotFound(&'static str),
    /// A chain was invoked directly with a command it is not bound to.
    #[error("handler expects {expected} but received {found}")]
    UnexpectedCommand {
        expected: &'static str,
        found: &'static str,
    },
    /// Serialization/deserialization of a response payload
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Domain error raised by a terminal handler, e.g. a uniqueness violation.
    #[error(transparent)]
    Rejected(Box<dyn std::error::Error + Send + Sync>),
}

impl CommandError {
    /// Wraps a domain error raised by a handler.
    pub fn rejected(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Rejected(error.into())
    }
}

/// Errors raised while wiring a command chain.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("a command chain needs at least a terminal handler")]
    EmptyChain,
    #[error("the last link of a command chain must be a terminal handler")]
    MissingTerminalHandler,
    #[error("link {position} of the command chain is a terminal handler, only the last link may be one")]
    MisplacedHandler { position: usize },
}

/// Errors returned by a single applier. [`crate::AggregateManager`] turns them into a [`FoldError`]
/// pointing at the offending event.
#[derive(thiserror::Error, Debug)]
pub enum ApplyError {
    #[error("no applier found")]
    ApplierNotFound,
    #[error("aggregate already initialized")]
    AlreadyInitialized,
    #[error("aggregate not initialized")]
    NotInitialized,
    #[error(transparent)]
    Rejected(Box<dyn std::error::Error + Send + Sync>),
}

impl ApplyError {
    pub fn rejected(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Rejected(error.into())
    }
}

/// Errors raised while folding a stream into an aggregate.
#[derive(thiserror::Error, Debug)]
pub enum FoldError {
    #[error("no applier found for event {0}")]
    ApplierNotFound(&'static str),
    /// An initializer event was applied onto an aggregate that already exists.
    #[error("{event} (sequence number {sequence_number}) initializes an aggregate which already exists")]
    AlreadyInitialized {
        event: &'static str,
        sequence_number: SequenceNumber,
    },
    /// A mutating event was applied before the aggregate was initialized.
    #[error("{event} (sequence number {sequence_number}) mutates an aggregate which does not exist yet")]
    NotInitialized {
        event: &'static str,
        sequence_number: SequenceNumber,
    },
    #[error("{event} (sequence number {sequence_number}) rejected by its applier: {source}")]
    Rejected {
        event: &'static str,
        sequence_number: SequenceNumber,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The underlying event store failed to read the stream.
    #[error(transparent)]
    Store(Box<dyn std::error::Error + Send + Sync>),
}

impl FoldError {
    pub(crate) fn from_apply(error: ApplyError, event: &'static str, sequence_number: SequenceNumber) -> Self {
        match error {
            ApplyError::ApplierNotFound => Self::ApplierNotFound(event),
            ApplyError::AlreadyInitialized => Self::AlreadyInitialized { event, sequence_number },
            ApplyError::NotInitialized => Self::NotInitialized { event, sequence_number },
            ApplyError::Rejected(source) => Self::Rejected {
                event,
                sequence_number,
                source,
            },
        }
    }
}

/// Errors raised by the [`crate::store::InMemoryEventStore`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InMemoryStoreError {
    /// The stream already holds an event at the highest [`SequenceNumber`].
    #[error("stream {stream_id} is full: sequence number {last} cannot be followed")]
    StreamFull { stream_id: String, last: SequenceNumber },
}
