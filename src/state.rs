use crate::types::SequenceNumber;

/// An aggregate materialized from its stream, along with the position of the last event applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateState<A> {
    stream_id: String,
    sequence_number: SequenceNumber,
    inner: A,
}

impl<A> AggregateState<A> {
    pub fn new(stream_id: impl Into<String>, sequence_number: SequenceNumber, inner: A) -> Self {
        Self {
            stream_id: stream_id.into(),
            sequence_number,
            inner,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Sequence number of the last event folded into this state.
    pub fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }
}
