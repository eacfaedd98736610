use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::event::Event;
use crate::types::SequenceNumber;

pub use memory::InMemoryEventStore;

mod memory;

/// An EventStore is responsible for appending the events of every stream, and loading the ordered
/// history of a single stream.
///
/// Events of a stream are returned exactly in the order they were appended: never reordered, never
/// deduplicated. No ordering is defined across streams.
pub trait EventStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Appends the event at the end of its stream.
    fn persist(&self, event: Arc<dyn Event>) -> Result<StoreEvent, Self::Error>;

    /// Loads the events of the stream, oldest first. An unknown stream is empty.
    ///
    /// The returned vector is a snapshot: later appends do not show up in it.
    fn get_stream(&self, stream_id: &str) -> Result<Vec<StoreEvent>, Self::Error>;

    /// Appends the event at the end of its stream.
    fn add_event<E: Event>(&self, event: E) -> Result<StoreEvent, Self::Error>
    where
        Self: Sized,
    {
        self.persist(Arc::new(event))
    }
}

/// Blanket implementation making an [`EventStore`] every (smart) pointer to an [`EventStore`],
/// e.g. `&Store`, `Box<Store>`, `Arc<Store>`.
impl<S, T> EventStore for T
where
    S: EventStore + ?Sized,
    T: Deref<Target = S>,
{
    type Error = S::Error;

    /// Deref call to [`EventStore::persist`].
    fn persist(&self, event: Arc<dyn Event>) -> Result<StoreEvent, Self::Error> {
        self.deref().persist(event)
    }

    /// Deref call to [`EventStore::get_stream`].
    fn get_stream(&self, stream_id: &str) -> Result<Vec<StoreEvent>, Self::Error> {
        self.deref().get_stream(stream_id)
    }
}

/// A `StoreEvent` contains the payload (the original event) alongside the event's metadata.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    /// Uniquely identifies an event among all events appended to all streams.
    pub id: Uuid,
    /// The original, appended, event.
    pub payload: Arc<dyn Event>,
    /// The timestamp of when the event was appended.
    pub occurred_on: DateTime<Utc>,
    /// The position of the event within its stream, starting from 1.
    pub sequence_number: SequenceNumber,
}

impl StoreEvent {
    pub(crate) fn new(payload: Arc<dyn Event>, sequence_number: SequenceNumber) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            occurred_on: Utc::now(),
            sequence_number,
        }
    }

    /// Returns the sequence number of the event, within its stream.
    pub const fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }

    /// Returns the original, appended, event.
    pub fn payload(&self) -> &dyn Event {
        self.payload.as_ref()
    }

    pub fn stream_id(&self) -> &str {
        self.payload.stream_id()
    }
}
