use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::InMemoryStoreError;
use crate::event::Event;
use crate::store::{EventStore, StoreEvent};

type Stream = Arc<Mutex<Vec<StoreEvent>>>;

/// Process-local [`EventStore`], keeping every stream in memory.
///
/// Appends to the same stream are serialized by a per-stream lock, while appends to different
/// streams only contend on the stream table when a stream is seen for the first time.
///
/// A stream holds at most `SequenceNumber::MAX` events: appending past it
/// fails with [`InMemoryStoreError::StreamFull`].
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<String, Stream>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers of every stream holding at least one event, sorted.
    pub fn stream_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    fn stream(&self, stream_id: &str) -> Stream {
        if let Some(stream) = self
            .streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(stream_id)
        {
            return stream.clone();
        }

        self.streams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(stream_id.to_string())
            .or_default()
            .clone()
    }
}

impl EventStore for InMemoryEventStore {
    type Error = InMemoryStoreError;

    fn persist(&self, event: Arc<dyn Event>) -> Result<StoreEvent, Self::Error> {
        let stream = self.stream(event.stream_id());
        let mut events = stream.lock().unwrap_or_else(PoisonError::into_inner);

        let sequence_number = match events.last() {
            None => 1,
            Some(last) => last
                .sequence_number
                .checked_add(1)
                .ok_or_else(|| InMemoryStoreError::StreamFull {
                    stream_id: event.stream_id().to_string(),
                    last: last.sequence_number,
                })?,
        };
        let store_event = StoreEvent::new(event, sequence_number);
        events.push(store_event.clone());

        tracing::trace!({
            event_id = %store_event.id,
            stream_id = store_event.stream_id(),
            sequence_number = sequence_number,
        }, "event appended");

        Ok(store_event)
    }

    fn get_stream(&self, stream_id: &str) -> Result<Vec<StoreEvent>, Self::Error> {
        let stream = self
            .streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(stream_id)
            .cloned();

        let Some(stream) = stream else {
            return Ok(vec![]);
        };

        let events = stream.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Ok(events)
    }
}
