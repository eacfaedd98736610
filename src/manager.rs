use std::sync::Arc;

use crate::applier::ApplierRegistry;
use crate::error::FoldError;
use crate::event::Event;
use crate::state::AggregateState;
use crate::store::{EventStore, StoreEvent};

/// The AggregateManager couples an [`EventStore`] with the [`ApplierRegistry`] of an aggregate `A`,
/// so that events can be appended and the aggregate reconstructed by folding its stream.
pub struct AggregateManager<S, A>
where
    S: EventStore,
{
    event_store: S,
    appliers: ApplierRegistry<A>,
}

impl<S, A> AggregateManager<S, A>
where
    S: EventStore,
{
    /// Creates a new instance of an [`AggregateManager`].
    pub fn new(event_store: S, appliers: ApplierRegistry<A>) -> Self {
        Self { event_store, appliers }
    }

    /// Appends the event to its stream.
    pub fn append(&self, event: impl Event) -> Result<StoreEvent, S::Error> {
        self.event_store.persist(Arc::new(event))
    }

    /// Loads an aggregate instance by folding every event of its stream, in order, through the
    /// appliers. Returns `Ok(None)` if the stream is empty.
    ///
    /// Either the whole stream is folded or an error is returned.
    #[tracing::instrument(skip(self), err)]
    pub fn load(&self, stream_id: &str) -> Result<Option<AggregateState<A>>, FoldError> {
        let events: Vec<StoreEvent> = self
            .event_store
            .get_stream(stream_id)
            .map_err(|error| FoldError::Store(Box::new(error)))?;

        self.appliers.fold(&events)
    }

    /// Returns the internal event store
    pub fn event_store(&self) -> &S {
        &self.event_store
    }

    pub fn appliers(&self) -> &ApplierRegistry<A> {
        &self.appliers
    }
}
