use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{ApplyError, FoldError};
use crate::event::Event;
use crate::state::AggregateState;
use crate::store::StoreEvent;
use crate::types::TypeTag;

/// A pure function bound to exactly one event type, producing the next state of an aggregate `A`
/// out of an event and the current state, absent if the aggregate does not exist yet.
pub trait Applier<A>: Send + Sync + 'static {
    type Event: Event;

    fn apply(&self, event: &Self::Event, aggregate: Option<A>) -> Result<A, ApplyError>;

    /// The name of the applier, used in logs. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Type-erased view over an [`Applier`], as returned by [`ApplierRegistry::get_applier`].
pub trait DynApplier<A>: Send + Sync {
    fn apply(&self, event: &dyn Event, aggregate: Option<A>) -> Result<A, ApplyError>;

    fn name(&self) -> &'static str;
}

/// Registered [`Applier`], seen through its erased interface.
struct Erased<P>(P);

impl<A, P> DynApplier<A> for Erased<P>
where
    P: Applier<A>,
{
    fn apply(&self, event: &dyn Event, aggregate: Option<A>) -> Result<A, ApplyError> {
        match event.downcast_ref::<P::Event>() {
            Some(event) => <P as Applier<A>>::apply(&self.0, event, aggregate),
            None => Err(ApplyError::ApplierNotFound),
        }
    }

    fn name(&self) -> &'static str {
        <P as Applier<A>>::name(&self.0)
    }
}

/// Returned by [`ApplierRegistry::get_applier`] for event types without an applier. Always fails
/// with [`ApplyError::ApplierNotFound`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFoundApplier;

impl<A> DynApplier<A> for NotFoundApplier {
    fn apply(&self, event: &dyn Event, _aggregate: Option<A>) -> Result<A, ApplyError> {
        tracing::warn!(event = event.name(), "no applier found for event");
        Err(ApplyError::ApplierNotFound)
    }

    fn name(&self) -> &'static str {
        "NotFoundApplier"
    }
}

/// An [`Applier`] made of a plain function. No check is made on the presence of the aggregate.
pub struct FnApplier<E, F> {
    f: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> FnApplier<E, F> {
    pub fn new(f: F) -> Self {
        Self { f, _event: PhantomData }
    }
}

impl<A, E, F> Applier<A> for FnApplier<E, F>
where
    E: Event,
    F: Fn(&E, Option<A>) -> Result<A, ApplyError> + Send + Sync + 'static,
{
    type Event = E;

    fn apply(&self, event: &E, aggregate: Option<A>) -> Result<A, ApplyError> {
        (self.f)(event, aggregate)
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<F>()
    }
}

/// Applier of an event creating the aggregate. Fails with [`ApplyError::AlreadyInitialized`] if the
/// aggregate already exists.
pub struct Initializer<E, F> {
    f: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> Initializer<E, F> {
    pub fn new(f: F) -> Self {
        Self { f, _event: PhantomData }
    }
}

impl<A, E, F> Applier<A> for Initializer<E, F>
where
    E: Event,
    F: Fn(&E) -> A + Send + Sync + 'static,
{
    type Event = E;

    fn apply(&self, event: &E, aggregate: Option<A>) -> Result<A, ApplyError> {
        match aggregate {
            Some(_) => Err(ApplyError::AlreadyInitialized),
            None => Ok((self.f)(event)),
        }
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<F>()
    }
}

/// Applier of an event changing an existing aggregate. Fails with [`ApplyError::NotInitialized`] if
/// the aggregate does not exist yet.
pub struct Mutator<E, F> {
    f: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> Mutator<E, F> {
    pub fn new(f: F) -> Self {
        Self { f, _event: PhantomData }
    }
}

impl<A, E, F> Applier<A> for Mutator<E, F>
where
    E: Event,
    F: Fn(&E, A) -> A + Send + Sync + 'static,
{
    type Event = E;

    fn apply(&self, event: &E, aggregate: Option<A>) -> Result<A, ApplyError> {
        match aggregate {
            Some(aggregate) => Ok((self.f)(event, aggregate)),
            None => Err(ApplyError::NotInitialized),
        }
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<F>()
    }
}

/// Maps every event type to the single [`Applier`] folding it into an aggregate `A`.
///
/// Registering an applier for an event type which already has one replaces it.
///
/// ```
/// use faire::{ApplierRegistry, Event};
///
/// #[derive(Debug)]
/// struct Opened {
///     stream_id: String,
/// }
///
/// impl Event for Opened {
///     fn stream_id(&self) -> &str {
///         &self.stream_id
///     }
/// }
///
/// #[derive(Debug)]
/// struct Deposited {
///     stream_id: String,
///     amount: u64,
/// }
///
/// impl Event for Deposited {
///     fn stream_id(&self) -> &str {
///         &self.stream_id
///     }
/// }
///
/// let mut appliers: ApplierRegistry<u64> = ApplierRegistry::new();
/// appliers
///     .register_initializer(|_: &Opened| 0)
///     .register_mutator(|event: &Deposited, balance| balance + event.amount);
///
/// assert!(appliers.contains::<Deposited>());
/// ```
pub struct ApplierRegistry<A> {
    appliers: HashMap<TypeTag, Arc<dyn DynApplier<A>>>,
}

impl<A> Default for ApplierRegistry<A> {
    fn default() -> Self {
        Self {
            appliers: HashMap::new(),
        }
    }
}

impl<A> ApplierRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the applier to its event type, replacing any applier previously bound to it.
    pub fn register<P>(&mut self, applier: P) -> &mut Self
    where
        P: Applier<A>,
    {
        let event = TypeTag::of::<P::Event>();
        tracing::debug!(event = event.name(), applier = <P as Applier<A>>::name(&applier), "registering applier");

        if self.appliers.insert(event, Arc::new(Erased(applier))).is_some() {
            tracing::debug!(event = event.name(), "previous applier replaced");
        }
        self
    }

    /// Binds a plain function to the event type `E`.
    pub fn register_fn<E, F>(&mut self, f: F) -> &mut Self
    where
        E: Event,
        F: Fn(&E, Option<A>) -> Result<A, ApplyError> + Send + Sync + 'static,
    {
        self.register(FnApplier::new(f))
    }

    /// Binds `f` as the [`Initializer`] of the aggregate for the event type `E`.
    pub fn register_initializer<E, F>(&mut self, f: F) -> &mut Self
    where
        E: Event,
        F: Fn(&E) -> A + Send + Sync + 'static,
    {
        self.register(Initializer::new(f))
    }

    /// Binds `f` as a [`Mutator`] of the aggregate for the event type `E`.
    pub fn register_mutator<E, F>(&mut self, f: F) -> &mut Self
    where
        E: Event,
        F: Fn(&E, A) -> A + Send + Sync + 'static,
    {
        self.register(Mutator::new(f))
    }

    pub fn contains<E: Event>(&self) -> bool {
        self.appliers.contains_key(&TypeTag::of::<E>())
    }

    /// Number of event types with an applier.
    pub fn len(&self) -> usize {
        self.appliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appliers.is_empty()
    }

    /// Returns the applier bound to the type of `event`, or a [`NotFoundApplier`].
    pub fn get_applier(&self, event: &dyn Event) -> &dyn DynApplier<A> {
        match self.appliers.get(&event.tag()) {
            Some(applier) => applier.as_ref(),
            None => &NotFoundApplier,
        }
    }

    /// Left-folds the events, oldest first, starting from an absent aggregate.
    ///
    /// Returns `Ok(None)` for an empty slice. Stops at the first failing event: no partially folded
    /// aggregate is ever returned.
    pub fn fold(&self, events: &[StoreEvent]) -> Result<Option<AggregateState<A>>, FoldError> {
        let (Some(first), Some(last)) = (events.first(), events.last()) else {
            return Ok(None);
        };

        let mut aggregate: Option<A> = None;
        for store_event in events {
            let event = store_event.payload();
            let applier = self.get_applier(event);

            tracing::trace!({
                event = event.name(),
                applier = applier.name(),
                sequence_number = store_event.sequence_number(),
            }, "applying event");

            match applier.apply(event, aggregate) {
                Ok(next) => aggregate = Some(next),
                Err(error) => {
                    let error = FoldError::from_apply(error, event.name(), store_event.sequence_number());
                    tracing::error!({
                        stream_id = store_event.stream_id(),
                        event_id = %store_event.id,
                        error = %error,
                    }, "failed to fold event");
                    return Err(error);
                }
            }
        }

        Ok(aggregate.map(|inner| AggregateState::new(first.stream_id(), last.sequence_number(), inner)))
    }
}

impl<A> Debug for ApplierRegistry<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.appliers.iter().map(|(event, applier)| (event.name(), applier.name())))
            .finish()
    }
}
