//! A small cqrs/es core.
//!
//! Commands are routed by a [`CommandDispatcher`] to the [`CommandChain`] bound to their type: a list
//! of [`CommandMiddleware`]s wrapping a single terminal [`CommandHandler`].
//!
//! Events are appended to an [`EventStore`], one stream per aggregate instance, and folded back into
//! the aggregate by an [`ApplierRegistry`], holding one [`Applier`] per event type.

pub use crate::aggregate::*;
pub use crate::command::*;
pub use crate::dispatcher::*;
pub use crate::event::*;
pub use crate::handler::*;
pub use crate::middleware::*;

mod applier;
mod command;
mod dispatcher;
mod event;
mod handler;
mod manager;
mod middleware;
mod state;

pub mod error;
pub mod store;
pub mod types;

pub mod aggregate {
    pub use crate::applier::{
        Applier, ApplierRegistry, DynApplier, FnApplier, Initializer, Mutator, NotFoundApplier,
    };
    pub use crate::manager::AggregateManager;
    pub use crate::state::AggregateState;
}

pub use error::{ApplyError, CommandError, ConfigurationError, FoldError, InMemoryStoreError};
pub use store::{EventStore, InMemoryEventStore, StoreEvent};
pub use types::{SequenceNumber, TypeTag};
