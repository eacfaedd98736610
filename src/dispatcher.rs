use std::collections::HashMap;

use crate::command::{Command, Response};
use crate::error::{CommandError, ConfigurationError};
use crate::handler::{CommandHandler, NullHandler};
use crate::middleware::{ChainLink, CommandChain};
use crate::types::TypeTag;

/// Routes every command to the single [`CommandChain`] bound to its type.
///
/// The table is filled at wiring time and is expected to stay untouched while commands are being
/// dispatched: `dispatch` only needs a shared reference, registration needs an exclusive one.
/// Commands without a binding fall back to the [`NullHandler`].
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    chains: HashMap<TypeTag, CommandChain>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a pre-built chain to its command type, returning the binding it replaces, if any.
    pub fn register(&mut self, chain: CommandChain) -> Option<CommandChain> {
        let listen_to = chain.listen_to();
        tracing::debug!(command = listen_to.name(), links = chain.len(), "registering command chain");
        self.chains.insert(listen_to, chain)
    }

    /// Binds a bare handler to its command type.
    pub fn register_handler(&mut self, handler: impl CommandHandler) -> Option<CommandChain> {
        self.register(CommandChain::from_handler(handler))
    }

    /// Builds a chain out of an ordered list of middlewares terminated by a handler, and binds it.
    pub fn register_handlers(&mut self, links: Vec<ChainLink>) -> Result<Option<CommandChain>, ConfigurationError> {
        Ok(self.register(CommandChain::from_links(links)?))
    }

    pub fn is_registered<C: Command>(&self) -> bool {
        self.chains.contains_key(&TypeTag::of::<C>())
    }

    /// Number of command types with a bound chain.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Hands the command to the chain bound to its type.
    ///
    /// Fails with [`CommandError::HandlerNotFound`] if nothing is bound to it.
    pub fn dispatch(&self, command: &dyn Command) -> Result<Response, CommandError> {
        let span = tracing::debug_span!("faire.dispatch", command = command.name());
        let _e = span.enter();

        match self.chains.get(&command.tag()) {
            Some(chain) => chain.handle(command),
            None => NullHandler.handle(command),
        }
    }
}
