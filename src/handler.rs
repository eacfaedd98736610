use crate::command::{Command, Response};
use crate::error::CommandError;
use crate::types::TypeTag;

/// A terminal handler, bound to exactly one command type: [`CommandHandler::Command`].
///
/// ```
/// use faire::{Command, CommandError, CommandHandler, Response};
///
/// #[derive(Debug)]
/// struct Greet {
///     name: String,
/// }
///
/// impl Command for Greet {}
///
/// struct GreetHandler;
///
/// impl CommandHandler for GreetHandler {
///     type Command = Greet;
///
///     fn handle(&self, command: &Greet) -> Result<Response, CommandError> {
///         Ok(Response::with_payload(format!("hello {}", command.name))?)
///     }
/// }
/// ```
pub trait CommandHandler: Send + Sync + 'static {
    type Command: Command;

    /// Handles the command. Domain errors should be returned as [`CommandError::Rejected`].
    fn handle(&self, command: &Self::Command) -> Result<Response, CommandError>;

    /// The name of the handler, used in tracing spans. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Type-erased view over a [`CommandHandler`], so that handlers of different command types can live
/// in the same chain table.
pub(crate) trait ErasedHandler: Send + Sync {
    fn listen_to(&self) -> TypeTag;

    fn handle_dyn(&self, command: &dyn Command) -> Result<Response, CommandError>;

    fn name(&self) -> &'static str;
}

impl<H> ErasedHandler for H
where
    H: CommandHandler,
{
    fn listen_to(&self) -> TypeTag {
        TypeTag::of::<H::Command>()
    }

    fn handle_dyn(&self, command: &dyn Command) -> Result<Response, CommandError> {
        match command.downcast_ref::<H::Command>() {
            Some(command) => self.handle(command),
            None => Err(CommandError::UnexpectedCommand {
                expected: std::any::type_name::<H::Command>(),
                found: command.name(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        CommandHandler::name(self)
    }
}

/// Fallback used by the dispatcher when no chain is bound to a command type.
///
/// Always fails with [`CommandError::HandlerNotFound`] naming the command.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHandler;

impl NullHandler {
    pub fn handle(&self, command: &dyn Command) -> Result<Response, CommandError> {
        tracing::warn!(command = command.name(), "no handler registered for command");
        Err(CommandError::HandlerNotFound(command.name()))
    }
}
