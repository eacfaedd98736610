use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Instant;

use crate::command::{Command, Response};
use crate::error::{CommandError, ConfigurationError};
use crate::handler::{CommandHandler, ErasedHandler};
use crate::types::TypeTag;

/// A handler-shaped component wrapping the rest of a [`CommandChain`], used for cross-cutting
/// behaviour such as logging or validation.
///
/// Middlewares are not bound to any command type and can be shared between chains. Every
/// implementation must call [`Next::run`] exactly once, unless it deliberately short-circuits the
/// chain by returning its own result. Errors returned by `next` should be propagated unchanged.
///
/// ```
/// use faire::{Command, CommandError, CommandMiddleware, Next, Response};
///
/// struct Audit;
///
/// impl CommandMiddleware for Audit {
///     fn handle(&self, command: &dyn Command, next: Next<'_>) -> Result<Response, CommandError> {
///         let mut response = next.run(command)?;
///         response.append_info(format!("{} audited", command.name()));
///         Ok(response)
///     }
/// }
/// ```
pub trait CommandMiddleware: Send + Sync + 'static {
    fn handle(&self, command: &dyn Command, next: Next<'_>) -> Result<Response, CommandError>;

    /// The name of the middleware, used in tracing spans. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The remainder of a chain, as seen from a middleware.
///
/// Consumed by [`Next::run`], so it can be invoked at most once.
pub struct Next<'a> {
    middlewares: &'a [Arc<dyn CommandMiddleware>],
    handler: &'a dyn ErasedHandler,
}

impl<'a> Next<'a> {
    /// Invokes the next link: the following middleware, or the terminal handler.
    pub fn run(self, command: &dyn Command) -> Result<Response, CommandError> {
        match self.middlewares.split_first() {
            Some((middleware, middlewares)) => {
                let span = tracing::trace_span!("faire.middleware", middleware = middleware.name());
                let _e = span.enter();

                middleware.handle(
                    command,
                    Next {
                        middlewares,
                        handler: self.handler,
                    },
                )
            }
            None => {
                let span = tracing::trace_span!("faire.handler", handler = self.handler.name());
                let _e = span.enter();

                self.handler.handle_dyn(command)
            }
        }
    }
}

/// One element of the ordered list given to [`CommandChain::from_links`]: either a middleware or a
/// terminal handler.
#[derive(Clone)]
pub struct ChainLink(Link);

#[derive(Clone)]
enum Link {
    Middleware(Arc<dyn CommandMiddleware>),
    Handler(Arc<dyn ErasedHandler>),
}

impl ChainLink {
    pub fn middleware(middleware: impl CommandMiddleware) -> Self {
        Self(Link::Middleware(Arc::new(middleware)))
    }

    /// A middleware already shared with other chains.
    pub fn shared_middleware(middleware: Arc<dyn CommandMiddleware>) -> Self {
        Self(Link::Middleware(middleware))
    }

    pub fn handler(handler: impl CommandHandler) -> Self {
        Self(Link::Handler(Arc::new(handler)))
    }
}

/// A list of middlewares terminated by exactly one handler, composed into a single invocable.
///
/// Pre-logic of the middlewares runs first to last, the handler runs, then post-logic unwinds last to
/// first. The chain listens to the command type of its terminal handler.
#[derive(Clone)]
pub struct CommandChain {
    middlewares: Vec<Arc<dyn CommandMiddleware>>,
    handler: Arc<dyn ErasedHandler>,
}

impl CommandChain {
    pub fn builder() -> CommandChainBuilder {
        CommandChainBuilder::default()
    }

    /// A chain made of the handler alone.
    pub fn from_handler(handler: impl CommandHandler) -> Self {
        Self {
            middlewares: vec![],
            handler: Arc::new(handler),
        }
    }

    /// Builds a chain from an ordered list of middlewares followed by one terminal handler.
    pub fn from_links(links: Vec<ChainLink>) -> Result<Self, ConfigurationError> {
        let mut links = links;
        let handler = match links.pop() {
            None => return Err(ConfigurationError::EmptyChain),
            Some(ChainLink(Link::Middleware(_))) => return Err(ConfigurationError::MissingTerminalHandler),
            Some(ChainLink(Link::Handler(handler))) => handler,
        };

        let middlewares = links
            .into_iter()
            .enumerate()
            .map(|(position, link)| match link.0 {
                Link::Middleware(middleware) => Ok(middleware),
                Link::Handler(_) => Err(ConfigurationError::MisplacedHandler { position }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { middlewares, handler })
    }

    /// The command type this chain is bound to, taken from its terminal handler.
    pub fn listen_to(&self) -> TypeTag {
        self.handler.listen_to()
    }

    /// Number of links, terminal handler included.
    pub fn len(&self) -> usize {
        self.middlewares.len() + 1
    }

    /// Invokes the first link of the chain.
    pub fn handle(&self, command: &dyn Command) -> Result<Response, CommandError> {
        Next {
            middlewares: &self.middlewares,
            handler: self.handler.as_ref(),
        }
        .run(command)
    }
}

impl Debug for CommandChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandChain")
            .field(
                "middlewares",
                &self.middlewares.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("handler", &self.handler.name())
            .field("listen_to", &self.listen_to().name())
            .finish()
    }
}

/// Struct used to build a brand new [`CommandChain`].
#[derive(Default, Clone)]
pub struct CommandChainBuilder {
    middlewares: Vec<Arc<dyn CommandMiddleware>>,
}

impl CommandChainBuilder {
    /// Set middlewares list
    pub fn with_middlewares(mut self, middlewares: Vec<Arc<dyn CommandMiddleware>>) -> Self {
        self.middlewares = middlewares;
        self
    }

    /// Add a single middleware after the ones already added
    pub fn add_middleware(mut self, middleware: impl CommandMiddleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Add a single middleware shared with other chains
    pub fn add_shared_middleware(mut self, middleware: Arc<dyn CommandMiddleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Terminates the chain with its handler.
    pub fn build(self, handler: impl CommandHandler) -> CommandChain {
        CommandChain {
            middlewares: self.middlewares,
            handler: Arc::new(handler),
        }
    }
}

/// Logs name, duration and outcome of every command going through it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMiddleware;

impl CommandMiddleware for TracingMiddleware {
    fn handle(&self, command: &dyn Command, next: Next<'_>) -> Result<Response, CommandError> {
        let started = Instant::now();
        let result = next.run(command);
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => tracing::info!({
                command = command.name(),
                elapsed = ?elapsed,
                errors = response.errors().len(),
            }, "command handled"),
            Err(error) => tracing::error!({
                command = command.name(),
                elapsed = ?elapsed,
                error = ?error,
            }, "command failed"),
        }

        result
    }
}
