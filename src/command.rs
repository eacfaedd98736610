use std::fmt::{Debug, Display, Formatter};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AsAny, TypeTag};

/// An intent to change state, dispatched to exactly one handler.
///
/// Commands are plain immutable structs. Fields which may be left unspecified are declared as
/// `Option`s, so that a missing value is always an explicit `None`.
///
/// ```
/// use faire::Command;
///
/// #[derive(Debug)]
/// struct RegisterUser {
///     username: String,
///     email: Option<String>,
/// }
///
/// impl Command for RegisterUser {}
/// ```
pub trait Command: AsAny + Debug + Send + Sync + 'static {
    /// The name of the command, used in logs and errors. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Command {
    /// Runtime tag of the concrete command type.
    pub fn tag(&self) -> TypeTag {
        TypeTag::of_val(self.as_any(), self.name())
    }

    pub fn downcast_ref<C: Command>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }
}

/// Result of handling a command.
///
/// `errors` and `infos` can only grow: every mutator appends, none replaces or clears them. An empty
/// `errors` list means success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    payload: Option<Value>,
    errors: Vec<String>,
    infos: Vec<String>,
}

impl Response {
    pub fn new(payload: Option<Value>) -> Self {
        Self {
            payload,
            errors: vec![],
            infos: vec![],
        }
    }

    /// A response carrying no payload.
    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Serializes `payload` into a new response.
    pub fn with_payload(payload: impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Self::new(Some(serde_json::to_value(payload)?)))
    }

    /// Appends `errors` after the ones already there.
    pub fn with_errors(mut self, errors: impl IntoIterator<Item = String>) -> Self {
        self.errors.extend(errors);
        self
    }

    /// Appends `infos` after the ones already there.
    pub fn with_infos(mut self, infos: impl IntoIterator<Item = String>) -> Self {
        self.infos.extend(infos);
        self
    }

    pub fn append_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn append_info(&mut self, info: impl Into<String>) {
        self.infos.push(info.into());
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Deserializes the payload into `T`, if any.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.payload.clone().map(serde_json::from_value::<T>).transpose()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn infos(&self) -> &[String] {
        &self.infos
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}
