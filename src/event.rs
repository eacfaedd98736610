use std::fmt::Debug;

use crate::types::{AsAny, TypeTag};

/// An immutable fact belonging to a stream.
///
/// ```
/// use faire::Event;
///
/// #[derive(Debug)]
/// struct TodoListCreated {
///     stream_id: String,
///     name: String,
/// }
///
/// impl Event for TodoListCreated {
///     fn stream_id(&self) -> &str {
///         &self.stream_id
///     }
/// }
/// ```
pub trait Event: AsAny + Debug + Send + Sync + 'static {
    /// Identifies the aggregate instance this event belongs to.
    fn stream_id(&self) -> &str;

    /// The name of the event, used in logs and errors. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Event {
    /// Runtime tag of the concrete event type.
    pub fn tag(&self) -> TypeTag {
        TypeTag::of_val(self.as_any(), self.name())
    }

    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}
