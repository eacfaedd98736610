use std::any::{Any, TypeId};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Position of an event inside its stream. The first event of a stream has sequence number 1.
pub type SequenceNumber = i32;

/// Gives access to the concrete value behind a trait object, used to downcast commands and events.
///
/// Implemented for every `'static` type; there is no need to implement it by hand.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Stable tag identifying a concrete command or event type at runtime.
///
/// Registries are keyed by this tag. The name is only carried along for logs and errors, and takes no
/// part in equality.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Builds the tag of a value seen through a trait object, using `name` as its display name.
    pub(crate) fn of_val(value: &dyn Any, name: &'static str) -> Self {
        Self {
            id: value.type_id(),
            name,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
