//! Type-erased decoded payloads.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Value produced by a registered content decoder.
///
/// The codec never looks inside; callers recover the concrete type with
/// [`Content::downcast_ref`]. Cloning is cheap and shares the value.
#[derive(Clone)]
pub struct Content {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Content {
    /// Wrap a decoded value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Borrow the value as `T` if that is its concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Check whether the value is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Name of the concrete type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Content").field(&self.type_name).finish()
    }
}
