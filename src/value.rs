use std::any::Any;
use std::fmt;

/// A value read back by untyped deserialize. Its concrete type is whatever the
/// type tag in the bytes resolved to.
pub struct DynValue {
    inner: Box<dyn Any + Send>,
    name: String,
    type_name: &'static str,
}

impl DynValue {
    pub(crate) fn new(inner: Box<dyn Any + Send>, name: String, type_name: &'static str) -> Self {
        Self {
            inner,
            name,
            type_name,
        }
    }

    /// Logical name the type was registered under, or the Rust type name for
    /// unregistered types.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Takes the value out as `T`, or hands `self` back unchanged.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Self {
            inner,
            name,
            type_name,
        } = self;
        match inner.downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(inner) => Err(Self {
                inner,
                name,
                type_name,
            }),
        }
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynValue")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
