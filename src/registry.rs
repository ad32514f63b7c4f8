use crate::codec::serde_bincode::{ErasedDecode, decode_erased};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A `(logical name, runtime type)` pair registered up front so the type is
/// encoded with a compact numeric tag.
#[derive(Clone)]
pub struct TypePair {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    decode: ErasedDecode,
}

impl TypePair {
    pub fn of<T>(name: impl Into<String>) -> Self
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        Self {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            decode: decode_erased::<T>,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
    pub(crate) fn decoder(&self) -> ErasedDecode {
        self.decode
    }
}

impl fmt::Debug for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypePair")
            .field(&self.name)
            .field(&self.type_name)
            .finish()
    }
}

/// Ordered, shared set of type pairs. Cheap to clone; clones see the same set.
///
/// Engines read it once when they are built. Changing it later only affects
/// engines built afterwards.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    pairs: Arc<RwLock<Vec<TypePair>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = TypePair>) -> Self {
        Self {
            pairs: Arc::new(RwLock::new(pairs.into_iter().collect())),
        }
    }

    /// Appends `pair`. Duplicates are accepted here and rejected at engine build.
    pub fn register(&self, pair: TypePair) {
        self.pairs
            .write()
            .expect("registry lock poisoned")
            .push(pair);
    }

    /// Replaces the whole set.
    pub fn set_pairs(&self, pairs: impl IntoIterator<Item = TypePair>) {
        let pairs: Vec<TypePair> = pairs.into_iter().collect();
        *self.pairs.write().expect("registry lock poisoned") = pairs;
    }

    /// Snapshot of the current set, in registration order.
    pub fn pairs(&self) -> Vec<TypePair> {
        self.pairs.read().expect("registry lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.pairs.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.pairs()).finish()
    }
}
