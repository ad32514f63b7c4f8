use crate::{CodecError, DynValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Object <-> bytes boundary used by storage layers.
pub trait Serializer {
    /// Encode `value` together with its type tag.
    fn serialize<T>(&mut self, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + 'static;

    /// Decode whatever type the leading tag names.
    fn deserialize(&mut self, bytes: &[u8]) -> Result<DynValue, CodecError>;

    /// Decode as `T`, failing with `TypeMismatch` if the tag names another type.
    fn deserialize_as<T>(&mut self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned + 'static;
}
