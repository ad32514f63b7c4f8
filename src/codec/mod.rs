//! Type-tagged encoding on top of the serde/bincode payload codec.

pub(crate) mod serde_bincode;
mod tag;

use self::serde_bincode::ErasedDecode;
use self::tag::TypeTag;
use crate::error::{CapacityExceeded, CodecError, DecodeFailure, EncodeFailure, RegistryError};
use crate::registry::TypePair;
use crate::value::DynValue;
use bincode::error::EncodeError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;

/// How a registered type is known to one engine.
#[derive(Clone)]
pub struct Registration {
    id: u32,
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    decode: ErasedDecode,
}

impl Registration {
    pub fn id(&self) -> u32 {
        self.id
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
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Maps runtime types to their wire tags and back. Immutable once built.
#[derive(Debug)]
pub struct CodecEngine {
    registrations: Vec<Registration>,
    by_type: HashMap<TypeId, u32>,
    by_type_name: HashMap<&'static str, u32>,
    registration_required: bool,
}

impl CodecEngine {
    /// Builds an engine from `pairs`. Ids follow registration order.
    pub fn build(pairs: &[TypePair], registration_required: bool) -> Result<Self, RegistryError> {
        let mut registrations = Vec::with_capacity(pairs.len());
        let mut by_type = HashMap::with_capacity(pairs.len());
        let mut by_type_name = HashMap::with_capacity(pairs.len());
        let mut names = HashMap::with_capacity(pairs.len());

        for (id, pair) in (0u32..).zip(pairs) {
            if names.insert(pair.name(), id).is_some() {
                return Err(RegistryError::DuplicateName(pair.name().to_owned()));
            }
            if by_type.insert(pair.type_id(), id).is_some() {
                return Err(RegistryError::DuplicateType(pair.type_name()));
            }
            by_type_name.insert(pair.type_name(), id);
            registrations.push(Registration {
                id,
                name: pair.name().to_owned(),
                type_id: pair.type_id(),
                type_name: pair.type_name(),
                decode: pair.decoder(),
            });
        }

        Ok(Self {
            registrations,
            by_type,
            by_type_name,
            registration_required,
        })
    }

    pub fn registration<T: 'static>(&self) -> Option<&Registration> {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(|&id| &self.registrations[id as usize])
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn registration_required(&self) -> bool {
        self.registration_required
    }

    /// Writes the type tag of `T` followed by `value`.
    pub(crate) fn write_tagged<T, W>(&self, value: &T, w: &mut W) -> Result<(), CodecError>
    where
        T: Serialize + 'static,
        W: Write,
    {
        let type_name = type_name::<T>();
        let tag = match self.registration::<T>() {
            Some(reg) => TypeTag::Registered(reg.id),
            None if self.registration_required => {
                return Err(CodecError::Encode {
                    type_name,
                    source: EncodeFailure::Unregistered,
                });
            }
            None => TypeTag::Named(Cow::Borrowed(type_name)),
        };

        serde_bincode::encode_into(&tag, w).map_err(|e| encode_error(type_name, e))?;
        serde_bincode::encode_into(value, w).map_err(|e| encode_error(type_name, e))?;
        Ok(())
    }

    /// Reads a tag and the value it names.
    pub(crate) fn read_tagged(&self, bytes: &[u8]) -> Result<DynValue, CodecError> {
        let (tag, at) = read_tag(bytes)?;
        let reg = self.resolve(&tag).map_err(|source| decode_error(bytes, source))?;
        let (value, read) =
            (reg.decode)(&bytes[at..]).map_err(|e| decode_error(bytes, e.into()))?;
        ensure_consumed(bytes, at + read)?;
        Ok(DynValue::new(value, reg.name.clone(), reg.type_name))
    }

    /// Reads a tag, checks it names `T`, and decodes the payload as `T`.
    pub(crate) fn read_as<T>(&self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned + 'static,
    {
        let expected = type_name::<T>();
        let (tag, at) = read_tag(bytes)?;
        match &tag {
            TypeTag::Registered(id) => {
                let reg = self
                    .registrations
                    .get(*id as usize)
                    .ok_or_else(|| decode_error(bytes, DecodeFailure::UnknownId(*id)))?;
                if reg.type_id != TypeId::of::<T>() {
                    return Err(CodecError::TypeMismatch {
                        expected,
                        found: reg.name.clone(),
                    });
                }
            }
            TypeTag::Named(name) if &**name != expected => {
                return Err(CodecError::TypeMismatch {
                    expected,
                    found: name.clone().into_owned(),
                });
            }
            TypeTag::Named(_) => {}
        }

        let (value, read) = serde_bincode::decode_from::<T>(&bytes[at..])
            .map_err(|e| decode_error(bytes, e.into()))?;
        ensure_consumed(bytes, at + read)?;
        Ok(value)
    }

    fn resolve(&self, tag: &TypeTag) -> Result<&Registration, DecodeFailure> {
        match tag {
            TypeTag::Registered(id) => self
                .registrations
                .get(*id as usize)
                .ok_or(DecodeFailure::UnknownId(*id)),
            // Rust cannot instantiate a type from its name alone: unregistered
            // types only come back through `read_as`.
            TypeTag::Named(name) => self
                .by_type_name
                .get(&**name)
                .map(|&id| &self.registrations[id as usize])
                .ok_or_else(|| DecodeFailure::UnknownName(name.clone().into_owned())),
        }
    }
}

fn read_tag(bytes: &[u8]) -> Result<(TypeTag, usize), CodecError> {
    serde_bincode::decode_from::<TypeTag>(bytes).map_err(|e| decode_error(bytes, e.into()))
}

fn ensure_consumed(bytes: &[u8], consumed: usize) -> Result<(), CodecError> {
    match bytes.len() - consumed {
        0 => Ok(()),
        extra => Err(decode_error(bytes, DecodeFailure::TrailingBytes(extra))),
    }
}

fn decode_error(bytes: &[u8], source: DecodeFailure) -> CodecError {
    CodecError::Decode {
        len: bytes.len(),
        source,
    }
}

fn encode_error(type_name: &'static str, e: EncodeError) -> CodecError {
    if let EncodeError::Io { inner, .. } = &e
        && let Some(CapacityExceeded { required, max }) = CapacityExceeded::from_io(inner)
    {
        return CodecError::CapacityExceeded {
            type_name,
            required,
            max,
        };
    }
    CodecError::Encode {
        type_name,
        source: e.into(),
    }
}
