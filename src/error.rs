use std::io;

/// Everything a serialize or deserialize call can fail with.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The encoding of a single value does not fit in the scratch buffer even
    /// at its maximum size.
    #[error("{type_name}: encoding needs {required} bytes, scratch buffer is capped at {max}")]
    CapacityExceeded {
        type_name: &'static str,
        required: usize,
        max: usize,
    },

    #[error("encode {type_name}: {source}")]
    Encode {
        type_name: &'static str,
        #[source]
        source: EncodeFailure,
    },

    #[error("decode ({len} bytes): {source}")]
    Decode {
        len: usize,
        #[source]
        source: DecodeFailure,
    },

    /// Typed deserialize found a type tag naming another type.
    #[error("type mismatch: expected {expected}, bytes hold {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    /// The codec engine could not be built from the registered type pairs.
    #[error("engine construction: {0}")]
    EngineConstruction(#[from] RegistryError),
}

#[derive(thiserror::Error, Debug)]
pub enum EncodeFailure {
    #[error("type is not registered and registration is required")]
    Unregistered,
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::error::EncodeError),
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeFailure {
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::error::DecodeError),
    #[error("unknown registration id {0}")]
    UnknownId(u32),
    #[error("unknown type name {0:?}")]
    UnknownName(String),
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

/// Errors raised while turning registered type pairs into an engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("logical name {0:?} registered twice")]
    DuplicateName(String),
    #[error("type {0} registered twice")]
    DuplicateType(&'static str),
}

/// Refusal from the scratch buffer to grow past its ceiling. Travels through
/// the payload encoder as an `io::Error` and is recovered by `from_io`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("write needs {required} bytes, scratch buffer is capped at {max}")]
pub struct CapacityExceeded {
    pub required: usize,
    pub max: usize,
}

impl From<CapacityExceeded> for io::Error {
    fn from(e: CapacityExceeded) -> Self {
        io::Error::new(io::ErrorKind::OutOfMemory, e)
    }
}

impl CapacityExceeded {
    pub(crate) fn from_io(e: &io::Error) -> Option<Self> {
        e.get_ref()
            .and_then(|inner| inner.downcast_ref::<CapacityExceeded>())
            .copied()
    }
}
