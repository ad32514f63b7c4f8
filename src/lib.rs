//! Worker-confined binary object codec with an adaptive scratch buffer.
//!
//! A [`Codec`] holds configuration and the shared [`TypeRegistry`]. Each worker
//! takes its own [`CodecContext`] from it and uses that for every call; the
//! context lazily builds one [`CodecEngine`] and one [`ScratchBuffer`] and
//! reuses both across calls.

mod codec;
mod config;
mod context;
mod error;
mod io;
mod registry;
mod serializer;
mod tests;
mod value;

pub use crate::codec::{CodecEngine, Registration};
pub use crate::config::{
    CodecConfig, CodecConfigBuilder, INITIAL_BUFFER_SIZE, MAX_BUFFER_SIZE, TIDY_FACTOR,
};
pub use crate::context::{Codec, CodecContext};
pub use crate::error::{CapacityExceeded, CodecError, DecodeFailure, EncodeFailure, RegistryError};
pub use crate::io::scratch_buffer::{ScratchBuffer, Tidy};
pub use crate::registry::{TypePair, TypeRegistry};
pub use crate::serializer::Serializer;
pub use crate::value::DynValue;
