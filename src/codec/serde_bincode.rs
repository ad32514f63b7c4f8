//! Serde + bincode payload encoding (compact, fast) using `Serialize`/`Deserialize`.

use crate::config::MAX_BUFFER_SIZE;
use bincode::error::{DecodeError, EncodeError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::io::Write;

/// Decoder for one registered type with the concrete type erased. Returns the
/// value and the number of bytes it consumed.
pub(crate) type ErasedDecode = fn(&[u8]) -> Result<(Box<dyn Any + Send>, usize), DecodeError>;

/// Upper bound on the heap a single decode may claim. A corrupt length prefix
/// fails with `LimitExceeded` instead of being allocated.
pub(crate) const DECODE_LIMIT: usize = MAX_BUFFER_SIZE;

fn config() -> impl bincode::config::Config {
    bincode::config::standard()
}

fn decode_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<DECODE_LIMIT>()
}

/// Encode `value` **into the provided writer**. Returns the bytes written.
pub(crate) fn encode_into<T>(value: &T, w: &mut impl Write) -> Result<usize, EncodeError>
where
    T: Serialize + ?Sized,
{
    bincode::serde::encode_into_std_write(value, w, config())
}

/// Decode a single value from the front of `bytes`.
pub(crate) fn decode_from<T>(bytes: &[u8]) -> Result<(T, usize), DecodeError>
where
    T: DeserializeOwned,
{
    bincode::serde::decode_from_slice(bytes, decode_config())
}

pub(crate) fn decode_erased<T>(bytes: &[u8]) -> Result<(Box<dyn Any + Send>, usize), DecodeError>
where
    T: DeserializeOwned + Send + 'static,
{
    let (val, read) = decode_from::<T>(bytes)?;
    Ok((Box::new(val), read))
}
