use crate::codec::CodecEngine;
use crate::io::scratch_buffer::{ScratchBuffer, Tidy};
use crate::serializer::Serializer;
use crate::{CodecConfig, CodecError, DynValue, TypePair, TypeRegistry};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::type_name;

/// Shared handle: configuration plus the registry of known types.
///
/// Cheap to clone and safe to hand to many workers. Each worker calls
/// [`Codec::context`] once and keeps the context for its lifetime.
#[derive(Clone, Debug, Default)]
pub struct Codec {
    cfg: CodecConfig,
    registry: TypeRegistry,
}

impl Codec {
    pub fn new(cfg: CodecConfig, registry: TypeRegistry) -> Self {
        Self { cfg, registry }
    }

    pub fn with_pairs(pairs: impl IntoIterator<Item = TypePair>) -> Self {
        Self::new(CodecConfig::default(), TypeRegistry::from_pairs(pairs))
    }

    pub fn config(&self) -> &CodecConfig {
        &self.cfg
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// A fresh worker context. Engine and buffer are created on first use.
    pub fn context(&self) -> CodecContext {
        CodecContext {
            cfg: self.cfg.clone(),
            registry: self.registry.clone(),
            engine: None,
            buffer: None,
        }
    }
}

/// Per-worker codec state: one engine and one scratch buffer, never shared.
///
/// The engine snapshots the registry when it is built and ignores later
/// registry changes until [`CodecContext::reset_engine`].
#[derive(Debug)]
pub struct CodecContext {
    cfg: CodecConfig,
    registry: TypeRegistry,
    engine: Option<CodecEngine>,
    buffer: Option<ScratchBuffer>,
}

impl CodecContext {
    /// The worker's engine, built from the current registry on first access.
    pub fn engine(&mut self) -> Result<&CodecEngine, CodecError> {
        cached_engine(&mut self.engine, &self.registry, &self.cfg)
    }

    /// The worker's scratch buffer, created at its initial size on first access.
    pub fn buffer(&mut self) -> &mut ScratchBuffer {
        self.buffer.get_or_insert_with(|| ScratchBuffer::new(&self.cfg))
    }

    /// The scratch buffer if one has been created, without creating it.
    pub fn peek_buffer(&self) -> Option<&ScratchBuffer> {
        self.buffer.as_ref()
    }

    /// Drops the cached engine; the next call rebuilds it from the registry.
    pub fn reset_engine(&mut self) {
        self.engine = None;
    }

    fn parts(&mut self) -> Result<(&CodecEngine, &mut ScratchBuffer), CodecError> {
        let engine = cached_engine(&mut self.engine, &self.registry, &self.cfg)?;
        let buffer = self.buffer.get_or_insert_with(|| ScratchBuffer::new(&self.cfg));
        Ok((engine, buffer))
    }

    /// Encodes `value` with its type tag and returns an owned copy of the bytes.
    ///
    /// The scratch buffer is tidied before returning: it is swapped for a fresh
    /// initial-size region when a large write is followed by a small one.
    pub fn serialize<T>(&mut self, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + 'static,
    {
        let (engine, buffer) = self.parts()?;
        tracing::debug!(
            type_name = type_name::<T>(),
            registration = ?engine.registration::<T>(),
            "serializing"
        );

        if let Err(err) = engine.write_tagged(value, buffer) {
            if let Tidy::Shrunk { from } = buffer.discard() {
                tracing::debug!(from, "scratch buffer released after failed write");
            }
            tracing::debug!(type_name = type_name::<T>(), %err, "serialize failed");
            return Err(err);
        }

        let bytes = buffer.to_bytes();
        let tidy = buffer.snapshot_and_reset();
        if let Tidy::Shrunk { from } = tidy {
            tracing::debug!(
                from,
                to = buffer.capacity(),
                "scratch buffer shrunk after large write"
            );
        }
        tracing::debug!(len = bytes.len(), "returning serialized bytes");
        Ok(bytes)
    }

    /// Decodes the value named by the leading type tag.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<DynValue, CodecError> {
        tracing::debug!(len = bytes.len(), "deserializing");
        self.engine()?.read_tagged(bytes)
    }

    /// Decodes `bytes` as `T`.
    pub fn deserialize_as<T>(&mut self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned + 'static,
    {
        tracing::debug!(len = bytes.len(), type_name = type_name::<T>(), "deserializing");
        self.engine()?.read_as::<T>(bytes)
    }
}

impl Serializer for CodecContext {
    fn serialize<T>(&mut self, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + 'static,
    {
        CodecContext::serialize(self, value)
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<DynValue, CodecError> {
        CodecContext::deserialize(self, bytes)
    }

    fn deserialize_as<T>(&mut self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned + 'static,
    {
        CodecContext::deserialize_as(self, bytes)
    }
}

fn cached_engine<'a>(
    slot: &'a mut Option<CodecEngine>,
    registry: &TypeRegistry,
    cfg: &CodecConfig,
) -> Result<&'a CodecEngine, CodecError> {
    if slot.is_none() {
        let pairs = registry.pairs();
        tracing::trace!(pairs = pairs.len(), "building codec engine");
        *slot = Some(CodecEngine::build(&pairs, cfg.registration_required)?);
    }
    Ok(slot.as_ref().expect("just set"))
}
