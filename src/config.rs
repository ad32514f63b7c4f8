// src/config.rs

/// Initial scratch buffer size: 4 KiB.
pub const INITIAL_BUFFER_SIZE: usize = 1 << 12;

/// Hard ceiling on scratch buffer growth: 16 MiB.
pub const MAX_BUFFER_SIZE: usize = 1 << 24;

/// Divisor used to derive the default shrink threshold from `max_buffer`.
pub const TIDY_FACTOR: usize = 1 << 4;

/// Codec runtime/configuration parameters.
/// Build with `CodecConfig::builder().foo(...).build()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// Size of a freshly created (or freshly shrunk) scratch buffer, in bytes.
    pub initial_buffer: usize,

    /// The scratch buffer never grows past this. An object whose encoding
    /// needs more fails with `CodecError::CapacityExceeded`.
    pub max_buffer: usize,

    /// A serialize that wrote more than this many bytes counts as "large". The
    /// buffer is swapped for a fresh `initial_buffer` region when a large write
    /// is followed by a small one.
    ///
    /// Defaults to `max(max_buffer, max_buffer / tidy_factor)`, which is
    /// `max_buffer` itself, so with defaults the buffer is never shrunk.
    pub switch_limit: usize,

    /// When set, encoding a type that is not in the registry is an error
    /// instead of falling back to a type tag carrying the full Rust type name.
    pub registration_required: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CodecConfig {
    /// Start building a config with sane defaults.
    ///
    /// Defaults:
    /// - initial_buffer        = 4 KiB
    /// - max_buffer            = 16 MiB
    /// - tidy_factor           = 16
    /// - switch_limit          = derived from the two above
    /// - registration_required = false
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder {
            initial_buffer: INITIAL_BUFFER_SIZE,
            max_buffer: MAX_BUFFER_SIZE,
            tidy_factor: TIDY_FACTOR,
            switch_limit: None,
            registration_required: false,
        }
    }
}

/// Fluent builder for `CodecConfig`.
#[derive(Clone, Debug)]
pub struct CodecConfigBuilder {
    initial_buffer: usize,
    max_buffer: usize,
    tidy_factor: usize,
    switch_limit: Option<usize>,
    registration_required: bool,
}

impl CodecConfigBuilder {
    pub fn initial_buffer(mut self, bytes: usize) -> Self {
        self.initial_buffer = bytes;
        self
    }
    pub fn max_buffer(mut self, bytes: usize) -> Self {
        self.max_buffer = bytes;
        self
    }
    pub fn tidy_factor(mut self, factor: usize) -> Self {
        self.tidy_factor = factor;
        self
    }
    /// Overrides the derived shrink threshold.
    pub fn switch_limit(mut self, bytes: usize) -> Self {
        self.switch_limit = Some(bytes);
        self
    }
    pub fn registration_required(mut self, required: bool) -> Self {
        self.registration_required = required;
        self
    }

    /// Finalize with basic validation and return the config.
    pub fn build(self) -> CodecConfig {
        let max = self.max_buffer.max(1);
        let initial = self.initial_buffer.clamp(1, max);
        let tidy = self.tidy_factor.max(1);
        // NOTE: `max` dominates here, so the derived limit is always `max_buffer`.
        let switch_limit = self
            .switch_limit
            .unwrap_or_else(|| std::cmp::max(max, max / tidy));
        CodecConfig {
            initial_buffer: initial,
            max_buffer: max,
            switch_limit,
            registration_required: self.registration_required,
        }
    }
}
