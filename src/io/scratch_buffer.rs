use crate::CodecConfig;
use crate::error::CapacityExceeded;
use std::io;
use std::io::Write;

/// What `snapshot_and_reset` or `discard` did with the storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tidy {
    Retained,
    /// The oversized region was dropped and replaced by a fresh initial one.
    Shrunk { from: usize },
}

/// Growable write target reused across serialize calls.
///
/// `position <= capacity() <= max_capacity()` holds at all times.
pub struct ScratchBuffer {
    buf: Box<[u8]>,
    position: usize,
    previous_position: usize,
    initial_capacity: usize,
    max_capacity: usize,
    switch_limit: usize,
}

impl ScratchBuffer {
    pub fn new(cfg: &CodecConfig) -> Self {
        let max_capacity = cfg.max_buffer;
        let initial_capacity = cfg.initial_buffer.min(max_capacity);
        Self {
            buf: zeroed(initial_capacity),
            position: 0,
            previous_position: 0,
            initial_capacity,
            max_capacity,
            switch_limit: cfg.switch_limit,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }
    pub fn position(&self) -> usize {
        self.position
    }
    pub fn previous_position(&self) -> usize {
        self.previous_position
    }
    pub fn switch_limit(&self) -> usize {
        self.switch_limit
    }

    /// Bytes written since the last reset.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.position]
    }

    /// Owned copy of the written region. Never aliases the scratch storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.written().to_vec()
    }

    /// Makes room for `additional` more bytes, doubling capacity until they fit.
    fn ensure(&mut self, additional: usize) -> Result<(), CapacityExceeded> {
        let required = self.position.saturating_add(additional);
        if required <= self.buf.len() {
            return Ok(());
        }
        if required > self.max_capacity {
            return Err(CapacityExceeded {
                required,
                max: self.max_capacity,
            });
        }
        let mut cap = self.buf.len().max(1);
        while cap < required {
            cap = cap.saturating_mul(2);
        }
        let mut grown = zeroed(cap.min(self.max_capacity));
        grown[..self.position].copy_from_slice(self.written());
        self.buf = grown;
        Ok(())
    }

    /// Drops the current storage and installs a fresh region of `capacity`
    /// bytes (capped at `max_capacity`). The cursor goes back to zero.
    pub fn replace(&mut self, capacity: usize) {
        self.buf = zeroed(capacity.min(self.max_capacity));
        self.position = 0;
    }

    /// Runs once per completed serialize, after the bytes were copied out.
    ///
    /// Shrinks only on a large -> small transition between consecutive calls:
    /// the previous write exceeded `switch_limit` and this one did not.
    pub fn snapshot_and_reset(&mut self) -> Tidy {
        let current = self.position;
        let tidy = if self.previous_position > self.switch_limit && current <= self.switch_limit {
            let from = self.capacity();
            self.replace(self.initial_capacity);
            Tidy::Shrunk { from }
        } else {
            Tidy::Retained
        };
        self.previous_position = current;
        self.position = 0;
        tidy
    }

    /// Forgets a partial write from a failed encode. `previous_position` is
    /// left as it was, but storage grown past `switch_limit` by the failed write
    /// is dropped, since no later small write would ever release it.
    pub fn discard(&mut self) -> Tidy {
        self.position = 0;
        if self.capacity() > self.switch_limit {
            let from = self.capacity();
            self.replace(self.initial_capacity);
            return Tidy::Shrunk { from };
        }
        Tidy::Retained
    }
}

impl Write for ScratchBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure(buf.len())?;
        let end = self.position + buf.len();
        self.buf[self.position..end].copy_from_slice(buf);
        self.position = end;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for ScratchBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchBuffer")
            .field("capacity", &self.capacity())
            .field("max_capacity", &self.max_capacity)
            .field("position", &self.position)
            .field("previous_position", &self.previous_position)
            .field("switch_limit", &self.switch_limit)
            .finish()
    }
}

fn zeroed(len: usize) -> Box<[u8]> {
    vec![0u8; len].into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cfg() -> CodecConfig {
        CodecConfig::builder()
            .initial_buffer(16)
            .max_buffer(256)
            .switch_limit(64)
            .build()
    }

    #[test]
    fn grows_by_doubling_and_keeps_bytes() {
        let mut b = ScratchBuffer::new(&small_cfg());
        b.write_all(&[7u8; 10]).unwrap();
        b.write_all(&[9u8; 30]).unwrap();
        assert_eq!(b.capacity(), 64);
        assert_eq!(b.position(), 40);
        assert_eq!(&b.written()[..10], &[7u8; 10]);
        assert_eq!(&b.written()[10..], &[9u8; 30]);
    }

    #[test]
    fn growth_is_capped_at_max() {
        let mut b = ScratchBuffer::new(
            &CodecConfig::builder()
                .initial_buffer(100)
                .max_buffer(300)
                .build(),
        );
        b.write_all(&[1u8; 250]).unwrap();
        assert_eq!(b.capacity(), 300);
    }

    #[test]
    fn refuses_to_grow_past_max_and_stays_usable() {
        let mut b = ScratchBuffer::new(&small_cfg());
        b.write_all(&[1u8; 200]).unwrap();
        let err = b.write_all(&[1u8; 100]).unwrap_err();
        assert_eq!(
            CapacityExceeded::from_io(&err),
            Some(CapacityExceeded {
                required: 300,
                max: 256
            })
        );
        assert_eq!(b.position(), 200);

        assert_eq!(b.discard(), Tidy::Shrunk { from: 256 });
        assert_eq!(b.capacity(), 16);
        b.write_all(b"ok").unwrap();
        assert_eq!(b.written(), b"ok");
    }

    #[test]
    fn shrinks_only_on_large_to_small_transition() {
        let mut b = ScratchBuffer::new(&small_cfg());

        b.write_all(&[0u8; 100]).unwrap();
        assert_eq!(b.snapshot_and_reset(), Tidy::Retained);
        assert_eq!(b.capacity(), 128);

        b.write_all(&[0u8; 120]).unwrap();
        assert_eq!(b.snapshot_and_reset(), Tidy::Retained);
        assert_eq!(b.capacity(), 128);

        b.write_all(&[0u8; 8]).unwrap();
        assert_eq!(b.snapshot_and_reset(), Tidy::Shrunk { from: 128 });
        assert_eq!(b.capacity(), 16);
        assert_eq!(b.previous_position(), 8);
        assert_eq!(b.position(), 0);
    }

    #[test]
    fn discard_keeps_storage_within_switch_limit() {
        let mut b = ScratchBuffer::new(&small_cfg());
        b.write_all(&[0u8; 40]).unwrap();
        assert_eq!(b.discard(), Tidy::Retained);
        assert_eq!(b.capacity(), 64);
        assert_eq!(b.position(), 0);
        assert_eq!(b.previous_position(), 0);
    }

    #[test]
    fn write_exactly_at_switch_limit_counts_as_small() {
        let mut b = ScratchBuffer::new(&small_cfg());
        b.write_all(&[0u8; 65]).unwrap();
        b.snapshot_and_reset();
        b.write_all(&[0u8; 64]).unwrap();
        assert!(matches!(b.snapshot_and_reset(), Tidy::Shrunk { .. }));
    }

    #[test]
    fn default_limits_never_shrink() {
        let mut b = ScratchBuffer::new(
            &CodecConfig::builder()
                .initial_buffer(16)
                .max_buffer(256)
                .build(),
        );
        b.write_all(&[0u8; 256]).unwrap();
        b.snapshot_and_reset();
        b.write_all(&[0u8; 1]).unwrap();
        assert_eq!(b.snapshot_and_reset(), Tidy::Retained);
        assert_eq!(b.capacity(), 256);
    }
}
