use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde::Deserialize;

use crate::DsetError;

/// The packed index buffer of a compressed column is read in chunks of this
/// many bytes unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 10240;

/// Settings for [`Decoder`](crate::Decoder).
///
/// Deserializable so a host application can keep it next to its own
/// configuration; missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Upper bound of a single read of packed bytes. `0` means the default.
    pub chunk_size: usize,
}

impl DecoderConfig {
    pub(crate) fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Cooperative cancellation flag shared between a decode and its caller.
///
/// Clones observe the same flag. The decoder polls it between blocks, between
/// vocabulary entries and between chunk reads; it never interrupts a row.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), DsetError> {
        if self.is_cancelled() {
            Err(DsetError::Cancelled)
        } else {
            Ok(())
        }
    }
}
