/// Host-memory cache buffer (no GPU required)
///
/// Backs the cache with a plain byte vector. Used for headless runs, CPU
/// shading paths, and tests that need to inspect the bytes written and
/// count the discrete write operations submitted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use crate::error::{Error, Result};
use crate::renderer::Buffer;

pub struct HostBuffer {
    data: Mutex<Vec<u8>>,
    size: u64,
    write_count: AtomicU64,
    bytes_written: AtomicU64,
}

impl HostBuffer {
    /// Create a zero-filled buffer of `size` bytes
    pub fn new(size: u64) -> Self {
        Self::filled(size, 0)
    }

    /// Create a buffer of `size` bytes with every byte set to `byte`
    pub fn filled(size: u64, byte: u8) -> Self {
        Self {
            data: Mutex::new(vec![byte; size as usize]),
            size,
            write_count: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<u8>>> {
        self.data.lock()
            .map_err(|_| Error::BackendError("Host buffer lock poisoned".to_string()))
    }

    /// Copy `len` bytes starting at `offset`
    pub fn read(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let end = offset.checked_add(len as u64).filter(|end| *end <= self.size)
            .ok_or_else(|| Error::InvalidResource(format!(
                "Read at offset {} with size {} exceeds buffer size {}",
                offset, len, self.size)))?;
        let data = self.lock()?;
        Ok(data[offset as usize..end as usize].to_vec())
    }

    /// Copy of the whole buffer
    pub fn contents(&self) -> Result<Vec<u8>> {
        Ok(self.lock()?.clone())
    }

    /// Set every byte to `byte` (not counted as a write)
    pub fn fill(&self, byte: u8) -> Result<()> {
        self.lock()?.iter_mut().for_each(|b| *b = byte);
        Ok(())
    }

    /// Number of `update` calls since creation or the last `reset_counters`
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Bytes written by `update` since creation or the last `reset_counters`
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    pub fn reset_counters(&self) {
        self.write_count.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
    }
}

impl Buffer for HostBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset.checked_add(data.len() as u64).filter(|end| *end <= self.size)
            .ok_or_else(|| Error::InvalidResource(format!(
                "Write at offset {} with size {} exceeds buffer size {}",
                offset, data.len(), self.size)))?;

        let mut bytes = self.lock()?;
        bytes[offset as usize..end as usize].copy_from_slice(data);

        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(data.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "host_buffer_tests.rs"]
mod tests;
