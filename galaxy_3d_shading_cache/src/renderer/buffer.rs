/// Buffer trait for the externally-owned pixel cache buffer

use crate::error::Result;

/// GPU (or host) buffer resource trait
///
/// Implemented by backend-specific buffer types. `update` submits a write to
/// the backend's command queue; the call does not wait for completion.
/// Implementations must apply writes in submission order, so a shading
/// dispatch submitted afterwards on the same queue observes them.
pub trait Buffer: Send + Sync {
    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Total size in bytes
    fn size(&self) -> u64;
}
