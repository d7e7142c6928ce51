/// Cache record layout - the byte contract with the shading stage.
///
/// The cache buffer holds one fixed-size record per pixel, row-major by
/// pixel index (`y * width + x`). The validity field of a record sits at byte
/// offset `pixel_index * record_stride + validity_offset`.
///
/// Every write covers whole records: an invalidated record is zeroed and
/// its validity field set to the marker, so per-pixel and batched writes
/// leave identical bytes.

use std::sync::Arc;
use crate::error::Result;
use crate::log::Logger;
use crate::cache_bail;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    /// Bytes per pixel record
    pub record_stride: u64,
    /// Byte offset of the validity field inside a record
    pub validity_offset: u64,
    /// Bytes written into the validity field to mark a record invalid
    pub invalid_marker: Vec<u8>,
}

impl Default for CacheLayout {
    /// `vec4<f32>` per pixel (rgb + validity in w), invalid = 0.0
    fn default() -> Self {
        Self {
            record_stride: 16,
            validity_offset: 12,
            invalid_marker: bytemuck::bytes_of(&0.0f32).to_vec(),
        }
    }
}

impl CacheLayout {
    pub fn validate(&self, logger: &Arc<dyn Logger>) -> Result<()> {
        if self.record_stride == 0 {
            cache_bail!(logger, InvalidConfig, "galaxy3d::CacheLayout",
                "Cache record stride must be non-zero");
        }
        if self.invalid_marker.is_empty() {
            cache_bail!(logger, InvalidConfig, "galaxy3d::CacheLayout",
                "Invalid marker must hold at least one byte");
        }
        if self.validity_offset + self.invalid_marker.len() as u64 > self.record_stride {
            cache_bail!(logger, InvalidConfig, "galaxy3d::CacheLayout",
                "Validity field at {} with {} bytes exceeds record stride {}",
                self.validity_offset, self.invalid_marker.len(), self.record_stride);
        }
        Ok(())
    }

    /// Size of the validity field in bytes
    pub fn validity_size(&self) -> u64 {
        self.invalid_marker.len() as u64
    }

    /// Buffer size needed for `pixel_count` records
    pub fn required_size(&self, pixel_count: u64) -> u64 {
        pixel_count * self.record_stride
    }

    /// Byte offset of a pixel's record
    pub fn record_byte_offset(&self, pixel_index: u64) -> u64 {
        pixel_index * self.record_stride
    }

    /// Byte offset of a pixel's validity field
    pub fn validity_byte_offset(&self, pixel_index: u64) -> u64 {
        pixel_index * self.record_stride + self.validity_offset
    }

    /// Length of a write covering `count` consecutive records
    pub fn span_len(&self, count: u64) -> u64 {
        count * self.record_stride
    }

    /// Fill `out` with `count` invalidated records, written from the first
    /// record's start.
    ///
    /// Reuses the allocation of `out`.
    pub fn fill_span(&self, out: &mut Vec<u8>, count: u64) {
        out.clear();
        out.resize(self.span_len(count) as usize, 0);
        let stride = self.record_stride as usize;
        let offset = self.validity_offset as usize;
        let marker_len = self.invalid_marker.len();
        for record in 0..count as usize {
            let start = record * stride + offset;
            out[start..start + marker_len].copy_from_slice(&self.invalid_marker);
        }
    }

    /// Whether the record at `pixel_index` in `bytes` holds the invalid marker
    pub fn is_marked_invalid(&self, bytes: &[u8], pixel_index: u64) -> bool {
        let start = self.validity_byte_offset(pixel_index) as usize;
        bytes.get(start..start + self.invalid_marker.len())
            .is_some_and(|field| field == self.invalid_marker.as_slice())
    }
}

#[cfg(test)]
#[path = "cache_layout_tests.rs"]
mod tests;
