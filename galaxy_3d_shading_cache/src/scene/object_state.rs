/// Object state - one bounded sphere per entry of the caller's flat object array.
///
/// Identity is the position in the array, not a persistent id. The array is
/// supplied fresh each frame.

use std::sync::Arc;
use glam::Vec3;
use crate::error::Result;
use crate::log::Logger;
use crate::{cache_bail, cache_debug};

/// Sphere state for one object index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectState {
    /// Position in the caller's array
    pub index: usize,
    pub center: Vec3,
    pub radius: f32,
}

impl ObjectState {
    pub fn new(index: usize, center: Vec3, radius: f32) -> Self {
        Self { index, center, radius }
    }

    /// Whether center and radius are finite and the radius is non-negative
    pub fn is_projectable(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius >= 0.0
    }
}

/// Layout of one record in the flat object buffer shared with the shading stage.
///
/// Offsets and stride count `f32` elements. The default record is
/// `{center.x, center.y, center.z, radius, material...}` with a stride of 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectLayout {
    pub stride: usize,
    pub center_offset: usize,
    pub radius_offset: usize,
}

impl Default for ObjectLayout {
    fn default() -> Self {
        Self {
            stride: 8,
            center_offset: 0,
            radius_offset: 3,
        }
    }
}

impl ObjectLayout {
    /// Check that both fields fit inside one record
    pub fn validate(&self, logger: &Arc<dyn Logger>) -> Result<()> {
        if self.stride == 0 {
            cache_bail!(logger, InvalidConfig, "galaxy3d::ObjectLayout",
                "Object record stride must be non-zero");
        }
        if self.center_offset + 3 > self.stride || self.radius_offset >= self.stride {
            cache_bail!(logger, InvalidConfig, "galaxy3d::ObjectLayout",
                "Object fields (center at {}, radius at {}) exceed stride {}",
                self.center_offset, self.radius_offset, self.stride);
        }
        Ok(())
    }

    /// Number of complete records in `raw`
    pub fn record_count(&self, raw: &[f32]) -> usize {
        if self.stride == 0 { 0 } else { raw.len() / self.stride }
    }

    /// Decode every complete record of the flat object buffer.
    ///
    /// A trailing partial record has no usable data and is dropped.
    pub fn decode(&self, raw: &[f32], logger: &Arc<dyn Logger>) -> Vec<ObjectState> {
        let count = self.record_count(raw);
        let leftover = raw.len() - count * self.stride;
        if leftover != 0 {
            cache_debug!(logger, "galaxy3d::ObjectLayout",
                "Dropping partial object record ({} trailing floats, stride {})",
                leftover, self.stride);
        }

        raw.chunks_exact(self.stride.max(1))
            .take(count)
            .enumerate()
            .map(|(index, record)| {
                let c = self.center_offset;
                ObjectState::new(
                    index,
                    Vec3::new(record[c], record[c + 1], record[c + 2]),
                    record[self.radius_offset],
                )
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "object_state_tests.rs"]
mod tests;
