/// Camera snapshot - immutable per-frame camera state.
///
/// Captured once per frame by the caller and handed to the invalidation
/// manager. Only position, look-at target, vertical field of view and
/// aspect ratio matter for cache invalidation.

use std::sync::Arc;
use glam::Vec3;
use crate::error::Result;
use crate::log::Logger;
use crate::cache_bail;

/// Camera state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    /// Eye position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub look_at: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width / height
    pub aspect: f32,
}

impl CameraSnapshot {
    pub fn new(position: Vec3, look_at: Vec3, fov_y: f32, aspect: f32) -> Self {
        Self { position, look_at, fov_y, aspect }
    }

    /// Whether every component is finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.look_at.is_finite()
            && self.fov_y.is_finite()
            && self.aspect.is_finite()
    }
}

/// Layout of the flat camera buffer shared with the shading stage.
///
/// Offsets count `f32` elements. The default layout is
/// `{pos.x, pos.y, pos.z, pad, look.x, look.y, look.z, pad, fov_y, aspect, ...}`;
/// padding slots are never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraLayout {
    pub position_offset: usize,
    pub look_at_offset: usize,
    pub fov_offset: usize,
    pub aspect_offset: usize,
}

impl Default for CameraLayout {
    fn default() -> Self {
        Self {
            position_offset: 0,
            look_at_offset: 4,
            fov_offset: 8,
            aspect_offset: 9,
        }
    }
}

impl CameraLayout {
    /// Minimum number of floats the flat buffer must hold
    pub fn min_len(&self) -> usize {
        (self.position_offset + 3)
            .max(self.look_at_offset + 3)
            .max(self.fov_offset + 1)
            .max(self.aspect_offset + 1)
    }

    /// Decode a snapshot from the flat camera buffer.
    ///
    /// # Errors
    ///
    /// - `InvalidResource` if the buffer is shorter than `min_len()`
    /// - `InvalidGeometry` if any decoded value is NaN or infinite
    pub fn decode(&self, raw: &[f32], logger: &Arc<dyn Logger>) -> Result<CameraSnapshot> {
        if raw.len() < self.min_len() {
            cache_bail!(logger, InvalidResource, "galaxy3d::CameraLayout",
                "Camera buffer holds {} floats, layout needs {}", raw.len(), self.min_len());
        }

        let vec3_at = |offset: usize| Vec3::from_slice(&raw[offset..offset + 3]);
        let snapshot = CameraSnapshot::new(
            vec3_at(self.position_offset),
            vec3_at(self.look_at_offset),
            raw[self.fov_offset],
            raw[self.aspect_offset],
        );

        if !snapshot.is_finite() {
            cache_bail!(logger, InvalidGeometry, "galaxy3d::CameraLayout",
                "Camera buffer contains non-finite values: {:?}", snapshot);
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "camera_snapshot_tests.rs"]
mod tests;
