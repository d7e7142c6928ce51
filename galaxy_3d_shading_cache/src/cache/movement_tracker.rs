/// Movement tracker - cheap frame-to-frame change detection.
///
/// Remembers the last-seen camera and the last-seen state of every object
/// index. The current state always overwrites the stored one after the
/// comparison, so thresholds apply to the frame-to-frame delta, not to
/// cumulative drift.
///
/// Stored object state is keyed by index and is only dropped by
/// `reconcile()`, `clear_objects()` or `reset()`.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::camera::CameraSnapshot;
use crate::error::Result;
use crate::log::Logger;
use crate::scene::ObjectState;
use crate::{cache_bail, cache_debug};

/// Distance thresholds for change detection.
///
/// A delta strictly greater than the threshold counts as movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerThresholds {
    /// Camera position distance
    pub camera_position: f32,
    /// Camera look-at target distance
    pub camera_target: f32,
    /// Field of view (radians) and aspect ratio difference
    pub camera_lens: f32,
    /// Object center distance
    pub object_position: f32,
    /// Object radius difference (only with `track_radius`)
    pub object_radius: f32,
    /// Also report objects whose radius changed
    pub track_radius: bool,
}

impl Default for TrackerThresholds {
    fn default() -> Self {
        Self {
            camera_position: 1.0e-4,
            camera_target: 1.0e-4,
            camera_lens: 1.0e-5,
            object_position: 1.0e-3,
            object_radius: 1.0e-3,
            track_radius: true,
        }
    }
}

impl TrackerThresholds {
    /// Every threshold must be finite and non-negative
    pub fn validate(&self, logger: &Arc<dyn Logger>) -> Result<()> {
        let values = [
            ("camera_position", self.camera_position),
            ("camera_target", self.camera_target),
            ("camera_lens", self.camera_lens),
            ("object_position", self.object_position),
            ("object_radius", self.object_radius),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                cache_bail!(logger, InvalidConfig, "galaxy3d::MovementTracker",
                    "Threshold '{}' must be finite and non-negative, got {}", name, value);
            }
        }
        Ok(())
    }
}

pub struct MovementTracker {
    thresholds: TrackerThresholds,
    last_camera: Option<CameraSnapshot>,
    last_objects: FxHashMap<usize, ObjectState>,
    /// States replaced by the latest `update_spheres_data()` for moved indices
    previous_objects: FxHashMap<usize, ObjectState>,
    logger: Arc<dyn Logger>,
}

impl MovementTracker {
    /// Create a tracker, validating the thresholds
    pub fn new(thresholds: TrackerThresholds, logger: Arc<dyn Logger>) -> Result<Self> {
        thresholds.validate(&logger)?;
        Ok(Self {
            thresholds,
            last_camera: None,
            last_objects: FxHashMap::default(),
            previous_objects: FxHashMap::default(),
            logger,
        })
    }

    pub fn thresholds(&self) -> &TrackerThresholds {
        &self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: TrackerThresholds) -> Result<()> {
        thresholds.validate(&self.logger)?;
        self.thresholds = thresholds;
        Ok(())
    }

    /// Whether a camera has been seen since creation or the last reset
    pub fn has_camera_state(&self) -> bool {
        self.last_camera.is_some()
    }

    pub fn last_camera(&self) -> Option<&CameraSnapshot> {
        self.last_camera.as_ref()
    }

    /// Compare against the last camera and store the current one.
    ///
    /// Returns `true` on the first call (no prior state) or when position,
    /// look-at target, field of view or aspect moved beyond their thresholds.
    pub fn update_camera_data(&mut self, camera: &CameraSnapshot) -> bool {
        let changed = match self.last_camera.as_ref() {
            None => true,
            Some(last) => {
                let t = &self.thresholds;
                camera.position.distance(last.position) > t.camera_position
                    || camera.look_at.distance(last.look_at) > t.camera_target
                    || (camera.fov_y - last.fov_y).abs() > t.camera_lens
                    || (camera.aspect - last.aspect).abs() > t.camera_lens
            }
        };

        if changed {
            cache_debug!(self.logger, "galaxy3d::MovementTracker",
                "Camera changed: position {:?}, look-at {:?}", camera.position, camera.look_at);
        }

        self.last_camera = Some(*camera);
        changed
    }

    /// Compare every object against its stored state and store the current one.
    ///
    /// Returns the indices that moved beyond the thresholds, in array order.
    /// An index seen for the first time is recorded but not reported.
    pub fn update_spheres_data(&mut self, objects: &[ObjectState]) -> Vec<usize> {
        self.previous_objects.clear();
        let mut moved = Vec::new();

        for object in objects {
            if let Some(last) = self.last_objects.get(&object.index) {
                if self.has_moved(last, object) {
                    moved.push(object.index);
                    self.previous_objects.insert(object.index, *last);
                }
            }
            self.last_objects.insert(object.index, *object);
        }

        moved
    }

    fn has_moved(&self, last: &ObjectState, current: &ObjectState) -> bool {
        let t = &self.thresholds;
        // NaN never compares greater; treat it as movement so it reaches the fallback path
        let distance = current.center.distance(last.center);
        if distance.is_nan() || distance > t.object_position {
            return true;
        }
        if t.track_radius {
            let delta = (current.radius - last.radius).abs();
            return delta.is_nan() || delta > t.object_radius;
        }
        false
    }

    /// State an index had before the latest `update_spheres_data()`.
    ///
    /// For an index that moved in the latest update this is the replaced
    /// state; otherwise it is the currently stored state.
    pub fn previous_state(&self, index: usize) -> Option<&ObjectState> {
        self.previous_objects.get(&index).or_else(|| self.last_objects.get(&index))
    }

    /// Last stored state of an index
    pub fn current_state(&self, index: usize) -> Option<&ObjectState> {
        self.last_objects.get(&index)
    }

    /// Number of object indices with stored state
    pub fn tracked_count(&self) -> usize {
        self.last_objects.len()
    }

    /// Drop stored state for every index `>= current_count`.
    ///
    /// Returns the number of entries dropped.
    pub fn reconcile(&mut self, current_count: usize) -> usize {
        let before = self.last_objects.len();
        self.last_objects.retain(|index, _| *index < current_count);
        self.previous_objects.retain(|index, _| *index < current_count);
        let dropped = before - self.last_objects.len();
        if dropped > 0 {
            cache_debug!(self.logger, "galaxy3d::MovementTracker",
                "Reconciled to {} objects, dropped {} stale entries", current_count, dropped);
        }
        dropped
    }

    /// Forget every object state, keep the camera
    pub fn clear_objects(&mut self) {
        self.last_objects.clear();
        self.previous_objects.clear();
    }

    /// Forget everything; the next camera update reports a change
    pub fn reset(&mut self) {
        self.last_camera = None;
        self.clear_objects();
    }
}

#[cfg(test)]
#[path = "movement_tracker_tests.rs"]
mod tests;
