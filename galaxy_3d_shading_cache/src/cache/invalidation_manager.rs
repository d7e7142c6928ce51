/// Invalidation manager - per-frame invalidation decision and cache writes.
///
/// Each `invalidate_for_frame()` call feeds the camera and object states to
/// the movement tracker, then picks exactly one outcome:
///
/// - **Full invalidation**: the marker is written over every record in one
///   bulk write. Happens on camera movement, the first frame, an object
///   count change, an explicit request, or a fallback escalation.
/// - **Selective invalidation**: for each moved object, the union of its old
///   and new padded screen bounds grown by the region margin is written,
///   one rect per object (optionally merged first).
/// - **No-op**: nothing is written.
///
/// The result is folded into the statistics and returned.

use std::sync::Arc;
use std::time::{Duration, Instant};
use rustc_hash::FxHashMap;
use crate::camera::{CameraLayout, CameraSnapshot};
use crate::error::Result;
use crate::log::Logger;
use crate::renderer::Buffer;
use crate::scene::{ObjectLayout, ObjectState};
use crate::{cache_bail, cache_debug, cache_info, cache_trace, cache_warn};
use super::cache_layout::CacheLayout;
use super::invalidation_result::{InvalidationCause, InvalidationResult};
use super::invalidation_stats::{InvalidationStats, DEFAULT_STATS_WINDOW};
use super::movement_tracker::{MovementTracker, TrackerThresholds};
use super::screen_projection::ScreenProjection;
use super::screen_rect::{merge_regions, ScreenRect};

/// Pixels added around each moved object's union of old and new bounds
pub const DEFAULT_REGION_MARGIN: u32 = 10;

/// Pixels added around each projected sphere before the union
pub const DEFAULT_PROJECTION_PADDING: u32 = 2;

// ===== CONFIGURATION =====

/// How a rect is written into the cache buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// One write per scanline of the rect
    #[default]
    RowBatched,
    /// One write per pixel (baseline for profiling write overhead)
    PerPixel,
}

/// What to do when a moved object cannot be projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Escalate the whole frame to a full invalidation
    #[default]
    FullInvalidation,
    /// Re-invalidate the object's last known bounds, escalating when none are known
    LastKnownBounds,
}

/// Invalidation manager configuration
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidationConfig {
    pub width: u32,
    pub height: u32,
    pub write_mode: WriteMode,
    pub region_margin: u32,
    pub projection_padding: u32,
    /// Merge overlapping or adjacent regions before writing
    pub merge_regions: bool,
    pub thresholds: TrackerThresholds,
    pub cache_layout: CacheLayout,
    pub camera_layout: CameraLayout,
    pub object_layout: ObjectLayout,
    /// Rolling statistics window capacity
    pub stats_window: usize,
    pub fallback: FallbackPolicy,
}

impl InvalidationConfig {
    /// Default configuration for a `width` x `height` canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            write_mode: WriteMode::default(),
            region_margin: DEFAULT_REGION_MARGIN,
            projection_padding: DEFAULT_PROJECTION_PADDING,
            merge_regions: false,
            thresholds: TrackerThresholds::default(),
            cache_layout: CacheLayout::default(),
            camera_layout: CameraLayout::default(),
            object_layout: ObjectLayout::default(),
            stats_window: DEFAULT_STATS_WINDOW,
            fallback: FallbackPolicy::default(),
        }
    }

    pub fn validate(&self, logger: &Arc<dyn Logger>) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            cache_bail!(logger, InvalidConfig, "galaxy3d::InvalidationManager",
                "Canvas size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.stats_window == 0 {
            cache_bail!(logger, InvalidConfig, "galaxy3d::InvalidationManager",
                "Statistics window must be non-zero");
        }
        self.thresholds.validate(logger)?;
        self.cache_layout.validate(logger)?;
        self.object_layout.validate(logger)?;
        Ok(())
    }

    pub fn canvas_area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

// ===== MANAGER =====

pub struct InvalidationManager {
    config: InvalidationConfig,
    projection: ScreenProjection,
    tracker: MovementTracker,
    stats: InvalidationStats,
    cache_buffer: Option<Arc<dyn Buffer>>,
    /// Object count seen by the previous frame
    last_object_count: Option<usize>,
    /// Next frame must be a full invalidation
    pending_full: bool,
    /// Padded bounds of each object at its last selective invalidation
    last_bounds: FxHashMap<usize, ScreenRect>,
    /// Marker payload for one full canvas row
    row_payload: Vec<u8>,
    /// Marker payload for the whole canvas, built on first use
    full_payload: Vec<u8>,
    /// Reused per-frame region list
    regions: Vec<ScreenRect>,
    logger: Arc<dyn Logger>,
}

impl InvalidationManager {
    /// Create a manager from a validated configuration.
    ///
    /// No cache buffer is bound yet; call `set_cache_buffer()` before the first frame.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero canvas, a zero statistics window,
    /// or invalid thresholds and layouts.
    pub fn new(config: InvalidationConfig, logger: Arc<dyn Logger>) -> Result<Self> {
        config.validate(&logger)?;

        let projection = ScreenProjection::new(config.width, config.height, Arc::clone(&logger));
        let tracker = MovementTracker::new(config.thresholds, Arc::clone(&logger))?;
        let stats = InvalidationStats::new(config.canvas_area(), config.stats_window, Arc::clone(&logger))?;

        let mut row_payload = Vec::new();
        config.cache_layout.fill_span(&mut row_payload, config.width as u64);

        cache_info!(logger, "galaxy3d::InvalidationManager",
            "Invalidation manager created: {}x{} canvas, {:?} writes, margin {}px, padding {}px",
            config.width, config.height, config.write_mode,
            config.region_margin, config.projection_padding);

        Ok(Self {
            config,
            projection,
            tracker,
            stats,
            cache_buffer: None,
            last_object_count: None,
            pending_full: false,
            last_bounds: FxHashMap::default(),
            row_payload,
            full_payload: Vec::new(),
            regions: Vec::new(),
            logger,
        })
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &InvalidationConfig {
        &self.config
    }

    pub fn stats(&self) -> &InvalidationStats {
        &self.stats
    }

    pub fn tracker(&self) -> &MovementTracker {
        &self.tracker
    }

    pub fn projection(&self) -> &ScreenProjection {
        &self.projection
    }

    pub fn cache_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.cache_buffer.as_ref()
    }

    pub fn has_cache_buffer(&self) -> bool {
        self.cache_buffer.is_some()
    }

    /// Whether the next frame is already scheduled as a full invalidation
    pub fn is_full_invalidation_pending(&self) -> bool {
        self.pending_full
    }

    /// Bytes the cache buffer must hold for the current canvas
    pub fn required_buffer_size(&self) -> u64 {
        self.config.cache_layout.required_size(self.config.canvas_area())
    }

    // ===== CACHE BUFFER =====

    /// Bind the cache buffer that receives invalidation writes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResource` if the buffer is smaller than
    /// `width * height * record_stride` bytes.
    pub fn set_cache_buffer(&mut self, buffer: Arc<dyn Buffer>) -> Result<()> {
        let required = self.required_buffer_size();
        if buffer.size() < required {
            cache_bail!(self.logger, InvalidResource, "galaxy3d::InvalidationManager",
                "Cache buffer holds {} bytes, {}x{} canvas needs {}",
                buffer.size(), self.config.width, self.config.height, required);
        }
        cache_debug!(self.logger, "galaxy3d::InvalidationManager",
            "Cache buffer bound ({} bytes)", buffer.size());
        self.cache_buffer = Some(buffer);
        Ok(())
    }

    /// Unbind the cache buffer. Frames fail until a new one is bound.
    pub fn clear_cache_buffer(&mut self) -> Option<Arc<dyn Buffer>> {
        self.cache_buffer.take()
    }

    // ===== FRAME =====

    /// Decode flat camera and object buffers with the configured layouts, then
    /// run `invalidate_for_frame()`.
    pub fn invalidate_for_frame_raw(&mut self, objects: &[f32], camera: &[f32]) -> Result<InvalidationResult> {
        let camera = self.config.camera_layout.decode(camera, &self.logger)?;
        let objects = self.config.object_layout.decode(objects, &self.logger);
        self.invalidate_for_frame(&objects, &camera)
    }

    /// Invalidate whatever this frame's camera and object states make stale.
    ///
    /// # Errors
    ///
    /// - `CacheBufferUnavailable` if no cache buffer is bound
    /// - `InvalidGeometry` if the camera has non-finite components
    /// - any error returned by the buffer write; the next frame is then
    ///   forced to a full invalidation
    pub fn invalidate_for_frame(
        &mut self,
        objects: &[ObjectState],
        camera: &CameraSnapshot,
    ) -> Result<InvalidationResult> {
        let start = Instant::now();

        let buffer = match self.cache_buffer.as_ref() {
            Some(buffer) => Arc::clone(buffer),
            None => cache_bail!(self.logger, CacheBufferUnavailable, "galaxy3d::InvalidationManager",
                "No cache buffer bound, cannot invalidate frame"),
        };
        if !camera.is_finite() {
            cache_bail!(self.logger, InvalidGeometry, "galaxy3d::InvalidationManager",
                "Camera has non-finite components: {:?}", camera);
        }

        let first_frame = !self.tracker.has_camera_state();
        let camera_changed = self.tracker.update_camera_data(camera) && !first_frame;
        self.projection.update_camera(camera);

        let topology_changed = self.last_object_count.is_some_and(|count| count != objects.len());
        if topology_changed {
            cache_info!(self.logger, "galaxy3d::InvalidationManager",
                "Object count changed from {} to {}",
                self.last_object_count.unwrap_or_default(), objects.len());
            self.reconcile_objects(objects.len());
        }
        self.last_object_count = Some(objects.len());

        let moved = self.tracker.update_spheres_data(objects);

        let full_cause = if camera_changed {
            Some(InvalidationCause::Camera)
        } else if first_frame {
            Some(InvalidationCause::Initial)
        } else if topology_changed {
            Some(InvalidationCause::Topology)
        } else if self.pending_full {
            Some(InvalidationCause::Forced)
        } else {
            None
        };

        let outcome = match full_cause {
            Some(cause) => self.invalidate_full(buffer.as_ref(), cause),
            None if !moved.is_empty() => self.invalidate_selective(buffer.as_ref(), &moved),
            None => Ok(InvalidationResult::none()),
        };
        let mut result = outcome.map_err(|err| {
            self.pending_full = true;
            err
        })?;

        result.elapsed = start.elapsed();
        self.stats.record_invalidation(&result);

        cache_debug!(self.logger, "galaxy3d::InvalidationManager",
            "Frame {:?}: {} moved, {} pixels in {} regions, {} writes, {:?}",
            result.cause, moved.len(), result.pixels_invalidated,
            result.regions_invalidated, result.write_count, result.elapsed);

        Ok(result)
    }

    fn invalidate_full(&mut self, buffer: &dyn Buffer, cause: InvalidationCause) -> Result<InvalidationResult> {
        let pixels = self.config.canvas_area();
        let layout = &self.config.cache_layout;
        if self.full_payload.len() as u64 != layout.span_len(pixels) {
            layout.fill_span(&mut self.full_payload, pixels);
        }
        buffer.update(layout.record_byte_offset(0), &self.full_payload)?;

        self.pending_full = false;
        self.last_bounds.clear();

        Ok(InvalidationResult {
            pixels_invalidated: pixels,
            regions_invalidated: 1,
            write_count: 1,
            elapsed: Duration::ZERO,
            camera_invalidation: cause == InvalidationCause::Camera,
            cause,
        })
    }

    fn invalidate_selective(&mut self, buffer: &dyn Buffer, moved: &[usize]) -> Result<InvalidationResult> {
        let mut regions = std::mem::take(&mut self.regions);
        regions.clear();

        for &index in moved {
            let rect = match self.moved_object_bounds(index) {
                Ok(rect) => rect,
                Err(err) => {
                    cache_warn!(self.logger, "galaxy3d::InvalidationManager",
                        "Moved object {} failed: {}", index, err);
                    match self.fallback_bounds(index) {
                        Some(rect) => rect,
                        None => {
                            cache_warn!(self.logger, "galaxy3d::InvalidationManager",
                                "Escalating frame to full invalidation after object {}", index);
                            self.regions = regions;
                            return self.invalidate_full(buffer, InvalidationCause::Fallback);
                        }
                    }
                }
            };

            if self.projection.is_valid_bounds(&rect) {
                regions.push(rect);
            } else {
                cache_trace!(self.logger, "galaxy3d::InvalidationManager",
                    "Skipping degenerate region of object {}: {:?}", index, rect);
            }
        }

        if self.config.merge_regions && regions.len() > 1 {
            let before = regions.len();
            regions = merge_regions(&regions);
            cache_trace!(self.logger, "galaxy3d::InvalidationManager",
                "Merged {} regions into {}", before, regions.len());
        }

        let mut pixels = 0;
        let mut writes = 0;
        for rect in &regions {
            writes += self.write_region(buffer, rect)?;
            pixels += rect.area();
        }
        let region_count = regions.len() as u32;
        self.regions = regions;

        if region_count == 0 {
            return Ok(InvalidationResult::none());
        }

        Ok(InvalidationResult {
            pixels_invalidated: pixels,
            regions_invalidated: region_count,
            write_count: writes,
            elapsed: Duration::ZERO,
            camera_invalidation: false,
            cause: InvalidationCause::Objects,
        })
    }

    /// Union of old and new padded bounds, grown by the region margin and clamped
    fn moved_object_bounds(&mut self, index: usize) -> Result<ScreenRect> {
        let states = (self.tracker.previous_state(index).copied(), self.tracker.current_state(index).copied());
        let (Some(previous), Some(current)) = states else {
            cache_trace!(self.logger, "galaxy3d::InvalidationManager",
                "No tracked state for object {}, skipping", index);
            return Ok(ScreenRect::EMPTY);
        };

        let padding = self.config.projection_padding;
        let old_bounds = self.projection.project_object(&previous, padding)?;
        let new_bounds = self.projection.project_object(&current, padding)?;
        self.last_bounds.insert(index, new_bounds);

        let union = self.projection.union_bounds(&old_bounds, &new_bounds);
        Ok(self.projection.expand_bounds(&union, self.config.region_margin))
    }

    /// Bounds to invalidate for an object that failed, `None` to escalate
    fn fallback_bounds(&self, index: usize) -> Option<ScreenRect> {
        if self.config.fallback != FallbackPolicy::LastKnownBounds {
            return None;
        }

        let padding = self.config.projection_padding;
        let known = self.last_bounds.get(&index).copied().or_else(|| {
            self.tracker.previous_state(index)
                .and_then(|previous| self.projection.project_object(previous, padding).ok())
        })?;

        cache_debug!(self.logger, "galaxy3d::InvalidationManager",
            "Falling back to last known bounds of object {}: {:?}", index, known);
        Some(self.projection.expand_bounds(&known, self.config.region_margin))
    }

    /// Invalidate every record of `rect`. Returns the number of writes.
    fn write_region(&self, buffer: &dyn Buffer, rect: &ScreenRect) -> Result<u64> {
        let layout = &self.config.cache_layout;
        let width = self.config.width as u64;
        let (x0, x1) = (rect.min_x as u64, rect.max_x as u64);
        let mut writes = 0;

        let span = match self.config.write_mode {
            WriteMode::RowBatched => layout.span_len(x1 - x0 + 1),
            WriteMode::PerPixel => layout.span_len(1),
        } as usize;
        let Some(payload) = self.row_payload.get(..span) else {
            cache_bail!(self.logger, InvalidResource, "galaxy3d::InvalidationManager",
                "Region {:?} is wider than the {}px canvas", rect, width);
        };

        for y in rect.min_y..=rect.max_y {
            let row_start = y as u64 * width;
            match self.config.write_mode {
                WriteMode::RowBatched => {
                    buffer.update(layout.record_byte_offset(row_start + x0), payload)?;
                    writes += 1;
                }
                WriteMode::PerPixel => {
                    for x in x0..=x1 {
                        buffer.update(layout.record_byte_offset(row_start + x), payload)?;
                        writes += 1;
                    }
                }
            }
        }

        Ok(writes)
    }

    // ===== LIFECYCLE =====

    /// Change the canvas size. The next frame is a full invalidation.
    ///
    /// A bound cache buffer that is too small for the new canvas is unbound;
    /// bind a larger one before the next frame.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            cache_bail!(self.logger, InvalidConfig, "galaxy3d::InvalidationManager",
                "Canvas size must be non-zero, got {}x{}", width, height);
        }

        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        if let Some(camera) = self.tracker.last_camera().copied() {
            self.projection.update_camera(&camera);
        }
        self.stats.set_canvas_size(self.config.canvas_area());

        self.config.cache_layout.fill_span(&mut self.row_payload, width as u64);
        self.full_payload = Vec::new();
        self.last_bounds.clear();
        self.pending_full = true;

        let required = self.required_buffer_size();
        let too_small = self.cache_buffer.as_ref().is_some_and(|buffer| buffer.size() < required);
        if too_small {
            cache_warn!(self.logger, "galaxy3d::InvalidationManager",
                "Cache buffer too small for {}x{} ({} bytes needed), unbinding it",
                width, height, required);
            self.cache_buffer = None;
        }

        cache_info!(self.logger, "galaxy3d::InvalidationManager",
            "Canvas resized to {}x{}", width, height);
        Ok(())
    }

    /// Make the next frame a full invalidation
    pub fn force_full_invalidation(&mut self) {
        cache_debug!(self.logger, "galaxy3d::InvalidationManager",
            "Full invalidation requested for next frame");
        self.pending_full = true;
    }

    /// Tell the manager the object array now holds `count` objects.
    ///
    /// Drops tracked state for indices past the end and makes the next frame
    /// a full invalidation.
    pub fn notify_topology_changed(&mut self, count: usize) {
        cache_info!(self.logger, "galaxy3d::InvalidationManager",
            "Topology changed, {} objects", count);
        self.reconcile_objects(count);
        self.last_object_count = Some(count);
        self.pending_full = true;
    }

    fn reconcile_objects(&mut self, count: usize) {
        self.tracker.reconcile(count);
        self.last_bounds.retain(|index, _| *index < count);
    }

    pub fn set_thresholds(&mut self, thresholds: TrackerThresholds) -> Result<()> {
        self.tracker.set_thresholds(thresholds)?;
        self.config.thresholds = thresholds;
        Ok(())
    }

    /// Forget all tracked state and statistics. The next frame is an initial
    /// full invalidation. The cache buffer stays bound.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.stats.reset();
        self.last_bounds.clear();
        self.last_object_count = None;
        self.pending_full = false;
        cache_info!(self.logger, "galaxy3d::InvalidationManager", "Invalidation manager reset");
    }

    /// Emit the statistics report at INFO
    pub fn log_summary(&self) {
        cache_info!(self.logger, "galaxy3d::InvalidationManager", "{}", self.stats.report());
    }
}

#[cfg(test)]
#[path = "invalidation_manager_tests.rs"]
mod tests;
