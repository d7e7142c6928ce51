/// Per-frame invalidation outcome.

use std::time::Duration;

/// Why a frame invalidated what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidationCause {
    /// Nothing moved
    None,
    /// First frame, no prior camera state
    Initial,
    /// Camera moved beyond its thresholds
    Camera,
    /// Selective invalidation of moved objects
    Objects,
    /// Object count changed since the previous frame
    Topology,
    /// Explicit request (`force_full_invalidation`, `resize`)
    Forced,
    /// A moved object could not be processed and the frame escalated to full
    Fallback,
}

impl InvalidationCause {
    /// Whether this cause invalidates the whole canvas
    pub fn is_full_frame(&self) -> bool {
        !matches!(self, InvalidationCause::None | InvalidationCause::Objects)
    }
}

/// Outcome of one `invalidate_for_frame()` call. Produced fresh each call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidationResult {
    pub pixels_invalidated: u64,
    pub regions_invalidated: u32,
    /// Discrete buffer writes submitted
    pub write_count: u64,
    pub elapsed: Duration,
    /// True exactly when the camera moved (always full-frame)
    pub camera_invalidation: bool,
    pub cause: InvalidationCause,
}

impl InvalidationResult {
    /// Result of a frame where nothing was invalidated
    pub fn none() -> Self {
        Self {
            pixels_invalidated: 0,
            regions_invalidated: 0,
            write_count: 0,
            elapsed: Duration::ZERO,
            camera_invalidation: false,
            cause: InvalidationCause::None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.pixels_invalidated == 0 && self.regions_invalidated == 0
    }

    pub fn is_full_frame(&self) -> bool {
        self.cause.is_full_frame()
    }
}

impl Default for InvalidationResult {
    fn default() -> Self {
        Self::none()
    }
}
