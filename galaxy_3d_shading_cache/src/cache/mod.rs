//! Cache module - incremental invalidation of the per-pixel shading cache.
//!
//! - `ScreenProjection`: bounding spheres to clamped pixel rectangles
//! - `MovementTracker`: camera and per-object change detection
//! - `InvalidationManager`: per-frame decision and cache buffer writes
//! - `InvalidationStats`: running totals, rolling window, efficiency rating

mod cache_layout;
mod invalidation_manager;
mod invalidation_result;
mod invalidation_stats;
mod movement_tracker;
mod screen_projection;
mod screen_rect;

pub use cache_layout::CacheLayout;
pub use invalidation_manager::{
    InvalidationManager, InvalidationConfig, WriteMode, FallbackPolicy,
    DEFAULT_REGION_MARGIN, DEFAULT_PROJECTION_PADDING,
};
pub use invalidation_result::{InvalidationResult, InvalidationCause};
pub use invalidation_stats::{
    InvalidationStats, StatsSnapshot, InvalidationTrend, EfficiencyRating,
    DEFAULT_STATS_WINDOW, MIN_TREND_SAMPLES,
};
pub use movement_tracker::{MovementTracker, TrackerThresholds};
pub use screen_projection::{
    ScreenProjection, NEAR_LIMIT, FAR_LIMIT, CONSERVATIVE_FRACTION, EDGE_STRIP_FRACTION,
};
pub use screen_rect::{ScreenRect, merge_regions};
