/// Invalidation statistics - running totals plus a rolling window.
///
/// Every recorded call counts as a frame. No-op frames are counted as
/// skipped and stay out of the rolling window, so averages and trends
/// describe actual invalidation events. Diagnostics only; nothing here
/// feeds back into invalidation decisions.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use crate::error::Result;
use crate::log::Logger;
use crate::{cache_bail, cache_debug};
use super::invalidation_result::{InvalidationCause, InvalidationResult};

/// Default rolling window capacity
pub const DEFAULT_STATS_WINDOW: usize = 20;

/// Minimum window length before a trend is reported
pub const MIN_TREND_SAMPLES: usize = 4;

/// Relative change between window halves treated as noise
const TREND_TOLERANCE: f64 = 0.1;

/// Direction of recent invalidation sizes (second half of the window vs first half).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationTrend {
    InsufficientData,
    /// Fewer pixels per event recently
    Improving,
    Stable,
    /// More pixels per event recently
    Degrading,
}

/// Overall efficiency by average canvas percentage per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EfficiencyRating {
    /// Below 5%
    Excellent,
    /// 5% to 15%
    Good,
    /// 15% to 40%
    Fair,
    /// 40% and above
    Poor,
}

impl EfficiencyRating {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 5.0 {
            EfficiencyRating::Excellent
        } else if percentage < 15.0 {
            EfficiencyRating::Good
        } else if percentage < 40.0 {
            EfficiencyRating::Fair
        } else {
            EfficiencyRating::Poor
        }
    }
}

/// Totals and derived averages, as returned by `get_stats()`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Every recorded call
    pub frames: u64,
    /// Calls that invalidated nothing
    pub skipped_frames: u64,
    /// Calls that invalidated something
    pub total_invalidations: u64,
    pub camera_invalidations: u64,
    pub object_invalidations: u64,
    /// Full-frame events for any cause, camera included
    pub full_invalidations: u64,
    pub fallback_invalidations: u64,
    pub total_pixels: u64,
    pub total_regions: u64,
    pub total_writes: u64,
    /// Time spent in every recorded frame, no-ops included
    pub total_time: Duration,
    pub average_pixels: f64,
    pub average_regions: f64,
    /// Mean time per invalidation event
    pub average_time: Duration,
    /// Mean share of the canvas invalidated per event, 0..=100
    pub average_canvas_percentage: f64,
    pub window_len: usize,
}

pub struct InvalidationStats {
    canvas_pixels: u64,
    window_capacity: usize,
    recent: VecDeque<InvalidationResult>,
    frames: u64,
    skipped_frames: u64,
    total_invalidations: u64,
    camera_invalidations: u64,
    object_invalidations: u64,
    full_invalidations: u64,
    fallback_invalidations: u64,
    total_pixels: u64,
    total_regions: u64,
    total_writes: u64,
    total_time: Duration,
    event_time: Duration,
    logger: Arc<dyn Logger>,
}

impl InvalidationStats {
    /// Create empty statistics for a canvas of `canvas_pixels` pixels
    pub fn new(canvas_pixels: u64, window_capacity: usize, logger: Arc<dyn Logger>) -> Result<Self> {
        if window_capacity == 0 {
            cache_bail!(logger, InvalidConfig, "galaxy3d::InvalidationStats",
                "Rolling window capacity must be non-zero");
        }
        Ok(Self {
            canvas_pixels,
            window_capacity,
            recent: VecDeque::with_capacity(window_capacity),
            frames: 0,
            skipped_frames: 0,
            total_invalidations: 0,
            camera_invalidations: 0,
            object_invalidations: 0,
            full_invalidations: 0,
            fallback_invalidations: 0,
            total_pixels: 0,
            total_regions: 0,
            total_writes: 0,
            total_time: Duration::ZERO,
            event_time: Duration::ZERO,
            logger,
        })
    }

    pub fn window_capacity(&self) -> usize {
        self.window_capacity
    }

    pub fn canvas_pixels(&self) -> u64 {
        self.canvas_pixels
    }

    /// Canvas size used for percentages; totals are kept
    pub fn set_canvas_size(&mut self, canvas_pixels: u64) {
        cache_debug!(self.logger, "galaxy3d::InvalidationStats",
            "Canvas size changed from {} to {} pixels", self.canvas_pixels, canvas_pixels);
        self.canvas_pixels = canvas_pixels;
    }

    /// Fold one frame's result into the totals and the rolling window
    pub fn record_invalidation(&mut self, result: &InvalidationResult) {
        self.frames += 1;
        self.total_time += result.elapsed;

        if result.is_noop() {
            self.skipped_frames += 1;
            return;
        }

        self.total_invalidations += 1;
        self.event_time += result.elapsed;
        self.total_pixels += result.pixels_invalidated;
        self.total_regions += result.regions_invalidated as u64;
        self.total_writes += result.write_count;

        if result.camera_invalidation {
            self.camera_invalidations += 1;
        }
        if result.cause == InvalidationCause::Objects {
            self.object_invalidations += 1;
        }
        if result.cause == InvalidationCause::Fallback {
            self.fallback_invalidations += 1;
        }
        if result.is_full_frame() {
            self.full_invalidations += 1;
        }

        if self.recent.len() == self.window_capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(*result);
    }

    /// Recent invalidation events, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &InvalidationResult> {
        self.recent.iter()
    }

    pub fn get_stats(&self) -> StatsSnapshot {
        let events = self.total_invalidations;
        let (average_pixels, average_regions, average_canvas_percentage) = if events == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let average_pixels = self.total_pixels as f64 / events as f64;
            let percentage = if self.canvas_pixels == 0 {
                0.0
            } else {
                average_pixels / self.canvas_pixels as f64 * 100.0
            };
            (average_pixels, self.total_regions as f64 / events as f64, percentage)
        };

        let average_time = if events == 0 {
            Duration::ZERO
        } else {
            self.event_time / events.min(u32::MAX as u64) as u32
        };

        StatsSnapshot {
            frames: self.frames,
            skipped_frames: self.skipped_frames,
            total_invalidations: events,
            camera_invalidations: self.camera_invalidations,
            object_invalidations: self.object_invalidations,
            full_invalidations: self.full_invalidations,
            fallback_invalidations: self.fallback_invalidations,
            total_pixels: self.total_pixels,
            total_regions: self.total_regions,
            total_writes: self.total_writes,
            total_time: self.total_time,
            average_pixels,
            average_regions,
            average_time,
            average_canvas_percentage,
            window_len: self.recent.len(),
        }
    }

    /// Compare mean pixels of the older and newer halves of the window
    pub fn trend(&self) -> InvalidationTrend {
        let n = self.recent.len();
        if n < MIN_TREND_SAMPLES {
            return InvalidationTrend::InsufficientData;
        }

        let half = n / 2;
        let pixels = |r: &InvalidationResult| r.pixels_invalidated as f64;
        let older = self.recent.iter().take(half).map(pixels).sum::<f64>() / half as f64;
        let newer = self.recent.iter().skip(half).map(pixels).sum::<f64>() / (n - half) as f64;

        if newer < older * (1.0 - TREND_TOLERANCE) {
            InvalidationTrend::Improving
        } else if newer > older * (1.0 + TREND_TOLERANCE) {
            InvalidationTrend::Degrading
        } else {
            InvalidationTrend::Stable
        }
    }

    /// Rating of the overall average canvas percentage, `None` before any event
    pub fn efficiency_rating(&self) -> Option<EfficiencyRating> {
        if self.total_invalidations == 0 || self.canvas_pixels == 0 {
            return None;
        }
        Some(EfficiencyRating::from_percentage(self.get_stats().average_canvas_percentage))
    }

    /// Multi-line human-readable summary
    pub fn report(&self) -> String {
        let stats = self.get_stats();
        let mut out = String::new();
        let _ = writeln!(out, "Invalidation statistics");
        let _ = writeln!(out, "  frames:          {} ({} skipped)", stats.frames, stats.skipped_frames);
        let _ = writeln!(
            out,
            "  invalidations:   {} (camera {}, objects {}, full {}, fallback {})",
            stats.total_invalidations,
            stats.camera_invalidations,
            stats.object_invalidations,
            stats.full_invalidations,
            stats.fallback_invalidations,
        );
        let _ = writeln!(out, "  pixels:          {} total, {:.1} avg", stats.total_pixels, stats.average_pixels);
        let _ = writeln!(out, "  regions:         {} total, {:.2} avg", stats.total_regions, stats.average_regions);
        let _ = writeln!(out, "  writes:          {}", stats.total_writes);
        let _ = writeln!(out, "  time:            {:?} total, {:?} avg", stats.total_time, stats.average_time);
        let _ = writeln!(out, "  canvas per event: {:.2}%", stats.average_canvas_percentage);
        let rating = match self.efficiency_rating() {
            Some(rating) => format!("{:?}", rating),
            None => "n/a".to_string(),
        };
        let _ = writeln!(out, "  efficiency:      {}", rating);
        let _ = write!(out, "  trend:           {:?} ({} recent)", self.trend(), stats.window_len);
        out
    }

    /// Clear totals and the rolling window; canvas size and capacity are kept
    pub fn reset(&mut self) {
        self.recent.clear();
        self.frames = 0;
        self.skipped_frames = 0;
        self.total_invalidations = 0;
        self.camera_invalidations = 0;
        self.object_invalidations = 0;
        self.full_invalidations = 0;
        self.fallback_invalidations = 0;
        self.total_pixels = 0;
        self.total_regions = 0;
        self.total_writes = 0;
        self.total_time = Duration::ZERO;
        self.event_time = Duration::ZERO;
        cache_debug!(self.logger, "galaxy3d::InvalidationStats", "Statistics reset");
    }
}

#[cfg(test)]
#[path = "invalidation_stats_tests.rs"]
mod tests;
