use super::*;
use crate::error::Error;
use crate::log::MemoryLogger;

// ============================================================================
// Helpers
// ============================================================================

const CANVAS: u64 = 10_000;

fn create_stats(window: usize) -> InvalidationStats {
    InvalidationStats::new(CANVAS, window, Arc::new(MemoryLogger::new())).unwrap()
}

fn result(cause: InvalidationCause, pixels: u64, regions: u32) -> InvalidationResult {
    InvalidationResult {
        pixels_invalidated: pixels,
        regions_invalidated: regions,
        write_count: regions as u64,
        elapsed: Duration::from_micros(100),
        camera_invalidation: cause == InvalidationCause::Camera,
        cause,
    }
}

fn objects(pixels: u64) -> InvalidationResult {
    result(InvalidationCause::Objects, pixels, 1)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_zero_window_rejected() {
    let result = InvalidationStats::new(CANVAS, 0, Arc::new(MemoryLogger::new()));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_new_stats_are_empty() {
    let stats = create_stats(DEFAULT_STATS_WINDOW);
    let snapshot = stats.get_stats();
    assert_eq!(snapshot.frames, 0);
    assert_eq!(snapshot.total_invalidations, 0);
    assert_eq!(snapshot.average_pixels, 0.0);
    assert_eq!(snapshot.average_time, Duration::ZERO);
    assert_eq!(stats.efficiency_rating(), None);
    assert_eq!(stats.trend(), InvalidationTrend::InsufficientData);
}

// ============================================================================
// Recording
// ============================================================================

#[test]
fn test_record_splits_by_cause() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    stats.record_invalidation(&result(InvalidationCause::Initial, CANVAS, 1));
    stats.record_invalidation(&result(InvalidationCause::Camera, CANVAS, 1));
    stats.record_invalidation(&objects(500));
    stats.record_invalidation(&result(InvalidationCause::Fallback, CANVAS, 1));
    stats.record_invalidation(&InvalidationResult::none());

    let snapshot = stats.get_stats();
    assert_eq!(snapshot.frames, 5);
    assert_eq!(snapshot.skipped_frames, 1);
    assert_eq!(snapshot.total_invalidations, 4);
    assert_eq!(snapshot.camera_invalidations, 1);
    assert_eq!(snapshot.object_invalidations, 1);
    assert_eq!(snapshot.full_invalidations, 3);
    assert_eq!(snapshot.fallback_invalidations, 1);
    assert_eq!(snapshot.total_pixels, 3 * CANVAS + 500);
    assert_eq!(snapshot.total_regions, 4);
    assert_eq!(snapshot.window_len, 4);
}

#[test]
fn test_noop_frames_stay_out_of_window() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    for _ in 0..5 {
        stats.record_invalidation(&InvalidationResult::none());
    }
    assert_eq!(stats.recent().count(), 0);
    assert_eq!(stats.get_stats().skipped_frames, 5);
}

#[test]
fn test_window_evicts_oldest() {
    let mut stats = create_stats(3);
    for pixels in 1..=5 {
        stats.record_invalidation(&objects(pixels * 10));
    }

    let recent: Vec<u64> = stats.recent().map(|r| r.pixels_invalidated).collect();
    assert_eq!(recent, vec![30, 40, 50]);
    // Totals keep everything
    assert_eq!(stats.get_stats().total_pixels, 150);
}

#[test]
fn test_averages() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    stats.record_invalidation(&result(InvalidationCause::Objects, 1_000, 2));
    stats.record_invalidation(&result(InvalidationCause::Objects, 3_000, 4));
    stats.record_invalidation(&InvalidationResult {
        elapsed: Duration::from_millis(5),
        ..InvalidationResult::none()
    });

    let snapshot = stats.get_stats();
    assert_eq!(snapshot.frames, 3);
    assert_eq!(snapshot.total_time, Duration::from_micros(5_200));
    assert_eq!(snapshot.average_pixels, 2_000.0);
    assert_eq!(snapshot.average_regions, 3.0);
    assert!((snapshot.average_canvas_percentage - 20.0).abs() < 1e-9);
    assert_eq!(snapshot.average_time, Duration::from_micros(100));
}

// ============================================================================
// Trend
// ============================================================================

#[test]
fn test_trend_needs_samples() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    for _ in 0..(MIN_TREND_SAMPLES - 1) {
        stats.record_invalidation(&objects(100));
    }
    assert_eq!(stats.trend(), InvalidationTrend::InsufficientData);
}

#[test]
fn test_trend_improving() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    for pixels in [1_000, 1_000, 200, 200] {
        stats.record_invalidation(&objects(pixels));
    }
    assert_eq!(stats.trend(), InvalidationTrend::Improving);
}

#[test]
fn test_trend_degrading() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    for pixels in [100, 100, 100, 900, 900, 900] {
        stats.record_invalidation(&objects(pixels));
    }
    assert_eq!(stats.trend(), InvalidationTrend::Degrading);
}

#[test]
fn test_trend_stable_within_tolerance() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    for pixels in [1_000, 1_000, 1_050, 1_050] {
        stats.record_invalidation(&objects(pixels));
    }
    assert_eq!(stats.trend(), InvalidationTrend::Stable);
}

// ============================================================================
// Efficiency
// ============================================================================

#[test]
fn test_rating_thresholds() {
    assert_eq!(EfficiencyRating::from_percentage(0.0), EfficiencyRating::Excellent);
    assert_eq!(EfficiencyRating::from_percentage(4.99), EfficiencyRating::Excellent);
    assert_eq!(EfficiencyRating::from_percentage(5.0), EfficiencyRating::Good);
    assert_eq!(EfficiencyRating::from_percentage(15.0), EfficiencyRating::Fair);
    assert_eq!(EfficiencyRating::from_percentage(40.0), EfficiencyRating::Poor);
    assert!(EfficiencyRating::Excellent < EfficiencyRating::Poor);
}

#[test]
fn test_full_frames_rate_poor() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    stats.record_invalidation(&result(InvalidationCause::Camera, CANVAS, 1));
    assert_eq!(stats.efficiency_rating(), Some(EfficiencyRating::Poor));
}

#[test]
fn test_small_regions_rate_excellent() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    stats.record_invalidation(&objects(100));
    assert_eq!(stats.efficiency_rating(), Some(EfficiencyRating::Excellent));
}

// ============================================================================
// Report / reset / resize
// ============================================================================

#[test]
fn test_report_mentions_totals() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    stats.record_invalidation(&objects(1_234));
    let report = stats.report();
    assert!(report.contains("1234"));
    assert!(report.contains("Excellent") || report.contains("Good"));
    assert!(report.contains("InsufficientData"));
}

#[test]
fn test_reset_clears_everything_but_canvas() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    stats.record_invalidation(&objects(500));
    stats.reset();

    let snapshot = stats.get_stats();
    assert_eq!(snapshot.frames, 0);
    assert_eq!(snapshot.total_pixels, 0);
    assert_eq!(snapshot.window_len, 0);
    assert_eq!(stats.canvas_pixels(), CANVAS);
    assert_eq!(stats.window_capacity(), DEFAULT_STATS_WINDOW);
}

#[test]
fn test_set_canvas_size_changes_percentage() {
    let mut stats = create_stats(DEFAULT_STATS_WINDOW);
    stats.record_invalidation(&objects(1_000));
    stats.set_canvas_size(100_000);
    assert!((stats.get_stats().average_canvas_percentage - 1.0).abs() < 1e-9);
}
