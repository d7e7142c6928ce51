use super::*;
use glam::Vec3;
use crate::error::Error;
use crate::log::MemoryLogger;

// ============================================================================
// Helpers
// ============================================================================

fn create_tracker() -> MovementTracker {
    MovementTracker::new(TrackerThresholds::default(), Arc::new(MemoryLogger::new())).unwrap()
}

fn camera_at(z: f32) -> CameraSnapshot {
    CameraSnapshot::new(Vec3::new(0.0, 0.0, z), Vec3::ZERO, 1.047, 4.0 / 3.0)
}

fn sphere(index: usize, x: f32, radius: f32) -> ObjectState {
    ObjectState::new(index, Vec3::new(x, 0.0, 0.0), radius)
}

// ============================================================================
// Thresholds
// ============================================================================

#[test]
fn test_default_thresholds_are_small() {
    let t = TrackerThresholds::default();
    assert!(t.camera_position <= 1.0e-3 && t.camera_position >= 1.0e-5);
    assert!(t.object_position <= 1.0e-3 && t.object_position >= 1.0e-5);
    assert!(t.track_radius);
}

#[test]
fn test_negative_threshold_rejected() {
    let memory = Arc::new(MemoryLogger::new());
    let thresholds = TrackerThresholds { object_position: -1.0, ..TrackerThresholds::default() };
    let result = MovementTracker::new(thresholds, memory.clone());
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(memory.contains("object_position"));
}

#[test]
fn test_nan_threshold_rejected_by_setter() {
    let mut tracker = create_tracker();
    let thresholds = TrackerThresholds { camera_target: f32::NAN, ..TrackerThresholds::default() };
    assert!(tracker.set_thresholds(thresholds).is_err());
    assert_eq!(tracker.thresholds().camera_target, TrackerThresholds::default().camera_target);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn test_first_camera_update_reports_change() {
    let mut tracker = create_tracker();
    assert!(!tracker.has_camera_state());
    assert!(tracker.update_camera_data(&camera_at(5.0)));
    assert!(tracker.has_camera_state());
}

#[test]
fn test_static_camera_reports_no_change() {
    let mut tracker = create_tracker();
    tracker.update_camera_data(&camera_at(5.0));
    assert!(!tracker.update_camera_data(&camera_at(5.0)));
}

#[test]
fn test_camera_position_beyond_threshold() {
    let mut tracker = create_tracker();
    tracker.update_camera_data(&camera_at(5.0));
    assert!(tracker.update_camera_data(&camera_at(5.01)));
}

#[test]
fn test_camera_position_within_threshold() {
    let mut tracker = create_tracker();
    tracker.update_camera_data(&camera_at(5.0));
    assert!(!tracker.update_camera_data(&camera_at(5.00005)));
}

#[test]
fn test_camera_target_change_detected_independently() {
    let mut tracker = create_tracker();
    let cam = camera_at(5.0);
    tracker.update_camera_data(&cam);

    let turned = CameraSnapshot { look_at: Vec3::new(0.5, 0.0, 0.0), ..cam };
    assert!(tracker.update_camera_data(&turned));
}

#[test]
fn test_camera_lens_change_detected() {
    let mut tracker = create_tracker();
    let cam = camera_at(5.0);
    tracker.update_camera_data(&cam);

    let zoomed = CameraSnapshot { fov_y: 0.9, ..cam };
    assert!(tracker.update_camera_data(&zoomed));
}

#[test]
fn test_camera_delta_is_frame_to_frame() {
    let thresholds = TrackerThresholds { camera_position: 0.01, ..TrackerThresholds::default() };
    let mut tracker = MovementTracker::new(thresholds, Arc::new(MemoryLogger::new())).unwrap();

    tracker.update_camera_data(&camera_at(5.0));
    // Drifting 0.005 per frame never exceeds 0.01 frame-to-frame
    for step in 1..10 {
        assert!(!tracker.update_camera_data(&camera_at(5.0 + step as f32 * 0.005)));
    }
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn test_new_index_is_not_reported() {
    let mut tracker = create_tracker();
    let moved = tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    assert!(moved.is_empty());
    assert_eq!(tracker.tracked_count(), 1);
}

#[test]
fn test_moved_object_reported() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0), sphere(1, 5.0, 1.0)]);
    let moved = tracker.update_spheres_data(&[sphere(0, 0.0, 1.0), sphere(1, 6.0, 1.0)]);
    assert_eq!(moved, vec![1]);
}

#[test]
fn test_movement_below_threshold_not_reported() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    let moved = tracker.update_spheres_data(&[sphere(0, 0.0009, 1.0)]);
    assert!(moved.is_empty());
}

#[test]
fn test_radius_change_reported_when_tracked() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    assert_eq!(tracker.update_spheres_data(&[sphere(0, 0.0, 2.0)]), vec![0]);
}

#[test]
fn test_radius_change_ignored_when_untracked() {
    let thresholds = TrackerThresholds { track_radius: false, ..TrackerThresholds::default() };
    let mut tracker = MovementTracker::new(thresholds, Arc::new(MemoryLogger::new())).unwrap();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    assert!(tracker.update_spheres_data(&[sphere(0, 0.0, 2.0)]).is_empty());
}

#[test]
fn test_nan_center_counts_as_moved() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    assert_eq!(tracker.update_spheres_data(&[sphere(0, f32::NAN, 1.0)]), vec![0]);
}

#[test]
fn test_stored_state_overwritten_each_frame() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    tracker.update_spheres_data(&[sphere(0, 0.0005, 1.0)]);
    // 0.0005 + 0.0005: cumulative 0.001 but frame-to-frame delta 0.0005
    let moved = tracker.update_spheres_data(&[sphere(0, 0.001, 1.0)]);
    assert!(moved.is_empty());
    assert_eq!(tracker.current_state(0).unwrap().center.x, 0.001);
}

#[test]
fn test_previous_state_of_moved_object() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    tracker.update_spheres_data(&[sphere(0, 3.0, 1.5)]);

    assert_eq!(tracker.previous_state(0), Some(&sphere(0, 0.0, 1.0)));
    assert_eq!(tracker.current_state(0), Some(&sphere(0, 3.0, 1.5)));
}

#[test]
fn test_previous_state_cleared_on_next_update() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    tracker.update_spheres_data(&[sphere(0, 3.0, 1.0)]);
    tracker.update_spheres_data(&[sphere(0, 3.0, 1.0)]);

    assert_eq!(tracker.previous_state(0), Some(&sphere(0, 3.0, 1.0)));
}

#[test]
fn test_out_of_order_indices_inserted() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(7, 0.0, 1.0)]);
    assert_eq!(tracker.tracked_count(), 1);
    assert!(tracker.current_state(7).is_some());
}

// ============================================================================
// Reconcile / reset
// ============================================================================

#[test]
fn test_removed_objects_stay_without_reconcile() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0), sphere(1, 1.0, 1.0), sphere(2, 2.0, 1.0)]);
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);
    assert_eq!(tracker.tracked_count(), 3);
}

#[test]
fn test_reconcile_drops_out_of_range() {
    let mut tracker = create_tracker();
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0), sphere(1, 1.0, 1.0), sphere(2, 2.0, 1.0)]);

    assert_eq!(tracker.reconcile(1), 2);
    assert_eq!(tracker.tracked_count(), 1);
    assert!(tracker.current_state(1).is_none());
    assert_eq!(tracker.reconcile(1), 0);
}

#[test]
fn test_reset_forgets_camera_and_objects() {
    let mut tracker = create_tracker();
    tracker.update_camera_data(&camera_at(5.0));
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);

    tracker.reset();
    assert!(!tracker.has_camera_state());
    assert_eq!(tracker.tracked_count(), 0);
    assert!(tracker.update_camera_data(&camera_at(5.0)));
}

#[test]
fn test_clear_objects_keeps_camera() {
    let mut tracker = create_tracker();
    tracker.update_camera_data(&camera_at(5.0));
    tracker.update_spheres_data(&[sphere(0, 0.0, 1.0)]);

    tracker.clear_objects();
    assert!(tracker.has_camera_state());
    assert_eq!(tracker.tracked_count(), 0);
}
