//! Camera module - per-frame camera snapshot and its flat-buffer layout.
//!
//! The engine does NOT own or drive cameras. The caller captures a
//! snapshot each frame and hands it to the invalidation manager.

mod camera_snapshot;

pub use camera_snapshot::{CameraSnapshot, CameraLayout};
