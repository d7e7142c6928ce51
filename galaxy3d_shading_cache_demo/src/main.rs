//! Galaxy3D shading cache demo
//!
//! Drives the invalidation manager over a synthetic scene (a ring of spheres
//! with one orbiting satellite and a camera that pans twice) against a
//! host-memory cache buffer, then prints the statistics report.

use std::sync::Arc;
use galaxy_3d_shading_cache::galaxy3d::{InvalidationManager, Result};
use galaxy_3d_shading_cache::galaxy3d::cache::{InvalidationConfig, InvalidationResult};
use galaxy_3d_shading_cache::galaxy3d::camera::CameraSnapshot;
use galaxy_3d_shading_cache::galaxy3d::log::{DefaultLogger, LogSeverity, Logger};
use galaxy_3d_shading_cache::galaxy3d::render::HostBuffer;
use galaxy_3d_shading_cache::galaxy3d::scene::ObjectState;
use galaxy_3d_shading_cache::glam::Vec3;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FRAMES: u32 = 120;
const RING_SIZE: usize = 12;

fn main() {
    if let Err(err) = run() {
        eprintln!("Demo failed: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let logger: Arc<dyn Logger> = Arc::new(DefaultLogger::with_min_severity(LogSeverity::Info));

    let mut manager = InvalidationManager::new(InvalidationConfig::new(WIDTH, HEIGHT), logger)?;
    let buffer = Arc::new(HostBuffer::new(manager.required_buffer_size()));
    manager.set_cache_buffer(buffer.clone())?;

    let mut objects = ring();
    objects.push(ObjectState::new(RING_SIZE, Vec3::ZERO, 0.4));

    for frame in 0..FRAMES {
        let t = frame as f32 / 30.0;
        let satellite = &mut objects[RING_SIZE];
        satellite.center = Vec3::new(t.cos() * 2.0, (t * 2.0).sin() * 0.5, t.sin() * 2.0);

        let result = manager.invalidate_for_frame(&objects, &camera_at(frame))?;
        if frame % 20 == 0 || result.is_full_frame() {
            print_frame(frame, &result);
        }
    }

    println!();
    println!("{}", manager.stats().report());
    println!("Cache writes submitted: {} ({} bytes)", buffer.write_count(), buffer.bytes_written());
    Ok(())
}

/// Static spheres on a circle around the origin
fn ring() -> Vec<ObjectState> {
    (0..RING_SIZE)
        .map(|i| {
            let angle = i as f32 / RING_SIZE as f32 * std::f32::consts::TAU;
            ObjectState::new(i, Vec3::new(angle.cos() * 4.0, 0.0, angle.sin() * 4.0), 0.5)
        })
        .collect()
}

/// Fixed camera, panned sideways at frames 40 and 80
fn camera_at(frame: u32) -> CameraSnapshot {
    let pan = (frame / 40) as f32 * 0.5;
    CameraSnapshot::new(
        Vec3::new(pan, 3.0, 9.0),
        Vec3::new(pan, 0.0, 0.0),
        60.0f32.to_radians(),
        WIDTH as f32 / HEIGHT as f32,
    )
}

fn print_frame(frame: u32, result: &InvalidationResult) {
    let percentage = result.pixels_invalidated as f64 / (WIDTH as f64 * HEIGHT as f64) * 100.0;
    println!(
        "frame {:>3}: {:<8} {:>7} px ({:>5.1}%), {} regions, {} writes, {:?}",
        frame,
        format!("{:?}", result.cause),
        result.pixels_invalidated,
        percentage,
        result.regions_invalidated,
        result.write_count,
        result.elapsed,
    );
}
