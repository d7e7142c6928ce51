/// Screen projection - maps world-space spheres to pixel-space rectangles.
///
/// `update_camera()` caches the camera basis (forward, right, up) and the
/// half extents of the view frustum at unit depth. Every projection this
/// frame reuses that basis.
///
/// Numeric policy: screen coordinates are floored (min) and ceiled (max)
/// before clamping, so a rect always over-covers the projected footprint.
///
/// Screen space is y-down: pixel (0, 0) is the top-left corner.

use std::sync::Arc;
use glam::Vec3;
use crate::camera::CameraSnapshot;
use crate::error::{Error, Result};
use crate::log::Logger;
use crate::scene::ObjectState;
use crate::{cache_debug, cache_warn};
use super::screen_rect::ScreenRect;

/// Spheres whose far extent is closer than this are behind the camera
pub const NEAR_LIMIT: f32 = 0.1;

/// Spheres whose near extent is farther than this are culled
pub const FAR_LIMIT: f32 = 1000.0;

/// Side of the conservative near-camera square, as a fraction of the larger canvas axis
pub const CONSERVATIVE_FRACTION: f32 = 0.25;

/// Minimum thickness of an exit strip, as a fraction of the smaller canvas axis
pub const EDGE_STRIP_FRACTION: f32 = 0.05;

const FOV_MIN: f32 = 1.0e-3;
const FOV_MAX: f32 = std::f32::consts::PI - 1.0e-3;

/// Where a sphere lands relative to the camera, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Footprint {
    /// Behind the near limit or beyond the far limit
    Culled,
    /// Straddles the near plane; unclamped conservative square
    Conservative(ScreenRect),
    /// Regular perspective projection; unclamped
    Projected(ScreenRect),
}

/// Camera basis cached by `update_camera()`
#[derive(Debug, Clone, Copy)]
struct CameraBasis {
    position: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    /// tan(fov_y / 2) * aspect
    half_width: f32,
    /// tan(fov_y / 2)
    half_height: f32,
}

pub struct ScreenProjection {
    width: u32,
    height: u32,
    basis: Option<CameraBasis>,
    logger: Arc<dyn Logger>,
}

impl ScreenProjection {
    pub fn new(width: u32, height: u32, logger: Arc<dyn Logger>) -> Self {
        Self {
            width,
            height,
            basis: None,
            logger,
        }
    }

    pub fn width(&self) -> u32 { self.width }

    pub fn height(&self) -> u32 { self.height }

    /// Total canvas pixel count
    pub fn canvas_area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Change canvas size. The camera basis stays valid.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Whether `update_camera()` has been called at least once
    pub fn has_camera(&self) -> bool {
        self.basis.is_some()
    }

    /// Recompute and cache the camera basis. Must precede any projection this frame.
    pub fn update_camera(&mut self, camera: &CameraSnapshot) {
        let mut forward = camera.look_at - camera.position;
        if forward.length_squared() <= f32::EPSILON || !forward.is_finite() {
            cache_debug!(self.logger, "galaxy3d::ScreenProjection",
                "Degenerate look direction {:?}, falling back to -Z", forward);
            forward = Vec3::NEG_Z;
        }
        let forward = forward.normalize();

        // Looking straight up or down: world up is parallel to forward
        let mut right = forward.cross(Vec3::Y);
        if right.length_squared() <= 1.0e-8 {
            right = Vec3::X;
        }
        let right = right.normalize();
        let up = right.cross(forward);

        let fov_y = if camera.fov_y.is_finite() {
            camera.fov_y.clamp(FOV_MIN, FOV_MAX)
        } else {
            FOV_MAX * 0.5
        };
        if fov_y != camera.fov_y {
            cache_warn!(self.logger, "galaxy3d::ScreenProjection",
                "Field of view {} out of range, using {}", camera.fov_y, fov_y);
        }

        let aspect = if camera.aspect.is_finite() && camera.aspect > 0.0 {
            camera.aspect
        } else {
            self.width.max(1) as f32 / self.height.max(1) as f32
        };

        let half_height = (fov_y * 0.5).tan();
        self.basis = Some(CameraBasis {
            position: camera.position,
            forward,
            right,
            up,
            half_width: half_height * aspect,
            half_height,
        });
    }

    fn footprint(&self, basis: &CameraBasis, center: Vec3, radius: f32) -> Footprint {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            return Footprint::Culled;
        }

        let relative = center - basis.position;
        let depth = relative.dot(basis.forward);

        if depth + radius < NEAR_LIMIT || depth - radius > FAR_LIMIT {
            return Footprint::Culled;
        }
        if depth - radius < NEAR_LIMIT {
            return Footprint::Conservative(self.conservative_rect());
        }

        let (w, h) = (self.width as f32, self.height as f32);
        let ndc_x = relative.dot(basis.right) / (depth * basis.half_width);
        let ndc_y = relative.dot(basis.up) / (depth * basis.half_height);
        let screen_x = (ndc_x * 0.5 + 0.5) * w;
        let screen_y = (0.5 - ndc_y * 0.5) * h;

        let radius_x = radius / (depth * basis.half_width) * 0.5 * w;
        let radius_y = radius / (depth * basis.half_height) * 0.5 * h;

        Footprint::Projected(outward_rect(
            screen_x - radius_x,
            screen_y - radius_y,
            screen_x + radius_x,
            screen_y + radius_y,
        ))
    }

    /// Fixed square centered on the screen center
    fn conservative_rect(&self) -> ScreenRect {
        let side = self.width.max(self.height) as f32 * CONSERVATIVE_FRACTION;
        let (cx, cy) = (self.width as f32 * 0.5, self.height as f32 * 0.5);
        outward_rect(cx - side * 0.5, cy - side * 0.5, cx + side * 0.5, cy + side * 0.5)
    }

    /// Full canvas, used when no camera basis exists yet
    fn uncalibrated_bounds(&self) -> ScreenRect {
        cache_warn!(self.logger, "galaxy3d::ScreenProjection",
            "Projection requested before update_camera(), covering the whole canvas");
        ScreenRect::full(self.width, self.height)
    }

    /// Project a sphere to clamped screen bounds.
    ///
    /// Returns `ScreenRect::EMPTY` when the sphere is frustum-culled or lands
    /// entirely off-canvas. A sphere straddling the near plane yields the
    /// conservative center square.
    pub fn sphere_to_screen_bounds(&self, center: Vec3, radius: f32) -> ScreenRect {
        let Some(basis) = self.basis.as_ref() else {
            return self.uncalibrated_bounds();
        };

        match self.footprint(basis, center, radius) {
            Footprint::Culled => ScreenRect::EMPTY,
            Footprint::Conservative(rect) | Footprint::Projected(rect) => {
                rect.clamp_to(self.width, self.height)
            }
        }
    }

    /// Project a sphere to clamped screen bounds grown by `padding` pixels.
    ///
    /// - entirely off-canvas: a strip along the edge the sphere exited through,
    ///   so pixels it covered last frame are not left stale
    /// - partially off-canvas: padding is doubled before clamping
    /// - otherwise: padded and clamped
    pub fn sphere_to_screen_bounds_with_padding(
        &self,
        center: Vec3,
        radius: f32,
        padding: u32,
    ) -> ScreenRect {
        let Some(basis) = self.basis.as_ref() else {
            return self.uncalibrated_bounds();
        };

        let pad = padding.min(i32::MAX as u32 / 2) as i32;
        let canvas = ScreenRect::full(self.width, self.height);

        match self.footprint(basis, center, radius) {
            Footprint::Culled => ScreenRect::EMPTY,
            Footprint::Conservative(rect) => rect.expand(pad).clamp_to(self.width, self.height),
            Footprint::Projected(rect) => {
                if !rect.intersects(&canvas) {
                    self.exit_strip(&rect, pad)
                } else if !canvas.contains(&rect) {
                    rect.expand(pad * 2).clamp_to(self.width, self.height)
                } else {
                    rect.expand(pad).clamp_to(self.width, self.height)
                }
            }
        }
    }

    /// Padded bounds of an object, failing on geometry that cannot be projected
    pub fn project_object(&self, object: &ObjectState, padding: u32) -> Result<ScreenRect> {
        if !object.is_projectable() {
            return Err(Error::InvalidGeometry(format!(
                "Object {} has center {:?} and radius {}",
                object.index, object.center, object.radius)));
        }
        Ok(self.sphere_to_screen_bounds_with_padding(object.center, object.radius, padding))
    }

    /// Edge strip on the side an off-canvas rect lies toward
    fn exit_strip(&self, rect: &ScreenRect, pad: i32) -> ScreenRect {
        if self.width == 0 || self.height == 0 {
            return ScreenRect::EMPTY;
        }
        let (w, h) = (self.width as i32, self.height as i32);

        let min_axis = self.width.min(self.height) as f32;
        let thickness = ((min_axis * EDGE_STRIP_FRACTION).ceil() as i32)
            .max(pad.saturating_mul(2))
            .max(1);
        let thickness_x = thickness.min(w);
        let thickness_y = thickness.min(h);

        if rect.max_x < 0 {
            let (y0, y1) = edge_span(rect.min_y, rect.max_y, pad, h, thickness_y);
            ScreenRect::new(0, y0, thickness_x - 1, y1)
        } else if rect.min_x >= w {
            let (y0, y1) = edge_span(rect.min_y, rect.max_y, pad, h, thickness_y);
            ScreenRect::new(w - thickness_x, y0, w - 1, y1)
        } else if rect.max_y < 0 {
            let (x0, x1) = edge_span(rect.min_x, rect.max_x, pad, w, thickness_x);
            ScreenRect::new(x0, 0, x1, thickness_y - 1)
        } else {
            let (x0, x1) = edge_span(rect.min_x, rect.max_x, pad, w, thickness_x);
            ScreenRect::new(x0, h - thickness_y, x1, h - 1)
        }
    }

    // ===== RECT ALGEBRA =====

    /// Union; an empty operand returns the other unchanged
    pub fn union_bounds(&self, a: &ScreenRect, b: &ScreenRect) -> ScreenRect {
        a.union(b)
    }

    pub fn union_multiple_bounds(&self, rects: &[ScreenRect]) -> ScreenRect {
        ScreenRect::union_all(rects)
    }

    /// Grow by `px` on every side, clamped to the canvas
    pub fn expand_bounds(&self, rect: &ScreenRect, px: u32) -> ScreenRect {
        rect.expand(px.min(i32::MAX as u32) as i32).clamp_to(self.width, self.height)
    }

    /// Valid and inside the canvas
    pub fn is_valid_bounds(&self, rect: &ScreenRect) -> bool {
        rect.is_valid() && rect.fits(self.width, self.height)
    }

    pub fn calculate_bounds_area(&self, rect: &ScreenRect) -> u64 {
        rect.area()
    }
}

/// Floor the minimum and ceil the maximum corner. `as` saturates out-of-range floats.
fn outward_rect(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> ScreenRect {
    ScreenRect::new(
        min_x.floor() as i32,
        min_y.floor() as i32,
        max_x.ceil() as i32,
        max_y.ceil() as i32,
    )
}

/// Range along a canvas edge for an exit strip: the padded footprint range
/// when it overlaps the canvas, otherwise the corner band it lies toward.
fn edge_span(min: i32, max: i32, pad: i32, extent: i32, thickness: i32) -> (i32, i32) {
    let lo = min.saturating_sub(pad);
    let hi = max.saturating_add(pad);
    if hi < 0 {
        (0, thickness - 1)
    } else if lo >= extent {
        (extent - thickness, extent - 1)
    } else {
        (lo.max(0), hi.min(extent - 1))
    }
}

#[cfg(test)]
#[path = "screen_projection_tests.rs"]
mod tests;
