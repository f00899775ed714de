use serde::{Deserialize, Serialize};

use crate::config::ViewportConfig;
use crate::spring::Spring;
use crate::types::{Size, Vec3};

/// Canvas-local pixel coordinate, origin at the canvas top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: ScreenPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Camera pose. `x`, `y`, `z` are reserved for translation and stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
}

/// Map a pointer offset from the canvas centre to `(rotation_x, rotation_y)`.
///
/// Horizontal offset drives yaw with the same sign; vertical offset drives
/// pitch with the inverse sign. Offsets beyond the pointer range clamp.
pub fn pointer_to_rotation(dx: f64, dy: f64, config: &ViewportConfig) -> (f64, f64) {
    let max = config.max_rotation_deg;
    let range = config.pointer_range_px.max(f64::EPSILON);
    let rotation_y = (dx / range * max).clamp(-max, max);
    let rotation_x = (-dy / range * max).clamp(-max, max);
    (rotation_x, rotation_y)
}

/// The single rigid transform applied to every node and connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub perspective: f64,
    pub viewport: Size,
}

impl SceneTransform {
    pub fn new(camera: CameraState, perspective: f64, viewport: Size) -> Self {
        Self {
            rotation_x: camera.rotation_x,
            rotation_y: camera.rotation_y,
            perspective,
            viewport,
        }
    }

    /// Rotate a scene point about the origin: yaw first, then pitch.
    /// Screen convention: +y down, +z toward the viewer.
    pub fn rotate(&self, p: Vec3) -> Vec3 {
        let (sy, cy) = self.rotation_y.to_radians().sin_cos();
        let (sx, cx) = self.rotation_x.to_radians().sin_cos();

        let x1 = p.x * cy + p.z * sy;
        let z1 = -p.x * sy + p.z * cy;

        let y2 = p.y * cx - z1 * sx;
        let z2 = p.y * sx + z1 * cx;

        Vec3::new(x1, y2, z2)
    }

    /// Perspective factor for a rotated depth. Points at or behind the eye
    /// are pinned to a large finite factor.
    pub fn depth_scale(&self, z: f64) -> f64 {
        let denom = (self.perspective - z).max(1.0);
        self.perspective / denom
    }

    /// Project a scene point to canvas pixels. Returns the screen point and
    /// the rotated depth (larger is nearer).
    pub fn project(&self, p: Vec3) -> (ScreenPoint, f64) {
        let r = self.rotate(p);
        let k = self.depth_scale(r.z);
        let center_x = self.viewport.width / 2.0;
        let center_y = self.viewport.height / 2.0;
        (
            ScreenPoint::new(center_x + r.x * k, center_y + r.y * k),
            r.z,
        )
    }
}

/// Pointer-driven orbit camera.
///
/// Pointer samples are coalesced and applied at most once per frame in
/// [`CameraController::tick`]. Leaving the canvas springs both angles home,
/// or on release when the camera is held.
#[derive(Debug, Clone)]
pub struct CameraController {
    rotation_x: Spring,
    rotation_y: Spring,
    pending: Option<(f64, f64)>,
    held: bool,
    leave_on_release: bool,
}

impl CameraController {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            rotation_x: Spring::new(0.0, config.camera_spring),
            rotation_y: Spring::new(0.0, config.camera_spring),
            pending: None,
            held: false,
            leave_on_release: false,
        }
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            rotation_x: self.rotation_x.get(),
            rotation_y: self.rotation_y.get(),
            ..CameraState::default()
        }
    }

    /// Record the latest pointer position. Only the last sample before the
    /// next frame takes effect.
    pub fn pointer_move(&mut self, pointer: ScreenPoint, viewport: Size, config: &ViewportConfig) {
        if self.held {
            return;
        }
        let dx = pointer.x - viewport.width / 2.0;
        let dy = pointer.y - viewport.height / 2.0;
        self.pending = Some(pointer_to_rotation(dx, dy, config));
    }

    /// Drop any pending sample and spring back to zero rotation. While held
    /// the return waits for release.
    pub fn pointer_leave(&mut self) {
        self.pending = None;
        if self.held {
            self.leave_on_release = true;
            return;
        }
        self.spring_home();
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.leave_on_release = false;
        self.spring_home();
    }

    fn spring_home(&mut self) {
        self.rotation_x.set_target(0.0);
        self.rotation_y.set_target(0.0);
    }

    /// Freeze the camera, e.g. while a node is being dragged.
    pub fn set_held(&mut self, held: bool) {
        self.held = held;
        if held {
            self.pending = None;
        } else if std::mem::take(&mut self.leave_on_release) {
            self.spring_home();
        }
    }

    /// Nudge both angles by a delta, clamped to the rotation limit.
    pub fn orbit_by(&mut self, d_rotation_x: f64, d_rotation_y: f64, config: &ViewportConfig) {
        let max = config.max_rotation_deg;
        let (current_x, current_y) = self
            .pending
            .unwrap_or((self.rotation_x.target(), self.rotation_y.target()));
        self.pending = Some((
            (current_x + d_rotation_x).clamp(-max, max),
            (current_y + d_rotation_y).clamp(-max, max),
        ));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the coalesced pointer sample and advance the return spring.
    /// Returns true when the pose changed or is still moving.
    pub fn tick(&mut self, dt: f64) -> bool {
        let applied = match self.pending.take() {
            Some((rx, ry)) => {
                let before = self.state();
                self.rotation_x.set_immediate(rx);
                self.rotation_y.set_immediate(ry);
                self.state() != before
            }
            None => false,
        };
        let moving_x = self.rotation_x.tick(dt);
        let moving_y = self.rotation_y.tick(dt);
        applied || moving_x || moving_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn viewport() -> Size {
        Size {
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn test_center_is_zero() {
        let config = ViewportConfig::default();
        assert_eq!(pointer_to_rotation(0.0, 0.0, &config), (0.0, 0.0));
    }

    #[test]
    fn test_linear_mapping_and_signs() {
        let config = ViewportConfig::default();
        let (rx, ry) = pointer_to_rotation(150.0, 150.0, &config);
        assert_eq!(ry, 15.0);
        assert_eq!(rx, -15.0);
    }

    #[test]
    fn test_clamps_beyond_range() {
        let config = ViewportConfig::default();
        for offset in [300.0, 301.0, 450.0, 10_000.0] {
            let (rx, ry) = pointer_to_rotation(offset, -offset, &config);
            assert_eq!(ry, 30.0);
            assert_eq!(rx, 30.0);
            let (rx, ry) = pointer_to_rotation(-offset, offset, &config);
            assert_eq!(ry, -30.0);
            assert_eq!(rx, -30.0);
        }
    }

    #[test]
    fn test_samples_coalesce_per_frame() {
        let config = ViewportConfig::default();
        let mut camera = CameraController::new(&config);
        camera.pointer_move(ScreenPoint::new(700.0, 300.0), viewport(), &config);
        camera.pointer_move(ScreenPoint::new(550.0, 300.0), viewport(), &config);
        // nothing applied until the frame
        assert_eq!(camera.state().rotation_y, 0.0);
        camera.tick(FRAME);
        assert_eq!(camera.state().rotation_y, 15.0);
    }

    #[test]
    fn test_leave_springs_home() {
        let config = ViewportConfig::default();
        let mut camera = CameraController::new(&config);
        camera.pointer_move(ScreenPoint::new(800.0, 0.0), viewport(), &config);
        camera.tick(FRAME);
        assert_eq!(camera.state().rotation_y, 30.0);

        camera.pointer_leave();
        assert!(camera.tick(FRAME));
        let after_one = camera.state();
        assert!(after_one.rotation_y > 0.0 && after_one.rotation_y < 30.0);

        let mut frames = 1;
        while camera.tick(FRAME) {
            frames += 1;
            assert!(frames < 600);
        }
        assert_eq!(camera.state().rotation_x, 0.0);
        assert_eq!(camera.state().rotation_y, 0.0);
    }

    #[test]
    fn test_held_camera_ignores_pointer() {
        let config = ViewportConfig::default();
        let mut camera = CameraController::new(&config);
        camera.set_held(true);
        camera.pointer_move(ScreenPoint::new(800.0, 0.0), viewport(), &config);
        camera.tick(FRAME);
        assert_eq!(camera.state(), CameraState::default());
    }

    #[test]
    fn test_leave_while_held_waits_for_release() {
        let config = ViewportConfig::default();
        let mut camera = CameraController::new(&config);
        camera.pointer_move(ScreenPoint::new(800.0, 0.0), viewport(), &config);
        camera.tick(FRAME);
        assert_eq!(camera.state().rotation_y, 30.0);

        camera.set_held(true);
        camera.pointer_leave();
        for _ in 0..60 {
            camera.tick(FRAME);
        }
        assert_eq!(camera.state().rotation_y, 30.0);

        camera.set_held(false);
        assert!(camera.tick(FRAME));
        assert!(camera.state().rotation_y < 30.0);
        while camera.tick(FRAME) {}
        assert_eq!(camera.state().rotation_y, 0.0);
    }

    #[test]
    fn test_identity_projection_centres_origin() {
        let transform = SceneTransform::new(CameraState::default(), 1000.0, viewport());
        let (screen, depth) = transform.project(Vec3::ZERO);
        assert_eq!(screen, ScreenPoint::new(400.0, 300.0));
        assert_eq!(depth, 0.0);
    }

    #[test]
    fn test_rotation_preserves_distances() {
        let camera = CameraState {
            rotation_x: 17.0,
            rotation_y: -23.0,
            ..CameraState::default()
        };
        let transform = SceneTransform::new(camera, 1000.0, viewport());
        let a = Vec3::new(-200.0, -100.0, 50.0);
        let b = Vec3::new(0.0, -50.0, 100.0);
        let before = b.sub(a).length();
        let after = transform.rotate(b).sub(transform.rotate(a)).length();
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_yaw_moves_positive_x_away() {
        let camera = CameraState {
            rotation_y: 30.0,
            ..CameraState::default()
        };
        let transform = SceneTransform::new(camera, 1000.0, viewport());
        let r = transform.rotate(Vec3::new(100.0, 0.0, 0.0));
        assert!(r.z < 0.0);
        assert!(r.x < 100.0);
    }
}
