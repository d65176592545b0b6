use crate::catalog::Vec3Data;
use crate::config::CameraConfig;
use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Perspective camera handed to the rendering backend each frame.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: (u32, u32)) -> Mat4 {
        let aspect = if viewport.1 > 0 { viewport.0 as f32 / viewport.1 as f32 } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraLimits {
    pub min_distance: f32,
    pub max_distance: f32,
}

impl CameraLimits {
    /// Swaps reversed bounds and keeps the minimum strictly positive.
    pub fn new(min_distance: f32, max_distance: f32) -> Self {
        let (lo, hi) = if min_distance <= max_distance { (min_distance, max_distance) } else { (max_distance, min_distance) };
        let lo = if lo.is_finite() && lo > 0.0 { lo } else { 0.01 };
        let hi = if hi.is_finite() { hi.max(lo) } else { lo.max(10_000.0) };
        Self { min_distance: lo, max_distance: hi }
    }

    pub fn clamp(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTuning {
    pub rotate_sensitivity: f32,
    pub zoom_factor: f32,
    pub pan_speed: f32,
    /// Pan along the screen-up vector; when false pan slides along the ground plane.
    pub screen_space_panning: bool,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self { rotate_sensitivity: 0.005, zoom_factor: 0.1, pan_speed: 0.01, screen_space_panning: true }
    }
}

impl CameraTuning {
    /// Replaces non-finite or negative rates with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let rate = |value: f32, fallback: f32| if value.is_finite() && value >= 0.0 { value } else { fallback };
        Self {
            rotate_sensitivity: rate(self.rotate_sensitivity, defaults.rotate_sensitivity),
            zoom_factor: rate(self.zoom_factor, defaults.zoom_factor),
            pan_speed: rate(self.pan_speed, defaults.pan_speed),
            screen_space_panning: self.screen_space_panning,
        }
    }
}

/// Snapshot read by the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub target: Vec3Data,
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
}

/// Input gestures understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraGesture {
    Orbit(Vec2),
    /// Positive steps zoom in.
    Zoom(f32),
    Pan(Vec2),
}

/// Orbit-style controller around a target. `polar` is measured from straight up, so
/// `[0, PI/2]` keeps the camera on or above the ground plane.
#[derive(Debug, Clone)]
pub struct CameraController {
    target: Vec3,
    azimuth: f32,
    polar: f32,
    distance: f32,
    limits: CameraLimits,
    tuning: CameraTuning,
}

impl CameraController {
    pub fn new(target: Vec3, distance: f32, limits: CameraLimits) -> Self {
        Self {
            target,
            azimuth: 0.0,
            polar: FRAC_PI_2 * 0.5,
            distance: limits.clamp(distance),
            limits,
            tuning: CameraTuning::default(),
        }
    }

    /// Places the camera at `position` looking at `target`, then clamps into the limits.
    pub fn from_position(position: Vec3, target: Vec3, limits: CameraLimits) -> Self {
        let offset = position - target;
        let distance = offset.length();
        let mut controller = Self::new(target, distance, limits);
        if distance > f32::EPSILON {
            controller.azimuth = crate::wrap_angle(offset.x.atan2(offset.z));
            controller.polar = (offset.y / distance).clamp(-1.0, 1.0).acos().clamp(0.0, FRAC_PI_2);
        }
        controller
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let limits = CameraLimits::new(config.min_distance, config.max_distance);
        let mut controller =
            Self::from_position(config.initial_position.into(), config.initial_target.into(), limits);
        controller.tuning = config.tuning().sanitized();
        controller
    }

    pub fn with_tuning(mut self, tuning: CameraTuning) -> Self {
        self.tuning = tuning.sanitized();
        self
    }

    pub fn limits(&self) -> CameraLimits {
        self.limits
    }

    pub fn tuning(&self) -> CameraTuning {
        self.tuning
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn state(&self) -> CameraState {
        CameraState { target: self.target.into(), azimuth: self.azimuth, polar: self.polar, distance: self.distance }
    }

    pub fn apply(&mut self, gesture: CameraGesture) {
        match gesture {
            CameraGesture::Orbit(delta) => self.orbit(delta),
            CameraGesture::Zoom(steps) => self.zoom(steps),
            CameraGesture::Pan(delta) => self.pan(delta),
        }
    }

    pub fn orbit(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        let step = delta * self.tuning.rotate_sensitivity;
        if !step.is_finite() {
            return;
        }
        self.azimuth = crate::wrap_angle(self.azimuth + step.x);
        self.polar = (self.polar - step.y).clamp(0.0, FRAC_PI_2);
    }

    pub fn zoom(&mut self, steps: f32) {
        if !steps.is_finite() || steps == 0.0 {
            return;
        }
        let factor = self.tuning.zoom_factor.clamp(0.0, 0.95);
        let scale = if steps > 0.0 { (1.0 - factor).powf(steps) } else { (1.0 + factor).powf(-steps) };
        self.set_distance(self.distance * scale);
    }

    pub fn set_distance(&mut self, distance: f32) {
        if distance.is_nan() {
            return;
        }
        self.distance = self.limits.clamp(distance);
    }

    pub fn pan(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        let step = delta * self.tuning.pan_speed;
        let up = if self.tuning.screen_space_panning { self.up_vector() } else { self.ground_forward() };
        let target = self.target + self.right_vector() * step.x + up * step.y;
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Unit offset from the target towards the camera.
    pub fn direction(&self) -> Vec3 {
        spherical_to_cartesian(self.azimuth, self.polar)
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.direction() * self.distance
    }

    /// Horizontal right vector; defined even when looking straight down.
    pub fn right_vector(&self) -> Vec3 {
        Vec3::new(self.azimuth.cos(), 0.0, -self.azimuth.sin())
    }

    pub fn up_vector(&self) -> Vec3 {
        self.right_vector().cross(-self.direction()).normalize_or_zero()
    }

    fn ground_forward(&self) -> Vec3 {
        Vec3::new(-self.azimuth.sin(), 0.0, -self.azimuth.cos())
    }

    pub fn to_camera(&self, fov_y_radians: f32, near: f32, far: f32) -> Camera3D {
        let mut camera = Camera3D::new(self.position(), self.target, fov_y_radians, near, far);
        camera.up = self.up_vector();
        camera
    }
}

/// `(sin(polar) sin(azimuth), cos(polar), sin(polar) cos(azimuth))`.
pub fn spherical_to_cartesian(azimuth: f32, polar: f32) -> Vec3 {
    let (sin_polar, cos_polar) = polar.sin_cos();
    Vec3::new(sin_polar * azimuth.sin(), cos_polar, sin_polar * azimuth.cos())
}
