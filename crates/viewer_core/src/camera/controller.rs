use axes::{AxisSystem, PolarLimits};
use glam::{Mat3, Mat4, Quat, Vec2, Vec3};
use scene_api::{Aabb, Ray};
use settings::CameraSettings;

use super::{animation::OrbitAnimation, orbit::DragState};

pub(super) const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Where a world point lands on the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Normalized device coordinates after the perspective divide.
    pub ndc: Vec3,
    /// Pixels from the top-left corner of the viewport.
    pub screen: Vec2,
    /// False when the point is behind the eye; `ndc` and `screen` are then
    /// meaningless.
    pub in_front: bool,
}

/// Orbiting perspective camera.
///
/// The eye sits on a sphere of `radius` around `target`; `orientation` maps
/// camera-local axes to world axes, with the eye looking down local -Z.
#[derive(Debug)]
pub struct CameraController {
    pub(super) target: Vec3,
    pub(super) radius: f32,
    pub(super) orientation: Quat,

    pub(super) fov_y_deg: f32,
    pub(super) near: f32,
    pub(super) far: f32,

    pub(super) axes: AxisSystem,
    pub(super) polar_limits: PolarLimits,
    pub(super) min_distance: f32,
    pub(super) max_distance: f32,

    pub(super) auto_rotate: bool,
    pub(super) auto_rotate_speed: f32,
    pub(super) rotate_speed: f32,
    pub(super) zoom_sensitivity: f32,
    pub(super) invert_zoom: bool,

    pub(super) viewport_size: (u32, u32),

    pub(super) drag: Option<DragState>,
    pub(super) animation: Option<OrbitAnimation>,
}

impl CameraController {
    pub fn new(settings: &CameraSettings, initial_viewport: (u32, u32)) -> Self {
        let axes = settings.axis_preset.axis_system();
        let mut controller = Self {
            target: Vec3::ZERO,
            radius: 1.0,
            orientation: Quat::IDENTITY,
            fov_y_deg: settings.fov_degrees,
            near: settings.near,
            far: settings.far,
            axes,
            polar_limits: settings.polar_limits(),
            min_distance: settings.min_distance.min(settings.max_distance),
            max_distance: settings.max_distance.max(settings.min_distance),
            auto_rotate: settings.auto_rotate,
            auto_rotate_speed: settings.auto_rotate_speed,
            rotate_speed: settings.rotate_speed,
            zoom_sensitivity: settings.zoom_sensitivity,
            invert_zoom: settings.invert_zoom,
            viewport_size: initial_viewport,
            drag: None,
            animation: None,
        };

        let eye = controller.axes.canonical_to_world(Vec3::new(2.8, 2.0, 3.2));
        controller.look_from(eye, Vec3::ZERO);
        controller
    }

    /// Place the eye at `eye` looking at `target`. Limits are not applied.
    pub fn look_from(&mut self, eye: Vec3, target: Vec3) {
        self.target = target;
        let offset = eye - target;
        self.radius = offset.length();
        if let Some(direction) = offset.try_normalize() {
            self.place_on_sphere(direction);
        }
    }

    /// Frame `bounds` the way a freshly loaded scene is shown: the eye above
    /// and in front of the center, pulled back in proportion to the diagonal.
    pub fn reset_to_fit(&mut self, bounds: &Aabb) {
        let extent = bounds.size().length().max(f32::EPSILON);
        let center = bounds.center();
        let offset = self
            .axes
            .canonical_to_world(Vec3::new(0.0, 0.35 * extent, 1.1 * extent));

        self.animation = None;
        self.drag = None;
        self.look_from(center + offset, center);
        self.enforce_limits();
    }

    /// Advance animation or auto-rotation. Returns true when the eye moved.
    pub fn update(&mut self, now: std::time::Duration, dt_secs: f32) -> bool {
        if self.animation.is_some() {
            return self.step_animation(now);
        }
        if self.auto_rotate && dt_secs > 0.0 && self.drag.is_none() {
            // 2*PI per 60 s at speed 1.0
            let angle = std::f32::consts::TAU / 60.0 * self.auto_rotate_speed * dt_secs;
            self.rotate_spherical(-angle, 0.0);
            return true;
        }
        false
    }

    pub fn update_viewport(&mut self, size: (u32, u32)) {
        self.viewport_size = size;
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport_size
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.direction() * self.radius
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Unit vector from the target towards the eye.
    pub fn direction(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn axes(&self) -> &AxisSystem {
        &self.axes
    }

    pub fn polar_limits(&self) -> PolarLimits {
        self.polar_limits
    }

    pub fn set_polar_limits(&mut self, limits: PolarLimits) {
        self.polar_limits = limits;
    }

    pub fn distance_limits(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// While an orbit animation runs this changes the flag restored when it ends.
    pub fn set_auto_rotate(&mut self, enabled: bool) {
        match self.animation.as_mut() {
            Some(animation) => animation.resume_auto_rotate = enabled,
            None => self.auto_rotate = enabled,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn aspect(&self) -> f32 {
        let (w, h) = self.viewport_size;
        if w == 0 || h == 0 {
            1.0
        } else {
            w as f32 / h as f32
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let up = self.orientation * Vec3::Y;
        Mat4::look_at_rh(self.position(), self.target, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_deg * DEG_TO_RAD,
            self.aspect().max(0.001),
            self.near,
            self.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world position; screen y grows downward.
    pub fn project(&self, world: Vec3) -> Projection {
        let clip = self.view_proj() * world.extend(1.0);
        let in_front = clip.w > 0.0;
        let ndc = if in_front {
            clip.truncate() / clip.w
        } else {
            Vec3::splat(f32::INFINITY)
        };
        let (w, h) = self.viewport_size;
        let screen = Vec2::new(
            (ndc.x * 0.5 + 0.5) * w as f32,
            (-ndc.y * 0.5 + 0.5) * h as f32,
        );
        Projection {
            ndc,
            screen,
            in_front,
        }
    }

    /// Screen position of a world point, or `None` when it is behind the eye.
    pub fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let projection = self.project(world);
        projection.in_front.then_some(projection.screen)
    }

    /// Ray from the eye through a pixel of the viewport.
    pub fn ray_through(&self, screen: Vec2) -> Option<Ray> {
        let (w, h) = self.viewport_size;
        let (w, h) = (w.max(1) as f32, h.max(1) as f32);
        let ndc_x = screen.x / w * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y / h * 2.0;

        let inv = self.view_proj().inverse();
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        if !far.is_finite() {
            return None;
        }
        Ray::towards(self.position(), far)
    }

    /// Point the eye along `direction` (target to eye) at the current radius.
    pub(super) fn place_on_sphere(&mut self, direction: Vec3) {
        self.orientation = self.look_rotation(-direction);
    }

    /// Roll-free orientation whose local -Z is `forward`.
    fn look_rotation(&self, forward: Vec3) -> Quat {
        let Some(forward) = forward.try_normalize() else {
            return self.orientation;
        };
        let world_up = self.axes.up_vec();
        let right = forward
            .cross(world_up)
            .try_normalize()
            .or_else(|| (self.orientation * Vec3::X).try_normalize())
            .unwrap_or(Vec3::X);
        let up = right.cross(forward).normalize_or_zero();
        let basis = Mat3::from_cols(right, up, -forward);
        Quat::from_mat3(&basis).normalize()
    }

    /// Clamp distance and polar angle into their configured ranges.
    pub(super) fn enforce_limits(&mut self) {
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        let clamped = self.polar_limits.clamp_direction(&self.axes, self.direction());
        if clamped != Vec3::ZERO {
            self.place_on_sphere(clamped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraController {
        let mut camera = CameraController::new(&CameraSettings::default(), (800, 600));
        camera.look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        camera
    }

    #[test]
    fn look_from_sets_radius_and_direction() {
        let camera = camera();
        assert!((camera.radius() - 10.0).abs() < 1e-5);
        assert!((camera.direction() - Vec3::Z).length() < 1e-5);
        assert!((camera.position() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let camera = camera();
        let projection = camera.project(Vec3::ZERO);
        assert!(projection.in_front);
        assert!((projection.screen - Vec2::new(400.0, 300.0)).length() < 1e-3);

        // +y in the world is up on screen, i.e. smaller pixel y
        let above = camera.world_to_screen(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(above.y < 300.0);
        assert!(camera.world_to_screen(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn ray_through_center_points_at_target() {
        let camera = camera();
        let ray = camera.ray_through(Vec2::new(400.0, 300.0)).unwrap();
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn reset_to_fit_respects_limits() {
        let mut camera = camera();
        let bounds = Aabb::from_center_size(Vec3::ZERO, Vec3::splat(4.0));
        camera.reset_to_fit(&bounds);
        let (min, max) = camera.distance_limits();
        assert!(camera.radius() >= min && camera.radius() <= max);
        let polar = camera.axes().to_spherical(camera.direction()).polar;
        let limits = camera.polar_limits();
        assert!(polar >= limits.min - 1e-4 && polar <= limits.max + 1e-4);
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn auto_rotate_keeps_radius() {
        let mut camera = camera();
        let before = camera.position();
        assert!(camera.update(std::time::Duration::ZERO, 1.0));
        assert!((camera.position() - before).length() > 1e-3);
        assert!((camera.radius() - 10.0).abs() < 1e-4);
    }
}
