use glam::Vec2;

use super::controller::CameraController;

/// Pointer drag in progress. Rotation only begins once the pointer has
/// travelled past the click distance, so short presses stay clicks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DragState {
    origin: Vec2,
    last: Vec2,
    rotating: bool,
}

impl CameraController {
    pub fn begin_drag(&mut self, position: Vec2) {
        self.drag = Some(DragState {
            origin: position,
            last: position,
            rotating: false,
        });
    }

    /// Feed a pointer position into the active drag. Returns true on the call
    /// where the drag first exceeds `threshold` pixels and rotation starts.
    pub fn drag_to(&mut self, position: Vec2, threshold: f32) -> bool {
        let Some(mut drag) = self.drag else {
            return false;
        };

        let mut started = false;
        if !drag.rotating && position.distance(drag.origin) > threshold {
            drag.rotating = true;
            started = true;
        }

        if drag.rotating && self.animation.is_none() {
            self.orbit_turntable(position - drag.last);
        }
        drag.last = position;
        self.drag = Some(drag);
        started
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some_and(|d| d.rotating)
    }

    /// Dolly towards or away from the target. Ignored during an orbit animation.
    pub fn zoom(&mut self, amount: f32) {
        if self.animation.is_some() {
            return;
        }
        let direction = if self.invert_zoom { 1.0 } else { -1.0 };
        let delta = amount * direction * self.zoom_sensitivity;
        self.radius = (self.radius + delta).clamp(self.min_distance, self.max_distance);
    }

    /// Horizontal drag spins around the vertical axis, vertical drag tilts.
    /// A drag across the full viewport height is one full turn.
    fn orbit_turntable(&mut self, delta: Vec2) {
        let height = self.viewport_size.1.max(1) as f32;
        let turn = std::f32::consts::TAU * self.rotate_speed / height;
        self.rotate_spherical(-delta.x * turn, -delta.y * turn);
    }

    /// Move the eye over the sphere, then clamp into the configured limits.
    pub(super) fn rotate_spherical(&mut self, d_azimuth: f32, d_polar: f32) {
        let mut s = self.axes.to_spherical(self.direction());
        s.radius = 1.0;
        s.azimuth += d_azimuth;
        s.polar = self.polar_limits.clamp_angle(s.polar + d_polar);
        let s = s.make_safe();
        if let Some(direction) = self.axes.from_spherical(s).try_normalize() {
            self.place_on_sphere(direction);
        }
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use settings::CameraSettings;

    use super::*;

    fn camera() -> CameraController {
        let settings = CameraSettings {
            auto_rotate: false,
            ..CameraSettings::default()
        };
        let mut camera = CameraController::new(&settings, (800, 600));
        camera.look_from(Vec3::new(0.0, 3.0, 4.0), Vec3::ZERO);
        camera
    }

    #[test]
    fn short_drag_does_not_rotate() {
        let mut camera = camera();
        let before = camera.direction();
        camera.begin_drag(Vec2::new(100.0, 100.0));
        assert!(!camera.drag_to(Vec2::new(103.0, 102.0), 6.0));
        assert!(!camera.is_dragging());
        assert!((camera.direction() - before).length() < 1e-6);
    }

    #[test]
    fn long_drag_starts_once_and_rotates() {
        let mut camera = camera();
        let before = camera.direction();
        camera.begin_drag(Vec2::new(100.0, 100.0));
        assert!(camera.drag_to(Vec2::new(140.0, 100.0), 6.0));
        assert!(!camera.drag_to(Vec2::new(180.0, 100.0), 6.0));
        assert!(camera.is_dragging());
        assert!((camera.direction() - before).length() > 1e-3);
        assert!((camera.radius() - 5.0).abs() < 1e-4);
        camera.end_drag();
        assert!(!camera.is_dragging());
    }

    #[test]
    fn vertical_drag_stays_within_polar_limits() {
        let mut camera = camera();
        camera.begin_drag(Vec2::ZERO);
        camera.drag_to(Vec2::new(0.0, 5000.0), 6.0);
        let polar = camera.axes().to_spherical(camera.direction()).polar;
        let limits = camera.polar_limits();
        assert!(polar >= limits.min - 1e-4 && polar <= limits.max + 1e-4);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = camera();
        camera.zoom(1000.0);
        assert_eq!(camera.radius(), camera.distance_limits().0);
        camera.zoom(-1000.0);
        assert_eq!(camera.radius(), camera.distance_limits().1);
    }
}
