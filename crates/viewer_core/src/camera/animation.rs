use std::time::Duration;

use glam::{Quat, Vec3};
use tracing::debug;

use super::controller::CameraController;

/// Smooth turn of the eye around a fixed pivot at a fixed distance.
#[derive(Debug, Clone)]
pub(crate) struct OrbitAnimation {
    pivot: Vec3,
    radius: f32,
    start: Vec3,
    end: Vec3,
    rotation: Quat,
    started_at: Duration,
    duration: Duration,
    /// Auto-rotate flag put back once the animation finishes.
    pub(super) resume_auto_rotate: bool,
}

impl OrbitAnimation {
    /// Eased progress and whether the animation has run its course.
    fn progress(&self, now: Duration) -> (f32, bool) {
        if self.duration.is_zero() {
            return (1.0, true);
        }
        let elapsed = now.saturating_sub(self.started_at);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        if t >= 1.0 {
            (1.0, true)
        } else {
            (ease_in_out_cubic(t), false)
        }
    }

    fn direction_at(&self, k: f32) -> Vec3 {
        if k >= 1.0 {
            return self.end;
        }
        let partial = Quat::IDENTITY.slerp(self.rotation, k);
        (partial * self.start).try_normalize().unwrap_or(self.end)
    }
}

/// Cubic ease-in/ease-out on `[0, 1]`.
pub fn ease_in_out_cubic(x: f32) -> f32 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
    }
}

impl CameraController {
    /// Swing the eye around the current target until it looks at the target
    /// from the side of `anchor`, keeping the current distance.
    ///
    /// Auto-rotate is suspended for the duration. Starting a new orbit while
    /// one is running replaces it from the current eye direction.
    pub fn orbit_to(&mut self, anchor: Vec3, now: Duration, duration: Duration) {
        let pivot = self.target;
        let radius = self.radius;

        let current = self.direction();
        let wanted = (anchor - pivot)
            .try_normalize()
            .filter(|d| d.is_finite())
            .unwrap_or(current);

        let start = self.clamped(current);
        let end = self.clamped(wanted);
        let rotation = Quat::from_rotation_arc(start, end);

        let resume_auto_rotate = match self.animation.take() {
            Some(previous) => previous.resume_auto_rotate,
            None => self.auto_rotate,
        };
        self.auto_rotate = false;

        debug!(
            pivot = ?pivot,
            radius,
            duration_ms = duration.as_millis() as u64,
            "orbit started"
        );

        self.animation = Some(OrbitAnimation {
            pivot,
            radius,
            start,
            end,
            rotation,
            started_at: now,
            duration,
            resume_auto_rotate,
        });
    }

    pub(super) fn step_animation(&mut self, now: Duration) -> bool {
        let Some(animation) = self.animation.as_ref() else {
            return false;
        };
        let (k, finished) = animation.progress(now);
        let direction = self.clamped(animation.direction_at(k));

        self.target = animation.pivot;
        self.radius = animation.radius;
        self.place_on_sphere(direction);

        if finished {
            if let Some(done) = self.animation.take() {
                self.auto_rotate = done.resume_auto_rotate;
            }
            debug!("orbit finished");
        }
        true
    }

    fn clamped(&self, direction: Vec3) -> Vec3 {
        let clamped = self.polar_limits.clamp_direction(&self.axes, direction);
        if clamped == Vec3::ZERO {
            direction
        } else {
            clamped
        }
    }
}
