use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::AxisSystem;

/// Keeps the polar angle away from the poles where the azimuth is undefined.
const POLE_EPS: f32 = 1e-6;

/// Spherical coordinates in the canonical frame (y up).
///
/// `polar` is 0 straight up, PI/2 at the horizon and PI straight down.
/// `azimuth` is measured around the vertical axis from +z towards +x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub polar: f32,
    pub azimuth: f32,
}

impl Spherical {
    pub fn new(radius: f32, polar: f32, azimuth: f32) -> Self {
        Self {
            radius,
            polar,
            azimuth,
        }
    }

    pub fn from_canonical(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            polar: (v.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: v.x.atan2(v.z),
        }
    }

    pub fn to_canonical(self) -> Vec3 {
        let ring = self.polar.sin() * self.radius;
        Vec3::new(
            ring * self.azimuth.sin(),
            self.polar.cos() * self.radius,
            ring * self.azimuth.cos(),
        )
    }

    pub fn make_safe(mut self) -> Self {
        self.polar = self
            .polar
            .clamp(POLE_EPS, std::f32::consts::PI - POLE_EPS);
        self
    }
}

/// Permitted range of the polar angle, in radians from the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for PolarLimits {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: std::f32::consts::PI,
        }
    }
}

impl PolarLimits {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn clamp_angle(&self, polar: f32) -> f32 {
        polar.clamp(self.min, self.max)
    }

    pub fn contains(&self, polar: f32) -> bool {
        polar >= self.min && polar <= self.max
    }

    /// Clamp a direction's polar angle and return it as a unit vector.
    pub fn clamp_direction(&self, axes: &AxisSystem, direction: Vec3) -> Vec3 {
        let mut s = axes.to_spherical(direction);
        s.radius = 1.0;
        s.polar = self.clamp_angle(s.polar);
        axes.from_spherical(s).normalize_or_zero()
    }
}
