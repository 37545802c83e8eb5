mod spherical;

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

pub use spherical::{PolarLimits, Spherical};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisDirection {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSign {
    Positive,
    Negative,
}

impl AxisSign {
    pub const fn scalar(self) -> f32 {
        match self {
            AxisSign::Positive => 1.0,
            AxisSign::Negative => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
    direction: AxisDirection,
    sign: AxisSign,
}

impl Axis {
    pub const fn positive(direction: AxisDirection) -> Self {
        Self {
            direction,
            sign: AxisSign::Positive,
        }
    }

    pub const fn negative(direction: AxisDirection) -> Self {
        Self {
            direction,
            sign: AxisSign::Negative,
        }
    }

    pub fn vector(self) -> Vec3 {
        let base = match self.direction {
            AxisDirection::X => Vec3::X,
            AxisDirection::Y => Vec3::Y,
            AxisDirection::Z => Vec3::Z,
        };
        base * self.sign.scalar()
    }
}

/// Maps the canonical viewer frame (x right, y up, z towards the default
/// viewer) onto world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSystem {
    horizontal: Axis,
    vertical: Axis,
    depth: Axis,
}

impl AxisSystem {
    pub const fn new(horizontal: Axis, vertical: Axis, depth: Axis) -> Self {
        Self {
            horizontal,
            vertical,
            depth,
        }
    }

    pub fn right_vec(&self) -> Vec3 {
        self.horizontal.vector()
    }

    pub fn up_vec(&self) -> Vec3 {
        self.vertical.vector()
    }

    pub fn forward_vec(&self) -> Vec3 {
        self.depth.vector()
    }

    pub fn canonical_basis(&self) -> Mat3 {
        Mat3::from_cols(self.right_vec(), self.up_vec(), self.forward_vec())
    }

    pub fn canonical_to_world(&self, canonical: Vec3) -> Vec3 {
        self.canonical_basis() * canonical
    }

    pub fn world_to_canonical(&self, world: Vec3) -> Vec3 {
        self.canonical_basis().transpose() * world
    }

    /// Spherical coordinates of `world` with the polar angle measured from
    /// the vertical axis.
    pub fn to_spherical(&self, world: Vec3) -> Spherical {
        Spherical::from_canonical(self.world_to_canonical(world))
    }

    pub fn from_spherical(&self, spherical: Spherical) -> Vec3 {
        self.canonical_to_world(spherical.to_canonical())
    }
}

impl Default for AxisSystem {
    fn default() -> Self {
        AxisPreset::default().axis_system()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AxisPreset {
    /// X right, Y up, Z towards the viewer (glTF / WebGL convention)
    #[default]
    YUp,
    /// X right, Z up, -Y towards the viewer
    ZUp,
}

impl AxisPreset {
    pub const fn axis_system(self) -> AxisSystem {
        match self {
            AxisPreset::YUp => AxisSystem::new(
                Axis::positive(AxisDirection::X),
                Axis::positive(AxisDirection::Y),
                Axis::positive(AxisDirection::Z),
            ),
            AxisPreset::ZUp => AxisSystem::new(
                Axis::positive(AxisDirection::X),
                Axis::positive(AxisDirection::Z),
                Axis::negative(AxisDirection::Y),
            ),
        }
    }
}

impl From<AxisPreset> for AxisSystem {
    fn from(value: AxisPreset) -> Self {
        value.axis_system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_up_maps_canonical_up_to_world_z() {
        let axes = AxisSystem::from(AxisPreset::ZUp);
        assert_eq!(axes.canonical_to_world(Vec3::Y), Vec3::Z);
        let back = axes.world_to_canonical(Vec3::Z);
        assert!((back - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn spherical_round_trip_respects_vertical_axis() {
        let axes = AxisSystem::from(AxisPreset::ZUp);
        let world = Vec3::new(1.0, -2.0, 3.0);
        let s = axes.to_spherical(world);
        // polar angle is measured from world Z for this preset
        let expected = (3.0 / world.length()).acos();
        assert!((s.polar - expected).abs() < 1e-5);
        assert!((axes.from_spherical(s) - world).length() < 1e-5);
    }
}
