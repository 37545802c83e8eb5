mod animation;
mod controller;
mod orbit;

pub use animation::ease_in_out_cubic;
pub use controller::{CameraController, Projection};
