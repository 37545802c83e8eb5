use std::time::Duration;

use glam::Vec2;
use tracing::debug;
use viewer_core::ViewerContext;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent},
    keyboard::Key,
};

/// Translates window events into viewer calls.
pub struct ShellInput {
    cursor: Option<Vec2>,
    /// Entity names in CMS order; number keys orbit to them.
    orbit_list: Vec<String>,
}

impl ShellInput {
    pub fn new(orbit_list: Vec<String>) -> Self {
        Self {
            cursor: None,
            orbit_list,
        }
    }

    /// Returns true when the event may have changed what is on screen.
    pub fn handle_event(
        &mut self,
        viewer: &mut ViewerContext,
        event: &WindowEvent,
        now: Duration,
    ) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.cursor = Some(position);
                viewer.pointer_move(position);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                viewer.pointer_leave();
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let Some(position) = self.cursor else {
                    return false;
                };
                match state {
                    ElementState::Pressed => viewer.pointer_down(position),
                    ElementState::Released => viewer.pointer_up(position),
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                viewer.zoom(amount);
                true
            }
            WindowEvent::Touch(touch) => self.handle_touch(viewer, touch),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Character(text),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_shortcut(viewer, text.as_str(), now),
            WindowEvent::Resized(size) => {
                viewer.set_viewport(size.width.max(1), size.height.max(1));
                true
            }
            _ => false,
        }
    }

    fn handle_touch(&mut self, viewer: &mut ViewerContext, touch: &Touch) -> bool {
        let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
        match touch.phase {
            TouchPhase::Started => {
                self.cursor = Some(position);
                viewer.pointer_down(position);
            }
            TouchPhase::Moved => {
                self.cursor = Some(position);
                viewer.pointer_move(position);
            }
            TouchPhase::Ended => {
                viewer.pointer_up(position);
                viewer.pointer_leave();
                self.cursor = None;
            }
            TouchPhase::Cancelled => {
                viewer.pointer_cancel();
                self.cursor = None;
            }
        }
        true
    }

    fn handle_shortcut(&mut self, viewer: &mut ViewerContext, key: &str, now: Duration) -> bool {
        match key {
            "o" | "O" => {
                viewer.toggle_overlay();
                true
            }
            digit => {
                let Some(index) = digit
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=9).contains(n))
                else {
                    return false;
                };
                match self.orbit_list.get(index - 1) {
                    Some(name) => viewer.orbit_to(name, now),
                    None => {
                        debug!(index, "no entity bound to shortcut");
                        false
                    }
                }
            }
        }
    }
}
