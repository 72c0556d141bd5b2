use nalgebra::Vector2;
use winit::{
    event::{ElementState, MouseButton},
    keyboard::KeyCode,
};

use crate::camera::CameraMovement;

/// Something a key press asks the application to do, beyond moving the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleWireframe,
    Quit,
}

/// Keyboard & mouse state, accumulated between frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Right mouse button held; the camera only turns while this is set
    pub looking: bool,
    mouse_delta: Vector2<f64>,
}

impl InputState {
    /// Update held keys; returns a [Command] for keys that trigger one on press.
    pub fn key(&mut self, key: KeyCode, state: ElementState) -> Option<Command> {
        let pressed = state.is_pressed();
        match key {
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.backward = pressed,
            KeyCode::KeyA => self.left = pressed,
            KeyCode::KeyD => self.right = pressed,
            KeyCode::Tab if pressed => return Some(Command::ToggleWireframe),
            KeyCode::Escape if pressed => return Some(Command::Quit),
            _ => {}
        }
        None
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Right {
            self.looking = state.is_pressed();
        }
    }

    /// Raw mouse motion, in device units. Ignored unless [looking](Self::looking).
    pub fn mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.looking {
            self.mouse_delta += Vector2::new(dx, dy);
        }
    }

    /// Motion accumulated since the last call.
    pub fn take_mouse_delta(&mut self) -> Vector2<f64> {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Movements for every held direction key.
    pub fn movements(&self) -> impl Iterator<Item = CameraMovement> + '_ {
        [
            (self.forward, CameraMovement::Forward),
            (self.backward, CameraMovement::Backward),
            (self.left, CameraMovement::Left),
            (self.right, CameraMovement::Right),
        ]
        .into_iter()
        .filter_map(|(held, m)| held.then_some(m))
    }

    /// Forget held keys and buttons, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ElementState::{Pressed, Released};

    #[test]
    fn held_keys() {
        let mut input = InputState::default();
        assert_eq!(input.key(KeyCode::KeyW, Pressed), None);
        assert_eq!(input.key(KeyCode::KeyD, Pressed), None);
        assert_eq!(
            input.movements().collect::<Vec<_>>(),
            [CameraMovement::Forward, CameraMovement::Right]
        );
        input.key(KeyCode::KeyW, Released);
        assert_eq!(input.movements().collect::<Vec<_>>(), [CameraMovement::Right]);
    }

    #[test]
    fn commands_on_press_only() {
        let mut input = InputState::default();
        assert_eq!(input.key(KeyCode::Tab, Pressed), Some(Command::ToggleWireframe));
        assert_eq!(input.key(KeyCode::Tab, Released), None);
        assert_eq!(input.key(KeyCode::Escape, Pressed), Some(Command::Quit));
    }

    #[test]
    fn mouse_only_while_looking() {
        let mut input = InputState::default();
        input.mouse_motion(5.0, 5.0);
        assert_eq!(input.take_mouse_delta(), Vector2::zeros());

        input.mouse_button(MouseButton::Right, Pressed);
        input.mouse_motion(3.0, -1.0);
        input.mouse_motion(2.0, 4.0);
        assert_eq!(input.take_mouse_delta(), Vector2::new(5.0, 3.0));
        // consumed
        assert_eq!(input.take_mouse_delta(), Vector2::zeros());

        input.mouse_button(MouseButton::Left, Released);
        assert!(input.looking);
        input.mouse_button(MouseButton::Right, Released);
        assert!(!input.looking);
    }

    #[test]
    fn release_all() {
        let mut input = InputState::default();
        input.key(KeyCode::KeyA, Pressed);
        input.mouse_button(MouseButton::Right, Pressed);
        input.mouse_motion(1.0, 1.0);
        input.release_all();
        assert_eq!(input, InputState::default());
    }
}
