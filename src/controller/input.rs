/// Platform-agnostic input handling with edge-triggered queries
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    CursorMoved { x: f32, y: f32 },
    MouseButton { button: MouseButton, is_down: bool },

    // Window events
    FocusLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Transition of a key or button between the previous and the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Up,
    Pressed,
    Held,
    Released,
}

impl ButtonState {
    pub fn from_frames(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => ButtonState::Pressed,
            (true, true) => ButtonState::Held,
            (true, false) => ButtonState::Released,
            (false, false) => ButtonState::Up,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Held)
    }
}

/// Current and previous frame of keyboard and mouse state.
///
/// Events are folded into the current frame as they arrive;
/// [`InputState::end_frame`] copies it into the previous frame once the
/// update step has consumed it.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashSet<String>,
    previous_keys: HashSet<String>,
    buttons: HashSet<MouseButton>,
    previous_buttons: HashSet<MouseButton>,
    cursor: (f32, f32),
    previous_cursor: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.keys.insert(key.clone());
            }
            InputEvent::KeyUp(key) => {
                self.keys.remove(key.as_str());
            }
            InputEvent::CursorMoved { x, y } => {
                self.cursor = (*x, *y);
            }
            InputEvent::MouseButton { button, is_down } => {
                if *is_down {
                    self.buttons.insert(*button);
                } else {
                    self.buttons.remove(button);
                }
            }
            InputEvent::FocusLost => {
                self.keys.clear();
                self.buttons.clear();
            }
        }
    }

    pub fn key(&self, key: &str) -> ButtonState {
        ButtonState::from_frames(self.previous_keys.contains(key), self.keys.contains(key))
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn button(&self, button: MouseButton) -> ButtonState {
        ButtonState::from_frames(self.previous_buttons.contains(&button), self.buttons.contains(&button))
    }

    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    /// Cursor motion since the previous frame, in pixels.
    pub fn cursor_delta(&self) -> (f32, f32) {
        (self.cursor.0 - self.previous_cursor.0, self.cursor.1 - self.previous_cursor.1)
    }

    pub fn end_frame(&mut self) {
        self.previous_keys.clone_from(&self.keys);
        self.previous_buttons.clone_from(&self.buttons);
        self.previous_cursor = self.cursor;
    }
}

/// Key mapping configuration
#[derive(Clone)]
pub struct KeyBindings {
    pub orbit_up: [String; 2],
    pub orbit_down: [String; 2],
    pub orbit_left: [String; 2],
    pub orbit_right: [String; 2],
    pub pause: String,
    pub escape: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            orbit_up: ["KeyW".to_string(), "ArrowUp".to_string()],
            orbit_down: ["KeyS".to_string(), "ArrowDown".to_string()],
            orbit_left: ["KeyA".to_string(), "ArrowLeft".to_string()],
            orbit_right: ["KeyD".to_string(), "ArrowRight".to_string()],
            pause: "KeyP".to_string(),
            escape: "Escape".to_string(),
        }
    }
}

/// High-level input processor
#[derive(Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    fn any_down(input: &InputState, keys: &[String]) -> bool {
        keys.iter().any(|k| input.is_key_down(k))
    }

    pub fn is_orbiting_up(&self, input: &InputState) -> bool {
        Self::any_down(input, &self.bindings.orbit_up)
    }

    pub fn is_orbiting_down(&self, input: &InputState) -> bool {
        Self::any_down(input, &self.bindings.orbit_down)
    }

    pub fn is_orbiting_left(&self, input: &InputState) -> bool {
        Self::any_down(input, &self.bindings.orbit_left)
    }

    pub fn is_orbiting_right(&self, input: &InputState) -> bool {
        Self::any_down(input, &self.bindings.orbit_right)
    }

    pub fn wants_to_toggle_pause(&self, input: &InputState) -> bool {
        input.key(&self.bindings.pause) == ButtonState::Pressed
    }

    pub fn is_escape(&self, input: &InputState) -> bool {
        input.key(&self.bindings.escape) == ButtonState::Pressed
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use winit::event::{ElementState, MouseButton as WinitButton};
    use winit::keyboard::PhysicalKey;

    /// Physical key names as reported by `KeyCode`'s debug form ("KeyW", "ArrowUp").
    pub fn keyboard_event_to_input(key: PhysicalKey, state: ElementState) -> Option<InputEvent> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        let name = format!("{code:?}");
        Some(match state {
            ElementState::Pressed => InputEvent::KeyDown(name),
            ElementState::Released => InputEvent::KeyUp(name),
        })
    }

    pub fn mouse_button_to_input(button: WinitButton, state: ElementState) -> Option<InputEvent> {
        let button = match button {
            WinitButton::Left => MouseButton::Left,
            WinitButton::Right => MouseButton::Right,
            WinitButton::Middle => MouseButton::Middle,
            _ => return None,
        };
        Some(InputEvent::MouseButton { button, is_down: state == ElementState::Pressed })
    }
}
