use crate::controller::input::{InputProcessor, InputState};
use crate::model::{Direction, OrbitCamera};

/// Turns input into orbit camera rotation
pub struct CameraController {
    /// Revolutions per frame while a rotation key is held.
    pub keyboard_step: f32,
}

impl CameraController {
    pub fn new(keyboard_step: f32) -> Self {
        Self { keyboard_step }
    }

    /// Apply a cursor drag of `(dx, dy)` pixels. Each axis is scaled by the
    /// viewport size so a full-width drag is one revolution.
    pub fn apply_drag(&self, camera: &mut OrbitCamera, dx: f32, dy: f32) {
        let (width, height) = camera.viewport();
        let dx = dx / width as f32;
        let dy = dy / height as f32;

        if dx > 0.0 {
            camera.rotate(Direction::Right, dx);
        } else if dx < 0.0 {
            camera.rotate(Direction::Left, dx);
        }
        if dy > 0.0 {
            camera.rotate(Direction::Up, dy);
        } else if dy < 0.0 {
            camera.rotate(Direction::Down, dy);
        }
    }

    /// Rotate by one keyboard step for every held rotation key
    pub fn update_keyboard(&self, camera: &mut OrbitCamera, processor: &InputProcessor, input: &InputState) {
        let step = self.keyboard_step;
        if processor.is_orbiting_up(input) {
            camera.rotate(Direction::Up, -step);
        }
        if processor.is_orbiting_down(input) {
            camera.rotate(Direction::Down, step);
        }
        if processor.is_orbiting_left(input) {
            camera.rotate(Direction::Left, -step);
        }
        if processor.is_orbiting_right(input) {
            camera.rotate(Direction::Right, step);
        }
    }
}
