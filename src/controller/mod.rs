// CONTROLLER: input, camera and editing logic
pub mod input;
pub mod camera_controller;
pub mod picking;
pub mod editor;

pub use input::{ButtonState, InputEvent, InputProcessor, InputState, KeyBindings, MouseButton};
pub use camera_controller::CameraController;
pub use picking::{apply_tool, pick, Edit};
pub use editor::{ApparentPair, EditorAction, EditorSession};
