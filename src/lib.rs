// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::{EditorConfig, HoleJumpPolicy, RejectedOverride};
pub use controller::{EditorAction, EditorSession};
pub use model::{ObjectId, World};
