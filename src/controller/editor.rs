use std::time::Duration;

use glam::Vec3;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{ButtonState, InputProcessor, InputState, MouseButton};
use crate::controller::picking::{apply_tool, pick, Edit};
use crate::model::{Menu, ObjectId, OrbitCamera, Tool, World};

/// What the host loop should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Continue,
    Exit,
}

/// Two objects closest together on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentPair {
    pub a: ObjectId,
    pub b: ObjectId,
    pub distance: f32,
}

/// Everything one editing session owns: the world, the camera, the HUD
/// menu and the per-frame click state machine.
pub struct EditorSession {
    pub config: EditorConfig,
    pub world: World,
    pub camera: OrbitCamera,
    pub menu: Menu,
    processor: InputProcessor,
    camera_controller: CameraController,
    paused: bool,
    /// Time the primary button has been held on a menu icon.
    menu_hold: Duration,
    dragging_menu: bool,
    last_edit: Edit,
    closest_pair: Option<ApparentPair>,
}

impl EditorSession {
    pub fn new(config: EditorConfig, width: u32, height: u32) -> Self {
        let mut world = World::new(&config);
        world.place_cube(Vec3::ZERO);
        let camera = OrbitCamera::new(config.orbit_radius, width, height);
        let camera_controller = CameraController::new(config.keyboard_rotation_step);
        info!("editor session started with {}x{} viewport", width, height);
        Self {
            world,
            camera,
            menu: Menu::new(width, height),
            processor: InputProcessor::default(),
            camera_controller,
            paused: false,
            menu_hold: Duration::ZERO,
            dragging_menu: false,
            last_edit: Edit::Nothing,
            closest_pair: None,
            config,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.menu.resize(width, height);
        debug!("viewport resized to {}x{}", width, height);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn last_edit(&self) -> Edit {
        self.last_edit
    }

    pub fn closest_pair(&self) -> Option<ApparentPair> {
        self.closest_pair
    }

    pub fn active_tool(&self) -> Tool {
        self.menu.selected()
    }

    fn inside_viewport(&self, x: f32, y: f32) -> bool {
        let (width, height) = self.camera.viewport();
        x > 0.0 && x < width as f32 && y > 0.0 && y < height as f32
    }

    /// One frame of input handling. `input` must hold this frame's state; the
    /// caller ends the input frame afterwards.
    pub fn update(&mut self, input: &InputState, dt: Duration) -> EditorAction {
        if self.processor.is_escape(input) {
            info!("escape pressed, exiting");
            return EditorAction::Exit;
        }

        self.camera_controller.update_keyboard(&mut self.camera, &self.processor, input);

        if !self.paused && self.update_mouse(input, dt) == EditorAction::Exit {
            return EditorAction::Exit;
        }

        if self.processor.wants_to_toggle_pause(input) {
            self.paused = !self.paused;
            info!("paused: {}", self.paused);
        }

        self.closest_pair = self.find_closest_pair();
        EditorAction::Continue
    }

    fn update_mouse(&mut self, input: &InputState, dt: Duration) -> EditorAction {
        let (x, y) = input.cursor();
        let left = input.button(MouseButton::Left);
        let right = input.button(MouseButton::Right);

        if !right.is_down() {
            self.menu.hover(x, y);
        }

        if left.is_down() && self.inside_viewport(x, y) {
            if self.menu.icon_at(x, y).is_some() {
                self.menu_hold += dt;
                if left == ButtonState::Pressed {
                    self.menu.grab(x, y);
                }
            }
            if left == ButtonState::Held && self.menu.is_grabbed() && self.menu_hold > self.config.menu_drag_hold {
                self.dragging_menu = true;
                self.menu.drag_to(x, y);
            }
        }

        if left == ButtonState::Released {
            let dragged = std::mem::take(&mut self.dragging_menu);
            self.menu_hold = Duration::ZERO;
            self.menu.release();

            if self.inside_viewport(x, y) && self.handle_click(x, y, dragged, right.is_down()) == EditorAction::Exit {
                return EditorAction::Exit;
            }
        }

        if right == ButtonState::Held {
            let (dx, dy) = input.cursor_delta();
            self.camera_controller.apply_drag(&mut self.camera, dx, dy);
        }

        EditorAction::Continue
    }

    fn handle_click(&mut self, x: f32, y: f32, dragged: bool, rotating: bool) -> EditorAction {
        // a release that ends a menu drag is never a click, wherever the cursor ended up
        if dragged {
            debug!("menu drag released at ({x}, {y})");
            return EditorAction::Continue;
        }
        if self.menu.icon_at(x, y).is_some() {
            // clicks on the menu never reach the world
            if self.menu.click(x, y) == Some(Tool::Exit) {
                info!("exit selected from menu");
                return EditorAction::Exit;
            }
            return EditorAction::Continue;
        }
        if rotating {
            return EditorAction::Continue;
        }

        let hit = pick(&self.world, &self.camera, x, y);
        let camera = &self.camera;
        self.last_edit = apply_tool(
            &mut self.world,
            self.menu.selected(),
            hit,
            self.config.hole_click_with_jump,
            || camera.cursor_depth_point(x, y),
        );
        debug!("click at ({x}, {y}) with {:?}: {:?}", self.menu.selected(), self.last_edit);
        EditorAction::Continue
    }

    fn find_closest_pair(&self) -> Option<ApparentPair> {
        self.world
            .apparent_distances(&self.camera.view())
            .into_iter()
            .map(|(a, b, distance)| ApparentPair { a, b, distance })
            .min_by(|p, q| p.distance.total_cmp(&q.distance))
    }
}
