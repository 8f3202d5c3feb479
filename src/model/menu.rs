use glam::Vec2;

/// Tool picked from the HUD. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    PlaceCube,
    PlaceHole,
    PlaceJump,
    PlaceStair,
    PlaceActor,
    Delete,
    Exit,
    None,
}

impl Tool {
    /// Icon order, top to bottom.
    pub const ICONS: [Tool; 7] = [
        Tool::PlaceCube,
        Tool::PlaceHole,
        Tool::PlaceJump,
        Tool::PlaceStair,
        Tool::PlaceActor,
        Tool::Delete,
        Tool::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tool::PlaceCube => "Block",
            Tool::PlaceHole => "Hole",
            Tool::PlaceJump => "Jump",
            Tool::PlaceStair => "Stair",
            Tool::PlaceActor => "Actor",
            Tool::Delete => "Delete",
            Tool::Exit => "Exit",
            Tool::None => "",
        }
    }
}

/// Screen rectangle in pixels. Left/top edges are inside, right/bottom are not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Vertical strip of tool icons that can be dragged around the viewport.
#[derive(Debug, Clone)]
pub struct Menu {
    position: Vec2,
    viewport: Vec2,
    icon_size: Vec2,
    selected: Tool,
    hovered: Option<Tool>,
    /// Cursor position relative to the menu origin while grabbed.
    grab_offset: Option<Vec2>,
}

impl Menu {
    pub fn new(width: u32, height: u32) -> Self {
        let viewport = Vec2::new(width as f32, height as f32);
        let icon_size = Self::icon_size_for(viewport);
        Self {
            position: Vec2::new(0.0, icon_size.y),
            viewport,
            icon_size,
            selected: Tool::PlaceCube,
            hovered: None,
            grab_offset: None,
        }
    }

    fn icon_size_for(viewport: Vec2) -> Vec2 {
        let columns = Tool::ICONS.len() as f32 + 5.0;
        let rows = Tool::ICONS.len() as f32 + 2.0;
        Vec2::new((viewport.x / columns).floor(), (viewport.y / rows).floor())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
        self.icon_size = Self::icon_size_for(self.viewport);
        self.position = self.clamped(self.position);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn selected(&self) -> Tool {
        self.selected
    }

    pub fn hovered(&self) -> Option<Tool> {
        self.hovered
    }

    pub fn is_grabbed(&self) -> bool {
        self.grab_offset.is_some()
    }

    pub fn rect(&self, index: usize) -> Rect {
        Rect {
            x: self.position.x.floor(),
            y: self.position.y.floor() + self.icon_size.y * index as f32,
            width: self.icon_size.x,
            height: self.icon_size.y,
        }
    }

    pub fn icons(&self) -> impl Iterator<Item = (Tool, Rect)> + '_ {
        Tool::ICONS.iter().enumerate().map(|(i, tool)| (*tool, self.rect(i)))
    }

    /// Whole strip, for consuming clicks that land on the menu.
    pub fn bounds(&self) -> Rect {
        let first = self.rect(0);
        Rect { height: self.icon_size.y * Tool::ICONS.len() as f32, ..first }
    }

    /// Icon under the cursor, without side effects.
    pub fn icon_at(&self, x: f32, y: f32) -> Option<Tool> {
        self.icons().find(|(_, r)| r.contains(x, y)).map(|(t, _)| t)
    }

    pub fn hover(&mut self, x: f32, y: f32) {
        self.hovered = self.icon_at(x, y);
    }

    /// Selects the icon under the cursor, if any, and returns it.
    pub fn click(&mut self, x: f32, y: f32) -> Option<Tool> {
        let tool = self.icon_at(x, y)?;
        self.selected = tool;
        Some(tool)
    }

    pub fn is_highlighted(&self, tool: Tool) -> bool {
        self.selected == tool || self.hovered == Some(tool)
    }

    /// Starts a drag with the cursor at `(x, y)`.
    pub fn grab(&mut self, x: f32, y: f32) {
        self.grab_offset = Some(Vec2::new(x, y) - self.position);
    }

    pub fn release(&mut self) {
        self.grab_offset = None;
    }

    /// Moves a grabbed menu so the grab point follows the cursor.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        if let Some(offset) = self.grab_offset {
            self.position = self.clamped(Vec2::new(x, y) - offset);
        }
    }

    fn clamped(&self, position: Vec2) -> Vec2 {
        let max = Vec2::new(
            self.viewport.x - self.icon_size.x,
            self.viewport.y - self.icon_size.y * Tool::ICONS.len() as f32,
        )
        .max(Vec2::ZERO);
        position.clamp(Vec2::ZERO, max)
    }
}
