use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Mat4, Vec3};

use super::bounds::{Aabb, Face, Ray};
use super::contour::Contour;
use crate::utils::{Mesh, Vertex};

const CUBE_COLOR: [f32; 4] = [0.83, 0.83, 0.83, 1.0];
const CONTOUR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const STAIR_COLOR: [f32; 4] = [0.72, 0.62, 0.48, 1.0];
const HOLE_COLOR: [f32; 4] = [0.05, 0.05, 0.08, 1.0];
const JUMPER_COLOR: [f32; 4] = [0.85, 0.25, 0.2, 1.0];
const ACTOR_COLOR: [f32; 4] = [0.2, 0.45, 0.85, 1.0];

/// Stable handle of a placed object. Never reused within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Yaw of a stair in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Orientation(u8);

impl Orientation {
    pub fn from_quarter_turns(turns: u8) -> Self {
        Self(turns % 4)
    }

    pub fn quarter_turns(self) -> u8 {
        self.0
    }

    pub fn degrees(self) -> u32 {
        self.0 as u32 * 90
    }

    pub fn radians(self) -> f32 {
        self.0 as f32 * FRAC_PI_2
    }

    /// Advances by 90 degrees, wrapping at 360.
    pub fn rotated(self) -> Self {
        Self((self.0 + 1) % 4)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub hole: Option<ObjectId>,
    pub jumper: Option<ObjectId>,
    /// Cubes that were within contour range at the last contour rebuild.
    pub adjacent: Vec<ObjectId>,
    pub contour: Contour,
}

impl Cube {
    fn new() -> Self {
        Self {
            hole: None,
            jumper: None,
            adjacent: Vec::new(),
            contour: Contour::full(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Cube(Cube),
    Stair { orientation: Orientation },
    Hole { owner: ObjectId },
    Jumper { owner: ObjectId },
    Actor,
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Cube(_) => "cube",
            ObjectKind::Stair { .. } => "stair",
            ObjectKind::Hole { .. } => "hole",
            ObjectKind::Jumper { .. } => "jumper",
            ObjectKind::Actor => "actor",
        }
    }

    /// Bounding box in unscaled local space.
    pub fn local_bounds(&self) -> Aabb {
        match self {
            ObjectKind::Cube(_) | ObjectKind::Stair { .. } => {
                Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
            }
            ObjectKind::Hole { .. } => Aabb::new(Vec3::new(-0.8, 0.0, -0.8), Vec3::new(0.8, 0.05, 0.8)),
            ObjectKind::Jumper { .. } => Aabb::new(Vec3::new(-0.7, 0.0, -0.7), Vec3::new(0.7, 0.3, 0.7)),
            ObjectKind::Actor => Aabb::new(Vec3::new(-0.4, 0.0, -0.4), Vec3::new(0.4, 1.8, 0.4)),
        }
    }
}

/// An entity placed in the world. Never moves once placed.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    id: ObjectId,
    position: Vec3,
    size: f32,
    world_bounds: Aabb,
    /// Bumped whenever the renderable geometry changes.
    revision: u64,
    pub kind: ObjectKind,
}

impl WorldObject {
    pub(crate) fn new(id: ObjectId, position: Vec3, size: f32, kind: ObjectKind) -> Self {
        let world_bounds = kind.local_bounds().transformed(size, position);
        Self { id, position, size, world_bounds, revision: 0, kind }
    }

    pub(crate) fn cube(id: ObjectId, position: Vec3, size: f32) -> Self {
        Self::new(id, position, size, ObjectKind::Cube(Cube::new()))
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    /// Scale then translate; stairs additionally rotate about their vertical axis.
    pub fn world_transform(&self) -> Mat4 {
        let rotation = match self.kind {
            ObjectKind::Stair { orientation } => Mat4::from_rotation_y(orientation.radians()),
            _ => Mat4::IDENTITY,
        };
        Mat4::from_translation(self.position) * rotation * Mat4::from_scale(Vec3::splat(self.size))
    }

    /// World-space bounding box, cached at creation since objects never move.
    pub fn bounds(&self) -> Aabb {
        self.world_bounds
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.world_bounds.intersect(ray)
    }

    /// Face of this object's bounding box that `point` lies on.
    pub fn face_at(&self, point: Vec3) -> Option<Face> {
        self.world_bounds.face_of(point)
    }

    pub fn as_cube(&self) -> Option<&Cube> {
        match &self.kind {
            ObjectKind::Cube(cube) => Some(cube),
            _ => None,
        }
    }

    pub(crate) fn as_cube_mut(&mut self) -> Option<&mut Cube> {
        match &mut self.kind {
            ObjectKind::Cube(cube) => Some(cube),
            _ => None,
        }
    }

    pub fn is_cube(&self) -> bool {
        matches!(self.kind, ObjectKind::Cube(_))
    }

    /// Filled geometry in world space.
    pub fn solid_mesh(&self) -> Mesh {
        let mut mesh = Mesh::empty();
        match &self.kind {
            ObjectKind::Cube(_) => {
                mesh.push_box(Vec3::splat(-1.0), Vec3::splat(1.0), CUBE_COLOR);
            }
            ObjectKind::Stair { .. } => {
                // two steps rising towards -X before rotation
                mesh.push_box(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 0.0, 1.0), STAIR_COLOR);
                mesh.push_box(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 1.0), STAIR_COLOR);
            }
            ObjectKind::Hole { .. } => {
                let b = self.kind.local_bounds();
                mesh.push_box(b.min, b.max, HOLE_COLOR);
            }
            ObjectKind::Jumper { .. } => {
                mesh.push_box(Vec3::new(-0.7, 0.0, -0.7), Vec3::new(0.7, 0.1, 0.7), JUMPER_COLOR);
                mesh.push_box(Vec3::new(-0.3, 0.1, -0.3), Vec3::new(0.3, 0.3, 0.3), JUMPER_COLOR);
            }
            ObjectKind::Actor => {
                let b = self.kind.local_bounds();
                mesh.push_box(b.min, b.max, ACTOR_COLOR);
            }
        }
        mesh.transform(&self.world_transform());
        mesh
    }

    /// Visible wireframe of a cube in world space as a line list.
    pub fn contour_mesh(&self) -> Option<Mesh> {
        let cube = self.as_cube()?;
        let world = self.world_transform();
        let vertices = cube
            .contour
            .vertices
            .iter()
            .map(|v| Vertex { pos: world.transform_point3(*v).to_array(), color: CONTOUR_COLOR })
            .collect();
        let indices = cube.contour.edges.iter().flat_map(|e| [e.start as u32, e.end as u32]).collect();
        Some(Mesh { vertices, indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_wraps_after_four_turns() {
        let mut o = Orientation::default();
        let seen: Vec<u32> = (0..5).map(|_| { o = o.rotated(); o.degrees() }).collect();
        assert_eq!(seen, vec![90, 180, 270, 0, 90]);
        assert_eq!(Orientation::from_quarter_turns(7).quarter_turns(), 3);
    }

    #[test]
    fn cube_bounds_follow_size_and_position() {
        let cube = WorldObject::cube(ObjectId(1), Vec3::new(4.0, 0.0, -8.0), 2.0);
        assert_eq!(cube.bounds().min, Vec3::new(2.0, -2.0, -10.0));
        assert_eq!(cube.bounds().max, Vec3::new(6.0, 2.0, -6.0));
        assert_eq!(cube.face_at(Vec3::new(4.0, 2.0, -8.0)), Some(Face::Up));
    }

    #[test]
    fn every_kind_has_a_face_policy() {
        let kinds = [
            ObjectKind::Stair { orientation: Orientation::default() },
            ObjectKind::Hole { owner: ObjectId(0) },
            ObjectKind::Jumper { owner: ObjectId(0) },
            ObjectKind::Actor,
        ];
        for kind in kinds {
            let object = WorldObject::new(ObjectId(9), Vec3::ZERO, 1.0, kind);
            let top = Vec3::new(0.0, object.bounds().max.y, 0.0);
            assert_eq!(object.face_at(top), Some(Face::Up), "{}", object.kind.name());
            assert!(!object.solid_mesh().is_empty());
            assert!(object.contour_mesh().is_none());
        }
    }

    #[test]
    fn stair_mesh_rotates_with_orientation() {
        let flat = WorldObject::new(ObjectId(1), Vec3::ZERO, 1.0, ObjectKind::Stair { orientation: Orientation::default() });
        let turned = WorldObject::new(
            ObjectId(2),
            Vec3::ZERO,
            1.0,
            ObjectKind::Stair { orientation: Orientation::from_quarter_turns(2) },
        );
        // the upper step sits on opposite sides after a half turn
        let top_x = |o: &WorldObject| o.solid_mesh().vertices[8..].iter().map(|v| v.pos[0]).sum::<f32>();
        assert!(top_x(&flat) < 0.0);
        assert!(top_x(&turned) > 0.0);
    }
}
