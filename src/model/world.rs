use glam::{Mat4, Vec3};
use tracing::{debug, info, trace};

use super::bounds::{Face, Ray};
use super::contour::{trace_contour, ContourParams, Occluder};
use super::object::{ObjectId, ObjectKind, Orientation, WorldObject};
use crate::config::EditorConfig;
use crate::utils::{apparent_distance, snap_to_lattice};

/// Nearest object along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub id: ObjectId,
    pub distance: f32,
    pub point: Vec3,
}

/// Placed objects in insertion order.
///
/// No two objects ever share a position. Cubes snap to the cube lattice;
/// every other object is placed at an exact position derived from a cube.
pub struct World {
    objects: Vec<WorldObject>,
    next_id: u32,
    cube_size: f32,
    sub_object_size: f32,
    contour_params: ContourParams,
}

impl World {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            objects: Vec::new(),
            next_id: 0,
            cube_size: config.cube_size,
            sub_object_size: config.sub_object_size,
            contour_params: ContourParams {
                range: config.contour_range,
                occlusion_limit: config.occlusion_limit,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn lattice_step(&self) -> f32 {
        2.0 * self.cube_size
    }

    pub fn objects(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.iter()
    }

    pub fn cubes(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.iter().filter(|o| o.is_cube())
    }

    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut WorldObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn object_at(&self, position: Vec3) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.position() == position)
    }

    pub fn is_occupied(&self, position: Vec3) -> bool {
        self.object_at(position).is_some()
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, position: Vec3, size: f32, kind: ObjectKind) -> Option<ObjectId> {
        if self.is_occupied(position) {
            trace!("{} at {position} rejected: cell occupied", kind.name());
            return None;
        }
        let id = self.allocate_id();
        info!("placed {} {id} at {position}", kind.name());
        self.objects.push(WorldObject::new(id, position, size, kind));
        Some(id)
    }

    /// Snaps to the cube lattice and inserts a cube there unless the cell is taken.
    pub fn place_cube(&mut self, position: Vec3) -> Option<ObjectId> {
        let position = snap_to_lattice(position, self.lattice_step());
        if self.is_occupied(position) {
            trace!("cube at {position} rejected: cell occupied");
            return None;
        }
        let id = self.allocate_id();
        info!("placed cube {id} at {position}");
        self.objects.push(WorldObject::cube(id, position, self.cube_size));
        self.rebuild_contours();
        Some(id)
    }

    pub fn place_stair(&mut self, position: Vec3, orientation: Orientation) -> Option<ObjectId> {
        self.insert(position, self.cube_size, ObjectKind::Stair { orientation })
    }

    /// Puts a hole on `owner`, replacing its jumper if it has one.
    pub fn place_hole(&mut self, position: Vec3, owner: ObjectId) -> Option<ObjectId> {
        let jumper = self.get(owner)?.as_cube()?.jumper;
        if let Some(jumper) = jumper {
            self.remove_attachment(owner, jumper);
        }
        let id = self.insert(position, self.sub_object_size, ObjectKind::Hole { owner })?;
        if let Some(cube) = self.get_mut(owner).and_then(|o| o.as_cube_mut()) {
            cube.hole = Some(id);
        }
        Some(id)
    }

    /// Puts a jumper on `owner`, replacing its hole if it has one.
    pub fn place_jumper(&mut self, position: Vec3, owner: ObjectId) -> Option<ObjectId> {
        let hole = self.get(owner)?.as_cube()?.hole;
        if let Some(hole) = hole {
            self.remove_attachment(owner, hole);
        }
        let id = self.insert(position, self.sub_object_size, ObjectKind::Jumper { owner })?;
        if let Some(cube) = self.get_mut(owner).and_then(|o| o.as_cube_mut()) {
            cube.jumper = Some(id);
        }
        Some(id)
    }

    pub fn place_actor(&mut self, position: Vec3) -> Option<ObjectId> {
        self.insert(position, self.sub_object_size, ObjectKind::Actor)
    }

    /// Position of a hole, jumper or actor resting on `cube`.
    pub fn top_anchor(&self, cube: ObjectId) -> Option<Vec3> {
        let cube = self.get(cube)?;
        Some(cube.position() + Vec3::Y * cube.size())
    }

    /// Centre of the lattice cell next to `object` across `face`.
    pub fn neighbour_cell(&self, object: ObjectId, face: Face) -> Option<Vec3> {
        let object = self.get(object)?;
        Some(object.position() + face.normal() * 2.0 * object.size())
    }

    fn remove_attachment(&mut self, owner: ObjectId, attachment: ObjectId) {
        self.objects.retain(|o| o.id() != attachment);
        if let Some(cube) = self.get_mut(owner).and_then(|o| o.as_cube_mut()) {
            if cube.hole == Some(attachment) {
                cube.hole = None;
            }
            if cube.jumper == Some(attachment) {
                cube.jumper = None;
            }
        }
        debug!("removed attachment {attachment} from cube {owner}");
    }

    /// Removes an object. Cubes take their hole/jumper with them and every
    /// remaining cube's contour is rebuilt. Unknown ids are ignored.
    pub fn delete(&mut self, id: ObjectId) -> bool {
        let Some(index) = self.objects.iter().position(|o| o.id() == id) else {
            trace!("delete {id} ignored: not in world");
            return false;
        };
        let removed = self.objects.remove(index);
        info!("deleted {} {id}", removed.kind.name());

        match &removed.kind {
            ObjectKind::Cube(cube) => {
                for attachment in [cube.hole, cube.jumper].into_iter().flatten() {
                    self.objects.retain(|o| o.id() != attachment);
                }
                for other in self.objects.iter_mut() {
                    if let Some(c) = other.as_cube_mut() {
                        c.adjacent.retain(|a| *a != id);
                    }
                }
                self.rebuild_contours();
            }
            ObjectKind::Hole { owner } | ObjectKind::Jumper { owner } => {
                if let Some(cube) = self.get_mut(*owner).and_then(|o| o.as_cube_mut()) {
                    if cube.hole == Some(id) {
                        cube.hole = None;
                    }
                    if cube.jumper == Some(id) {
                        cube.jumper = None;
                    }
                }
            }
            ObjectKind::Stair { .. } | ObjectKind::Actor => {}
        }
        true
    }

    /// Turns a stair a quarter turn. Anything else is left alone.
    pub fn rotate_stair(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.get_mut(id) else {
            return false;
        };
        let ObjectKind::Stair { orientation } = &mut object.kind else {
            return false;
        };
        *orientation = orientation.rotated();
        debug!("stair {id} now faces {} degrees", orientation.degrees());
        object.touch();
        true
    }

    /// Replaces the hole `hole_id` with a jumper on the same cube.
    pub fn convert_hole_to_jumper(&mut self, hole_id: ObjectId) -> Option<ObjectId> {
        let hole = self.get(hole_id)?;
        let ObjectKind::Hole { owner } = hole.kind else {
            return None;
        };
        let position = hole.position();
        self.place_jumper(position, owner)
    }

    /// Retraces every cube's contour against a snapshot of all cubes.
    pub fn rebuild_contours(&mut self) {
        let occluders: Vec<Occluder> = self
            .cubes()
            .map(|c| Occluder { id: c.id(), position: c.position(), bounds: c.bounds() })
            .collect();

        for object in self.objects.iter_mut() {
            let (id, position, size) = (object.id(), object.position(), object.size());
            let Some(cube) = object.as_cube_mut() else {
                continue;
            };
            let traced = trace_contour(id, position, size, &occluders, self.contour_params);
            let changed = traced.contour != cube.contour;
            cube.contour = traced.contour;
            cube.adjacent = traced.adjacent;
            if changed {
                object.touch();
            }
        }
        debug!("rebuilt contours for {} cubes", occluders.len());
    }

    /// Closest object hit by `ray`. Ties keep the earlier-inserted object.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for object in &self.objects {
            let Some(distance) = object.intersect(ray) else {
                continue;
            };
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(RayHit { id: object.id(), distance, point: ray.at(distance) });
            }
        }
        best
    }

    /// Screen-space distance for every ordered pair of distinct objects.
    pub fn apparent_distances(&self, view: &Mat4) -> Vec<(ObjectId, ObjectId, f32)> {
        let mut pairs = Vec::with_capacity(self.objects.len() * self.objects.len().saturating_sub(1));
        for a in &self.objects {
            for b in &self.objects {
                if a.id() != b.id() {
                    pairs.push((a.id(), b.id(), apparent_distance(a.position(), b.position(), view)));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::contour::Contour;

    fn world() -> World {
        World::new(&EditorConfig::default())
    }

    fn contour_of(world: &World, id: ObjectId) -> Contour {
        world.get(id).and_then(|o| o.as_cube()).map(|c| c.contour.clone()).expect("cube")
    }

    #[test]
    fn place_cube_snaps_and_rejects_occupied_cells() {
        let mut w = world();
        let a = w.place_cube(Vec3::new(1.0, -1.0, 5.0)).expect("placed");
        assert_eq!(w.get(a).map(|o| o.position()), Some(Vec3::new(0.0, 0.0, 4.0)));
        assert_eq!(w.place_cube(Vec3::new(0.0, 0.0, 4.0)), None);
        assert_eq!(w.place_cube(Vec3::new(-1.5, 1.9, 3.0)), None);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn adjacent_cubes_update_each_other() {
        let mut w = world();
        let a = w.place_cube(Vec3::ZERO).expect("a");
        let rev = w.get(a).map(|o| o.revision()).unwrap_or_default();
        let b = w.place_cube(Vec3::new(4.0, 0.0, 0.0)).expect("b");

        assert_eq!(contour_of(&w, a).visible_edges().count(), 8);
        assert_eq!(contour_of(&w, b).visible_edges().count(), 8);
        assert_eq!(w.get(a).and_then(|o| o.as_cube()).map(|c| c.adjacent.clone()), Some(vec![b]));
        assert!(w.get(a).map(|o| o.revision()).unwrap_or_default() > rev);

        assert!(w.delete(b));
        assert!(contour_of(&w, a).is_full());
        assert!(w.get(a).and_then(|o| o.as_cube()).map(|c| c.adjacent.is_empty()).unwrap_or(false));
        assert!(!w.delete(b), "second delete is a no-op");
    }

    #[test]
    fn hole_and_jumper_are_mutually_exclusive() {
        let mut w = world();
        let cube = w.place_cube(Vec3::ZERO).expect("cube");
        let top = w.top_anchor(cube).expect("anchor");

        let jumper = w.place_jumper(top, cube).expect("jumper");
        let hole = w.place_hole(top, cube).expect("hole replaces jumper");

        assert!(!w.contains(jumper));
        let c = w.get(cube).and_then(|o| o.as_cube()).cloned().expect("cube");
        assert_eq!((c.hole, c.jumper), (Some(hole), None));

        let jumper = w.place_jumper(top, cube).expect("jumper replaces hole");
        let c = w.get(cube).and_then(|o| o.as_cube()).cloned().expect("cube");
        assert_eq!((c.hole, c.jumper), (None, Some(jumper)));
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn second_hole_on_same_cube_is_rejected() {
        let mut w = world();
        let cube = w.place_cube(Vec3::ZERO).expect("cube");
        let top = w.top_anchor(cube).expect("anchor");
        assert!(w.place_hole(top, cube).is_some());
        assert!(w.place_hole(top, cube).is_none());
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn deleting_a_cube_cascades_to_its_attachment() {
        let mut w = world();
        let cube = w.place_cube(Vec3::ZERO).expect("cube");
        let top = w.top_anchor(cube).expect("anchor");
        let hole = w.place_hole(top, cube).expect("hole");

        assert!(w.delete(cube));
        assert!(!w.contains(hole));
        assert!(w.is_empty());
    }

    #[test]
    fn deleting_an_attachment_clears_the_owner() {
        let mut w = world();
        let cube = w.place_cube(Vec3::ZERO).expect("cube");
        let top = w.top_anchor(cube).expect("anchor");
        let jumper = w.place_jumper(top, cube).expect("jumper");

        assert!(w.delete(jumper));
        assert_eq!(w.get(cube).and_then(|o| o.as_cube()).and_then(|c| c.jumper), None);
        // the spot is free again
        assert!(w.place_hole(top, cube).is_some());
    }

    #[test]
    fn rotate_only_turns_stairs() {
        let mut w = world();
        let cube = w.place_cube(Vec3::ZERO).expect("cube");
        let stair = w.place_stair(Vec3::new(0.0, 4.0, 0.0), Orientation::from_quarter_turns(3)).expect("stair");

        assert!(w.rotate_stair(stair));
        assert!(!w.rotate_stair(cube));
        assert!(!w.rotate_stair(ObjectId(99)));
        match w.get(stair).map(|o| &o.kind) {
            Some(ObjectKind::Stair { orientation }) => assert_eq!(orientation.degrees(), 0),
            other => panic!("expected stair, got {other:?}"),
        }
    }

    #[test]
    fn hole_converts_to_jumper() {
        let mut w = world();
        let cube = w.place_cube(Vec3::ZERO).expect("cube");
        let top = w.top_anchor(cube).expect("anchor");
        let hole = w.place_hole(top, cube).expect("hole");

        let jumper = w.convert_hole_to_jumper(hole).expect("converted");
        assert!(!w.contains(hole));
        assert_eq!(w.get(jumper).map(|o| o.position()), Some(top));
        assert_eq!(w.convert_hole_to_jumper(cube), None);
    }

    #[test]
    fn raycast_prefers_nearest_then_first_inserted() {
        let mut w = world();
        let near = w.place_cube(Vec3::new(0.0, 0.0, 4.0)).expect("near");
        let _far = w.place_cube(Vec3::ZERO).expect("far");
        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z);
        let hit = w.raycast(&ray).expect("hit");
        assert_eq!(hit.id, near);
        assert!((hit.distance - 14.0).abs() < 1e-5);

        // a stair sharing a face plane with a cube: equal distance, first inserted wins
        let mut w = world();
        let first = w.place_cube(Vec3::ZERO).expect("cube");
        w.place_stair(Vec3::new(4.0, 0.0, 0.0), Orientation::default()).expect("stair");
        let grazing = Ray::new(Vec3::new(2.0, 0.0, 20.0), Vec3::NEG_Z);
        assert_eq!(w.raycast(&grazing).map(|h| h.id), Some(first));
    }

    #[test]
    fn apparent_distances_cover_every_ordered_pair() {
        let mut w = world();
        w.place_cube(Vec3::ZERO);
        w.place_cube(Vec3::new(4.0, 0.0, 0.0));
        w.place_cube(Vec3::new(0.0, 0.0, 8.0));
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO, Vec3::Y);
        let pairs = w.apparent_distances(&view);
        assert_eq!(pairs.len(), 6);
        // the cube behind the origin along the view axis is on top of it on screen
        assert!(pairs.iter().any(|(_, _, d)| *d < 1e-4));
    }
}
