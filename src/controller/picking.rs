use glam::Vec3;
use tracing::debug;

use crate::config::HoleJumpPolicy;
use crate::model::{Face, ObjectId, ObjectKind, OrbitCamera, Orientation, RayHit, Tool, World};

/// What a world click ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Placed(ObjectId),
    Rotated(ObjectId),
    Deleted(ObjectId),
    Nothing,
}

impl Edit {
    fn placed(id: Option<ObjectId>) -> Self {
        id.map_or(Edit::Nothing, Edit::Placed)
    }
}

/// Nearest object under the pixel `(x, y)`.
pub fn pick(world: &World, camera: &OrbitCamera, x: f32, y: f32) -> Option<RayHit> {
    world.raycast(&camera.cursor_ray(x, y))
}

/// Stair yaw when placed against `face`; faces it down the slope towards the clicked cube.
pub fn stair_orientation(face: Face) -> Orientation {
    let turns = match face {
        Face::Front => 1,
        Face::Back => 3,
        Face::Right => 2,
        Face::Left | Face::Up | Face::Down => 0,
    };
    Orientation::from_quarter_turns(turns)
}

/// Applies `tool` to whatever the click hit.
///
/// `cursor_point` supplies the free-space placement point and is only
/// evaluated when nothing was hit and the cube tool is active.
pub fn apply_tool(
    world: &mut World,
    tool: Tool,
    hit: Option<RayHit>,
    policy: HoleJumpPolicy,
    cursor_point: impl FnOnce() -> Vec3,
) -> Edit {
    let Some(hit) = hit else {
        return match tool {
            Tool::PlaceCube => Edit::placed(world.place_cube(cursor_point())),
            _ => Edit::Nothing,
        };
    };

    if tool == Tool::Delete {
        return if world.delete(hit.id) { Edit::Deleted(hit.id) } else { Edit::Nothing };
    }

    let Some(target) = world.get(hit.id) else {
        return Edit::Nothing;
    };

    match &target.kind {
        ObjectKind::Cube(_) => {
            let Some(face) = target.face_at(hit.point) else {
                debug!("hit point {} is not on a face of {}", hit.point, hit.id);
                return Edit::Nothing;
            };
            apply_to_cube(world, tool, hit.id, face)
        }
        ObjectKind::Stair { .. } => {
            if world.rotate_stair(hit.id) {
                Edit::Rotated(hit.id)
            } else {
                Edit::Nothing
            }
        }
        ObjectKind::Hole { .. } if tool == Tool::PlaceJump => match policy {
            HoleJumpPolicy::ConvertToJumper => Edit::placed(world.convert_hole_to_jumper(hit.id)),
            HoleJumpPolicy::Ignore => Edit::Nothing,
        },
        _ => Edit::Nothing,
    }
}

fn apply_to_cube(world: &mut World, tool: Tool, cube: ObjectId, face: Face) -> Edit {
    let placing = matches!(tool, Tool::PlaceCube | Tool::PlaceStair | Tool::PlaceHole | Tool::PlaceJump);

    // the underside only ever grows cubes
    if placing && face == Face::Down {
        return Edit::placed(world.neighbour_cell(cube, face).and_then(|p| world.place_cube(p)));
    }

    let id = match (tool, face) {
        (Tool::PlaceCube, _) => world.neighbour_cell(cube, face).and_then(|p| world.place_cube(p)),
        (Tool::PlaceStair, _) => world
            .neighbour_cell(cube, face)
            .and_then(|p| world.place_stair(p, stair_orientation(face))),
        (Tool::PlaceHole, Face::Up) => world.top_anchor(cube).and_then(|p| world.place_hole(p, cube)),
        (Tool::PlaceJump, Face::Up) => world.top_anchor(cube).and_then(|p| world.place_jumper(p, cube)),
        (Tool::PlaceActor, Face::Up) => world.top_anchor(cube).and_then(|p| world.place_actor(p)),
        _ => None,
    };
    Edit::placed(id)
}
