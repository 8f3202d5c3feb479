use escher_world::config::EditorConfig;
use escher_world::model::{Contour, ObjectId, ObjectKind, Orientation, World};
use glam::Vec3;

fn world() -> World {
    World::new(&EditorConfig::default())
}

fn contours(world: &World) -> Vec<(ObjectId, Contour)> {
    world
        .cubes()
        .filter_map(|o| o.as_cube().map(|c| (o.id(), c.contour.clone())))
        .collect()
}

fn visible_edges(world: &World, id: ObjectId) -> usize {
    world
        .get(id)
        .and_then(|o| o.as_cube())
        .map(|c| c.contour.visible_edges().count())
        .unwrap_or_default()
}

/// No two objects share a position; cubes never hold both a hole and a jumper;
/// every attachment points back at a live owner.
fn assert_world_consistent(world: &World) {
    let objects: Vec<_> = world.objects().collect();
    for (i, a) in objects.iter().enumerate() {
        for b in &objects[i + 1..] {
            assert_ne!(a.position(), b.position(), "{} and {} overlap", a.id(), b.id());
        }
    }
    for object in &objects {
        match &object.kind {
            ObjectKind::Cube(cube) => {
                assert!(cube.hole.is_none() || cube.jumper.is_none(), "{} holds both", object.id());
                for attachment in [cube.hole, cube.jumper].into_iter().flatten() {
                    assert!(world.contains(attachment), "{} points at removed {}", object.id(), attachment);
                }
            }
            ObjectKind::Hole { owner } => {
                let back = world.get(*owner).and_then(|o| o.as_cube()).and_then(|c| c.hole);
                assert_eq!(back, Some(object.id()));
            }
            ObjectKind::Jumper { owner } => {
                let back = world.get(*owner).and_then(|o| o.as_cube()).and_then(|c| c.jumper);
                assert_eq!(back, Some(object.id()));
            }
            ObjectKind::Stair { .. } | ObjectKind::Actor => {}
        }
    }
}

#[test]
fn place_adjacent_then_delete_restores_full_contour() {
    let mut w = world();
    let first = w.place_cube(Vec3::ZERO).expect("first cube");
    let second = w.place_cube(Vec3::new(4.0, 0.0, 0.0)).expect("second cube");

    assert_eq!(w.len(), 2);
    assert_eq!(visible_edges(&w, first), 8);
    assert_eq!(visible_edges(&w, second), 8);

    assert!(w.delete(second));
    assert_eq!(w.len(), 1);
    let contour = w.get(first).and_then(|o| o.as_cube()).map(|c| c.contour.clone()).expect("first cube");
    assert!(contour.is_full());
    assert_eq!(contour.visible_edges().count(), 12);
}

#[test]
fn distant_cubes_keep_full_contours() {
    let mut w = world();
    let a = w.place_cube(Vec3::ZERO).expect("a");
    let b = w.place_cube(Vec3::new(12.0, 0.0, 0.0)).expect("b");
    assert_eq!(visible_edges(&w, a), 12);
    assert_eq!(visible_edges(&w, b), 12);
}

#[test]
fn row_of_cubes_hides_inner_faces() {
    let mut w = world();
    let ids: Vec<_> = (0..3)
        .map(|i| w.place_cube(Vec3::new(4.0 * i as f32, 0.0, 0.0)).expect("cube"))
        .collect();
    assert_eq!(visible_edges(&w, ids[0]), 8);
    // both side faces touch a neighbour
    assert_eq!(visible_edges(&w, ids[1]), 4);
    assert_eq!(visible_edges(&w, ids[2]), 8);
}

#[test]
fn isolated_insert_and_delete_is_reversible() {
    let mut w = world();
    for p in [Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, 0.0, -4.0)] {
        w.place_cube(p);
    }
    let before = contours(&w);
    let count = w.len();

    let lonely = w.place_cube(Vec3::new(40.0, 0.0, 0.0)).expect("far cube");
    assert_eq!(contours(&w).into_iter().filter(|(id, _)| *id != lonely).collect::<Vec<_>>(), before);
    assert!(w.delete(lonely));

    assert_eq!(w.len(), count);
    assert_eq!(contours(&w), before);
}

#[test]
fn touching_insert_and_delete_is_reversible_too() {
    let mut w = world();
    w.place_cube(Vec3::ZERO);
    w.place_cube(Vec3::new(0.0, 4.0, 0.0));
    let before = contours(&w);

    let neighbour = w.place_cube(Vec3::new(4.0, 0.0, 0.0)).expect("neighbour");
    assert_ne!(contours(&w)[0].1, before[0].1);
    w.delete(neighbour);
    assert_eq!(contours(&w), before);
}

#[test]
fn hole_and_jumper_replace_each_other() {
    let mut w = world();
    let cube = w.place_cube(Vec3::ZERO).expect("cube");
    let top = w.top_anchor(cube).expect("anchor");

    let hole = w.place_hole(top, cube).expect("hole");
    let jumper = w.place_jumper(top, cube).expect("jumper");
    assert!(!w.contains(hole));
    assert_world_consistent(&w);

    let hole = w.place_hole(top, cube).expect("hole again");
    assert!(!w.contains(jumper));
    assert!(w.contains(hole));
    assert_world_consistent(&w);
}

#[test]
fn double_delete_and_stale_rotate_are_no_ops() {
    let mut w = world();
    let stair = w.place_stair(Vec3::new(0.0, 0.0, 4.0), Orientation::default()).expect("stair");
    assert!(w.delete(stair));
    assert!(!w.delete(stair));
    assert!(!w.rotate_stair(stair));
    assert!(w.is_empty());
}

#[test]
fn randomized_edits_never_break_occupancy() {
    for seed in [1_u64, 7, 42, 1234, 99_999] {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut w = world();
        let coordinate = |rng: &mut fastrand::Rng| rng.i32(-3..=3) as f32 * 4.0 + rng.f32() * 3.0 - 1.5;

        for _ in 0..300 {
            let live: Vec<ObjectId> = w.objects().map(|o| o.id()).collect();
            let cubes: Vec<ObjectId> = w.cubes().map(|o| o.id()).collect();

            match rng.u8(0..10) {
                0..=3 => {
                    let p = Vec3::new(coordinate(&mut rng), coordinate(&mut rng), coordinate(&mut rng));
                    w.place_cube(p);
                }
                4 => {
                    let p = Vec3::new(rng.i32(-3..=3) as f32 * 4.0, 0.0, rng.i32(-3..=3) as f32 * 4.0);
                    w.place_stair(p, Orientation::from_quarter_turns(rng.u8(0..4)));
                }
                5 | 6 if !cubes.is_empty() => {
                    let owner = cubes[rng.usize(0..cubes.len())];
                    let top = w.top_anchor(owner).expect("live cube");
                    if rng.bool() {
                        w.place_hole(top, owner);
                    } else {
                        w.place_jumper(top, owner);
                    }
                }
                7 if !cubes.is_empty() => {
                    let owner = cubes[rng.usize(0..cubes.len())];
                    let top = w.top_anchor(owner).expect("live cube");
                    w.place_actor(top);
                }
                _ if !live.is_empty() => {
                    w.delete(live[rng.usize(0..live.len())]);
                }
                _ => {}
            }
            assert_world_consistent(&w);
        }
    }
}
