//! Visible wireframe of a cube.
//!
//! Each of the twelve cube edges is traced as a ray from its first corner
//! towards its second. When a nearby cube's box swallows the edge, the edge is
//! cut short at the point where it enters that cube (or dropped when it enters
//! right at its first corner), so edges hidden inside or along a neighbour are
//! never drawn.

use glam::{Mat4, Vec3};

use super::bounds::{Aabb, Ray};
use super::object::ObjectId;

/// Corners of the unit cube in local space.
pub const CUBE_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
];

/// Offset of the confirmation ray, as a fraction of a unit step along the edge.
const PROBE_OFFSET: f32 = 0.01;

/// Split vertices closer than this (in local units) are merged.
const VERTEX_EPSILON: f32 = 1e-4;

/// Segment between two entries of [`Contour::vertices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourEdge {
    pub start: usize,
    pub end: usize,
}

/// Local-space line list for a cube's visible edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// The 8 corners followed by any split vertices.
    pub vertices: Vec<Vec3>,
    pub edges: Vec<ContourEdge>,
}

impl Contour {
    /// The unoccluded twelve-edge contour.
    pub fn full() -> Self {
        let edges = candidate_edges().into_iter().map(|(start, end)| ContourEdge { start, end }).collect();
        Self { vertices: CUBE_CORNERS.to_vec(), edges }
    }

    /// True when every drawn edge is a whole cube edge.
    pub fn is_full(&self) -> bool {
        *self == Self::full()
    }

    /// Edges with non-zero length.
    pub fn visible_edges(&self) -> impl Iterator<Item = &ContourEdge> {
        self.edges.iter().filter(|e| e.start != e.end)
    }

    /// Edges that were cut short by a neighbour.
    pub fn split_edges(&self) -> impl Iterator<Item = &ContourEdge> {
        self.edges.iter().filter(|e| e.end >= CUBE_CORNERS.len())
    }

    fn vertex_index(&mut self, point: Vec3) -> usize {
        match self.vertices.iter().position(|v| v.abs_diff_eq(point, VERTEX_EPSILON)) {
            Some(index) => index,
            None => {
                self.vertices.push(point);
                self.vertices.len() - 1
            }
        }
    }
}

/// Corner pairs that agree on two of the three axes, i.e. the twelve box edges.
pub fn candidate_edges() -> Vec<(usize, usize)> {
    let mut edges = Vec::with_capacity(12);
    for i in 0..CUBE_CORNERS.len() {
        for j in (i + 1)..CUBE_CORNERS.len() {
            let (a, b) = (CUBE_CORNERS[i], CUBE_CORNERS[j]);
            let shared = (a.x == b.x) as u8 + (a.y == b.y) as u8 + (a.z == b.z) as u8;
            if shared == 2 {
                edges.push((i, j));
            }
        }
    }
    edges
}

/// A cube the contour is traced against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occluder {
    pub id: ObjectId,
    pub position: Vec3,
    pub bounds: Aabb,
}

/// Limits for the contour trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourParams {
    /// Maximum centre distance for a cube to be considered a neighbour.
    pub range: f32,
    /// Hits at or past this distance along the edge do not occlude it.
    pub occlusion_limit: f32,
}

/// Result of tracing one cube.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourTrace {
    pub contour: Contour,
    /// Every occluder that was within range, in occluder order.
    pub adjacent: Vec<ObjectId>,
}

/// Traces the visible contour of the cube `id` against `occluders`.
/// `occluders` may contain the cube itself; it is skipped.
pub fn trace_contour(
    id: ObjectId,
    position: Vec3,
    size: f32,
    occluders: &[Occluder],
    params: ContourParams,
) -> ContourTrace {
    let world = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(size));
    let inverse = world.inverse();

    let neighbours: Vec<&Occluder> = occluders
        .iter()
        .filter(|o| o.id != id && o.position.distance(position) <= params.range)
        .collect();

    let mut contour = Contour { vertices: CUBE_CORNERS.to_vec(), edges: Vec::with_capacity(12) };

    for (i, j) in candidate_edges() {
        let start = world.transform_point3(CUBE_CORNERS[i]);
        let end = world.transform_point3(CUBE_CORNERS[j]);
        let direction = (end - start).normalize();

        let primary = Ray::new(start, direction);
        let probe = Ray::new(start + direction * PROBE_OFFSET, direction);

        let occlusion = neighbours.iter().find_map(|n| {
            // the probe rules out rays that only graze a shared corner
            n.bounds.intersect(&probe)?;
            let distance = n.bounds.intersect(&primary)?;
            (distance >= 0.0 && distance < params.occlusion_limit).then_some(distance)
        });

        match occlusion {
            Some(distance) => {
                let split = inverse.transform_point3(primary.at(distance));
                let h = contour.vertex_index(split);
                if h != i {
                    contour.edges.push(ContourEdge { start: i, end: h });
                }
            }
            None => contour.edges.push(ContourEdge { start: i, end: j }),
        }
    }

    if contour.edges.is_empty() {
        // keeps the line list non-empty for the renderer
        contour.edges.push(ContourEdge { start: 0, end: 0 });
    }

    ContourTrace {
        contour,
        adjacent: neighbours.iter().map(|n| n.id).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: ContourParams = ContourParams { range: 4.0, occlusion_limit: 4.0 };

    fn occluder(id: u32, position: Vec3, size: f32) -> Occluder {
        Occluder {
            id: ObjectId(id),
            position,
            bounds: Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)).transformed(size, position),
        }
    }

    fn trace(index: usize, cubes: &[Occluder], size: f32) -> ContourTrace {
        let c = cubes[index];
        trace_contour(c.id, c.position, size, cubes, PARAMS)
    }

    #[test]
    fn there_are_exactly_twelve_candidate_edges() {
        let edges = candidate_edges();
        assert_eq!(edges.len(), 12);
        for (i, j) in edges {
            let length = CUBE_CORNERS[i].distance(CUBE_CORNERS[j]);
            assert!((length - 2.0).abs() < 1e-6, "diagonal {i}-{j} slipped in");
        }
    }

    #[test]
    fn isolated_cube_keeps_full_contour() {
        let cubes = [occluder(1, Vec3::ZERO, 1.0), occluder(2, Vec3::new(10.0, 0.0, 0.0), 1.0)];
        for index in 0..2 {
            let result = trace(index, &cubes, 1.0);
            assert!(result.contour.is_full());
            assert_eq!(result.contour.visible_edges().count(), 12);
            assert!(result.adjacent.is_empty());
        }
    }

    #[test]
    fn touching_cubes_hide_their_shared_face_edges() {
        // size 1: lattice step 2, faces touch at x = 1
        let cubes = [occluder(1, Vec3::ZERO, 1.0), occluder(2, Vec3::new(2.0, 0.0, 0.0), 1.0)];
        let left = trace(0, &cubes, 1.0);
        let right = trace(1, &cubes, 1.0);

        assert_eq!(left.adjacent, vec![ObjectId(2)]);
        assert_eq!(right.adjacent, vec![ObjectId(1)]);

        // no remaining edge of the left cube lies in the x = 1 plane
        for c in [&left.contour, &right.contour] {
            assert_eq!(c.visible_edges().count(), 8);
        }
        let in_shared_plane = |c: &Contour, x: f32| {
            c.visible_edges().any(|e| c.vertices[e.start].x == x && c.vertices[e.end].x == x)
        };
        assert!(!in_shared_plane(&left.contour, 1.0));
        assert!(!in_shared_plane(&right.contour, -1.0));
    }

    #[test]
    fn default_size_neighbours_suppress_shared_edges() {
        let cubes = [occluder(1, Vec3::ZERO, 2.0), occluder(2, Vec3::new(4.0, 0.0, 0.0), 2.0)];
        assert_eq!(trace(0, &cubes, 2.0).contour.visible_edges().count(), 8);
        assert_eq!(trace(1, &cubes, 2.0).contour.visible_edges().count(), 8);
    }

    #[test]
    fn diagonal_neighbour_is_out_of_range() {
        let cubes = [occluder(1, Vec3::ZERO, 2.0), occluder(2, Vec3::new(4.0, 4.0, 0.0), 2.0)];
        let result = trace(0, &cubes, 2.0);
        assert!(result.contour.is_full());
        assert!(result.adjacent.is_empty());
    }

    #[test]
    fn overlapping_smaller_cube_splits_an_edge() {
        // a small cube sits across the middle of the big cube's top front edge
        let big = occluder(1, Vec3::ZERO, 2.0);
        let small = occluder(2, Vec3::new(0.0, 2.0, 2.0), 0.5);
        let result = trace_contour(big.id, big.position, 2.0, &[big, small], PARAMS);

        let split: Vec<_> = result.contour.split_edges().collect();
        assert_eq!(split.len(), 1);
        let e = split[0];
        let cut = result.contour.vertices[e.end];
        // edge runs from x = -1 towards +1 and is cut where the small cube starts (x = -0.5 world)
        assert_eq!(result.contour.vertices[e.start], Vec3::new(-1.0, 1.0, 1.0));
        assert!(cut.abs_diff_eq(Vec3::new(-0.25, 1.0, 1.0), 1e-5), "cut at {cut}");
        assert_eq!(result.contour.edges.len(), 12);
    }

    #[test]
    fn fully_enclosed_cube_gets_placeholder_edge() {
        let inner = occluder(1, Vec3::ZERO, 1.0);
        let outer = occluder(2, Vec3::new(0.0, 0.0, 0.5), 3.0);
        let result = trace_contour(inner.id, inner.position, 1.0, &[inner, outer], PARAMS);
        assert_eq!(result.contour.edges, vec![ContourEdge { start: 0, end: 0 }]);
        assert_eq!(result.contour.visible_edges().count(), 0);
    }
}
