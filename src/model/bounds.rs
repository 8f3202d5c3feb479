use glam::{Mat4, Vec3};

/// Directions below this magnitude count as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Tolerance when deciding which face of a box a surface point lies on.
const FACE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// `direction` is normalized here.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance along the ray to a plane `normal . p + offset = 0`.
    /// Planes behind the origin or parallel to the ray are not hit.
    pub fn intersect_plane(&self, normal: Vec3, offset: f32) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-5 {
            return None;
        }
        let t = (-offset - normal.dot(self.origin)) / denom;
        if t < 0.0 {
            if t < -1e-5 {
                return None;
            }
            return Some(0.0);
        }
        Some(t)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Scales then translates both corners.
    pub fn transformed(&self, size: f32, position: Vec3) -> Self {
        let world = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(size));
        let a = world.transform_point3(self.min);
        let b = world.transform_point3(self.max);
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Slab test. Returns the entry distance, `0.0` when the origin is inside,
    /// or `None` when the box is missed or lies behind the ray.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut t_min: Option<f32> = None;
        let mut t_max: Option<f32> = None;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir.abs() < PARALLEL_EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let mut near = (lo - origin) / dir;
            let mut far = (hi - origin) / dir;
            if near > far {
                std::mem::swap(&mut near, &mut far);
            }

            if t_min.is_some_and(|t| t > far) || t_max.is_some_and(|t| near > t) {
                return None;
            }
            t_min = Some(t_min.map_or(near, |t| t.max(near)));
            t_max = Some(t_max.map_or(far, |t| t.min(far)));
        }

        match (t_min, t_max) {
            (Some(entry), Some(exit)) if entry < 0.0 && exit > 0.0 => Some(0.0),
            (Some(entry), _) if entry < 0.0 => None,
            (Some(entry), _) => Some(entry),
            // zero direction: only meaningful when the origin is inside
            _ => None,
        }
    }

    /// Which face of the box `point` lies on. Checked in the fixed order
    /// Right, Left, Up, Down, Front, Back so edges and corners resolve to the
    /// first listed face.
    pub fn face_of(&self, point: Vec3) -> Option<Face> {
        if point.x >= self.max.x - FACE_EPSILON {
            Some(Face::Right)
        } else if point.x <= self.min.x + FACE_EPSILON {
            Some(Face::Left)
        } else if point.y >= self.max.y - FACE_EPSILON {
            Some(Face::Up)
        } else if point.y <= self.min.y + FACE_EPSILON {
            Some(Face::Down)
        } else if point.z >= self.max.z - FACE_EPSILON {
            Some(Face::Front)
        } else if point.z <= self.min.z + FACE_EPSILON {
            Some(Face::Back)
        } else {
            None
        }
    }
}

/// Face of an object relative to a point on its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Right,
    Left,
    Up,
    Down,
    Front,
    Back,
}

impl Face {
    pub fn normal(self) -> Vec3 {
        match self {
            Face::Right => Vec3::X,
            Face::Left => Vec3::NEG_X,
            Face::Up => Vec3::Y,
            Face::Down => Vec3::NEG_Y,
            Face::Front => Vec3::Z,
            Face::Back => Vec3::NEG_Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(size: f32) -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)).transformed(size, Vec3::ZERO)
    }

    #[test]
    fn ray_at_center_hits_entry_face() {
        for size in [1.0, 2.0, 3.5] {
            let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0 * size), Vec3::NEG_Z);
            let hit = unit_box(size).intersect(&ray).expect("ray should hit");
            assert!((hit - size).abs() < 1e-5, "size {size}: hit at {hit}");
        }
    }

    #[test]
    fn parallel_offset_ray_misses() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z);
        assert_eq!(unit_box(2.0).intersect(&ray), None);
    }

    #[test]
    fn box_behind_ray_is_not_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert_eq!(unit_box(1.0).intersect(&ray), None);
    }

    #[test]
    fn origin_inside_or_on_surface_hits_at_zero() {
        let b = unit_box(2.0);
        assert_eq!(b.intersect(&Ray::new(Vec3::ZERO, Vec3::X)), Some(0.0));
        // origin on the min face, travelling along the face
        let along_face = Ray::new(Vec3::new(-2.0, -2.0, 2.0), Vec3::Y);
        assert_eq!(b.intersect(&along_face), Some(0.0));
    }

    #[test]
    fn transformed_box_scales_then_translates() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)).transformed(2.0, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(b.min, Vec3::new(2.0, -2.0, -2.0));
        assert_eq!(b.max, Vec3::new(6.0, 2.0, 2.0));
        assert!(b.contains(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(b.center(), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn face_priority_resolves_edges() {
        let b = unit_box(2.0);
        assert_eq!(b.face_of(Vec3::new(2.0, 0.0, 0.0)), Some(Face::Right));
        assert_eq!(b.face_of(Vec3::new(0.0, 2.0, 0.0)), Some(Face::Up));
        assert_eq!(b.face_of(Vec3::new(0.0, 0.0, -2.0)), Some(Face::Back));
        // right/front edge resolves to Right, up/front edge to Up
        assert_eq!(b.face_of(Vec3::new(2.0, 0.0, 2.0)), Some(Face::Right));
        assert_eq!(b.face_of(Vec3::new(0.0, 2.0, 2.0)), Some(Face::Up));
        assert_eq!(b.face_of(Vec3::new(0.0, 0.0, 0.0)), None);
    }

    #[test]
    fn plane_hit_in_front_only() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert_eq!(ray.intersect_plane(Vec3::Z, 0.0), Some(10.0));
        assert_eq!(ray.intersect_plane(Vec3::Z, -20.0), None);
        assert_eq!(ray.intersect_plane(Vec3::X, 0.0), None);
    }
}
