// MODEL: editor state, no GPU types
pub mod bounds;
pub mod camera;
pub mod contour;
pub mod menu;
pub mod object;
pub mod world;

pub use bounds::{Aabb, Face, Ray};
pub use camera::{Direction, OrbitCamera};
pub use contour::{Contour, ContourEdge};
pub use menu::{Menu, Rect, Tool};
pub use object::{Cube, ObjectId, ObjectKind, Orientation, WorldObject};
pub use world::{RayHit, World};
