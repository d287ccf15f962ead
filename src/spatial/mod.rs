//! Collision queries against the loaded tiles.

pub mod collision;

pub use collision::{check_collision, colliding_tiles, rects_intersect};
