//! Axis-aligned rectangle tests.

use crate::layer::Tile;
use crate::map::MapDocument;
use macroquad::prelude::Rect;

/// Strict axis-aligned overlap: rectangles that only share an edge do not
/// intersect.
#[inline]
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Collidable tiles of every layer (hidden ones included) overlapping
/// `query`, in layer order.
pub fn colliding_tiles<'m, H>(
    map: &'m MapDocument<H>,
    query: Rect,
) -> impl Iterator<Item = &'m Tile> + 'm
where
    H: 'm,
{
    map.layers()
        .iter()
        .flat_map(|layer| layer.tiles.iter())
        .filter(move |tile| tile.collidable && rects_intersect(&query, &tile.bounds))
}

/// True as soon as any collidable tile overlaps `query`.
pub fn check_collision<H>(map: &MapDocument<H>, query: Rect) -> bool {
    colliding_tiles(map, query).next().is_some()
}

impl<H> MapDocument<H> {
    /// See [`check_collision`].
    pub fn check_collision(&self, query: Rect) -> bool {
        check_collision(self, query)
    }

    /// See [`colliding_tiles`].
    pub fn colliding_tiles<'m>(&'m self, query: Rect) -> impl Iterator<Item = &'m Tile> + 'm
    where
        H: 'm,
    {
        colliding_tiles(self, query)
    }
}
