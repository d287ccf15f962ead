use crate::gid::GidFlags;
use macroquad::prelude::{Rect, Vec2};

/// One tile to blit: a rectangle of an atlas placed at a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand<'m, H> {
    /// Atlas texture
    pub texture: &'m H,
    /// Region of the atlas, in pixels
    pub src: Rect,
    /// Top-left destination, in map pixels
    pub dest: Vec2,
    /// Index of the source layer in [`MapDocument::layers`](crate::MapDocument::layers)
    pub layer_index: usize,
    /// Opacity of the source layer
    pub opacity: f32,
    /// Orientation flags of the tile
    pub flags: GidFlags,
}

impl<H> DrawCommand<'_, H> {
    /// Destination rectangle; same size as the source region.
    pub fn dest_rect(&self) -> Rect {
        Rect::new(self.dest.x, self.dest.y, self.src.w, self.src.h)
    }
}
