use crate::gid::{self, GidFlags};
use crate::ir_map::IrLayer;
use macroquad::prelude::*;

/// A placed, non-empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Row-major index the cell had in the source grid
    pub sequence_index: usize,
    /// Decoded id, flags stripped
    pub gid: u32,
    /// Orientation flags that were stripped from `gid`
    pub flags: GidFlags,
    /// Top-left corner in map pixels
    pub position: Vec2,
    /// Cell-sized rectangle at `position`
    pub bounds: Rect,
    /// `gid` is above the map's collision threshold
    pub collidable: bool,
}

/// One tile layer. Only non-zero cells are stored.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer name; may be empty
    pub name: String,
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
    /// Hidden layers still take part in collision
    pub visible: bool,
    /// 0.0 ..= 1.0
    pub opacity: f32,
    /// Materialized tiles in source scan order
    pub tiles: Vec<Tile>,
}

impl Layer {
    pub(crate) fn from_ir(raw: IrLayer, tile_w: u32, tile_h: u32, collision_threshold: u32) -> Self {
        let width = raw.width.max(1) as usize;
        let tw = tile_w as f32;
        let th = tile_h as f32;

        let tiles = raw
            .data
            .iter()
            .enumerate()
            .filter_map(|(idx, &raw_gid)| {
                let (gid, flags) = gid::decode(raw_gid);
                if gid == 0 {
                    return None;
                }

                let col = idx % width;
                let row = idx / width;
                let position = vec2(col as f32 * tw, row as f32 * th);

                Some(Tile {
                    sequence_index: idx,
                    gid,
                    flags,
                    position,
                    bounds: Rect::new(position.x, position.y, tw, th),
                    collidable: gid > collision_threshold,
                })
            })
            .collect();

        Layer {
            name: raw.name,
            width: raw.width,
            height: raw.height,
            visible: raw.visible,
            opacity: if raw.opacity.is_nan() {
                1.0
            } else {
                raw.opacity.clamp(0.0, 1.0)
            },
            tiles,
        }
    }

    /// Grid coordinates `(x, y)` of a tile in this layer.
    pub fn cell_of(&self, tile: &Tile) -> (u32, u32) {
        let w = self.width.max(1) as usize;
        ((tile.sequence_index % w) as u32, (tile.sequence_index / w) as u32)
    }

    /// Number of materialized tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if every cell was empty.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
