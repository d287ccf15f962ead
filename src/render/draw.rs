//! Per-frame traversal of visible tiles.

use crate::command::DrawCommand;
use crate::map::MapDocument;
use macroquad::prelude::*;

/// Visits every drawable tile of `map`, visible layers only, in layer order
/// then source scan order.
///
/// Tiles whose gid is not covered by an atlas, or whose atlas region falls
/// outside the image, are skipped. Holds no state between calls.
pub fn for_each_visible_tile<'m, H, F>(map: &'m MapDocument<H>, mut visit: F)
where
    F: FnMut(DrawCommand<'m, H>),
{
    let (cw, ch) = (map.cell_width(), map.cell_height());
    let tilesets = map.tilesets();

    for (layer_index, layer) in map.layers().iter().enumerate() {
        if !layer.visible {
            continue;
        }
        for tile in &layer.tiles {
            let Some((ts, local)) = tilesets.resolve(tile.gid) else {
                continue;
            };
            let Some(src) = ts.source_rect(local, cw, ch) else {
                continue;
            };
            visit(DrawCommand {
                texture: &ts.texture,
                src,
                dest: tile.position,
                layer_index,
                opacity: layer.opacity,
                flags: tile.flags,
            });
        }
    }
}

/// Collects one frame's draw commands.
pub fn draw_commands<H>(map: &MapDocument<H>) -> Vec<DrawCommand<'_, H>> {
    let mut out = Vec::new();
    for_each_visible_tile(map, |cmd| out.push(cmd));
    out
}

/// Draws the map with macroquad, offset by `origin` in screen space.
///
/// Horizontal and vertical flips are honoured; diagonal flips are not.
pub fn draw_map(map: &MapDocument<Texture2D>, origin: Vec2) {
    for_each_visible_tile(map, |cmd| {
        let dest = origin + cmd.dest;
        draw_texture_ex(
            cmd.texture,
            dest.x,
            dest.y,
            Color::new(1.0, 1.0, 1.0, cmd.opacity),
            DrawTextureParams {
                source: Some(cmd.src),
                flip_x: cmd.flags.flip_h(),
                flip_y: cmd.flags.flip_v(),
                ..Default::default()
            },
        );
    });
}

impl<H> MapDocument<H> {
    /// See [`for_each_visible_tile`].
    pub fn for_each_visible_tile<'m, F>(&'m self, visit: F)
    where
        F: FnMut(DrawCommand<'m, H>),
    {
        for_each_visible_tile(self, visit)
    }

    /// See [`draw_commands`].
    pub fn draw_commands(&self) -> Vec<DrawCommand<'_, H>> {
        draw_commands(self)
    }
}

impl MapDocument<Texture2D> {
    /// See [`draw_map`].
    pub fn draw(&self, origin: Vec2) {
        draw_map(self, origin)
    }
}
