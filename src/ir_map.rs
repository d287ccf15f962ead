// src/ir_map.rs
use std::path::PathBuf;

/// Canonical, format-agnostic map. Every loader produces one of these;
/// textures are not touched until `MapDocument::from_ir`.
#[derive(Debug, Clone, PartialEq)]
pub struct IrMap {
    pub width: u32,
    pub height: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub orientation: String,
    pub render_order: String,
    pub tilesets: Vec<IrTileset>, // file order, not sorted
    pub layers: Vec<IrLayer>,     // draw order: array order
}

pub const DEFAULT_ORIENTATION: &str = "orthogonal";
pub const DEFAULT_RENDER_ORDER: &str = "right-down";

#[derive(Debug, Clone, PartialEq)]
pub struct IrTileset {
    pub first_gid: u32,
    pub name: String,
    /// Resolved image path; `None` when the tileset could not be read and
    /// must be backed by a placeholder.
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    pub opacity: f32,
    /// Raw GIDs, flags included, row-major. Malformed cells are stored as 0.
    pub data: Vec<u32>,
}

impl IrLayer {
    pub fn new(name: String, width: u32, height: u32) -> Self {
        IrLayer {
            name,
            width,
            height,
            visible: true,
            opacity: 1.0,
            data: Vec::new(),
        }
    }
}
