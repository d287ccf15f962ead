#![warn(missing_docs)]

//! Tiled map loader for Macroquad: JSON and TMX maps, external TSX/JSON
//! tilesets, atlas lookup by GID and collision queries.
//!
//! ```no_run
//! use macroquad::prelude::*;
//! use tilemap_engine::{MacroquadTextures, MapDocument};
//!
//! # fn frame() -> Result<(), tilemap_engine::MapError> {
//! let mut textures = MacroquadTextures::new();
//! let map = MapDocument::load("assets/town.tmx", &mut textures)?;
//!
//! map.draw(Vec2::ZERO);
//! let blocked = map.check_collision(Rect::new(40.0, 40.0, 12.0, 12.0));
//! # let _ = blocked;
//! # Ok(())
//! # }
//! ```

mod command;
mod config;
mod error;
pub mod gid;
mod ir_map;
mod layer;
mod loader;
mod map;
pub mod render;
pub mod spatial;
pub mod texture;
mod tileset;

pub use command::DrawCommand;
pub use config::{MapConfig, ParentDirPolicy, DEFAULT_COLLISION_THRESHOLD};
pub use error::MapError;
pub use gid::{GidFlags, TileId};
pub use layer::{Layer, Tile};
pub use loader::paths::resolve_reference;
pub use loader::MapFormat;
pub use map::MapDocument;
pub use texture::{
    HeadlessHandle, HeadlessTextures, LoadedTexture, MacroquadTextures, TextureLoader,
};
pub use tileset::{TilesetEntry, TilesetRegistry};
