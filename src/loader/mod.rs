//! Format dispatch and the pieces shared by every loader.

pub mod json_loader;
pub mod paths;
pub mod tmx_loader;
pub mod tsx_loader;

use crate::config::MapConfig;
use crate::error::MapError;
use crate::ir_map::{IrMap, IrTileset};
use log::warn;
use std::path::{Path, PathBuf};

/// Name given to tilesets whose documents do not carry one.
pub const DEFAULT_TILESET_NAME: &str = "tileset";

/// Source syntax of a map document, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// Tiled JSON (`.json`, `.tmj`)
    Json,
    /// Tiled TMX markup (`.tmx`, `.xml`)
    Tmx,
}

impl MapFormat {
    /// Picks the format from `path`'s extension, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self, MapError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") | Some("tmj") => Ok(MapFormat::Json),
            Some("tmx") | Some("xml") => Ok(MapFormat::Tmx),
            _ => Err(MapError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Name and resolved image of a standalone tileset document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalTileset {
    pub name: Option<String>,
    pub image: PathBuf,
}

pub(crate) fn read_document(path: &Path) -> Result<String, MapError> {
    std::fs::read_to_string(path).map_err(|source| MapError::io(path, source))
}

pub fn decode_map_file(path: &Path, config: &MapConfig) -> Result<IrMap, MapError> {
    let format = MapFormat::from_path(path)?;
    let text = read_document(path)?;
    decode_map_str(&text, format, path, config)
}

/// `path` is only used to resolve relative references and in errors.
pub fn decode_map_str(
    text: &str,
    format: MapFormat,
    path: &Path,
    config: &MapConfig,
) -> Result<IrMap, MapError> {
    match format {
        MapFormat::Json => json_loader::decode_json_str(text, path, config),
        MapFormat::Tmx => tmx_loader::decode_tmx_str(text, path, config),
    }
}

/// Turns a `source="…"` tileset reference into an IR tileset.
///
/// Never fails: an unreadable document yields a tileset without an image,
/// which the registry backs with a placeholder.
pub(crate) fn load_external_tileset(
    map_path: &Path,
    source: &str,
    first_gid: u32,
    fallback_name: Option<String>,
    config: &MapConfig,
) -> IrTileset {
    let ts_path = paths::resolve_reference(map_path, source, config.parent_dirs);
    let ext = ts_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let doc = match ext.as_deref() {
        Some("tsx") | Some("xml") => tsx_loader::decode_tileset_file(&ts_path, config),
        Some("json") | Some("tsj") => json_loader::decode_tileset_file(&ts_path, config),
        // anything else is taken to be the atlas image itself
        _ => {
            return IrTileset {
                first_gid,
                name: fallback_name.unwrap_or_else(|| DEFAULT_TILESET_NAME.to_owned()),
                image: Some(ts_path),
            }
        }
    };

    match doc {
        Ok(doc) => IrTileset {
            first_gid,
            name: doc
                .name
                .or(fallback_name)
                .unwrap_or_else(|| DEFAULT_TILESET_NAME.to_owned()),
            image: Some(doc.image),
        },
        Err(err) => {
            warn!("external tileset {}: {}", ts_path.display(), err);
            IrTileset {
                first_gid,
                name: fallback_name.unwrap_or_else(|| DEFAULT_TILESET_NAME.to_owned()),
                image: None,
            }
        }
    }
}
