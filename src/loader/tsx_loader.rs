use crate::config::MapConfig;
use crate::error::MapError;
use crate::loader::tmx_loader::attr;
use crate::loader::{paths, read_document, ExternalTileset};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

/// Reads the name and atlas image of a `.tsx` document.
///
/// Any `firstgid` inside the document is ignored; the referencing map
/// decides where the tileset starts. Per-tile images (image collection
/// tilesets) are skipped.
pub fn decode_tileset_str(
    text: &str,
    path: &Path,
    config: &MapConfig,
) -> Result<ExternalTileset, MapError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut name = None;
    let mut seen_root = false;
    let mut tile_depth = 0u32;

    loop {
        let event = reader.read_event().map_err(|source| MapError::Xml {
            path: path.to_path_buf(),
            source,
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                match e.name().as_ref() {
                    b"tileset" if !seen_root => {
                        seen_root = true;
                        name = attr(e, "name");
                    }
                    b"tile" if is_start => tile_depth += 1,
                    b"image" if tile_depth == 0 => {
                        if let Some(source) = attr(e, "source") {
                            return Ok(ExternalTileset {
                                name,
                                image: paths::resolve_reference(path, &source, config.parent_dirs),
                            });
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"tile" => {
                tile_depth = tile_depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(MapError::MissingImage {
        path: path.to_path_buf(),
    })
}

pub fn decode_tileset_file(path: &Path, config: &MapConfig) -> Result<ExternalTileset, MapError> {
    let text = read_document(path)?;
    decode_tileset_str(&text, path, config)
}
