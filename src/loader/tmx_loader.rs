// src/loader/tmx_loader.rs
//
// Event-driven TMX reader. Unknown elements and attributes are skipped; a
// syntax error after the <map> element has been read ends parsing but keeps
// everything completed so far.
use crate::config::MapConfig;
use crate::error::MapError;
use crate::gid;
use crate::ir_map::*;
use crate::loader::{load_external_tileset, paths, DEFAULT_TILESET_NAME};
use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// Attribute value by name, unescaped. Broken attributes read as absent.
pub(crate) fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn required_u32(e: &BytesStart<'_>, name: &str, path: &Path) -> Result<u32, MapError> {
    let raw = attr(e, name)
        .ok_or_else(|| MapError::geometry(path, format!("<map> is missing `{name}`")))?;
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| MapError::geometry(path, format!("`{name}` is not a number: {raw:?}")))?;
    if value == 0 {
        return Err(MapError::geometry(path, format!("`{name}` must be positive")));
    }
    Ok(value)
}

fn optional_u32(e: &BytesStart<'_>, name: &str) -> Option<u32> {
    attr(e, name).and_then(|v| v.trim().parse().ok())
}

struct PendingTileset {
    first_gid: u32,
    name: Option<String>,
    image: Option<String>,
    // depth inside <tile> children, whose images belong to single tiles
    tile_depth: u32,
}

struct PendingLayer {
    layer: IrLayer,
    in_data: bool,
    readable: bool,
    // character data of <data>, parsed once the element closes
    body: String,
}

struct TmxParser<'a> {
    path: &'a Path,
    config: &'a MapConfig,
    map: Option<IrMap>,
    tileset: Option<PendingTileset>,
    layer: Option<PendingLayer>,
}

impl<'a> TmxParser<'a> {
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), MapError> {
        let name = e.name();
        let name = name.as_ref();

        if self.map.is_none() {
            if name == b"map" {
                self.map = Some(self.read_map(e)?);
            }
            return Ok(());
        }

        match name {
            b"tileset" => self.open_tileset(e, empty),
            b"image" => {
                if let Some(ts) = self.tileset.as_mut() {
                    if ts.tile_depth == 0 && ts.image.is_none() {
                        ts.image = attr(e, "source");
                    }
                }
            }
            b"tile" => {
                if let Some(pending) = self.layer.as_mut().filter(|l| l.in_data) {
                    if pending.readable {
                        let raw = attr(e, "gid").unwrap_or_else(|| "0".to_owned());
                        push_cell(&mut pending.layer, &raw);
                    }
                } else if let Some(ts) = self.tileset.as_mut() {
                    if !empty {
                        ts.tile_depth += 1;
                    }
                }
            }
            b"layer" => {
                let layer = self.read_layer(e);
                if empty {
                    self.push_layer(layer);
                } else {
                    self.layer = Some(PendingLayer {
                        layer,
                        in_data: false,
                        readable: true,
                        body: String::new(),
                    });
                }
            }
            b"data" => {
                if let Some(pending) = self.layer.as_mut() {
                    pending.readable = data_is_plain(e, &pending.layer.name);
                    pending.in_data = !empty;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"tile" => {
                if let Some(ts) = self.tileset.as_mut() {
                    ts.tile_depth = ts.tile_depth.saturating_sub(1);
                }
            }
            b"tileset" => {
                if let Some(ts) = self.tileset.take() {
                    self.finish_inline_tileset(ts);
                }
            }
            b"data" => {
                if let Some(pending) = self.layer.as_mut().filter(|l| l.in_data) {
                    pending.in_data = false;
                    let body = std::mem::take(&mut pending.body);
                    if pending.readable {
                        push_csv(&mut pending.layer, &body);
                    }
                }
            }
            b"layer" => {
                if let Some(pending) = self.layer.take() {
                    self.push_layer(pending.layer);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(pending) = self.layer.as_mut().filter(|l| l.in_data && l.readable) {
            pending.body.push_str(text);
        }
    }

    fn read_map(&self, e: &BytesStart<'_>) -> Result<IrMap, MapError> {
        Ok(IrMap {
            width: required_u32(e, "width", self.path)?,
            height: required_u32(e, "height", self.path)?,
            tile_w: required_u32(e, "tilewidth", self.path)?,
            tile_h: required_u32(e, "tileheight", self.path)?,
            orientation: attr(e, "orientation").unwrap_or_else(|| DEFAULT_ORIENTATION.to_owned()),
            render_order: attr(e, "renderorder")
                .unwrap_or_else(|| DEFAULT_RENDER_ORDER.to_owned()),
            tilesets: Vec::new(),
            layers: Vec::new(),
        })
    }

    fn open_tileset(&mut self, e: &BytesStart<'_>, empty: bool) {
        let first_gid = match attr(e, "firstgid") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("tileset firstgid {:?} is not a number, using 1", raw);
                1
            }),
            None => 1,
        };
        let name = attr(e, "name");

        if let Some(source) = attr(e, "source") {
            let ts = load_external_tileset(self.path, &source, first_gid, name, self.config);
            self.push_tileset(ts);
            return;
        }

        let pending = PendingTileset {
            first_gid,
            name,
            image: None,
            tile_depth: 0,
        };
        if empty {
            self.finish_inline_tileset(pending);
        } else {
            self.tileset = Some(pending);
        }
    }

    fn finish_inline_tileset(&mut self, ts: PendingTileset) {
        let image = ts
            .image
            .map(|src| paths::resolve_reference(self.path, &src, self.config.parent_dirs));
        self.push_tileset(IrTileset {
            first_gid: ts.first_gid,
            name: ts.name.unwrap_or_else(|| DEFAULT_TILESET_NAME.to_owned()),
            image,
        });
    }

    fn read_layer(&self, e: &BytesStart<'_>) -> IrLayer {
        let (map_w, map_h) = self
            .map
            .as_ref()
            .map(|m| (m.width, m.height))
            .unwrap_or((1, 1));

        let mut layer = IrLayer::new(
            attr(e, "name").unwrap_or_default(),
            optional_u32(e, "width").filter(|w| *w > 0).unwrap_or(map_w),
            optional_u32(e, "height").filter(|h| *h > 0).unwrap_or(map_h),
        );
        if let Some(v) = attr(e, "visible") {
            layer.visible = v.trim() != "0";
        }
        if let Some(o) = attr(e, "opacity")
            .and_then(|o| o.trim().parse::<f32>().ok())
            .filter(|o| o.is_finite())
        {
            layer.opacity = o;
        }
        layer
    }

    fn push_tileset(&mut self, ts: IrTileset) {
        if let Some(map) = self.map.as_mut() {
            map.tilesets.push(ts);
        }
    }

    fn push_layer(&mut self, layer: IrLayer) {
        if let Some(map) = self.map.as_mut() {
            map.layers.push(layer);
        }
    }
}

/// Plain CSV or `<tile gid>` children are readable; base64 and compressed
/// payloads are not.
fn data_is_plain(e: &BytesStart<'_>, layer: &str) -> bool {
    let encoding = attr(e, "encoding");
    let compression = attr(e, "compression").filter(|c| !c.is_empty());
    match (encoding.as_deref(), compression) {
        (None | Some("csv"), None) => true,
        (enc, comp) => {
            warn!(
                "layer '{}': unsupported data encoding {:?} / compression {:?}, left empty",
                layer, enc, comp
            );
            false
        }
    }
}

fn push_cell(layer: &mut IrLayer, token: &str) {
    match gid::parse_token(token) {
        Some(v) => layer.data.push(v),
        None => {
            warn!(
                "layer '{}': skipping malformed tile {:?} at {}",
                layer.name,
                token.trim(),
                layer.data.len()
            );
            layer.data.push(0);
        }
    }
}

/// Appends comma-separated cells. A trailing comma does not add a cell.
fn push_csv(layer: &mut IrLayer, text: &str) {
    let mut tokens = text.split(',').peekable();
    while let Some(token) = tokens.next() {
        if token.trim().is_empty() && tokens.peek().is_none() {
            break;
        }
        push_cell(layer, token);
    }
}

pub fn decode_tmx_str(text: &str, path: &Path, config: &MapConfig) -> Result<IrMap, MapError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut parser = TmxParser {
        path,
        config,
        map: None,
        tileset: None,
        layer: None,
    };

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(source) => {
                if parser.map.is_none() {
                    return Err(MapError::Xml {
                        path: path.to_path_buf(),
                        source,
                    });
                }
                warn!(
                    "{}: markup error at byte {}: {}; keeping what was read",
                    path.display(),
                    reader.buffer_position(),
                    source
                );
                break;
            }
        };

        match event {
            Event::Start(e) => parser.open(&e, false)?,
            Event::Empty(e) => parser.open(&e, true)?,
            Event::End(e) => parser.close(e.name().as_ref()),
            Event::Text(t) => match t.unescape() {
                Ok(body) => parser.text(&body),
                Err(err) => warn!("{}: unreadable text: {}", path.display(), err),
            },
            Event::CData(c) => parser.text(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
    }

    parser
        .map
        .ok_or_else(|| MapError::geometry(path, "no <map> element"))
}
