// src/loader/json_loader.rs
//
// Every field below the map's geometry is read as a raw `JsonValue` and
// checked by hand, so one wrongly typed property degrades to its default
// instead of rejecting the whole document.
use crate::config::MapConfig;
use crate::error::MapError;
use crate::gid;
use crate::ir_map::*;
use crate::loader::{load_external_tileset, paths, read_document, ExternalTileset};
use log::warn;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    name: Option<JsonValue>,
    #[serde(default)]
    width: Option<JsonValue>,
    #[serde(default)]
    height: Option<JsonValue>,
    #[serde(default)]
    visible: Option<JsonValue>,
    #[serde(default)]
    opacity: Option<JsonValue>,
    #[serde(default)]
    data: Option<JsonValue>,
    #[serde(default)]
    encoding: Option<JsonValue>,
    #[serde(default)]
    compression: Option<JsonValue>,
}

#[derive(Default, Deserialize)]
struct JsonTilesetRef {
    #[serde(default)]
    firstgid: Option<JsonValue>,
    #[serde(default)]
    name: Option<JsonValue>,
    #[serde(default)]
    image: Option<JsonValue>,
    #[serde(default)]
    source: Option<JsonValue>,
}

#[derive(Deserialize)]
struct JsonMap {
    #[serde(default)]
    width: Option<JsonValue>,
    #[serde(default)]
    height: Option<JsonValue>,
    #[serde(default)]
    tilewidth: Option<JsonValue>,
    #[serde(default)]
    tileheight: Option<JsonValue>,
    #[serde(default)]
    orientation: Option<JsonValue>,
    #[serde(default)]
    renderorder: Option<JsonValue>,
    #[serde(default)]
    layers: Vec<JsonValue>,
    #[serde(default)]
    tilesets: Vec<JsonValue>,
}

/// Standalone `.json`/`.tsj` tileset. Only the fields the map needs.
#[derive(Deserialize)]
struct JsonTilesetDoc {
    #[serde(default)]
    name: Option<JsonValue>,
    #[serde(default)]
    image: Option<JsonValue>,
}

/// Applies `read` to an optional property. Absent and `null` values are
/// silently `None`; a value of the wrong type is `None` with a warning.
fn lenient<T>(
    value: Option<&JsonValue>,
    field: &str,
    owner: &str,
    read: impl FnOnce(&JsonValue) -> Option<T>,
) -> Option<T> {
    match value {
        None | Some(JsonValue::Null) => None,
        Some(v) => {
            let out = read(v);
            if out.is_none() {
                warn!("{}: ignoring invalid `{}` value {}", owner, field, v);
            }
            out
        }
    }
}

fn as_string(v: &JsonValue) -> Option<String> {
    v.as_str().map(str::to_owned)
}

fn as_u32(v: &JsonValue) -> Option<u32> {
    v.as_u64().and_then(|n| u32::try_from(n).ok())
}

fn as_opacity(v: &JsonValue) -> Option<f32> {
    v.as_f64().map(|o| o as f32).filter(|o| o.is_finite())
}

fn geometry(value: Option<&JsonValue>, field: &str, path: &Path) -> Result<u32, MapError> {
    let value = match value {
        None | Some(JsonValue::Null) => {
            return Err(MapError::geometry(path, format!("missing `{field}`")))
        }
        Some(v) => v,
    };
    match as_u32(value) {
        Some(0) => Err(MapError::geometry(path, format!("`{field}` must be positive"))),
        Some(v) => Ok(v),
        None => Err(MapError::geometry(
            path,
            format!("`{field}` is not a number: {value}"),
        )),
    }
}

/// A single cell of a `data` array: integer (any sign/width) or string.
fn cell_gid(value: &JsonValue) -> Option<u32> {
    match value {
        JsonValue::Number(n) => n.as_i64().and_then(gid::from_i64),
        JsonValue::String(s) => gid::parse_token(s),
        _ => None,
    }
}

fn layer_data(layer: &JsonLayer, name: &str) -> Vec<u32> {
    let owner = format!("layer '{name}'");
    match layer.encoding.as_ref() {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::String(enc)) if enc == "csv" => {}
        Some(enc) => {
            warn!("{}: unsupported encoding {}, left empty", owner, enc);
            return Vec::new();
        }
    }
    let compressed = lenient(layer.compression.as_ref(), "compression", &owner, as_string);
    if let Some(c) = compressed.filter(|c| !c.is_empty()) {
        warn!("{}: unsupported compression '{}', left empty", owner, c);
        return Vec::new();
    }

    match &layer.data {
        Some(JsonValue::Array(cells)) => cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                cell_gid(cell).unwrap_or_else(|| {
                    warn!("{}: skipping malformed tile {} at {}", owner, cell, idx);
                    0
                })
            })
            .collect(),
        Some(JsonValue::String(_)) => {
            warn!("{}: encoded tile data is not supported, left empty", owner);
            Vec::new()
        }
        // object groups, image layers, groups
        _ => Vec::new(),
    }
}

fn read_tileset(raw: JsonValue, index: usize, path: &Path, config: &MapConfig) -> IrTileset {
    let owner = format!("tileset #{index}");
    let ts: JsonTilesetRef = serde_json::from_value(raw).unwrap_or_else(|err| {
        warn!("{}: {}; treated as empty", owner, err);
        JsonTilesetRef::default()
    });

    let first_gid = lenient(ts.firstgid.as_ref(), "firstgid", &owner, as_u32).unwrap_or(1);
    let name = lenient(ts.name.as_ref(), "name", &owner, as_string);
    let image = lenient(ts.image.as_ref(), "image", &owner, as_string);
    let source = lenient(ts.source.as_ref(), "source", &owner, as_string);

    match (image, source) {
        (Some(image), _) => IrTileset {
            first_gid,
            name: name.unwrap_or_else(|| super::DEFAULT_TILESET_NAME.to_owned()),
            image: Some(paths::resolve_reference(path, &image, config.parent_dirs)),
        },
        (None, Some(source)) => load_external_tileset(path, &source, first_gid, name, config),
        (None, None) => IrTileset {
            first_gid,
            name: name.unwrap_or_else(|| super::DEFAULT_TILESET_NAME.to_owned()),
            image: None,
        },
    }
}

fn read_layer(raw: JsonValue, index: usize, width: u32, height: u32) -> IrLayer {
    let l: JsonLayer = match serde_json::from_value(raw) {
        Ok(l) => l,
        Err(err) => {
            warn!("layer #{}: {}; left empty", index, err);
            return IrLayer::new(String::new(), width, height);
        }
    };

    let owner = format!("layer #{index}");
    let name = lenient(l.name.as_ref(), "name", &owner, as_string).unwrap_or_default();
    let owner = format!("layer '{name}'");

    let mut layer = IrLayer::new(
        name.clone(),
        lenient(l.width.as_ref(), "width", &owner, as_u32)
            .filter(|w| *w > 0)
            .unwrap_or(width),
        lenient(l.height.as_ref(), "height", &owner, as_u32)
            .filter(|h| *h > 0)
            .unwrap_or(height),
    );
    if let Some(visible) = lenient(l.visible.as_ref(), "visible", &owner, JsonValue::as_bool) {
        layer.visible = visible;
    }
    if let Some(opacity) = lenient(l.opacity.as_ref(), "opacity", &owner, as_opacity) {
        layer.opacity = opacity;
    }
    layer.data = layer_data(&l, &name);
    layer
}

pub fn decode_json_str(text: &str, path: &Path, config: &MapConfig) -> Result<IrMap, MapError> {
    let j: JsonMap = serde_json::from_str(text).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let width = geometry(j.width.as_ref(), "width", path)?;
    let height = geometry(j.height.as_ref(), "height", path)?;
    let tile_w = geometry(j.tilewidth.as_ref(), "tilewidth", path)?;
    let tile_h = geometry(j.tileheight.as_ref(), "tileheight", path)?;
    let owner = path.display().to_string();

    // Build IR tilesets, keeping file order
    let tilesets = j
        .tilesets
        .into_iter()
        .enumerate()
        .map(|(idx, ts)| read_tileset(ts, idx, path, config))
        .collect();

    let layers = j
        .layers
        .into_iter()
        .enumerate()
        .map(|(idx, l)| read_layer(l, idx, width, height))
        .collect();

    Ok(IrMap {
        width,
        height,
        tile_w,
        tile_h,
        orientation: lenient(j.orientation.as_ref(), "orientation", &owner, as_string)
            .unwrap_or_else(|| DEFAULT_ORIENTATION.to_owned()),
        render_order: lenient(j.renderorder.as_ref(), "renderorder", &owner, as_string)
            .unwrap_or_else(|| DEFAULT_RENDER_ORDER.to_owned()),
        tilesets,
        layers,
    })
}

/// Reads a JSON tileset document; its image is resolved against the
/// document's own directory.
pub fn decode_tileset_file(path: &Path, config: &MapConfig) -> Result<ExternalTileset, MapError> {
    let txt = read_document(path)?;
    let doc: JsonTilesetDoc = serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let owner = path.display().to_string();
    let image = lenient(doc.image.as_ref(), "image", &owner, as_string).ok_or_else(|| {
        MapError::MissingImage {
            path: path.to_path_buf(),
        }
    })?;

    Ok(ExternalTileset {
        name: lenient(doc.name.as_ref(), "name", &owner, as_string),
        image: paths::resolve_reference(path, &image, config.parent_dirs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock went backwards")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("tilemap_json_{nanos}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    fn decode(json: &str) -> Result<IrMap, MapError> {
        decode_json_str(json, Path::new("maps/level.json"), &MapConfig::default())
    }

    #[test]
    fn parses_geometry_and_defaults() {
        let ir = decode(
            r#"{ "width": 3, "height": 2, "tilewidth": 16, "tileheight": 8,
                 "layers": [ { "name": "ground", "data": [1,2,3,4,5,6] } ] }"#,
        )
        .expect("decode");

        assert_eq!((ir.width, ir.height, ir.tile_w, ir.tile_h), (3, 2, 16, 8));
        assert_eq!(ir.orientation, "orthogonal");
        assert_eq!(ir.render_order, "right-down");
        assert!(ir.tilesets.is_empty());

        let layer = &ir.layers[0];
        assert_eq!((layer.width, layer.height), (3, 2));
        assert!(layer.visible);
        assert_eq!(layer.opacity, 1.0);
        assert_eq!(layer.data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn accepts_string_and_negative_cells() {
        let ir = decode(
            r#"{ "width": 4, "height": 1, "tilewidth": 8, "tileheight": 8,
                 "layers": [ { "name": "L", "width": 4, "height": 1,
                               "data": ["7", -2147483643, 2147483653, 0] } ] }"#,
        )
        .expect("decode");
        assert_eq!(ir.layers[0].data, vec![7, 0x8000_0005, 0x8000_0005, 0]);
    }

    #[test]
    fn malformed_cells_are_zeroed_not_fatal() {
        let ir = decode(
            r#"{ "width": 4, "height": 1, "tilewidth": 8, "tileheight": 8,
                 "layers": [ { "name": "L", "data": [1, "x", 1.5, 3] } ] }"#,
        )
        .expect("decode");
        assert_eq!(ir.layers[0].data, vec![1, 0, 0, 3]);
    }

    #[test]
    fn missing_geometry_is_fatal() {
        let err = decode(r#"{ "width": 4, "height": 1, "tilewidth": 8, "layers": [] }"#)
            .err()
            .expect("expected geometry error");
        assert!(matches!(err, MapError::MalformedGeometry { reason, .. } if reason.contains("tileheight")));

        let err = decode(r#"{ "width": 0, "height": 1, "tilewidth": 8, "tileheight": 8 }"#)
            .err()
            .expect("expected geometry error");
        assert!(matches!(err, MapError::MalformedGeometry { .. }));
    }

    #[test]
    fn non_numeric_geometry_is_malformed() {
        let err = decode(r#"{ "width": "4", "height": 1, "tilewidth": 8, "tileheight": 8 }"#)
            .err()
            .expect("expected geometry error");
        assert!(matches!(err, MapError::MalformedGeometry { reason, .. } if reason.contains("width")));

        let err = decode(r#"{ "width": 4, "height": 1, "tilewidth": -8, "tileheight": 8 }"#)
            .err()
            .expect("expected geometry error");
        assert!(matches!(err, MapError::MalformedGeometry { .. }));
    }

    #[test]
    fn wrongly_typed_properties_fall_back_to_defaults() {
        let ir = decode(
            r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8, "orientation": 3,
                 "tilesets": [ { "firstgid": "1", "name": null, "image": "a.png" }, 7 ],
                 "layers": [
                   { "name": "ok", "data": [7] },
                   { "name": "L", "visible": 1, "opacity": "0.5", "width": "x", "data": [5] },
                   { "name": null, "opacity": 0.25, "visible": false, "data": [6] },
                   "not a layer"
                 ] }"#,
        )
        .expect("decode");

        assert_eq!(ir.orientation, "orthogonal");
        assert_eq!(ir.tilesets.len(), 2);
        assert_eq!(ir.tilesets[0].first_gid, 1);
        assert_eq!(ir.tilesets[0].name, crate::loader::DEFAULT_TILESET_NAME);
        assert_eq!(ir.tilesets[1].image, None);

        assert_eq!(ir.layers.len(), 4);
        let bad = &ir.layers[1];
        assert!(bad.visible);
        assert_eq!(bad.opacity, 1.0);
        assert_eq!((bad.width, bad.data.clone()), (1, vec![5]));

        let unnamed = &ir.layers[2];
        assert_eq!(unnamed.name, "");
        assert!(!unnamed.visible);
        assert_eq!(unnamed.opacity, 0.25);
        assert!(ir.layers[3].data.is_empty());
    }

    #[test]
    fn returns_typed_error_for_malformed_json() {
        let err = decode("{ not json").err().expect("expected decode error");
        assert!(matches!(err, MapError::Json { .. }));
    }

    #[test]
    fn inline_image_is_relative_to_map() {
        let ir = decode(
            r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8, "extra": {"a": 1},
                 "tilesets": [ { "firstgid": 1, "name": "terrain", "image": "img/terrain.png" },
                               { "firstgid": 40 } ] }"#,
        )
        .expect("decode");
        assert_eq!(ir.tilesets[0].name, "terrain");
        assert_eq!(ir.tilesets[0].image, Some(PathBuf::from("maps/img/terrain.png")));
        assert_eq!(ir.tilesets[1].first_gid, 40);
        assert_eq!(ir.tilesets[1].image, None);
    }

    #[test]
    fn encoded_layers_are_left_empty() {
        let ir = decode(
            r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
                 "layers": [ { "name": "b64", "encoding": "base64", "data": "AQAAAA==" },
                             { "name": "objects", "type": "objectgroup", "objects": [] } ] }"#,
        )
        .expect("decode");
        assert_eq!(ir.layers.len(), 2);
        assert!(ir.layers.iter().all(|l| l.data.is_empty()));
        assert_eq!(ir.layers[1].width, 1);
    }

    #[test]
    fn external_json_tileset_uses_referencing_first_gid() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("maps")).expect("maps dir");
        let map_path = dir.join("maps").join("level.json");
        fs::write(
            dir.join("shared.tsj"),
            r#"{ "name": "shared", "firstgid": 999, "image": "shared.png",
                 "tilewidth": 16, "tileheight": 16 }"#,
        )
        .expect("write tileset");

        let ir = decode_json_str(
            r#"{ "width": 1, "height": 1, "tilewidth": 16, "tileheight": 16,
                 "tilesets": [ { "firstgid": 5, "source": "../shared.tsj" } ] }"#,
            &map_path,
            &MapConfig::default(),
        )
        .expect("decode");

        let ts = &ir.tilesets[0];
        assert_eq!(ts.first_gid, 5);
        assert_eq!(ts.name, "shared");
        assert_eq!(ts.image, Some(dir.join("shared.png")));
    }

    #[test]
    fn tileset_document_without_image_is_an_error() {
        let dir = temp_dir();
        let ts_path = dir.join("empty.json");
        fs::write(&ts_path, r#"{ "name": "empty" }"#).expect("write tileset");

        let err = decode_tileset_file(&ts_path, &MapConfig::default())
            .err()
            .expect("expected missing image");
        assert!(matches!(err, MapError::MissingImage { .. }));
    }
}
