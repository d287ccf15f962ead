// tests/load_tests.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tilemap_engine::{
    HeadlessHandle, HeadlessTextures, MapConfig, MapDocument, MapError, MapFormat,
};

fn assets() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn fixture_textures() -> HeadlessTextures {
    HeadlessTextures::new()
        .with_image(assets().join("images/terrain.png"), 64, 48)
        .with_image(assets().join("images/walls.png"), 64, 64)
}

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tilemap_load_{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn tile_counts(map: &MapDocument<HeadlessHandle>) -> Vec<usize> {
    map.layers().iter().map(|l| l.tiles.len()).collect()
}

#[test]
fn tmx_fixture_loads_with_external_tileset() -> anyhow::Result<()> {
    let mut textures = fixture_textures();
    let map = MapDocument::load(assets().join("maps/town.tmx"), &mut textures)?;

    assert_eq!((map.grid_width(), map.grid_height()), (4, 3));
    assert_eq!((map.cell_width(), map.cell_height()), (16, 16));
    assert_eq!((map.map_width_px(), map.map_height_px()), (64, 48));
    assert_eq!(map.orientation(), "orthogonal");
    assert_eq!(map.render_order(), "right-down");

    let ts = map.tilesets().entries();
    assert_eq!(ts.len(), 2);
    assert_eq!((ts[0].first_gid, ts[0].name.as_str()), (1, "terrain"));
    assert_eq!((ts[0].image_width, ts[0].image_height), (64, 48));
    assert!(!ts[0].placeholder);
    assert_eq!((ts[1].first_gid, ts[1].name.as_str()), (101, "walls"));

    assert_eq!(
        textures.requested(),
        &[
            assets().join("images/terrain.png"),
            assets().join("images/walls.png")
        ]
    );
    assert_eq!(tile_counts(&map), vec![12, 4, 1]);
    Ok(())
}

#[test]
fn json_and_tmx_fixtures_agree() -> anyhow::Result<()> {
    let tmx = MapDocument::load(assets().join("maps/town.tmx"), &mut fixture_textures())?;
    let json = MapDocument::load(assets().join("maps/town.json"), &mut fixture_textures())?;

    assert_eq!(tmx.grid_width(), json.grid_width());
    assert_eq!(tmx.grid_height(), json.grid_height());
    assert_eq!(tile_counts(&tmx), tile_counts(&json));
    for (a, b) in tmx.layers().iter().zip(json.layers()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.visible, b.visible);
        assert_eq!(a.opacity, b.opacity);
        assert_eq!(a.tiles, b.tiles);
    }
    let names = |m: &MapDocument<HeadlessHandle>| -> Vec<(u32, String)> {
        m.tilesets()
            .entries()
            .iter()
            .map(|e| (e.first_gid, e.name.clone()))
            .collect()
    };
    assert_eq!(names(&tmx), names(&json));
    Ok(())
}

#[test]
fn reloading_is_idempotent() -> anyhow::Result<()> {
    let path = assets().join("maps/town.tmx");
    let first = MapDocument::load(&path, &mut fixture_textures())?;
    let second = MapDocument::load(&path, &mut fixture_textures())?;

    assert_eq!(
        (first.grid_width(), first.grid_height(), first.cell_width(), first.cell_height()),
        (second.grid_width(), second.grid_height(), second.cell_width(), second.cell_height())
    );
    assert_eq!(tile_counts(&first), tile_counts(&second));
    Ok(())
}

#[test]
fn grid_layer_materializes_only_nonzero_cells() -> anyhow::Result<()> {
    let json = r#"{
        "width": 2, "height": 2, "tilewidth": 16, "tileheight": 8,
        "layers": [ { "name": "L", "width": 2, "height": 2, "data": [0, 5, 0, 100] } ]
    }"#;
    let map = MapDocument::load_from_str(
        json,
        MapFormat::Json,
        "inline.json",
        &mut HeadlessTextures::new(),
        &MapConfig::default(),
    )?;

    let tiles = &map.layers()[0].tiles;
    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles[0].sequence_index, 1);
    assert_eq!((tiles[0].position.x, tiles[0].position.y), (16.0, 0.0));
    assert_eq!(tiles[1].sequence_index, 3);
    assert_eq!((tiles[1].position.x, tiles[1].position.y), (16.0, 8.0));
    Ok(())
}

#[test]
fn markup_layer_skips_zero_cells() -> anyhow::Result<()> {
    let tmx = "<map width=\"2\" height=\"2\" tilewidth=\"8\" tileheight=\"8\">\
               <layer name=\"L\" width=\"2\" height=\"2\"><data encoding=\"csv\">1, 2,\n3, 0</data></layer>\
               </map>";
    let map = MapDocument::load_from_str(
        tmx,
        MapFormat::Tmx,
        "inline.tmx",
        &mut HeadlessTextures::new(),
        &MapConfig::default(),
    )?;

    let idx: Vec<usize> = map.layers()[0]
        .tiles
        .iter()
        .map(|t| t.sequence_index)
        .collect();
    assert_eq!(idx, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn missing_atlas_image_degrades_to_placeholder() -> anyhow::Result<()> {
    let dir = temp_dir();
    let map_path = dir.join("level.tmx");
    fs::write(
        &map_path,
        r#"<map width="1" height="1" tilewidth="16" tileheight="16">
             <tileset firstgid="1" source="gone.tsx"/>
             <tileset firstgid="10" name="inline"><image source="nope.png"/></tileset>
             <layer name="L"><data>11</data></layer>
           </map>"#,
    )?;

    let map = MapDocument::load(&map_path, &mut HeadlessTextures::new())?;
    let entries = map.tilesets().entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.placeholder));
    assert!(entries.iter().all(|e| e.texture == HeadlessHandle::Placeholder));
    // 32x32 placeholder, 16px cells: local id 1 still has a region to draw
    assert_eq!(map.draw_commands().len(), 1);
    Ok(())
}

#[test]
fn parent_dir_policy_is_configurable() -> anyhow::Result<()> {
    let dir = temp_dir();
    fs::create_dir_all(dir.join("a/b/c"))?;
    fs::write(
        dir.join("a/shared.tsx"),
        r#"<tileset name="shared"><image source="shared.png"/></tileset>"#,
    )?;
    let map_text = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
                        <tileset firstgid="1" source="../../shared.tsx"/>
                      </map>"#;
    let map_path = dir.join("a/b/c/level.tmx");
    fs::write(&map_path, map_text)?;

    let mut textures = HeadlessTextures::new().with_image(dir.join("a/shared.png"), 8, 8);
    let map = MapDocument::load(&map_path, &mut textures)?;
    assert_eq!(map.tilesets().entries()[0].name, "shared");
    assert!(!map.tilesets().entries()[0].placeholder);

    let single = MapConfig {
        parent_dirs: tilemap_engine::ParentDirPolicy::SingleLevel,
        ..MapConfig::default()
    };
    let map = MapDocument::load_with_config(&map_path, &mut textures, &single)?;
    // only one "../" is folded; the atlas path keeps the second one
    assert!(map.tilesets().entries()[0].placeholder);
    assert_eq!(
        textures.requested().last(),
        Some(&dir.join("a/b/../shared.png"))
    );
    Ok(())
}

#[test]
fn unsupported_format_is_rejected() {
    let err = MapDocument::load("foo.txt", &mut HeadlessTextures::new()).unwrap_err();
    match err {
        MapError::UnsupportedFormat(path) => assert_eq!(path, "foo.txt"),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
}

#[test]
fn missing_file_is_io_error() {
    let err = MapDocument::load(
        Path::new("definitely/not/here.tmx"),
        &mut HeadlessTextures::new(),
    )
    .unwrap_err();
    assert!(matches!(err, MapError::Io { .. }));
}
