use crate::config::MapConfig;
use crate::error::MapError;
use crate::ir_map::IrMap;
use crate::layer::Layer;
use crate::loader::{self, MapFormat};
use crate::texture::TextureLoader;
use crate::tileset::TilesetRegistry;
use log::info;
use std::path::Path;

/// A loaded map: geometry, atlases and layers.
///
/// Built once by a successful load and never mutated afterwards. `H` is the
/// texture handle type of the [`TextureLoader`] used to build it.
#[derive(Debug, Clone)]
pub struct MapDocument<H> {
    cell_width: u32,
    cell_height: u32,
    grid_width: u32,
    grid_height: u32,
    orientation: String,
    render_order: String,
    collision_threshold: u32,
    tilesets: TilesetRegistry<H>,
    layers: Vec<Layer>,
}

impl<H: Clone> MapDocument<H> {
    /// Loads a `.json`/`.tmj` or `.tmx` map with the default [`MapConfig`].
    pub fn load<L>(path: impl AsRef<Path>, textures: &mut L) -> Result<Self, MapError>
    where
        L: TextureLoader<Handle = H>,
    {
        Self::load_with_config(path, textures, &MapConfig::default())
    }

    /// Loads a map file, picking the parser from its extension.
    ///
    /// Fails only when the file cannot be read, the format is not
    /// supported, or the map geometry is unusable. Broken tilesets and
    /// tile tokens are logged and degraded instead.
    pub fn load_with_config<L>(
        path: impl AsRef<Path>,
        textures: &mut L,
        config: &MapConfig,
    ) -> Result<Self, MapError>
    where
        L: TextureLoader<Handle = H>,
    {
        let path = path.as_ref();
        let ir = loader::decode_map_file(path, config)?;
        let map = Self::from_ir(ir, textures, config);
        info!(
            "loaded map {} ({}x{} cells of {}x{} px, {} tilesets, {} layers)",
            path.display(),
            map.grid_width,
            map.grid_height,
            map.cell_width,
            map.cell_height,
            map.tilesets.len(),
            map.layers.len()
        );
        Ok(map)
    }

    /// Parses map text that is already in memory.
    ///
    /// `path` stands for the document's location and anchors relative
    /// tileset and image references.
    pub fn load_from_str<L>(
        text: &str,
        format: MapFormat,
        path: impl AsRef<Path>,
        textures: &mut L,
        config: &MapConfig,
    ) -> Result<Self, MapError>
    where
        L: TextureLoader<Handle = H>,
    {
        let ir = loader::decode_map_str(text, format, path.as_ref(), config)?;
        Ok(Self::from_ir(ir, textures, config))
    }

    fn from_ir<L>(ir: IrMap, textures: &mut L, config: &MapConfig) -> Self
    where
        L: TextureLoader<Handle = H>,
    {
        let mut tilesets = TilesetRegistry::new();
        for ts in &ir.tilesets {
            tilesets.register(textures, ts.first_gid, ts.name.clone(), ts.image.as_deref());
        }

        let (tw, th) = (ir.tile_w, ir.tile_h);
        let layers = ir
            .layers
            .into_iter()
            .map(|l| Layer::from_ir(l, tw, th, config.collision_threshold))
            .collect();

        MapDocument {
            cell_width: ir.tile_w,
            cell_height: ir.tile_h,
            grid_width: ir.width,
            grid_height: ir.height,
            orientation: ir.orientation,
            render_order: ir.render_order,
            collision_threshold: config.collision_threshold,
            tilesets,
            layers,
        }
    }
}

impl<H> MapDocument<H> {
    /// Cell width in pixels.
    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    /// Cell height in pixels.
    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// Same as [`cell_width`](Self::cell_width).
    pub fn tile_size(&self) -> u32 {
        self.cell_width
    }

    /// Map width in cells.
    pub fn grid_width(&self) -> u32 {
        self.grid_width
    }

    /// Map height in cells.
    pub fn grid_height(&self) -> u32 {
        self.grid_height
    }

    /// `grid_width * cell_width`.
    pub fn map_width_px(&self) -> u32 {
        self.grid_width.saturating_mul(self.cell_width)
    }

    /// `grid_height * cell_height`.
    pub fn map_height_px(&self) -> u32 {
        self.grid_height.saturating_mul(self.cell_height)
    }

    /// Orientation as written in the file, e.g. `"orthogonal"`.
    pub fn orientation(&self) -> &str {
        &self.orientation
    }

    /// Render order as written in the file, e.g. `"right-down"`.
    pub fn render_order(&self) -> &str {
        &self.render_order
    }

    /// Threshold the tiles were classified with.
    pub fn collision_threshold(&self) -> u32 {
        self.collision_threshold
    }

    /// Registered atlases.
    pub fn tilesets(&self) -> &TilesetRegistry<H> {
        &self.tilesets
    }

    /// Layers in declared (draw) order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// First layer called `name`.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }
}
