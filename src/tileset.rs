use crate::texture::{LoadedTexture, TextureLoader};
use log::{debug, warn};
use macroquad::prelude::Rect;
use std::path::Path;

/// One atlas image registered under the smallest GID it supplies.
#[derive(Debug, Clone)]
pub struct TilesetEntry<H> {
    /// Smallest global id this atlas supplies
    pub first_gid: u32,
    /// Tileset name from the document
    pub name: String,
    /// Handle from the texture loader; the loader owns the image
    pub texture: H,
    /// Atlas width in pixels
    pub image_width: u32,
    /// Atlas height in pixels
    pub image_height: u32,
    /// True if the image failed to load and the placeholder stands in
    pub placeholder: bool,
}

impl<H> TilesetEntry<H> {
    /// Pixel rectangle of `local_id` inside this atlas, for cells of
    /// `cell_w × cell_h`.
    ///
    /// Returns `None` for atlases narrower than one cell and for ids whose
    /// rectangle would extend past the image.
    pub fn source_rect(&self, local_id: u32, cell_w: u32, cell_h: u32) -> Option<Rect> {
        if cell_w == 0 || cell_h == 0 {
            return None;
        }
        let tiles_per_row = self.image_width / cell_w;
        if tiles_per_row == 0 {
            return None;
        }

        let sx = u64::from(local_id % tiles_per_row) * u64::from(cell_w);
        let sy = u64::from(local_id / tiles_per_row) * u64::from(cell_h);
        if sx + u64::from(cell_w) > u64::from(self.image_width)
            || sy + u64::from(cell_h) > u64::from(self.image_height)
        {
            return None;
        }

        Some(Rect::new(sx as f32, sy as f32, cell_w as f32, cell_h as f32))
    }
}

/// Ordered list of atlases for one map.
#[derive(Debug, Clone)]
pub struct TilesetRegistry<H> {
    entries: Vec<TilesetEntry<H>>,
}

impl<H> Default for TilesetRegistry<H> {
    fn default() -> Self {
        TilesetRegistry {
            entries: Vec::new(),
        }
    }
}

impl<H: Clone> TilesetRegistry<H> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an atlas, loading its image through `loader`.
    ///
    /// A missing path or a failed load registers the loader's placeholder
    /// instead; the map stays loadable either way.
    pub fn register<L>(
        &mut self,
        loader: &mut L,
        first_gid: u32,
        name: impl Into<String>,
        image: Option<&Path>,
    ) -> &TilesetEntry<H>
    where
        L: TextureLoader<Handle = H>,
    {
        let name = name.into();
        let (tex, placeholder) = match image {
            Some(path) => match loader.load_texture(path) {
                Ok(tex) => {
                    debug!(
                        "tileset '{}' (firstgid {}) -> {} ({}x{})",
                        name,
                        first_gid,
                        path.display(),
                        tex.width,
                        tex.height
                    );
                    (tex, false)
                }
                Err(err) => {
                    warn!("tileset '{}': {}; using placeholder", name, err);
                    (loader.placeholder(), true)
                }
            },
            None => {
                warn!("tileset '{}' has no usable image; using placeholder", name);
                (loader.placeholder(), true)
            }
        };

        let LoadedTexture {
            handle,
            width,
            height,
        } = tex;
        self.entries.push(TilesetEntry {
            first_gid,
            name,
            texture: handle,
            image_width: width,
            image_height: height,
            placeholder,
        });
        &self.entries[self.entries.len() - 1]
    }
}

impl<H> TilesetRegistry<H> {
    /// Finds the atlas owning `gid` and the id local to it.
    ///
    /// Picks the entry with the greatest `first_gid <= gid`; on equal
    /// `first_gid` the earlier registration wins. `gid == 0` never resolves.
    pub fn resolve(&self, gid: u32) -> Option<(&TilesetEntry<H>, u32)> {
        if gid == 0 {
            return None;
        }
        let mut best: Option<&TilesetEntry<H>> = None;
        for entry in &self.entries {
            if entry.first_gid > gid {
                continue;
            }
            match best {
                Some(b) if b.first_gid >= entry.first_gid => {}
                _ => best = Some(entry),
            }
        }
        best.map(|e| (e, gid - e.first_gid))
    }

    /// Registered atlases in registration order.
    pub fn entries(&self) -> &[TilesetEntry<H>] {
        &self.entries
    }

    /// Looks an atlas up by name.
    pub fn by_name(&self, name: &str) -> Option<&TilesetEntry<H>> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of registered atlases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no atlas is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
