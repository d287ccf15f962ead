//! Texture collaborators.
//!
//! The map never owns image data. It asks a [`TextureLoader`] for a handle
//! and remembers the handle together with the pixel size; caching and
//! freeing are the loader's business.

use crate::error::MapError;
use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Side length of the solid placeholder used for missing atlases.
pub const PLACEHOLDER_SIZE: u32 = 32;

/// A handle plus the image dimensions in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTexture<H> {
    /// Opaque handle understood by the drawing side
    pub handle: H,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Source of atlas images for a map.
pub trait TextureLoader {
    /// What draw commands carry around.
    type Handle: Clone;

    /// Loads (or returns the cached) image at `path`.
    fn load_texture(&mut self, path: &Path) -> Result<LoadedTexture<Self::Handle>, MapError>;

    /// A deterministic stand-in for images that failed to load.
    ///
    /// Always [`PLACEHOLDER_SIZE`] square and a single solid color.
    fn placeholder(&mut self) -> LoadedTexture<Self::Handle>;
}

/// Loads images into macroquad textures, caching them by path.
///
/// Needs a live macroquad context, i.e. must be used from inside
/// `#[macroquad::main]`.
#[derive(Default)]
pub struct MacroquadTextures {
    cache: HashMap<PathBuf, LoadedTexture<Texture2D>>,
    placeholder: Option<LoadedTexture<Texture2D>>,
}

impl MacroquadTextures {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct images loaded so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True if nothing was loaded yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl TextureLoader for MacroquadTextures {
    type Handle = Texture2D;

    fn load_texture(&mut self, path: &Path) -> Result<LoadedTexture<Texture2D>, MapError> {
        if let Some(hit) = self.cache.get(path) {
            return Ok(hit.clone());
        }

        let bytes = std::fs::read(path).map_err(|source| MapError::io(path, source))?;
        let image = Image::from_file_with_format(&bytes, None).map_err(|e| MapError::Texture {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let tex = Texture2D::from_image(&image);
        tex.set_filter(FilterMode::Nearest);

        let loaded = LoadedTexture {
            width: image.width() as u32,
            height: image.height() as u32,
            handle: tex,
        };
        self.cache.insert(path.to_path_buf(), loaded.clone());
        Ok(loaded)
    }

    fn placeholder(&mut self) -> LoadedTexture<Texture2D> {
        self.placeholder
            .get_or_insert_with(|| {
                let side = PLACEHOLDER_SIZE as u16;
                let image = Image::gen_image_color(side, side, GRAY);
                let tex = Texture2D::from_image(&image);
                tex.set_filter(FilterMode::Nearest);
                LoadedTexture {
                    handle: tex,
                    width: PLACEHOLDER_SIZE,
                    height: PLACEHOLDER_SIZE,
                }
            })
            .clone()
    }
}

/// Handle produced by [`HeadlessTextures`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeadlessHandle {
    /// A known image, identified by its path
    Image(PathBuf),
    /// The placeholder
    Placeholder,
}

/// A loader that never touches the GPU or the file system.
///
/// Images are looked up in a table of known dimensions. Useful for
/// server-side collision checks, where only geometry matters, and for
/// tests.
#[derive(Debug, Default, Clone)]
pub struct HeadlessTextures {
    sizes: HashMap<PathBuf, (u32, u32)>,
    requested: Vec<PathBuf>,
}

impl HeadlessTextures {
    /// Creates a loader that knows no images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the dimensions of an image path.
    pub fn with_image(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.sizes.insert(path.into(), (width, height));
        self
    }

    /// Every path requested so far, in request order.
    pub fn requested(&self) -> &[PathBuf] {
        &self.requested
    }
}

impl TextureLoader for HeadlessTextures {
    type Handle = HeadlessHandle;

    fn load_texture(&mut self, path: &Path) -> Result<LoadedTexture<HeadlessHandle>, MapError> {
        self.requested.push(path.to_path_buf());
        match self.sizes.get(path) {
            Some(&(width, height)) => Ok(LoadedTexture {
                handle: HeadlessHandle::Image(path.to_path_buf()),
                width,
                height,
            }),
            None => Err(MapError::Texture {
                path: path.to_path_buf(),
                reason: "unknown image".to_owned(),
            }),
        }
    }

    fn placeholder(&mut self) -> LoadedTexture<HeadlessHandle> {
        LoadedTexture {
            handle: HeadlessHandle::Placeholder,
            width: PLACEHOLDER_SIZE,
            height: PLACEHOLDER_SIZE,
        }
    }
}
