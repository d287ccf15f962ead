use serde::Deserialize;

/// Default collision threshold: ids above it are solid.
pub const DEFAULT_COLLISION_THRESHOLD: u32 = 100;

/// Map-authoring conventions the file formats do not encode.
///
/// Every field has a default, so a partial JSON object is accepted:
///
/// ```
/// use tilemap_engine::MapConfig;
///
/// let cfg = MapConfig::from_json_str(r#"{ "collision_threshold": 250 }"#).unwrap();
/// assert_eq!(cfg.collision_threshold, 250);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// A tile is collidable iff its decoded id is greater than this.
    pub collision_threshold: u32,
    /// How leading `../` segments in external references are resolved.
    pub parent_dirs: ParentDirPolicy,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            collision_threshold: DEFAULT_COLLISION_THRESHOLD,
            parent_dirs: ParentDirPolicy::default(),
        }
    }
}

impl MapConfig {
    /// Parses a config object, filling in defaults for missing fields.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns a copy with a different collision threshold.
    pub fn with_collision_threshold(mut self, threshold: u32) -> Self {
        self.collision_threshold = threshold;
        self
    }
}

/// Treatment of parent-directory markers in tileset/image references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParentDirPolicy {
    /// Every leading `../` strips one directory from the base.
    #[default]
    Any,
    /// Only a single leading `../` is special-cased; anything after it is
    /// joined literally.
    SingleLevel,
}
