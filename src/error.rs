use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for map loading.
///
/// Only the fatal classes end up here when returned from
/// [`MapDocument::load`](crate::MapDocument::load). Texture and tileset
/// failures are converted into placeholders and logged instead.
#[derive(Debug)]
pub enum MapError {
    /// The file could not be opened or read
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// JSON syntax or type error
    Json {
        /// Document that failed to parse
        path: PathBuf,
        /// Underlying serde_json error
        source: serde_json::Error,
    },
    /// Markup syntax error
    Xml {
        /// Document that failed to parse
        path: PathBuf,
        /// Underlying quick-xml error
        source: quick_xml::Error,
    },
    /// The file extension does not name a supported map format
    UnsupportedFormat(String),
    /// Map width/height/tile size are missing, non-numeric or zero
    MalformedGeometry {
        /// Map document
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },
    /// The texture collaborator could not provide an image
    Texture {
        /// Image that failed
        path: PathBuf,
        /// Loader-specific description
        reason: String,
    },
    /// A tileset document declares no image
    MissingImage {
        /// Tileset document
        path: PathBuf,
    },
}

impl MapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MapError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn geometry(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MapError::MalformedGeometry {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            MapError::Json { path, source } => {
                write!(f, "Failed to parse JSON {}: {}", path.display(), source)
            }
            MapError::Xml { path, source } => {
                write!(f, "Failed to parse markup {}: {}", path.display(), source)
            }
            MapError::UnsupportedFormat(path) => write!(f, "Unsupported file format: {}", path),
            MapError::MalformedGeometry { path, reason } => {
                write!(f, "Malformed map geometry in {}: {}", path.display(), reason)
            }
            MapError::Texture { path, reason } => {
                write!(f, "Failed to load texture {}: {}", path.display(), reason)
            }
            MapError::MissingImage { path } => {
                write!(f, "Tileset {} declares no image", path.display())
            }
        }
    }
}

impl error::Error for MapError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Json { source, .. } => Some(source),
            MapError::Xml { source, .. } => Some(source),
            _ => None,
        }
    }
}
