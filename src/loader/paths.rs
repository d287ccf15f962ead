use crate::config::ParentDirPolicy;
use std::path::{Component, Path, PathBuf};

/// Resolves `reference` (as written inside `document`) against the
/// document's own directory.
///
/// Leading `../` markers are consumed by stripping directories from the
/// base instead of being joined literally, so `a/b/map.tmx` referencing
/// `../tileset.tsx` yields `a/tileset.tsx`.
pub fn resolve_reference(document: &Path, reference: &str, policy: ParentDirPolicy) -> PathBuf {
    let mut base = document.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut rest = reference;

    while let Some(stripped) = strip_parent_marker(rest) {
        let ends_in_parent = matches!(
            base.components().next_back(),
            None | Some(Component::ParentDir) | Some(Component::CurDir)
        );
        if ends_in_parent || !base.pop() {
            base.push("..");
        }
        rest = stripped;
        if policy == ParentDirPolicy::SingleLevel {
            break;
        }
    }

    base.join(rest)
}

fn strip_parent_marker(s: &str) -> Option<&str> {
    s.strip_prefix("../").or_else(|| s.strip_prefix("..\\"))
}
