use crate::map::SourceMap;
use std::path::{Component, Path, PathBuf};

/// Rewrite every non-empty entry of `map.sources` to an absolute
/// filesystem path.
///
/// Source paths reported by a dev server may not be valid filesystem paths
/// (eg. `/src/main.js` rooted at a virtual "source root"), so each entry is
/// re-anchored:
///
/// - relative entries resolve against the directory containing `filepath`
/// - absolute entries outside `root` are joined onto `root`
/// - absolute entries already under `root` are left alone
///
/// Empty and null entries pass through unchanged. Order is preserved. This
/// never fails; an entry that cannot be classified is left as-is.
pub fn normalize_sources(map: &mut SourceMap, root: &Path, filepath: &Path) {
    let Some(sources) = map.sources.as_mut() else {
        return;
    };

    for entry in sources.iter_mut() {
        let Some(source) = entry else {
            continue;
        };
        if source.is_empty() {
            continue;
        }
        *source = normalize_source(source, root, filepath);
    }
}

fn normalize_source(source: &str, root: &Path, filepath: &Path) -> String {
    let path = Path::new(source);

    if !path.is_absolute() {
        let dir = filepath.parent().unwrap_or(root);
        return lexical_normalize(&dir.join(path))
            .to_string_lossy()
            .into_owned();
    }

    if !path.starts_with(root) {
        // Re-root under the project. Joining the absolute path directly
        // would replace `root`, so strip the root component first.
        let tail: PathBuf = path
            .components()
            .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
            .collect();
        return root.join(tail).to_string_lossy().into_owned();
    }

    source.to_string()
}

/// Collapse `.` and `..` segments without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
