//! Template keys group a root template with its partial templates.
//!
//! A key is the lower-cased template path with its extension removed, so
//! `/work/Autounattend.xml.tpl` has the key `/work/autounattend.xml`. A
//! partial such as `/work/Autounattend.xml.disks.ptpl` is attached to a root
//! by peeling one dot-suffix at a time off its own key (`.../autounattend.xml.disks`,
//! then `.../autounattend.xml`) until a known root key matches.

use std::collections::BTreeSet;
use std::path::{is_separator, Path};

/// Extension of root templates.
pub const ROOT_TEMPLATE_EXT: &str = "tpl";

/// Extension of partial templates.
pub const PARTIAL_TEMPLATE_EXT: &str = "ptpl";

/// Key of a root template, or `None` (the empty key) when `path` is not a `.tpl` file.
pub fn template_key(path: &Path) -> Option<String> {
    strip_extension(path, ROOT_TEMPLATE_EXT)
}

/// Key of the root template that owns the partial at `path`.
///
/// Suffixes are removed longest name first, one dot-segment at a time, so the
/// first match is also the longest matching root key. Returns `None` for
/// orphans and for paths that are not `.ptpl` files.
pub fn partial_template_key(root_keys: &BTreeSet<String>, path: &Path) -> Option<String> {
    let key = strip_extension(path, PARTIAL_TEMPLATE_EXT)?;
    let mut candidate = key.as_str();
    loop {
        if root_keys.contains(candidate) {
            return Some(candidate.to_string());
        }
        candidate = strip_last_suffix(candidate)?;
    }
}

fn strip_extension(path: &Path, extension: &str) -> Option<String> {
    if path.extension()? != extension {
        return None;
    }
    let lower = path.to_string_lossy().to_lowercase();
    lower
        .strip_suffix(&format!(".{}", extension))
        .map(String::from)
}

/// Remove the final `.suffix` of the last path component.
fn strip_last_suffix(key: &str) -> Option<&str> {
    let name_start = key.rfind(is_separator).map_or(0, |i| i + 1);
    let dot = key[name_start..].rfind('.')?;
    Some(&key[..name_start + dot])
}
