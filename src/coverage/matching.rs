//! Filename suffix matching.
//!
//! Coverage reports rarely agree with the caller about path roots: a report
//! generated inside a container may say `/app/src/app.py` while the caller
//! asks about `src/app.py`. Two matching strategies bridge that gap, and
//! they are deliberately distinct:
//!
//! - [`ends_with_path`] — raw character suffix, used by the Cobertura and
//!   LCOV parsers against a bare file name.
//! - [`ends_with_components`] — trailing path-component equality, used by
//!   the diff-cover parser against a relative path, so `a/b/app.py` matches
//!   `src/a/b/app.py` but never `src/xa/b/app.py`.

use std::path::{Component, Path};

/// Raw-character suffix match.
///
/// Note this is character-level, not component-level: `xapp.py` ends with
/// `app.py`. Callers pass a bare file name as target, where that looseness
/// is the tolerance for differing path roots the parsers rely on.
pub fn ends_with_path(candidate: &str, target: &str) -> bool {
    candidate.ends_with(target)
}

/// Component-aware suffix match.
///
/// The candidate matches if its trailing N normal components equal the
/// target's N normal components exactly, in order. Root and `.` components
/// are ignored on both sides so relative and lightly-decorated paths
/// compare the same.
pub fn ends_with_components(candidate: &Path, target: &Path) -> bool {
    let target = normal_components(target);
    if target.is_empty() {
        return false;
    }
    let candidate = normal_components(candidate);
    if candidate.len() < target.len() {
        return false;
    }
    candidate[candidate.len() - target.len()..] == target[..]
}

fn normal_components(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}
