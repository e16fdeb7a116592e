//! Tower label normalization.

use crate::models::TowerKey;

/// Prefix every tower key carries.
pub const TOWER_PREFIX: &str = "Tower-";

/// Canonicalize a raw tower label into a [`TowerKey`].
///
/// Surrounding whitespace is trimmed and `Tower-` is prepended unless the
/// label already starts with it (in any case). Inner whitespace is kept.
///
/// ```
/// use towerdoc::transform::normalize;
///
/// assert_eq!(normalize("  A ").as_str(), "Tower-A");
/// assert_eq!(normalize("Tower-A").as_str(), "Tower-A");
/// assert_eq!(normalize("Tower A").as_str(), "Tower-Tower A");
/// ```
pub fn normalize(tower_raw: &str) -> TowerKey {
    let trimmed = tower_raw.trim();
    if has_prefix(trimmed) {
        TowerKey(trimmed.to_string())
    } else {
        TowerKey(format!("{}{}", TOWER_PREFIX, trimmed))
    }
}

fn has_prefix(s: &str) -> bool {
    s.get(..TOWER_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(TOWER_PREFIX))
}
