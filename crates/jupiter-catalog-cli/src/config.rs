//! Catalog file resolution.

use std::path::PathBuf;

/// Catalog file used when nothing else is given.
pub const DEFAULT_CATALOG_FILE: &str = "catalog.json";

/// Resolve the catalog file path: explicit flag, then `JUPITER_CATALOG`,
/// then `./catalog.json`.
pub fn resolve_catalog_path(explicit: Option<&str>) -> PathBuf {
    resolve_with(explicit, std::env::var("JUPITER_CATALOG").ok())
}

fn resolve_with(explicit: Option<&str>, env_path: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Some(env_path) = env_path.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(env_path);
    }

    PathBuf::from(DEFAULT_CATALOG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        assert_eq!(
            resolve_with(Some("a.json"), Some("b.json".into())),
            PathBuf::from("a.json")
        );
        assert_eq!(
            resolve_with(None, Some("b.json".into())),
            PathBuf::from("b.json")
        );
        assert_eq!(
            resolve_with(None, Some("  ".into())),
            PathBuf::from(DEFAULT_CATALOG_FILE)
        );
        assert_eq!(resolve_with(None, None), PathBuf::from(DEFAULT_CATALOG_FILE));
    }
}
