//! Data-directory resolution.

use std::path::PathBuf;

/// Resolve the Kindred data directory.
///
/// `KINDRED_DATA_DIR` wins, then `~/.kindred`, then `./.kindred`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KINDRED_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".kindred");
    }

    PathBuf::from(".kindred")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env mutation is process-global and tests run concurrently, so both
    // cases live in a single test with the var restored at the end.
    #[test]
    fn test_resolve_data_dir_env_override_and_fallback() {
        // SAFETY: no other test in this binary touches KINDRED_DATA_DIR.
        unsafe {
            std::env::remove_var("KINDRED_DATA_DIR");
        }
        let fallback = resolve_data_dir();
        assert!(fallback.to_string_lossy().contains(".kindred"));

        unsafe {
            std::env::set_var("KINDRED_DATA_DIR", "/tmp/test-kindred");
        }
        let overridden = resolve_data_dir();
        unsafe {
            std::env::remove_var("KINDRED_DATA_DIR");
        }
        assert_eq!(overridden, PathBuf::from("/tmp/test-kindred"));
    }
}
