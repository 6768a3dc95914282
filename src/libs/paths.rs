// Resolution of user supplied file locations: the resource file, an
// alternate catalog and local package sources.

use crate::log_debug;
use colored::Colorize;
use std::path::PathBuf;

/// Resource file read by `install` when `--config` is not given and the file exists.
pub const DEFAULT_RESOURCE_FILE: &str = "~/.setup-dotnet/dotnet.yaml";

/// Expands `~` and `$VAR`/`${VAR}` in `path`.
///
/// Unknown variables leave the path untouched rather than failing, so that
/// UNC paths and literal `$` characters in share names keep working.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log_debug!("[Paths] Could not expand '{}': {}", path, e);
            expand_tilde(path)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return PathBuf::from(format!("{}{}", home.to_string_lossy(), rest));
        }
    }
    PathBuf::from(path)
}

/// Returns the resource file to load: `--config` if given, otherwise the
/// default file when it exists, otherwise `None`.
pub fn resolve_resource_path(config: Option<&str>) -> Option<PathBuf> {
    if let Some(explicit) = config {
        let path = expand_path(explicit);
        log_debug!("[Paths] Using resource file from --config: {}", path.display().to_string().cyan());
        return Some(path);
    }

    let default = expand_path(DEFAULT_RESOURCE_FILE);
    if default.exists() {
        log_debug!("[Paths] Using default resource file: {}", default.display().to_string().cyan());
        Some(default)
    } else {
        log_debug!("[Paths] No resource file at {}", default.display());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_unchanged() {
        assert_eq!(expand_path("/tmp/dotnet.yaml"), PathBuf::from("/tmp/dotnet.yaml"));
        assert_eq!(expand_path(r"\\share\dotnet\ndp48.exe"), PathBuf::from(r"\\share\dotnet\ndp48.exe"));
    }

    #[test]
    fn tilde_is_expanded() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x.yaml"), home.join("x.yaml"));
        }
    }

    #[test]
    fn unknown_variables_fall_back() {
        let path = expand_path("/opt/$SETUP_DOTNET_SURELY_UNSET_VAR/x");
        assert_eq!(path, PathBuf::from("/opt/$SETUP_DOTNET_SURELY_UNSET_VAR/x"));
    }

    #[test]
    fn explicit_config_wins() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.yaml");
        let resolved = resolve_resource_path(Some(&file.to_string_lossy()));
        assert_eq!(resolved, Some(file));
    }
}
