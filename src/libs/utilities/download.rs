// Fetching and verifying package installers.
//
// A package source is either a URL (downloaded with `ureq` into a scratch
// directory) or a local/UNC path taken from `package_sources`. Either way the
// file is checked against the SHA-256 from the catalog before it is executed.

use crate::libs::paths::expand_path;
use crate::schemas::errors::{FrameworkError, Result};
use crate::{log_debug, log_info};
use colored::Colorize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// `true` for `http://` and `https://` sources.
pub fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// File name used for a downloaded installer: the last URL path segment,
/// without query string, or `package.exe` when the URL has none.
pub fn file_name_for(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => "package.exe".to_string(),
    }
}

/// Downloads `url` to `dest`.
pub fn download_file(url: &str, dest: &Path) -> Result<()> {
    log_info!("[Download] Fetching {}", url.blue());

    let response = ureq::get(url).call().map_err(|e| FrameworkError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let mut file = File::create(dest)?;
    let mut reader = response.into_reader();
    io::copy(&mut reader, &mut file).map_err(|e| FrameworkError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    log_debug!("[Download] Saved to {}", dest.display().to_string().green());
    Ok(())
}

/// Lower-case hex SHA-256 of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut file = File::open(path)?;
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compares the file's SHA-256 with `expected`. An empty `expected` skips the check.
pub fn verify_checksum(name: &str, path: &Path, expected: &str) -> Result<()> {
    if expected.trim().is_empty() {
        log_debug!("[Download] No checksum for '{}', skipping verification", name);
        return Ok(());
    }
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(FrameworkError::ChecksumMismatch {
            name: name.to_string(),
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        });
    }
    log_debug!("[Download] Checksum verified for '{}'", name);
    Ok(())
}

/// Makes `source` available as a local file, downloading into `scratch` if needed,
/// and verifies it. Returns the path of the file to execute.
pub fn fetch_package(name: &str, source: &str, checksum: &str, scratch: &Path) -> Result<PathBuf> {
    let local = if is_remote(source) {
        let dest = scratch.join(file_name_for(source));
        download_file(source, &dest)?;
        dest
    } else {
        let path = expand_path(source);
        if !path.exists() {
            return Err(FrameworkError::Download {
                url: source.to_string(),
                reason: "file does not exist".to_string(),
            });
        }
        path
    };
    verify_checksum(name, &local, checksum)?;
    Ok(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_names_from_urls() {
        assert_eq!(
            file_name_for("https://download.microsoft.com/download/E/2/1/NDP452-KB2901907-x86-x64-AllOS-ENU.exe"),
            "NDP452-KB2901907-x86-x64-AllOS-ENU.exe"
        );
        assert_eq!(file_name_for("https://host/setup.exe?sig=abc#x"), "setup.exe");
        assert_eq!(file_name_for("https://host/"), "package.exe");
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("HTTPS://example.com/a.exe"));
        assert!(!is_remote(r"\\share\dotnet\a.exe"));
        assert!(!is_remote(r"C:\cache\a.exe"));
    }

    #[test]
    fn checksum_verification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("installer.exe");
        File::create(&path).unwrap().write_all(b"abc").unwrap();

        let sha_abc = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert_eq!(sha256_file(&path).unwrap(), sha_abc);
        verify_checksum("installer", &path, &sha_abc.to_uppercase()).unwrap();
        verify_checksum("installer", &path, "").unwrap();

        let err = verify_checksum("installer", &path, "00").unwrap_err();
        assert!(matches!(err, FrameworkError::ChecksumMismatch { .. }));
    }

    #[test]
    fn local_sources_are_verified_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ndp.exe");
        File::create(&path).unwrap().write_all(b"abc").unwrap();
        let source = path.to_string_lossy().to_string();

        let fetched = fetch_package("ndp", &source, "", dir.path()).unwrap();
        assert_eq!(fetched, path);

        let missing = dir.path().join("missing.exe").to_string_lossy().to_string();
        assert!(fetch_package("ndp", &missing, "", dir.path()).is_err());
    }
}
