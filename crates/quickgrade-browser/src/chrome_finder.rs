use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Executable names tried on PATH after the platform defaults
const PATH_CANDIDATES: [&str; 4] = [
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Locates the Chrome binary to drive
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Custom path if given, else platform install locations, else PATH
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return self.validate_chrome_path(path);
        }

        for path in Self::default_paths() {
            if let Ok(valid_path) = self.validate_chrome_path(&path) {
                tracing::debug!("Found Chrome at default location {}", valid_path.display());
                return Ok(valid_path);
            }
        }

        for name in PATH_CANDIDATES {
            if let Ok(path) = which::which(name) {
                tracing::debug!("Found Chrome on PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(Error::Browser(format!(
            "Chrome not found. Checked: {} and PATH. Use --chrome-path to specify location.",
            Self::default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
        ];

        #[cfg(target_os = "windows")]
        return vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }

    fn validate_chrome_path(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(Error::Browser(format!(
                "Chrome not found at: {}",
                path.display()
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(Error::Browser(format!(
                    "Chrome binary not executable: {}",
                    path.display()
                )));
            }
        }

        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_path_is_used() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.path();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let found = ChromeFinder::new(Some(path.to_path_buf())).find().unwrap();
        assert_eq!(found, path);
    }

    #[test]
    fn test_missing_custom_path_fails() {
        let err = ChromeFinder::new(Some(PathBuf::from("/nonexistent/chrome")))
            .find()
            .unwrap_err();

        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_custom_path_fails() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = ChromeFinder::new(Some(temp.path().to_path_buf()))
            .find()
            .unwrap_err();

        assert!(err.to_string().contains("not executable"));
    }
}
