use crate::catalog::ProfileSelection;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// The user-data directory Chrome runs with for one session
pub struct ProfileManager {
    path: PathBuf,
    /// Profile inside the user-data directory, for Chrome's own profiles
    profile_directory: Option<String>,
    is_temporary: bool,
}

impl ProfileManager {
    /// A throw-away profile, deleted on drop
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("quickgrade-profile-")
            .tempdir()
            .map_err(Error::Io)?;

        Ok(Self {
            path: temp_dir.keep(),
            profile_directory: None,
            is_temporary: true,
        })
    }

    /// A custom profile directory, created if missing
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(Error::Io)?;
        }

        Ok(Self {
            path,
            profile_directory: None,
            is_temporary: false,
        })
    }

    /// One of Chrome's own profiles ("Default", "Profile 1", ...) inside its user-data directory
    pub fn chrome_profile(user_data_dir: PathBuf, name: impl Into<String>) -> Self {
        Self {
            path: user_data_dir,
            profile_directory: Some(name.into()),
            is_temporary: false,
        }
    }

    /// Prepare the directory for a menu selection
    pub fn for_selection(selection: &ProfileSelection, chrome_dir: Option<&Path>) -> Result<Self> {
        match selection {
            ProfileSelection::Temporary => Self::temporary(),
            ProfileSelection::Custom(path) => Self::persistent(path.clone()),
            ProfileSelection::Chrome(name) => {
                let dir = chrome_dir.ok_or_else(|| {
                    Error::Browser("Chrome user data directory not found on this system".to_string())
                })?;
                Ok(Self::chrome_profile(dir.to_path_buf(), name.clone()))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile_directory(&self) -> Option<&str> {
        self.profile_directory.as_deref()
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_profile_creates_and_cleans_up() {
        let profile = ProfileManager::temporary().unwrap();
        let path = profile.path().to_path_buf();

        assert!(path.is_dir());
        assert!(profile.is_temporary());

        drop(profile);

        assert!(!path.exists());
    }

    #[test]
    fn test_persistent_profile_creates_directory_and_survives() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("grading");

        let profile = ProfileManager::persistent(profile_path.clone()).unwrap();
        assert!(profile_path.is_dir());
        assert!(!profile.is_temporary());

        drop(profile);

        assert!(profile_path.exists());
    }

    #[test]
    fn test_chrome_profile_selection() {
        let temp_dir = tempfile::tempdir().unwrap();
        let selection = ProfileSelection::Chrome("Profile 1".to_string());

        let profile = ProfileManager::for_selection(&selection, Some(temp_dir.path())).unwrap();

        assert_eq!(profile.path(), temp_dir.path());
        assert_eq!(profile.profile_directory(), Some("Profile 1"));
        assert!(!profile.is_temporary());
    }

    #[test]
    fn test_chrome_profile_without_chrome_dir_fails() {
        let selection = ProfileSelection::Chrome("Default".to_string());

        assert!(ProfileManager::for_selection(&selection, None).is_err());
    }
}
