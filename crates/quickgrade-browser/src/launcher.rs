use crate::profile::ProfileManager;
use crate::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use std::path::PathBuf;

/// Launch flags added to every run
const EXTRA_ARGS: [&str; 4] = [
    "--start-maximized",
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
    "--no-sandbox",
];

/// Phrases Chrome uses when another process already holds the profile
const LOCK_MARKERS: [&str; 3] = ["user data directory", "SingletonLock", "ProcessSingleton"];

/// Add `https://` when no scheme is given
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("https://{}", url)
    } else {
        url.to_string()
    }
}

/// Starts a visible Chrome on a given profile
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    user_data_dir: PathBuf,
    profile_directory: Option<String>,
    initial_url: Option<String>,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile: &ProfileManager, initial_url: Option<String>) -> Self {
        Self {
            chrome_path,
            user_data_dir: profile.path().to_path_buf(),
            profile_directory: profile.profile_directory().map(str::to_string),
            initial_url,
        }
    }

    /// Page to open once the browser is up
    pub fn initial_url(&self) -> Option<String> {
        self.initial_url.as_deref().map(normalize_url)
    }

    /// Build Chrome command-line arguments beyond what the driver sets itself
    fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = EXTRA_ARGS.iter().map(|a| a.to_string()).collect();

        if let Some(name) = &self.profile_directory {
            args.push(format!("--profile-directory={}", name));
        }

        args
    }

    fn config(&self) -> Result<BrowserConfig> {
        BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(&self.user_data_dir)
            .with_head()
            .viewport(None)
            .args(self.build_args())
            .build()
            .map_err(Error::Browser)
    }

    /// Launch Chrome and return the driver with its event handler
    pub async fn launch(&self) -> Result<(Browser, Handler)> {
        tracing::info!(
            "Launching {} with user data dir {}",
            self.chrome_path.display(),
            self.user_data_dir.display()
        );

        let config = self.config()?;
        Browser::launch(config).await.map_err(|e| {
            let message = e.to_string();
            if LOCK_MARKERS.iter().any(|m| message.contains(m)) {
                Error::ProfileLocked(message)
            } else {
                Error::Browser(format!("Failed to launch Chrome: {}", message))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher(profile_directory: Option<&str>, initial_url: Option<&str>) -> ChromeLauncher {
        ChromeLauncher {
            chrome_path: PathBuf::from("/usr/bin/google-chrome"),
            user_data_dir: PathBuf::from("/tmp/profile"),
            profile_directory: profile_directory.map(str::to_string),
            initial_url: initial_url.map(str::to_string),
        }
    }

    #[test]
    fn test_chrome_launcher_builds_args() {
        let args = launcher(None, None).build_args();

        assert!(args.contains(&"--start-maximized".to_string()));
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--profile-directory=")));
    }

    #[test]
    fn test_chrome_profile_directory_arg() {
        let args = launcher(Some("Profile 1"), None).build_args();

        assert!(args.contains(&"--profile-directory=Profile 1".to_string()));
    }

    #[test]
    fn test_initial_url_gets_scheme() {
        assert_eq!(
            launcher(None, Some("moodle.example.edu/mod/assign/view.php?id=7")).initial_url(),
            Some("https://moodle.example.edu/mod/assign/view.php?id=7".to_string())
        );
        assert_eq!(
            launcher(None, Some("http://localhost:8080")).initial_url(),
            Some("http://localhost:8080".to_string())
        );
        assert_eq!(launcher(None, None).initial_url(), None);
    }
}
