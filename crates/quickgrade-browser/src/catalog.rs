//! Discovering and choosing the Chrome profile a run uses.
//!
//! Three kinds of profile are offered: a throw-away one, Chrome's own
//! profiles, and custom user-data directories. Custom directories the
//! operator types in are remembered in a small JSON file in the home
//! directory so they are offered again next time.

use quickgrade_core::prompt::Prompter;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// File in the home directory that remembers custom profile paths
pub const STORE_FILE_NAME: &str = ".quickgrade_profiles.json";

/// Custom profile directory names looked for in the home directory
pub const KNOWN_CUSTOM_NAMES: [&str; 4] = [
    "quickgrade-profile",
    ".quickgrade-profile",
    "quickgrade_profile",
    ".quickgrade_profile",
];

/// Chrome's user-data directory for the current platform
pub fn chrome_user_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    return dirs::config_dir().map(|d| d.join("google-chrome"));

    #[cfg(target_os = "macos")]
    return dirs::data_dir().map(|d| d.join("Google").join("Chrome"));

    #[cfg(target_os = "windows")]
    return dirs::data_local_dir().map(|d| d.join("Google").join("Chrome").join("User Data"));

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    return None;
}

/// The profile a run launches Chrome with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSelection {
    Temporary,
    /// A profile directory name inside Chrome's user-data directory
    Chrome(String),
    Custom(PathBuf),
}

impl ProfileSelection {
    pub fn describe(&self) -> String {
        match self {
            ProfileSelection::Temporary => "temporary profile".to_string(),
            ProfileSelection::Chrome(name) => format!("Chrome profile {}", name),
            ProfileSelection::Custom(path) => format!("custom profile {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfiles {
    #[serde(default)]
    pub custom_profiles: Vec<String>,
}

/// Best-effort persistence of custom profile paths; failures are only logged
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The store in the user's home directory
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StoredProfiles {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No profile store at {}: {}", self.path.display(), e);
                return StoredProfiles::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unreadable profile store {}: {}", self.path.display(), e);
            StoredProfiles::default()
        })
    }

    /// Append a path unless already stored; returns whether it was added
    pub fn remember(&self, path: &Path) -> bool {
        let entry = path.display().to_string();
        let mut stored = self.load();
        if stored.custom_profiles.contains(&entry) {
            return false;
        }

        stored.custom_profiles.push(entry);
        self.save(&stored)
    }

    /// Remove a stored path; returns whether it was present and the store was written
    pub fn forget(&self, path: &Path) -> bool {
        let entry = path.display().to_string();
        let mut stored = self.load();
        let before = stored.custom_profiles.len();
        stored.custom_profiles.retain(|p| p != &entry);

        before != stored.custom_profiles.len() && self.save(&stored)
    }

    fn save(&self, stored: &StoredProfiles) -> bool {
        let result = serde_json::to_string_pretty(stored)
            .map_err(io::Error::other)
            .and_then(|json| std::fs::write(&self.path, json));

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Could not write profile store {}: {}", self.path.display(), e);
                false
            }
        }
    }
}

/// One numbered entry of the profile menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOption {
    Temporary,
    Chrome(String),
    Custom(PathBuf),
    /// Ask for a new custom path
    NewCustom,
}

/// Profiles available on this machine
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    home: PathBuf,
    chrome_dir: Option<PathBuf>,
    chrome_profiles: Vec<String>,
    custom_profiles: Vec<PathBuf>,
}

impl ProfileCatalog {
    /// Look for Chrome's profiles, known custom directories and stored paths
    pub fn discover(home: &Path, chrome_dir: Option<PathBuf>, store: &ProfileStore) -> Self {
        let mut chrome_profiles = Vec::new();
        if let Some(dir) = chrome_dir.as_deref()
            && let Ok(entries) = std::fs::read_dir(dir)
        {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                if entry.path().is_dir() && (name == "Default" || name.starts_with("Profile ")) {
                    chrome_profiles.push(name);
                }
            }
        }
        chrome_profiles.sort();

        let mut custom_profiles: Vec<PathBuf> = KNOWN_CUSTOM_NAMES
            .iter()
            .map(|name| home.join(name))
            .filter(|path| path.exists())
            .collect();

        for stored in store.load().custom_profiles {
            let path = PathBuf::from(stored);
            if path.exists() && !custom_profiles.contains(&path) {
                custom_profiles.push(path);
            }
        }

        tracing::debug!(
            "Discovered {} Chrome profiles and {} custom profiles",
            chrome_profiles.len(),
            custom_profiles.len()
        );

        Self {
            home: home.to_path_buf(),
            chrome_dir,
            chrome_profiles,
            custom_profiles,
        }
    }

    pub fn chrome_dir(&self) -> Option<&Path> {
        self.chrome_dir.as_deref()
    }

    pub fn chrome_profiles(&self) -> &[String] {
        &self.chrome_profiles
    }

    pub fn custom_profiles(&self) -> &[PathBuf] {
        &self.custom_profiles
    }

    /// Menu entries in display order; an entry's index is its menu number
    pub fn options(&self) -> Vec<ProfileOption> {
        let mut options = vec![ProfileOption::Temporary];
        options.extend(self.chrome_profiles.iter().cloned().map(ProfileOption::Chrome));
        options.extend(self.custom_profiles.iter().cloned().map(ProfileOption::Custom));
        options.push(ProfileOption::NewCustom);
        options
    }

    /// Lines describing the menu
    pub fn menu_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (number, option) in self.options().iter().enumerate() {
            match option {
                ProfileOption::Temporary => {
                    lines.push(format!("{}. 🆕 Create temporary profile (will need to log in)", number));
                }
                ProfileOption::Chrome(name) => {
                    if number == 1 {
                        lines.push("📂 Chrome Profiles:".to_string());
                    }
                    if name == "Default" {
                        lines.push(format!("{}. 👤 Main Profile (Default)", number));
                    } else {
                        lines.push(format!("{}. 👤 {}", number, name));
                    }
                }
                ProfileOption::Custom(path) => {
                    if number == self.chrome_profiles.len() + 1 {
                        lines.push("📁 Custom Profiles (previously used):".to_string());
                    }
                    let name = display_name(path);
                    let icon = if name.to_lowercase().contains("quickgrade") { "🎓" } else { "📁" };
                    lines.push(format!("{}. {} {}", number, icon, name));
                    lines.push(format!("     Path: {}", path.display()));
                }
                ProfileOption::NewCustom => {
                    lines.push(format!("{}. ➕ Enter new custom profile path", number));
                }
            }
        }
        lines
    }

    /// Interpret one menu answer: a number, or the name/path of a custom profile
    pub fn parse_choice(&self, input: &str) -> Option<ProfileOption> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(number) = input.parse::<usize>() {
            return self.options().into_iter().nth(number);
        }

        if let Some(path) = self
            .custom_profiles
            .iter()
            .find(|p| display_name(p) == input || p.as_os_str() == input)
        {
            return Some(ProfileOption::Custom(path.clone()));
        }

        KNOWN_CUSTOM_NAMES
            .contains(&input)
            .then(|| ProfileOption::Custom(self.home.join(input)))
    }

    /// Resolve a non-interactive `--profile` value
    pub fn resolve_selector(&self, selector: &str) -> ProfileSelection {
        let selector = selector.trim();
        if selector.eq_ignore_ascii_case("temp") || selector.eq_ignore_ascii_case("temporary") {
            return ProfileSelection::Temporary;
        }
        if self.chrome_profiles.iter().any(|p| p == selector) {
            return ProfileSelection::Chrome(selector.to_string());
        }
        match self.parse_choice(selector) {
            Some(ProfileOption::Custom(path)) => ProfileSelection::Custom(path),
            _ => ProfileSelection::Custom(expand_custom_path(selector, &self.home)),
        }
    }

    /// Show the menu and ask until a profile is chosen; new custom paths are remembered
    pub fn select<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
        store: &ProfileStore,
    ) -> io::Result<ProfileSelection> {
        for line in self.menu_lines() {
            prompter.say(&line);
        }

        let last = self.options().len() - 1;
        loop {
            let answer = prompter.ask(&format!("Select profile option (0-{}): ", last))?;

            let selection = match self.parse_choice(&answer) {
                Some(ProfileOption::Temporary) => ProfileSelection::Temporary,
                Some(ProfileOption::Chrome(name)) => ProfileSelection::Chrome(name),
                Some(ProfileOption::Custom(path)) => ProfileSelection::Custom(path),
                Some(ProfileOption::NewCustom) => {
                    let entered = prompter.ask("Enter custom profile path or name: ")?;
                    if entered.trim().is_empty() {
                        prompter.say("No path entered.");
                        continue;
                    }
                    ProfileSelection::Custom(expand_custom_path(&entered, &self.home))
                }
                None => {
                    prompter.say("Invalid choice! Please enter a number or profile name.");
                    continue;
                }
            };

            if let ProfileSelection::Custom(path) = &selection
                && !self.custom_profiles.contains(path)
            {
                store.remember(path);
            }

            prompter.say(&format!("→ Using {}", selection.describe()));
            return Ok(selection);
        }
    }
}

/// A bare name lands in the home directory; a leading `~` is expanded
pub fn expand_custom_path(input: &str, home: &Path) -> PathBuf {
    let input = input.trim();
    if input == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = input.strip_prefix("~/").or_else(|| input.strip_prefix("~\\")) {
        return home.join(rest);
    }
    if !input.contains(MAIN_SEPARATOR) && !input.contains('/') {
        return home.join(input);
    }
    PathBuf::from(input)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
