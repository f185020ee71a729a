//! Listing and forgetting the Chrome profiles offered at startup.
//!
//! ```bash
//! # Show Chrome's profiles and the remembered custom ones
//! quickgrade profiles list
//!
//! # Stop offering a custom profile
//! quickgrade profiles forget ~/grading-profile
//! ```

use anyhow::{Result, anyhow};
use console::style;
use quickgrade_browser::{ProfileCatalog, ProfileStore, chrome_user_data_dir, expand_custom_path};
use std::path::Path;

fn home() -> Result<std::path::PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

pub fn list() -> Result<()> {
    let home = home()?;
    list_in(&home, chrome_user_data_dir().as_deref())
}

pub fn forget(path: &str) -> Result<()> {
    let home = home()?;
    forget_in(&home, path)
}

fn list_in(home: &Path, chrome_dir: Option<&Path>) -> Result<()> {
    let store = ProfileStore::in_home(home);
    let catalog = ProfileCatalog::discover(home, chrome_dir.map(Path::to_path_buf), &store);

    println!("\n{}", style("Chrome profiles").bold());
    match catalog.chrome_dir() {
        Some(dir) => println!("  {}", style(dir.display()).dim()),
        None => println!("  {}", style("Chrome user data directory not found").dim()),
    }
    if catalog.chrome_profiles().is_empty() {
        println!("  (none)");
    }
    for name in catalog.chrome_profiles() {
        println!("  • {}", name);
    }

    println!("\n{}", style("Custom profiles").bold());
    println!("  {}", style(store.path().display()).dim());
    if catalog.custom_profiles().is_empty() {
        println!("  (none)");
    }
    for path in catalog.custom_profiles() {
        println!("  • {}", path.display());
    }

    Ok(())
}

fn forget_in(home: &Path, path: &str) -> Result<()> {
    let store = ProfileStore::in_home(home);
    let target = expand_custom_path(path, home);

    if store.forget(&target) {
        println!("{} {}", style("✓ Forgot").green(), target.display());
    } else {
        println!("{} {}", style("Not remembered:").yellow(), target.display());
    }

    Ok(())
}
