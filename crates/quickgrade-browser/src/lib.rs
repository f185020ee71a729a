//! Chrome driving for quick-grading pages: finding and launching Chrome,
//! choosing its profile, and running the page scripts that read and fill
//! the grade form.

mod catalog;
mod chrome_finder;
mod error;
mod launcher;
mod profile;
mod session;

pub use catalog::{
    KNOWN_CUSTOM_NAMES, ProfileCatalog, ProfileOption, ProfileSelection, ProfileStore,
    STORE_FILE_NAME, StoredProfiles, chrome_user_data_dir, expand_custom_path,
};
pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, normalize_url};
pub use profile::ProfileManager;
pub use session::GradingSession;
