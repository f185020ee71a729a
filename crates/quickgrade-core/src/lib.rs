pub mod error;
pub mod form;
pub mod inject;
pub mod matcher;
pub mod policy;
pub mod prompt;
pub mod report;
pub mod roster;

pub use error::{Error, Result};
