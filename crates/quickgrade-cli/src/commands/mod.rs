pub mod inject;
pub mod profiles;
