pub mod loader;
pub mod profile;
pub mod settings;
