pub mod api_key;
pub mod app;
pub mod cli;
pub mod config;
pub mod host;
pub mod image;
pub mod paths;
pub mod protocol;
pub mod selection;
pub mod session;
pub mod templates;
