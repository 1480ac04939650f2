pub mod cli;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod index;
pub mod logging;
pub mod notice;
pub mod ui;

pub use error::{CleanupError, Result};
