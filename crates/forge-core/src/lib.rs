pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod io;
pub mod orchestrator;
pub mod paths;
pub mod project;
pub mod quality;
pub mod sequence;
pub mod stages;
pub mod types;
pub mod workspace;

pub use error::{ForgeError, Result};
