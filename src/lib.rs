//! mythlink Library
//!
//! Links MythTV recordings into a browsable Show/Season/Episode tree of
//! symlinks, named after TheTVDB, with commercial skip list sidecars.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
