//! Core business logic modules.

pub mod resolver;
pub mod synchronizer;
