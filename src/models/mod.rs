//! Data models.

pub mod config;
pub mod identity;
pub mod recording;
pub mod skiplist;
