//! Generators for link names and sidecar files.

pub mod linkname;
pub mod sidecar;
