//! Commercial skip list model.

use serde::{Deserialize, Serialize};

/// One commercial break, in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRange {
    pub start: u64,
    pub end: u64,
}

/// Commercial breaks for a recording, in playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipList {
    pub ranges: Vec<SkipRange>,
}

impl SkipList {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
