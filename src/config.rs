#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of values a leaf holds before the next insertion splits it.
pub const DEFAULT_THRESHOLD: usize = 16;
/// Leaves at this depth keep growing instead of splitting.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Shape parameters of a [`Quadtree`](crate::Quadtree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuadtreeConfig {
    pub threshold: usize,
    pub max_depth: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl QuadtreeConfig {
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
