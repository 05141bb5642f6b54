//! Identifiers for interned simulation entities

use serde::{Deserialize, Serialize};

/// Position of a category in the per-run category registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u16);

impl CategoryId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
