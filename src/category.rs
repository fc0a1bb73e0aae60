use serde::{Deserialize, Serialize};

/// The fixed, ordered set of task kinds a session can belong to.
///
/// Categories are selected by their 1-based position in [`Category::ALL`],
/// which is also the order they appear in the on-screen list. Labels are
/// rendered and persisted uppercase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Category {
    Development,
    Meeting,
    Documentation,
    Research,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Development,
        Category::Meeting,
        Category::Documentation,
        Category::Research,
    ];

    /// Looks up a category by its 1-based list position.
    /// Anything outside `1..=ALL.len()` is an unrecognized selection.
    pub fn from_index(index: usize) -> Option<Category> {
        if index == 0 {
            return None;
        }
        Self::ALL.get(index - 1).copied()
    }

    /// 1-based position of this category, matching the on-screen list.
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|c| *c == self)
            .map(|p| p + 1)
            .unwrap_or_default()
    }
}
