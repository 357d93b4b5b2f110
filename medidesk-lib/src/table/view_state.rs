//! User-driven view state for a data table

use crate::model::FieldPath;

/// Sort direction for a table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Ascending,
    /// Descending order (Z-A, 9-0).
    Descending,
}

impl SortOrder {
    /// Returns the opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// The user-controlled portion of a table's state.
///
/// Created with defaults on mount (empty search, no sort, page 1) and
/// mutated only by explicit user actions. Changing the search term or the
/// sort column deliberately does NOT reset `current_page`; callers that
/// want that behavior call [`set_page`](Self::set_page) themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Current search term; empty means no filtering.
    pub search_term: String,
    /// Field path the rows are sorted by, if any.
    pub sort_key: Option<FieldPath>,
    /// Direction of the active sort.
    pub sort_order: SortOrder,
    /// 1-based page number.
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_key: None,
            sort_order: SortOrder::Ascending,
            current_page: 1,
        }
    }
}

impl ViewState {
    /// Creates a fresh view state with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the search term.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Moves to the given page. Values below 1 clamp to 1.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Applies a sort-header click.
    ///
    /// Clicking the active column flips the direction; clicking a new
    /// column sorts ascending by it.
    pub fn toggle_sort(&mut self, key: impl Into<FieldPath>) {
        let key = key.into();
        if self.sort_key.as_ref() == Some(&key) {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_key = Some(key);
            self.sort_order = SortOrder::Ascending;
        }
    }

    /// Clears the active sort, restoring source order.
    pub fn clear_sort(&mut self) {
        self.sort_key = None;
        self.sort_order = SortOrder::Ascending;
    }
}
