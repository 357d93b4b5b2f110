//! Column descriptors for data tables

use std::fmt;
use std::sync::Arc;

use crate::model::FieldPath;
use crate::model::Value;

/// Placeholder shown when a column's key resolves to nothing.
pub const MISSING_PLACEHOLDER: &str = "—";

/// Render function turning a resolved value into display text.
///
/// Receives `None` when the column's field path did not resolve on the
/// record.
pub type CellRender = Arc<dyn Fn(Option<&Value>) -> String + Send + Sync>;

/// Describes one column of a data table.
///
/// # Example
///
/// ```
/// use medidesk_lib::table::ColumnDescriptor;
///
/// let columns = vec![
///     ColumnDescriptor::new("name", "Patient"),
///     ColumnDescriptor::new("department.name", "Department").width(16),
///     ColumnDescriptor::new("notes", "Notes").not_sortable(),
/// ];
/// ```
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Field path resolved against each record to produce the cell value.
    pub key: FieldPath,
    /// Display label for the column header.
    pub title: String,
    /// Whether clicking the header sorts by this column.
    pub sortable: bool,
    /// Preferred width in characters, if the layout honors hints.
    pub width: Option<u16>,
    /// Optional custom renderer; defaults to the value's display string.
    pub render: Option<CellRender>,
}

impl ColumnDescriptor {
    /// Creates a sortable column with the given key and title.
    pub fn new(key: impl Into<FieldPath>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            sortable: true,
            width: None,
            render: None,
        }
    }

    /// Marks this column as not sortable.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Sets a preferred width hint.
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets a custom render function.
    pub fn render_with<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&Value>) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Renders the given resolved value for this column.
    ///
    /// A missing value renders as [`MISSING_PLACEHOLDER`] unless a custom
    /// renderer decides otherwise.
    pub fn render_value(&self, value: Option<&Value>) -> String {
        if let Some(render) = &self.render {
            return render(value);
        }
        match value {
            Some(v) if !v.is_null() => v.display_string(),
            _ => MISSING_PLACEHOLDER.to_string(),
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
