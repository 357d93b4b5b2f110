//! Search policy for table filtering

use crate::model::FieldPath;
use crate::model::Record;

/// Decides which values of a record the search term is matched against.
///
/// The dashboard default is "every top-level field": a record matches if
/// the string form of any of its values contains the term
/// case-insensitively. Making the policy explicit keeps the behavior
/// testable instead of implicitly tied to object shape; pages with noisy
/// columns can narrow it to selected field paths.
///
/// # Example
///
/// ```
/// use medidesk_lib::model::Record;
/// use medidesk_lib::table::SearchPolicy;
///
/// let record = Record::new("patients")
///     .set("name", "Rosa Delgado")
///     .set("blood_type", "O+");
///
/// assert!(SearchPolicy::all_fields().matches(&record, "rosa"));
/// assert!(!SearchPolicy::fields(["blood_type"]).matches(&record, "rosa"));
/// ```
#[derive(Debug, Clone, Default)]
pub enum SearchPolicy {
    /// Match against the string form of every top-level field value.
    ///
    /// Nested records are stringified structurally, not searched
    /// field-by-field.
    #[default]
    AllFields,
    /// Match only against the values at the given field paths.
    Selected(Vec<FieldPath>),
}

impl SearchPolicy {
    /// The default all-fields policy.
    pub fn all_fields() -> Self {
        Self::AllFields
    }

    /// A policy restricted to the given field paths.
    pub fn fields<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        Self::Selected(paths.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if the record matches the search term under this
    /// policy.
    ///
    /// An empty term matches every record.
    pub fn matches(&self, record: &Record, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();

        match self {
            Self::AllFields => record
                .fields()
                .values()
                .any(|value| value.display_string().to_lowercase().contains(&needle)),
            Self::Selected(paths) => paths.iter().any(|path| {
                path.resolve(record)
                    .is_some_and(|value| value.display_string().to_lowercase().contains(&needle))
            }),
        }
    }
}
