//! Field paths for addressing nested values

use std::borrow::Cow;

use serde::Deserialize;
use serde::Serialize;

use super::Record;
use super::Value;

/// A dot-separated path addressing a value within a [`Record`].
///
/// `"department.name"` resolves the `department` field on the record and
/// then the `name` field inside it. Resolution walks nested records and
/// raw JSON objects; if any intermediate segment is absent or not
/// traversable the whole path resolves to `None` rather than failing.
///
/// # Example
///
/// ```
/// use medidesk_lib::model::{FieldPath, Record, Value};
///
/// let dept = Record::new("departments").set("name", "Cardiology");
/// let staff = Record::new("staff").set("department", dept);
///
/// let path = FieldPath::new("department.name");
/// assert_eq!(
///     path.resolve(&staff).as_deref(),
///     Some(&Value::String("Cardiology".to_string()))
/// );
/// assert_eq!(FieldPath::new("department.missing.deeper").resolve(&staff), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Creates a new field path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the raw dot-separated path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Resolves this path against a record.
    ///
    /// Returns `None` if any segment along the way is absent or the value
    /// at an intermediate segment is not traversable. Values inside
    /// nested records are borrowed; a leaf inside a raw [`Value::Json`]
    /// subtree is converted on the way out, hence the `Cow`.
    pub fn resolve<'a>(&self, record: &'a Record) -> Option<Cow<'a, Value>> {
        let mut segments = self.segments();
        let first = segments.next()?;
        let mut current = Resolved::Model(record.get(first)?);

        for segment in segments {
            current = match current {
                Resolved::Model(Value::Record(nested)) => Resolved::Model(nested.get(segment)?),
                Resolved::Model(Value::Json(json)) => Resolved::Json(json.get(segment)?),
                Resolved::Json(json) => Resolved::Json(json.get(segment)?),
                Resolved::Model(_) => return None,
            };
        }

        match current {
            Resolved::Model(value) => Some(Cow::Borrowed(value)),
            Resolved::Json(json) => Some(Cow::Owned(Value::from_json(json.clone()))),
        }
    }
}

/// Cursor over either the record model or a raw JSON subtree.
enum Resolved<'a> {
    Model(&'a Value),
    Json(&'a serde_json::Value),
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_through_raw_json_objects() {
        let record = Record::new("patients").set(
            "meta",
            Value::Json(serde_json::json!({ "ward": "B2", "bed": { "number": 4 } })),
        );

        assert_eq!(
            FieldPath::new("meta.ward").resolve(&record).as_deref(),
            Some(&Value::String("B2".to_string()))
        );
        assert_eq!(
            FieldPath::new("meta.bed.number").resolve(&record).as_deref(),
            Some(&Value::Int(4))
        );
        assert_eq!(FieldPath::new("meta.missing").resolve(&record), None);
        assert_eq!(FieldPath::new("meta.ward.deeper").resolve(&record), None);
    }

    #[test]
    fn scalar_segments_are_not_traversable() {
        let record = Record::new("patients").set("name", "Rosa");
        assert_eq!(FieldPath::new("name.first").resolve(&record), None);
        assert_eq!(FieldPath::new("absent").resolve(&record), None);
    }
}
