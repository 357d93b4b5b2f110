//! Value enum for dynamic field values

use std::cmp::Ordering;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A dynamic value that can hold any MediDesk field type.
///
/// This enum represents all possible values that can be stored in a record
/// field. It's used in [`Record`](super::Record) to store field values
/// dynamically.
///
/// # Example
///
/// ```
/// use medidesk_lib::model::Value;
///
/// let name = Value::from("Amoxicillin");
/// let stock = Value::from(120i64);
/// let active = Value::from(true);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Arbitrary precision decimal (dosages, prices).
    Decimal(Decimal),
    /// String value.
    String(String),
    /// GUID/UUID value.
    Guid(Uuid),
    /// Date and time with timezone.
    DateTime(DateTime<Utc>),
    /// Nested record (e.g. an embedded department on a staff row).
    Record(Box<super::Record>),
    /// Collection of nested records.
    Records(Vec<super::Record>),
    /// Fallback for unrecognized JSON values.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Guid(_) => "guid",
            Value::DateTime(_) => "datetime",
            Value::Record(_) => "record",
            Value::Records(_) => "records",
            Value::Json(_) => "json",
        }
    }

    /// Returns the canonical string form of this value.
    ///
    /// This is the form the table's search matches against. Scalars render
    /// naturally; nested records and collections are stringified
    /// structurally as JSON rather than searched field-by-field.
    pub fn display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::String(s) => s.clone(),
            Value::Guid(g) => g.to_string(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::Record(r) => serde_json::to_string(r.fields()).unwrap_or_default(),
            Value::Records(rs) => {
                let fields: Vec<_> = rs.iter().map(|r| r.fields()).collect();
                serde_json::to_string(&fields).unwrap_or_default()
            }
            Value::Json(j) => j.to_string(),
        }
    }

    /// Converts a raw JSON value from the API into a `Value`.
    ///
    /// Numbers become `Int` when they fit an i64, `Float` otherwise;
    /// objects become nested records (with an empty resource name, since
    /// the wire format doesn't carry one); arrays of objects become
    /// `Records`. Anything else falls back to `Json`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Json(serde_json::Value::Number(n))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Object(map) => {
                Value::Record(Box::new(super::Record::from_json_object("", map)))
            }
            serde_json::Value::Array(items)
                if !items.is_empty() && items.iter().all(|i| i.is_object()) =>
            {
                let records = items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::Object(map) => {
                            Some(super::Record::from_json_object("", map))
                        }
                        _ => None,
                    })
                    .collect();
                Value::Records(records)
            }
            other => Value::Json(other),
        }
    }

    /// Converts this value back into plain JSON for a request body.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(n) => serde_json::Value::from(*n),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Guid(g) => serde_json::Value::String(g.to_string()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::Record(r) => r.to_json(),
            Value::Records(rs) => {
                serde_json::Value::Array(rs.iter().map(super::Record::to_json).collect())
            }
            Value::Json(j) => j.clone(),
        }
    }

    /// Compares two values for sorting.
    ///
    /// Both numeric (int/float/decimal in any combination) compare
    /// numerically, both strings lexicographically; booleans, datetimes and
    /// guids compare by their native order. Incomparable combinations
    /// (including anything structural) return `Equal`, so a stable sort
    /// preserves their prior relative order instead of failing.
    pub fn compare(&self, other: &Value) -> Ordering {
        use Value::*;

        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Decimal(a), Decimal(b)) => a.cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Int(a), Decimal(b)) => rust_decimal::Decimal::from(*a).cmp(b),
            (Decimal(a), Int(b)) => a.cmp(&rust_decimal::Decimal::from(*b)),
            (Float(a), Decimal(b)) => a
                .partial_cmp(&b.to_f64().unwrap_or(f64::NAN))
                .unwrap_or(Ordering::Equal),
            (Decimal(a), Float(b)) => a
                .to_f64()
                .unwrap_or(f64::NAN)
                .partial_cmp(b)
                .unwrap_or(Ordering::Equal),
            (String(a), String(b)) => a.cmp(b),
            (Bool(a), Bool(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Guid(a), Guid(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<super::Record> for Value {
    fn from(v: super::Record) -> Self {
        Value::Record(Box::new(v))
    }
}

impl From<Vec<super::Record>> for Value {
    fn from(v: Vec<super::Record>) -> Self {
        Value::Records(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}
