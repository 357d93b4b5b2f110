//! Dynamic entity record

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::Value;
use crate::error::FieldError;

/// A dynamic record belonging to one resource family.
///
/// Records hold field values as a `HashMap<String, Value>`, allowing
/// dynamic access to any field. Typed getter methods provide safe access
/// with proper error handling; the table view-model uses the untyped
/// accessors and treats anything missing as a renderable blank, never an
/// error.
///
/// # Example
///
/// ```
/// use medidesk_lib::model::Record;
///
/// let record = Record::new("patients")
///     .set("name", "Rosa Delgado")
///     .set("age", 34i64);
///
/// assert_eq!(record.get_string("name").unwrap(), Some("Rosa Delgado"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The resource family this record belongs to (e.g. "patients").
    pub(crate) resource: String,

    /// The unique identifier of the record.
    pub(crate) id: Option<Uuid>,

    /// The field values.
    pub(crate) fields: HashMap<String, Value>,
}

impl Record {
    /// Creates a new empty record for the given resource family.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id: None,
            fields: HashMap::new(),
        }
    }

    /// Creates a new record with the given ID.
    pub fn with_id(resource: impl Into<String>, id: Uuid) -> Self {
        Self {
            resource: resource.into(),
            id: Some(id),
            fields: HashMap::new(),
        }
    }

    /// Builds a record from a JSON object as returned by the API.
    ///
    /// An `id` field holding a UUID string becomes the record id; every
    /// other field is converted with [`Value::from_json`].
    pub fn from_json_object(
        resource: impl Into<String>,
        map: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut record = Self::new(resource);
        for (field, value) in map {
            if field == "id" {
                if let Some(id) = value.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                    record.id = Some(id);
                    continue;
                }
            }
            record.fields.insert(field, Value::from_json(value));
        }
        record
    }

    /// Converts the fields of this record into a plain JSON object for a
    /// request body. The id travels in the URL, not the body.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(field, value)| (field.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    // =========================================================================
    // Metadata accessors
    // =========================================================================

    /// Returns the resource family name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the record ID, if set.
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Sets the record ID.
    pub fn set_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns a mutable reference to all fields.
    pub fn fields_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.fields
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(FieldError::type_mismatch(
                field,
                "string",
                other.type_name(),
            )),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(FieldError::type_mismatch(field, "bool", other.type_name())),
        }
    }

    /// Gets an integer field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(FieldError::type_mismatch(field, "int", other.type_name())),
        }
    }

    /// Gets a float field value.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Float(n)) => Ok(Some(*n)),
            Some(Value::Int(n)) => Ok(Some(*n as f64)), // Allow widening
            Some(other) => Err(FieldError::type_mismatch(field, "float", other.type_name())),
        }
    }

    /// Gets a Decimal field value.
    pub fn get_decimal(&self, field: &str) -> Result<Option<Decimal>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Decimal(d)) => Ok(Some(*d)),
            Some(other) => Err(FieldError::type_mismatch(
                field,
                "decimal",
                other.type_name(),
            )),
        }
    }

    /// Gets a UUID field value.
    pub fn get_guid(&self, field: &str) -> Result<Option<Uuid>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Guid(g)) => Ok(Some(*g)),
            Some(other) => Err(FieldError::type_mismatch(field, "guid", other.type_name())),
        }
    }

    /// Gets a DateTime field value.
    pub fn get_datetime(&self, field: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::DateTime(dt)) => Ok(Some(*dt)),
            Some(other) => Err(FieldError::type_mismatch(
                field,
                "datetime",
                other.type_name(),
            )),
        }
    }

    /// Gets a nested Record field value.
    pub fn get_record(&self, field: &str) -> Result<Option<&Record>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Record(r)) => Ok(Some(r.as_ref())),
            Some(other) => Err(FieldError::type_mismatch(
                field,
                "record",
                other.type_name(),
            )),
        }
    }

    /// Gets a collection of nested Records.
    pub fn get_records(&self, field: &str) -> Result<Option<&Vec<Record>>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Records(r)) => Ok(Some(r)),
            Some(other) => Err(FieldError::type_mismatch(
                field,
                "records",
                other.type_name(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldPath;

    #[test]
    fn from_json_maps_scalars_and_nesting() {
        let json = serde_json::json!({
            "id": "8f14e45f-ceea-4a78-9c3e-1b2d9a6c0f01",
            "name": "Rosa Delgado",
            "age": 34,
            "weight_kg": 61.5,
            "admitted": true,
            "department": { "name": "Cardiology" },
        });

        let serde_json::Value::Object(map) = json else {
            unreachable!()
        };
        let record = Record::from_json_object("patients", map);

        assert!(record.id().is_some());
        assert!(!record.contains("id"));
        assert_eq!(record.get_string("name").unwrap(), Some("Rosa Delgado"));
        assert_eq!(record.get_int("age").unwrap(), Some(34));
        assert_eq!(record.get_float("weight_kg").unwrap(), Some(61.5));
        assert_eq!(record.get_bool("admitted").unwrap(), Some(true));
        assert_eq!(
            FieldPath::new("department.name").resolve(&record).as_deref(),
            Some(&Value::String("Cardiology".to_string()))
        );
    }

    #[test]
    fn non_uuid_id_stays_a_field() {
        let serde_json::Value::Object(map) = serde_json::json!({ "id": "MRN-1042" }) else {
            unreachable!()
        };
        let record = Record::from_json_object("patients", map);
        assert!(record.id().is_none());
        assert_eq!(record.get_string("id").unwrap(), Some("MRN-1042"));
    }

    #[test]
    fn to_json_round_trips_fields() {
        let record = Record::new("patients")
            .set("name", "Rosa")
            .set("age", 34i64)
            .set("notes", Value::Null);

        let json = record.to_json();
        assert_eq!(json["name"], "Rosa");
        assert_eq!(json["age"], 34);
        assert!(json["notes"].is_null());
    }

    #[test]
    fn typed_getter_distinguishes_null_and_missing() {
        let record = Record::new("patients").set("notes", Value::Null);
        assert_eq!(record.get_string("notes").unwrap(), None);
        assert!(record.get_string("name").is_err());
    }
}
