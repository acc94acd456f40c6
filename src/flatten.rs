//! Record flattening
//!
//! Registration records carry a nested `fields` object holding custom
//! fields, a `branch` relation (one key or a list of keys) and a
//! `branch_name` lookup mapping keys to display names. Tables need scalar
//! columns, so the nested object is resolved and merged into the record.

use crate::error::{Error, Result};
use crate::pagination::RecordSet;
use crate::types::{is_scalar, scalar_text, JsonObject, JsonValue};
use tracing::debug;

/// Collapses one nested object per record into scalar top-level fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattener {
    /// Key of the nested object
    pub nested_field: String,
    /// Key (inside the nested object) of the relation to resolve
    pub relation_field: String,
    /// Key (inside the nested object) of the key -> name lookup
    pub lookup_field: String,
}

impl Flattener {
    /// Create a flattener
    pub fn new(
        nested_field: impl Into<String>,
        relation_field: impl Into<String>,
        lookup_field: impl Into<String>,
    ) -> Self {
        Self {
            nested_field: nested_field.into(),
            relation_field: relation_field.into(),
            lookup_field: lookup_field.into(),
        }
    }

    /// Flattener for registration records (`fields.branch` / `fields.branch_name`)
    pub fn registration() -> Self {
        Self::new("fields", "branch", "branch_name")
    }

    /// Flatten every record of a record set
    pub fn flatten(&self, records: RecordSet) -> RecordSet {
        records
            .into_iter()
            .map(|record| match record {
                JsonValue::Object(mut map) => {
                    self.flatten_record(&mut map);
                    JsonValue::Object(map)
                }
                other => other,
            })
            .collect()
    }

    /// Flatten one record in place
    ///
    /// Records without the nested field are left untouched.
    pub fn flatten_record(&self, record: &mut JsonObject) {
        let mut nested = match record.get(&self.nested_field) {
            Some(JsonValue::Object(_)) => match record.shift_remove(&self.nested_field) {
                Some(JsonValue::Object(map)) => map,
                _ => return,
            },
            Some(JsonValue::Null) => {
                record.shift_remove(&self.nested_field);
                return;
            }
            _ => return,
        };

        debug!("Raw {} data: {:?}", self.nested_field, nested);

        let lookup = match nested.shift_remove(&self.lookup_field) {
            Some(JsonValue::Object(map)) => map,
            _ => JsonObject::new(),
        };

        let resolved = match nested.get(&self.relation_field) {
            Some(JsonValue::Array(keys)) if !keys.is_empty() => JsonValue::String(
                keys.iter()
                    .map(scalar_text)
                    .filter_map(|key| lookup.get(&key).map(scalar_text))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Some(key @ (JsonValue::String(_) | JsonValue::Number(_))) => JsonValue::String(
                lookup
                    .get(&scalar_text(key))
                    .map(scalar_text)
                    .unwrap_or_default(),
            ),
            _ => JsonValue::Null,
        };
        nested.insert(self.lookup_field.clone(), resolved);

        for value in nested.values_mut() {
            if let JsonValue::Array(items) = value {
                let joined = items.iter().map(scalar_text).collect::<Vec<_>>().join(",");
                *value = JsonValue::String(joined);
            }
        }

        debug!("Flattened {} data: {:?}", self.nested_field, nested);
        record.extend(nested);
    }
}

/// Ensure every field of every record is a scalar
///
/// Returns the first offending column. Non-object records are rejected too.
pub fn ensure_scalar(records: &RecordSet) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        let JsonValue::Object(map) = record else {
            return Err(Error::schema(format!(
                "record {index} is not a JSON object"
            )));
        };
        if let Some((column, _)) = map.iter().find(|(_, value)| !is_scalar(value)) {
            return Err(Error::NestedValue {
                column: column.clone(),
            });
        }
    }
    Ok(())
}
