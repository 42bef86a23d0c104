//! Records, their identifiers and the ordered store built from a row fetch.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::columns::ID_COLUMN;

/// Flat field map as delivered by the data endpoint.
pub type Fields = serde_json::Map<String, Value>;

/// String-normalized record identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalize a JSON id value; `None` when the value cannot serve as an id.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.is_empty() => Some(Self(text.clone())),
            Value::Number(number) => Some(Self(number_text(number))),
            _ => None,
        }
    }
}

/// Integer text for whole numbers (`1.0` → `"1"`), JSON text otherwise.
pub(crate) fn number_text(number: &serde_json::Number) -> String {
    if number.is_f64()
        && let Some(float) = number.as_f64()
        && float.fract() == 0.0
        && float.abs() < i64::MAX as f64
    {
        return (float as i64).to_string();
    }
    number.to_string()
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One tabular row with a normalized id.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: Fields,
}

impl Record {
    /// Wrap raw fields, falling back to the load ordinal when the id is
    /// missing or unusable. The normalized id is written back into `fields`.
    pub fn from_fields(ordinal: usize, mut fields: Fields) -> Self {
        let id = fields
            .get(ID_COLUMN)
            .and_then(RecordId::from_value)
            .unwrap_or_else(|| RecordId(ordinal.to_string()));
        fields.insert(ID_COLUMN.to_string(), Value::String(id.0.clone()));
        Self { id, fields }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub(crate) fn set(&mut self, key: &str, value: Value) {
        if key == ID_COLUMN {
            return;
        }
        self.fields.insert(key.to_string(), value);
    }
}

/// Ordered record store. Order is arrival order and never changes after load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    positions: HashMap<RecordId, Vec<usize>>,
}

impl Dataset {
    /// Build the store from a row response, keeping at most `limit` rows.
    pub fn from_rows(rows: Vec<Fields>, limit: usize) -> Self {
        if rows.len() > limit {
            tracing::warn!(
                "Data endpoint returned {} rows, keeping the first {limit}",
                rows.len()
            );
        }
        let records: Vec<Record> = rows
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(ordinal, fields)| Record::from_fields(ordinal, fields))
            .collect();
        let mut positions: HashMap<RecordId, Vec<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            positions.entry(record.id.clone()).or_default().push(index);
        }
        Self { records, positions }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Store positions of every record carrying `id`.
    pub fn positions_of(&self, id: &str) -> &[usize] {
        self.positions.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn record_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }
}
