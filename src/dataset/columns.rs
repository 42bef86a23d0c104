//! Column descriptors and the header layout derived from a schema response.

use crate::backend::SchemaResponse;

/// Key of the synthetic column holding model output.
pub const PREDICTION_COLUMN: &str = "prediction";
/// Key of the record identifier column.
pub const ID_COLUMN: &str = "id";

/// One header entry in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Stable field identifier used to look values up in a record.
    pub key: String,
    /// Human-readable header text.
    pub display_name: String,
    /// Zero-based display position.
    pub position: usize,
}

/// Ordered columns plus the name of the ground-truth label column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<ColumnDescriptor>,
    pub label: String,
}

impl Schema {
    /// Build the header layout: `prediction`, the label, `id` when the
    /// service did not list it, then the service columns in their order.
    pub fn from_response(response: &SchemaResponse) -> Self {
        let label = response.label.clone();
        let mut keyed: Vec<(String, String)> = Vec::with_capacity(response.colnames.len() + 3);
        keyed.push((PREDICTION_COLUMN.to_string(), PREDICTION_COLUMN.to_string()));
        keyed.push((label.clone(), label.clone()));
        if !response.colnames.iter().any(|name| name == ID_COLUMN) {
            keyed.push((ID_COLUMN.to_string(), ID_COLUMN.to_string()));
        }
        for (index, name) in response.colnames.iter().enumerate() {
            let display = response
                .coldesc
                .describe(index, name)
                .unwrap_or(name.as_str())
                .to_string();
            keyed.push((name.clone(), display));
        }
        let columns = keyed
            .into_iter()
            .enumerate()
            .map(|(position, (key, display_name))| ColumnDescriptor {
                key,
                display_name,
                position,
            })
            .collect();
        Self { columns, label }
    }

    /// Look a column up by key.
    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.key == key)
    }
}
