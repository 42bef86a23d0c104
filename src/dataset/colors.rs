//! Per-cell colors keyed by `(record id, column key)`.

use std::collections::HashMap;

use egui::Color32;

use super::records::{Dataset, RecordId};
use crate::color::{color_for, score_of};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellColorMap {
    cells: HashMap<RecordId, HashMap<String, Color32>>,
}

impl CellColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record_id: RecordId, column: &str, color: Color32) {
        self.cells
            .entry(record_id)
            .or_default()
            .insert(column.to_string(), color);
    }

    pub fn get(&self, record_id: &str, column: &str) -> Option<Color32> {
        self.cells.get(record_id)?.get(column).copied()
    }

    /// Number of colored cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Move every entry of `other` into this map, replacing existing cells.
    pub fn extend(&mut self, other: CellColorMap) {
        for (record_id, columns) in other.cells {
            self.cells.entry(record_id).or_default().extend(columns);
        }
    }
}

/// Color the label column of every record. Non-numeric labels still get an
/// entry so the whole column renders consistently.
pub fn label_colors(dataset: &Dataset, label: &str) -> CellColorMap {
    let mut colors = CellColorMap::new();
    for record in dataset.records() {
        let score = record.get(label).and_then(score_of).unwrap_or(f64::NAN);
        colors.insert(record.id().clone(), label, color_for(score));
    }
    colors
}
