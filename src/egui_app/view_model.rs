//! Merged dataset plus the projections the renderer reads every frame.

use egui::Color32;
use serde_json::Value;

use crate::backend::PredictResponse;
use crate::color::color_for;
use crate::dataset::{
    CellColorMap, ColumnDescriptor, Dataset, PREDICTION_COLUMN, Record, RecordId, Schema,
};
use crate::egui_app::state::{NavigationError, NavigationState};

/// Rendered in place of missing or null fields.
pub const MISSING_PLACEHOLDER: &str = "_";
/// Appended to abbreviated cell text.
pub const TRUNCATION_MARKER: char = '…';

/// One header slot of the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibleColumn<'a> {
    Column(&'a ColumnDescriptor),
    /// Sentinel shown when more columns exist than fit.
    More { hidden: usize },
}

/// How a cell background should be painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellShade {
    Color(Color32),
    /// Prediction cell whose prediction has not arrived.
    Loading,
    Plain,
}

/// One row of the detail view.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailField {
    pub record_id: RecordId,
    pub key: String,
    pub display_name: String,
    pub value: Option<Value>,
    pub shade: CellShade,
}

/// Outcome of merging a prediction response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Response entries that matched at least one record.
    pub matched: usize,
    /// Response ids not present in the store.
    pub unknown: usize,
    /// `predictions` and `ids` had different lengths.
    pub length_mismatch: bool,
}

/// Single owner of columns, rows, colors and navigation for one run.
#[derive(Clone, Debug, Default)]
pub struct ViewModel {
    schema: Option<Schema>,
    dataset: Option<Dataset>,
    colors: CellColorMap,
    predictions_loaded: bool,
    navigation: NavigationState,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        self.schema
            .as_ref()
            .map(|schema| schema.columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn label_column(&self) -> Option<&str> {
        self.schema.as_ref().map(|schema| schema.label.as_str())
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Number of loaded rows; zero before rows arrive.
    pub fn row_count(&self) -> usize {
        self.dataset.as_ref().map_or(0, Dataset::len)
    }

    pub fn predictions_loaded(&self) -> bool {
        self.predictions_loaded
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn colors(&self) -> &CellColorMap {
        &self.colors
    }

    /// First `n` columns, plus a [`VisibleColumn::More`] marker when more exist.
    pub fn visible_columns(&self, n: usize) -> Vec<VisibleColumn<'_>> {
        let columns = self.columns();
        let mut visible: Vec<VisibleColumn<'_>> =
            columns.iter().take(n).map(VisibleColumn::Column).collect();
        if columns.len() > n {
            visible.push(VisibleColumn::More {
                hidden: columns.len() - n,
            });
        }
        visible
    }

    /// First `n` records in store order.
    pub fn visible_rows(&self, n: usize) -> &[Record] {
        let records = self.dataset.as_ref().map_or(&[][..], Dataset::records);
        &records[..n.min(records.len())]
    }

    /// Background for a cell. Prediction cells report `Loading` until the
    /// prediction response has been merged.
    pub fn cell_shade(&self, record_id: &str, column_key: &str) -> CellShade {
        if column_key == PREDICTION_COLUMN && !self.predictions_loaded {
            return CellShade::Loading;
        }
        match self.colors.get(record_id, column_key) {
            Some(color) => CellShade::Color(color),
            None => CellShade::Plain,
        }
    }

    /// Every column of the record at `index`, untruncated.
    pub fn detail_for(&self, index: usize) -> Result<Vec<DetailField>, NavigationError> {
        let dataset = self.dataset.as_ref().ok_or(NavigationError::NotReady)?;
        let record = dataset.get(index).ok_or(NavigationError::OutOfRange {
            index,
            len: dataset.len(),
        })?;
        Ok(self
            .columns()
            .iter()
            .map(|column| DetailField {
                record_id: record.id().clone(),
                key: column.key.clone(),
                display_name: column.display_name.clone(),
                value: record.get(&column.key).cloned(),
                shade: self.cell_shade(record.id().as_str(), &column.key),
            })
            .collect())
    }

    /// Detail fields of the current selection while the detail view is open.
    pub fn current_detail(&self) -> Option<Vec<DetailField>> {
        let index = self.navigation.detail_index()?;
        self.detail_for(index).ok()
    }

    pub(crate) fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.navigation
    }

    /// Drop everything from the previous run. The selection index survives.
    pub(crate) fn reset(&mut self) {
        self.schema = None;
        self.dataset = None;
        self.colors.clear();
        self.predictions_loaded = false;
        self.navigation.close();
    }

    pub(crate) fn publish_schema(&mut self, schema: Schema) {
        self.schema = Some(schema);
    }

    /// Install the row store together with its label colors.
    pub(crate) fn publish_rows(&mut self, dataset: Dataset, label_colors: CellColorMap) {
        self.dataset = Some(dataset);
        self.colors.clear();
        self.colors.extend(label_colors);
        self.predictions_loaded = false;
    }

    /// Mark predictions as loaded without a response (nothing was submitted).
    pub(crate) fn mark_predictions_loaded(&mut self) {
        self.predictions_loaded = true;
    }

    /// Merge `response` into the store by id. Records whose id is absent from
    /// the response keep their fields and colors.
    pub(crate) fn merge_predictions(&mut self, response: &PredictResponse) -> MergeReport {
        let mut report = MergeReport {
            length_mismatch: response.ids.len() != response.predictions.len(),
            ..MergeReport::default()
        };
        let Some(dataset) = self.dataset.as_mut() else {
            return report;
        };
        for (id, &prediction) in response.ids.iter().zip(response.predictions.iter()) {
            let positions = dataset.positions_of(id).to_vec();
            if positions.is_empty() {
                report.unknown += 1;
                continue;
            }
            let value = serde_json::Number::from_f64(prediction)
                .map(Value::Number)
                .unwrap_or(Value::Null);
            for position in positions {
                if let Some(record) = dataset.record_mut(position) {
                    record.set(PREDICTION_COLUMN, value.clone());
                }
            }
            self.colors
                .insert(RecordId::new(id.as_str()), PREDICTION_COLUMN, color_for(prediction));
            report.matched += 1;
        }
        self.predictions_loaded = true;
        report
    }
}

/// Cell text for the table: placeholder for missing/null values, otherwise
/// the stringified value cut to `max_len` characters plus a marker.
pub fn display_value(record: &Record, column_key: &str, max_len: usize) -> String {
    match record.get(column_key) {
        None | Some(Value::Null) => MISSING_PLACEHOLDER.to_string(),
        Some(value) => abbreviate(&value_text(value), max_len),
    }
}

/// Full text of a value, strings without quotes.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => MISSING_PLACEHOLDER.to_string(),
        other => other.to_string(),
    }
}

fn abbreviate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_len).collect();
    short.push(TRUNCATION_MARKER);
    short
}
