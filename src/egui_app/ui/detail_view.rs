use super::style;
use super::table_view::value_cell;
use crate::dataset::PREDICTION_COLUMN;
use crate::egui_app::view_model::{DetailField, MISSING_PLACEHOLDER, value_text};
use eframe::egui::{self, RichText, Ui};

/// Draw every field of the selected record; returns true when Back is pressed.
pub(super) fn render_detail(ui: &mut Ui, fields: &[DetailField], label_column: &str) -> bool {
    let palette = style::palette();
    let mut back = false;
    ui.horizontal(|ui| {
        if ui.button("Back").clicked() {
            back = true;
        }
        if let Some(first) = fields.first() {
            ui.label(RichText::new(format!("Record {}", first.record_id)).strong());
        }
    });
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        for field in fields
            .iter()
            .filter(|field| field.key == label_column || field.key == PREDICTION_COLUMN)
        {
            let title = if field.key == PREDICTION_COLUMN {
                "Prediction"
            } else {
                "Target"
            };
            ui.label(RichText::new(title).color(palette.text_muted));
            value_cell(ui, &field_text(field), field.shade);
            ui.add_space(12.0);
        }
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("record_detail")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("record_detail_grid")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for field in fields {
                        ui.label(RichText::new(&field.display_name).color(palette.text_muted))
                            .on_hover_text(&field.key);
                        value_cell(ui, &field_text(field), field.shade);
                        ui.end_row();
                    }
                });
        });
    back
}

fn field_text(field: &DetailField) -> String {
    field
        .value
        .as_ref()
        .map(value_text)
        .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string())
}
