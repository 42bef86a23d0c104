use super::style;
use crate::config::ViewerConfig;
use crate::egui_app::view_model::{CellShade, ViewModel, VisibleColumn, display_value};
use eframe::egui::{self, Frame, Label, Margin, RichText, Sense, Ui};

/// Sentinel header shown when columns are hidden.
const MORE_COLUMNS_LABEL: &str = "...";

/// Draw the truncated table; returns the index of a clicked row.
pub(super) fn render_table(ui: &mut Ui, view: &ViewModel, config: &ViewerConfig) -> Option<usize> {
    let columns = view.visible_columns(config.visible_columns);
    let rows = view.visible_rows(config.visible_rows);
    let mut clicked = None;
    egui::ScrollArea::both()
        .id_salt("records_table")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("records_grid")
                .striped(true)
                .spacing([2.0, 2.0])
                .show(ui, |ui| {
                    for column in &columns {
                        header_cell(ui, column);
                    }
                    ui.end_row();

                    for (index, record) in rows.iter().enumerate() {
                        for column in &columns {
                            let response = match column {
                                VisibleColumn::Column(descriptor) => {
                                    let shade = view.cell_shade(record.id().as_str(), &descriptor.key);
                                    let text =
                                        display_value(record, &descriptor.key, config.max_cell_length);
                                    value_cell(ui, &text, shade)
                                }
                                VisibleColumn::More { .. } => value_cell(ui, "", CellShade::Plain),
                            };
                            if response.clicked() {
                                clicked = Some(index);
                            }
                        }
                        ui.end_row();
                    }
                });
        });
    clicked
}

fn header_cell(ui: &mut Ui, column: &VisibleColumn<'_>) {
    let palette = style::palette();
    match column {
        VisibleColumn::Column(descriptor) => {
            ui.label(RichText::new(&descriptor.display_name).strong())
                .on_hover_text(&descriptor.key);
        }
        VisibleColumn::More { hidden } => {
            ui.label(RichText::new(MORE_COLUMNS_LABEL).color(palette.text_muted))
                .on_hover_text(format!("{hidden} more columns in the detail view"));
        }
    }
}

/// One clickable cell, filled with its score color or showing a spinner.
pub(super) fn value_cell(ui: &mut Ui, text: &str, shade: CellShade) -> egui::Response {
    let fill = match shade {
        CellShade::Color(color) => color,
        CellShade::Loading | CellShade::Plain => egui::Color32::TRANSPARENT,
    };
    Frame::new()
        .fill(fill)
        .inner_margin(Margin::symmetric(4, 1))
        .show(ui, |ui| {
            if shade == CellShade::Loading {
                ui.add(egui::Spinner::new().size(12.0)).interact(Sense::click())
            } else {
                ui.add(
                    Label::new(RichText::new(text).monospace().color(style::text_on(shade)))
                        .sense(Sense::click()),
                )
            }
        })
        .inner
}
