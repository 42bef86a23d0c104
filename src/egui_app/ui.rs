//! egui renderer for the anomaly table and record detail views.

mod detail_view;
pub mod style;
mod table_view;

use crate::egui_app::controller::AnomalyController;
use crate::egui_app::state::{PipelinePhase, ViewMode};
use eframe::egui::{self, Frame, Margin, RichText};
use std::time::Duration;

/// Smallest window size that still fits the header and a few columns.
pub const MIN_VIEWPORT_SIZE: [f32; 2] = [640.0, 400.0];
const LOADING_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// Renders the viewer using the controller's state.
pub struct AnomalyLensApp {
    controller: AnomalyController,
    visuals_set: bool,
}

impl AnomalyLensApp {
    /// Wrap `controller` and kick off the first load.
    pub fn new(mut controller: AnomalyController) -> Self {
        if controller.pipeline().phase == PipelinePhase::Init {
            controller.start();
        }
        Self {
            controller,
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::top("header")
            .frame(
                Frame::new()
                    .fill(palette.bg_primary)
                    .inner_margin(Margin::symmetric(8, 6)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let config = self.controller.config();
                    ui.heading(&config.title);
                    ui.separator();
                    ui.label(RichText::new(&config.dataset_name).color(palette.text_muted));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        // Reloading mid-run supersedes the current run.
                        if ui.button("Reload").clicked() {
                            self.controller.reload();
                        }
                    });
                });
            });
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                Frame::new()
                    .fill(egui::Color32::BLACK)
                    .inner_margin(Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                let status = self.controller.status().clone();
                ui.horizontal(|ui| {
                    let color = style::tone_color(status.tone);
                    if self.controller.pipeline().phase.is_loading() {
                        ui.add(egui::Spinner::new().size(12.0).color(color));
                    } else {
                        ui.label(RichText::new("●").color(color));
                    }
                    ui.label(RichText::new(&status.text).color(color));
                    let retry = self.controller.pipeline().phase == PipelinePhase::Failed
                        || self.controller.pipeline().prediction_error.is_some();
                    if retry && ui.button("Retry").clicked() {
                        self.controller.reload();
                    }
                });
            });
    }

    fn render_body(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let view = self.controller.view();
            if !view.is_loaded() {
                ui.centered_and_justified(|ui| {
                    if self.controller.pipeline().phase.is_loading() {
                        ui.spinner();
                    } else {
                        ui.label("No data loaded");
                    }
                });
                return;
            }
            match view.navigation().mode {
                ViewMode::Table => {
                    let clicked = table_view::render_table(ui, view, self.controller.config());
                    if let Some(index) = clicked {
                        if let Err(err) = self.controller.select_row(index) {
                            tracing::debug!("Ignoring row selection: {err}");
                        }
                    }
                }
                ViewMode::Detail => {
                    let label = view.label_column().unwrap_or_default().to_string();
                    let back = match view.current_detail() {
                        Some(fields) => detail_view::render_detail(ui, &fields, &label),
                        None => true,
                    };
                    if back {
                        self.controller.close_detail();
                    }
                }
            }
        });
    }
}

impl eframe::App for AnomalyLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll_background_jobs();
        self.apply_visuals(ctx);
        self.render_header(ctx);
        self.render_status(ctx);
        self.render_body(ctx);
        let pipeline = self.controller.pipeline();
        if pipeline.phase.is_loading() {
            ctx.request_repaint_after(LOADING_REPAINT_INTERVAL);
        }
    }
}
