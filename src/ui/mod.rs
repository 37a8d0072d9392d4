//! User interface components for the diagram viewer.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main DiagramApp
//! - `export` - Export actions wired to the toolbar buttons
//! - `file_ops` - Delivery of exported files for native and WASM
//! - `rendering` - Painting diagram scenes on the canvas

mod export;
mod file_ops;
mod rendering;
mod state;

#[cfg(test)]
mod tests;

pub use file_ops::PlatformDownload;
pub use state::{DiagramApp, StatusMessage};

use self::rendering::ScenePainter;
use crate::constants;
use crate::diagrams::all_diagrams;
use crate::export::ExportKind;
use crate::types::{Scene, Shape};
use eframe::egui;
use eframe::epaint::StrokeKind;

impl eframe::App for DiagramApp {
    /// Persist UI preferences between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => {
                storage.set_string("app_state", json);
            }
            Err(err) => {
                log::error!("Failed to serialize app state: {err}");
            }
        }
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_export_outcomes();
        self.handle_export_shortcuts(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_header(ui);
            ui.add_space(8.0);
            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.draw_canvas(ui);
                });
        });
    }
}

impl DiagramApp {
    /// Ctrl+Shift+S exports SVG, Ctrl+Shift+P exports PDF.
    fn handle_export_shortcuts(&mut self, ctx: &egui::Context) {
        let (svg, pdf) = ctx.input(|i| {
            let chord = i.modifiers.command && i.modifiers.shift;
            (
                chord && i.key_pressed(egui::Key::S),
                chord && i.key_pressed(egui::Key::P),
            )
        });
        if svg {
            self.export(ExportKind::Vector, ctx);
        }
        if pdf {
            self.export(ExportKind::Document, ctx);
        }
    }

    /// Draws the toolbar with diagram selection, zoom and export buttons.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for info in all_diagrams() {
                ui.selectable_value(&mut self.active, info.kind, info.title);
            }

            ui.separator();

            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.zoom_by(1.0 / constants::ZOOM_STEP);
            }
            ui.label(format!("{:.0}%", self.canvas.zoom_factor * 100.0));
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.zoom_by(constants::ZOOM_STEP);
            }
            if ui.button("100%").clicked() {
                self.canvas.zoom_factor = 1.0;
            }

            ui.separator();

            if ui
                .button("⬇ Export SVG")
                .on_hover_text("Save the diagram as a vector image")
                .clicked()
            {
                self.export(ExportKind::Vector, ui.ctx());
            }
            if ui
                .button("⬇ Export PDF")
                .on_hover_text("Save the diagram on an A4 landscape page")
                .clicked()
            {
                self.export(ExportKind::Document, ui.ctx());
            }

            ui.separator();
            ui.checkbox(&mut self.dark_mode, "Dark mode");

            if self.exports.in_flight > 0 {
                ui.spinner();
            }
            match &self.exports.status {
                Some(StatusMessage::Info(text)) => {
                    ui.label(text);
                }
                Some(StatusMessage::Error(text)) => {
                    let color = ui.visuals().error_fg_color;
                    ui.colored_label(color, text);
                }
                None => {}
            }
        });
    }

    /// Multiplies the zoom, keeping it within the allowed range.
    pub fn zoom_by(&mut self, factor: f32) {
        self.canvas.zoom_factor =
            (self.canvas.zoom_factor * factor).clamp(constants::MIN_ZOOM, constants::MAX_ZOOM);
    }

    fn draw_header(&self, ui: &mut egui::Ui) {
        let Some(diagram) = self.active_diagram() else {
            return;
        };
        let info = diagram.kind.info();
        ui.heading(info.title);
        if let Some(subtitle) = info.subtitle {
            ui.label(subtitle);
        }
    }

    /// Paints the active diagram on a white card sized to the zoomed scene.
    fn draw_canvas(&self, ui: &mut egui::Ui) {
        let Some(diagram) = self.active_diagram() else {
            ui.label("No diagram available");
            return;
        };
        let zoom = self.canvas.zoom_factor;
        let pad = constants::CANVAS_PADDING * zoom;
        let card_size = egui::vec2(
            diagram.scene.width * zoom + 2.0 * pad,
            diagram.scene.height * zoom + 2.0 * pad,
        );
        let (response, painter) = ui.allocate_painter(card_size, egui::Sense::hover());
        let card = response.rect;

        painter.rect_filled(card, constants::CARD_CORNER_RADIUS, egui::Color32::WHITE);
        painter.rect_stroke(
            card,
            constants::CARD_CORNER_RADIUS,
            egui::Stroke::new(1.0, egui::Color32::from_gray(220)),
            StrokeKind::Inside,
        );

        let time = ui.input(|i| i.time);
        ScenePainter::new(&painter, card.min + egui::vec2(pad, pad), zoom, time)
            .paint(&diagram.scene);

        if has_blinking_shape(&diagram.scene) {
            ui.ctx().request_repaint();
        }
    }
}

fn has_blinking_shape(scene: &Scene) -> bool {
    let mut found = false;
    for shape in &scene.shapes {
        shape.visit(&mut |s| {
            if matches!(s, Shape::Circle { blink: true, .. }) {
                found = true;
            }
        });
    }
    found
}
