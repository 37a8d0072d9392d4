//! Export actions triggered from the toolbar.
//!
//! Notes:
//! - Both exports run as background tasks (tokio on native, the browser's
//!   microtask queue on wasm) and report back through the export channel.
//! - An export only counts as done once the save dialog or browser download
//!   has finished, so the status line reflects what actually happened.

use super::state::{DiagramApp, StatusMessage};
use crate::export::{deliver_document, deliver_vector, ExportKind, ExportOutcome, ExportSettings};
use eframe::egui;
use std::sync::Arc;

impl DiagramApp {
    /// Starts an export of the active diagram.
    ///
    /// Each call starts an independent export; the result shows up in the
    /// status line once [`DiagramApp::handle_export_outcomes`] picks it up.
    pub fn export(&mut self, kind: ExportKind, ctx: &egui::Context) {
        let Some(diagram) = self.active_diagram() else {
            return;
        };
        let Some(sender) = self.exports.outcome_sender.clone() else {
            return;
        };
        let surface = Arc::clone(&diagram.surface);
        let file_stem = diagram.kind.info().file_stem;
        let file_name = format!("{}.{}", file_stem, kind.content_kind().extension());
        let sink = Arc::clone(&self.sink);
        let ctx = ctx.clone();

        let task = async move {
            let outcome = match kind {
                ExportKind::Vector => {
                    deliver_vector(surface.as_ref(), file_stem, sink.as_ref()).await
                }
                ExportKind::Document => {
                    let settings = ExportSettings::default();
                    deliver_document(surface.as_ref(), file_stem, &settings, sink.as_ref()).await
                }
            };
            let _ = sender.send(outcome);
            ctx.request_repaint();
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(task);
                }
                Err(e) => {
                    log::error!("Cannot start export of {}: {}", file_name, e);
                    self.exports.status = Some(StatusMessage::Error(
                        "Export unavailable: no async runtime".to_string(),
                    ));
                    return;
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);

        self.exports.in_flight += 1;
        self.exports.status = Some(StatusMessage::Info(format!("Exporting {}…", file_name)));
    }

    /// Processes completed exports from the channel.
    pub fn handle_export_outcomes(&mut self) {
        let mut completed = Vec::new();
        if let Some(receiver) = &self.exports.outcome_receiver {
            while let Ok(outcome) = receiver.try_recv() {
                completed.push(outcome);
            }
        }
        for outcome in completed {
            self.exports.in_flight = self.exports.in_flight.saturating_sub(1);
            self.record_outcome(outcome);
        }
    }

    fn record_outcome(&mut self, outcome: ExportOutcome) {
        self.exports.status = Some(match outcome {
            ExportOutcome::Delivered { file_name, .. } => {
                StatusMessage::Info(format!("Exported {}", file_name))
            }
            ExportOutcome::Cancelled { file_name } => {
                StatusMessage::Info(format!("Export of {} cancelled", file_name))
            }
            ExportOutcome::Failed(reason) => {
                StatusMessage::Error(format!("Export failed: {}", reason))
            }
        });
    }
}
