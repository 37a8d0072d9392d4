use super::*;
use crate::diagrams::DiagramKind;
use crate::error::DeliveryError;
use crate::export::{ContentKind, DownloadSink, ExportArtifact, ExportKind, ExportOutcome};
use eframe::egui;
use futures::future::{self, BoxFuture};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Run a single headless egui frame with the provided input events and closure.
fn run_ui_with(events: Vec<egui::Event>, mut f: impl FnMut(&egui::Context)) -> egui::FullOutput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.events = events;

    let ctx = egui::Context::default();
    ctx.run(raw, |ctx| {
        ctx.set_visuals(egui::Visuals::light());
        f(ctx);
    })
}

/// Collects delivered artifacts instead of saving them.
#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<ExportArtifact>>,
}

impl RecordingSink {
    fn names(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.file_name.clone())
            .collect()
    }
}

impl DownloadSink for RecordingSink {
    fn deliver(&self, artifact: ExportArtifact) -> BoxFuture<'_, Result<(), DeliveryError>> {
        self.delivered.lock().unwrap().push(artifact);
        Box::pin(future::ready(Ok(())))
    }
}

/// Stands in for a save dialog that did not write the file.
struct DecliningSink(DeliveryError);

impl DownloadSink for DecliningSink {
    fn deliver(&self, _artifact: ExportArtifact) -> BoxFuture<'_, Result<(), DeliveryError>> {
        Box::pin(future::ready(Err(self.0.clone())))
    }
}

fn app_with_recorder() -> (DiagramApp, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let app = DiagramApp::with_sink(sink.clone());
    (app, sink)
}

#[test]
fn draws_toolbar_and_canvas_without_panicking() {
    let (mut app, _sink) = app_with_recorder();
    for kind in [DiagramKind::Swimlane, DiagramKind::WorkflowStatus] {
        app.active = kind;
        let output = run_ui_with(vec![], |ctx| {
            egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
                app.draw_toolbar(ui);
            });
            egui::CentralPanel::default().show(ctx, |ui| {
                app.draw_header(ui);
                app.draw_canvas(ui);
            });
        });
        assert!(!output.shapes.is_empty());
    }
}

/// Drains the export channel until every started export has reported back.
async fn wait_for_exports(app: &mut DiagramApp) {
    for _ in 0..600 {
        app.handle_export_outcomes();
        if app.exports.in_flight == 0 {
            return;
        }
        tokio::task::yield_now().await;
        std::thread::sleep(Duration::from_millis(50));
    }
    panic!("exports still pending: {}", app.exports.in_flight);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn export_svg_delivers_active_diagram() {
    let (mut app, sink) = app_with_recorder();
    let ctx = egui::Context::default();
    app.export(ExportKind::Vector, &ctx);
    assert_eq!(
        app.exports.status,
        Some(StatusMessage::Info(
            "Exporting repair-ticket-workflow-swimlane-diagram.svg…".to_string()
        ))
    );
    wait_for_exports(&mut app).await;

    assert_eq!(sink.names(), ["repair-ticket-workflow-swimlane-diagram.svg"]);
    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered[0].kind, ContentKind::VectorImage);
    let markup = std::str::from_utf8(&delivered[0].bytes).unwrap();
    assert!(markup.starts_with("<svg"));
    assert_eq!(
        app.exports.status,
        Some(StatusMessage::Info(
            "Exported repair-ticket-workflow-swimlane-diagram.svg".to_string()
        ))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn switching_diagram_changes_export_name() {
    let (mut app, sink) = app_with_recorder();
    let ctx = egui::Context::default();
    app.active = DiagramKind::WorkflowStatus;
    app.export(ExportKind::Vector, &ctx);
    wait_for_exports(&mut app).await;
    app.active = DiagramKind::Swimlane;
    app.export(ExportKind::Vector, &ctx);
    wait_for_exports(&mut app).await;

    assert_eq!(
        sink.names(),
        [
            "workflow-status-diagram.svg",
            "repair-ticket-workflow-swimlane-diagram.svg"
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn export_svg_reports_missing_surface() {
    let (mut app, sink) = app_with_recorder();
    let ctx = egui::Context::default();
    app.diagrams[0].surface = Arc::new(crate::surface::DiagramSurface::detached(10.0, 10.0));
    app.active = app.diagrams[0].kind;
    app.export(ExportKind::Vector, &ctx);
    wait_for_exports(&mut app).await;

    assert!(sink.names().is_empty());
    assert!(matches!(app.exports.status, Some(StatusMessage::Error(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dismissed_save_dialog_is_not_reported_as_exported() {
    let mut app = DiagramApp::with_sink(Arc::new(DecliningSink(DeliveryError::Cancelled)));
    let ctx = egui::Context::default();
    app.export(ExportKind::Vector, &ctx);
    wait_for_exports(&mut app).await;

    assert_eq!(
        app.exports.status,
        Some(StatusMessage::Info(
            "Export of repair-ticket-workflow-swimlane-diagram.svg cancelled".to_string()
        ))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_write_shows_error_status() {
    let mut app = DiagramApp::with_sink(Arc::new(DecliningSink(DeliveryError::Write {
        path: "/read-only/workflow-status-diagram.pdf".to_string(),
        reason: "permission denied".to_string(),
    })));
    app.active = DiagramKind::WorkflowStatus;
    let ctx = egui::Context::default();
    app.export(ExportKind::Document, &ctx);
    wait_for_exports(&mut app).await;

    assert_eq!(
        app.exports.status,
        Some(StatusMessage::Error(
            "Export failed: Failed to save /read-only/workflow-status-diagram.pdf: permission denied"
                .to_string()
        ))
    );
}

#[test]
fn outcomes_from_channel_update_status() {
    let (mut app, _sink) = app_with_recorder();
    let sender = app.exports.outcome_sender.clone().unwrap();
    app.exports.in_flight = 2;

    sender
        .send(ExportOutcome::Delivered {
            file_name: "a.pdf".to_string(),
            kind: ContentKind::Document,
        })
        .unwrap();
    sender
        .send(ExportOutcome::Failed("Render surface is detached".to_string()))
        .unwrap();
    app.handle_export_outcomes();

    assert_eq!(app.exports.in_flight, 0);
    assert_eq!(
        app.exports.status,
        Some(StatusMessage::Error(
            "Export failed: Render surface is detached".to_string()
        ))
    );

    // Nothing pending leaves the state alone
    app.handle_export_outcomes();
    assert_eq!(app.exports.in_flight, 0);
}

#[test]
fn export_without_runtime_reports_error() {
    let (mut app, sink) = app_with_recorder();
    let ctx = egui::Context::default();
    app.export(ExportKind::Document, &ctx);

    assert_eq!(app.exports.in_flight, 0);
    assert!(matches!(app.exports.status, Some(StatusMessage::Error(_))));
    assert!(sink.names().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn export_pdf_delivers_document_in_background() {
    let (mut app, sink) = app_with_recorder();
    app.active = DiagramKind::WorkflowStatus;
    let ctx = egui::Context::default();

    app.export(ExportKind::Document, &ctx);
    assert_eq!(app.exports.in_flight, 1);
    assert_eq!(
        app.exports.status,
        Some(StatusMessage::Info(
            "Exporting workflow-status-diagram.pdf…".to_string()
        ))
    );
    wait_for_exports(&mut app).await;

    assert_eq!(sink.names(), ["workflow-status-diagram.pdf"]);
    let delivered = sink.delivered.lock().unwrap();
    assert!(delivered[0].bytes.starts_with(b"%PDF"));
}

#[test]
fn zoom_is_clamped() {
    let (mut app, _sink) = app_with_recorder();
    for _ in 0..50 {
        app.zoom_by(crate::constants::ZOOM_STEP);
    }
    assert_eq!(app.canvas.zoom_factor, crate::constants::MAX_ZOOM);
    for _ in 0..50 {
        app.zoom_by(1.0 / crate::constants::ZOOM_STEP);
    }
    assert_eq!(app.canvas.zoom_factor, crate::constants::MIN_ZOOM);
}

#[test]
fn preferences_survive_json_round_trip() {
    let (mut app, _sink) = app_with_recorder();
    app.active = DiagramKind::WorkflowStatus;
    app.canvas.zoom_factor = 1.5;
    app.dark_mode = true;

    let json = app.to_json().unwrap();
    let restored = DiagramApp::from_json(&json).unwrap();

    assert_eq!(restored.active, DiagramKind::WorkflowStatus);
    assert_eq!(restored.canvas.zoom_factor, 1.5);
    assert!(restored.dark_mode);
    // Diagrams are rebuilt rather than persisted
    assert_eq!(restored.diagrams.len(), 2);
    assert!(restored.active_diagram().is_some());
}

#[test]
fn unknown_fields_fall_back_to_defaults() {
    let restored = DiagramApp::from_json("{}").unwrap();
    assert_eq!(restored.active, DiagramKind::Swimlane);
    assert_eq!(restored.canvas.zoom_factor, 0.5);
    assert!(restored.exports.outcome_receiver.is_some());
}

#[test]
fn stale_export_settings_in_preferences_are_ignored() {
    let json = r#"{
        "active": "WorkflowStatus",
        "export_settings": {"page": {"width_mm": 0.0, "height_mm": 210.0}, "scale": 0.25}
    }"#;
    let restored = DiagramApp::from_json(json).unwrap();
    assert_eq!(restored.active, DiagramKind::WorkflowStatus);
    assert!(!restored.to_json().unwrap().contains("export_settings"));
}
