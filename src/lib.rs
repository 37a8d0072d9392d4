//! # Ticket Diagrams
//!
//! A viewer for the repair ticket workflow diagrams with two exporters:
//! - **Vector export**: the diagram's SVG markup, saved verbatim
//! - **Document export**: a 2× raster capture on a white background, fitted
//!   onto an A4 landscape PDF page
//!
//! ## Features
//! - Swimlane and workflow status diagrams drawn from fixed data tables
//! - Canvas zoom and a blinking indicator for the current status
//! - SVG and PDF export through a save dialog (native) or a browser download
//! - Persisted UI preferences

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod diagrams;
pub mod error;
pub mod export;
pub mod surface;
pub mod svg;
pub mod types;
mod ui;

// Re-export public types and functions
pub use diagrams::{all_diagrams, build_diagram, DiagramInfo, DiagramKind};
pub use error::{CaptureError, DeliveryError, ExportError};
pub use export::{
    compose_document, deliver_document, deliver_vector, export_document, export_vector,
    fit_to_page, ContentKind, DownloadSink, ExportArtifact, ExportKind, ExportOutcome,
    ExportSettings, PageGeometry, Placement,
};
pub use surface::{CaptureOptions, DiagramSurface, RenderSurface};
pub use types::*;
pub use ui::{DiagramApp, PlatformDownload};

/// Runs the diagram viewer as a native window.
///
/// A tokio runtime must be entered on the calling thread so that document
/// exports and save dialogs can run in the background.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let runtime = tokio::runtime::Runtime::new()?;
///     let _guard = runtime.enter();
///     ticket_diagrams::run_app()?;
///     Ok(())
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Repair Ticket Diagrams",
        options,
        Box::new(|cc| Ok(Box::new(DiagramApp::new(cc)))),
    )
}

/// Starts the diagram viewer on the given canvas element.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub async fn start(
    canvas: web_sys::HtmlCanvasElement,
) -> Result<(), wasm_bindgen::JsValue> {
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();
    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|cc| Ok(Box::new(DiagramApp::new(cc)))),
        )
        .await
}
