//! Application state management structures.
//!
//! This module contains the state structures that track the application's
//! current UI state: which diagram is shown, canvas zoom and the results of
//! in-flight exports.

use super::file_ops::PlatformDownload;
use crate::diagrams::{all_diagrams, build_diagram, DiagramKind};
use crate::export::{DownloadSink, ExportOutcome};
use crate::surface::DiagramSurface;
use crate::types::Scene;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// State related to canvas display.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Current zoom level (1.0 = diagram units map to points one to one)
    pub zoom_factor: f32,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self { zoom_factor: 0.5 }
    }
}

/// A status line message shown in the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    /// Neutral progress or success information
    Info(String),
    /// An export did not produce a file
    Error(String),
}

/// State related to export operations.
///
/// Results of asynchronous exports arrive through the channel and are
/// drained once per frame.
pub struct ExportState {
    /// Channel for receiving export results from async contexts
    pub outcome_sender: Option<Sender<ExportOutcome>>,
    /// Receiving end drained by the UI each frame
    pub outcome_receiver: Option<Receiver<ExportOutcome>>,
    /// Number of document exports that have not reported back yet
    pub in_flight: usize,
    /// Last status message
    pub status: Option<StatusMessage>,
}

impl ExportState {
    /// Creates the state with a fresh result channel.
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            outcome_sender: Some(sender),
            outcome_receiver: Some(receiver),
            in_flight: 0,
            status: None,
        }
    }
}

/// A built-in diagram together with its rendered surface.
pub struct LoadedDiagram {
    /// Which diagram this is
    pub kind: DiagramKind,
    /// Scene painted on the canvas
    pub scene: Scene,
    /// Surface the exporters read from
    pub surface: Arc<DiagramSurface>,
}

fn load_diagrams() -> Vec<LoadedDiagram> {
    all_diagrams()
        .iter()
        .map(|info| {
            let scene = build_diagram(info.kind);
            let surface = Arc::new(DiagramSurface::from_scene(&scene));
            LoadedDiagram {
                kind: info.kind,
                scene,
                surface,
            }
        })
        .collect()
}

fn default_sink() -> Arc<dyn DownloadSink> {
    Arc::new(PlatformDownload)
}

/// The main application structure.
///
/// This struct implements the `eframe::App` trait. Only UI preferences are
/// persisted; diagrams are rebuilt from their data tables on start and every
/// export uses the fixed page and capture settings.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramApp {
    /// Diagram currently shown and exported
    pub active: DiagramKind,
    /// Canvas display state
    pub canvas: CanvasState,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// All built-in diagrams
    #[serde(skip, default = "load_diagrams")]
    pub diagrams: Vec<LoadedDiagram>,
    /// Export channel and status
    #[serde(skip, default = "ExportState::new")]
    pub exports: ExportState,
    /// Where finished artifacts are sent
    #[serde(skip, default = "default_sink")]
    pub sink: Arc<dyn DownloadSink>,
}

impl Default for DiagramApp {
    fn default() -> Self {
        Self {
            active: DiagramKind::default(),
            canvas: CanvasState::default(),
            dark_mode: false,
            diagrams: load_diagrams(),
            exports: ExportState::new(),
            sink: default_sink(),
        }
    }
}

impl DiagramApp {
    /// Creates the app, restoring persisted preferences when available.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.storage
            .and_then(|storage| storage.get_string("app_state"))
            .and_then(|json| match Self::from_json(&json) {
                Ok(app) => Some(app),
                Err(e) => {
                    log::warn!("Ignoring unreadable app state: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Creates the app with a custom download sink.
    pub fn with_sink(sink: Arc<dyn DownloadSink>) -> Self {
        Self {
            sink,
            ..Default::default()
        }
    }

    /// Serializes the persisted preferences to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Restores preferences from JSON, rebuilding everything else.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The diagram currently shown.
    pub fn active_diagram(&self) -> Option<&LoadedDiagram> {
        self.diagrams.iter().find(|d| d.kind == self.active)
    }
}
