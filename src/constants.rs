//! Shared application-wide constants.
//! Centralizes tweakable values used across rendering, export and the UI.

// Document export
/// Page width of the exported document in millimetres (A4 landscape).
pub const PAGE_WIDTH_MM: f32 = 297.0;
/// Page height of the exported document in millimetres (A4 landscape).
pub const PAGE_HEIGHT_MM: f32 = 210.0;
/// Supersampling factor applied when capturing a diagram for the document export.
pub const CAPTURE_SCALE: f32 = 2.0;
/// Smallest capture scale accepted by the rasterizer.
pub const MIN_CAPTURE_SCALE: f32 = 0.25;
/// Largest capture scale accepted by the rasterizer.
pub const MAX_CAPTURE_SCALE: f32 = 8.0;
/// Resolution used to size embedded bitmaps before the fit scale is applied.
pub const EMBED_DPI: f32 = 300.0;
/// Millimetres per inch.
pub const MM_PER_INCH: f32 = 25.4;
/// Title written into exported document metadata.
pub const DOCUMENT_TITLE: &str = "Repair Ticket Diagrams";

// Canvas
/// Padding around the diagram inside the canvas card (in screen pixels at zoom 1.0).
pub const CANVAS_PADDING: f32 = 32.0;
/// Corner radius of the white card the diagram sits on.
pub const CARD_CORNER_RADIUS: f32 = 8.0;
/// Smallest allowed canvas zoom.
pub const MIN_ZOOM: f32 = 0.25;
/// Largest allowed canvas zoom.
pub const MAX_ZOOM: f32 = 3.0;
/// Multiplicative step used by the zoom buttons.
pub const ZOOM_STEP: f32 = 1.25;
/// Full period of the blinking indicator animation, in seconds.
pub const BLINK_PERIOD_SECS: f64 = 1.0;

// Arrow markers
/// Length of an arrowhead along the line direction (in diagram units).
pub const ARROW_LENGTH: f32 = 10.0;
/// Half of the arrowhead's width perpendicular to the line (in diagram units).
pub const ARROW_HALF_WIDTH: f32 = 3.0;
