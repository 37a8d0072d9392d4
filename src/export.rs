//! Diagram export pipeline: vector export and rasterized document export.
//!
//! Both exporters only read from a [`RenderSurface`]; they share no state and
//! may run in any order, any number of times. Each produces a fresh
//! [`ExportArtifact`] that is moved into a [`DownloadSink`].
//!
//! The `deliver_*` functions are the pipeline boundary: they log failures and
//! report an [`ExportOutcome`] instead of returning errors, so nothing raised
//! inside an export ever reaches the application.

use crate::constants;
use crate::error::{CaptureError, DeliveryError, ExportError};
use crate::surface::{CaptureOptions, RenderSurface};
use crate::types::Color;
use futures::future::BoxFuture;
use std::io::BufWriter;
use tiny_skia::Pixmap;

/// Content kind of an exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Scalable vector image
    VectorImage,
    /// Page-formatted document
    Document,
}

impl ContentKind {
    /// MIME type of the content.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentKind::VectorImage => "image/svg+xml",
            ContentKind::Document => "application/pdf",
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ContentKind::VectorImage => "svg",
            ContentKind::Document => "pdf",
        }
    }

    /// Label used for file dialog filters.
    pub fn filter_name(&self) -> &'static str {
        match self {
            ContentKind::VectorImage => "SVG",
            ContentKind::Document => "PDF",
        }
    }
}

/// The bytes of one export together with how they should be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    /// Suggested file name including extension
    pub file_name: String,
    /// What the bytes contain
    pub kind: ContentKind,
    /// File content
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(file_stem: &str, kind: ContentKind, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("{}.{}", file_stem, kind.extension()),
            kind,
            bytes,
        }
    }
}

/// Fixed physical size of the exported document page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width in millimetres
    pub width_mm: f32,
    /// Page height in millimetres
    pub height_mm: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width_mm: constants::PAGE_WIDTH_MM,
            height_mm: constants::PAGE_HEIGHT_MM,
        }
    }
}

/// Where a bitmap lands on the page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Placed width
    pub width: f32,
    /// Placed height
    pub height: f32,
    /// Millimetres per bitmap pixel
    pub ratio: f32,
}

/// Fits a bitmap onto a page with a uniform scale, anchored at the top-left.
///
/// The ratio is `min(page_w / img_w, page_h / img_h)`, so the image never
/// exceeds the page, is never cropped and keeps its aspect ratio. One of the
/// two page dimensions is always filled exactly.
pub fn fit_to_page(image_px: (u32, u32), page: PageGeometry) -> Placement {
    let (img_w, img_h) = (image_px.0.max(1) as f32, image_px.1.max(1) as f32);
    let ratio = (page.width_mm / img_w).min(page.height_mm / img_h);
    Placement {
        x: 0.0,
        y: 0.0,
        width: img_w * ratio,
        height: img_h * ratio,
        ratio,
    }
}

/// Parameters of the document export.
///
/// The application always exports with the defaults: a 2× capture on white,
/// placed on an A4 landscape page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    /// Page the capture is placed on
    pub page: PageGeometry,
    /// Supersampling factor of the capture
    pub scale: f32,
    /// Background painted beneath the capture
    pub background: Color,
}

impl Default for ExportSettings {
    fn default() -> Self {
        let capture = CaptureOptions::default();
        Self {
            page: PageGeometry::default(),
            scale: capture.scale,
            background: capture.background,
        }
    }
}

impl ExportSettings {
    /// Rejects pages and scales that cannot produce a visible document.
    pub fn validate(&self) -> Result<(), CaptureError> {
        let PageGeometry {
            width_mm,
            height_mm,
        } = self.page;
        if !(width_mm.is_finite() && height_mm.is_finite() && width_mm > 0.0 && height_mm > 0.0) {
            return Err(CaptureError::InvalidSettings(format!(
                "page must have a positive size, got {width_mm}x{height_mm} mm"
            )));
        }
        if !(constants::MIN_CAPTURE_SCALE..=constants::MAX_CAPTURE_SCALE).contains(&self.scale) {
            return Err(CaptureError::InvalidSettings(format!(
                "capture scale {} is outside {}..={}",
                self.scale,
                constants::MIN_CAPTURE_SCALE,
                constants::MAX_CAPTURE_SCALE
            )));
        }
        Ok(())
    }

    fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            scale: self.scale,
            background: self.background,
        }
    }
}

/// Extracts the surface's vector markup verbatim as an SVG artifact.
pub fn export_vector<S>(surface: &S, file_stem: &str) -> Result<ExportArtifact, ExportError>
where
    S: RenderSurface + ?Sized,
{
    let markup = surface.vector_element().ok_or(ExportError::NotFound)?;
    Ok(ExportArtifact::new(
        file_stem,
        ContentKind::VectorImage,
        markup.as_bytes().to_vec(),
    ))
}

/// Captures the surface and places it on a single-page PDF.
pub async fn export_document<S>(
    surface: &S,
    file_stem: &str,
    settings: &ExportSettings,
) -> Result<ExportArtifact, CaptureError>
where
    S: RenderSurface + ?Sized,
{
    settings.validate()?;
    let pixmap = surface.rasterize(settings.capture_options()).await?;
    let placement = fit_to_page((pixmap.width(), pixmap.height()), settings.page);
    let bytes = compose_document(&pixmap, placement, settings.page)?;
    Ok(ExportArtifact::new(file_stem, ContentKind::Document, bytes))
}

/// Writes a one-page PDF containing the bitmap at the given placement.
pub fn compose_document(
    pixmap: &Pixmap,
    placement: Placement,
    page: PageGeometry,
) -> Result<Vec<u8>, CaptureError> {
    use printpdf::{Image, ImageTransform, Mm, PdfDocument};

    let (doc, page_idx, layer_idx) = PdfDocument::new(
        constants::DOCUMENT_TITLE,
        Mm(page.width_mm),
        Mm(page.height_mm),
        "Diagram",
    );
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    // The capture is painted over an opaque background, so dropping alpha is lossless
    let rgb: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue()]
        })
        .collect();
    let bitmap = image::RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb)
        .ok_or_else(|| CaptureError::Encode("bitmap buffer size mismatch".to_string()))?;
    let image = Image::from_dynamic_image(&image::DynamicImage::ImageRgb8(bitmap));

    // At EMBED_DPI one pixel spans MM_PER_INCH / EMBED_DPI millimetres
    let scale = placement.ratio * constants::EMBED_DPI / constants::MM_PER_INCH;
    // PDF coordinates grow upwards from the bottom-left corner
    let bottom = page.height_mm - placement.y - placement.height;
    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(placement.x)),
            translate_y: Some(Mm(bottom)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(constants::EMBED_DPI),
            ..Default::default()
        },
    );

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| CaptureError::Encode(e.to_string()))
}

/// Receives finished artifacts and offers them to the user.
pub trait DownloadSink: Send + Sync {
    /// Triggers the platform's save/download affordance for the artifact.
    ///
    /// Resolves once the artifact has been written or handed to the
    /// platform, or once the user has declined it.
    fn deliver(&self, artifact: ExportArtifact) -> BoxFuture<'_, Result<(), DeliveryError>>;
}

/// Result of one export request as seen by the application.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The artifact was handed to the download sink
    Delivered {
        /// Name of the delivered file
        file_name: String,
        /// What the file contains
        kind: ContentKind,
    },
    /// The user declined the save dialog
    Cancelled {
        /// Name of the file that was offered
        file_name: String,
    },
    /// Nothing was delivered
    Failed(String),
}

/// Which exporter a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Verbatim SVG markup
    Vector,
    /// Raster capture on a PDF page
    Document,
}

impl ExportKind {
    /// Content kind of the artifact this exporter produces.
    pub fn content_kind(&self) -> ContentKind {
        match self {
            ExportKind::Vector => ContentKind::VectorImage,
            ExportKind::Document => ContentKind::Document,
        }
    }
}

/// Runs the vector exporter and hands its artifact to the sink.
///
/// On `NotFound` nothing is handed to the sink.
pub async fn deliver_vector<S>(
    surface: &S,
    file_stem: &str,
    sink: &dyn DownloadSink,
) -> ExportOutcome
where
    S: RenderSurface + ?Sized,
{
    match export_vector(surface, file_stem) {
        Ok(artifact) => hand_off(artifact, sink).await,
        Err(e) => {
            log::warn!("Vector export of {} skipped: {}", file_stem, e);
            ExportOutcome::Failed(e.to_string())
        }
    }
}

/// Runs the document exporter and hands its artifact to the sink.
///
/// Capture and encoding errors are logged and reported as `Failed`; no
/// partial document is ever delivered.
pub async fn deliver_document<S>(
    surface: &S,
    file_stem: &str,
    settings: &ExportSettings,
    sink: &dyn DownloadSink,
) -> ExportOutcome
where
    S: RenderSurface + ?Sized,
{
    match export_document(surface, file_stem, settings).await {
        Ok(artifact) => hand_off(artifact, sink).await,
        Err(e) => {
            log::error!("Error exporting {}.pdf: {}", file_stem, e);
            ExportOutcome::Failed(e.to_string())
        }
    }
}

async fn hand_off(artifact: ExportArtifact, sink: &dyn DownloadSink) -> ExportOutcome {
    let file_name = artifact.file_name.clone();
    let kind = artifact.kind;
    let size = artifact.bytes.len();
    match sink.deliver(artifact).await {
        Ok(()) => {
            log::info!("Exported {} ({} bytes)", file_name, size);
            ExportOutcome::Delivered { file_name, kind }
        }
        Err(DeliveryError::Cancelled) => {
            log::info!("Export of {} cancelled", file_name);
            ExportOutcome::Cancelled { file_name }
        }
        Err(e) => {
            log::error!("Failed to deliver {}: {}", file_name, e);
            ExportOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagrams::{build_diagram, DiagramKind};
    use crate::surface::DiagramSurface;
    use futures::future;
    use std::sync::{Mutex, Once};

    /// Minimal surface exposing only the two capabilities the pipeline needs.
    struct StubSurface {
        size: (f32, f32),
        markup: Option<String>,
        capture: Result<(u32, u32), CaptureError>,
    }

    impl RenderSurface for StubSurface {
        fn size(&self) -> (f32, f32) {
            self.size
        }

        fn vector_element(&self) -> Option<&str> {
            self.markup.as_deref()
        }

        fn rasterize(
            &self,
            options: CaptureOptions,
        ) -> BoxFuture<'_, Result<Pixmap, CaptureError>> {
            let capture = self.capture.clone();
            Box::pin(async move {
                let (w, h) = capture?;
                let mut pixmap = Pixmap::new(w, h).ok_or(CaptureError::Allocation {
                    width: w,
                    height: h,
                })?;
                let bg = options.background;
                pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));
                Ok(pixmap)
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<ExportArtifact>>,
    }

    impl DownloadSink for RecordingSink {
        fn deliver(&self, artifact: ExportArtifact) -> BoxFuture<'_, Result<(), DeliveryError>> {
            self.delivered.lock().unwrap().push(artifact);
            Box::pin(future::ready(Ok(())))
        }
    }

    /// Answers every artifact with a fixed error.
    struct FailingSink(DeliveryError);

    impl DownloadSink for FailingSink {
        fn deliver(&self, _artifact: ExportArtifact) -> BoxFuture<'_, Result<(), DeliveryError>> {
            Box::pin(future::ready(Err(self.0.clone())))
        }
    }

    /// Collects every log record emitted by the process.
    struct CapturingLogger {
        records: Mutex<Vec<(log::Level, String)>>,
    }

    impl log::Log for CapturingLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger {
        records: Mutex::new(Vec::new()),
    };

    fn captured_logs() -> &'static CapturingLogger {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&LOGGER).expect("no other logger installed in tests");
            log::set_max_level(log::LevelFilter::Trace);
        });
        &LOGGER
    }

    fn node_signature(node: roxmltree::Node) -> Vec<String> {
        node.descendants()
            .filter(|n| n.is_element())
            .map(|n| {
                let mut attrs: Vec<_> = n
                    .attributes()
                    .map(|a| format!("{}={}", a.name(), a.value()))
                    .collect();
                attrs.sort();
                let text = n.text().map(str::trim).unwrap_or_default();
                format!("{}[{}]{}", n.tag_name().name(), attrs.join(","), text)
            })
            .collect()
    }

    fn number(object: &lopdf::Object) -> f32 {
        match object {
            lopdf::Object::Integer(i) => *i as f32,
            lopdf::Object::Real(r) => *r as f32,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    /// `a b c d e f` of `m` applied after `n`.
    fn concat(m: [f32; 6], n: [f32; 6]) -> [f32; 6] {
        [
            m[0] * n[0] + m[1] * n[2],
            m[0] * n[1] + m[1] * n[3],
            m[2] * n[0] + m[3] * n[2],
            m[2] * n[1] + m[3] * n[3],
            m[4] * n[0] + m[5] * n[2] + n[4],
            m[4] * n[1] + m[5] * n[3] + n[5],
        ]
    }

    /// Page size in points and the transform in effect when the image is drawn.
    fn page_and_image_transform(pdf: &[u8]) -> ((f32, f32), [f32; 6]) {
        const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

        let doc = lopdf::Document::load_mem(pdf).expect("pdf parses");
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1, "exactly one page");
        let page_id = *pages.values().next().unwrap();

        let media_box: Vec<f32> = doc
            .get_dictionary(page_id)
            .and_then(|page| page.get(b"MediaBox"))
            .and_then(lopdf::Object::as_array)
            .expect("media box")
            .iter()
            .map(number)
            .collect();
        let page_size = (media_box[2] - media_box[0], media_box[3] - media_box[1]);

        let content = doc.get_page_content(page_id).expect("page content");
        let content = lopdf::content::Content::decode(&content).expect("content decodes");
        let mut ctm = IDENTITY;
        let mut saved = Vec::new();
        let mut drawn = Vec::new();
        for op in &content.operations {
            match op.operator.as_str() {
                "q" => saved.push(ctm),
                "Q" => ctm = saved.pop().unwrap_or(IDENTITY),
                "cm" => {
                    let m: Vec<f32> = op.operands.iter().map(number).collect();
                    ctm = concat([m[0], m[1], m[2], m[3], m[4], m[5]], ctm);
                }
                "Do" => drawn.push(ctm),
                _ => {}
            }
        }
        assert_eq!(drawn.len(), 1, "exactly one image");
        (page_size, drawn[0])
    }

    fn mm_to_pt(mm: f32) -> f32 {
        mm * 72.0 / constants::MM_PER_INCH
    }

    fn assert_close(actual: f32, expected: f32, what: &str) {
        assert!(
            (actual - expected).abs() < 0.5,
            "{what}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn export_kinds_name_their_files() {
        assert_eq!(ExportKind::Vector.content_kind().extension(), "svg");
        assert_eq!(ExportKind::Document.content_kind().extension(), "pdf");
        assert_eq!(ExportKind::Document.content_kind().mime_type(), "application/pdf");
    }

    #[test]
    fn vector_export_matches_live_tree() {
        let surface = DiagramSurface::from_scene(&build_diagram(DiagramKind::Swimlane));
        let artifact = export_vector(&surface, "diagram").expect("vector export");

        let exported = String::from_utf8(artifact.bytes).expect("utf-8");
        let live = surface.vector_element().expect("vector element");
        let exported_doc = roxmltree::Document::parse(&exported).expect("exported parses");
        let live_doc = roxmltree::Document::parse(live).expect("live parses");
        assert_eq!(
            node_signature(exported_doc.root_element()),
            node_signature(live_doc.root_element())
        );
    }

    #[test]
    fn vector_export_of_swimlane_starts_with_svg_root() {
        let surface = DiagramSurface::from_scene(&build_diagram(DiagramKind::Swimlane));
        assert_eq!(surface.size(), (1400.0, 2200.0));
        let artifact = export_vector(&surface, "repair-ticket-workflow-swimlane-diagram")
            .expect("vector export");
        assert!(!artifact.bytes.is_empty());
        assert!(artifact.bytes.starts_with(b"<svg"));
        assert_eq!(artifact.kind, ContentKind::VectorImage);
        assert_eq!(artifact.file_name, "repair-ticket-workflow-swimlane-diagram.svg");
    }

    #[test]
    fn vector_export_is_repeatable() {
        let surface = DiagramSurface::from_scene(&build_diagram(DiagramKind::WorkflowStatus));
        let first = export_vector(&surface, "a").unwrap();
        let second = export_vector(&surface, "a").unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_vector_element_delivers_nothing() {
        let surface = StubSurface {
            size: (10.0, 10.0),
            markup: None,
            capture: Ok((10, 10)),
        };
        assert_eq!(export_vector(&surface, "x"), Err(ExportError::NotFound));

        let sink = RecordingSink::default();
        let outcome = deliver_vector(&surface, "x", &sink).await;
        assert!(matches!(outcome, ExportOutcome::Failed(_)));
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn vector_delivery_hands_off_artifact() {
        let surface = StubSurface {
            size: (10.0, 10.0),
            markup: Some("<svg xmlns=\"http://www.w3.org/2000/svg\"/>".into()),
            capture: Ok((10, 10)),
        };
        let sink = RecordingSink::default();
        let outcome = deliver_vector(&surface, "stub", &sink).await;
        assert_eq!(
            outcome,
            ExportOutcome::Delivered {
                file_name: "stub.svg".into(),
                kind: ContentKind::VectorImage,
            }
        );
        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].kind.mime_type(), "image/svg+xml");
    }

    #[tokio::test]
    async fn refused_download_is_reported() {
        let surface = StubSurface {
            size: (10.0, 10.0),
            markup: Some("<svg/>".into()),
            capture: Ok((10, 10)),
        };
        let sink = FailingSink(DeliveryError::Unavailable("download blocked".into()));
        let outcome = deliver_vector(&surface, "stub", &sink).await;
        assert_eq!(
            outcome,
            ExportOutcome::Failed("Download failed: download blocked".into())
        );
    }

    #[tokio::test]
    async fn failed_write_is_not_reported_as_delivered() {
        let surface = StubSurface {
            size: (10.0, 10.0),
            markup: None,
            capture: Ok((40, 30)),
        };
        let sink = FailingSink(DeliveryError::Write {
            path: "/read-only/stub.pdf".into(),
            reason: "permission denied".into(),
        });
        let outcome = deliver_document(&surface, "stub", &ExportSettings::default(), &sink).await;
        assert_eq!(
            outcome,
            ExportOutcome::Failed(
                "Failed to save /read-only/stub.pdf: permission denied".into()
            )
        );
    }

    #[tokio::test]
    async fn cancelled_save_is_reported_as_cancelled() {
        let surface = StubSurface {
            size: (10.0, 10.0),
            markup: Some("<svg/>".into()),
            capture: Ok((10, 10)),
        };
        let outcome = deliver_vector(&surface, "stub", &FailingSink(DeliveryError::Cancelled)).await;
        assert_eq!(
            outcome,
            ExportOutcome::Cancelled {
                file_name: "stub.svg".into()
            }
        );
    }

    #[test]
    fn fit_uses_binding_dimension_for_tall_capture() {
        let placement = fit_to_page((2800, 4400), PageGeometry::default());
        assert!((placement.ratio - 210.0 / 4400.0).abs() < 1e-6);
        assert!((placement.ratio - 0.0477).abs() < 1e-4);
        assert!((placement.width - 133.636).abs() < 0.01);
        assert!((placement.height - 210.0).abs() < 1e-3);
        assert_eq!((placement.x, placement.y), (0.0, 0.0));
    }

    #[test]
    fn fit_stays_on_page_and_keeps_aspect() {
        let pages = [(297.0, 210.0), (210.0, 297.0), (100.0, 100.0), (5.0, 900.0)];
        let images = [(1u32, 1u32), (2800, 4400), (4400, 2800), (300, 7), (1, 5000), (640, 480)];
        for (pw, ph) in pages {
            let page = PageGeometry {
                width_mm: pw,
                height_mm: ph,
            };
            for (iw, ih) in images {
                let p = fit_to_page((iw, ih), page);
                let tol = 1e-3 * pw.max(ph);
                assert!(p.width <= pw + tol && p.height <= ph + tol);
                assert!(
                    (p.width - pw).abs() < tol || (p.height - ph).abs() < tol,
                    "no tight edge for {iw}x{ih} on {pw}x{ph}"
                );
                let expected = iw as f32 / ih as f32;
                assert!(((p.width / p.height) - expected).abs() / expected < 1e-4);
            }
        }
    }

    #[test]
    fn tall_bitmap_fills_page_height_from_top_left() {
        let page = PageGeometry::default();
        let pixmap = Pixmap::new(200, 400).unwrap();
        let placement = fit_to_page((200, 400), page);
        let pdf = compose_document(&pixmap, placement, page).expect("compose");

        let ((page_w, page_h), [a, b, c, d, e, f]) = page_and_image_transform(&pdf);
        assert_close(page_w, 841.89, "page width");
        assert_close(page_h, 595.28, "page height");
        // 0.525 mm per pixel: 105 x 210 mm
        assert_close(a, mm_to_pt(105.0), "image width");
        assert_close(d, mm_to_pt(210.0), "image height");
        assert_close(b, 0.0, "no rotation");
        assert_close(c, 0.0, "no rotation");
        assert_close(e, 0.0, "left edge");
        assert_close(f, 0.0, "bottom edge");
    }

    #[test]
    fn wide_bitmap_fills_page_width_and_hangs_from_top() {
        let page = PageGeometry::default();
        let pixmap = Pixmap::new(600, 100).unwrap();
        let placement = fit_to_page((600, 100), page);
        let pdf = compose_document(&pixmap, placement, page).expect("compose");

        let ((page_w, page_h), [a, _, _, d, e, f]) = page_and_image_transform(&pdf);
        assert_close(page_w, 841.89, "page width");
        assert_close(page_h, 595.28, "page height");
        // 0.495 mm per pixel: 297 x 49.5 mm, top edge on the top of the page
        assert_close(a, mm_to_pt(297.0), "image width");
        assert_close(d, mm_to_pt(49.5), "image height");
        assert_close(e, 0.0, "left edge");
        assert_close(f, mm_to_pt(210.0 - 49.5), "bottom edge");
        assert_close(f + d, page_h, "top edge");
    }

    #[tokio::test]
    async fn document_export_produces_pdf() {
        let surface = StubSurface {
            size: (40.0, 30.0),
            markup: None,
            capture: Ok((80, 60)),
        };
        let artifact = export_document(&surface, "stub", &ExportSettings::default())
            .await
            .expect("document export");
        assert_eq!(artifact.kind, ContentKind::Document);
        assert_eq!(artifact.file_name, "stub.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn zero_sized_page_is_rejected() {
        let surface = StubSurface {
            size: (40.0, 30.0),
            markup: None,
            capture: Ok((80, 60)),
        };
        let settings = ExportSettings {
            page: PageGeometry {
                width_mm: 0.0,
                height_mm: 210.0,
            },
            ..ExportSettings::default()
        };
        let err = export_document(&surface, "stub", &settings).await.unwrap_err();
        assert!(matches!(err, CaptureError::InvalidSettings(_)));

        let sink = RecordingSink::default();
        let outcome = deliver_document(&surface, "stub", &settings, &sink).await;
        assert!(matches!(outcome, ExportOutcome::Failed(_)));
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[test]
    fn out_of_range_scale_is_rejected() {
        for scale in [0.0, -2.0, f32::NAN, 100.0] {
            let settings = ExportSettings {
                scale,
                ..ExportSettings::default()
            };
            assert!(settings.validate().is_err(), "scale {scale} accepted");
        }
        assert_eq!(ExportSettings::default().validate(), Ok(()));
    }

    #[tokio::test]
    async fn document_export_of_real_surface() {
        let surface = DiagramSurface::from_scene(&build_diagram(DiagramKind::WorkflowStatus));
        let sink = RecordingSink::default();
        let outcome = deliver_document(
            &surface,
            "workflow-status-diagram",
            &ExportSettings::default(),
            &sink,
        )
        .await;
        assert_eq!(
            outcome,
            ExportOutcome::Delivered {
                file_name: "workflow-status-diagram.pdf".into(),
                kind: ContentKind::Document,
            }
        );
        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].kind.mime_type(), "application/pdf");
    }

    #[tokio::test]
    async fn failed_capture_delivers_nothing() {
        let surface = StubSurface {
            size: (10.0, 10.0),
            markup: Some("<svg/>".into()),
            capture: Err(CaptureError::Detached),
        };
        let sink = RecordingSink::default();
        let outcome = deliver_document(&surface, "stub", &ExportSettings::default(), &sink).await;
        assert_eq!(outcome, ExportOutcome::Failed("Render surface is detached".into()));
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn detached_diagram_surface_logs_one_error_and_delivers_nothing() {
        let logs = captured_logs();
        let stem = "detached-surface-log-check";
        let surface = DiagramSurface::detached(1400.0, 2200.0);
        let sink = RecordingSink::default();

        let outcome = deliver_document(&surface, stem, &ExportSettings::default(), &sink).await;

        assert!(matches!(outcome, ExportOutcome::Failed(_)));
        assert!(sink.delivered.lock().unwrap().is_empty());
        let records: Vec<_> = logs
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, message)| message.contains(stem))
            .cloned()
            .collect();
        assert_eq!(records.len(), 1, "records: {records:?}");
        assert_eq!(records[0].0, log::Level::Error);
        assert!(records[0].1.contains("Render surface is detached"));
    }
}
