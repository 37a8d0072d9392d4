//! Render surfaces: the read-only visual regions the exporters read from.
//!
//! The export pipeline consumes exactly two capabilities of a surface: locating
//! its vector sub-element and capturing it as a bitmap. [`DiagramSurface`] is
//! the implementation backed by a scene; tests supply their own.

use crate::constants;
use crate::error::CaptureError;
use crate::svg::scene_to_svg;
use crate::types::{Color, Scene};
use futures::future::BoxFuture;
use std::sync::{Arc, OnceLock};
use tiny_skia::Pixmap;

/// How a surface should be captured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Supersampling factor applied to the intrinsic size
    pub scale: f32,
    /// Opaque fill painted beneath the surface
    pub background: Color,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: constants::CAPTURE_SCALE,
            background: Color::WHITE,
        }
    }
}

/// A rendered, read-only visual region.
pub trait RenderSurface: Send + Sync {
    /// Intrinsic width and height in device-independent units.
    fn size(&self) -> (f32, f32);

    /// Serialized markup of the vector sub-element, if the surface has one.
    fn vector_element(&self) -> Option<&str>;

    /// Captures the surface as a bitmap. Completes asynchronously.
    fn rasterize(&self, options: CaptureOptions) -> BoxFuture<'_, Result<Pixmap, CaptureError>>;
}

/// A surface showing one diagram scene.
///
/// The SVG markup is produced once at construction and never changes, so
/// every export of the same surface reads the same vector tree.
#[derive(Debug, Clone)]
pub struct DiagramSurface {
    width: f32,
    height: f32,
    markup: Option<Arc<str>>,
}

impl DiagramSurface {
    /// Renders a scene into a new surface.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            width: scene.width,
            height: scene.height,
            markup: Some(scene_to_svg(scene).into()),
        }
    }

    /// A surface of the given size with nothing rendered into it.
    pub fn detached(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            markup: None,
        }
    }

    /// Whether the surface currently holds rendered content.
    pub fn is_attached(&self) -> bool {
        self.markup.is_some()
    }
}

impl RenderSurface for DiagramSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn vector_element(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    fn rasterize(&self, options: CaptureOptions) -> BoxFuture<'_, Result<Pixmap, CaptureError>> {
        let markup = self.markup.clone();
        let (width, height) = (self.width, self.height);
        Box::pin(async move {
            let markup = markup.ok_or(CaptureError::Detached)?;
            if !(width > 0.0 && height > 0.0) {
                return Err(CaptureError::EmptySurface { width, height });
            }

            #[cfg(not(target_arch = "wasm32"))]
            let pixmap = tokio::task::spawn_blocking(move || rasterize_markup(&markup, options))
                .await
                .map_err(|e| CaptureError::Task(e.to_string()))??;

            #[cfg(target_arch = "wasm32")]
            let pixmap = rasterize_markup(&markup, options)?;

            Ok(pixmap)
        })
    }
}

/// Fonts available to the rasterizer.
struct Fonts {
    db: Arc<fontdb::Database>,
    /// Family used for text without an explicit `font-family`
    family: Option<String>,
}

/// Shared font database, built once on first use.
///
/// The proportional fonts bundled with egui are loaded on every target and
/// become the default family, so captures carry their labels in the browser
/// as well. Native builds add the system fonts on top.
fn fonts() -> &'static Fonts {
    static FONTS: OnceLock<Fonts> = OnceLock::new();
    FONTS.get_or_init(|| {
        let mut db = fontdb::Database::new();
        let family = load_bundled_fonts(&mut db);
        #[cfg(not(target_arch = "wasm32"))]
        db.load_system_fonts();

        match &family {
            Some(name) => {
                db.set_sans_serif_family(name.as_str());
                db.set_serif_family(name.as_str());
            }
            None => log::warn!("No bundled font could be loaded; labels may be missing"),
        }
        log::debug!("Loaded {} font faces for rasterization", db.len());
        Fonts {
            db: Arc::new(db),
            family,
        }
    })
}

/// Loads egui's proportional fonts and returns the family name of the first.
fn load_bundled_fonts(db: &mut fontdb::Database) -> Option<String> {
    let definitions = egui::FontDefinitions::default();
    let names = definitions.families.get(&egui::FontFamily::Proportional)?;
    let mut primary = None;
    for name in names {
        let Some(data) = definitions.font_data.get(name) else {
            continue;
        };
        let ids = db.load_font_source(fontdb::Source::Binary(Arc::new(data.font.to_vec())));
        if primary.is_none() {
            primary = ids
                .first()
                .and_then(|id| db.face(*id))
                .and_then(|face| face.families.first())
                .map(|(family, _)| family.clone());
        }
    }
    primary
}

/// Rasterizes SVG markup onto an opaque background.
pub fn rasterize_markup(markup: &str, options: CaptureOptions) -> Result<Pixmap, CaptureError> {
    let fonts = fonts();
    let mut opt = usvg::Options::default();
    opt.fontdb = Arc::clone(&fonts.db);
    if let Some(family) = &fonts.family {
        opt.font_family = family.clone();
    }

    let tree = usvg::Tree::from_data(markup.as_bytes(), &opt)
        .map_err(|e| CaptureError::Parse(e.to_string()))?;

    let scale = options
        .scale
        .clamp(constants::MIN_CAPTURE_SCALE, constants::MAX_CAPTURE_SCALE);
    let size = tree.size();
    let out_w = (size.width() * scale).round().max(1.0) as u32;
    let out_h = (size.height() * scale).round().max(1.0) as u32;

    let mut pixmap = Pixmap::new(out_w, out_h).ok_or(CaptureError::Allocation {
        width: out_w,
        height: out_h,
    })?;

    let bg = options.background;
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));

    let transform = tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    log::debug!("Rasterized surface to {}x{} pixels", out_w, out_h);
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Shape, StrokeStyle};

    fn small_scene() -> Scene {
        let mut scene = Scene::new(40.0, 30.0);
        scene.push(Shape::Rect {
            origin: (10.0, 10.0),
            size: (20.0, 10.0),
            corner_radius: 0.0,
            fill: Some(Color::from_hex(0xff0000)),
            stroke: Some(StrokeStyle::solid(Color::BLACK, 1.0)),
        });
        scene
    }

    #[test]
    fn capture_is_supersampled_with_white_background() {
        let pixmap = rasterize_markup(&scene_to_svg(&small_scene()), CaptureOptions::default())
            .expect("rasterize");
        assert_eq!((pixmap.width(), pixmap.height()), (80, 60));

        // Top-left corner is outside every shape and must be opaque white
        let corner = pixmap.pixel(0, 0).expect("pixel");
        assert_eq!(
            (corner.red(), corner.green(), corner.blue(), corner.alpha()),
            (255, 255, 255, 255)
        );

        // Center of the rectangle is red
        let inside = pixmap.pixel(40, 30).expect("pixel");
        assert_eq!((inside.red(), inside.green(), inside.blue()), (255, 0, 0));
    }

    #[test]
    fn invalid_markup_is_a_parse_error() {
        let err = rasterize_markup("<not-svg", CaptureOptions::default()).unwrap_err();
        assert!(matches!(err, CaptureError::Parse(_)));
    }

    #[test]
    fn bundled_font_is_the_default_family() {
        let fonts = fonts();
        let family = fonts.family.as_deref().expect("bundled font family");
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(family)],
            ..Default::default()
        };
        assert!(fonts.db.query(&query).is_some());
    }

    #[test]
    fn labels_without_font_family_are_rendered() {
        let markup = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="40" viewBox="0 0 120 40"><text x="4" y="30" font-size="28" fill="#000000">Open</text></svg>"##;
        let pixmap = rasterize_markup(markup, CaptureOptions::default()).expect("rasterize");
        let inked = pixmap
            .pixels()
            .iter()
            .filter(|p| p.red() < 128 && p.green() < 128 && p.blue() < 128)
            .count();
        assert!(inked > 50, "only {inked} dark pixels");
    }

    #[tokio::test]
    async fn detached_surface_cannot_be_captured() {
        let surface = DiagramSurface::detached(100.0, 100.0);
        assert!(!surface.is_attached());
        assert!(surface.vector_element().is_none());
        let err = surface.rasterize(CaptureOptions::default()).await.unwrap_err();
        assert_eq!(err, CaptureError::Detached);
    }

    #[tokio::test]
    async fn scene_surface_rasterizes_on_blocking_pool() {
        let surface = DiagramSurface::from_scene(&small_scene());
        let pixmap = surface
            .rasterize(CaptureOptions::default())
            .await
            .expect("capture");
        assert_eq!(pixmap.width(), 80);
    }
}
