//! Scene graph types describing a static diagram.
//!
//! A [`Scene`] is a read-only list of shape records with fixed positions,
//! sizes, colors and labels. Scenes are built once from the data tables in
//! [`crate::diagrams`] and are then painted on screen, serialized to SVG and
//! rasterized for document export. Nothing in this module is computed from
//! user input.

/// A point or extent in diagram units as (x, y).
pub type Vec2 = (f32, f32);

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Pure white, used as the capture background.
    pub const WHITE: Color = Color::from_hex(0xffffff);
    /// Pure black.
    pub const BLACK: Color = Color::from_hex(0x000000);

    /// Creates a color from its three channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Formats the color as a lowercase `#rrggbb` string.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Arrowhead markers that can terminate a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Dark solid arrowhead used on regular flow lines
    Arrow,
    /// Red arrowhead used on dashed exception paths
    DashedArrow,
    /// Light slate arrowhead used between status cards
    Subtle,
}

impl Marker {
    /// All markers, in the order their definitions are emitted.
    pub const ALL: [Marker; 3] = [Marker::Arrow, Marker::DashedArrow, Marker::Subtle];

    /// Element id of the marker definition.
    pub fn id(&self) -> &'static str {
        match self {
            Marker::Arrow => "arrowhead",
            Marker::DashedArrow => "arrowhead-dashed",
            Marker::Subtle => "arrowhead-subtle",
        }
    }

    /// Fill color of the arrowhead.
    pub fn color(&self) -> Color {
        match self {
            Marker::Arrow => Color::from_hex(0x374151),
            Marker::DashedArrow => Color::from_hex(0xef4444),
            Marker::Subtle => Color::from_hex(0x94a3b8),
        }
    }
}

/// Outline styling for shapes and lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color
    pub color: Color,
    /// Stroke width in diagram units
    pub width: f32,
    /// Optional dash pattern as (dash length, gap length)
    pub dash: Option<(f32, f32)>,
}

impl StrokeStyle {
    /// A solid stroke.
    pub const fn solid(color: Color, width: f32) -> Self {
        Self { color, width, dash: None }
    }

    /// A dashed stroke with equal dash and gap lengths.
    pub const fn dashed(color: Color, width: f32, dash: f32) -> Self {
        Self {
            color,
            width,
            dash: Some((dash, dash)),
        }
    }
}

/// Font weight of a text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    /// Regular text (400)
    Normal,
    /// Medium text (500)
    Medium,
    /// Semi-bold text (600)
    SemiBold,
    /// Bold text (700)
    Bold,
}

impl FontWeight {
    /// Value written to the `font-weight` attribute, if any.
    pub fn svg_value(&self) -> Option<&'static str> {
        match self {
            FontWeight::Normal => None,
            FontWeight::Medium => Some("500"),
            FontWeight::SemiBold => Some("600"),
            FontWeight::Bold => Some("bold"),
        }
    }
}

/// Horizontal alignment of a text label relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the position
    Start,
    /// Text is centered on the position
    Middle,
    /// Text ends at the position
    End,
}

/// Styling of a text label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in diagram units
    pub size: f32,
    /// Fill color of the glyphs
    pub color: Color,
    /// Font weight
    pub weight: FontWeight,
    /// Whether the text is italic
    pub italic: bool,
    /// Horizontal alignment
    pub anchor: TextAnchor,
}

impl TextStyle {
    /// A centered, normal-weight style.
    pub const fn centered(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            weight: FontWeight::Normal,
            italic: false,
            anchor: TextAnchor::Middle,
        }
    }

    /// Returns this style with the given weight.
    pub const fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Returns this style in italics.
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Returns this style with the given anchor.
    pub const fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// One segment of a [`Shape::Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Straight line to a point
    LineTo(Vec2),
    /// Quadratic Bézier curve through a control point to an end point
    QuadTo {
        /// Control point
        control: Vec2,
        /// End point
        to: Vec2,
    },
}

/// A single drawable record of a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned, optionally rounded rectangle
    Rect {
        /// Top-left corner
        origin: Vec2,
        /// Width and height
        size: Vec2,
        /// Corner radius (0 for square corners)
        corner_radius: f32,
        /// Interior fill
        fill: Option<Color>,
        /// Outline
        stroke: Option<StrokeStyle>,
    },
    /// Circle, optionally blinking on screen
    Circle {
        /// Center point
        center: Vec2,
        /// Radius
        radius: f32,
        /// Interior fill
        fill: Option<Color>,
        /// Outline
        stroke: Option<StrokeStyle>,
        /// Whether the circle fades in and out to signal an ongoing wait
        blink: bool,
    },
    /// Axis-aligned ellipse
    Ellipse {
        /// Center point
        center: Vec2,
        /// Horizontal and vertical radii
        radii: Vec2,
        /// Interior fill
        fill: Option<Color>,
        /// Outline
        stroke: Option<StrokeStyle>,
    },
    /// Straight line, optionally ending in an arrowhead
    Line {
        /// Start point
        from: Vec2,
        /// End point
        to: Vec2,
        /// Line style
        stroke: StrokeStyle,
        /// Arrowhead drawn at `to`
        marker_end: Option<Marker>,
    },
    /// Closed polygon
    Polygon {
        /// Vertices in drawing order
        points: Vec<Vec2>,
        /// Interior fill
        fill: Option<Color>,
        /// Outline
        stroke: Option<StrokeStyle>,
    },
    /// Open path made of straight and curved segments (never filled)
    Path {
        /// First point of the path
        start: Vec2,
        /// Segments following `start`
        segments: Vec<PathSegment>,
        /// Path style
        stroke: StrokeStyle,
    },
    /// Text label
    Text {
        /// Anchor position (baseline)
        position: Vec2,
        /// Label content
        content: String,
        /// Font styling
        style: TextStyle,
        /// Clockwise rotation around `position`, in degrees
        rotation: f32,
    },
    /// Children drawn with a translation applied
    Group {
        /// Translation applied to all children
        offset: Vec2,
        /// Child shapes
        children: Vec<Shape>,
    },
}

impl Shape {
    /// Visits this shape and every nested child in drawing order.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Shape)) {
        f(self);
        if let Shape::Group { children, .. } = self {
            for child in children {
                child.visit(f);
            }
        }
    }
}

/// A complete static diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Intrinsic width in diagram units
    pub width: f32,
    /// Intrinsic height in diagram units
    pub height: f32,
    /// Shapes in back-to-front drawing order
    pub shapes: Vec<Shape>,
}

impl Scene {
    /// Creates an empty scene of the given size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    /// Appends a shape on top of everything drawn so far.
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Markers referenced by any line in the scene, in definition order.
    pub fn markers_used(&self) -> Vec<Marker> {
        let mut used = Vec::new();
        for shape in &self.shapes {
            shape.visit(&mut |s| {
                if let Shape::Line {
                    marker_end: Some(m),
                    ..
                } = s
                {
                    if !used.contains(m) {
                        used.push(*m);
                    }
                }
            });
        }
        Marker::ALL.into_iter().filter(|m| used.contains(m)).collect()
    }

    /// All text labels in the scene, in drawing order.
    #[cfg(test)]
    pub fn labels(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for shape in &self.shapes {
            shape.visit(&mut |s| {
                if let Shape::Text { content, .. } = s {
                    out.push(content.as_str());
                }
            });
        }
        out
    }
}
