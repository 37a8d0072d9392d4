//! Canvas rendering of diagram scenes with the egui painter.
//!
//! Shapes are drawn in scene order, so later records appear on top. Diagram
//! units are mapped to screen points with a uniform zoom around the card's
//! top-left corner.

use crate::constants;
use crate::types::*;
use eframe::egui;
use eframe::epaint::{QuadraticBezierShape, StrokeKind, TextShape};

/// Paints a scene into a screen-space rectangle.
pub struct ScenePainter<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    zoom: f32,
    /// Opacity of blinking shapes for the current frame
    blink_alpha: f32,
}

impl<'a> ScenePainter<'a> {
    /// Creates a painter mapping diagram (0, 0) to `origin`.
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2, zoom: f32, time: f64) -> Self {
        Self {
            painter,
            origin,
            zoom,
            blink_alpha: blink_alpha(time),
        }
    }

    /// Draws every shape of the scene.
    pub fn paint(&self, scene: &Scene) {
        for shape in &scene.shapes {
            self.paint_shape(shape, (0.0, 0.0));
        }
    }

    fn to_screen(&self, p: Vec2, offset: Vec2) -> egui::Pos2 {
        egui::pos2(
            self.origin.x + (p.0 + offset.0) * self.zoom,
            self.origin.y + (p.1 + offset.1) * self.zoom,
        )
    }

    fn stroke(&self, stroke: Option<&StrokeStyle>) -> egui::Stroke {
        match stroke {
            Some(s) => egui::Stroke::new(s.width * self.zoom, color32(s.color)),
            None => egui::Stroke::NONE,
        }
    }

    fn paint_shape(&self, shape: &Shape, offset: Vec2) {
        match shape {
            Shape::Rect {
                origin,
                size,
                corner_radius,
                fill,
                stroke,
            } => {
                let min = self.to_screen(*origin, offset);
                let rect = egui::Rect::from_min_size(
                    min,
                    egui::vec2(size.0 * self.zoom, size.1 * self.zoom),
                );
                self.painter.rect(
                    rect,
                    corner_radius * self.zoom,
                    fill.map(color32).unwrap_or(egui::Color32::TRANSPARENT),
                    self.stroke(stroke.as_ref()),
                    StrokeKind::Middle,
                );
            }
            Shape::Circle {
                center,
                radius,
                fill,
                stroke,
                blink,
            } => {
                let alpha = if *blink { self.blink_alpha } else { 1.0 };
                let fill = fill
                    .map(|c| color32(c).gamma_multiply(alpha))
                    .unwrap_or(egui::Color32::TRANSPARENT);
                self.painter.circle(
                    self.to_screen(*center, offset),
                    radius * self.zoom,
                    fill,
                    self.stroke(stroke.as_ref()),
                );
            }
            Shape::Ellipse {
                center,
                radii,
                fill,
                stroke,
            } => {
                const SEGMENTS: usize = 64;
                let c = self.to_screen(*center, offset);
                let points = (0..SEGMENTS)
                    .map(|i| {
                        let t = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
                        egui::pos2(
                            c.x + radii.0 * self.zoom * t.cos(),
                            c.y + radii.1 * self.zoom * t.sin(),
                        )
                    })
                    .collect();
                self.painter.add(egui::Shape::convex_polygon(
                    points,
                    fill.map(color32).unwrap_or(egui::Color32::TRANSPARENT),
                    self.stroke(stroke.as_ref()),
                ));
            }
            Shape::Line {
                from,
                to,
                stroke,
                marker_end,
            } => {
                let a = self.to_screen(*from, offset);
                let b = self.to_screen(*to, offset);
                let egui_stroke = self.stroke(Some(stroke));
                match stroke.dash {
                    Some((dash, gap)) => {
                        self.painter.extend(egui::Shape::dashed_line(
                            &[a, b],
                            egui_stroke,
                            dash * self.zoom,
                            gap * self.zoom,
                        ));
                    }
                    None => {
                        self.painter.line_segment([a, b], egui_stroke);
                    }
                }
                if let Some(marker) = marker_end {
                    self.paint_arrowhead(a, b, stroke.width, *marker);
                }
            }
            Shape::Polygon {
                points,
                fill,
                stroke,
            } => {
                let pts = points.iter().map(|p| self.to_screen(*p, offset)).collect();
                self.painter.add(egui::Shape::convex_polygon(
                    pts,
                    fill.map(color32).unwrap_or(egui::Color32::TRANSPARENT),
                    self.stroke(stroke.as_ref()),
                ));
            }
            Shape::Path {
                start,
                segments,
                stroke,
            } => {
                let egui_stroke = self.stroke(Some(stroke));
                let mut cursor = self.to_screen(*start, offset);
                for seg in segments {
                    match seg {
                        PathSegment::LineTo(p) => {
                            let next = self.to_screen(*p, offset);
                            self.painter.line_segment([cursor, next], egui_stroke);
                            cursor = next;
                        }
                        PathSegment::QuadTo { control, to } => {
                            let next = self.to_screen(*to, offset);
                            self.painter.add(QuadraticBezierShape::from_points_stroke(
                                [cursor, self.to_screen(*control, offset), next],
                                false,
                                egui::Color32::TRANSPARENT,
                                egui_stroke,
                            ));
                            cursor = next;
                        }
                    }
                }
            }
            Shape::Text {
                position,
                content,
                style,
                rotation,
            } => {
                self.paint_text(self.to_screen(*position, offset), content, style, *rotation);
            }
            Shape::Group {
                offset: group_offset,
                children,
            } => {
                let nested = (offset.0 + group_offset.0, offset.1 + group_offset.1);
                for child in children {
                    self.paint_shape(child, nested);
                }
            }
        }
    }

    /// Filled triangle whose tip sits on `tip`, pointing away from `from`.
    fn paint_arrowhead(&self, from: egui::Pos2, tip: egui::Pos2, stroke_width: f32, marker: Marker) {
        if from == tip {
            return;
        }
        let dir = (tip - from).normalized();
        let perp = egui::vec2(-dir.y, dir.x);
        // Marker geometry scales with the stroke width, as in the SVG output
        let len = constants::ARROW_LENGTH * stroke_width * self.zoom;
        let half = constants::ARROW_HALF_WIDTH * stroke_width * self.zoom;
        let base = tip - dir * len;
        self.painter.add(egui::Shape::convex_polygon(
            vec![tip, base + perp * half, base - perp * half],
            color32(marker.color()),
            egui::Stroke::NONE,
        ));
    }

    /// Lays out a label so its baseline anchor lands on `anchor`.
    fn paint_text(&self, anchor: egui::Pos2, content: &str, style: &TextStyle, rotation: f32) {
        let size = style.size * self.zoom;
        let mut job = egui::text::LayoutJob::default();
        job.append(
            content,
            0.0,
            egui::TextFormat {
                font_id: egui::FontId::proportional(size),
                color: color32(style.color),
                italics: style.italic,
                ..Default::default()
            },
        );
        let galley = self.painter.layout_job(job);

        let width = galley.size().x;
        let local_x = match style.anchor {
            TextAnchor::Start => 0.0,
            TextAnchor::Middle => width / 2.0,
            TextAnchor::End => width,
        };
        // Approximate ascent; egui places galleys by their top-left corner
        let local = egui::vec2(local_x, size * 0.8);

        let angle = rotation.to_radians();
        let (sin, cos) = angle.sin_cos();
        let rotated = egui::vec2(local.x * cos - local.y * sin, local.x * sin + local.y * cos);
        let pos = anchor - rotated;

        let mut text = TextShape::new(pos, galley.clone(), color32(style.color));
        if angle != 0.0 {
            text = text.with_angle(angle);
        }
        self.painter.add(text);

        if matches!(style.weight, FontWeight::SemiBold | FontWeight::Bold) {
            // egui has no bold face; a half-point offset copy thickens the strokes
            let nudge = egui::vec2(0.5 * cos, 0.5 * sin);
            let mut bold = TextShape::new(pos + nudge, galley, color32(style.color));
            if angle != 0.0 {
                bold = bold.with_angle(angle);
            }
            self.painter.add(bold);
        }
    }
}

/// Opacity of a blinking shape: fades 1 → 0 → 1 once per period.
pub fn blink_alpha(time: f64) -> f32 {
    let phase = (time / constants::BLINK_PERIOD_SECS).rem_euclid(1.0);
    (1.0 - 2.0 * phase).abs() as f32
}

fn color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}
