//! SVG serialization of a [`Scene`].
//!
//! The markup produced here is the vector representation of a diagram: it is
//! what the vector exporter hands out verbatim and what the rasterizer reads
//! for the document export.

use crate::types::*;
use std::fmt::Write as _;

/// Serializes a scene to a standalone SVG document.
pub fn scene_to_svg(scene: &Scene) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = scene.width,
        h = scene.height
    );

    let markers = scene.markers_used();
    if !markers.is_empty() {
        let _ = writeln!(out, "<defs>");
        for marker in markers {
            let _ = writeln!(
                out,
                "  <marker id=\"{}\" markerWidth=\"10\" markerHeight=\"10\" refX=\"9\" refY=\"3\" orient=\"auto\">",
                marker.id()
            );
            let _ = writeln!(
                out,
                "    <polygon points=\"0 0, 10 3, 0 6\" fill=\"{}\" />",
                marker.color().to_hex()
            );
            let _ = writeln!(out, "  </marker>");
        }
        let _ = writeln!(out, "</defs>");
    }

    for shape in &scene.shapes {
        write_shape(&mut out, shape, 0);
    }

    let _ = writeln!(out, "</svg>");
    out
}

fn write_shape(out: &mut String, shape: &Shape, depth: usize) {
    let indent = "  ".repeat(depth);
    match shape {
        Shape::Rect {
            origin,
            size,
            corner_radius,
            fill,
            stroke,
        } => {
            let _ = write!(
                out,
                "{indent}<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
                origin.0, origin.1, size.0, size.1
            );
            if *corner_radius > 0.0 {
                let _ = write!(out, " rx=\"{r}\" ry=\"{r}\"", r = corner_radius);
            }
            let _ = writeln!(out, "{} />", paint_attrs(*fill, stroke.as_ref()));
        }
        Shape::Circle {
            center,
            radius,
            fill,
            stroke,
            blink,
        } => {
            let _ = write!(
                out,
                "{indent}<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{}",
                center.0,
                center.1,
                radius,
                paint_attrs(*fill, stroke.as_ref())
            );
            if *blink {
                let _ = writeln!(out, ">");
                let _ = writeln!(
                    out,
                    "{indent}  <animate attributeName=\"opacity\" values=\"1;0;1\" dur=\"1s\" repeatCount=\"indefinite\" />"
                );
                let _ = writeln!(out, "{indent}</circle>");
            } else {
                let _ = writeln!(out, " />");
            }
        }
        Shape::Ellipse {
            center,
            radii,
            fill,
            stroke,
        } => {
            let _ = writeln!(
                out,
                "{indent}<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\"{} />",
                center.0,
                center.1,
                radii.0,
                radii.1,
                paint_attrs(*fill, stroke.as_ref())
            );
        }
        Shape::Line {
            from,
            to,
            stroke,
            marker_end,
        } => {
            let _ = write!(
                out,
                "{indent}<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{}",
                from.0,
                from.1,
                to.0,
                to.1,
                stroke_attrs(stroke)
            );
            if let Some(marker) = marker_end {
                let _ = write!(out, " marker-end=\"url(#{})\"", marker.id());
            }
            let _ = writeln!(out, " />");
        }
        Shape::Polygon {
            points,
            fill,
            stroke,
        } => {
            let pts = points
                .iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(
                out,
                "{indent}<polygon points=\"{}\"{} />",
                pts,
                paint_attrs(*fill, stroke.as_ref())
            );
        }
        Shape::Path {
            start,
            segments,
            stroke,
        } => {
            let mut d = format!("M {} {}", start.0, start.1);
            for seg in segments {
                match seg {
                    PathSegment::LineTo((x, y)) => {
                        let _ = write!(d, " L {x} {y}");
                    }
                    PathSegment::QuadTo { control, to } => {
                        let _ = write!(d, " Q {} {}, {} {}", control.0, control.1, to.0, to.1);
                    }
                }
            }
            let _ = writeln!(
                out,
                "{indent}<path d=\"{}\"{} fill=\"none\" />",
                d,
                stroke_attrs(stroke)
            );
        }
        Shape::Text {
            position,
            content,
            style,
            rotation,
        } => {
            let _ = write!(
                out,
                "{indent}<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\"",
                position.0,
                position.1,
                style.size,
                style.color.to_hex()
            );
            match style.anchor {
                TextAnchor::Start => {}
                TextAnchor::Middle => out.push_str(" text-anchor=\"middle\""),
                TextAnchor::End => out.push_str(" text-anchor=\"end\""),
            }
            if let Some(weight) = style.weight.svg_value() {
                let _ = write!(out, " font-weight=\"{weight}\"");
            }
            if style.italic {
                out.push_str(" font-style=\"italic\"");
            }
            if *rotation != 0.0 {
                let _ = write!(
                    out,
                    " transform=\"rotate({}, {}, {})\"",
                    rotation, position.0, position.1
                );
            }
            let _ = writeln!(out, ">{}</text>", escape_xml(content));
        }
        Shape::Group { offset, children } => {
            let _ = writeln!(
                out,
                "{indent}<g transform=\"translate({}, {})\">",
                offset.0, offset.1
            );
            for child in children {
                write_shape(out, child, depth + 1);
            }
            let _ = writeln!(out, "{indent}</g>");
        }
    }
}

fn paint_attrs(fill: Option<Color>, stroke: Option<&StrokeStyle>) -> String {
    let mut s = match fill {
        Some(c) => format!(" fill=\"{}\"", c.to_hex()),
        None => " fill=\"none\"".to_string(),
    };
    if let Some(stroke) = stroke {
        s.push_str(&stroke_attrs(stroke));
    }
    s
}

fn stroke_attrs(stroke: &StrokeStyle) -> String {
    let mut s = format!(
        " stroke=\"{}\" stroke-width=\"{}\"",
        stroke.color.to_hex(),
        stroke.width
    );
    if let Some((dash, gap)) = stroke.dash {
        let _ = write!(s, " stroke-dasharray=\"{dash},{gap}\"");
    }
    s
}

/// Escapes the five XML special characters.
pub fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}
