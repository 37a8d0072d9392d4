//! Built-in diagrams shown by the application.
//!
//! Both diagrams are fixed data tables: every shape, coordinate, color and
//! label is spelled out here and nothing is laid out at runtime.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Kinds of built-in diagrams available from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DiagramKind {
    /// User / IT Staff / System swimlanes for a repair ticket
    #[default]
    Swimlane,
    /// Ticket status lifecycle from Open to Closed
    WorkflowStatus,
}

/// Metadata for a single diagram.
pub struct DiagramInfo {
    /// Stable identifier for the diagram
    pub kind: DiagramKind,
    /// Heading shown above the diagram
    pub title: &'static str,
    /// Optional line shown under the heading
    pub subtitle: Option<&'static str>,
    /// Base name (without extension) of exported files
    pub file_stem: &'static str,
}

/// Returns all diagrams with their display metadata.
pub const fn all_diagrams() -> &'static [DiagramInfo] {
    const DIAGRAMS: &[DiagramInfo] = &[
        DiagramInfo {
            kind: DiagramKind::Swimlane,
            title: "Repair Ticket Workflow",
            subtitle: None,
            file_stem: "repair-ticket-workflow-swimlane-diagram",
        },
        DiagramInfo {
            kind: DiagramKind::WorkflowStatus,
            title: "Workflow Status Diagram",
            subtitle: Some("Track the lifecycle of tickets and issues"),
            file_stem: "workflow-status-diagram",
        },
    ];
    DIAGRAMS
}

impl DiagramKind {
    /// Display metadata for this diagram.
    pub fn info(&self) -> &'static DiagramInfo {
        match self {
            DiagramKind::Swimlane => &all_diagrams()[0],
            DiagramKind::WorkflowStatus => &all_diagrams()[1],
        }
    }
}

/// Builds the scene for the given diagram kind.
pub fn build_diagram(kind: DiagramKind) -> Scene {
    match kind {
        DiagramKind::Swimlane => build_swimlane(),
        DiagramKind::WorkflowStatus => build_workflow_status(),
    }
}

const FLOW: Color = Color::from_hex(0x374151);
const EXCEPTION: Color = Color::from_hex(0xef4444);
const YES: Color = Color::from_hex(0x059669);
const NO: Color = Color::from_hex(0xdc2626);

/// Box and label colors of one swimlane.
#[derive(Clone, Copy)]
struct LanePalette {
    fill: Color,
    stroke: Color,
    text: Color,
}

const USER_LANE: LanePalette = LanePalette {
    fill: Color::from_hex(0xdbeafe),
    stroke: Color::from_hex(0x3b82f6),
    text: Color::from_hex(0x1e40af),
};
const STAFF_LANE: LanePalette = LanePalette {
    fill: Color::from_hex(0xd1fae5),
    stroke: Color::from_hex(0x10b981),
    text: Color::from_hex(0x065f46),
};
const SYSTEM_LANE: LanePalette = LanePalette {
    fill: Color::from_hex(0xede9fe),
    stroke: Color::from_hex(0x8b5cf6),
    text: Color::from_hex(0x5b21b6),
};

fn text(x: f32, y: f32, content: &str, style: TextStyle) -> Shape {
    Shape::Text {
        position: (x, y),
        content: content.to_string(),
        style,
        rotation: 0.0,
    }
}

fn flow(x1: f32, y1: f32, x2: f32, y2: f32, marker_end: Option<Marker>) -> Shape {
    Shape::Line {
        from: (x1, y1),
        to: (x2, y2),
        stroke: StrokeStyle::solid(FLOW, 2.0),
        marker_end,
    }
}

fn segment(x1: f32, y1: f32, x2: f32, y2: f32) -> Shape {
    flow(x1, y1, x2, y2, None)
}

fn arrow(x1: f32, y1: f32, x2: f32, y2: f32) -> Shape {
    flow(x1, y1, x2, y2, Some(Marker::Arrow))
}

/// Dashed red polyline; only the last leg carries an arrowhead.
fn exception_path(points: &[Vec2]) -> Vec<Shape> {
    let last = points.len().saturating_sub(2);
    points
        .windows(2)
        .enumerate()
        .map(|(i, w)| Shape::Line {
            from: w[0],
            to: w[1],
            stroke: StrokeStyle::dashed(EXCEPTION, 2.0, 5.0),
            marker_end: (i == last).then_some(Marker::DashedArrow),
        })
        .collect()
}

fn step(x: f32, y: f32, w: f32, h: f32, lane: LanePalette) -> Shape {
    Shape::Rect {
        origin: (x, y),
        size: (w, h),
        corner_radius: 10.0,
        fill: Some(lane.fill),
        stroke: Some(StrokeStyle::solid(lane.stroke, 2.0)),
    }
}

fn step_label(cx: f32, y: f32, content: &str, lane: LanePalette) -> Shape {
    text(
        cx,
        y,
        content,
        TextStyle::centered(14.0, lane.text).weight(FontWeight::SemiBold),
    )
}

fn note(cx: f32, y: f32, content: &str, color: Color) -> Shape {
    text(cx, y, content, TextStyle::centered(12.0, color).italic())
}

fn guard(x: f32, y: f32, content: &str, color: Color) -> Shape {
    text(
        x,
        y,
        content,
        TextStyle::centered(12.0, color)
            .weight(FontWeight::Bold)
            .anchor(TextAnchor::Start),
    )
}

fn vertical_guard(x: f32, y: f32, content: &str) -> Shape {
    Shape::Text {
        position: (x, y),
        content: content.to_string(),
        style: TextStyle::centered(12.0, NO)
            .weight(FontWeight::Bold)
            .anchor(TextAnchor::Start),
        rotation: -90.0,
    }
}

/// Diamond decision centered on (cx, cy) with two label lines at the given offsets.
fn decision(cx: f32, cy: f32, half: f32, lines: [(&str, f32); 2]) -> Shape {
    let label = TextStyle::centered(13.0, Color::from_hex(0x92400e)).weight(FontWeight::SemiBold);
    let mut children = vec![Shape::Polygon {
        points: vec![(0.0, -half), (half, 0.0), (0.0, half), (-half, 0.0)],
        fill: Some(Color::from_hex(0xfef3c7)),
        stroke: Some(StrokeStyle::solid(Color::from_hex(0xf59e0b), 2.0)),
    }];
    for (content, dy) in lines {
        children.push(text(0.0, dy, content, label));
    }
    Shape::Group {
        offset: (cx, cy),
        children,
    }
}

fn build_swimlane() -> Scene {
    let mut s = Scene::new(1400.0, 2200.0);

    s.push(Shape::Rect {
        origin: (0.0, 0.0),
        size: (1400.0, 2200.0),
        corner_radius: 0.0,
        fill: Some(Color::WHITE),
        stroke: None,
    });

    // Lane headers
    let header = TextStyle::centered(22.0, Color::WHITE).weight(FontWeight::Bold);
    for (x, w, fill, stroke, cx, name) in [
        (0.0, 467.0, 0x3b82f6, 0x1e40af, 233.0, "User"),
        (467.0, 466.0, 0x10b981, 0x059669, 700.0, "IT Staff"),
        (933.0, 467.0, 0x8b5cf6, 0x6d28d9, 1167.0, "System"),
    ] {
        s.push(Shape::Rect {
            origin: (x, 0.0),
            size: (w, 60.0),
            corner_radius: 0.0,
            fill: Some(Color::from_hex(fill)),
            stroke: Some(StrokeStyle::solid(Color::from_hex(stroke), 2.0)),
        });
        s.push(text(cx, 40.0, name, header));
    }
    for x in [467.0, 933.0] {
        s.push(Shape::Line {
            from: (x, 60.0),
            to: (x, 2200.0),
            stroke: StrokeStyle::solid(Color::from_hex(0xd1d5db), 2.0),
            marker_end: None,
        });
    }

    // User lane
    s.push(Shape::Circle {
        center: (233.0, 120.0),
        radius: 20.0,
        fill: Some(Color::from_hex(0x1f2937)),
        stroke: Some(StrokeStyle::solid(Color::BLACK, 2.0)),
        blink: false,
    });
    s.push(arrow(233.0, 140.0, 233.0, 180.0));
    s.push(step(133.0, 180.0, 200.0, 80.0, USER_LANE));
    s.push(step_label(233.0, 215.0, "Report problem to IT", USER_LANE));
    s.push(note(233.0, 235.0, "(offline communication)", Color::from_hex(0x64748b)));
    s.push(segment(233.0, 260.0, 233.0, 290.0));
    s.push(arrow(233.0, 290.0, 467.0, 290.0));

    s.push(arrow(233.0, 1600.0, 233.0, 1640.0));
    s.push(step(133.0, 1640.0, 200.0, 80.0, USER_LANE));
    s.push(step_label(233.0, 1670.0, "Verify repaired", USER_LANE));
    s.push(step_label(233.0, 1690.0, "equipment", USER_LANE));
    s.push(arrow(233.0, 1720.0, 233.0, 1760.0));

    s.push(decision(233.0, 1810.0, 50.0, [("User", -10.0), ("satisfied?", 10.0)]));
    s.push(guard(350.0, 1815.0, "[Yes]", YES));
    s.push(arrow(283.0, 1810.0, 467.0, 1810.0));

    s.push(guard(160.0, 1870.0, "[No]", NO));
    for shape in exception_path(&[
        (233.0, 1860.0),
        (233.0, 1920.0),
        (80.0, 1920.0),
        (80.0, 780.0),
        (467.0, 780.0),
    ]) {
        s.push(shape);
    }
    s.push(vertical_guard(85.0, 1350.0, "Re-repair required"));

    // IT staff lane
    s.push(step(567.0, 250.0, 266.0, 80.0, STAFF_LANE));
    s.push(step_label(700.0, 285.0, "Receive problem report", STAFF_LANE));
    s.push(arrow(700.0, 330.0, 700.0, 370.0));

    s.push(step(567.0, 370.0, 266.0, 80.0, STAFF_LANE));
    s.push(step_label(700.0, 400.0, "Screen and evaluate", STAFF_LANE));
    s.push(step_label(700.0, 420.0, "the issue", STAFF_LANE));
    s.push(arrow(700.0, 450.0, 700.0, 490.0));

    s.push(decision(700.0, 560.0, 60.0, [("IT-related", -5.0), ("issue?", 15.0)]));
    s.push(guard(800.0, 565.0, "[No]", NO));
    for shape in exception_path(&[
        (760.0, 560.0),
        (1320.0, 560.0),
        (1320.0, 2080.0),
        (1167.0, 2080.0),
    ]) {
        s.push(shape);
    }
    s.push(vertical_guard(1325.0, 1000.0, "End without ticket"));

    s.push(guard(705.0, 640.0, "[Yes]", YES));
    s.push(arrow(700.0, 620.0, 700.0, 660.0));

    s.push(step(567.0, 660.0, 266.0, 80.0, STAFF_LANE));
    s.push(step_label(700.0, 690.0, "Create ticket", STAFF_LANE));
    s.push(step_label(700.0, 710.0, "in system", STAFF_LANE));
    s.push(segment(700.0, 740.0, 700.0, 770.0));
    s.push(arrow(700.0, 770.0, 933.0, 770.0));

    s.push(arrow(700.0, 930.0, 700.0, 970.0));

    s.push(step(567.0, 970.0, 266.0, 80.0, STAFF_LANE));
    s.push(step_label(700.0, 1000.0, "Evaluate priority", STAFF_LANE));
    s.push(step_label(700.0, 1020.0, "and repair type", STAFF_LANE));
    s.push(arrow(700.0, 1050.0, 700.0, 1090.0));

    s.push(step(567.0, 1090.0, 266.0, 80.0, STAFF_LANE));
    s.push(step_label(700.0, 1125.0, "Assign technician", STAFF_LANE));
    s.push(arrow(700.0, 1170.0, 700.0, 1210.0));

    s.push(step(567.0, 1210.0, 266.0, 80.0, STAFF_LANE));
    s.push(step_label(700.0, 1245.0, "Diagnose the problem", STAFF_LANE));
    s.push(arrow(700.0, 1290.0, 700.0, 1330.0));

    // Waiting state
    let waiting = Color::from_hex(0xca8a04);
    s.push(Shape::Ellipse {
        center: (700.0, 1390.0),
        radii: (133.0, 40.0),
        fill: Some(Color::from_hex(0xfef9c3)),
        stroke: Some(StrokeStyle::solid(waiting, 2.0)),
    });
    s.push(Shape::Circle {
        center: (670.0, 1390.0),
        radius: 5.0,
        fill: Some(waiting),
        stroke: None,
        blink: true,
    });
    let waiting_label =
        TextStyle::centered(13.0, Color::from_hex(0x713f12)).weight(FontWeight::SemiBold);
    s.push(text(700.0, 1385.0, "Waiting for parts /", waiting_label));
    s.push(text(700.0, 1405.0, "user / vendor", waiting_label));
    s.push(arrow(700.0, 1430.0, 700.0, 1470.0));

    s.push(step(567.0, 1470.0, 266.0, 80.0, STAFF_LANE));
    s.push(step_label(700.0, 1505.0, "Perform repair", STAFF_LANE));
    s.push(segment(700.0, 1550.0, 700.0, 1580.0));
    s.push(arrow(700.0, 1580.0, 933.0, 1580.0));

    s.push(arrow(700.0, 1740.0, 700.0, 1780.0));

    s.push(step(567.0, 1780.0, 266.0, 60.0, STAFF_LANE));
    s.push(step_label(700.0, 1815.0, "Confirm repair completion", STAFF_LANE));
    s.push(arrow(700.0, 1840.0, 700.0, 1880.0));

    s.push(step(567.0, 1880.0, 266.0, 80.0, STAFF_LANE));
    s.push(step_label(700.0, 1910.0, "Return equipment to user", STAFF_LANE));
    s.push(note(700.0, 1930.0, "(if applicable)", Color::from_hex(0x6b7280)));
    s.push(segment(700.0, 1960.0, 700.0, 1990.0));
    s.push(segment(700.0, 1990.0, 467.0, 1990.0));
    s.push(segment(467.0, 1990.0, 467.0, 1600.0));
    s.push(arrow(467.0, 1600.0, 333.0, 1600.0));

    s.push(step(567.0, 2000.0, 266.0, 60.0, STAFF_LANE));
    s.push(step_label(700.0, 2035.0, "Close the ticket", STAFF_LANE));
    s.push(segment(700.0, 2060.0, 700.0, 2090.0));
    s.push(arrow(700.0, 2090.0, 933.0, 2090.0));

    // System lane
    s.push(step(1033.0, 730.0, 266.0, 80.0, SYSTEM_LANE));
    s.push(step_label(1167.0, 765.0, "Generate ticket ID", SYSTEM_LANE));
    s.push(arrow(1167.0, 810.0, 1167.0, 850.0));

    s.push(step(1033.0, 850.0, 266.0, 80.0, SYSTEM_LANE));
    s.push(step_label(1167.0, 885.0, "Store ticket data", SYSTEM_LANE));
    s.push(segment(1167.0, 930.0, 1167.0, 960.0));
    s.push(segment(1167.0, 960.0, 933.0, 960.0));
    s.push(segment(933.0, 960.0, 933.0, 930.0));
    s.push(arrow(933.0, 930.0, 833.0, 930.0));

    s.push(step(1033.0, 1540.0, 266.0, 80.0, SYSTEM_LANE));
    s.push(step_label(1167.0, 1570.0, "Update ticket", SYSTEM_LANE));
    s.push(step_label(1167.0, 1590.0, "information", SYSTEM_LANE));
    s.push(arrow(1167.0, 1620.0, 1167.0, 1660.0));

    s.push(step(1033.0, 1660.0, 266.0, 80.0, SYSTEM_LANE));
    s.push(step_label(1167.0, 1695.0, "Log repair activities", SYSTEM_LANE));
    s.push(segment(1167.0, 1740.0, 1167.0, 1770.0));
    s.push(segment(1167.0, 1770.0, 933.0, 1770.0));
    s.push(segment(933.0, 1770.0, 933.0, 1740.0));
    s.push(arrow(933.0, 1740.0, 833.0, 1740.0));

    s.push(step(1033.0, 2050.0, 266.0, 80.0, SYSTEM_LANE));
    s.push(step_label(1167.0, 2080.0, "Lock ticket data", SYSTEM_LANE));
    s.push(step_label(1167.0, 2100.0, "after closure", SYSTEM_LANE));
    s.push(arrow(1167.0, 2130.0, 1167.0, 2170.0));

    // End node
    s.push(Shape::Circle {
        center: (1167.0, 2190.0),
        radius: 20.0,
        fill: Some(Color::from_hex(0x1f2937)),
        stroke: Some(StrokeStyle::solid(Color::BLACK, 3.0)),
        blink: false,
    });
    s.push(Shape::Circle {
        center: (1167.0, 2190.0),
        radius: 12.0,
        fill: Some(Color::WHITE),
        stroke: None,
        blink: false,
    });

    // Border
    s.push(Shape::Rect {
        origin: (0.0, 0.0),
        size: (1400.0, 2200.0),
        corner_radius: 0.0,
        fill: None,
        stroke: Some(StrokeStyle::solid(FLOW, 2.0)),
    });

    s
}

/// Card and label colors of one ticket status.
struct Status {
    label: &'static str,
    fill: u32,
    accent: u32,
}

const STATUSES: [Status; 6] = [
    Status { label: "Open", fill: 0xdbeafe, accent: 0x1d4ed8 },
    Status { label: "Acknowledged / Response", fill: 0xf3e8ff, accent: 0x7e22ce },
    Status { label: "In Progress", fill: 0xfef9c3, accent: 0xa16207 },
    Status { label: "Pending", fill: 0xffedd5, accent: 0xc2410c },
    Status { label: "Resolved", fill: 0xdcfce7, accent: 0x15803d },
    Status { label: "Closed", fill: 0xf3f4f6, accent: 0x374151 },
];

const CARD_WIDTH: f32 = 240.0;
const CARD_HEIGHT: f32 = 56.0;
const CONNECTOR: Color = Color::from_hex(0xcbd5e1);
const JOINT: Color = Color::from_hex(0x94a3b8);

fn status_card(scene: &mut Scene, status: &Status, cx: f32, top: f32) {
    let accent = Color::from_hex(status.accent);
    scene.push(Shape::Rect {
        origin: (cx - CARD_WIDTH / 2.0, top),
        size: (CARD_WIDTH, CARD_HEIGHT),
        corner_radius: 12.0,
        fill: Some(Color::from_hex(status.fill)),
        stroke: Some(StrokeStyle::solid(accent, 2.0)),
    });
    scene.push(text(
        cx,
        top + CARD_HEIGHT / 2.0 + 6.0,
        status.label,
        TextStyle::centered(16.0, accent).weight(FontWeight::Medium),
    ));
}

fn status_arrow(scene: &mut Scene, cx: f32, from_y: f32, to_y: f32) {
    scene.push(Shape::Line {
        from: (cx, from_y),
        to: (cx, to_y),
        stroke: StrokeStyle::solid(JOINT, 2.0),
        marker_end: Some(Marker::Subtle),
    });
}

fn connector(start: Vec2, segments: Vec<PathSegment>) -> Shape {
    Shape::Path {
        start,
        segments,
        stroke: StrokeStyle::solid(CONNECTOR, 2.0),
    }
}

fn joint(center: Vec2) -> Shape {
    Shape::Circle {
        center,
        radius: 8.0,
        fill: Some(JOINT),
        stroke: None,
        blink: false,
    }
}

fn build_workflow_status() -> Scene {
    const CENTER: f32 = 400.0;
    const LEFT: f32 = 250.0;
    const RIGHT: f32 = 550.0;

    let mut s = Scene::new(800.0, 664.0);
    s.push(Shape::Rect {
        origin: (0.0, 0.0),
        size: (800.0, 664.0),
        corner_radius: 0.0,
        fill: Some(Color::WHITE),
        stroke: None,
    });

    // Linear part: Open -> Acknowledged -> In Progress
    status_card(&mut s, &STATUSES[0], CENTER, 40.0);
    status_arrow(&mut s, CENTER, 96.0, 136.0);
    status_card(&mut s, &STATUSES[1], CENTER, 136.0);
    status_arrow(&mut s, CENTER, 192.0, 232.0);
    status_card(&mut s, &STATUSES[2], CENTER, 232.0);

    // Split towards Pending and Resolved
    s.push(Shape::Line {
        from: (CENTER, 288.0),
        to: (CENTER, 328.0),
        stroke: StrokeStyle::solid(CONNECTOR, 2.0),
        marker_end: None,
    });
    for x in [LEFT, RIGHT] {
        s.push(connector(
            (CENTER, 328.0),
            vec![
                PathSegment::QuadTo {
                    control: (CENTER, 348.0),
                    to: (x, 368.0),
                },
                PathSegment::LineTo((x, 408.0)),
            ],
        ));
    }
    s.push(joint((CENTER, 328.0)));

    status_card(&mut s, &STATUSES[3], LEFT, 408.0);
    status_card(&mut s, &STATUSES[4], RIGHT, 408.0);

    // Merge back into Closed
    for x in [LEFT, RIGHT] {
        s.push(Shape::Line {
            from: (x, 464.0),
            to: (x, 504.0),
            stroke: StrokeStyle::solid(CONNECTOR, 2.0),
            marker_end: None,
        });
        s.push(connector(
            (x, 504.0),
            vec![PathSegment::QuadTo {
                control: (x, 524.0),
                to: (CENTER, 544.0),
            }],
        ));
    }
    s.push(joint((CENTER, 544.0)));

    status_card(&mut s, &STATUSES[5], CENTER, 568.0);

    s
}
