use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, Shape};

use crate::{
    error::PlanviewResult,
    geom::Rgba8,
    model::{LegendShape, ParsedPlan, SeatInfo},
    viewport::Viewport,
};

pub const BACKGROUND: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
/// Standard tint for blocked seats in normal mode.
pub const BLOCKED_TINT: Rgba8 = Rgba8::rgb(0x9e, 0x9e, 0x9e);
/// Single tint for everything unavailable in wheelchair mode.
pub const UNSELECTABLE_TINT: Rgba8 = Rgba8::rgb(0xc4, 0xc4, 0xc4);
/// Selection stroke and checkmark color.
pub const ACCENT: Rgba8 = Rgba8::rgb(0x1b, 0x5e, 0x20);
pub const HOVER_HIGHLIGHT: Rgba8 = Rgba8::rgba(0xff, 0xff, 0xff, 0x66);
pub const MARQUEE_COLOR: Rgba8 = Rgba8::rgb(0x42, 0x85, 0xf4);

/// Compiled seat/legend outlines, one entry per distinct path-data
/// string. Cleared only when the plan content changes.
#[derive(Debug, Default)]
pub struct PathCache {
    paths: HashMap<String, Arc<BezPath>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Compiled path for a seat: its path data, or its bounding rect for
    /// rect elements and unparseable data.
    pub fn seat_path(&mut self, seat: &SeatInfo) -> Arc<BezPath> {
        self.path_or_rect(&seat.path_data, seat.bounds)
    }

    fn path_or_rect(&mut self, data: &str, fallback: Rect) -> Arc<BezPath> {
        let key: String = if data.trim().is_empty() {
            format!(
                "rect:{},{},{},{}",
                fallback.x0, fallback.y0, fallback.x1, fallback.y1
            )
        } else {
            data.to_string()
        };

        if let Some(path) = self.paths.get(&key) {
            return Arc::clone(path);
        }

        let compiled = if data.trim().is_empty() {
            fallback.to_path(1e-3)
        } else {
            BezPath::from_svg(data).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "path data failed to compile, drawing its box");
                fallback.to_path(1e-3)
            })
        };
        let path = Arc::new(compiled);
        self.paths.insert(key, Arc::clone(&path));
        path
    }
}

/// One frame's draw list. Content-space ops are drawn under `view`;
/// the marquee op is in untransformed screen space.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Rgba8,
    pub view: Affine,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub enum DrawOp {
    /// Seats sharing one fill, drawn in a single batch.
    FillBatch {
        color: Rgba8,
        paths: Vec<Arc<BezPath>>,
    },
    /// A selected seat: fill, accent stroke, hand-drawn checkmark.
    SelectedSeat {
        path: Arc<BezPath>,
        fill: Rgba8,
        stroke: Rgba8,
        stroke_width: f64,
        check: Vec<Point>,
        check_width: f64,
    },
    /// Translucent overlay over the hovered seat.
    HoverHighlight { path: Arc<BezPath>, color: Rgba8 },
    /// Legend geometry with its own transform (rotation pivot).
    Legend {
        path: Arc<BezPath>,
        transform: Affine,
        fill: Option<Rgba8>,
        stroke: Option<Rgba8>,
    },
    /// Dashed rectangle in screen space (active marquee).
    ScreenDashedRect {
        rect: Rect,
        color: Rgba8,
        width: f64,
        dash: [f64; 2],
    },
}

/// Frame-level inputs beyond the plan itself.
#[derive(Clone, Copy)]
pub struct SceneInputs<'a> {
    pub plan: &'a ParsedPlan,
    pub blocked: &'a BTreeSet<String>,
    pub selection: &'a [String],
    pub wheelchair_mode: bool,
    pub hover_seat: Option<&'a str>,
    pub marquee: Option<Rect>,
}

/// Rasterizes scenes; implementations decide how (CPU pixmap, GPU, a
/// recording for tests). Strategy seam between scene building and pixels.
pub trait RenderBackend {
    fn render_scene(&mut self, scene: &Scene) -> PlanviewResult<FrameRgba>;
}

#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Builds the draw list for one frame. Deterministic: identical inputs
/// produce an identical op list, order included.
///
/// Pass order: unblocked seats batched by color, blocked seats batched
/// by tint, selected seats, hover highlight, marquee, then legends on
/// top (always visible).
#[tracing::instrument(skip_all)]
pub fn build_scene(
    viewport: &Viewport,
    inputs: &SceneInputs<'_>,
    cache: &mut PathCache,
) -> Scene {
    let canvas = viewport.canvas();
    let mut ops: Vec<DrawOp> = Vec::new();

    let selected: BTreeSet<&str> = inputs.selection.iter().map(String::as_str).collect();
    let visible = |seat: &SeatInfo| {
        // Normal mode hides wheelchair-category seats; wheelchair mode
        // shows the full plan.
        inputs.wheelchair_mode || !seat.seat_type.is_wheelchair_category()
    };

    // Unblocked seats, batched by fill color in first-seen order.
    let mut batches: Vec<(Rgba8, Vec<Arc<BezPath>>)> = Vec::new();
    for seat in inputs.plan.seats.iter().filter(|s| visible(s)) {
        if inputs.blocked.contains(&seat.id) || selected.contains(seat.id.as_str()) {
            continue;
        }
        let path = cache.seat_path(seat);
        match batches.iter_mut().find(|(c, _)| *c == seat.color) {
            Some((_, paths)) => paths.push(path),
            None => batches.push((seat.color, vec![path])),
        }
    }
    ops.extend(
        batches
            .into_iter()
            .map(|(color, paths)| DrawOp::FillBatch { color, paths }),
    );

    // Blocked seats under one overlay tint per mode. Wheelchair mode
    // tints every blocked seat; normal mode skips wheelchair seats with
    // the rest of its filtering.
    let tint = if inputs.wheelchair_mode {
        UNSELECTABLE_TINT
    } else {
        BLOCKED_TINT
    };
    let blocked_paths: Vec<Arc<BezPath>> = inputs
        .plan
        .seats
        .iter()
        .filter(|s| visible(s) && inputs.blocked.contains(&s.id))
        .map(|s| cache.seat_path(s))
        .collect();
    if !blocked_paths.is_empty() {
        ops.push(DrawOp::FillBatch {
            color: tint,
            paths: blocked_paths,
        });
    }

    // Selected seats, individually.
    for seat in inputs.plan.seats.iter().filter(|s| visible(s)) {
        if !selected.contains(seat.id.as_str()) {
            continue;
        }
        let size = seat.bounds.width().max(seat.bounds.height());
        ops.push(DrawOp::SelectedSeat {
            path: cache.seat_path(seat),
            fill: seat.color,
            stroke: ACCENT,
            stroke_width: (size * 0.06).max(0.5),
            check: checkmark_points(seat.bounds),
            check_width: (size * 0.1).max(0.75),
        });
    }

    if let Some(hover_id) = inputs.hover_seat
        && let Some(seat) = inputs.plan.seat(hover_id)
    {
        ops.push(DrawOp::HoverHighlight {
            path: cache.seat_path(seat),
            color: HOVER_HIGHLIGHT,
        });
    }

    if let Some(rect) = inputs.marquee {
        ops.push(DrawOp::ScreenDashedRect {
            rect,
            color: MARQUEE_COLOR,
            width: 1.0,
            dash: [4.0, 4.0],
        });
    }

    // Legends close the frame so decor is never painted over.
    for legend in &inputs.plan.legends {
        let path = match &legend.shape {
            LegendShape::Path { data } => cache.path_or_rect(data, legend.bounds),
            LegendShape::Rect { rect } => cache.path_or_rect("", *rect),
        };
        ops.push(DrawOp::Legend {
            path,
            transform: legend.rotation.map_or(Affine::IDENTITY, |r| r.to_affine()),
            fill: legend.fill,
            stroke: legend.stroke,
        });
    }

    Scene {
        width: canvas.width.max(0.0) as u32,
        height: canvas.height.max(0.0) as u32,
        background: BACKGROUND,
        view: viewport.to_affine(),
        ops,
    }
}

/// Checkmark polyline proportional to the seat box.
fn checkmark_points(bounds: Rect) -> Vec<Point> {
    let at = |fx: f64, fy: f64| {
        Point::new(
            bounds.x0 + bounds.width() * fx,
            bounds.y0 + bounds.height() * fy,
        )
    };
    vec![at(0.26, 0.55), at(0.44, 0.72), at(0.75, 0.32)]
}
