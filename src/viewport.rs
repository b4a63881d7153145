use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::{ease::Ease, path_bounds::DEFAULT_BOUNDS};

/// Scale at or above which gestures pan instead of zooming in.
pub const ZOOM_GATE: f64 = 2.0;

/// Hard upper zoom limit; the lower limit is the fit-to-content scale.
pub const MAX_SCALE: f64 = 5.0;

/// How far the content box may be dragged past the canvas edges.
const OVERSCROLL_X: f64 = 100.0;
const OVERSCROLL_Y: f64 = 80.0;

/// Space kept free below the plan for host UI chrome when fitting.
const BOTTOM_CHROME: f64 = 64.0;

const ZOOM_ANIM_SECS: f64 = 0.3;

/// Scale/offset over a content box, with fit, clamped panning, animated
/// zoom-to-point and pinch. Screen = content * scale + offset.
///
/// Animation is frame-driven: the host forwards its frame-callback
/// timestamps (seconds) to [`Viewport::tick`]. A single animation may be
/// active; requests made while one runs are dropped.
#[derive(Clone, Debug)]
pub struct Viewport {
    scale: f64,
    offset: Vec2,
    canvas: Size,
    content: Rect,
    fit_scale: f64,
    anim: Option<ZoomAnim>,
}

#[derive(Clone, Copy, Debug)]
struct ZoomAnim {
    from_scale: f64,
    to_scale: f64,
    from_offset: Vec2,
    to_offset: Vec2,
    start: f64,
    duration: f64,
}

/// Snapshot taken when a second touch point lands. The world coordinate
/// under the midpoint stays fixed while the fingers move.
#[derive(Clone, Copy, Debug)]
pub struct PinchState {
    initial_dist: f64,
    initial_scale: f64,
    world_mid: Point,
}

impl Viewport {
    /// Fits `content` into `canvas`. An absent or degenerate content box
    /// falls back to a fixed default rather than dividing by zero.
    pub fn new(canvas: Size, content: Option<Rect>) -> Self {
        let mut vp = Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            canvas,
            content: normalize_content(content),
            fit_scale: 1.0,
            anim: None,
        };
        vp.fit_to_content();
        vp
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn fit_scale(&self) -> f64 {
        self.fit_scale
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn content(&self) -> Rect {
        self.content
    }

    /// Whether gestures pan (true) or request zoom-to-point (false).
    pub fn is_zoomed_in(&self) -> bool {
        self.scale >= ZOOM_GATE
    }

    pub fn is_animating(&self) -> bool {
        self.anim.is_some()
    }

    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset.x,
            p.y * self.scale + self.offset.y,
        )
    }

    /// Non-animated refit; cancels any running animation. Called at
    /// mount, on resize and on content change.
    pub fn fit_to_content(&mut self) {
        self.anim = None;

        let avail_w = self.canvas.width.max(1.0);
        let avail_h = (self.canvas.height - BOTTOM_CHROME).max(1.0);

        // Never upscale beyond 1:1 on the initial fit.
        self.fit_scale = (avail_w / self.content.width())
            .min(avail_h / self.content.height())
            .min(1.0);
        self.scale = self.fit_scale;
        self.offset = Vec2::new(
            (avail_w - self.content.width() * self.scale) / 2.0 - self.content.x0 * self.scale,
            (avail_h - self.content.height() * self.scale) / 2.0 - self.content.y0 * self.scale,
        );
    }

    pub fn set_canvas_size(&mut self, canvas: Size) {
        self.canvas = canvas;
        self.fit_to_content();
    }

    pub fn set_content(&mut self, content: Option<Rect>) {
        self.content = normalize_content(content);
        self.fit_to_content();
    }

    /// Pans by a screen-space delta and applies the overscroll clamp.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
        self.offset = self.clamped_offset(self.offset, self.scale);
    }

    /// Starts an animated zoom keeping `anchor` (screen space) over the
    /// same content point. Returns false when another animation is
    /// already running; such requests are dropped, not queued.
    pub fn zoom_to_point(&mut self, target_scale: f64, anchor: Point, now: f64) -> bool {
        let target_scale = target_scale.clamp(self.fit_scale.min(MAX_SCALE), MAX_SCALE);
        let factor = target_scale / self.scale;
        let to_offset = Vec2::new(
            anchor.x - (anchor.x - self.offset.x) * factor,
            anchor.y - (anchor.y - self.offset.y) * factor,
        );
        self.animate_to(target_scale, to_offset, now)
    }

    /// Animates back to the fit transform through the same mechanism.
    pub fn animate_to_fit(&mut self, now: f64) -> bool {
        let mut fitted = self.clone();
        fitted.fit_to_content();
        self.animate_to(fitted.fit_scale, fitted.offset, now)
    }

    fn animate_to(&mut self, to_scale: f64, to_offset: Vec2, now: f64) -> bool {
        if self.anim.is_some() {
            tracing::debug!("zoom animation already active, request dropped");
            return false;
        }
        self.anim = Some(ZoomAnim {
            from_scale: self.scale,
            to_scale,
            from_offset: self.offset,
            to_offset: self.clamped_offset(to_offset, to_scale),
            start: now,
            duration: ZOOM_ANIM_SECS,
        });
        true
    }

    /// Advances the active animation to `now` (seconds). Returns true
    /// while the transform is still changing, so the host knows to keep
    /// its frame loop alive.
    pub fn tick(&mut self, now: f64) -> bool {
        let Some(anim) = self.anim else {
            return false;
        };

        let t = ((now - anim.start) / anim.duration).clamp(0.0, 1.0);
        let te = Ease::OutQuart.apply(t);
        self.scale = anim.from_scale + (anim.to_scale - anim.from_scale) * te;
        self.offset = anim.from_offset.lerp(anim.to_offset, te);

        if t >= 1.0 {
            self.anim = None;
            return false;
        }
        true
    }

    /// Captures pinch state for two touch points. None when the fingers
    /// are (near) coincident.
    pub fn start_pinch(&mut self, a: Point, b: Point) -> Option<PinchState> {
        let initial_dist = a.distance(b);
        if initial_dist < 1.0 {
            return None;
        }
        self.anim = None;
        Some(PinchState {
            initial_dist,
            initial_scale: self.scale,
            world_mid: self.screen_to_world(a.midpoint(b)),
        })
    }

    /// Applies the current finger positions of an active pinch: scale by
    /// distance ratio, keep the captured world midpoint under the screen
    /// midpoint, then clamp.
    pub fn apply_pinch(&mut self, pinch: PinchState, a: Point, b: Point) {
        let dist = a.distance(b);
        let target = (pinch.initial_scale * (dist / pinch.initial_dist))
            .clamp(self.fit_scale.min(MAX_SCALE), MAX_SCALE);
        let mid = a.midpoint(b);

        self.scale = target;
        let offset = Vec2::new(
            mid.x - pinch.world_mid.x * target,
            mid.y - pinch.world_mid.y * target,
        );
        self.offset = self.clamped_offset(offset, target);
    }

    /// Bounds the offset so the content box cannot be dragged more than
    /// the overscroll past the canvas edges.
    fn clamped_offset(&self, offset: Vec2, scale: f64) -> Vec2 {
        Vec2::new(
            clamp_axis(
                offset.x,
                self.content.x0 * scale,
                self.content.x1 * scale,
                self.canvas.width,
                OVERSCROLL_X,
            ),
            clamp_axis(
                offset.y,
                self.content.y0 * scale,
                self.content.y1 * scale,
                self.canvas.height,
                OVERSCROLL_Y,
            ),
        )
    }
}

/// Per-axis overscroll clamp. `c0`/`c1` are the scaled content extents
/// before the offset is applied.
fn clamp_axis(offset: f64, c0: f64, c1: f64, canvas: f64, overscroll: f64) -> f64 {
    let scaled = c1 - c0;
    let (lo, hi) = if scaled <= canvas {
        // Content fits: keep the whole box inside the overscroll band.
        (-overscroll - c0, canvas + overscroll - c1)
    } else {
        // Content is larger than the canvas: keep it covering the canvas
        // up to the overscroll.
        (canvas - overscroll - c1, overscroll - c0)
    };
    offset.clamp(lo, hi)
}

fn normalize_content(content: Option<Rect>) -> Rect {
    match content {
        Some(r) if r.width() > 0.0 && r.height() > 0.0 && r.is_finite() => r,
        _ => DEFAULT_BOUNDS,
    }
}
