use std::collections::BTreeSet;

use kurbo::{Point, Rect, Vec2};

use crate::{
    model::{ParsedPlan, SeatGroup, SeatInfo},
    viewport::{PinchState, Viewport},
};

/// Movement past this marks a press as a drag, suppressing the tap.
const DRAG_THRESHOLD_PX: f64 = 5.0;

/// A press held longer than this is no longer a tap.
const TAP_MAX_SECS: f64 = 0.25;

/// Target scale for tap-to-zoom below the pan gate.
const TAP_ZOOM_SCALE: f64 = 3.5;

/// Taps are ignored for this long after a pinch ends; lifting one finger
/// slightly after the other must not read as a tap.
const PINCH_COOLDOWN_SECS: f64 = 0.3;

/// Pointer stream normalized by the host adapter: mouse and single-touch
/// both arrive as Down/Move/Up, a second finger switches to the pinch
/// events. Timestamps are passed separately, in seconds.
#[derive(Clone, Copy, Debug)]
pub enum PointerEvent {
    Down { pos: Point, marquee: bool },
    Move { pos: Point },
    Up { pos: Point },
    PinchStart { a: Point, b: Point },
    PinchMove { a: Point, b: Point },
    PinchEnd,
    Hover { pos: Point },
    HoverEnd,
}

/// Selection changes for the booking flow. Selection state itself lives
/// with the host; the controller only reports toggles.
#[derive(Clone, Debug)]
pub enum SeatEvent {
    Selected {
        seat_id: String,
        group: SeatGroup,
        seat: SeatInfo,
    },
    Deselected {
        seat_id: String,
        seat: SeatInfo,
    },
}

/// Read-only inputs the controller consults while interpreting a gesture.
#[derive(Clone, Copy)]
pub struct InteractionCtx<'a> {
    pub plan: &'a ParsedPlan,
    pub groups: &'a [SeatGroup],
    pub blocked: &'a BTreeSet<String>,
    pub selection: &'a [String],
    pub wheelchair_mode: bool,
}

/// Seat under the cursor, for highlight and tooltip.
#[derive(Clone, Debug)]
pub struct HoverInfo {
    pub seat_id: String,
    pub display_name: String,
    /// Pointer position in screen space; the tooltip follows it.
    pub pointer: Point,
}

#[derive(Clone, Copy, Debug)]
struct Press {
    start_pos: Point,
    start_time: f64,
    last_pos: Point,
    dragged: bool,
    marquee: bool,
}

/// One controller for mouse and touch. Owns only gesture state; seats,
/// selection and the blocked set are passed in per event.
#[derive(Debug, Default)]
pub struct InteractionController {
    press: Option<Press>,
    pinch: Option<PinchState>,
    pinch_cooldown_until: f64,
    hover: Option<HoverInfo>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&self) -> Option<&HoverInfo> {
        self.hover.as_ref()
    }

    /// Active marquee rectangle in screen space, if a modifier-drag is in
    /// progress.
    pub fn marquee_rect(&self) -> Option<Rect> {
        let press = self.press?;
        if press.marquee && press.dragged {
            Some(Rect::from_points(press.start_pos, press.last_pos))
        } else {
            None
        }
    }

    pub fn handle(
        &mut self,
        viewport: &mut Viewport,
        ctx: &InteractionCtx<'_>,
        event: PointerEvent,
        now: f64,
    ) -> Vec<SeatEvent> {
        match event {
            PointerEvent::Down { pos, marquee } => {
                if self.pinch.is_none() {
                    self.press = Some(Press {
                        start_pos: pos,
                        start_time: now,
                        last_pos: pos,
                        dragged: false,
                        marquee,
                    });
                }
                Vec::new()
            }
            PointerEvent::Move { pos } => {
                self.on_move(viewport, pos);
                Vec::new()
            }
            PointerEvent::Up { pos } => self.on_up(viewport, ctx, pos, now),
            PointerEvent::PinchStart { a, b } => {
                // Two fingers are pinch, exclusively; any press in flight
                // is abandoned.
                self.press = None;
                self.hover = None;
                self.pinch = viewport.start_pinch(a, b);
                Vec::new()
            }
            PointerEvent::PinchMove { a, b } => {
                if let Some(pinch) = self.pinch {
                    viewport.apply_pinch(pinch, a, b);
                }
                Vec::new()
            }
            PointerEvent::PinchEnd => {
                if self.pinch.take().is_some() {
                    self.pinch_cooldown_until = now + PINCH_COOLDOWN_SECS;
                }
                Vec::new()
            }
            PointerEvent::Hover { pos } => {
                self.on_hover(viewport, ctx, pos);
                Vec::new()
            }
            PointerEvent::HoverEnd => {
                self.hover = None;
                Vec::new()
            }
        }
    }

    fn on_move(&mut self, viewport: &mut Viewport, pos: Point) {
        let Some(press) = &mut self.press else {
            return;
        };

        if (pos - press.start_pos).hypot() > DRAG_THRESHOLD_PX {
            press.dragged = true;
        }

        let delta = pos - press.last_pos;
        let (dragged, marquee) = (press.dragged, press.marquee);
        press.last_pos = pos;

        // Marquee drags select on release; pan only once zoomed in.
        // Below the gate a drag is dead weight and the release decides.
        if dragged && !marquee && viewport.is_zoomed_in() {
            viewport.pan_by(Vec2::new(delta.x, delta.y));
        }
    }

    fn on_up(
        &mut self,
        viewport: &mut Viewport,
        ctx: &InteractionCtx<'_>,
        pos: Point,
        now: f64,
    ) -> Vec<SeatEvent> {
        let Some(press) = self.press.take() else {
            return Vec::new();
        };

        if now < self.pinch_cooldown_until {
            return Vec::new();
        }

        if press.marquee && press.dragged {
            return self.marquee_select(viewport, ctx, Rect::from_points(press.start_pos, pos));
        }

        let is_tap = !press.dragged && (now - press.start_time) <= TAP_MAX_SECS;
        if !is_tap {
            return Vec::new();
        }

        if !viewport.is_zoomed_in() {
            // Below the gate a tap only zooms in; selection starts at the
            // next tap.
            viewport.zoom_to_point(TAP_ZOOM_SCALE, pos, now);
            return Vec::new();
        }

        let world = viewport.screen_to_world(pos);
        let Some(seat) = hit_test(ctx.plan, world) else {
            return Vec::new();
        };
        self.toggle_seat(ctx, seat)
    }

    fn toggle_seat(&self, ctx: &InteractionCtx<'_>, seat: &SeatInfo) -> Vec<SeatEvent> {
        if !mode_matched(seat, ctx.wheelchair_mode) || ctx.blocked.contains(&seat.id) {
            return Vec::new();
        }

        if ctx.selection.iter().any(|s| *s == seat.id) {
            return vec![SeatEvent::Deselected {
                seat_id: seat.id.clone(),
                seat: seat.clone(),
            }];
        }

        // Selection requires a resolvable group; neutral seats are view-only.
        let Some(group) = owning_group(ctx, seat) else {
            tracing::debug!(seat = %seat.id, "tap on groupless seat ignored");
            return Vec::new();
        };
        vec![SeatEvent::Selected {
            seat_id: seat.id.clone(),
            group: group.clone(),
            seat: seat.clone(),
        }]
    }

    fn marquee_select(
        &self,
        viewport: &Viewport,
        ctx: &InteractionCtx<'_>,
        screen_rect: Rect,
    ) -> Vec<SeatEvent> {
        let p0 = viewport.screen_to_world(Point::new(screen_rect.x0, screen_rect.y0));
        let p1 = viewport.screen_to_world(Point::new(screen_rect.x1, screen_rect.y1));
        let world_rect = Rect::from_points(p0, p1);

        let mut events = Vec::new();
        for seat in &ctx.plan.seats {
            if !world_rect.contains(seat.center)
                || !mode_matched(seat, ctx.wheelchair_mode)
                || ctx.blocked.contains(&seat.id)
                || ctx.selection.iter().any(|s| *s == seat.id)
            {
                continue;
            }
            let Some(group) = owning_group(ctx, seat) else {
                continue;
            };
            events.push(SeatEvent::Selected {
                seat_id: seat.id.clone(),
                group: group.clone(),
                seat: seat.clone(),
            });
        }
        events
    }

    fn on_hover(&mut self, viewport: &Viewport, ctx: &InteractionCtx<'_>, pos: Point) {
        if !viewport.is_zoomed_in() || self.press.is_some() || self.pinch.is_some() {
            self.hover = None;
            return;
        }
        let world = viewport.screen_to_world(pos);
        self.hover = hit_test(ctx.plan, world)
            .filter(|seat| mode_matched(seat, ctx.wheelchair_mode))
            .map(|seat| HoverInfo {
                seat_id: seat.id.clone(),
                display_name: seat.display_name.clone(),
                pointer: pos,
            });
    }
}

/// First seat in document order whose bounding box contains the point.
pub fn hit_test(plan: &ParsedPlan, world: Point) -> Option<&SeatInfo> {
    plan.seats.iter().find(|s| s.bounds.contains(world))
}

/// Normal mode ignores wheelchair-category seats entirely; wheelchair
/// mode offers only wheelchair-category seats.
pub fn mode_matched(seat: &SeatInfo, wheelchair_mode: bool) -> bool {
    if wheelchair_mode {
        seat.seat_type.is_wheelchair_category()
    } else {
        !seat.seat_type.is_wheelchair_category()
    }
}

fn owning_group<'a>(ctx: &InteractionCtx<'a>, seat: &SeatInfo) -> Option<&'a SeatGroup> {
    let group_id = seat.seat_group_id.as_deref()?;
    ctx.groups.iter().find(|g| g.id == group_id)
}
