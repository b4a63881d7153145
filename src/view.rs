use std::collections::BTreeSet;

use kurbo::{Point, Size};

use crate::{
    controller::{HoverInfo, InteractionController, InteractionCtx, PointerEvent, SeatEvent},
    error::PlanviewResult,
    model::{ParsedPlan, SeatGroup, SeatInfo},
    parse::parse_plan,
    render::{FrameRgba, PathCache, RenderBackend, Scene, SceneInputs, build_scene},
    rules::{RuleConfig, effective_blocked},
    viewport::Viewport,
};

/// Zoom step for the imperative zoom controls.
const ZOOM_STEP: f64 = 1.5;

/// Host-supplied inputs. The booking flow owns selection and reservation
/// state; the view is a pure function of these plus gesture state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeatMapProps {
    pub plan_markup: String,
    pub seat_groups: Vec<SeatGroup>,
    pub selection: Vec<String>,
    pub blocked_seats: Vec<String>,
    pub wheelchair_mode: bool,
    pub rules: RuleConfig,
}

/// Everything the view reports back to the booking flow.
#[derive(Clone, Debug)]
pub enum ViewEvent {
    /// Fired once after each (re)parse; the host populates pricing UI
    /// from it.
    SeatsLoaded { seats: Vec<SeatInfo> },
    SeatSelected {
        seat_id: String,
        group: SeatGroup,
        seat: SeatInfo,
    },
    SeatDeselected { seat_id: String, seat: SeatInfo },
}

/// The seat-map viewer: parsed plan, derived blocked set, viewport and
/// gesture state, and the compiled-path cache.
///
/// Derived state is recomputed synchronously whenever its inputs change;
/// nothing survives an input change, so there is no staleness window.
pub struct SeatMapView {
    props: SeatMapProps,
    plan: ParsedPlan,
    blocked: BTreeSet<String>,
    viewport: Viewport,
    controller: InteractionController,
    cache: PathCache,
}

impl SeatMapView {
    pub fn new(props: SeatMapProps, canvas: Size) -> PlanviewResult<(Self, Vec<ViewEvent>)> {
        let plan = parse_plan(&props.plan_markup, &props.seat_groups)?;
        let blocked = derive_blocked(&props, &plan);
        let viewport = Viewport::new(canvas, plan.content_bounds());

        let events = vec![ViewEvent::SeatsLoaded {
            seats: plan.seats.clone(),
        }];
        Ok((
            Self {
                props,
                plan,
                blocked,
                viewport,
                controller: InteractionController::new(),
                cache: PathCache::new(),
            },
            events,
        ))
    }

    /// Applies a new set of props. Reparses (and drops the path cache and
    /// the fitted viewport) only when plan content changed; otherwise
    /// just re-derives the blocked set.
    pub fn set_props(&mut self, props: SeatMapProps) -> PlanviewResult<Vec<ViewEvent>> {
        let mut events = Vec::new();

        let plan_changed = props.plan_markup != self.props.plan_markup
            || props.seat_groups != self.props.seat_groups;
        if plan_changed {
            self.plan = parse_plan(&props.plan_markup, &props.seat_groups)?;
            self.cache.clear();
            self.viewport.set_content(self.plan.content_bounds());
            events.push(ViewEvent::SeatsLoaded {
                seats: self.plan.seats.clone(),
            });
        }

        let rules_changed = plan_changed
            || props.selection != self.props.selection
            || props.blocked_seats != self.props.blocked_seats
            || props.rules != self.props.rules;
        self.props = props;
        if rules_changed {
            self.blocked = derive_blocked(&self.props, &self.plan);
        }
        Ok(events)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, now: f64) -> Vec<ViewEvent> {
        let ctx = InteractionCtx {
            plan: &self.plan,
            groups: &self.props.seat_groups,
            blocked: &self.blocked,
            selection: &self.props.selection,
            wheelchair_mode: self.props.wheelchair_mode,
        };
        self.controller
            .handle(&mut self.viewport, &ctx, event, now)
            .into_iter()
            .map(|e| match e {
                SeatEvent::Selected {
                    seat_id,
                    group,
                    seat,
                } => ViewEvent::SeatSelected {
                    seat_id,
                    group,
                    seat,
                },
                SeatEvent::Deselected { seat_id, seat } => {
                    ViewEvent::SeatDeselected { seat_id, seat }
                }
            })
            .collect()
    }

    /// Advances the zoom animation; true while another frame is needed.
    pub fn tick(&mut self, now: f64) -> bool {
        self.viewport.tick(now)
    }

    pub fn set_canvas_size(&mut self, canvas: Size) {
        self.viewport.set_canvas_size(canvas);
    }

    pub fn zoom_in(&mut self, now: f64) -> bool {
        let target = self.viewport.scale() * ZOOM_STEP;
        self.viewport.zoom_to_point(target, self.canvas_center(), now)
    }

    pub fn zoom_out(&mut self, now: f64) -> bool {
        let target = self.viewport.scale() / ZOOM_STEP;
        self.viewport.zoom_to_point(target, self.canvas_center(), now)
    }

    pub fn reset_view(&mut self, now: f64) -> bool {
        self.viewport.animate_to_fit(now)
    }

    pub fn scene(&mut self) -> Scene {
        let inputs = SceneInputs {
            plan: &self.plan,
            blocked: &self.blocked,
            selection: &self.props.selection,
            wheelchair_mode: self.props.wheelchair_mode,
            hover_seat: self.controller.hover().map(|h| h.seat_id.as_str()),
            marquee: self.controller.marquee_rect(),
        };
        build_scene(&self.viewport, &inputs, &mut self.cache)
    }

    pub fn render(&mut self, backend: &mut dyn RenderBackend) -> PlanviewResult<FrameRgba> {
        let scene = self.scene();
        backend.render_scene(&scene)
    }

    /// Cheap digest of everything the frame depends on. Hosts redraw
    /// only when it changes.
    pub fn frame_fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new();
        h.write_u64(self.viewport.scale().to_bits());
        h.write_u64(self.viewport.offset().x.to_bits());
        h.write_u64(self.viewport.offset().y.to_bits());
        h.write_u8(u8::from(self.props.wheelchair_mode));

        for id in &self.props.selection {
            h.write_str(id);
        }
        h.write_u8(0xfe);
        for id in &self.blocked {
            h.write_str(id);
        }
        h.write_u8(0xfe);
        if let Some(hover) = self.controller.hover() {
            h.write_str(&hover.seat_id);
            h.write_u64(hover.pointer.x.to_bits());
            h.write_u64(hover.pointer.y.to_bits());
        }
        if let Some(rect) = self.controller.marquee_rect() {
            for v in [rect.x0, rect.y0, rect.x1, rect.y1] {
                h.write_u64(v.to_bits());
            }
        }
        h.finish()
    }

    pub fn seats(&self) -> &[SeatInfo] {
        &self.plan.seats
    }

    pub fn effective_blocked(&self) -> &BTreeSet<String> {
        &self.blocked
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn hover(&self) -> Option<&HoverInfo> {
        self.controller.hover()
    }

    fn canvas_center(&self) -> Point {
        let c = self.viewport.canvas();
        Point::new(c.width / 2.0, c.height / 2.0)
    }
}

fn derive_blocked(props: &SeatMapProps, plan: &ParsedPlan) -> BTreeSet<String> {
    effective_blocked(
        &props.rules,
        &props.blocked_seats,
        &props.seat_groups,
        &plan.seats,
        &props.selection,
    )
}

struct Fnv1a64 {
    state: u64,
}

impl Fnv1a64 {
    fn new() -> Self {
        Self {
            state: 0xcbf2_9ce4_8422_2325,
        }
    }

    fn write_u8(&mut self, b: u8) {
        self.state ^= u64::from(b);
        self.state = self.state.wrapping_mul(0x100_0000_01b3);
    }

    fn write_u64(&mut self, v: u64) {
        for b in v.to_le_bytes() {
            self.write_u8(b);
        }
    }

    fn write_str(&mut self, s: &str) {
        for b in s.bytes() {
            self.write_u8(b);
        }
        self.write_u8(0xff);
    }

    fn finish(&self) -> u64 {
        self.state
    }
}
