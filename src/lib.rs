#![forbid(unsafe_code)]

pub mod controller;
pub mod ease;
pub mod error;
pub mod geom;
pub mod model;
pub mod parse;
pub mod path_bounds;
pub mod render;
pub mod render_cpu;
pub mod rules;
pub mod view;
pub mod viewport;

pub use controller::{
    HoverInfo, InteractionController, InteractionCtx, PointerEvent, SeatEvent, hit_test,
};
pub use ease::Ease;
pub use error::{PlanviewError, PlanviewResult};
pub use geom::Rgba8;
pub use model::{LegendInfo, LegendShape, ParsedPlan, Rotation, SeatGroup, SeatInfo, SeatType};
pub use parse::parse_plan;
pub use path_bounds::{DEFAULT_BOUNDS, path_bounds};
pub use render::{DrawOp, FrameRgba, PathCache, RenderBackend, Scene, SceneInputs, build_scene};
pub use render_cpu::CpuBackend;
pub use rules::{RuleConfig, effective_blocked};
pub use view::{SeatMapProps, SeatMapView, ViewEvent};
pub use viewport::{MAX_SCALE, PinchState, Viewport, ZOOM_GATE};
