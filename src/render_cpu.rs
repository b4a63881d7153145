use kurbo::PathEl;
use vello_cpu::kurbo::Shape as _;

use crate::{
    error::{PlanviewError, PlanviewResult},
    geom::Rgba8,
    render::{DrawOp, FrameRgba, RenderBackend, Scene},
};

/// CPU rasterizer over `vello_cpu`. Holds its pixmap across frames and
/// reallocates only when the canvas size changes.
#[derive(Default)]
pub struct CpuBackend {
    surface: Option<CpuSurface>,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn surface_for(&mut self, width: u16, height: u16) -> &mut CpuSurface {
        let fits = self
            .surface
            .as_ref()
            .is_some_and(|s| s.width == width && s.height == height);
        if !fits {
            self.surface = None;
        }
        self.surface.get_or_insert_with(|| CpuSurface {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }
}

impl RenderBackend for CpuBackend {
    fn render_scene(&mut self, scene: &Scene) -> PlanviewResult<FrameRgba> {
        let width: u16 = scene
            .width
            .try_into()
            .map_err(|_| PlanviewError::render("canvas width exceeds u16"))?;
        let height: u16 = scene
            .height
            .try_into()
            .map_err(|_| PlanviewError::render("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(PlanviewError::render("canvas must not be empty"));
        }

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(scene.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        let view = affine_to_cpu(scene.view);
        for op in &scene.ops {
            draw_op(&mut ctx, op, view);
        }

        ctx.flush();
        let surface = self.surface_for(width, height);
        ctx.render_to_pixmap(&mut surface.pixmap);

        Ok(FrameRgba {
            width: scene.width,
            height: scene.height,
            data: surface.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn draw_op(ctx: &mut vello_cpu::RenderContext, op: &DrawOp, view: vello_cpu::kurbo::Affine) {
    match op {
        DrawOp::FillBatch { color, paths } => {
            ctx.set_transform(view);
            ctx.set_paint(color_to_cpu(*color));
            for path in paths {
                ctx.fill_path(&bezpath_to_cpu(path));
            }
        }
        DrawOp::SelectedSeat {
            path,
            fill,
            stroke,
            stroke_width,
            check,
            check_width,
        } => {
            ctx.set_transform(view);
            let cpu_path = bezpath_to_cpu(path);
            ctx.set_paint(color_to_cpu(*fill));
            ctx.fill_path(&cpu_path);

            ctx.set_paint(color_to_cpu(*stroke));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*stroke_width));
            ctx.stroke_path(&cpu_path);

            let mut mark = vello_cpu::kurbo::BezPath::new();
            for (i, p) in check.iter().enumerate() {
                let p = vello_cpu::kurbo::Point::new(p.x, p.y);
                if i == 0 {
                    mark.move_to(p);
                } else {
                    mark.line_to(p);
                }
            }
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*check_width));
            ctx.stroke_path(&mark);
        }
        DrawOp::HoverHighlight { path, color } => {
            ctx.set_transform(view);
            ctx.set_paint(color_to_cpu(*color));
            ctx.fill_path(&bezpath_to_cpu(path));
        }
        DrawOp::Legend {
            path,
            transform,
            fill,
            stroke,
        } => {
            ctx.set_transform(view * affine_to_cpu(*transform));
            let cpu_path = bezpath_to_cpu(path);
            if let Some(fill) = fill {
                ctx.set_paint(color_to_cpu(*fill));
                ctx.fill_path(&cpu_path);
            }
            if let Some(stroke) = stroke {
                ctx.set_paint(color_to_cpu(*stroke));
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(1.0));
                ctx.stroke_path(&cpu_path);
            }
        }
        DrawOp::ScreenDashedRect {
            rect,
            color,
            width,
            dash,
        } => {
            // Screen space: the viewport transform does not apply.
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(*color));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width).with_dashes(0.0, *dash));
            let r = vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1);
            ctx.stroke_path(&r.to_path(1e-3));
        }
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
