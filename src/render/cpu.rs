use std::path::Path;

use chrono::NaiveDate;
use kurbo::{Cap, Join, Rect, Stroke, StrokeOpts};

use crate::animation::curve::Trace;
use crate::foundation::core::{Canvas, Rgba};
use crate::foundation::error::{YoyError, YoyResult};
use crate::render::chart::{ChartLayout, ChartStyle, MONTHS};
use crate::render::composite::{over_in_place, unpremultiply_in_place};
use crate::render::frame::{FrameRGBA, FrameRenderer, FrameSpec};
use crate::render::text::{Anchor, TextRasterizer, TextRun, svg_document};

const STROKE_TOLERANCE: f64 = 0.1;
const GRID_ALPHA: f64 = 0.3;
const GRID_WIDTH_PT: f64 = 0.8;
const SPINE_WIDTH_PT: f64 = 2.0;
// Month labels sit right of their tick, centred on the month.
const MONTH_LABEL_OFFSET_IN: f64 = 20.0 / 60.0;
const TICK_PAD_PT: f64 = 3.5;

/// Software chart renderer: vello_cpu for geometry, resvg for text.
#[derive(Debug)]
pub struct CpuChartRenderer {
    style: ChartStyle,
    layout: ChartLayout,
    text: TextRasterizer,
    static_overlay: Option<Vec<u8>>,
}

impl CpuChartRenderer {
    pub fn new(style: ChartStyle, dpi: u32) -> YoyResult<Self> {
        let text = TextRasterizer::with_system_fonts(&style.font_dirs);
        Self::with_rasterizer(style, dpi, text)
    }

    pub fn with_rasterizer(style: ChartStyle, dpi: u32, text: TextRasterizer) -> YoyResult<Self> {
        let layout = ChartLayout::new(&style, dpi)?;
        if text.face_count() == 0 {
            tracing::warn!("no fonts available, chart text will be blank");
        }
        Ok(Self {
            style,
            layout,
            text,
            static_overlay: None,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.layout.canvas
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    /// Draw `frame` into premultiplied RGBA8.
    pub fn render_rgba(&mut self, frame: &FrameSpec) -> YoyResult<FrameRGBA> {
        let Canvas { width, height } = self.layout.canvas;
        let w: u16 = width
            .try_into()
            .map_err(|_| YoyError::render("canvas width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| YoyError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        self.draw_axes(&mut ctx);
        for trace in &frame.traces {
            self.draw_trace(&mut ctx, trace);
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        let mut data = pixmap.data_as_u8_slice().to_vec();

        over_in_place(&mut data, self.static_overlay()?)?;
        let subtitle = self.subtitle_overlay(frame.date_label)?;
        over_in_place(&mut data, &subtitle)?;

        Ok(FrameRGBA {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    fn draw_axes(&self, ctx: &mut vello_cpu::RenderContext) {
        let plot = self.layout.plot;
        let canvas = self.layout.canvas;

        set_color(ctx, self.style.background, 1.0);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(canvas.width),
            f64::from(canvas.height),
        ));

        let half = self.layout.pt(GRID_WIDTH_PT) / 2.0;
        set_color(ctx, self.style.muted, GRID_ALPHA);
        for day in self.layout.grid_days() {
            let x = self.layout.to_px(day, 0.0).x;
            ctx.fill_rect(&rect_to_cpu(Rect::new(x - half, plot.y0, x + half, plot.y1)));
        }
        for value in self.layout.grid_values() {
            let y = self.layout.to_px(0.0, value).y;
            ctx.fill_rect(&rect_to_cpu(Rect::new(plot.x0, y - half, plot.x1, y + half)));
        }

        let spine = self.layout.pt(SPINE_WIDTH_PT) / 2.0;
        set_color(ctx, self.style.muted, 1.0);
        ctx.fill_rect(&rect_to_cpu(Rect::new(
            plot.x0,
            plot.y1 - spine,
            plot.x1,
            plot.y1 + spine,
        )));
    }

    fn draw_trace(&self, ctx: &mut vello_cpu::RenderContext, trace: &Trace) {
        if trace.len() < 2 || trace.alpha <= 0.0 {
            return;
        }
        let path = self.layout.polyline(trace.points());
        if path.elements().is_empty() {
            return;
        }
        let stroke = Stroke::new(self.layout.pt(self.style.line_width_pt))
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        let outline = kurbo::stroke(
            path.iter(),
            &stroke,
            &StrokeOpts::default(),
            STROKE_TOLERANCE,
        );
        set_color(ctx, trace.color, trace.alpha);
        ctx.fill_path(&bezpath_to_cpu(&outline));
    }

    fn static_overlay(&mut self) -> YoyResult<&[u8]> {
        if self.static_overlay.is_none() {
            let svg = svg_document(
                self.layout.canvas,
                &self.style.font_family,
                &self.static_runs(),
            );
            let pixels = self.text.rasterize(&svg, self.layout.canvas)?;
            tracing::debug!("rasterized static chart text");
            self.static_overlay = Some(pixels);
        }
        self.static_overlay
            .as_deref()
            .ok_or_else(|| YoyError::render("static text overlay missing"))
    }

    fn subtitle_overlay(&self, date: Option<NaiveDate>) -> YoyResult<Vec<u8>> {
        let text = match date {
            Some(d) => format!("{} {}", self.style.subtitle, d.format("%Y-%m-%d")),
            None => self.style.subtitle.clone(),
        };
        let p = self.layout.axes_fraction(0.001, 1.1);
        let run = TextRun::new(text, p.x, p.y, self.layout.pt(12.0), self.style.text)
            .weight(300)
            .top();
        let svg = svg_document(self.layout.canvas, &self.style.font_family, &[run]);
        self.text.rasterize(&svg, self.layout.canvas)
    }

    fn static_runs(&self) -> Vec<TextRun> {
        let l = &self.layout;
        let s = &self.style;
        let mut runs = Vec::new();

        let p = l.axes_fraction(0.0, 1.2);
        runs.push(
            TextRun::new(s.title.clone(), p.x, p.y, l.pt(22.0), s.foreground)
                .weight(700)
                .top(),
        );

        let label_y = l.plot.y1 + l.pt(TICK_PAD_PT);
        for (name, day) in MONTHS.iter().zip(l.month_ticks()) {
            let x = l.to_px(day, 0.0).x + l.inch(MONTH_LABEL_OFFSET_IN);
            runs.push(
                TextRun::new(*name, x, label_y, l.pt(13.0), s.muted)
                    .weight(300)
                    .anchor(Anchor::Middle)
                    .top(),
            );
        }

        let size = l.pt(10.0);
        for value in l.value_ticks() {
            let y = l.to_px(0.0, value).y + size * 0.35;
            let x = l.plot.x0 - l.pt(TICK_PAD_PT);
            runs.push(
                TextRun::new(format!("{value:.0}"), x, y, size, s.muted)
                    .weight(300)
                    .anchor(Anchor::End),
            );
        }

        let p = l.axes_fraction(0.0, 0.5);
        runs.push(
            TextRun::new(s.y_label.clone(), p.x - l.inch(0.3), p.y, size, s.text)
                .weight(300)
                .anchor(Anchor::Middle)
                .rotate(-90.0),
        );

        for (heading, fx, fy) in [
            ("DATA:", 0.0, -0.13),
            ("SOURCE:", 0.0, -0.18),
            ("GRAPHIC:", 0.82, -0.13),
        ] {
            let p = l.axes_fraction(fx, fy);
            runs.push(
                TextRun::new(heading, p.x, p.y, l.pt(8.0), s.text)
                    .weight(700)
                    .top(),
            );
        }
        for (credit, fx, fy) in [
            (&s.data_credit, 0.05, -0.13),
            (&s.source_credit, 0.07, -0.18),
            (&s.graphic_credit, 0.89, -0.13),
        ] {
            let p = l.axes_fraction(fx, fy);
            runs.push(
                TextRun::new(credit.clone(), p.x, p.y, l.pt(7.0), s.muted)
                    .weight(300)
                    .top(),
            );
        }
        runs
    }
}

impl FrameRenderer for CpuChartRenderer {
    #[tracing::instrument(skip_all, fields(frame = frame.index.0))]
    fn render_frame(&mut self, frame: &FrameSpec, out_path: &Path) -> YoyResult<()> {
        let rgba = self.render_rgba(frame)?;
        write_png(out_path, rgba)
    }
}

/// Write a frame as a straight-alpha PNG.
pub fn write_png(path: &Path, mut frame: FrameRGBA) -> YoyResult<()> {
    if frame.premultiplied {
        unpremultiply_in_place(&mut frame.data);
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| YoyError::render(format!("write png '{}': {e}", path.display())))
}

fn set_color(ctx: &mut vello_cpu::RenderContext, color: Rgba, opacity: f64) {
    let [r, g, b, a] = color.to_rgba8(opacity);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

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

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
