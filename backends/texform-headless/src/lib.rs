// this_file: backends/texform-headless/src/lib.rs

//! Headless backend that records drawing calls instead of rasterizing them.
//!
//! Layout code paints onto it exactly as it would onto a pixmap, which makes it the natural
//! test double for placement checks.

use texform_core::{AffineTransform, Arc, Color, Graphics2D, Line, Rect, RoundRect, Stroke};

/// One recorded primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    FillRect(Rect),
    DrawRect(Rect),
    FillRoundRect(RoundRect),
    DrawRoundRect(RoundRect),
    Line(Line),
    FillArc(Arc),
    DrawArc(Arc),
}

impl DrawOp {
    /// Bounding box in user space as `(x0, y0, x1, y1)`.
    pub fn user_bounds(&self) -> (f64, f64, f64, f64) {
        let (x, y, w, h) = match *self {
            DrawOp::FillRect(r) | DrawOp::DrawRect(r) => (r.x, r.y, r.w, r.h),
            DrawOp::FillRoundRect(r) | DrawOp::DrawRoundRect(r) => (r.x, r.y, r.w, r.h),
            DrawOp::FillArc(a) | DrawOp::DrawArc(a) => (a.x, a.y, a.w, a.h),
            DrawOp::Line(l) => (
                l.x1.min(l.x2),
                l.y1.min(l.y2),
                (l.x2 - l.x1).abs(),
                (l.y2 - l.y1).abs(),
            ),
        };
        (x as f64, y as f64, (x + w) as f64, (y + h) as f64)
    }
}

/// A primitive together with the drawing state it was issued under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub op: DrawOp,
    pub color: Color,
    pub stroke: Stroke,
    pub transform: AffineTransform,
}

impl DrawCommand {
    /// Bounding box on the device, as `(x0, y0, x1, y1)`.
    pub fn device_bounds(&self) -> (f64, f64, f64, f64) {
        let (x0, y0, x1, y1) = self.op.user_bounds();
        let corners = [
            self.transform.map_point(x0, y0),
            self.transform.map_point(x1, y0),
            self.transform.map_point(x0, y1),
            self.transform.map_point(x1, y1),
        ];
        corners.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(ax0, ay0, ax1, ay1), &(x, y)| (ax0.min(x), ay0.min(y), ax1.max(x), ay1.max(y)),
        )
    }
}

/// Surface that keeps every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingGraphics {
    commands: Vec<DrawCommand>,
    color: Color,
    stroke: Stroke,
    transform: AffineTransform,
}

impl RecordingGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Union of the device bounds of all commands, if anything was drawn.
    pub fn device_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.commands
            .iter()
            .map(DrawCommand::device_bounds)
            .reduce(|(ax0, ay0, ax1, ay1), (x0, y0, x1, y1)| {
                (ax0.min(x0), ay0.min(y0), ax1.max(x1), ay1.max(y1))
            })
    }

    fn record(&mut self, op: DrawOp) {
        self.commands.push(DrawCommand {
            op,
            color: self.color,
            stroke: self.stroke,
            transform: self.transform,
        });
    }
}

impl Graphics2D for RecordingGraphics {
    fn name(&self) -> &str {
        "headless"
    }

    fn stroke(&self) -> Stroke {
        self.stroke
    }

    fn set_stroke(&mut self, stroke: Stroke) {
        self.stroke = stroke;
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.record(DrawOp::FillRect(rect));
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.record(DrawOp::DrawRect(rect));
    }

    fn fill_round_rect(&mut self, rect: RoundRect) {
        self.record(DrawOp::FillRoundRect(rect));
    }

    fn draw_round_rect(&mut self, rect: RoundRect) {
        self.record(DrawOp::DrawRoundRect(rect));
    }

    fn draw_line(&mut self, line: Line) {
        self.record(DrawOp::Line(line));
    }

    fn fill_arc(&mut self, arc: Arc) {
        self.record(DrawOp::FillArc(arc));
    }

    fn draw_arc(&mut self, arc: Arc) {
        self.record(DrawOp::DrawArc(arc));
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform.translate(x, y);
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.transform.scale(x, y);
    }

    fn rotate(&mut self, theta: f64, x: f64, y: f64) {
        self.transform.rotate_about(theta, x, y);
    }

    fn transform(&self) -> AffineTransform {
        self.transform
    }

    fn set_transform(&mut self, transform: AffineTransform) {
        self.transform = transform;
    }
}
