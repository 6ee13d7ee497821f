// this_file: backends/texform-skia/src/lib.rs

//! tiny-skia backend: paints [`Graphics2D`] calls onto a pixmap.

use kurbo::{PathEl, Shape};
use texform_core::{
    AffineTransform, Arc, Color, Graphics2D, LineCap, LineJoin, Line, Rect, RenderSurface,
    Result, RoundRect, Stroke, TexError,
};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, PixmapMut, Transform};

/// Curve flattening tolerance, in user units.
const TOLERANCE: f64 = 0.01;

/// Allocate an offscreen pixmap, rejecting empty sizes.
pub fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| TexError::render(format!("Failed to create {width}x{height} pixmap")))
}

/// Wrap a finished pixmap for encoding.
pub fn into_surface(pixmap: Pixmap) -> RenderSurface {
    let (width, height) = (pixmap.width(), pixmap.height());
    RenderSurface::from_rgba(width, height, pixmap.take(), true)
}

/// Drawing surface over a borrowed pixmap.
///
/// Calls are executed immediately; there is no display list.
pub struct SkiaGraphics<'a> {
    pixmap: PixmapMut<'a>,
    color: Color,
    stroke: Stroke,
    transform: AffineTransform,
}

impl<'a> SkiaGraphics<'a> {
    pub fn new(pixmap: &'a mut Pixmap) -> Self {
        Self {
            pixmap: pixmap.as_mut(),
            color: Color::BLACK,
            stroke: Stroke::default(),
            transform: AffineTransform::IDENTITY,
        }
    }

    /// Fill the whole pixmap, ignoring the current transform.
    pub fn clear(&mut self, color: Color) {
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, 255));
    }

    fn paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(self.color.r, self.color.g, self.color.b, 255);
        paint.anti_alias = true;
        paint
    }

    fn skia_transform(&self) -> Transform {
        let t = &self.transform;
        Transform::from_row(
            t.sx as f32,
            t.ky as f32,
            t.kx as f32,
            t.sy as f32,
            t.tx as f32,
            t.ty as f32,
        )
    }

    fn skia_stroke(&self) -> tiny_skia::Stroke {
        tiny_skia::Stroke {
            width: self.stroke.width,
            miter_limit: self.stroke.miter_limit,
            line_cap: match self.stroke.cap {
                LineCap::Butt => tiny_skia::LineCap::Butt,
                LineCap::Round => tiny_skia::LineCap::Round,
                LineCap::Square => tiny_skia::LineCap::Square,
            },
            line_join: match self.stroke.join {
                LineJoin::Miter => tiny_skia::LineJoin::Miter,
                LineJoin::Round => tiny_skia::LineJoin::Round,
                LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
            },
            dash: None,
        }
    }

    fn fill(&mut self, path: Option<Path>) {
        let Some(path) = path else {
            log::trace!(target: "texform::skia", "skipping degenerate fill");
            return;
        };
        let paint = self.paint();
        let transform = self.skia_transform();
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, transform, None);
    }

    fn outline(&mut self, path: Option<Path>) {
        let Some(path) = path else {
            log::trace!(target: "texform::skia", "skipping degenerate stroke");
            return;
        };
        let paint = self.paint();
        let stroke = self.skia_stroke();
        let transform = self.skia_transform();
        self.pixmap
            .stroke_path(&path, &paint, &stroke, transform, None);
    }
}

fn rect_path(rect: Rect) -> Option<Path> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.w, rect.h).map(PathBuilder::from_rect)
}

fn append_elements(builder: &mut PathBuilder, elements: impl IntoIterator<Item = PathEl>) {
    for el in elements {
        match el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => builder.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(p1, p2, p) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
}

fn round_rect_path(rect: RoundRect) -> Option<Path> {
    let radius = (rect.arc_w.min(rect.arc_h) / 2.0).max(0.0) as f64;
    let shape = kurbo::RoundedRect::new(
        rect.x as f64,
        rect.y as f64,
        (rect.x + rect.w) as f64,
        (rect.y + rect.h) as f64,
        radius,
    );
    let mut builder = PathBuilder::new();
    append_elements(&mut builder, shape.path_elements(TOLERANCE));
    builder.finish()
}

/// Screen angles turn counter-clockwise while the y axis points down, hence the negation.
fn kurbo_arc(arc: Arc) -> kurbo::Arc {
    let rx = arc.w as f64 / 2.0;
    let ry = arc.h as f64 / 2.0;
    kurbo::Arc {
        center: kurbo::Point::new(arc.x as f64 + rx, arc.y as f64 + ry),
        radii: kurbo::Vec2::new(rx, ry),
        start_angle: -(arc.start as f64).to_radians(),
        sweep_angle: -(arc.extent as f64).to_radians(),
        x_rotation: 0.0,
    }
}

fn arc_path(arc: Arc, pie: bool) -> Option<Path> {
    let shape = kurbo_arc(arc);
    let mut builder = PathBuilder::new();
    if pie {
        let start = shape.center
            + kurbo::Vec2::new(
                shape.radii.x * shape.start_angle.cos(),
                shape.radii.y * shape.start_angle.sin(),
            );
        builder.move_to(shape.center.x as f32, shape.center.y as f32);
        builder.line_to(start.x as f32, start.y as f32);
        append_elements(&mut builder, shape.append_iter(TOLERANCE));
        builder.close();
    } else {
        append_elements(&mut builder, shape.path_elements(TOLERANCE));
    }
    builder.finish()
}

impl Graphics2D for SkiaGraphics<'_> {
    fn name(&self) -> &str {
        "tiny-skia"
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
        self.fill(rect_path(rect));
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.outline(rect_path(rect));
    }

    fn fill_round_rect(&mut self, rect: RoundRect) {
        self.fill(round_rect_path(rect));
    }

    fn draw_round_rect(&mut self, rect: RoundRect) {
        self.outline(round_rect_path(rect));
    }

    fn draw_line(&mut self, line: Line) {
        let mut builder = PathBuilder::new();
        builder.move_to(line.x1, line.y1);
        builder.line_to(line.x2, line.y2);
        self.outline(builder.finish());
    }

    fn fill_arc(&mut self, arc: Arc) {
        self.fill(arc_path(arc, true));
    }

    fn draw_arc(&mut self, arc: Arc) {
        self.outline(arc_path(arc, false));
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

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let p = pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn test_backend_creation() {
        let mut pixmap = new_pixmap(4, 4).unwrap();
        let g = SkiaGraphics::new(&mut pixmap);
        assert_eq!(g.name(), "tiny-skia");
        assert_eq!(g.color(), Color::BLACK);
    }

    #[test]
    fn test_empty_pixmap_rejected() {
        assert!(new_pixmap(0, 10).is_err());
    }

    #[test]
    fn test_fill_rect_is_opaque() {
        let mut pixmap = new_pixmap(10, 10).unwrap();
        {
            let mut g = SkiaGraphics::new(&mut pixmap);
            g.set_color(Color::RED);
            g.fill_rect(Rect::new(2.0, 2.0, 4.0, 4.0));
        }
        assert_eq!(pixel(&pixmap, 3, 3), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, 8, 8), [0, 0, 0, 0]);
    }

    #[test]
    fn test_transform_applies_to_geometry() {
        let mut pixmap = new_pixmap(20, 20).unwrap();
        {
            let mut g = SkiaGraphics::new(&mut pixmap);
            g.translate(10.0, 10.0);
            g.scale(2.0, 2.0);
            g.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
        }
        assert_eq!(pixel(&pixmap, 12, 12)[3], 255);
        assert_eq!(pixel(&pixmap, 5, 5)[3], 0);
    }

    #[test]
    fn test_transform_snapshot_does_not_alias() {
        let mut pixmap = new_pixmap(4, 4).unwrap();
        let mut g = SkiaGraphics::new(&mut pixmap);
        let mut snapshot = g.transform();
        snapshot.scale(5.0, 5.0);
        assert_eq!(g.transform(), AffineTransform::IDENTITY);
        g.set_transform(snapshot);
        assert_eq!(g.transform().scale_x(), 5.0);
    }

    #[test]
    fn test_fill_arc_covers_center() {
        let mut pixmap = new_pixmap(20, 20).unwrap();
        {
            let mut g = SkiaGraphics::new(&mut pixmap);
            g.fill_arc(Arc::ellipse(2.0, 2.0, 16.0, 16.0));
        }
        assert_eq!(pixel(&pixmap, 10, 10)[3], 255);
        assert_eq!(pixel(&pixmap, 0, 0)[3], 0);
    }

    #[test]
    fn test_quarter_pie_lands_in_upper_right() {
        let mut pixmap = new_pixmap(20, 20).unwrap();
        {
            let mut g = SkiaGraphics::new(&mut pixmap);
            g.fill_arc(Arc::new(0.0, 0.0, 20.0, 20.0, 0.0, 90.0));
        }
        assert_eq!(pixel(&pixmap, 15, 5)[3], 255);
        assert_eq!(pixel(&pixmap, 5, 15)[3], 0);
    }

    #[test]
    fn test_clear_fills_everything() {
        let mut pixmap = new_pixmap(3, 3).unwrap();
        SkiaGraphics::new(&mut pixmap).clear(Color::WHITE);
        assert_eq!(pixel(&pixmap, 2, 2), [255, 255, 255, 255]);
    }
}
