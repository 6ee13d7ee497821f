// this_file: backends/texform-core/src/graphics.rs

//! The drawing capability surface that box painting is written against.

use crate::types::{AffineTransform, Arc, Color, Line, Rect, RoundRect, Stroke};

/// Minimal 2D drawing surface.
///
/// Implementations translate every call one-to-one onto a concrete surface. All geometry is
/// expressed in the current user space, i.e. it is mapped through [`Graphics2D::transform`]
/// before it reaches device pixels. A surface is owned by one painter at a time; nothing
/// here is meant to be shared across threads.
pub trait Graphics2D {
    /// Name of the backend, for diagnostics.
    fn name(&self) -> &str;

    fn stroke(&self) -> Stroke;

    fn set_stroke(&mut self, stroke: Stroke);

    fn color(&self) -> Color;

    fn set_color(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect);

    fn draw_rect(&mut self, rect: Rect);

    fn fill_round_rect(&mut self, rect: RoundRect);

    fn draw_round_rect(&mut self, rect: RoundRect);

    fn draw_line(&mut self, line: Line);

    /// Fill the pie wedge bounded by `arc` and its center.
    fn fill_arc(&mut self, arc: Arc);

    fn draw_arc(&mut self, arc: Arc);

    fn translate(&mut self, x: f64, y: f64);

    fn scale(&mut self, x: f64, y: f64);

    /// Rotate by `theta` radians around `(x, y)`.
    fn rotate(&mut self, theta: f64, x: f64, y: f64);

    /// Snapshot of the current transform.
    fn transform(&self) -> AffineTransform;

    fn set_transform(&mut self, transform: AffineTransform);
}

/// Restores the color, stroke and transform of a surface when dropped.
///
/// Painting code takes one of these before changing state so that every exit path leaves the
/// surface the way it found it.
pub struct StateGuard<'g> {
    graphics: &'g mut dyn Graphics2D,
    color: Color,
    stroke: Stroke,
    transform: AffineTransform,
}

impl<'g> StateGuard<'g> {
    pub fn new(graphics: &'g mut dyn Graphics2D) -> Self {
        let color = graphics.color();
        let stroke = graphics.stroke();
        let transform = graphics.transform();
        Self {
            graphics,
            color,
            stroke,
            transform,
        }
    }

    pub fn graphics(&mut self) -> &mut dyn Graphics2D {
        &mut *self.graphics
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.graphics.set_transform(self.transform);
        self.graphics.set_stroke(self.stroke);
        self.graphics.set_color(self.color);
    }
}
