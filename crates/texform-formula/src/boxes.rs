// this_file: crates/texform-formula/src/boxes.rs

//! Laid-out boxes and their painting.
//!
//! Metrics are in em. A box is painted with its reference point on the baseline at its left
//! edge; `height` extends up from the baseline and `depth` down. Inside a horizontal box a
//! child's `shift` moves it down, inside a vertical box it moves it right.

use crate::constants::Alignment;
use crate::font::GlyphShape;
use texform_core::{
    Arc, Color, Graphics2D, Line, LineCap, Rect, RoundRect, StateGuard, Stroke,
};

#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    /// Invisible spacing.
    Strut,
    Glyph {
        ch: char,
        shape: GlyphShape,
        thickness: f32,
    },
    /// Solid rectangle covering the box.
    Rule,
    /// Children side by side; `breaks` holds child indices a line may start at.
    Horizontal {
        children: Vec<TexBox>,
        breaks: Vec<usize>,
    },
    /// Children stacked top to bottom.
    Vertical { children: Vec<TexBox> },
    RadicalSign { thickness: f32 },
    Framed {
        base: Box<TexBox>,
        thickness: f32,
        space: f32,
    },
    Oval {
        base: Box<TexBox>,
        thickness: f32,
        space: f32,
    },
    Circled {
        base: Box<TexBox>,
        thickness: f32,
    },
    /// `base` rotated around its reference point, which sits `x_offset` from the left edge.
    Rotated {
        base: Box<TexBox>,
        radians: f32,
        x_offset: f32,
    },
    Scaled { base: Box<TexBox>, x: f32, y: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TexBox {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub shift: f32,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub kind: BoxKind,
}

impl TexBox {
    fn with_kind(kind: BoxKind, width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            shift: 0.0,
            foreground: None,
            background: None,
            kind,
        }
    }

    pub fn strut(width: f32, height: f32, depth: f32) -> Self {
        Self::with_kind(BoxKind::Strut, width, height, depth)
    }

    /// Horizontal kern.
    pub fn kern(width: f32) -> Self {
        Self::strut(width, 0.0, 0.0)
    }

    pub fn empty() -> Self {
        Self::strut(0.0, 0.0, 0.0)
    }

    pub fn glyph(ch: char, width: f32, height: f32, depth: f32, thickness: f32) -> Self {
        Self::with_kind(
            BoxKind::Glyph {
                ch,
                shape: GlyphShape::of(ch),
                thickness,
            },
            width,
            height,
            depth,
        )
    }

    pub fn rule(width: f32, height: f32, depth: f32) -> Self {
        Self::with_kind(BoxKind::Rule, width, height, depth)
    }

    pub fn horizontal(children: Vec<TexBox>) -> Self {
        Self::horizontal_with_breaks(children, Vec::new())
    }

    pub fn horizontal_with_breaks(children: Vec<TexBox>, breaks: Vec<usize>) -> Self {
        let width = children.iter().map(|c| c.width).sum();
        let height = children
            .iter()
            .map(|c| c.height - c.shift)
            .reduce(f32::max)
            .unwrap_or(0.0);
        let depth = children
            .iter()
            .map(|c| c.depth + c.shift)
            .reduce(f32::max)
            .unwrap_or(0.0);
        Self::with_kind(BoxKind::Horizontal { children, breaks }, width, height, depth)
    }

    /// Stack `children`; the baseline sits `height` below the top edge.
    pub fn vertical(children: Vec<TexBox>, height: f32) -> Self {
        let total: f32 = children.iter().map(|c| c.height + c.depth).sum();
        let width = children
            .iter()
            .map(|c| c.width + c.shift)
            .fold(0.0_f32, f32::max);
        Self::with_kind(BoxKind::Vertical { children }, width, height, total - height)
    }

    pub fn radical_sign(width: f32, height: f32, depth: f32, thickness: f32) -> Self {
        Self::with_kind(BoxKind::RadicalSign { thickness }, width, height, depth)
    }

    pub fn framed(base: TexBox, thickness: f32, space: f32) -> Self {
        let pad = thickness + space;
        let (w, h, d) = (base.width + 2.0 * pad, base.height + pad, base.depth + pad);
        Self::with_kind(
            BoxKind::Framed {
                base: Box::new(base),
                thickness,
                space,
            },
            w,
            h,
            d,
        )
    }

    pub fn oval(base: TexBox, thickness: f32, space: f32) -> Self {
        let pad = thickness + space;
        let (w, h, d) = (base.width + 2.0 * pad, base.height + pad, base.depth + pad);
        Self::with_kind(
            BoxKind::Oval {
                base: Box::new(base),
                thickness,
                space,
            },
            w,
            h,
            d,
        )
    }

    pub fn circled(base: TexBox, thickness: f32, space: f32) -> Self {
        let diameter = base.width.max(base.height + base.depth) + 2.0 * (space + thickness);
        let center = (base.height - base.depth) / 2.0;
        let (h, d) = (center + diameter / 2.0, diameter / 2.0 - center);
        Self::with_kind(
            BoxKind::Circled {
                base: Box::new(base),
                thickness,
            },
            diameter,
            h,
            d,
        )
    }

    /// Rotate counter-clockwise by `degrees`.
    pub fn rotated(base: TexBox, degrees: f32) -> Self {
        // Screen space has y pointing down, so a visual counter-clockwise turn is negative.
        let radians = -degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        let corners = [
            (0.0, -base.height),
            (base.width, -base.height),
            (0.0, base.depth),
            (base.width, base.depth),
        ];
        let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for (x, y) in corners {
            let (rx, ry) = (x * cos - y * sin, x * sin + y * cos);
            x0 = x0.min(rx);
            x1 = x1.max(rx);
            y0 = y0.min(ry);
            y1 = y1.max(ry);
        }
        Self::with_kind(
            BoxKind::Rotated {
                base: Box::new(base),
                radians,
                x_offset: -x0,
            },
            x1 - x0,
            -y0,
            y1,
        )
    }

    pub fn scaled(base: TexBox, x: f32, y: f32) -> Self {
        let width = base.width * x.abs();
        let (height, depth) = if y >= 0.0 {
            (base.height * y, base.depth * y)
        } else {
            (base.depth * -y, base.height * -y)
        };
        Self::with_kind(
            BoxKind::Scaled {
                base: Box::new(base),
                x,
                y,
            },
            width,
            height,
            depth,
        )
    }

    /// Place `inner` in a box `width` wide.
    ///
    /// Narrower content is padded according to `align`; wider content is returned as is.
    pub fn aligned(inner: TexBox, width: f32, align: Alignment) -> Self {
        let rest = width - inner.width;
        if rest <= 0.0 {
            return TexBox::horizontal(vec![inner]);
        }
        let children = match align {
            Alignment::Left => vec![inner, TexBox::kern(rest)],
            Alignment::Right => vec![TexBox::kern(rest), inner],
            Alignment::Center => vec![TexBox::kern(rest / 2.0), inner, TexBox::kern(rest / 2.0)],
        };
        TexBox::horizontal(children)
    }

    pub fn with_shift(mut self, shift: f32) -> Self {
        self.shift = shift;
        self
    }

    pub fn total_height(&self) -> f32 {
        self.height + self.depth
    }

    pub fn children(&self) -> &[TexBox] {
        match &self.kind {
            BoxKind::Horizontal { children, .. } | BoxKind::Vertical { children } => children,
            _ => &[],
        }
    }

    /// Paint with the reference point at `(x, y)`.
    pub fn paint(&self, g: &mut dyn Graphics2D, x: f32, y: f32) {
        let mut guard = StateGuard::new(g);
        let g = guard.graphics();
        if let Some(bg) = self.background {
            let fg = g.color();
            g.set_color(bg);
            g.fill_rect(Rect::new(x, y - self.height, self.width, self.total_height()));
            g.set_color(fg);
        }
        if let Some(fg) = self.foreground {
            g.set_color(fg);
        }
        self.paint_kind(g, x, y);
    }

    fn paint_kind(&self, g: &mut dyn Graphics2D, x: f32, y: f32) {
        match &self.kind {
            BoxKind::Strut => {}
            BoxKind::Glyph {
                shape, thickness, ..
            } => self.paint_glyph(g, *shape, *thickness, x, y),
            BoxKind::Rule => {
                g.fill_rect(Rect::new(x, y - self.height, self.width, self.total_height()))
            }
            BoxKind::Horizontal { children, .. } => {
                let mut cursor = x;
                for child in children {
                    child.paint(g, cursor, y + child.shift);
                    cursor += child.width;
                }
            }
            BoxKind::Vertical { children } => {
                let mut cursor = y - self.height;
                for child in children {
                    cursor += child.height;
                    child.paint(g, x + child.shift, cursor);
                    cursor += child.depth;
                }
            }
            BoxKind::RadicalSign { thickness } => {
                g.set_stroke(Stroke::new(*thickness).with_cap(LineCap::Round));
                let top = y - self.height + thickness / 2.0;
                let bottom = y + self.depth;
                let knee = x + self.width * 0.35;
                g.draw_line(Line::new(x, bottom - self.total_height() * 0.4, knee, bottom));
                g.draw_line(Line::new(knee, bottom, x + self.width, top));
            }
            BoxKind::Framed {
                base,
                thickness,
                space,
            } => {
                let half = thickness / 2.0;
                g.set_stroke(Stroke::new(*thickness));
                g.draw_rect(Rect::new(
                    x + half,
                    y - self.height + half,
                    self.width - thickness,
                    self.total_height() - thickness,
                ));
                base.paint(g, x + thickness + space, y);
            }
            BoxKind::Oval {
                base,
                thickness,
                space,
            } => {
                let half = thickness / 2.0;
                let (w, h) = (self.width - thickness, self.total_height() - thickness);
                let arc = 0.5 * w.min(h);
                g.set_stroke(Stroke::new(*thickness));
                g.draw_round_rect(RoundRect::new(x + half, y - self.height + half, w, h, arc, arc));
                base.paint(g, x + thickness + space, y);
            }
            BoxKind::Circled { base, thickness } => {
                let half = thickness / 2.0;
                g.set_stroke(Stroke::new(*thickness));
                g.draw_arc(Arc::ellipse(
                    x + half,
                    y - self.height + half,
                    self.width - thickness,
                    self.total_height() - thickness,
                ));
                base.paint(g, x + (self.width - base.width) / 2.0, y);
            }
            BoxKind::Rotated {
                base,
                radians,
                x_offset,
            } => {
                let (px, py) = (x + x_offset, y);
                g.rotate(*radians as f64, px as f64, py as f64);
                base.paint(g, px, py);
            }
            BoxKind::Scaled { base, x: sx, y: sy } => {
                let dx = if *sx < 0.0 { self.width } else { 0.0 };
                g.translate((x + dx) as f64, y as f64);
                g.scale(*sx as f64, *sy as f64);
                base.paint(g, 0.0, 0.0);
            }
        }
    }

    fn paint_glyph(&self, g: &mut dyn Graphics2D, shape: GlyphShape, thickness: f32, x: f32, y: f32) {
        let (w, h, d) = (self.width, self.height, self.depth);
        if w <= 0.0 || h + d <= 0.0 {
            return;
        }
        let top = y - h;
        let mid = y - (h - d) / 2.0;
        let (left, right) = (x + 0.1 * w, x + 0.9 * w);
        g.set_stroke(Stroke::new(thickness * 1.5).with_cap(LineCap::Butt));
        match shape {
            GlyphShape::Plus => {
                let cx = x + w / 2.0;
                let arm = (right - left) / 2.0;
                g.draw_line(Line::new(left, mid, right, mid));
                g.draw_line(Line::new(cx, mid - arm, cx, mid + arm));
            }
            GlyphShape::Minus => g.draw_line(Line::new(left, mid, right, mid)),
            GlyphShape::Times => {
                let arm = (right - left) / 2.0 * 0.8;
                let cx = x + w / 2.0;
                g.draw_line(Line::new(cx - arm, mid - arm, cx + arm, mid + arm));
                g.draw_line(Line::new(cx - arm, mid + arm, cx + arm, mid - arm));
            }
            GlyphShape::Equals => {
                let gap = (h + d) * 0.3;
                g.draw_line(Line::new(left, mid - gap, right, mid - gap));
                g.draw_line(Line::new(left, mid + gap, right, mid + gap));
            }
            GlyphShape::Slash => g.draw_line(Line::new(left, y + d, right, top)),
            GlyphShape::Bar => {
                let cx = x + w / 2.0;
                g.draw_line(Line::new(cx, top, cx, y + d));
            }
            GlyphShape::Dot => {
                let r = (w * 0.25).min(0.08);
                g.fill_arc(Arc::ellipse(x + w / 2.0 - r, y - 2.0 * r, 2.0 * r, 2.0 * r));
            }
            GlyphShape::Block => g.fill_rect(Rect::new(left, top + 0.1 * h, right - left, 0.9 * h + d)),
        }
    }
}
