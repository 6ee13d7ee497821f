// this_file: crates/texform-formula/src/builder.rs

//! Fluent construction of [`TexIcon`]s from a formula.

use crate::boxes::TexBox;
use crate::constants::{Alignment, FontType, Length, TexStyle, Unit};
use crate::diagnostics::BuildDiagnostics;
use crate::environment::Environment;
use crate::font::TexFont;
use crate::formula::Formula;
use crate::icon::TexIcon;
use crate::linebreak;
use serde::{Deserialize, Serialize};
use texform_core::{Color, Result, TexError};

/// Largest scale a build accepts, so that pixel sizes stay representable.
pub const MAX_PIXELS_PER_EM: f64 = 1.0e6;

/// Requested width and placement of the content inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthConstraint {
    pub length: Length,
    pub align: Alignment,
    /// Use the content's own width (after line breaking) instead of the requested one.
    pub is_max_width: bool,
}

/// Everything a build needs; style and size are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub style: Option<TexStyle>,
    pub size: Option<f32>,
    pub font_type: Option<FontType>,
    pub foreground: Option<Color>,
    pub true_values: bool,
    pub width: Option<WidthConstraint>,
    pub interline: Option<Length>,
    pub pixels_per_point: f32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            style: None,
            size: None,
            font_type: None,
            foreground: None,
            true_values: false,
            width: None,
            interline: None,
            pixels_per_point: 1.0,
        }
    }
}

impl BuildConfig {
    /// Check required fields, returning the resolved style and size.
    pub fn validate(&self) -> Result<(TexStyle, f32)> {
        let style = self
            .style
            .ok_or_else(|| TexError::configuration("A style is required. Use style()"))?;
        let size = self
            .size
            .ok_or_else(|| TexError::configuration("A size is required. Use size()"))?;
        if !size.is_finite() || size <= 0.0 {
            return Err(TexError::configuration(format!(
                "Size must be positive, got {size}"
            )));
        }
        if !self.pixels_per_point.is_finite() || self.pixels_per_point <= 0.0 {
            return Err(TexError::configuration(format!(
                "Pixels per point must be positive, got {}",
                self.pixels_per_point
            )));
        }
        let pixels_per_em = size as f64 * self.pixels_per_point as f64;
        if pixels_per_em > MAX_PIXELS_PER_EM {
            return Err(TexError::configuration(format!(
                "Size {size} at {} pixels per point exceeds {MAX_PIXELS_PER_EM} pixels per em",
                self.pixels_per_point
            )));
        }
        if let Some(width) = &self.width {
            if !width.length.value.is_finite() || width.length.value < 0.0 {
                return Err(TexError::configuration(format!(
                    "Width must be non-negative, got {}",
                    width.length.value
                )));
            }
        }
        Ok((style, size))
    }
}

/// Builder for icons of one formula. Consumed by [`IconBuilder::build`].
#[derive(Debug, Clone)]
pub struct IconBuilder<'f, 'r> {
    formula: &'f Formula<'r>,
    config: BuildConfig,
}

impl<'f, 'r> IconBuilder<'f, 'r> {
    pub fn new(formula: &'f Formula<'r>) -> Self {
        Self {
            formula,
            config: BuildConfig::default(),
        }
    }

    pub fn style(mut self, style: TexStyle) -> Self {
        self.config.style = Some(style);
        self
    }

    /// Point size of the default font.
    pub fn size(mut self, size: f32) -> Self {
        self.config.size = Some(size);
        self
    }

    pub fn font_type(mut self, font_type: FontType) -> Self {
        self.config.font_type = Some(font_type);
        self
    }

    pub fn foreground(mut self, color: Color) -> Self {
        self.config.foreground = Some(color);
        self
    }

    /// Report exact box dimensions instead of padding the icon.
    pub fn true_values(mut self, true_values: bool) -> Self {
        self.config.true_values = true_values;
        self
    }

    /// Constrain the width. Also switches true values on.
    pub fn width(mut self, unit: Unit, value: f32, align: Alignment) -> Self {
        self.config.width = Some(WidthConstraint {
            length: Length::new(unit, value),
            align,
            is_max_width: false,
        });
        self.config.true_values = true;
        self
    }

    /// Shrink the box to the content width. Forces left alignment when set.
    pub fn is_max_width(mut self, is_max_width: bool) -> Result<Self> {
        let width = self.config.width.as_mut().ok_or_else(|| {
            TexError::configuration("Cannot set 'is_max_width' without having specified a width")
        })?;
        if is_max_width {
            width.align = Alignment::Left;
        }
        width.is_max_width = is_max_width;
        Ok(self)
    }

    /// Enable line breaking with the given gap between lines.
    pub fn inter_line_spacing(mut self, unit: Unit, value: f32) -> Result<Self> {
        if self.config.width.is_none() {
            return Err(TexError::configuration(
                "Cannot set inter line spacing without having specified a width",
            ));
        }
        self.config.interline = Some(Length::new(unit, value));
        Ok(self)
    }

    pub fn pixels_per_point(mut self, ppp: f32) -> Self {
        self.config.pixels_per_point = ppp;
        self
    }

    /// Target resolution in dots per inch.
    pub fn dpi_target(self, dpi: f32) -> Self {
        self.pixels_per_point(dpi / 72.0)
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn build(self) -> Result<TexIcon> {
        let Self { formula, config } = self;
        let (style, size) = config.validate()?;

        let font = match config.font_type.or_else(|| formula.text_style_font()) {
            Some(font_type) => TexFont::with_type(size, font_type),
            None => TexFont::new(size),
        };
        let mut env = Environment::new(style, font).with_pixels_per_point(config.pixels_per_point);
        if let Some(width) = &config.width {
            env.set_text_width(width.length.unit, width.length.value);
        }
        if let Some(interline) = config.interline {
            env.set_interline(interline.unit, interline.value);
        }

        let mut tex_box = formula.create_box(&env);
        if let (Some(width), Some(text_width)) = (&config.width, env.text_width()) {
            if let Some(interline) = env.interline() {
                tex_box = linebreak::split(tex_box, text_width, interline);
            }
            let target = if width.is_max_width {
                tex_box.width
            } else {
                text_width
            };
            tex_box = TexBox::aligned(tex_box, target, width.align);
        }

        let mut icon = TexIcon::new(tex_box, size, config.true_values, config.pixels_per_point);
        icon.set_foreground(config.foreground);
        icon.set_colored(env.is_colored());
        BuildDiagnostics::new(style, &config, &icon).log();
        Ok(icon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use approx::assert_relative_eq;
    use texform_core::Graphics2D;
    use texform_headless::RecordingGraphics;

    fn registry() -> Registry {
        Registry::with_defaults().unwrap()
    }

    #[test]
    fn test_one_plus_one_display() {
        let registry = registry();
        let formula = Formula::parse(&registry, "1+1").unwrap();
        let icon = formula
            .icon_builder()
            .style(TexStyle::Display)
            .size(20.0)
            .build()
            .unwrap();
        assert!(icon.width() > 0);
        assert!(icon.height() > 0);
        assert_eq!(icon.foreground(), None);

        let mut g = RecordingGraphics::new();
        icon.paint(&mut g, 0.0, 0.0);
        assert!(!g.commands().is_empty());
        assert!(g.commands().iter().all(|c| c.color == Color::BLACK));
    }

    #[test]
    fn test_size_is_required_whatever_else_is_set() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        let attempts = [
            formula.icon_builder().style(TexStyle::Display),
            formula
                .icon_builder()
                .style(TexStyle::Text)
                .foreground(Color::RED)
                .font_type(FontType::BOLD),
            formula
                .icon_builder()
                .style(TexStyle::Display)
                .width(Unit::Pixel, 100.0, Alignment::Center)
                .is_max_width(true)
                .unwrap()
                .inter_line_spacing(Unit::Em, 0.5)
                .unwrap(),
            formula.icon_builder().true_values(true).dpi_target(144.0),
        ];
        for builder in attempts {
            assert!(builder.build().unwrap_err().is_configuration());
        }
    }

    #[test]
    fn test_style_and_size_validation() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        assert!(formula.icon_builder().size(10.0).build().is_err());
        assert!(formula
            .icon_builder()
            .style(TexStyle::Text)
            .size(-1.0)
            .build()
            .is_err());
        assert!(formula
            .icon_builder()
            .style(TexStyle::Text)
            .size(f32::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn test_oversized_scale_is_rejected() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        let err = formula.create_icon(TexStyle::Display, 1.0e10).unwrap_err();
        assert!(err.is_configuration());
        let err = formula
            .icon_builder()
            .style(TexStyle::Text)
            .size(1.0e4)
            .pixels_per_point(1.0e3)
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_huge_scalebox_saturates_instead_of_overflowing() {
        let registry = registry();
        let formula = Formula::parse(&registry, "\\scalebox{1e30}{x}").unwrap();
        let icon = formula.create_icon(TexStyle::Display, 20.0).unwrap();
        assert_eq!(icon.width(), i32::MAX);
        assert_eq!(icon.height(), i32::MAX);
    }

    #[test]
    fn test_width_dependent_setters_need_width() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        let err = formula.icon_builder().is_max_width(true).unwrap_err();
        assert!(err.is_configuration());
        let err = formula
            .icon_builder()
            .inter_line_spacing(Unit::Em, 1.0)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_width_switches_true_values_and_max_width_forces_left() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        let builder = formula
            .icon_builder()
            .width(Unit::Pixel, 100.0, Alignment::Right);
        assert!(builder.config().true_values);
        let builder = builder.is_max_width(true).unwrap();
        let width = builder.config().width.unwrap();
        assert_eq!(width.align, Alignment::Left);
        assert!(width.is_max_width);
    }

    #[test]
    fn test_centered_in_fixed_width() {
        let registry = registry();
        let formula = Formula::parse(&registry, "1+1").unwrap();
        let icon = formula
            .icon_builder()
            .style(TexStyle::Display)
            .size(20.0)
            .width(Unit::Pixel, 100.0, Alignment::Center)
            .build()
            .unwrap();
        assert_eq!(icon.width(), 100);

        let mut g = RecordingGraphics::new();
        icon.paint(&mut g, 0.0, 0.0);
        let (x0, _, x1, _) = g.device_bounds().unwrap();
        let content = icon.tex_box().children()[1].width as f64 * 20.0;
        assert!(content < 100.0);
        // kerns on both sides of the content are equal
        let kerns = icon.tex_box().children();
        assert_relative_eq!(kerns[0].width, kerns[2].width);
        assert!(x0 >= kerns[0].width as f64 * 20.0 - 1e-3);
        assert!(x1 <= 100.0 - kerns[2].width as f64 * 20.0 + 1e-3);
    }

    #[test]
    fn test_max_width_center_equals_left() {
        let registry = registry();
        let formula = Formula::parse(&registry, "a+b=c").unwrap();
        let paint = |align: Alignment| {
            let icon = formula
                .icon_builder()
                .style(TexStyle::Display)
                .size(20.0)
                .width(Unit::Pixel, 300.0, align)
                .is_max_width(true)
                .unwrap()
                .build()
                .unwrap();
            let mut g = RecordingGraphics::new();
            icon.paint(&mut g, 0.0, 0.0);
            (icon.width(), g.commands().to_vec())
        };
        let (left_width, left) = paint(Alignment::Left);
        let (center_width, center) = paint(Alignment::Center);
        assert_eq!(left_width, center_width);
        assert_eq!(left, center);
    }

    #[test]
    fn test_interline_breaks_long_rows() {
        let registry = registry();
        let formula = Formula::parse(&registry, "a+b+c+d+e+f+g+h").unwrap();
        let single = formula
            .icon_builder()
            .style(TexStyle::Display)
            .size(20.0)
            .build()
            .unwrap();
        let broken = formula
            .icon_builder()
            .style(TexStyle::Display)
            .size(20.0)
            .width(Unit::Pixel, 60.0, Alignment::Left)
            .inter_line_spacing(Unit::Em, 0.2)
            .unwrap()
            .build()
            .unwrap();
        assert!(broken.height() > single.height());
    }

    #[test]
    fn test_colored_formula_still_wraps() {
        let registry = registry();
        let mut formula = Formula::parse(&registry, "a+b+c+d+e+f+g+h").unwrap();
        let wrap = |formula: &Formula| {
            formula
                .icon_builder()
                .style(TexStyle::Display)
                .size(20.0)
                .width(Unit::Pixel, 60.0, Alignment::Left)
                .inter_line_spacing(Unit::Em, 0.2)
                .unwrap()
                .build()
                .unwrap()
        };
        let plain = wrap(&formula);
        formula.set_color(Color::RED);
        let colored = wrap(&formula);
        assert_eq!(colored.width(), 60);
        assert_eq!(colored.height(), plain.height());

        let mut g = RecordingGraphics::new();
        colored.paint(&mut g, 0.0, 0.0);
        assert!(g.commands().iter().any(|c| c.color == Color::RED));
    }

    #[test]
    fn test_text_style_font_applies_unless_font_type_is_set() {
        let registry = registry();
        let mut formula = Formula::parse(&registry, "abc").unwrap();
        let build = |formula: &Formula, font_type: Option<FontType>| {
            let builder = formula.icon_builder().style(TexStyle::Text).size(40.0).true_values(true);
            let builder = match font_type {
                Some(font_type) => builder.font_type(font_type),
                None => builder,
            };
            builder.build().unwrap()
        };
        let plain = build(&formula, None);
        formula.set_text_style(Some("mathbf")).unwrap();
        let styled = build(&formula, None);
        let explicit = build(&formula, Some(FontType::SERIF));
        assert!(styled.width() > plain.width());
        assert_eq!(explicit.width(), plain.width());
    }

    #[test]
    fn test_font_type_changes_metrics() {
        let registry = registry();
        let formula = Formula::parse(&registry, "abc").unwrap();
        let build = |builder: IconBuilder| builder.style(TexStyle::Text).size(40.0).true_values(true).build().unwrap();
        let plain = build(formula.icon_builder());
        let bold = build(formula.icon_builder().font_type(FontType::BOLD));
        assert!(bold.width() > plain.width());
    }

    #[test]
    fn test_dpi_target_scales_pixels() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        let at_72 = formula
            .icon_builder()
            .style(TexStyle::Text)
            .size(20.0)
            .true_values(true)
            .build()
            .unwrap();
        let at_144 = formula
            .icon_builder()
            .style(TexStyle::Text)
            .size(20.0)
            .true_values(true)
            .dpi_target(144.0)
            .build()
            .unwrap();
        assert_relative_eq!(at_144.pixels_per_point(), 2.0);
        assert!(at_144.width() >= 2 * at_72.width() - 1);
    }

    #[test]
    fn test_colored_flag_and_foreground_override() {
        let registry = registry();
        let formula = Formula::parse(&registry, "\\textcolor{red}{x}").unwrap();
        let icon = formula
            .icon_builder()
            .style(TexStyle::Text)
            .size(10.0)
            .foreground(Color::BLUE)
            .build()
            .unwrap();
        assert!(icon.is_colored());
        assert_eq!(icon.foreground(), Some(Color::BLUE));

        let plain = Formula::parse(&registry, "x").unwrap();
        let icon = plain.create_icon(TexStyle::Text, 10.0).unwrap();
        assert!(!icon.is_colored());
    }

    #[test]
    fn test_config_serializes() {
        let config = BuildConfig {
            style: Some(TexStyle::Display),
            size: Some(12.0),
            ..BuildConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: BuildConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.validate().unwrap(), (TexStyle::Display, 12.0));
    }

    #[test]
    fn test_paint_restores_surface() {
        let registry = registry();
        let formula = Formula::parse(&registry, "\\fbox{x}").unwrap();
        let icon = formula.create_icon(TexStyle::Display, 20.0).unwrap();
        let mut g = RecordingGraphics::new();
        g.translate(3.0, 4.0);
        let before = g.transform();
        icon.paint(&mut g, 0.0, 0.0);
        assert_eq!(g.transform(), before);
    }
}
