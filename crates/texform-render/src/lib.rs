// this_file: crates/texform-render/src/lib.rs

//! Rasterization of formulas into bitmaps and encoded image files.

use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use texform_core::{Bitmap, Color, ImageFormat, Insets, Result, TexError};
use texform_formula::{Formula, TexIcon, TexStyle};
use texform_skia::{into_surface, new_pixmap, SkiaGraphics};

/// Insets around icons written to files.
const FILE_INSETS: i32 = 1;
/// Insets around in-memory images.
const BUFFER_INSETS: i32 = 2;
/// Longest pixmap side the rasterizer allocates.
const MAX_SIDE: u32 = 1 << 16;

/// How a formula is turned into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterOptions {
    pub style: TexStyle,
    pub size: f32,
    /// Text color; black when unset.
    pub foreground: Option<Color>,
    /// Filled behind the formula unless `transparent` is set.
    pub background: Option<Color>,
    /// Leave the area behind the formula clear. On by default, so that
    /// black ink without a background stays visible.
    pub transparent: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            style: TexStyle::Display,
            size: 20.0,
            foreground: None,
            background: None,
            transparent: true,
        }
    }
}

/// Paints formula icons onto tiny-skia pixmaps and encodes them.
#[derive(Debug, Clone, Default)]
pub struct Rasterizer {
    silent_io_errors: bool,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log write failures and report success instead of returning them.
    pub fn with_silent_io_errors(mut self, silent: bool) -> Self {
        self.silent_io_errors = silent;
        self
    }

    /// Paint an already built icon at the origin of a pixmap of its size.
    pub fn rasterize(&self, icon: &TexIcon, background: Option<Color>, transparent: bool) -> Result<Bitmap> {
        let width = u32::try_from(icon.width())
            .map_err(|_| TexError::render(format!("Negative icon width {}", icon.width())))?;
        let height = u32::try_from(icon.height())
            .map_err(|_| TexError::render(format!("Negative icon height {}", icon.height())))?;
        if width > MAX_SIDE || height > MAX_SIDE {
            return Err(TexError::render(format!(
                "Icon of {width}x{height} pixels exceeds the {MAX_SIDE} pixel limit"
            )));
        }
        let mut pixmap = new_pixmap(width, height)?;
        {
            let mut g = SkiaGraphics::new(&mut pixmap);
            if let (Some(color), false) = (background, transparent) {
                g.clear(color);
            }
            icon.paint(&mut g, 0.0, 0.0);
        }
        debug!(target: "texform::render", "rasterized {width}x{height} icon");
        into_surface(pixmap).into_bitmap()
    }

    fn render_with_insets(
        &self,
        formula: &Formula<'_>,
        options: &RasterOptions,
        insets: i32,
    ) -> Result<Bitmap> {
        let mut icon = formula.create_icon(options.style, options.size)?;
        icon.set_insets(Insets::uniform(insets));
        icon.set_foreground(options.foreground);
        self.rasterize(&icon, options.background, options.transparent)
    }

    /// Render into memory, as for file export.
    pub fn render_bitmap(&self, formula: &Formula<'_>, options: &RasterOptions) -> Result<Bitmap> {
        self.render_with_insets(formula, options, FILE_INSETS)
    }

    /// Encode to image bytes. JPEG output is never transparent.
    pub fn encode(
        &self,
        formula: &Formula<'_>,
        format: ImageFormat,
        options: &RasterOptions,
    ) -> Result<Vec<u8>> {
        let options = RasterOptions {
            transparent: options.transparent && format.supports_alpha(),
            ..*options
        };
        let bitmap = self.render_bitmap(formula, &options)?;
        texform_core::encode_bitmap(&bitmap, format, options.transparent)
    }

    /// Encode with the named format and write the result to `path`.
    pub fn create_image(
        &self,
        formula: &Formula<'_>,
        format: ImageFormat,
        options: &RasterOptions,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode(formula, format, options)?;
        match std::fs::write(path, bytes) {
            Ok(()) => {
                debug!(target: "texform::render", "wrote {format} image to {}", path.display());
                Ok(())
            }
            Err(err) if self.silent_io_errors => {
                error!(target: "texform::render", "failed to write {}: {err}", path.display());
                Ok(())
            }
            Err(err) => Err(TexError::io(path, err)),
        }
    }

    /// PNG, transparent when no background is given.
    pub fn create_png(
        &self,
        formula: &Formula<'_>,
        style: TexStyle,
        size: f32,
        path: impl AsRef<Path>,
        background: Option<Color>,
        foreground: Option<Color>,
    ) -> Result<()> {
        let options = file_options(style, size, background, foreground);
        self.create_image(formula, ImageFormat::Png, &options, path)
    }

    /// GIF, transparent when no background is given.
    pub fn create_gif(
        &self,
        formula: &Formula<'_>,
        style: TexStyle,
        size: f32,
        path: impl AsRef<Path>,
        background: Option<Color>,
        foreground: Option<Color>,
    ) -> Result<()> {
        let options = file_options(style, size, background, foreground);
        self.create_image(formula, ImageFormat::Gif, &options, path)
    }

    pub fn create_jpeg(
        &self,
        formula: &Formula<'_>,
        style: TexStyle,
        size: f32,
        path: impl AsRef<Path>,
        background: Option<Color>,
        foreground: Option<Color>,
    ) -> Result<()> {
        let options = file_options(style, size, background, foreground);
        self.create_image(formula, ImageFormat::Jpeg, &options, path)
    }

    /// In-memory RGBA image; transparent outside the background when none is given.
    pub fn create_buffered_image(
        &self,
        formula: &Formula<'_>,
        style: TexStyle,
        size: f32,
        foreground: Option<Color>,
        background: Option<Color>,
    ) -> Result<Bitmap> {
        let options = RasterOptions {
            style,
            size,
            foreground: Some(foreground.unwrap_or(Color::BLACK)),
            background,
            transparent: false,
        };
        self.render_with_insets(formula, &options, BUFFER_INSETS)
    }
}

fn file_options(
    style: TexStyle,
    size: f32,
    background: Option<Color>,
    foreground: Option<Color>,
) -> RasterOptions {
    RasterOptions {
        style,
        size,
        foreground,
        background,
        transparent: background.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texform_formula::Registry;
    use texform_headless::RecordingGraphics;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    fn registry() -> Registry {
        Registry::with_defaults().unwrap()
    }

    fn has_ink(bitmap: &Bitmap, color: Color) -> bool {
        bitmap
            .data
            .chunks_exact(4)
            .any(|p| p[3] == 255 && p[..3] == [color.r, color.g, color.b])
    }

    #[test]
    fn test_bitmap_matches_icon_size() {
        let registry = registry();
        let formula = Formula::parse(&registry, "1+1").unwrap();
        let rasterizer = Rasterizer::new();
        let options = RasterOptions::default();
        let bitmap = rasterizer.render_bitmap(&formula, &options).unwrap();

        let mut icon = formula.create_icon(options.style, options.size).unwrap();
        icon.set_insets(Insets::uniform(FILE_INSETS));
        assert_eq!(bitmap.width as i32, icon.width());
        assert_eq!(bitmap.height as i32, icon.height());
        assert!(has_ink(&bitmap, Color::BLACK));
    }

    #[test]
    fn test_background_fills_corners() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x^2").unwrap();
        let rasterizer = Rasterizer::new();
        let bitmap = rasterizer
            .create_buffered_image(&formula, TexStyle::Display, 20.0, None, Some(Color::WHITE))
            .unwrap();
        assert_eq!(bitmap.pixel(0, 0), Some([255, 255, 255, 255]));
        let corner = bitmap.pixel(bitmap.width - 1, bitmap.height - 1);
        assert_eq!(corner, Some([255, 255, 255, 255]));
        assert!(has_ink(&bitmap, Color::BLACK));
    }

    #[test]
    fn test_no_background_stays_transparent() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        let rasterizer = Rasterizer::new();
        let bitmap = rasterizer
            .create_buffered_image(&formula, TexStyle::Text, 20.0, Some(Color::RED), None)
            .unwrap();
        assert_eq!(bitmap.pixel(0, 0).map(|p| p[3]), Some(0));
        assert!(has_ink(&bitmap, Color::RED));
    }

    #[test]
    fn test_transparent_ignores_background() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        let options = RasterOptions {
            background: Some(Color::BLUE),
            transparent: true,
            ..RasterOptions::default()
        };
        let bitmap = Rasterizer::new().render_bitmap(&formula, &options).unwrap();
        assert_eq!(bitmap.pixel(0, 0).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_default_png_is_transparent_with_visible_ink() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x+1").unwrap();
        let bytes = Rasterizer::new()
            .encode(&formula, ImageFormat::Png, &RasterOptions::default())
            .unwrap();

        let mut reader = png::Decoder::new(std::io::Cursor::new(bytes))
            .read_info()
            .unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!(info.color_type, png::ColorType::Rgba);
        let pixels = &buf[..info.buffer_size()];
        assert_eq!(pixels[3], 0);
        assert!(pixels
            .chunks_exact(4)
            .any(|p| p[3] == 255 && p[..3] == [0, 0, 0]));
    }

    #[test]
    fn test_ink_stays_inside_painted_bounds() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x^2+\\frac{a}{b}").unwrap();
        let mut icon = formula.create_icon(TexStyle::Display, 20.0).unwrap();
        icon.set_insets(Insets::uniform(1));

        let mut recorder = RecordingGraphics::new();
        icon.paint(&mut recorder, 0.0, 0.0);
        let (x0, y0, x1, y1) = recorder.device_bounds().unwrap();
        let margin = 1.0
            + recorder
                .commands()
                .iter()
                .map(|c| {
                    let (ox, oy) = c.transform.map_point(0.0, 0.0);
                    let (ux, uy) = c.transform.map_point(1.0, 0.0);
                    c.stroke.width as f64 * (ux - ox).hypot(uy - oy)
                })
                .fold(0.0, f64::max);

        let bitmap = Rasterizer::new()
            .rasterize(&icon, Some(Color::WHITE), false)
            .unwrap();
        for y in 0..bitmap.height {
            for x in 0..bitmap.width {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let outside = px < x0 - margin
                    || px > x1 + margin
                    || py < y0 - margin
                    || py > y1 + margin;
                if outside {
                    assert_eq!(bitmap.pixel(x, y), Some([255, 255, 255, 255]), "pixel ({x}, {y})");
                }
            }
        }
        assert!(has_ink(&bitmap, Color::BLACK));
    }

    #[test]
    fn test_oversized_icon_is_an_error() {
        let registry = registry();
        let formula = Formula::parse(&registry, "\\scalebox{1e30}{x}").unwrap();
        let err = Rasterizer::new()
            .render_bitmap(&formula, &RasterOptions::default())
            .unwrap_err();
        assert!(matches!(err, TexError::Render(_)));
    }

    #[test]
    fn test_buffered_image_has_wider_insets() {
        let registry = registry();
        let formula = Formula::parse(&registry, "x").unwrap();
        let rasterizer = Rasterizer::new();
        let file = rasterizer
            .render_bitmap(&formula, &RasterOptions::default())
            .unwrap();
        let buffered = rasterizer
            .create_buffered_image(&formula, TexStyle::Display, 20.0, None, None)
            .unwrap();
        assert_eq!(buffered.width, file.width + 2);
        assert_eq!(buffered.height, file.height + 2);
    }

    #[test]
    fn test_writes_each_format() {
        let registry = registry();
        let formula = Formula::parse(&registry, "\\frac{a}{b}").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = Rasterizer::new();

        let png = dir.path().join("out.png");
        rasterizer
            .create_png(&formula, TexStyle::Display, 20.0, &png, None, None)
            .unwrap();
        assert!(std::fs::read(&png).unwrap().starts_with(PNG_MAGIC));

        let gif = dir.path().join("out.gif");
        rasterizer
            .create_gif(&formula, TexStyle::Display, 20.0, &gif, Some(Color::WHITE), None)
            .unwrap();
        assert!(std::fs::read(&gif).unwrap().starts_with(b"GIF8"));

        let jpeg = dir.path().join("out.jpg");
        rasterizer
            .create_jpeg(&formula, TexStyle::Display, 20.0, &jpeg, Some(Color::WHITE), Some(Color::BLUE))
            .unwrap();
        assert!(std::fs::read(&jpeg).unwrap().starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn test_format_by_name() {
        let registry = registry();
        let formula = Formula::parse(&registry, "y").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("named.png");
        let format: ImageFormat = "PNG".parse().unwrap();
        Rasterizer::new()
            .create_image(&formula, format, &RasterOptions::default(), &path)
            .unwrap();
        assert!(path.exists());
        assert!("bmp".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let registry = registry();
        let formula = Formula::parse(&registry, "z").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");

        let err = Rasterizer::new()
            .create_png(&formula, TexStyle::Text, 12.0, &path, None, None)
            .unwrap_err();
        assert!(matches!(err, TexError::Io { .. }));

        Rasterizer::new()
            .with_silent_io_errors(true)
            .create_png(&formula, TexStyle::Text, 12.0, &path, None, None)
            .unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_size_is_not_swallowed() {
        let registry = registry();
        let formula = Formula::parse(&registry, "z").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = Rasterizer::new()
            .with_silent_io_errors(true)
            .create_png(&formula, TexStyle::Text, 0.0, dir.path().join("a.png"), None, None)
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
