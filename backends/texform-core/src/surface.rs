// this_file: backends/texform-core/src/surface.rs

//! Shared helpers for turning backend pixel buffers into [`Bitmap`]s and encoded images.

use crate::{types::Bitmap, Result, TexError};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// Raster encoders, selected by explicit name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Gif,
    Jpeg,
}

impl ImageFormat {
    /// Whether the encoder can keep an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, ImageFormat::Jpeg)
    }
}

impl FromStr for ImageFormat {
    type Err = TexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "gif" => Ok(ImageFormat::Gif),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            other => Err(TexError::encode(format!("Unknown encoder '{other}'"))),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Jpeg => "jpeg",
        })
    }
}

/// Render surface produced by a backend prior to format conversion/encoding.
#[derive(Debug)]
pub struct RenderSurface {
    width: u32,
    height: u32,
    premultiplied: bool,
    data: Vec<u8>,
}

impl RenderSurface {
    /// Create a new RGBA surface.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, premultiplied: bool) -> Self {
        Self {
            width,
            height,
            premultiplied,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Convert into a straight-alpha RGBA bitmap.
    pub fn into_bitmap(mut self) -> Result<Bitmap> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected {
            return Err(TexError::render(format!(
                "Pixel data size mismatch: expected {expected} bytes, got {}",
                self.data.len()
            )));
        }
        if self.premultiplied {
            unpremultiply(&mut self.data);
        }
        Ok(Bitmap {
            width: self.width,
            height: self.height,
            data: std::mem::take(&mut self.data),
        })
    }

    /// Encode the surface. With `transparent == false` the alpha channel is dropped.
    pub fn encode(self, format: ImageFormat, transparent: bool) -> Result<Vec<u8>> {
        let bitmap = self.into_bitmap()?;
        encode_bitmap(&bitmap, format, transparent)
    }
}

/// Encode a straight-alpha bitmap with the given encoder.
pub fn encode_bitmap(bitmap: &Bitmap, format: ImageFormat, transparent: bool) -> Result<Vec<u8>> {
    let keep_alpha = transparent && format.supports_alpha();
    let pixels = if keep_alpha {
        bitmap.data.clone()
    } else {
        drop_alpha(&bitmap.data)
    };
    match format {
        ImageFormat::Png => encode_png(bitmap.width, bitmap.height, &pixels, keep_alpha),
        ImageFormat::Gif | ImageFormat::Jpeg => {
            encode_with_image(bitmap.width, bitmap.height, &pixels, keep_alpha, format)
        }
    }
}

fn drop_alpha(data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len() / 4 * 3);
    for chunk in data.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[..3]);
    }
    rgb
}

fn unpremultiply(data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(4) {
        let alpha = chunk[3];
        if alpha == 0 || alpha == 255 {
            continue;
        }
        let alpha_f = alpha as f32 / 255.0;
        for channel in &mut chunk[..3] {
            let unpremultiplied = ((*channel as f32) / alpha_f).clamp(0.0, 255.0);
            *channel = unpremultiplied as u8;
        }
    }
}

fn encode_png(width: u32, height: u32, data: &[u8], alpha: bool) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(if alpha {
            png::ColorType::Rgba
        } else {
            png::ColorType::Rgb
        });
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|err| TexError::encode(format!("PNG encoder error: {err}")))?;
        writer
            .write_image_data(data)
            .map_err(|err| TexError::encode(format!("PNG write error: {err}")))?;
    } // writer and encoder are dropped here
    Ok(png_data)
}

fn encode_with_image(
    width: u32,
    height: u32,
    data: &[u8],
    alpha: bool,
    format: ImageFormat,
) -> Result<Vec<u8>> {
    let color = if alpha {
        image::ExtendedColorType::Rgba8
    } else {
        image::ExtendedColorType::Rgb8
    };
    let target = match format {
        ImageFormat::Gif => image::ImageFormat::Gif,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
    };
    let mut out = Cursor::new(Vec::new());
    image::write_buffer_with_format(&mut out, data, width, height, color, target)
        .map_err(|err| TexError::encode(format!("{format} encoder error: {err}")))?;
    Ok(out.into_inner())
}
