// this_file: crates/texform-formula/src/diagnostics.rs

//! Structured debug logging for icon builds.

use crate::builder::BuildConfig;
use crate::constants::{Alignment, TexStyle};
use crate::icon::TexIcon;
use log::{debug, log_enabled, Level};

/// Lightweight snapshot of an effective build.
#[derive(Debug)]
pub struct BuildDiagnostics {
    style: TexStyle,
    size: f32,
    font: String,
    width: Option<String>,
    align: Alignment,
    max_width: bool,
    interline: Option<String>,
    ppp: f32,
    true_values: bool,
    colored: bool,
    pixels: (i32, i32),
}

impl BuildDiagnostics {
    /// Capture the snapshot for a finished build.
    pub fn new(style: TexStyle, config: &BuildConfig, icon: &TexIcon) -> Self {
        let width = config.width.as_ref();
        Self {
            style,
            size: icon.size(),
            font: config
                .font_type
                .map_or_else(|| "default".to_string(), |t| t.to_string()),
            width: width.map(|w| format!("{}{:?}", w.length.value, w.length.unit)),
            align: width.map_or(Alignment::Left, |w| w.align),
            max_width: width.is_some_and(|w| w.is_max_width),
            interline: config
                .interline
                .map(|l| format!("{}{:?}", l.value, l.unit)),
            ppp: icon.pixels_per_point(),
            true_values: icon.true_values(),
            colored: icon.is_colored(),
            pixels: (icon.width(), icon.height()),
        }
    }

    /// Emit the snapshot at debug level when logging is enabled.
    pub fn log(&self) {
        if log_enabled!(target: "texform::build", Level::Debug) {
            debug!(
                target: "texform::build",
                "style={style:?} size={size:.1} font={font} width={width} align={align:?} max_width={max_width} interline={interline} ppp={ppp:.2} true_values={true_values} colored={colored} pixels={w}x{h}",
                style = self.style,
                size = self.size,
                font = self.font,
                width = self.width.as_deref().unwrap_or("<none>"),
                align = self.align,
                max_width = self.max_width,
                interline = self.interline.as_deref().unwrap_or("<none>"),
                ppp = self.ppp,
                true_values = self.true_values,
                colored = self.colored,
                w = self.pixels.0,
                h = self.pixels.1,
            );
        }
    }
}
