//! What a marker looks like for one requirement.
//!
//! Outline thickness and text size grow with the token's footprint so large
//! creatures stay legible.

use fc_core::{Bounds, CheckDescriptor};

use crate::color::TargetColor;

/// Outline thickness of a one-square token, before the per-square increment.
pub const BASE_THICKNESS: f64 = 6.0;
/// Outline thickness added per grid square of footprint.
pub const THICKNESS_PER_SQUARE: f64 = 3.0;
/// Opacity of the overlay layer.
pub const LAYER_ALPHA: f32 = 0.9;
/// Font size of the primary line at scale 1.
pub const PRIMARY_FONT: f64 = 14.0;
/// Font size of the description line at scale 1.
pub const DESCRIPTION_FONT: f64 = 12.0;
/// Fill of the description line.
pub const DESCRIPTION_FILL: &str = "#eeeeee";

/// The token outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    /// Whether the outline is drawn.
    pub enabled: bool,
    /// Packed `0xRRGGBB` color.
    pub color: u32,
    /// Thickness in pixels.
    pub thickness: f64,
}

/// One line of overlay text.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayText {
    /// The text.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Fill color; `None` uses the host default.
    pub fill: Option<&'static str>,
}

/// Everything drawn on one targeted token.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOverlay {
    /// The outline.
    pub outline: Outline,
    /// Text lines, primary first.
    pub lines: Vec<OverlayText>,
    /// Layer opacity.
    pub alpha: f32,
}

/// Footprint of a token in whole grid squares, at least 1.
pub fn squares(bounds: &Bounds, grid_size: f64) -> u32 {
    if grid_size <= 0.0 {
        return 1;
    }
    let span = (bounds.width.min(bounds.height) / grid_size).ceil();
    if span.is_finite() && span > 1.0 {
        span as u32
    } else {
        1
    }
}

/// Outline thickness for a footprint.
pub fn thickness(squares: u32) -> f64 {
    BASE_THICKNESS + THICKNESS_PER_SQUARE * f64::from(squares)
}

/// Text scale for a grid size and footprint.
pub fn text_scale(grid_size: f64, squares: u32) -> f64 {
    (grid_size / 100.0).max(0.8) + 0.5 * f64::from(squares.saturating_sub(1))
}

impl MarkerOverlay {
    /// An overlay that shows nothing.
    pub fn cleared() -> Self {
        Self {
            outline: Outline {
                enabled: false,
                color: 0,
                thickness: 0.0,
            },
            lines: Vec::new(),
            alpha: LAYER_ALPHA,
        }
    }

    /// The overlay for a token with the given bounds, or a cleared one if
    /// no check is required.
    pub fn for_requirement(
        requirement: Option<&CheckDescriptor>,
        bounds: &Bounds,
        grid_size: f64,
    ) -> Self {
        let Some(req) = requirement else {
            return Self::cleared();
        };
        let squares = squares(bounds, grid_size);
        let scale = text_scale(grid_size, squares);

        let mut lines = vec![OverlayText {
            content: req.to_string(),
            font_size: PRIMARY_FONT * scale,
            fill: None,
        }];
        if let Some(description) = req.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(OverlayText {
                content: description.to_string(),
                font_size: DESCRIPTION_FONT * scale,
                fill: Some(DESCRIPTION_FILL),
            });
        }

        Self {
            outline: Outline {
                enabled: true,
                color: TargetColor::from_dc(req.dc).rgb(),
                thickness: thickness(squares),
            },
            lines,
            alpha: LAYER_ALPHA,
        }
    }

    /// Returns true if nothing is drawn.
    pub fn is_cleared(&self) -> bool {
        !self.outline.enabled && self.lines.is_empty()
    }
}
