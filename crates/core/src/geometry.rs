//! Strikethrough annotation geometry.
//!
//! A strikethrough is a horizontal line of a given length and
//! thickness drawn over pre-printed text at mid-height. The bounding
//! box clearance multipliers are calibrated against Adobe Reader's
//! rendering of the embedded template fonts (more clearance below the
//! line than above, for glyph descenders). They are reproduced
//! unchanged; re-deriving them is a renderer calibration, not a
//! computation.

use crate::error::{FormError, Result};

/// Page-space point, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// RGB color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

/// Bounding box and quad points of one strikethrough annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeGeometry {
    /// `[left, bottom, right, top]` in page space.
    pub bbox: [f64; 4],
    /// Corners of the visible stroke region: bottom-left,
    /// bottom-right, top-left, top-right. Inset from the bounding box
    /// by exactly one thickness on the vertical axis.
    pub quad_points: [f64; 8],
    /// Start of the drawn segment.
    pub start: Point,
    /// End of the drawn segment.
    pub end: Point,
}

const CLEARANCE_X: f64 = 4.771;
const CLEARANCE_BELOW: f64 = 7.857;
const CLEARANCE_ABOVE: f64 = 10.143;

/// Compute the annotation geometry for a horizontal strikethrough
/// drawn from `start` over `length` units at the given `thickness`.
pub fn strike_geometry(start: Point, length: f64, thickness: f64) -> Result<StrikeGeometry> {
    if length <= 0.0 || thickness <= 0.0 {
        return Err(FormError::GeometryDegenerate { length, thickness });
    }
    let end = Point {
        x: start.x + length,
        y: start.y,
    };
    let bbox = [
        start.x - CLEARANCE_X * thickness,
        start.y - CLEARANCE_BELOW * thickness,
        end.x + CLEARANCE_X * thickness,
        end.y + CLEARANCE_ABOVE * thickness,
    ];
    let quad_points = [
        start.x,
        bbox[1] + thickness,
        end.x,
        bbox[1] + thickness,
        start.x,
        bbox[3] - thickness,
        end.x,
        bbox[3] - thickness,
    ];
    Ok(StrikeGeometry {
        bbox,
        quad_points,
        start,
        end,
    })
}

impl StrikeGeometry {
    /// Operator body of the annotation's appearance stream: a stroked
    /// segment in a form XObject whose coordinate origin is translated
    /// to the bounding box corner (the XObject matrix carries the
    /// translation).
    pub fn appearance_body(&self, thickness: f64, color: Rgb) -> String {
        format!(
            "q\n{} {} {} RG\n{} w\n{} {} m\n{} {} l\nS\nQ",
            fmt_num(color.r),
            fmt_num(color.g),
            fmt_num(color.b),
            fmt_num(thickness),
            fmt_num(self.start.x),
            fmt_num(self.start.y),
            fmt_num(self.end.x),
            fmt_num(self.end.y),
        )
    }

    /// XObject matrix translating page coordinates into the
    /// appearance stream's own space.
    pub fn matrix(&self) -> [f64; 6] {
        [1.0, 0.0, 0.0, 1.0, -self.bbox[0], -self.bbox[1]]
    }
}

/// Format a coordinate without a trailing `.0` for integral values.
fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
