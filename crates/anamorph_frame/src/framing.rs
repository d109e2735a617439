//! Framing-guide geometry for a live camera preview
//!
//! Given a preview surface and a target aspect ratio this computes the
//! largest centered frame of that ratio, the matte bands outside it, and
//! center and rule-of-thirds guide lines inside it. The result is an
//! [`OverlayPlan`] that any 2D canvas can replay.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use smallvec::SmallVec;

use crate::aspect::AspectRatio;
use crate::error::FrameError;

/// Axis-aligned rectangle in surface pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }
}

/// Line segment in surface pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Line {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Line {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// Largest rectangle of `ratio` centered in the container.
///
/// A container wider than the ratio is pillarboxed (full height), anything
/// else is letterboxed (full width).
pub fn frame_rect(container_w: f64, container_h: f64, ratio: f64) -> Rect {
    let container_ratio = container_w / container_h;
    let (w, h) = if container_ratio > ratio {
        (container_h * ratio, container_h)
    } else {
        (container_w, container_w / ratio)
    };
    Rect::new((container_w - w) / 2.0, (container_h - h) / 2.0, w, h)
}

/// Bands covering the container outside `frame`: top, bottom, left, right
pub fn matte_rects(container_w: f64, container_h: f64, frame: Rect) -> [Rect; 4] {
    [
        Rect::new(0.0, 0.0, container_w, frame.y),
        Rect::new(0.0, frame.bottom(), container_w, container_h - frame.bottom()),
        Rect::new(0.0, frame.y, frame.x, frame.h),
        Rect::new(frame.right(), frame.y, container_w - frame.right(), frame.h),
    ]
}

/// Vertical then horizontal center line
pub fn center_guides(frame: Rect) -> SmallVec<[Line; 4]> {
    let cx = frame.x + frame.w / 2.0;
    let cy = frame.y + frame.h / 2.0;
    smallvec::smallvec![
        Line::new(cx, frame.y, cx, frame.bottom()),
        Line::new(frame.x, cy, frame.right(), cy),
    ]
}

/// Rule-of-thirds lines: two verticals, then two horizontals
pub fn thirds_guides(frame: Rect) -> SmallVec<[Line; 4]> {
    let x1 = frame.x + frame.w / 3.0;
    let x2 = frame.x + (2.0 * frame.w) / 3.0;
    let y1 = frame.y + frame.h / 3.0;
    let y2 = frame.y + (2.0 * frame.h) / 3.0;
    smallvec::smallvec![
        Line::new(x1, frame.y, x1, frame.bottom()),
        Line::new(x2, frame.y, x2, frame.bottom()),
        Line::new(frame.x, y1, frame.right(), y1),
        Line::new(frame.x, y2, frame.right(), y2),
    ]
}

/// Non-premultiplied color with a fractional alpha
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn black(a: f64) -> Self {
        Self { r: 0, g: 0, b: 0, a }
    }

    pub const fn white(a: f64) -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
            a,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Whether the area outside the frame is darkened
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayMode {
    #[default]
    Matte,
    /// Outline and guides only
    Frame,
}

impl fmt::Display for OverlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverlayMode::Matte => "matte",
            OverlayMode::Frame => "frame",
        })
    }
}

impl FromStr for OverlayMode {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matte" => Ok(OverlayMode::Matte),
            "frame" => Ok(OverlayMode::Frame),
            _ => Err(FrameError::UnknownOverlay(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fill {
    pub rect: Rect,
    pub color: Rgba,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outline {
    pub rect: Rect,
    pub color: Rgba,
    pub line_width: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GuideSet {
    pub lines: SmallVec<[Line; 4]>,
    pub color: Rgba,
    pub line_width: f64,
}

const FRAME_ALPHA: f64 = 0.92;
const CENTER_ALPHA: f64 = 0.45;
const THIRDS_ALPHA: f64 = 0.25;

/// Draw list for one overlay refresh, in paint order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayPlan {
    pub width: f64,
    pub height: f64,
    pub aspect: String,
    pub ratio: f64,
    pub mode: OverlayMode,
    pub frame: Rect,
    pub mattes: SmallVec<[Fill; 4]>,
    pub outline: Outline,
    pub center: GuideSet,
    pub thirds: GuideSet,
}

impl OverlayPlan {
    /// Lay out the overlay for a `width`x`height` surface in device pixels.
    ///
    /// Stroke widths scale with `device_pixel_ratio`. Matte opacity is
    /// clamped to `[0, 1]`, NaN counting as fully transparent.
    pub fn build(
        width: f64,
        height: f64,
        aspect: AspectRatio,
        mode: OverlayMode,
        matte_opacity: f64,
        device_pixel_ratio: f64,
    ) -> Self {
        let ratio = aspect.value();
        let frame = frame_rect(width, height, ratio);
        let opacity = if matte_opacity.is_nan() {
            0.0
        } else {
            matte_opacity.clamp(0.0, 1.0)
        };

        let mattes = match mode {
            OverlayMode::Matte => matte_rects(width, height, frame)
                .into_iter()
                .map(|rect| Fill {
                    rect,
                    color: Rgba::black(opacity),
                })
                .collect(),
            OverlayMode::Frame => SmallVec::new(),
        };

        tracing::debug!(
            width,
            height,
            aspect = %aspect,
            %mode,
            frame_w = frame.w,
            frame_h = frame.h,
            "overlay planned"
        );

        Self {
            width,
            height,
            aspect: aspect.label(),
            ratio,
            mode,
            frame,
            mattes,
            outline: Outline {
                rect: frame,
                color: Rgba::white(FRAME_ALPHA),
                line_width: 2.0 * device_pixel_ratio,
            },
            center: GuideSet {
                lines: center_guides(frame),
                color: Rgba::white(CENTER_ALPHA),
                line_width: device_pixel_ratio,
            },
            thirds: GuideSet {
                lines: thirds_guides(frame),
                color: Rgba::white(THIRDS_ALPHA),
                line_width: device_pixel_ratio,
            },
        }
    }
}

/// Which camera the preview is using
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Environment,
    User,
}

impl CameraFacing {
    pub fn toggle(self) -> Self {
        match self {
            CameraFacing::Environment => CameraFacing::User,
            CameraFacing::User => CameraFacing::Environment,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraFacing::Environment => "Rear",
            CameraFacing::User => "Front",
        }
    }
}

/// Status text shown while the preview is live
pub fn status_line(aspect_label: &str, facing: CameraFacing) -> String {
    format!("Live • {} • {} cam", aspect_label, facing.label())
}
