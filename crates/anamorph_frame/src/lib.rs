//! Anamorph Frame
//!
//! Geometry and image helpers for anamorphic footage.
//!
//! - **Aspect ratios**: delivery-format catalog and `W:H` parsing
//! - **Framing guides**: letterbox/pillarbox frame, mattes, center and
//!   rule-of-thirds lines for a camera preview
//! - **De-squeeze**: horizontal stretch by a squeeze ratio, export naming
//!   and encoding
//!
//! # Example
//!
//! ```rust
//! use anamorph_frame::{AspectRatio, DesqueezePlan, OverlayMode, OverlayPlan};
//!
//! let plan = DesqueezePlan::new(4000, 3000, 1.33).unwrap();
//! assert_eq!(plan.output_width, 5320);
//!
//! let overlay = OverlayPlan::build(1920.0, 1080.0, AspectRatio::SCOPE, OverlayMode::Matte, 0.5, 1.0);
//! assert_eq!(overlay.frame.w, 1920.0);
//! ```

pub mod aspect;
pub mod desqueeze;
mod error;
pub mod framing;

pub use aspect::AspectRatio;
pub use desqueeze::{
    output_file_name, DesqueezePlan, ExportFormat, MAX_OUTPUT_PIXELS, SQUEEZE_PRESETS,
};
pub use error::{AspectError, FrameError, Result};
pub use framing::{frame_rect, status_line, CameraFacing, OverlayMode, OverlayPlan, Rect};
