//! Anamorphic de-squeeze
//!
//! Stretches an image horizontally by the lens squeeze ratio, keeping the
//! height, and names and encodes the result for download.

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::Serialize;

use crate::error::{FrameError, Result};

/// Common anamorphic squeeze factors offered as presets
pub const SQUEEZE_PRESETS: &[f64] = &[1.25, 1.33, 1.5, 1.55, 1.8, 2.0];

/// JPEG quality used for exports
pub const JPEG_QUALITY: u8 = 95;

/// Largest output, in pixels, a plan will accept (1 GiB as RGBA8)
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Preset matching `ratio` to two decimals, if any
pub fn matching_preset(ratio: f64) -> Option<f64> {
    let wanted = format!("{ratio:.2}");
    SQUEEZE_PRESETS
        .iter()
        .copied()
        .find(|preset| format!("{preset:.2}") == wanted)
}

/// Output geometry for one de-squeeze
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DesqueezePlan {
    pub input_width: u32,
    pub input_height: u32,
    pub ratio: f64,
    pub output_width: u32,
    pub output_height: u32,
}

impl DesqueezePlan {
    pub fn new(input_width: u32, input_height: u32, ratio: f64) -> Result<Self> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(FrameError::InvalidRatio(ratio));
        }
        if input_width == 0 || input_height == 0 {
            return Err(FrameError::EmptyImage {
                width: input_width,
                height: input_height,
            });
        }

        let width = (input_width as f64 * ratio).round().max(1.0);
        if width * input_height as f64 > MAX_OUTPUT_PIXELS as f64 {
            return Err(FrameError::OutputTooLarge {
                width,
                height: input_height,
            });
        }
        // Fits in u32: the pixel limit is below u32::MAX
        let output_width = width as u32;

        Ok(Self {
            input_width,
            input_height,
            ratio,
            output_width,
            output_height: input_height,
        })
    }

    pub fn for_image(image: &DynamicImage, ratio: f64) -> Result<Self> {
        Self::new(image.width(), image.height(), ratio)
    }

    /// `Input 4000×3000 → Output 5320×3000`
    pub fn summary(&self) -> String {
        format!(
            "Input {}×{} → Output {}×{}",
            self.input_width, self.input_height, self.output_width, self.output_height
        )
    }
}

/// Download format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ExportFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ExportFormat::Jpeg),
            "image/webp" => Some(ExportFormat::Webp),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpeg => ImageFormat::Jpeg,
            ExportFormat::Webp => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(format) = Self::from_mime(s) {
            return Ok(format);
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            _ => Err(FrameError::UnknownFormat(s.to_string())),
        }
    }
}

/// `desqueezed-1.33x.png`
pub fn output_file_name(ratio: f64, format: ExportFormat) -> String {
    format!("desqueezed-{:.2}x.{}", ratio, format.extension())
}

/// Decode an image, sniffing the format from its contents
pub fn load(path: &Path) -> Result<DynamicImage> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "image loaded"
    );
    Ok(image)
}

/// Resample `image` to the plan's output size
pub fn stretch(image: &DynamicImage, plan: &DesqueezePlan) -> DynamicImage {
    tracing::debug!(summary = %plan.summary(), ratio = plan.ratio, "stretching image");
    image.resize_exact(plan.output_width, plan.output_height, FilterType::Triangle)
}

/// Encode for download. JPEG drops alpha; PNG and WebP are lossless.
pub fn encode(image: &DynamicImage, format: ExportFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
            image.to_rgb8().write_with_encoder(encoder)?;
        }
        ExportFormat::Webp => {
            DynamicImage::ImageRgba8(image.to_rgba8())
                .write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
        }
        ExportFormat::Png => {
            image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
        }
    }
    tracing::debug!(%format, bytes = bytes.len(), "image encoded");
    Ok(bytes)
}
