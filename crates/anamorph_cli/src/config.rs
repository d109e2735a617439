//! Anamorph configuration file handling

use std::fs;
use std::path::Path;

use anamorph_animation::{SpringConfig, SpringPreset};
use anamorph_frame::{AspectRatio, ExportFormat, OverlayMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "anamorph.toml";

/// Top-level configuration (anamorph.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AnamorphConfig {
    #[serde(default)]
    pub spring: SpringSection,
    #[serde(default)]
    pub desqueeze: DesqueezeSection,
    #[serde(default)]
    pub guides: GuidesSection,
}

/// Spring coefficients
#[derive(Debug, Deserialize, Serialize)]
pub struct SpringSection {
    /// subtle, medium, expressive or custom
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Manual stiffness; overrides the preset together with `damping`
    #[serde(default)]
    pub stiffness: Option<f64>,
    #[serde(default)]
    pub damping: Option<f64>,
}

fn default_preset() -> String {
    SpringPreset::Medium.id().to_string()
}

impl Default for SpringSection {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            stiffness: None,
            damping: None,
        }
    }
}

impl SpringSection {
    /// Resolve to validated coefficients.
    ///
    /// Explicit coefficients win over the preset; a missing one is taken
    /// from the preset.
    pub fn resolve(&self) -> Result<(SpringPreset, SpringConfig)> {
        let preset: SpringPreset = self
            .preset
            .parse()
            .with_context(|| format!("Invalid spring preset {:?}", self.preset))?;
        let base = preset.config().unwrap_or_default();

        if self.stiffness.is_none() && self.damping.is_none() {
            if preset == SpringPreset::Custom {
                anyhow::bail!("Spring preset \"custom\" needs stiffness and damping");
            }
            return Ok((preset, base));
        }

        let config = SpringConfig::new(
            self.stiffness.unwrap_or(base.stiffness()),
            self.damping.unwrap_or(base.damping()),
        )
        .context("Invalid spring coefficients")?;
        Ok((SpringPreset::identify(config), config))
    }
}

/// De-squeeze defaults
#[derive(Debug, Deserialize, Serialize)]
pub struct DesqueezeSection {
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    /// png, jpeg or webp (or a mime type)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_ratio() -> f64 {
    1.33
}

fn default_format() -> String {
    ExportFormat::Png.to_string()
}

impl Default for DesqueezeSection {
    fn default() -> Self {
        Self {
            ratio: default_ratio(),
            format: default_format(),
        }
    }
}

impl DesqueezeSection {
    pub fn export_format(&self) -> Result<ExportFormat> {
        self.format
            .parse()
            .with_context(|| format!("Invalid export format {:?}", self.format))
    }
}

/// Framing-guide defaults
#[derive(Debug, Deserialize, Serialize)]
pub struct GuidesSection {
    #[serde(default = "default_aspect")]
    pub ratio: String,
    /// matte or frame
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_aspect() -> String {
    AspectRatio::DEFAULT.label()
}

fn default_mode() -> String {
    OverlayMode::Matte.to_string()
}

fn default_opacity() -> f64 {
    0.5
}

impl Default for GuidesSection {
    fn default() -> Self {
        Self {
            ratio: default_aspect(),
            mode: default_mode(),
            opacity: default_opacity(),
        }
    }
}

impl GuidesSection {
    pub fn aspect(&self) -> Result<AspectRatio> {
        self.ratio
            .parse()
            .with_context(|| format!("Invalid guide ratio {:?}", self.ratio))
    }

    pub fn overlay_mode(&self) -> Result<OverlayMode> {
        self.mode
            .parse()
            .with_context(|| format!("Invalid overlay mode {:?}", self.mode))
    }
}

impl AnamorphConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load an explicit path, or `anamorph.toml` if present, or defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AnamorphConfig::from_toml("").unwrap();
        assert_eq!(
            config.spring.resolve().unwrap(),
            (SpringPreset::Medium, SpringConfig::medium())
        );
        assert_eq!(config.desqueeze.ratio, 1.33);
        assert_eq!(config.desqueeze.export_format().unwrap(), ExportFormat::Png);
        assert_eq!(config.guides.aspect().unwrap(), AspectRatio::WIDESCREEN);
        assert_eq!(config.guides.overlay_mode().unwrap(), OverlayMode::Matte);
        assert_eq!(config.guides.opacity, 0.5);
    }

    #[test]
    fn test_full_file() {
        let config = AnamorphConfig::from_toml(
            r#"
            [spring]
            preset = "expressive"

            [desqueeze]
            ratio = 2.0
            format = "image/jpeg"

            [guides]
            ratio = "2.39:1"
            mode = "frame"
            opacity = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.spring.resolve().unwrap().0, SpringPreset::Expressive);
        assert_eq!(config.desqueeze.export_format().unwrap(), ExportFormat::Jpeg);
        assert_eq!(config.guides.aspect().unwrap(), AspectRatio::SCOPE);
        assert_eq!(config.guides.overlay_mode().unwrap(), OverlayMode::Frame);
    }

    #[test]
    fn test_manual_coefficients_override_preset() {
        let section = SpringSection {
            preset: "subtle".into(),
            stiffness: Some(0.3),
            damping: None,
        };
        let (preset, config) = section.resolve().unwrap();
        assert_eq!(preset, SpringPreset::Custom);
        assert_eq!(config, SpringConfig::new(0.3, 0.86).unwrap());
    }

    #[test]
    fn test_matching_coefficients_report_preset() {
        let section = SpringSection {
            preset: "custom".into(),
            stiffness: Some(0.22),
            damping: Some(0.70),
        };
        assert_eq!(section.resolve().unwrap().0, SpringPreset::Expressive);
    }

    #[test]
    fn test_divergent_damping_rejected() {
        let section = SpringSection {
            preset: "custom".into(),
            stiffness: Some(0.2),
            damping: Some(1.05),
        };
        let err = section.resolve().unwrap_err();
        assert!(format!("{err:#}").contains("damping must be in (0, 1)"));
    }

    #[test]
    fn test_custom_without_coefficients_rejected() {
        let section = SpringSection {
            preset: "custom".into(),
            stiffness: None,
            damping: None,
        };
        assert!(section.resolve().is_err());
    }

    #[test]
    fn test_round_trip_toml() {
        let config = AnamorphConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AnamorphConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.guides.ratio, "16:9");
        assert_eq!(parsed.spring.preset, "medium");
    }
}
