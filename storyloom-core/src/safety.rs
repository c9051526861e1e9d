//! Content-intensity limits and forbidden-content configuration.
//!
//! A [`StyleSafetyConfig`] is immutable for the duration of one pipeline
//! run. [`build_style_safety_config`] supplies the safety-first default
//! when the caller omits one.

use serde::{Deserialize, Serialize};

/// Intensity tier for heat, violence, and language limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    None,
    Low,
    Medium,
    High,
}

impl IntensityLevel {
    /// Lowercase name, as used in prompts and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            IntensityLevel::None => "none",
            IntensityLevel::Low => "low",
            IntensityLevel::Medium => "medium",
            IntensityLevel::High => "high",
        }
    }
}

/// Active content limits for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSafetyConfig {
    pub heat_level: IntensityLevel,
    pub violence_level: IntensityLevel,
    pub language_intensity: IntensityLevel,
    /// Subject matter the draft must not contain.
    #[serde(default)]
    pub forbidden_content: Vec<String>,
    /// Literal phrases the draft must not contain.
    #[serde(default)]
    pub taboo_phrases: Vec<String>,
    /// When non-empty, metaphors should draw only from these domains.
    #[serde(default)]
    pub allowed_metaphors: Vec<String>,
}

/// Return the caller's config untouched, or the safety-first default
/// when none was supplied.
pub fn build_style_safety_config(existing: Option<StyleSafetyConfig>) -> StyleSafetyConfig {
    existing.unwrap_or_else(default_config)
}

fn default_config() -> StyleSafetyConfig {
    StyleSafetyConfig {
        heat_level: IntensityLevel::Low,
        violence_level: IntensityLevel::Low,
        language_intensity: IntensityLevel::Low,
        forbidden_content: vec![
            "sexual content involving minors".to_string(),
            "non-consensual encounters framed as romantic".to_string(),
            "graphic gore".to_string(),
            "glorified self-harm".to_string(),
        ],
        taboo_phrases: Vec::new(),
        allowed_metaphors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_passes_through_existing() {
        let supplied = StyleSafetyConfig {
            heat_level: IntensityLevel::High,
            violence_level: IntensityLevel::Medium,
            language_intensity: IntensityLevel::Medium,
            forbidden_content: vec!["firearms".to_string()],
            taboo_phrases: vec!["very unique".to_string()],
            allowed_metaphors: vec!["weather".to_string()],
        };

        let config = build_style_safety_config(Some(supplied.clone()));
        assert_eq!(config, supplied);
    }

    #[test]
    fn test_default_is_conservative() {
        let config = build_style_safety_config(None);
        assert_eq!(config.heat_level, IntensityLevel::Low);
        assert_eq!(config.violence_level, IntensityLevel::Low);
        assert!(!config.forbidden_content.is_empty());
    }

    #[test]
    fn test_intensity_serializes_lowercase() {
        let json = serde_json::to_string(&IntensityLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");

        let parsed: IntensityLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(parsed, IntensityLevel::High);
    }
}
