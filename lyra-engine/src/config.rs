//! Engine configuration
//!
//! `EngineConfig` is the validated, typed form of the `[analysis]` table from
//! the TOML configuration file. The pipeline only ever sees a validated
//! config; range errors are reported once, at construction.

use crate::error::AnalysisError;
use lyra_common::config::AnalysisSettings;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Versioned analysis strategy, chosen once at pipeline construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStrategy {
    /// Tiered lexicon pipeline only
    #[default]
    Standard,
    /// Tiered pipeline plus the keyword legacy engine as a precedence layer
    LegacyBlend,
}

impl EngineStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::LegacyBlend => "legacy_blend",
        }
    }
}

impl fmt::Display for EngineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineStrategy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "standard" | "v2" => Ok(Self::Standard),
            "legacy_blend" | "legacy" | "v1" => Ok(Self::LegacyBlend),
            other => Err(AnalysisError::Config(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Validated engine parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub max_input_chars: usize,
    pub longform_line_threshold: usize,
    pub block_size: usize,
    /// Maximum distance of a section BPM from the global estimate
    pub section_bpm_delta: f64,
    /// Curve range above which the BPM profile is flagged as fractured
    pub fracture_threshold: f64,
    pub phrase_cache_capacity: usize,
    pub strategy: EngineStrategy,
    pub auto_resolve_genre_conflicts: bool,
    pub translate_non_latin: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 6000,
            longform_line_threshold: 120,
            block_size: 4,
            section_bpm_delta: 5.0,
            fracture_threshold: 6.0,
            phrase_cache_capacity: 256,
            strategy: EngineStrategy::Standard,
            auto_resolve_genre_conflicts: true,
            translate_non_latin: true,
        }
    }
}

impl EngineConfig {
    /// Validate settings loaded from TOML
    ///
    /// # Errors
    /// `AnalysisError::Config` for zero sizes, non-positive or non-finite
    /// deltas, or an unknown strategy name.
    pub fn from_settings(settings: &AnalysisSettings) -> Result<Self, AnalysisError> {
        if settings.max_input_chars == 0 {
            return Err(AnalysisError::Config("max_input_chars must be > 0".into()));
        }
        if settings.block_size == 0 {
            return Err(AnalysisError::Config("block_size must be > 0".into()));
        }
        if settings.longform_line_threshold == 0 {
            return Err(AnalysisError::Config(
                "longform_line_threshold must be > 0".into(),
            ));
        }
        if !(settings.section_bpm_delta.is_finite() && settings.section_bpm_delta > 0.0) {
            return Err(AnalysisError::Config(
                "section_bpm_delta must be a positive number".into(),
            ));
        }
        if !(settings.fracture_threshold.is_finite() && settings.fracture_threshold >= 0.0) {
            return Err(AnalysisError::Config(
                "fracture_threshold must be a non-negative number".into(),
            ));
        }

        Ok(Self {
            max_input_chars: settings.max_input_chars,
            longform_line_threshold: settings.longform_line_threshold,
            block_size: settings.block_size,
            section_bpm_delta: settings.section_bpm_delta,
            fracture_threshold: settings.fracture_threshold,
            phrase_cache_capacity: settings.phrase_cache_capacity,
            strategy: settings.strategy.parse()?,
            auto_resolve_genre_conflicts: settings.auto_resolve_genre_conflicts,
            translate_non_latin: settings.translate_non_latin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_settings_defaults() {
        let config = EngineConfig::from_settings(&AnalysisSettings::default()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("standard".parse::<EngineStrategy>().unwrap(), EngineStrategy::Standard);
        assert_eq!("Legacy-Blend".parse::<EngineStrategy>().unwrap(), EngineStrategy::LegacyBlend);
        assert!("turbo".parse::<EngineStrategy>().is_err());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = AnalysisSettings::default();
        settings.section_bpm_delta = 0.0;
        assert!(matches!(
            EngineConfig::from_settings(&settings),
            Err(AnalysisError::Config(_))
        ));

        let mut settings = AnalysisSettings::default();
        settings.block_size = 0;
        assert!(EngineConfig::from_settings(&settings).is_err());

        let mut settings = AnalysisSettings::default();
        settings.strategy = "nope".into();
        assert!(EngineConfig::from_settings(&settings).is_err());
    }
}
