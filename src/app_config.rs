use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::text_check::TextRules;

/// Application configuration module
/// This module handles loading, validating and saving the checker settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Checker settings
    #[serde(default)]
    pub checker: CheckerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How the timing pass treats lines of different styles
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    // @mode: style-aware only when the script uses more than one style
    #[default]
    Auto,
    // @mode: always compare only lines of the same style
    On,
    // @mode: compare every pair regardless of style
    Off,
}

impl StyleMode {
    /// Explicit override for the checker, `None` when detection decides
    pub fn as_override(&self) -> Option<bool> {
        match self {
            Self::Auto => None,
            Self::On => Some(true),
            Self::Off => Some(false),
        }
    }
}

impl std::fmt::Display for StyleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::On => "on",
            Self::Off => "off",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for StyleMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "on" | "true" => Ok(Self::On),
            "off" | "false" => Ok(Self::Off),
            _ => Err(anyhow!("Invalid style mode: {}", s)),
        }
    }
}

/// Settings for one checker run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CheckerConfig {
    /// Minimum display time of a single line in milliseconds
    #[serde(default = "default_single_threshold_ms")]
    pub single_threshold_ms: u64,

    /// Minimum gap between two lines in milliseconds
    #[serde(default = "default_multi_threshold_ms")]
    pub multi_threshold_ms: u64,

    /// Auto-fix flashes that would otherwise only be reported
    #[serde(default)]
    pub flash_mode: bool,

    /// Style-aware comparison
    #[serde(default)]
    pub style_mode: StyleMode,

    /// Include lines with a non-empty effect field in the timing pass
    #[serde(default)]
    pub check_effect_lines: bool,

    /// Where to write the corrected script and report (default: next to the input)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Keyword, punctuation and replacement tables for the text pass
    #[serde(default)]
    pub text_rules: TextRules,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            single_threshold_ms: default_single_threshold_ms(),
            multi_threshold_ms: default_multi_threshold_ms(),
            flash_mode: false,
            style_mode: StyleMode::default(),
            check_effect_lines: false,
            output_dir: None,
            text_rules: TextRules::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_single_threshold_ms() -> u64 {
    500
}

fn default_multi_threshold_ms() -> u64 {
    300
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.checker.validate()
    }
}

impl CheckerConfig {
    /// Validate thresholds and the replacement table
    pub fn validate(&self) -> Result<()> {
        if self.single_threshold_ms == 0 {
            return Err(anyhow!("single_threshold_ms must be greater than zero"));
        }

        if self.multi_threshold_ms == 0 {
            return Err(anyhow!("multi_threshold_ms must be greater than zero"));
        }

        if let Some(rep) = self.text_rules.replacements.iter().find(|r| r.from.is_empty()) {
            return Err(anyhow!("Replacement with empty source text (target '{}')", rep.to));
        }

        Ok(())
    }
}
