/*!
 * Tests for application configuration functionality
 */

use assqc::app_config::{CheckerConfig, Config, LogLevel, StyleMode};
use assqc::text_check::Replacement;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.checker.single_threshold_ms, 500);
    assert_eq!(config.checker.multi_threshold_ms, 300);
    assert!(!config.checker.flash_mode);
    assert_eq!(config.checker.style_mode, StyleMode::Auto);
    assert!(!config.checker.check_effect_lines);
    assert!(config.checker.output_dir.is_none());
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.checker.single_threshold_ms = 0;
    assert!(config.validate().is_err());
    config.checker.single_threshold_ms = 500;

    config.checker.multi_threshold_ms = 0;
    assert!(config.validate().is_err());
    config.checker.multi_threshold_ms = 300;

    config.checker.text_rules.replacements.push(Replacement::new("", "x"));
    assert!(config.validate().is_err());
    config.checker.text_rules.replacements.pop();

    assert!(config.validate().is_ok());
}

/// Test that a partial file falls back to defaults for missing keys
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "checker": { "single_threshold_ms": 600, "style_mode": "off", "flash_mode": true },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.checker.single_threshold_ms, 600);
    assert_eq!(config.checker.multi_threshold_ms, 300);
    assert_eq!(config.checker.style_mode, StyleMode::Off);
    assert!(config.checker.flash_mode);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
}

/// Test that the default config survives a JSON round trip
#[test]
fn test_serialize_withDefaultConfig_shouldReadBackEqual() {
    let json = serde_json::to_string_pretty(&Config::default()).unwrap();
    let config: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(config.checker, CheckerConfig::default());
    assert!(json.contains("\"style_mode\": \"auto\""));
}

/// Test style mode parsing and overrides
#[test]
fn test_styleMode_fromStr_shouldMapToOverride() {
    assert_eq!("auto".parse::<StyleMode>().unwrap().as_override(), None);
    assert_eq!("ON".parse::<StyleMode>().unwrap().as_override(), Some(true));
    assert_eq!("false".parse::<StyleMode>().unwrap().as_override(), Some(false));
    assert!("sometimes".parse::<StyleMode>().is_err());
    assert_eq!(StyleMode::Off.to_string(), "off");
}
