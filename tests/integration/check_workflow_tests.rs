/*!
 * Integration tests for single file and folder runs
 */

use anyhow::Result;
use std::fs;
use assqc::app_config::{CheckerConfig, Config};
use assqc::app_controller::Controller;
use assqc::checker::{CheckerState, ScriptChecker};
use assqc::errors::{AppError, CheckerError};
use assqc::file_utils::{FileManager, UTF8_BOM};
use crate::common;

/// Test the full handle() run on a script with one issue of every kind
#[test]
fn test_handle_withMixedScript_shouldWriteScriptAndReport() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_script(temp_dir.path(), "episode.ass")?;

    let mut checker = ScriptChecker::new(CheckerConfig::default());
    checker.init_file(&input, true)?;
    let outcome = checker.handle(false, None)?;

    assert_eq!(outcome.counters.character_count, 1);
    assert_eq!(outcome.counters.overlap_count, 1);
    assert_eq!(outcome.counters.flash_count, 2);
    assert_eq!(checker.state(), CheckerState::Serialized);

    let script_bytes = fs::read(&outcome.output_script_path)?;
    assert!(script_bytes.starts_with(UTF8_BOM.as_bytes()));
    let script = String::from_utf8(script_bytes)?;
    assert!(script.starts_with(&format!("{}{}", UTF8_BOM, common::SCRIPT_HEADER)));
    assert!(script.contains("Dialogue: 0,0:00:01.00,0:00:01.50,Default,,0,0,0,,Short line\n"));
    assert!(script.contains("Dialogue: 0,0:00:05.00,0:00:10.00,Default,,0,0,0,,Long line\n"));
    assert!(script.contains("Dialogue: 0,0:00:14.00,0:00:16.20,Default,,0,0,0,,你好 世界\n"));

    let report = fs::read_to_string(&outcome.output_report_path)?;
    assert!(report.starts_with("Timing and text check for episode.ass"));
    assert!(report.contains("[overlap] lines 2 & 3"));
    assert!(report.contains("[flash-connected] lines 4 & 5"));
    assert!(report.ends_with("Character issues: 1\nOverlaps: 1\nFlashes: 2\n"));

    assert_eq!(outcome.output_script_path.parent(), Some(temp_dir.path()));
    assert!(FileManager::is_generated_output(&outcome.output_script_path));
    assert!(FileManager::is_generated_output(&outcome.output_report_path));

    assert!(matches!(checker.handle(false, None), Err(CheckerError::AlreadyHandled)));
    Ok(())
}

/// Test that a clean script comes back unchanged apart from the BOM
#[test]
fn test_handle_withCleanScript_shouldRoundTripByteForByte() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::clean_script();
    let input = common::create_test_file(temp_dir.path(), "clean.ass", &content)?;

    let mut checker = ScriptChecker::new(CheckerConfig::default());
    checker.init_file(&input, true)?;
    let outcome = checker.handle(true, None)?;

    assert_eq!(outcome.counters.total(), 0);
    let written = fs::read_to_string(&outcome.output_script_path)?;
    assert_eq!(written, format!("{}{}", UTF8_BOM, content));
    assert!(fs::read_to_string(&outcome.output_report_path)?.contains("No issues found."));
    Ok(())
}

/// Test that a malformed event line is carried over and reported, not fatal
#[test]
fn test_handle_withMalformedLine_shouldKeepItAndReport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let broken = "Dialogue: 0,0:00:02.00,0:00:03.00,Default";
    let content = common::script(&[
        common::dialogue("0:00:01.00", "0:00:01.20", "short"),
        format!("{}\n", broken),
        common::dialogue("0:00:05.00", "0:00:07.00", "next"),
    ]);
    let input = common::create_test_file(temp_dir.path(), "broken.ass", &content)?;

    let mut checker = ScriptChecker::new(CheckerConfig::default());
    checker.init_file(&input, true)?;
    let outcome = checker.handle(false, None)?;

    assert_eq!(outcome.counters.flash_count, 1);
    let written = fs::read_to_string(&outcome.output_script_path)?;
    assert!(written.contains(&format!("{}\n", broken)));
    let report = fs::read_to_string(&outcome.output_report_path)?;
    assert!(report.contains("[unparsed] line"));
    Ok(())
}

/// Test that back-to-back runs on one script keep each other's outputs
#[test]
fn test_handle_twiceInARow_shouldWriteDistinctOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_script(temp_dir.path(), "episode.ass")?;

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        let mut checker = ScriptChecker::new(CheckerConfig::default());
        checker.init_file(&input, true)?;
        outcomes.push(checker.handle(false, None)?);
    }

    assert_ne!(outcomes[0].output_script_path, outcomes[1].output_script_path);
    assert_ne!(outcomes[1].output_script_path, outcomes[2].output_script_path);
    assert_ne!(outcomes[0].output_report_path, outcomes[2].output_report_path);
    assert!(outcomes.iter().all(|o| o.output_script_path.exists() && o.output_report_path.exists()));
    Ok(())
}

/// Test that a configured output directory is created and used
#[test]
fn test_controllerRun_withOutputDir_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_script(temp_dir.path(), "episode.ass")?;
    let out_dir = temp_dir.path().join("checked");

    let mut config = Config::default();
    config.checker.output_dir = Some(out_dir.clone());
    config.checker.flash_mode = true;
    let controller = Controller::with_config(config)?;

    let outcome = controller.run(&input)?;

    assert_eq!(outcome.output_script_path.parent(), Some(out_dir.as_path()));
    assert!(outcome.output_script_path.exists());
    assert!(outcome.output_report_path.exists());
    Ok(())
}

/// Test that a wrong extension surfaces as an error from the controller
#[test]
fn test_controllerRun_withSrtFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "episode.srt", "1\n")?;
    let controller = Controller::with_config(Config::default())?;

    let err = controller.run(&input).unwrap_err();

    assert!(matches!(err, AppError::Checker(CheckerError::InvalidExtension(_))));
    Ok(())
}

/// Test folder mode: every script is checked once and old outputs are skipped
#[test]
fn test_runFolder_withScripts_shouldCheckEachAndSkipOutputs() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("season1");
    fs::create_dir(&nested)?;
    common::create_test_script(temp_dir.path(), "ep01.ass")?;
    common::create_test_file(&nested, "ep02.ass", &common::clean_script())?;
    common::create_test_file(temp_dir.path(), "ep00_20240101_000000_改.ass", &common::clean_script())?;
    common::create_test_file(temp_dir.path(), "broken.ass", "\u{0}")?;
    fs::write(temp_dir.path().join("bad.ass"), [0xff, 0xfe, 0x00])?;

    let controller = Controller::with_config(Config::default())?;
    let summary = controller.run_folder(temp_dir.path())?;

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.totals.overlap_count, 1);
    assert_eq!(summary.totals.flash_count, 2);
    Ok(())
}

/// Test that folder mode refuses a missing directory
#[test]
fn test_runFolder_withMissingDir_shouldFail() {
    let controller = Controller::with_config(Config::default()).unwrap();

    assert!(matches!(
        controller.run_folder(std::path::Path::new("no/such/dir")),
        Err(AppError::File(_))
    ));
}
