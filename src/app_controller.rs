use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app_config::{Config, StyleMode};
use crate::checker::{CheckOutcome, ScriptChecker};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::report::Counters;

// @module: Application controller for script checking

/// Totals of a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub totals: Counters,
    pub outcomes: Vec<CheckOutcome>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check one script and write its corrected copy and report
    pub fn run(&self, input_file: &Path) -> Result<CheckOutcome, AppError> {
        let start_time = Instant::now();
        let checker_config = &self.config.checker;
        let style_mode = checker_config.style_mode;

        let mut checker = ScriptChecker::new(checker_config.clone());
        checker.init_file(input_file, style_mode == StyleMode::Auto)?;

        debug!(
            "Checking {:?} (flash mode {}, style mode {})",
            input_file, checker_config.flash_mode, style_mode
        );

        let outcome = checker.handle(checker_config.flash_mode, style_mode.as_override())?;

        info!(
            "{}: {} character issue(s), {} overlap(s), {} flash(es) in {}",
            input_file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
            outcome.counters.character_count,
            outcome.counters.overlap_count,
            outcome.counters.flash_count,
            Self::format_duration(start_time.elapsed())
        );

        Ok(outcome)
    }

    /// Check every script in a directory (recursive).
    /// Files written by an earlier run are skipped; a failing file does not
    /// stop the others.
    pub fn run_folder(&self, input_dir: &Path) -> Result<FolderSummary, AppError> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(AppError::File(format!("Input directory does not exist: {:?}", input_dir)));
        }

        let all_files = FileManager::find_files(input_dir, "ass")?;
        let mut summary = FolderSummary::default();
        let scripts: Vec<PathBuf> = all_files
            .into_iter()
            .filter(|path| {
                let generated = FileManager::is_generated_output(path);
                if generated {
                    summary.skipped += 1;
                }
                !generated
            })
            .collect();

        if scripts.is_empty() {
            return Err(AppError::File(format!("No .ass scripts found in directory: {:?}", input_dir)));
        }

        let folder_pb = ProgressBar::new(scripts.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scripts ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        for script in &scripts {
            let file_name = script
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Checking: {}", file_name));

            match self.run(script) {
                Ok(outcome) => {
                    summary.processed += 1;
                    summary.totals.character_count += outcome.counters.character_count;
                    summary.totals.overlap_count += outcome.counters.overlap_count;
                    summary.totals.flash_count += outcome.counters.flash_count;
                    summary.outcomes.push(outcome);
                }
                Err(e) => {
                    error!("Error checking {}: {}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder check complete");

        if summary.skipped > 0 {
            warn!("Skipped {} file(s) written by an earlier run", summary.skipped);
        }
        info!(
            "Folder check completed: {} checked, {} failed, {} issue(s) in total ({})",
            summary.processed,
            summary.failed,
            summary.totals.total(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
