// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use assqc::app_config::{self, Config, StyleMode};
use assqc::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for StyleMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliStyleMode {
    Auto,
    On,
    Off,
}

impl From<CliStyleMode> for StyleMode {
    fn from(cli_mode: CliStyleMode) -> Self {
        match cli_mode {
            CliStyleMode::Auto => StyleMode::Auto,
            CliStyleMode::On => StyleMode::On,
            CliStyleMode::Off => StyleMode::Off,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check subtitle scripts (default command)
    Check(CheckArgs),

    /// Generate shell completions for assqc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Input .ass script or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Auto-fix flashes that would otherwise only be reported
    #[arg(short, long, overrides_with = "no_flash_mode")]
    flash_mode: bool,

    /// Only report such flashes, even if the config enables flash mode
    #[arg(long, overrides_with = "flash_mode")]
    no_flash_mode: bool,

    /// Compare only lines of the same style
    #[arg(short, long, value_enum)]
    style_mode: Option<CliStyleMode>,

    /// Minimum display time of one line in milliseconds
    #[arg(long)]
    single_threshold: Option<u64>,

    /// Minimum gap between two lines in milliseconds
    #[arg(long)]
    multi_threshold: Option<u64>,

    /// Include lines with an effect in the timing pass
    #[arg(long, overrides_with = "no_check_effects")]
    check_effects: bool,

    /// Leave lines with an effect out of the timing pass
    #[arg(long, overrides_with = "check_effects")]
    no_check_effects: bool,

    /// Directory for the corrected script and report
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    json: bool,
}

/// assqc - timing and text QC for .ass subtitle scripts
#[derive(Parser, Debug)]
#[command(name = "assqc")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Timing and text checker for .ass subtitle scripts")]
#[command(long_about = "assqc finds flashes, overlaps and suspicious text in .ass subtitle scripts,
fixes what can be fixed safely, and writes a corrected script plus a report.

EXAMPLES:
    assqc episode01.ass                   # Check using default config
    assqc -f episode01.ass                # Also auto-fix flashes that interact with the next line
    assqc --no-flash-mode episode01.ass   # Only report them, whatever conf.json says
    assqc -s off episode01.ass            # Compare lines regardless of style
    assqc --single-threshold 600 subs/    # Check a whole directory
    assqc --json episode01.ass            # Print counters and output paths as JSON
    assqc completions bash > assqc.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Command line options override the file.

OUTPUT:
    <name>_<stamp>_改.ass   corrected script (UTF-8 with BOM)
    <name>_<stamp>_锤.txt   diagnostic report")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    check: CheckArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Level is lowered or raised once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "assqc", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Check(args)) => run_check(args),
        None => run_check(cli.check),
    }
}

/// Load conf.json, or write a default one when it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;
        Ok(config)
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

/// Command line values win over the config file
fn apply_overrides(config: &mut Config, options: &CheckArgs) {
    let checker = &mut config.checker;

    if options.flash_mode {
        checker.flash_mode = true;
    } else if options.no_flash_mode {
        checker.flash_mode = false;
    }
    if let Some(style_mode) = &options.style_mode {
        checker.style_mode = style_mode.clone().into();
    }
    if let Some(single) = options.single_threshold {
        checker.single_threshold_ms = single;
    }
    if let Some(multi) = options.multi_threshold {
        checker.multi_threshold_ms = multi;
    }
    if options.check_effects {
        checker.check_effect_lines = true;
    } else if options.no_check_effects {
        checker.check_effect_lines = false;
    }
    if let Some(dir) = &options.output_dir {
        checker.output_dir = Some(dir.clone());
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

fn run_check(options: CheckArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required"))?;

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if input_path.is_file() {
        let outcome = controller.run(&input_path)?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            info!("Success: {}", outcome.output_script_path.display());
            info!("Report: {}", outcome.output_report_path.display());
        }
    } else if input_path.is_dir() {
        let summary = controller.run_folder(&input_path)?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&summary.outcomes)?);
        }
        if summary.failed > 0 {
            return Err(anyhow!("{} script(s) could not be checked", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}
