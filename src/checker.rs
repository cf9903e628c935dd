/*!
 * Script checker: loads an `.ass` script, runs the text pass and the timing
 * pass, and writes the corrected script plus a diagnostic report.
 *
 * A checker moves through `Uninitialized -> Loaded -> TextChecked ->
 * TimingChecked -> Serialized`, strictly in that order.
 *
 * All raw lines live in one arena in file order. Events are addressed by
 * their 1-based event line number through `event_indices`, so a corrected
 * script is written back in the original order with headers untouched.
 *
 * The timing pass orders the Dialogue lines by start time (ties keep file
 * order) and compares each one with every line after it, so it is O(n²) in
 * the number of event lines. The inner scan stops at the first pair that
 * triggers a stopping rule, unless the fix just applied left the pair
 * overlapping; a second run would keep scanning past that overlap, so the
 * first one does too. Running the checker on its own output therefore
 * makes no further corrections.
 */

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::app_config::CheckerConfig;
use crate::errors::CheckerError;
use crate::file_utils::{FileManager, LineEnding, REPORT_SUFFIX, SCRIPT_SUFFIX, UTF8_BOM};
use crate::report::{Counters, Diagnostic, DiagnosticKind, Report};
use crate::script_line::ScriptLine;
use crate::text_check::TextChecker;
use crate::timecode::{TimeDelta, Timestamp};
use crate::timing::{self, Classification, Relation};

/// Checker life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerState {
    Uninitialized,
    Loaded,
    TextChecked,
    TimingChecked,
    Serialized,
}

/// Whether the inner scan goes on after a rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Everything the timing rules look at for one (start, end) pair
#[derive(Debug, Clone, Copy)]
pub struct PairContext {
    /// Single-line flash check of the start line; gap is the missing duration
    pub single_flash: Classification,
    pub continuous: Classification,
    pub overlap: Classification,
    pub multi_flash: Classification,
    /// `end_line.start - start_line.end`
    pub gap: TimeDelta,
    pub multi_threshold: TimeDelta,
}

impl PairContext {
    pub fn new(
        start_line: &ScriptLine,
        end_line: &ScriptLine,
        style_mode: bool,
        single_threshold: TimeDelta,
        multi_threshold: TimeDelta,
    ) -> Self {
        let continuous = timing::check_continuous(start_line, end_line, style_mode);
        Self {
            single_flash: start_line.check_flash(single_threshold),
            continuous,
            overlap: timing::check_overlap(start_line, end_line, style_mode),
            multi_flash: timing::check_flash(start_line, end_line, style_mode, multi_threshold),
            gap: continuous.gap,
            multi_threshold,
        }
    }

    pub fn is_single_flash(&self) -> bool {
        self.single_flash.is(Relation::Flash)
    }

    /// How much the start line must grow to stop being a flash
    pub fn deficit(&self) -> TimeDelta {
        self.single_flash.gap
    }

    /// Gap left to the end line once the single-line flash is fixed
    pub fn remaining_gap(&self) -> TimeDelta {
        self.gap - self.deficit()
    }
}

/// Named timing rules, evaluated in [`TIMING_RULES`] order, first match wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingRule {
    /// Lines overlap: report, keep scanning
    Overlap,
    /// Start line is too short but chained to the end line: report only
    FlashButContinuous,
    /// Fixing the short line would reach or cross the end line
    FlashUnfixable,
    /// Fixing the short line would leave a too-short gap to the end line
    FlashCreatesGapFlash,
    /// Chained and long enough: nothing to do
    AlreadyContinuous,
    /// Short line with room to grow: extend it
    SingleFlash,
    /// Gap to the end line too short: chain the lines
    MultiFlash,
}

/// Priority order of the timing rules
pub const TIMING_RULES: [TimingRule; 7] = [
    TimingRule::Overlap,
    TimingRule::FlashButContinuous,
    TimingRule::FlashUnfixable,
    TimingRule::FlashCreatesGapFlash,
    TimingRule::AlreadyContinuous,
    TimingRule::SingleFlash,
    TimingRule::MultiFlash,
];

impl TimingRule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::FlashButContinuous => "flash-but-continuous",
            Self::FlashUnfixable => "flash-unfixable",
            Self::FlashCreatesGapFlash => "flash-creates-gap-flash",
            Self::AlreadyContinuous => "already-continuous",
            Self::SingleFlash => "single-flash",
            Self::MultiFlash => "multi-flash",
        }
    }

    pub fn matches(&self, ctx: &PairContext) -> bool {
        match self {
            Self::Overlap => ctx.overlap.is(Relation::Overlap),
            Self::FlashButContinuous => {
                ctx.is_single_flash() && ctx.continuous.is(Relation::Continuous)
            }
            Self::FlashUnfixable => ctx.is_single_flash() && ctx.deficit() >= ctx.gap,
            Self::FlashCreatesGapFlash => {
                ctx.is_single_flash() && ctx.remaining_gap() < ctx.multi_threshold
            }
            Self::AlreadyContinuous => ctx.continuous.is(Relation::Continuous),
            Self::SingleFlash => ctx.is_single_flash(),
            Self::MultiFlash => ctx.multi_flash.is(Relation::Flash),
        }
    }

    /// First rule matching the pair
    pub fn select(ctx: &PairContext) -> Option<TimingRule> {
        TIMING_RULES.iter().copied().find(|rule| rule.matches(ctx))
    }
}

impl fmt::Display for TimingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result handed back to the host after `handle()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    #[serde(flatten)]
    pub counters: Counters,
    pub output_script_path: PathBuf,
    pub output_report_path: PathBuf,
}

/// Timing and text checker for one script
#[derive(Debug)]
pub struct ScriptChecker {
    config: CheckerConfig,
    text_checker: TextChecker,
    state: CheckerState,
    source: Option<PathBuf>,
    lines: Vec<ScriptLine>,
    event_indices: Vec<usize>,
    line_ending: LineEnding,
    final_newline: bool,
    style_mode: bool,
    counters: Counters,
    load_issues: Vec<Diagnostic>,
    report: Report,
}

impl ScriptChecker {
    /// Create a checker; the text rules come from the configuration
    pub fn new(config: CheckerConfig) -> Self {
        let text_checker = TextChecker::new(config.text_rules.clone());
        Self {
            config,
            text_checker,
            state: CheckerState::Uninitialized,
            source: None,
            lines: Vec::new(),
            event_indices: Vec::new(),
            line_ending: LineEnding::default(),
            final_newline: true,
            style_mode: false,
            counters: Counters::default(),
            load_issues: Vec::new(),
            report: Report::new(),
        }
    }

    /// Load a script file.
    ///
    /// The path must carry an `.ass` extension and exist; nothing is read
    /// otherwise and the checker stays uninitialized. With `auto_style` the
    /// style-aware mode is on unless the script uses a single style.
    pub fn init_file<P: AsRef<Path>>(&mut self, path: P, auto_style: bool) -> Result<(), CheckerError> {
        let path = path.as_ref();

        if !FileManager::has_ass_extension(path) {
            return Err(CheckerError::InvalidExtension(path.to_path_buf()));
        }
        if !FileManager::file_exists(path) {
            return Err(CheckerError::FileNotFound(path.to_path_buf()));
        }

        let content = FileManager::read_script(path).map_err(|source| CheckerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.load_str(&content, auto_style);
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    /// Load script text that is already in memory
    pub fn load_str(&mut self, content: &str, auto_style: bool) {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

        self.source = None;
        self.lines.clear();
        self.event_indices.clear();
        self.load_issues.clear();
        self.counters = Counters::default();
        self.report = Report::new();
        self.line_ending = LineEnding::detect(content);
        self.final_newline = content.is_empty() || content.ends_with('\n');

        for (idx, raw) in content.lines().enumerate() {
            let line_num = idx + 1;
            let line = match ScriptLine::parse(raw, line_num) {
                Ok(mut line) => {
                    if line.kind().is_event() {
                        self.event_indices.push(self.lines.len());
                        line.set_event_line_num(self.event_indices.len());
                    }
                    line
                }
                Err(e) => {
                    warn!("Keeping unparseable line {} verbatim: {}", line_num, e);
                    self.load_issues.push(Diagnostic::new(
                        DiagnosticKind::UnparsedLine,
                        e.line_num(),
                        format!("{} (kept unchanged)", e),
                    ));
                    ScriptLine::opaque(raw, line_num)
                }
            };
            self.lines.push(line);
        }

        self.flag_inverted_events();
        self.style_mode = auto_style && self.distinct_styles() != 1;
        self.state = CheckerState::Loaded;

        debug!(
            "Loaded {} lines ({} events, {} unparsed), style mode {}",
            self.lines.len(),
            self.event_indices.len(),
            self.load_issues.len(),
            self.style_mode
        );
    }

    /// Report events that end before they start; nothing in the passes fixes them
    fn flag_inverted_events(&mut self) {
        for &idx in &self.event_indices {
            let line = &self.lines[idx];
            let (Some(num), Some((start, end))) = (line.event_line_num(), line.dialogue_times()) else {
                continue;
            };
            if end < start {
                warn!("Line {} ends at {} before it starts at {}", line.line_num(), end, start);
                self.load_issues.push(Diagnostic::new(
                    DiagnosticKind::InvertedTiming,
                    num,
                    format!("ends at {} before it starts at {}, please fix by hand", end, start),
                ));
            }
        }
    }

    fn distinct_styles(&self) -> usize {
        self.event_lines()
            .filter_map(|line| line.style())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn state(&self) -> CheckerState {
        self.state
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn style_mode(&self) -> bool {
        self.style_mode
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Every line in file order
    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    /// Dialogue and Comment lines in file order
    pub fn event_lines(&self) -> impl Iterator<Item = &ScriptLine> {
        self.event_indices.iter().map(|&idx| &self.lines[idx])
    }

    /// Event line by its 1-based event line number
    pub fn event(&self, event_line_num: usize) -> Option<&ScriptLine> {
        let idx = *self.event_indices.get(event_line_num.checked_sub(1)?)?;
        self.lines.get(idx)
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    fn require_loaded(&self) -> Result<(), CheckerError> {
        match self.state {
            CheckerState::Uninitialized => Err(CheckerError::NotInitialized),
            CheckerState::Loaded => Ok(()),
            _ => Err(CheckerError::AlreadyHandled),
        }
    }

    /// Run the text pass over every event line in file order
    pub fn run_text_pass(&mut self) -> Result<(), CheckerError> {
        self.require_loaded()?;

        self.report.extend(self.load_issues.iter().cloned());
        for &idx in &self.event_indices {
            let found = self.text_checker.check_line(&mut self.lines[idx])?;
            self.counters.character_count += found.len();
            self.report.extend(found);
        }

        info!("Text pass: {} character issue(s)", self.counters.character_count);
        self.state = CheckerState::TextChecked;
        Ok(())
    }

    /// Lines taking part in the timing pass, as arena indices ordered by start
    fn timing_candidates(&self) -> Vec<usize> {
        let mut candidates: Vec<usize> = self
            .event_indices
            .iter()
            .copied()
            .filter(|&idx| {
                let line = &self.lines[idx];
                line.is_dialogue()
                    && (self.config.check_effect_lines
                        || line.effect().is_none_or(|e| e.trim().is_empty()))
            })
            .collect();
        // stable, so lines starting together stay in file order
        candidates.sort_by_key(|&idx| self.lines[idx].start());
        candidates
    }

    /// Run the pairwise timing pass.
    ///
    /// With `flash_mode` off, flashes whose fix would interact with the next
    /// line are only reported; plain flashes are always fixed.
    pub fn run_timing_pass(&mut self, flash_mode: bool) -> Result<(), CheckerError> {
        if self.state != CheckerState::TextChecked {
            return match self.state {
                CheckerState::Uninitialized => Err(CheckerError::NotInitialized),
                CheckerState::Loaded => {
                    self.run_text_pass()?;
                    self.run_timing_pass(flash_mode)
                }
                _ => Err(CheckerError::AlreadyHandled),
            };
        }

        let single = TimeDelta::from_millis(self.config.single_threshold_ms as i64);
        let multi = TimeDelta::from_millis(self.config.multi_threshold_ms as i64);
        let candidates = self.timing_candidates();

        for (pos, &start_idx) in candidates.iter().enumerate() {
            for &end_idx in &candidates[pos + 1..] {
                let start_line = &self.lines[start_idx];
                let end_line = &self.lines[end_idx];

                if timing::styles_differ(start_line, end_line, self.style_mode) {
                    continue;
                }

                let ctx = PairContext::new(start_line, end_line, self.style_mode, single, multi);
                let Some(rule) = TimingRule::select(&ctx) else {
                    continue;
                };

                debug!(
                    "Lines {:?} & {:?}: {} (gap {})",
                    start_line.event_line_num(),
                    end_line.event_line_num(),
                    rule,
                    ctx.gap
                );

                if self.apply_rule(rule, &ctx, start_idx, end_idx, flash_mode, single)? == Flow::Stop {
                    break;
                }
            }
        }

        info!(
            "Timing pass: {} overlap(s), {} flash(es)",
            self.counters.overlap_count, self.counters.flash_count
        );
        self.state = CheckerState::TimingChecked;
        Ok(())
    }

    fn apply_rule(
        &mut self,
        rule: TimingRule,
        ctx: &PairContext,
        start_idx: usize,
        end_idx: usize,
        flash_mode: bool,
        single: TimeDelta,
    ) -> Result<Flow, CheckerError> {
        let a = self.lines[start_idx].event_line_num().unwrap_or_default();
        let b = self.lines[end_idx].event_line_num().unwrap_or_default();
        let duration = self.lines[start_idx].duration().unwrap_or_default();
        let old_end = self.lines[start_idx].end().unwrap_or_default();
        let next_start = self.lines[end_idx].start().unwrap_or_default();

        match rule {
            TimingRule::Overlap => {
                self.counters.overlap_count += 1;
                self.report.push(Diagnostic::pair(
                    DiagnosticKind::Overlap,
                    a,
                    b,
                    format!("line {} ends {} after line {} starts", a, -ctx.gap, b),
                ));
                return Ok(Flow::Continue);
            }
            TimingRule::FlashButContinuous => {
                self.counters.flash_count += 1;
                self.report.push(Diagnostic::pair(
                    DiagnosticKind::FlashContinuous,
                    a,
                    b,
                    format!(
                        "lasts {} (< {}) but is continuous with line {}, left as-is",
                        duration, single, b
                    ),
                ));
            }
            TimingRule::FlashUnfixable => {
                self.counters.flash_count += 1;
                if flash_mode {
                    let new_end = old_end.add(ctx.deficit());
                    self.extend(start_idx, a, b, old_end, new_end, DiagnosticKind::FlashExtended)?;
                    // the fix crossed into the end line; scan on as for any overlap
                    if new_end > next_start {
                        return Ok(Flow::Continue);
                    }
                } else {
                    self.report.push(Diagnostic::pair(
                        DiagnosticKind::FlashManual,
                        a,
                        b,
                        format!(
                            "lasts {} (< {}); extending it by {} would run into line {}, please fix by hand",
                            duration,
                            single,
                            ctx.deficit(),
                            b
                        ),
                    ));
                }
            }
            TimingRule::FlashCreatesGapFlash => {
                self.counters.flash_count += 1;
                if flash_mode {
                    self.extend(start_idx, a, b, old_end, next_start, DiagnosticKind::FlashConnected)?;
                } else {
                    self.report.push(Diagnostic::pair(
                        DiagnosticKind::FlashManual,
                        a,
                        b,
                        format!(
                            "lasts {} (< {}); extending it would leave a gap of {} to line {}, please fix by hand",
                            duration,
                            single,
                            ctx.remaining_gap(),
                            b
                        ),
                    ));
                }
            }
            TimingRule::AlreadyContinuous => {}
            TimingRule::SingleFlash => {
                self.counters.flash_count += 1;
                let new_end = old_end.add(ctx.deficit());
                self.extend(start_idx, a, b, old_end, new_end, DiagnosticKind::FlashExtended)?;
            }
            TimingRule::MultiFlash => {
                self.counters.flash_count += 1;
                self.extend(start_idx, a, b, old_end, next_start, DiagnosticKind::FlashConnected)?;
            }
        }

        Ok(Flow::Stop)
    }

    fn extend(
        &mut self,
        idx: usize,
        a: usize,
        b: usize,
        old_end: Timestamp,
        new_end: Timestamp,
        kind: DiagnosticKind,
    ) -> Result<(), CheckerError> {
        self.lines[idx].set_end(new_end)?;
        let message = match kind {
            DiagnosticKind::FlashConnected => {
                format!("end {} -> {}, now continuous with line {}", old_end, new_end, b)
            }
            _ => format!("end {} -> {}", old_end, new_end),
        };
        self.report.push(Diagnostic::pair(kind, a, b, message));
        Ok(())
    }

    /// Run both passes without writing anything.
    ///
    /// `style_override` replaces the detected style mode when given.
    pub fn check(&mut self, flash_mode: bool, style_override: Option<bool>) -> Result<Counters, CheckerError> {
        self.require_loaded()?;
        if let Some(style_mode) = style_override {
            self.style_mode = style_mode;
        }

        self.run_text_pass()?;
        self.run_timing_pass(flash_mode)?;
        Ok(self.counters)
    }

    /// Corrected script text, without BOM
    pub fn render_script(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            out.push_str(&line.serialize());
            if i + 1 < self.lines.len() || self.final_newline {
                out.push_str(ending);
            }
        }
        out
    }

    /// Plain-text diagnostic report
    pub fn render_report(&self) -> String {
        let name = self
            .source
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        self.report.render(&name, &self.counters)
    }

    /// Run both passes and write the corrected script and the report.
    ///
    /// Outputs go to the configured output directory, or next to the input.
    /// A script loaded with `load_str` has no input location, so it needs an
    /// output directory.
    pub fn handle(&mut self, flash_mode: bool, style_override: Option<bool>) -> Result<CheckOutcome, CheckerError> {
        self.require_loaded()?;
        let (source, output_dir) = match (&self.source, &self.config.output_dir) {
            (Some(source), Some(dir)) => (source.clone(), dir.clone()),
            (Some(source), None) => (
                source.clone(),
                source.parent().map(Path::to_path_buf).unwrap_or_default(),
            ),
            (None, Some(dir)) => (PathBuf::from("script.ass"), dir.clone()),
            (None, None) => return Err(CheckerError::NoOutputLocation),
        };

        let counters = self.check(flash_mode, style_override)?;

        let stamp = FileManager::unique_stamp(&source, &output_dir, &FileManager::run_stamp());
        let script_path =
            FileManager::generate_output_path(&source, &output_dir, &stamp, SCRIPT_SUFFIX, "ass");
        let report_path =
            FileManager::generate_output_path(&source, &output_dir, &stamp, REPORT_SUFFIX, "txt");

        FileManager::write_with_bom(&script_path, &self.render_script()).map_err(|source| {
            CheckerError::Io {
                path: script_path.clone(),
                source,
            }
        })?;
        FileManager::write_to_file(&report_path, &self.render_report()).map_err(|source| {
            CheckerError::Io {
                path: report_path.clone(),
                source,
            }
        })?;

        self.state = CheckerState::Serialized;
        info!("Wrote {:?} and {:?}", script_path, report_path);

        Ok(CheckOutcome {
            counters,
            output_script_path: script_path,
            output_report_path: report_path,
        })
    }
}
