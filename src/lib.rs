/*!
 * # assqc - timing and text QC for `.ass` subtitle scripts
 *
 * Finds and, where it is safe, fixes timing defects between dialogue lines,
 * and flags suspicious text in a script.
 *
 * ## Features
 *
 * - Flash detection: lines shown too briefly, and gaps too short to read
 * - Overlap detection between lines of the same style
 * - Recognition of continuous (end-to-start chained) lines
 * - Keyword and punctuation pass with a configurable replacement table
 * - Lossless round-trip: header and style lines are written back unchanged
 * - Corrected script (`*_改.ass`) and plain-text report (`*_锤.txt`) per run
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: `H:MM:SS.CC` timestamps and signed deltas
 * - `script_line`: parsing and serialization of one script line
 * - `timing`: pairwise classification (continuous, overlap, flash)
 * - `text_check`: keyword and punctuation rules
 * - `report`: diagnostics and counters
 * - `checker`: the script checker state machine and timing rules
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `app_controller`: Single-file and folder runs
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod timecode;
pub mod script_line;
pub mod timing;
pub mod text_check;
pub mod report;
pub mod checker;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{CheckerConfig, Config, StyleMode};
pub use checker::{CheckOutcome, CheckerState, ScriptChecker};
pub use errors::{AppError, CheckerError, LineParseError, MalformedTimestamp};
pub use report::{Counters, Diagnostic, DiagnosticKind, Report};
pub use script_line::{LineKind, ScriptLine};
pub use timecode::{TimeDelta, Timestamp};
pub use timing::{Classification, Relation};
