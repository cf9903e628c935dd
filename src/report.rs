/*!
 * Diagnostic report built while a script is checked.
 *
 * Entries are appended in the order they are found: the text pass first
 * (file order), then the timing pass (pair visit order). The rendered
 * report ends with the three counters.
 */

use std::fmt;

use serde::Serialize;

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Text contains a placeholder or proofreading marker
    SuspiciousText,
    /// Text contains punctuation that cannot be replaced safely
    UnsafePunctuation,
    /// Punctuation was replaced automatically
    PunctuationReplaced,
    /// Two lines overlap
    Overlap,
    /// Short line, but chained to the next one, left as-is
    FlashContinuous,
    /// Flash that has to be fixed by hand
    FlashManual,
    /// Flash fixed by extending the line
    FlashExtended,
    /// Short gap closed by chaining the lines
    FlashConnected,
    /// Event line that could not be parsed and was kept verbatim
    UnparsedLine,
    /// Dialogue line that ends before it starts
    InvertedTiming,
}

impl DiagnosticKind {
    /// Short tag used in the rendered report
    pub fn label(&self) -> &'static str {
        match self {
            Self::SuspiciousText => "text",
            Self::UnsafePunctuation => "punctuation",
            Self::PunctuationReplaced => "punctuation-fixed",
            Self::Overlap => "overlap",
            Self::FlashContinuous => "flash-continuous",
            Self::FlashManual => "flash-manual",
            Self::FlashExtended => "flash-fixed",
            Self::FlashConnected => "flash-connected",
            Self::UnparsedLine => "unparsed",
            Self::InvertedTiming => "inverted",
        }
    }
}

/// A single report entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Event line number (raw line number for unparsed lines)
    pub line: usize,
    /// Second line of a pair, if any
    pub other_line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, message: String) -> Self {
        Self {
            kind,
            line,
            other_line: None,
            message,
        }
    }

    pub fn pair(kind: DiagnosticKind, line: usize, other_line: usize, message: String) -> Self {
        Self {
            kind,
            line,
            other_line: Some(other_line),
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.other_line {
            Some(other) => write!(
                f,
                "[{}] lines {} & {}: {}",
                self.kind.label(),
                self.line,
                other,
                self.message
            ),
            None => write!(f, "[{}] line {}: {}", self.kind.label(), self.line, self.message),
        }
    }
}

/// The three issue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub character_count: usize,
    pub overlap_count: usize,
    pub flash_count: usize,
}

impl Counters {
    pub fn total(&self) -> usize {
        self.character_count + self.overlap_count + self.flash_count
    }
}

/// Ordered list of diagnostics for one script
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(diagnostics);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the plain-text report with its closing summary
    pub fn render(&self, source_name: &str, counters: &Counters) -> String {
        let mut out = String::new();
        out.push_str(&format!("Timing and text check for {}\n\n", source_name));

        if self.entries.is_empty() {
            out.push_str("No issues found.\n");
        }
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&format!("Character issues: {}\n", counters.character_count));
        out.push_str(&format!("Overlaps: {}\n", counters.overlap_count));
        out.push_str(&format!("Flashes: {}\n", counters.flash_count));
        out
    }
}
