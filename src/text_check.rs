/*!
 * Text and punctuation pass.
 *
 * Each event line is checked against an immutable rule table:
 * - keywords that look like untranslated placeholders or proofreading
 *   markers are reported;
 * - punctuation that cannot be replaced safely is reported;
 * - otherwise full-width punctuation from the replacement table is
 *   rewritten to its script-safe equivalent.
 */

use serde::{Deserialize, Serialize};

use crate::errors::LineError;
use crate::report::{Diagnostic, DiagnosticKind};
use crate::script_line::ScriptLine;

/// One entry of the replacement table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Rule table for the text pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRules {
    /// Substrings that mark a line for review
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Characters that are reported but never rewritten
    #[serde(default = "default_unsafe_punctuation")]
    pub unsafe_punctuation: Vec<char>,

    /// Replacements applied in table order
    #[serde(default = "default_replacements")]
    pub replacements: Vec<Replacement>,
}

impl Default for TextRules {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            unsafe_punctuation: default_unsafe_punctuation(),
            replacements: default_replacements(),
        }
    }
}

fn default_keywords() -> Vec<String> {
    ["???", "？？？", "待校", "校对", "未翻译", "翻译注", "TBD"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_unsafe_punctuation() -> Vec<char> {
    vec!['"', '“', '”', '‘', '’', '…', '—']
}

fn default_replacements() -> Vec<Replacement> {
    vec![
        Replacement::new("，", " "),
        Replacement::new("。", " "),
        Replacement::new("、", " "),
        Replacement::new("；", " "),
        Replacement::new("：", ":"),
        Replacement::new("！", "!"),
        Replacement::new("？", "?"),
        Replacement::new("（", "("),
        Replacement::new("）", ")"),
        Replacement::new("～", "~"),
    ]
}

/// Runs the text rules over event lines
#[derive(Debug, Clone, Default)]
pub struct TextChecker {
    rules: TextRules,
}

impl TextChecker {
    pub fn new(rules: TextRules) -> Self {
        Self { rules }
    }

    /// Check one event line, rewriting its text when a replacement applies.
    ///
    /// Every returned diagnostic counts as one character issue. Lines
    /// without text (headers, styles) yield nothing.
    pub fn check_line(&self, line: &mut ScriptLine) -> Result<Vec<Diagnostic>, LineError> {
        let (Some(num), Some(text)) = (line.event_line_num(), line.text()) else {
            return Ok(Vec::new());
        };

        if let Some(keyword) = self.rules.keywords.iter().find(|k| text.contains(k.as_str())) {
            return Ok(vec![Diagnostic::new(
                DiagnosticKind::SuspiciousText,
                num,
                format!("suspicious text ('{}'): {}", keyword, text),
            )]);
        }

        if let Some(ch) = text.chars().find(|c| self.rules.unsafe_punctuation.contains(c)) {
            return Ok(vec![Diagnostic::new(
                DiagnosticKind::UnsafePunctuation,
                num,
                format!("'{}' cannot be fixed automatically: {}", ch, text),
            )]);
        }

        let mut fixed = text.to_string();
        let mut diagnostics = Vec::new();
        for rep in &self.rules.replacements {
            if rep.from.is_empty() || !fixed.contains(rep.from.as_str()) {
                continue;
            }
            let before = fixed.clone();
            fixed = fixed.replace(rep.from.as_str(), &rep.to);
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::PunctuationReplaced,
                num,
                format!("'{}' -> '{}': {} => {}", rep.from, rep.to, before, fixed),
            ));
        }

        if !diagnostics.is_empty() {
            line.set_text(fixed)?;
        }
        Ok(diagnostics)
    }
}
