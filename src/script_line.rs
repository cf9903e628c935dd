/*!
 * One line of an `.ass` script.
 *
 * Dialogue and Comment lines are split into their ten event fields; every
 * other line (section headers, `Format:`, script info, `Style:` definitions)
 * is kept verbatim so the script can be written back byte for byte.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{LineError, LineParseError};
use crate::timecode::{TimeDelta, Timestamp};
use crate::timing::{Classification, Relation};

/// Number of comma-delimited fields in a Dialogue/Comment line
pub const EVENT_FIELD_COUNT: usize = 10;

/// Line type, decided by the line prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Style,
    Dialogue,
    Comment,
    Header,
}

impl LineKind {
    /// Detect the kind from a raw line, returning the remainder after the prefix
    fn detect(line: &str) -> (Self, &str) {
        if let Some(rest) = line.strip_prefix("Dialogue:") {
            (Self::Dialogue, rest)
        } else if let Some(rest) = line.strip_prefix("Comment:") {
            (Self::Comment, rest)
        } else if let Some(rest) = line.strip_prefix("Style:") {
            (Self::Style, rest)
        } else {
            (Self::Header, line)
        }
    }

    /// Prefix written in front of the fields, without the colon
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Style => "Style",
            Self::Dialogue => "Dialogue",
            Self::Comment => "Comment",
            Self::Header => "",
        }
    }

    /// Whether the kind carries timing (Dialogue or Comment)
    pub fn is_event(&self) -> bool {
        matches!(self, Self::Dialogue | Self::Comment)
    }
}

/// The ten fields of a Dialogue/Comment line.
///
/// `start` and `end` are private: timing changes go through
/// [`ScriptLine::set_end`] so the duration always follows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub layer: String,
    start: Timestamp,
    end: Timestamp,
    pub style: String,
    pub actor: String,
    pub margin_l: String,
    pub margin_r: String,
    pub margin_v: String,
    pub effect: String,
    pub text: String,
}

impl EventFields {
    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// `end - start`, derived on every call
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// A single parsed script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    line_num: usize,
    event_line_num: Option<usize>,
    kind: LineKind,
    raw: String,
    event: Option<EventFields>,
}

impl ScriptLine {
    /// Parse one raw line.
    ///
    /// `line_num` is the 1-based position in the file. Dialogue/Comment lines
    /// must have ten fields; the last one is the text and may contain commas.
    pub fn parse(raw_text: &str, line_num: usize) -> Result<Self, LineParseError> {
        let raw = raw_text.trim_end_matches(['\r', '\n']).to_string();
        let trimmed = raw.trim_end();
        let (kind, rest) = LineKind::detect(trimmed);

        if !kind.is_event() {
            return Ok(Self {
                line_num,
                event_line_num: None,
                kind,
                raw,
                event: None,
            });
        }

        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        let fields: Vec<&str> = rest.splitn(EVENT_FIELD_COUNT, ',').collect();
        if fields.len() < EVENT_FIELD_COUNT {
            return Err(LineParseError::TooFewFields {
                line_num,
                found: fields.len(),
            });
        }

        let time = |text: &str| {
            Timestamp::parse(text).map_err(|source| LineParseError::Timestamp { line_num, source })
        };

        let event = EventFields {
            layer: fields[0].to_string(),
            start: time(fields[1])?,
            end: time(fields[2])?,
            style: fields[3].to_string(),
            actor: fields[4].to_string(),
            margin_l: fields[5].to_string(),
            margin_r: fields[6].to_string(),
            margin_v: fields[7].to_string(),
            effect: fields[8].to_string(),
            text: fields[9].to_string(),
        };

        Ok(Self {
            line_num,
            event_line_num: None,
            kind,
            raw,
            event: Some(event),
        })
    }

    /// Keep a line verbatim as an opaque header line.
    ///
    /// Used for event lines that failed to parse.
    pub fn opaque(raw_text: &str, line_num: usize) -> Self {
        Self {
            line_num,
            event_line_num: None,
            kind: LineKind::Header,
            raw: raw_text.trim_end_matches(['\r', '\n']).to_string(),
            event: None,
        }
    }

    pub fn line_num(&self) -> usize {
        self.line_num
    }

    /// Position among Dialogue/Comment lines, `None` for other kinds
    pub fn event_line_num(&self) -> Option<usize> {
        self.event_line_num
    }

    pub(crate) fn set_event_line_num(&mut self, num: usize) {
        self.event_line_num = Some(num);
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn is_dialogue(&self) -> bool {
        self.kind == LineKind::Dialogue
    }

    /// The line as read, without its terminator
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn event(&self) -> Option<&EventFields> {
        self.event.as_ref()
    }

    pub fn start(&self) -> Option<Timestamp> {
        self.event.as_ref().map(EventFields::start)
    }

    pub fn end(&self) -> Option<Timestamp> {
        self.event.as_ref().map(EventFields::end)
    }

    pub fn duration(&self) -> Option<TimeDelta> {
        self.event.as_ref().map(EventFields::duration)
    }

    /// Style name with surrounding whitespace removed
    pub fn style(&self) -> Option<&str> {
        self.event.as_ref().map(|e| e.style.trim())
    }

    pub fn effect(&self) -> Option<&str> {
        self.event.as_ref().map(|e| e.effect.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.event.as_ref().map(|e| e.text.as_str())
    }

    /// `(start, end)` of a Dialogue line; `None` for any other kind
    pub fn dialogue_times(&self) -> Option<(Timestamp, Timestamp)> {
        match (&self.kind, &self.event) {
            (LineKind::Dialogue, Some(event)) => Some((event.start, event.end)),
            _ => None,
        }
    }

    /// Replace the end time. This is the only way timing changes.
    pub fn set_end(&mut self, new_end: Timestamp) -> Result<(), LineError> {
        let line_num = self.line_num;
        let event = self.event.as_mut().ok_or(LineError::NotAnEvent { line_num })?;
        event.end = new_end;
        Ok(())
    }

    /// Replace the event text
    pub fn set_text(&mut self, text: String) -> Result<(), LineError> {
        let line_num = self.line_num;
        let event = self.event.as_mut().ok_or(LineError::NotAnEvent { line_num })?;
        event.text = text;
        Ok(())
    }

    /// Single-line flash check against `threshold`.
    ///
    /// `Flash` when the duration is below the threshold, with the missing
    /// amount as gap. `Error` for anything but a Dialogue line.
    pub fn check_flash(&self, threshold: TimeDelta) -> Classification {
        let Some((start, end)) = self.dialogue_times() else {
            return Classification::error();
        };

        let deficit = threshold - (end - start);
        if deficit.millis() > 0 {
            Classification::new(Relation::Flash, deficit)
        } else {
            Classification::new(Relation::None, deficit)
        }
    }

    /// Render the line back to script text
    pub fn serialize(&self) -> String {
        match &self.event {
            Some(e) => format!(
                "{}: {},{},{},{},{},{},{},{},{},{}",
                self.kind.prefix(),
                e.layer,
                e.start,
                e.end,
                e.style,
                e.actor,
                e.margin_l,
                e.margin_r,
                e.margin_v,
                e.effect,
                e.text
            ),
            None => self.raw.clone(),
        }
    }
}

impl fmt::Display for ScriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialize())
    }
}
