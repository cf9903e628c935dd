/*!
 * Pairwise timing classification.
 *
 * Compares an earlier and a later Dialogue line and says whether they are
 * chained end-to-start, overlapping, separated by a gap too short to read
 * (a multi-line flash), or unrelated. The checks are pure; fixing is the
 * checker's job.
 *
 * The gap is always `later.start - earlier.end`, so a negative gap means
 * the two lines overlap.
 */

use std::fmt;

use serde::Serialize;

use crate::script_line::ScriptLine;
use crate::timecode::TimeDelta;

/// Relationship between two lines (or one line and a threshold)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// First line ends exactly where the second starts
    Continuous,
    /// First line ends after the second starts
    Overlap,
    /// Display time or gap below the threshold
    Flash,
    /// No relationship of the checked kind
    None,
    /// The check was applied to something that is not a Dialogue line
    Error,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Continuous => "continuous",
            Self::Overlap => "overlap",
            Self::Flash => "flash",
            Self::None => "none",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one check: the relation and its signed gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub relation: Relation,
    pub gap: TimeDelta,
}

impl Classification {
    pub fn new(relation: Relation, gap: TimeDelta) -> Self {
        Self { relation, gap }
    }

    pub fn none(gap: TimeDelta) -> Self {
        Self::new(Relation::None, gap)
    }

    pub fn error() -> Self {
        Self::new(Relation::Error, TimeDelta::ZERO)
    }

    pub fn is(&self, relation: Relation) -> bool {
        self.relation == relation
    }
}

/// Whether the pair is skipped because style-aware mode sees different styles
pub fn styles_differ(earlier: &ScriptLine, later: &ScriptLine, style_mode: bool) -> bool {
    style_mode && earlier.style() != later.style()
}

/// Gap between two Dialogue lines, `None` if either is another kind
fn dialogue_gap(earlier: &ScriptLine, later: &ScriptLine) -> Option<TimeDelta> {
    let (_, earlier_end) = earlier.dialogue_times()?;
    let (later_start, _) = later.dialogue_times()?;
    Some(later_start - earlier_end)
}

/// `Continuous` when `earlier.end == later.start`
pub fn check_continuous(earlier: &ScriptLine, later: &ScriptLine, style_mode: bool) -> Classification {
    let Some(gap) = dialogue_gap(earlier, later) else {
        return Classification::error();
    };

    if styles_differ(earlier, later, style_mode) {
        return Classification::none(gap);
    }

    if gap.is_zero() {
        Classification::new(Relation::Continuous, TimeDelta::ZERO)
    } else {
        Classification::none(gap)
    }
}

/// `Overlap` when `earlier.end > later.start`, with the (negative) gap
pub fn check_overlap(earlier: &ScriptLine, later: &ScriptLine, style_mode: bool) -> Classification {
    let Some(gap) = dialogue_gap(earlier, later) else {
        return Classification::error();
    };

    if styles_differ(earlier, later, style_mode) {
        return Classification::none(TimeDelta::ZERO);
    }

    if gap.is_negative() {
        Classification::new(Relation::Overlap, gap)
    } else {
        Classification::none(gap)
    }
}

/// `Flash` when the gap between the lines is below `threshold`.
///
/// An overlapping pair yields `Error`: a flash check never applies to it.
/// A zero gap also counts as below the threshold; callers rule out
/// continuous pairs first.
pub fn check_flash(
    earlier: &ScriptLine,
    later: &ScriptLine,
    style_mode: bool,
    threshold: TimeDelta,
) -> Classification {
    let Some(gap) = dialogue_gap(earlier, later) else {
        return Classification::error();
    };

    if styles_differ(earlier, later, style_mode) {
        return Classification::none(gap);
    }

    if gap.is_negative() {
        Classification::new(Relation::Error, gap)
    } else if gap < threshold {
        Classification::new(Relation::Flash, gap)
    } else {
        Classification::none(gap)
    }
}
