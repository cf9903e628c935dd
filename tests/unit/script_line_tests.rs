/*!
 * Tests for script line parsing and serialization
 */

use assqc::errors::LineParseError;
use assqc::script_line::{LineKind, ScriptLine};
use assqc::timecode::{TimeDelta, Timestamp};
use assqc::timing::Relation;

/// Test that the text field keeps its commas
#[test]
fn test_parse_withCommasInText_shouldKeepThemInText() {
    let line = ScriptLine::parse("Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,One, two, three", 1).unwrap();

    assert_eq!(line.text(), Some("One, two, three"));
}

/// Test that override tags and margins survive a round trip
#[test]
fn test_serialize_withTagsAndMargins_shouldRoundTrip() {
    let raw = "Comment: 1,0:01:02.03,0:01:04.05,Sign,Narrator,10,20,30,Scroll up;10;200,{\\an8\\pos(960,50)}Title";
    let line = ScriptLine::parse(raw, 12).unwrap();

    assert_eq!(line.kind(), LineKind::Comment);
    assert_eq!(line.event().unwrap().margin_v, "30");
    assert_eq!(line.effect(), Some("Scroll up;10;200"));
    assert_eq!(line.serialize(), raw);
}

/// Test that anything without a known prefix is kept verbatim
#[test]
fn test_parse_withUnknownPrefix_shouldBeHeader() {
    for raw in ["[Events]", "Format: Layer, Start, End", "; comment line", "", "dialogue: lowercase"] {
        let line = ScriptLine::parse(raw, 1).unwrap();
        assert_eq!(line.kind(), LineKind::Header, "input {:?}", raw);
        assert_eq!(line.serialize(), raw);
    }
}

/// Test the reported line number on parse errors
#[test]
fn test_parse_withTooFewFields_shouldReportLineNumber() {
    let err = ScriptLine::parse("Dialogue: 0,0:00:01.00,0:00:02.00", 42).unwrap_err();

    assert_eq!(err.line_num(), 42);
    assert!(matches!(err, LineParseError::TooFewFields { found: 3, .. }));
}

/// Test that an opaque line keeps its text and has no timing
#[test]
fn test_opaque_shouldKeepRawText() {
    let line = ScriptLine::opaque("Dialogue: 0,bad,0:00:02.00,Default,,0,0,0,,x\r\n", 5);

    assert_eq!(line.kind(), LineKind::Header);
    assert_eq!(line.serialize(), "Dialogue: 0,bad,0:00:02.00,Default,,0,0,0,,x");
    assert!(line.start().is_none());
    assert_eq!(line.line_num(), 5);
}

/// Test that the flash deficit follows set_end
#[test]
fn test_checkFlash_afterSetEnd_shouldUseNewDuration() {
    let mut line = ScriptLine::parse("Dialogue: 0,0:00:01.00,0:00:01.20,Default,,0,0,0,,x", 1).unwrap();
    let threshold = TimeDelta::from_millis(500);

    assert_eq!(line.check_flash(threshold).relation, Relation::Flash);

    line.set_end(Timestamp::parse("0:00:01.50").unwrap()).unwrap();

    let result = line.check_flash(threshold);
    assert_eq!(result.relation, Relation::None);
    assert_eq!(result.gap, TimeDelta::ZERO);
}

/// Test that style lookups ignore surrounding whitespace
#[test]
fn test_style_withPadding_shouldBeTrimmed() {
    let line = ScriptLine::parse("Dialogue: 0,0:00:01.00,0:00:02.00, Default ,,0,0,0,,x", 1).unwrap();

    assert_eq!(line.style(), Some("Default"));
}

/// Test that dialogue_times is limited to Dialogue lines
#[test]
fn test_dialogueTimes_withComment_shouldBeNone() {
    let comment = ScriptLine::parse("Comment: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,x", 1).unwrap();

    assert!(comment.dialogue_times().is_none());
    assert!(comment.start().is_some());
}
