/*!
 * Tests for timestamp parsing and arithmetic
 */

use assqc::errors::MalformedTimestamp;
use assqc::timecode::{TimeDelta, Timestamp};

fn ts(text: &str) -> Timestamp {
    Timestamp::parse(text).unwrap()
}

/// Test that every malformed shape is rejected with the offending text
#[test]
fn test_parse_withMalformedInput_shouldReturnMalformedTimestamp() {
    for bad in ["", "1:00", "0:00:01", "0:00:01.5", "0:00:01.500", "a:00:01.00", "0:60:00.00", "0:00:60.00", "0-00-01.00"] {
        let err = Timestamp::parse(bad).unwrap_err();
        assert_eq!(err, MalformedTimestamp(bad.to_string()), "input {:?}", bad);
    }
}

/// Test that a zero-padded hour is accepted and written back without padding
#[test]
fn test_display_withPaddedHourInput_shouldWriteSingleDigitHour() {
    assert_eq!(ts("00:00:01.50").to_string(), "0:00:01.50");
    assert_eq!(ts("12:34:56.78").to_string(), "12:34:56.78");
}

/// Test that deltas are signed and exact to the centisecond
#[test]
fn test_delta_withEitherOrder_shouldBeSigned() {
    let a = ts("0:00:10.00");
    let b = ts("0:00:09.50");

    assert_eq!(b.delta(&a), TimeDelta::from_millis(-500));
    assert_eq!(a - b, TimeDelta::from_millis(500));
    assert_eq!(ts("1:00:00.00") - ts("0:59:59.99"), TimeDelta::from_centis(1));
}

/// Test that adding carries over every unit boundary
#[test]
fn test_add_acrossHourBoundary_shouldCarry() {
    assert_eq!(ts("0:59:59.80").add(TimeDelta::from_millis(300)).to_string(), "1:00:00.10");
    assert_eq!(ts("0:00:00.00").add(TimeDelta::from_millis(3_723_450)).to_string(), "1:02:03.45");
}

/// Test that subtracting borrows and never goes below zero
#[test]
fn test_subtract_belowZero_shouldSaturate() {
    assert_eq!(ts("0:01:00.10").subtract(TimeDelta::from_millis(200)).to_string(), "0:00:59.90");
    assert_eq!(ts("0:00:00.10").subtract(TimeDelta::from_millis(500)), Timestamp::default());
}

/// Test that a millisecond threshold rounds the extension up to the next centisecond
#[test]
fn test_add_withSubCentisecondDelta_shouldRoundUp() {
    assert_eq!(ts("0:00:01.00").add(TimeDelta::from_millis(305)).to_string(), "0:00:01.31");
}

/// Test the human-readable form of deltas used in reports
#[test]
fn test_deltaDisplay_shouldShowSeconds() {
    assert_eq!(TimeDelta::from_millis(-500).to_string(), "-0.50s");
    assert_eq!(TimeDelta::from_millis(1_200).to_string(), "1.20s");
    assert_eq!(TimeDelta::from_millis(305).to_string(), "0.305s");
}

/// Test that FromStr and parse agree
#[test]
fn test_fromStr_shouldMatchParse() {
    let parsed: Timestamp = "0:00:05.00".parse().unwrap();

    assert_eq!(parsed, ts("0:00:05.00"));
    assert!(ts("0:00:05.00") < ts("0:00:05.01"));
}
