/*!
 * Tests for pairwise timing classification
 */

use assqc::script_line::ScriptLine;
use assqc::timecode::TimeDelta;
use assqc::timing::{Relation, check_continuous, check_flash, check_overlap};
use rand::Rng;

fn dialogue(start_cs: u64, end_cs: u64) -> ScriptLine {
    let start = assqc::timecode::Timestamp::from_centis(start_cs);
    let end = assqc::timecode::Timestamp::from_centis(end_cs);
    let raw = format!("Dialogue: 0,{},{},Default,,0,0,0,,x", start, end);
    ScriptLine::parse(&raw, 1).unwrap()
}

/// Test that each check is total over well-formed dialogue pairs
#[test]
fn test_checks_withRandomDialoguePairs_shouldNeverBeError() {
    let mut rng = rand::rng();
    let threshold = TimeDelta::from_millis(300);

    for _ in 0..500 {
        let a_start = rng.random_range(0..10_000u64);
        let a_end = a_start + rng.random_range(0..500u64);
        let b_start = rng.random_range(0..10_000u64);
        let b_end = b_start + rng.random_range(0..500u64);
        let (a, b) = (dialogue(a_start, a_end), dialogue(b_start, b_end));
        let gap = TimeDelta::from_centis(b_start as i64 - a_end as i64);

        let continuous = check_continuous(&a, &b, false);
        let overlap = check_overlap(&a, &b, false);
        let flash = check_flash(&a, &b, false, threshold);

        assert!(matches!(continuous.relation, Relation::Continuous | Relation::None));
        assert!(matches!(overlap.relation, Relation::Overlap | Relation::None));
        assert_eq!(overlap.relation == Relation::Overlap, gap.is_negative());
        assert_eq!(continuous.relation == Relation::Continuous, gap.is_zero());
        if gap.is_negative() {
            // a flash check never applies to an overlapping pair
            assert_eq!(flash.relation, Relation::Error);
        } else {
            assert!(matches!(flash.relation, Relation::Flash | Relation::None));
            assert_eq!(flash.relation == Relation::Flash, gap < threshold);
        }
    }
}

/// Test the scenario of a short gap between two lines
#[test]
fn test_checkFlash_withTwoHundredMsGap_shouldBeFlash() {
    let a = dialogue(0, 200);
    let b = dialogue(220, 400);

    let result = check_flash(&a, &b, false, TimeDelta::from_millis(300));

    assert_eq!(result.relation, Relation::Flash);
    assert_eq!(result.gap, TimeDelta::from_millis(200));
}

/// Test that a Header line is a caller error, not "no relation"
#[test]
fn test_checks_withHeaderLine_shouldBeError() {
    let a = dialogue(0, 200);
    let header = ScriptLine::parse("[Events]", 1).unwrap();

    assert_eq!(check_continuous(&header, &a, false).relation, Relation::Error);
    assert_eq!(check_overlap(&a, &header, false).relation, Relation::Error);
    assert_eq!(check_flash(&header, &header, false, TimeDelta::ZERO).relation, Relation::Error);
}
