use proptest::prelude::*;
use toid_core::DEFAULT_TICK;
use toid_notation::{parse, parse_notes, parse_notes_in_key, NotationParser};

#[test]
fn scenario_melody_has_thirteen_ticks() {
    let notes = parse_notes("12345 643 2 1", 0.0).unwrap();
    let pitches: Vec<f32> = notes.iter().map(|n| n.pitch).collect();
    assert_eq!(
        pitches,
        vec![48.0, 50.0, 52.0, 53.0, 55.0, 57.0, 53.0, 52.0, 50.0, 48.0]
    );
    let starts: Vec<u64> = notes.iter().map(|n| n.start / DEFAULT_TICK).collect();
    assert_eq!(starts, vec![0, 1, 2, 3, 4, 6, 7, 8, 10, 12]);
    assert!(notes.iter().all(|n| n.duration == DEFAULT_TICK));

    let batch = parse("12345 643 2 1", 0.0, "main").unwrap();
    assert_eq!(batch.track, "main");
    assert_eq!(batch.length(), 13 * DEFAULT_TICK);
    assert_eq!(batch.events.len(), 20);
}

#[test]
fn scenario_octave_down_transposes_every_note() {
    let base = parse_notes("12345 643 2 1", 0.0).unwrap();
    let lower = parse_notes("12345 643 2 1", -1.0).unwrap();

    assert_eq!(base.len(), lower.len());
    for (a, b) in base.iter().zip(&lower) {
        assert_eq!(a.pitch - 12.0, b.pitch);
        assert_eq!(a.start, b.start);
        assert_eq!(a.duration, b.duration);
    }
}

#[test]
fn scenario_key_and_octave_combine() {
    let base = parse_notes("12345 643 2 1", 0.0).unwrap();
    let shifted = parse_notes_in_key("12345 643 2 1", 1.0, -3.0).unwrap();
    for (a, b) in base.iter().zip(&shifted) {
        assert_eq!(a.pitch + 9.0, b.pitch);
    }

    let high = NotationParser::new(100).unwrap().parse_in_key("89", 0.0, 1.0, "lead").unwrap();
    let pitches: Vec<_> = high.events.iter().filter_map(|e| e.pitch()).collect();
    assert_eq!(pitches, vec![61.0, 63.0]);
}

proptest! {
    #[test]
    fn parsing_is_deterministic(notation in "[0-9 \\-]{0,64}", octave in -3i8..3) {
        let parser = NotationParser::default();
        let first = parser.parse(&notation, octave as f32, "main").unwrap();
        let second = parser.parse(&notation, octave as f32, "main").unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn events_are_sorted_and_within_length(notation in "[0-9 \\-]{0,64}") {
        let batch = parse(&notation, 0.0, "main").unwrap();
        prop_assert!(batch.events.windows(2).all(|w| w[0].at <= w[1].at));
        prop_assert!(batch.events.iter().all(|e| e.at <= batch.length()));
    }
}
