//! Playback integration tests
//!
//! Player calls in, rendered samples out: active-pitch timelines, track
//! mixing, orphan note-offs, lookup misses and block-size independence.

mod helpers;
use helpers::*;

use proptest::prelude::*;
use toid::prelude::*;
use toid::TrackPolicy;

/// Pitch 60 at 0 and pitch 62 at 11025: each owns its quarter second.
#[test]
fn test_note_on_switches_pitch_at_position() {
    init_tracing();
    let engine = probe_engine();
    let player = engine.player();
    player.add_note_on("main", 60.0, 0).unwrap();
    player.add_note_on("main", 62.0, 11025).unwrap();

    let first = engine.render(11025);
    assert_constant(&first, probe_value(60.0), 0.0);

    let second = engine.render(11025);
    assert_constant(&second, probe_value(62.0), 0.0);
}

/// Calls arriving out of time order still play in time order.
#[test]
fn test_out_of_order_calls_are_sorted() {
    let engine = probe_engine();
    let player = engine.player();
    player.add_note_on("main", 62.0, 11025).unwrap();
    player.add_note_on("main", 60.0, 0).unwrap();

    let block = engine.render(22050);
    assert_constant(&block[..11025], probe_value(60.0), 0.0);
    assert_constant(&block[11025..], probe_value(62.0), 0.0);
}

#[test]
fn test_strict_append_rejects_late_events() {
    let engine = probe_engine();
    let player = engine.player();
    player
        .apply(Action::SetTrackPolicy {
            track: "live".into(),
            policy: TrackPolicy::StrictAppend,
        })
        .unwrap();
    player.add_note_on("live", 60.0, 1000).unwrap();
    let version = engine.store().version();

    let err = player.add_note_on("live", 62.0, 500).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(toid::core::Error::NonMonotonicEvent { at: 500, last: 1000, .. })
    ));
    assert_eq!(engine.store().version(), version);
}

/// Two overlapping tracks sum to exactly what each renders alone.
#[test]
fn test_tracks_sum_to_isolated_renders() {
    let both = probe_engine();
    let main_only = probe_engine();
    let sub_only = probe_engine();

    for engine in [&both, &main_only] {
        engine.player().add_note("main", 60.0, 3000, 0).unwrap();
    }
    for engine in [&both, &sub_only] {
        engine.player().add_note("sub", 48.0, 3000, 1000).unwrap();
    }

    let combined = both.render(5000);
    let main = main_only.render(5000);
    let sub = sub_only.render(5000);

    for i in 0..5000 {
        approx::assert_abs_diff_eq!(combined[i], main[i] + sub[i], epsilon = 1e-6);
    }
    assert_constant(&combined[1000..3000], probe_value(60.0) + probe_value(48.0), 1e-6);
    assert!(is_silent(&combined[4000..]));
}

/// The order tracks were created in has no effect on the mix.
#[test]
fn test_mix_ignores_registration_order() {
    let notes = [("a", 60.0, 0), ("b", 64.0, 200), ("c", 67.0, 400)];

    let forward = test_engine();
    for &(track, pitch, at) in &notes {
        forward.player().add_note(track, pitch, 1000, at).unwrap();
    }

    let backward = test_engine();
    for &(track, pitch, at) in notes.iter().rev() {
        backward.player().add_note(track, pitch, 1000, at).unwrap();
    }

    assert_eq!(forward.render(2048), backward.render(2048));
}

/// An off with nothing before it silences its own track and nothing else.
#[test]
fn test_orphan_note_off_is_silent() {
    let engine = probe_engine();
    let player = engine.player();
    player.add_note_off("main", 100).unwrap();
    player.add_note_on("sub", 50.0, 0).unwrap();

    let block = engine.render(1000);
    assert_constant(&block, probe_value(50.0), 0.0);
    assert_eq!(engine.stats().missed_lookups, 0);
}

/// A selected but unloaded instrument renders silence and counts misses.
#[test]
fn test_missing_instrument_never_fails() {
    let engine = test_engine();
    let player = engine.player();
    player.set_instrument(Some("absent.piano")).unwrap();
    player.add_note_on("main", 60.0, 100).unwrap();

    for size in [1, 99, 300, 1024] {
        assert_eq!(engine.render(size).len(), size);
    }
    let stats = engine.stats();
    assert_eq!(stats.frames, 1 + 99 + 300 + 1024);
    assert_eq!(stats.missed_lookups, stats.frames - 100);
    assert_eq!(stats.faults, 0);
}

/// Without any selection the built-in sine plays.
#[test]
fn test_default_sine_sounds() {
    let engine = test_engine();
    engine.player().add_note_on("main", 69.0, 0).unwrap();
    let block = engine.render(1024);
    assert!(peak(&block) > 0.4);
    assert_eq!(engine.stats().missed_lookups, 0);
}

#[test]
fn test_notation_timeline() {
    let engine = probe_engine_with_tick(100);
    engine
        .player()
        .set_track_from_notation("main", "1-3 5")
        .unwrap();

    let block = engine.render(600);
    assert_constant(&block[..200], probe_value(48.0), 0.0);
    assert_constant(&block[200..300], probe_value(52.0), 0.0);
    assert!(is_silent(&block[300..400]));
    assert_constant(&block[400..500], probe_value(55.0), 0.0);
    assert!(is_silent(&block[500..]));
}

#[test]
fn test_loop_notation_repeats() {
    let engine = probe_engine_with_tick(100);
    engine.player().loop_notation("10", 0.0, "main").unwrap();

    let block = engine.render(700);
    for period in 0..3 {
        let start = period * 200;
        assert_constant(&block[start..start + 100], probe_value(48.0), 0.0);
        assert!(is_silent(&block[start + 100..start + 200]));
    }
    assert_constant(&block[600..], probe_value(48.0), 0.0);
}

/// A plain melody sent over a looping one plays out in full.
#[test]
fn test_send_notation_replaces_loop() {
    let engine = probe_engine_with_tick(10);
    let player = engine.player();
    player.loop_notation("1", 0.0, "main").unwrap();
    player.send_notation("1234", 0.0, "main").unwrap();

    let block = engine.render(50);
    assert_constant(&block[..10], probe_value(48.0), 0.0);
    assert_constant(&block[10..20], probe_value(50.0), 0.0);
    assert_constant(&block[20..30], probe_value(52.0), 0.0);
    assert_constant(&block[30..40], probe_value(53.0), 0.0);
    assert!(is_silent(&block[40..]));
}

/// Installing a loop publishes events and loop length together, so no
/// block ever sees one without the other.
#[test]
fn test_loop_install_is_one_version() {
    let engine = probe_engine_with_tick(10);
    let player = engine.player();
    player.send_notation("5555", 0.0, "main").unwrap();
    let before = engine.store().version();

    player.loop_notation("10", 0.0, "main").unwrap();
    assert_eq!(engine.store().version(), before + 1);

    let block = engine.render(80);
    for period in 0..4 {
        let start = period * 20;
        assert_constant(&block[start..start + 10], probe_value(48.0), 0.0);
        assert!(is_silent(&block[start + 10..start + 20]));
    }
    assert_eq!(engine.stats().last_version, before + 1);
}

#[test]
fn test_degrees_eight_and_nine_in_key() {
    let engine = probe_engine_with_tick(100);
    engine
        .player()
        .send_notation_in_key("89", 0.0, 2.0, "main")
        .unwrap();

    let block = engine.render(200);
    assert_constant(&block[..100], probe_value(62.0), 0.0);
    assert_constant(&block[100..], probe_value(64.0), 0.0);
}

/// Each track can pick its own instrument and sit anywhere in the stereo
/// field; the mono render is the centred mix.
#[test]
fn test_track_instruments_and_pan() {
    let engine = probe_engine();
    engine
        .resources()
        .insert("probe.flat", Arc::new(|_pitch: f32, _offset: u64| Some(0.1)));
    let player = engine.player();
    player.add_note_on("melody", 60.0, 0).unwrap();
    player.add_note_on("drone", 60.0, 0).unwrap();
    player.set_track_instrument("drone", Some("probe.flat")).unwrap();
    player.set_track_pan("melody", -1.0).unwrap();
    player.set_track_pan("drone", 1.0).unwrap();

    let stereo = engine.render_stereo(64);
    for frame in stereo.chunks(2) {
        assert_eq!(frame[0], probe_value(60.0));
        assert_eq!(frame[1], 0.1);
    }

    engine.seek(0);
    let mono = engine.render(64);
    assert_constant(&mono, probe_value(60.0) + 0.1, 1e-6);
    assert_eq!(engine.stats().missed_lookups, 0);
}

#[test]
fn test_master_volume() {
    let engine = probe_engine();
    engine.player().add_note_on("main", 80.0, 0).unwrap();
    engine.set_volume(0.5).unwrap();
    assert_constant(&engine.render(64), probe_value(80.0) * 0.5, 1e-6);
    assert!(engine.set_volume(-1.0).is_err());
    assert_eq!(engine.volume(), 0.5);
}

/// A new melody is heard from the next block on, with no restart.
#[test]
fn test_live_replacement_takes_effect_next_block() {
    let engine = probe_engine_with_tick(100);
    let player = engine.player();
    player.set_track_from_notation("main", "11111111").unwrap();
    assert_constant(&engine.render(250), probe_value(48.0), 0.0);

    player.set_track_from_notation("main", "55555555").unwrap();
    assert_constant(&engine.render(250), probe_value(55.0), 0.0);
    assert_eq!(engine.position(), 500);
}

#[test]
fn test_seek_back_replays() {
    let engine = probe_engine_with_tick(100);
    engine
        .player()
        .set_track_from_notation("main", "135")
        .unwrap();
    let first = engine.render(300);
    engine.seek(0);
    assert_eq!(engine.render(300), first);
}

fn render_in_blocks(engine: &ToidEngine, sizes: &[usize], total: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(total);
    let mut sizes = sizes.iter().cycle();
    while out.len() < total {
        let size = (*sizes.next().unwrap()).min(total - out.len());
        out.extend(engine.render(size));
    }
    out
}

proptest! {
    /// Block boundaries never change what is heard.
    #[test]
    fn prop_render_is_subdivision_invariant(
        notation in "[0-7 -]{1,24}",
        octave in -2i8..=2,
        sizes in prop::collection::vec(1usize..400, 1..8),
    ) {
        let whole = test_engine_with_tick(64);
        let split = test_engine_with_tick(64);
        for engine in [&whole, &split] {
            engine
                .player()
                .set_track_from_notation_with_octave("main", &notation, f32::from(octave))
                .unwrap();
            engine.player().add_note("sub", 40.0, 300, 50).unwrap();
        }

        let total = notation.chars().count() * 64 + 128;
        let expected = whole.render(total);
        let actual = render_in_blocks(&split, &sizes, total);
        prop_assert_eq!(expected, actual);
    }
}
