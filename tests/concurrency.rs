//! Rendering on one thread while another keeps writing to the store.

mod helpers;
use helpers::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use toid::prelude::*;

#[test]
fn test_render_while_writing() {
    init_tracing();
    let engine = probe_engine_with_tick(64);
    let reader = engine.reader().clone();
    let done = Arc::new(AtomicBool::new(false));

    let renderer = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let sizes = [1usize, 64, 333, 512, 1024];
            let mut buffer = vec![0.0f32; 2048];
            let mut blocks = 0u64;
            while !done.load(Ordering::Acquire) || blocks < 100 {
                let size = sizes[blocks as usize % sizes.len()];
                let before = reader.position();
                if blocks % 2 == 0 {
                    reader.render_rt(&mut buffer[..size]);
                } else {
                    reader.render_stereo_rt(&mut buffer[..size * 2]);
                }
                // Nobody else holds the reader, so every block is rendered.
                assert_eq!(reader.position(), before + size as u64);
                assert!(buffer.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
                blocks += 1;
            }
            blocks
        })
    };

    let player = engine.player();
    let first = engine.store().version();
    for i in 0..200u64 {
        match i % 5 {
            0 => player.add_note_on("main", 48.0 + (i % 12) as f32, i * 10),
            1 => player.loop_notation("1-3 5", 0.0, "arp"),
            2 => player.send_notation("8 9", -1.0, "arp"),
            3 => player.set_track_pan("main", (i % 3) as f32 - 1.0),
            _ => player.remove_track("gone"),
        }
        .unwrap();
    }
    done.store(true, Ordering::Release);

    let blocks = renderer.join().unwrap();
    let stats = engine.stats();
    assert_eq!(stats.blocks, blocks);
    assert_eq!(stats.faults, 0);
    assert_eq!(stats.missed_lookups, 0);
    assert_eq!(engine.latest().version(), first + 200);
    assert_eq!(engine.reducer().collect_retired(), 0);
}
