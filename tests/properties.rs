use proptest::prelude::*;

use tonepad::{
    archive::MemoryArchive,
    config::{EngineConfig, RecordingConfig},
    engine::{
        clock::ManualClock,
        playback::{PlaybackId, PlaybackSource},
        Engine,
    },
    synth::{ToneCall, ToneLog},
    timeline::{NoteEvent, Pitch},
};

#[derive(Debug, Clone)]
enum Op {
    Press(u8),
    Release(u8),
    TogglePause,
    Wait(u64),
}

fn op() -> impl Strategy<Value = Op> {
    // a handful of pitches so presses and releases collide often
    let pitch = 60u8..64;
    prop_oneof![
        3 => pitch.clone().prop_map(Op::Press),
        3 => pitch.prop_map(Op::Release),
        1 => Just(Op::TogglePause),
        2 => (1u64..500).prop_map(Op::Wait),
    ]
}

fn engine() -> (Engine<ToneLog>, ManualClock) {
    let clock = ManualClock::new();
    let config = EngineConfig {
        recording: RecordingConfig {
            max_duration_ms: None,
        },
        ..EngineConfig::default()
    };
    let engine = Engine::new(
        config,
        clock.clone(),
        ToneLog::new(clock.clone()),
        MemoryArchive::new(),
    );
    (engine, clock)
}

proptest! {
    #[test]
    fn recorded_pitches_alternate(ops in prop::collection::vec(op(), 0..60)) {
        let (mut engine, clock) = engine();
        engine.start_recording().unwrap();
        for op in ops {
            match op {
                Op::Press(midi) => { engine.press(Pitch(midi)); }
                Op::Release(midi) => { engine.release(Pitch(midi)); }
                Op::TogglePause => { engine.toggle_pause().unwrap(); }
                Op::Wait(ms) => clock.advance(ms),
            }
        }

        let Some(timeline) = engine.stop_recording().unwrap() else {
            return Ok(());
        };
        prop_assert!(timeline.validate().is_ok(), "{:?}", timeline.events);
        for pitch in timeline.distinct_pitches() {
            let ons: Vec<bool> = timeline
                .events
                .iter()
                .filter(|e| e.pitch() == pitch)
                .map(|e| e.event.is_note_on())
                .collect();
            for (i, on) in ons.iter().enumerate() {
                prop_assert_eq!(*on, i % 2 == 0, "{} out of order: {:?}", pitch, ons);
            }
        }
        prop_assert!(timeline.events.windows(2).all(|w| w[0].offset_ms <= w[1].offset_ms));
    }

    #[test]
    fn offsets_exclude_paused_time(
        before in 0u64..5_000,
        paused in 0u64..60_000,
        after in 0u64..5_000,
    ) {
        let (mut engine, clock) = engine();
        engine.start_recording().unwrap();
        clock.advance(before);
        engine.press(Pitch(60));
        engine.pause_recording().unwrap();
        clock.advance(paused);
        engine.resume_recording().unwrap();
        clock.advance(after);
        engine.press(Pitch(67));

        let timeline = engine.stop_recording().unwrap().unwrap();
        let offsets: Vec<u64> = timeline.events.iter().map(|e| e.offset_ms).collect();
        prop_assert_eq!(offsets, vec![before, before + after]);
        prop_assert_eq!(
            timeline.events[1].event,
            NoteEvent::NoteOn { pitch: Pitch(67) }
        );
    }

    #[test]
    fn one_playback_at_a_time(
        toggles in prop::collection::vec((0usize..4, 0u64..400), 1..20),
    ) {
        let (mut engine, clock) = engine();
        let motifs = [vec![0, 4, 7], vec![12], vec![-5, 0, 5, 7, 12], vec![2, 2]];

        for (which, wait) in toggles {
            let before = engine.tones().sounding();
            let calls_before = engine.tones().calls().len();
            let id = PlaybackId::Library(format!("motif-{which}"));
            engine.toggle_playback(id, &PlaybackSource::Motif(motifs[which].clone()));

            // whatever sounded before the toggle has been let go of
            let released: Vec<_> = engine.tones().calls()[calls_before..]
                .iter()
                .filter_map(|c| match c {
                    ToneCall::Release { voice, .. } => Some(*voice),
                    _ => None,
                })
                .collect();
            for (voice, _) in before {
                prop_assert!(released.contains(&voice));
            }
            prop_assert!(engine.tones().is_silent());

            for _ in 0..wait / 10 {
                clock.advance(10);
                engine.tick();
                // only the active motif is ever heard
                let allowed: Vec<Pitch> = match engine.active_playback() {
                    Some(PlaybackId::Library(name)) => name
                        .strip_prefix("motif-")
                        .and_then(|i| i.parse::<usize>().ok())
                        .map(|i| motifs[i].iter().filter_map(|&o| Pitch(55).transpose(o)).collect())
                        .unwrap_or_default(),
                    _ => Vec::new(),
                };
                for (_, pitch) in engine.tones().sounding() {
                    prop_assert!(allowed.contains(&pitch), "{} is not in {:?}", pitch, allowed);
                }
            }
        }
    }
}
