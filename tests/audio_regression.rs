use std::collections::VecDeque;

use tonepad::{
    config::ToneConfig,
    synth::{PolySynth, SynthMessage, VoiceId},
    timeline::Pitch,
};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 512;

fn synth(messages: impl IntoIterator<Item = SynthMessage>) -> PolySynth<VecDeque<SynthMessage>> {
    PolySynth::new(
        SAMPLE_RATE,
        16,
        messages.into_iter().collect(),
        &ToneConfig::default(),
    )
}

/// Render `ms` of audio in `BLOCK`-sized pieces.
fn render_ms(synth: &mut PolySynth<VecDeque<SynthMessage>>, ms: u32) -> Vec<f32> {
    let frames = (SAMPLE_RATE as u32 * ms / 1000) as usize;
    let mut out = vec![0.0f32; frames];
    for chunk in out.chunks_mut(BLOCK) {
        synth.render_block(chunk);
    }
    out
}

#[test]
fn renders_silence_with_nothing_pressed() {
    let mut s = synth([]);
    let samples = render_ms(&mut s, 50);
    assert!(samples.iter().all(|&x| x == 0.0));
    assert_eq!(s.active_voices(), 0);
}

#[test]
fn a_chord_stays_bounded() {
    let mut s = synth([60, 64, 67, 72].into_iter().enumerate().map(|(i, midi)| {
        SynthMessage::Start {
            voice: VoiceId(i as u64 + 1),
            pitch: Pitch(midi),
            hold_ms: None,
        }
    }));
    let samples = render_ms(&mut s, 300);

    assert!(samples.iter().any(|x| x.abs() > 0.01), "chord was silent");
    // four voices at gain 0.25 can never exceed full scale
    assert!(samples.iter().all(|x| x.abs() <= 1.0));
    assert_eq!(s.active_voices(), 4);
}

#[test]
fn timed_note_fades_to_silence() {
    let mut s = synth([SynthMessage::Start {
        voice: VoiceId(1),
        pitch: Pitch(69),
        hold_ms: Some(100),
    }]);

    let held = render_ms(&mut s, 100);
    assert!(held.iter().any(|x| x.abs() > 0.01));

    // 200ms release plus a little slack
    render_ms(&mut s, 300);
    assert_eq!(s.active_voices(), 0);
    let after = render_ms(&mut s, 20);
    assert!(after.iter().all(|&x| x == 0.0));
}

#[test]
fn release_all_frees_every_voice() {
    let mut s = synth([
        SynthMessage::Start {
            voice: VoiceId(1),
            pitch: Pitch(48),
            hold_ms: None,
        },
        SynthMessage::Start {
            voice: VoiceId(2),
            pitch: Pitch(55),
            hold_ms: None,
        },
        SynthMessage::ReleaseAll,
    ]);
    // the same drain starts and releases both voices, so only the fade is heard
    render_ms(&mut s, 400);
    assert_eq!(s.active_voices(), 0);
}
