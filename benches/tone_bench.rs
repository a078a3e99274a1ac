//! Benchmarks for the render path and playback planning.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/oscillator  The two waveforms the notepad voice offers
//!   - synth/poly      Full polyphonic mix with chords held down
//!   - engine/cues     Turning a take or motif into a cue list

use std::{collections::VecDeque, hint::black_box};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tonepad::{
    config::{MotifConfig, PlaybackConfig, ToneConfig},
    dsp::oscillator::OscillatorBlock,
    engine::playback::PlaybackSource,
    graph::RenderCtx,
    library::ToneLibrary,
    synth::{PolySynth, SynthMessage, VoiceId},
    timeline::{Pitch, TimelineEvent},
};

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

const SAMPLE_RATE: f32 = 48_000.0;

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::from_pitch(SAMPLE_RATE, Pitch::C4, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut osc = OscillatorBlock::sine();
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer), black_box(&ctx)))
        });

        let mut osc = OscillatorBlock::triangle();
        group.bench_with_input(BenchmarkId::new("triangle", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer), black_box(&ctx)))
        });
    }

    group.finish();
}

/// A synth with `notes` held voices that never release.
fn held_chord(notes: u8) -> PolySynth<VecDeque<SynthMessage>> {
    let messages = (0..notes)
        .map(|i| SynthMessage::Start {
            voice: VoiceId(i as u64 + 1),
            pitch: Pitch(48 + i * 3),
            hold_ms: None,
        })
        .collect();
    PolySynth::new(SAMPLE_RATE, 16, messages, &ToneConfig::default())
}

fn bench_poly(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth/poly");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // silent pool: the cost of checking 16 idle voices
        let mut synth = held_chord(0);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| synth.render_block(black_box(&mut buffer)))
        });

        // a triad, the common case while playing
        let mut synth = held_chord(3);
        group.bench_with_input(BenchmarkId::new("triad", size), &size, |b, _| {
            b.iter(|| synth.render_block(black_box(&mut buffer)))
        });

        // every voice in use
        let mut synth = held_chord(16);
        group.bench_with_input(BenchmarkId::new("full", size), &size, |b, _| {
            b.iter(|| synth.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}

fn bench_cues(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/cues");
    let playback = PlaybackConfig::default();
    let motif = MotifConfig::default();

    // a 20s take of quick alternating notes
    let events: Vec<TimelineEvent> = (0..400u64)
        .flat_map(|i| {
            let pitch = Pitch(48 + (i % 24) as u8);
            [
                TimelineEvent::note_on(i * 50, pitch),
                TimelineEvent::note_off(i * 50 + 40, pitch),
            ]
        })
        .collect();
    let take = PlaybackSource::Timeline(events);
    group.bench_function("timeline_800_events", |b| {
        b.iter(|| black_box(&take).cues(&playback, &motif))
    });

    let library = ToneLibrary::builtin();
    group.bench_function("whole_library", |b| {
        b.iter(|| {
            library
                .entries()
                .iter()
                .map(|entry| PlaybackSource::Motif(entry.motif.clone()).cues(&playback, &motif).len())
                .sum::<usize>()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_oscillator, bench_poly, bench_cues);
criterion_main!(benches);
