//! Audio output: a cpal stream rendering a `PolySynth`.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use tonepad::{
    config::ToneConfig,
    synth::{PolySynth, SynthMessage, SynthToneSource},
    MAX_BLOCK_SIZE,
};

/// Room for bursts of key presses between two audio callbacks.
const MESSAGE_QUEUE_SIZE: usize = 1024;
/// Samples kept for the oscilloscope.
const SCOPE_QUEUE_SIZE: usize = 8192;

pub struct AudioOutput {
    /// Audio stops when this is dropped.
    pub stream: cpal::Stream,
    /// Mono mix as rendered, for the waveform view.
    pub scope: Consumer<f32>,
}

pub fn start(tone: &ToneConfig) -> EyreResult<(AudioOutput, SynthToneSource<Producer<SynthMessage>>)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available (try --silent)"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    tracing::info!(sample_rate, channels, voices = tone.max_voices, "audio output ready");

    let (tx, rx) = RingBuffer::<SynthMessage>::new(MESSAGE_QUEUE_SIZE);
    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE_SIZE);
    let mut synth = PolySynth::new(sample_rate, tone.max_voices, rx, tone);
    let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut block[..frames];
                synth.render_block(block);

                // mono to all channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                    // the UI drains the scope at its own pace; drop samples when it lags
                    let _ = scope_tx.push(s);
                }

                frames_written += frames;
            }
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;
    stream.play()?;

    Ok((
        AudioOutput {
            stream,
            scope: scope_rx,
        },
        SynthToneSource::new(tx),
    ))
}
