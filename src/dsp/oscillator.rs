use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/// Periodic waveforms the notepad can voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorWaveform {
    Sine,
    #[default]
    Triangle,
    Saw,
    Square,
}

/// Phase-accumulating oscillator.
///
/// Phase is kept in cycles (0.0..1.0) so a frequency change mid-voice never
/// jumps the waveform.
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Restart the cycle (clean attack on retrigger).
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn render(&mut self, destination: &mut [f32], ctx: &RenderCtx) {
        let step = ctx.frequency / ctx.sample_rate;
        for sample in destination.iter_mut() {
            *sample = Self::shape(self.waveform, self.phase);
            self.phase += step;
            if self.phase >= 1.0 {
                self.phase -= self.phase.floor();
            }
        }
    }

    #[inline]
    fn shape(waveform: OscillatorWaveform, phase: f32) -> f32 {
        match waveform {
            OscillatorWaveform::Sine => (std::f32::consts::TAU * phase).sin(),
            // 0 -> +1 -> 0 -> -1 -> 0 over one cycle, in phase with the sine
            OscillatorWaveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            OscillatorWaveform::Saw => 2.0 * phase - 1.0,
            OscillatorWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_peaks_at_quarter_cycle() {
        // 4 samples per cycle: 0, 1, 0, -1
        let ctx = RenderCtx::from_freq(400.0, 100.0, 1.0);
        let mut osc = OscillatorBlock::triangle();
        let mut buffer = [0.0f32; 4];
        osc.render(&mut buffer, &ctx);

        let expected = [0.0, 1.0, 0.0, -1.0];
        for (actual, expected) in buffer.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-5, "{buffer:?}");
        }
    }

    #[test]
    fn output_stays_in_unit_range() {
        let ctx = RenderCtx::from_freq(48_000.0, 1234.5, 1.0);
        for waveform in [
            OscillatorWaveform::Sine,
            OscillatorWaveform::Triangle,
            OscillatorWaveform::Saw,
            OscillatorWaveform::Square,
        ] {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0f32; 1024];
            osc.render(&mut buffer, &ctx);
            assert!(buffer.iter().all(|s| s.abs() <= 1.0), "{waveform:?}");
        }
    }
}
