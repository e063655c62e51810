//! Tempo-driven pulse envelopes. Pure functions: every beat samples them once per frame, nothing is
//! cached, and all of them run in constant time.
//!
//! One bar is four beats, so a beat at `bpm` repeats its envelope every `4 * 60000 / bpm`
//! milliseconds. Within a bar the envelope is split into four linear quarters.

use serde::{Deserialize, Serialize};

/// Milliseconds in one four-beat bar at `bpm`.
pub fn bar_duration_ms(bpm: u32) -> f32 {
    4.0 * 60_000.0 / bpm.max(1) as f32
}

/// Position inside the current bar, normalised to `[0, 1)`.
pub fn phase(beat_time_ms: u32, bpm: u32) -> f32 {
    let bar = bar_duration_ms(bpm);
    let rate = (beat_time_ms as f32 % bar) / bar;
    // `%` on floats can land on `bar` itself through rounding.
    if rate >= 1.0 {
        0.0
    } else {
        rate
    }
}

/// Peak heights of the scale pulse. The shape is fixed; only the two peaks are tunable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub first_peak: f32,
    pub second_peak: f32,
}

impl Envelope {
    pub const PRONOUNCED: Envelope = Envelope {
        first_peak: 1.40,
        second_peak: 1.20,
    };

    pub const SUBTLE: Envelope = Envelope {
        first_peak: 1.25,
        second_peak: 1.15,
    };

    /// Scale factor for `rate`: up to the first peak, back to 1, up to the second peak, back to 1.
    pub fn scale(&self, rate: f32) -> f32 {
        let first = self.first_peak - 1.0;
        let second = self.second_peak - 1.0;
        if rate < 0.25 {
            1.0 + first * (rate / 0.25)
        } else if rate < 0.5 {
            1.0 + first * ((0.5 - rate) / 0.25)
        } else if rate < 0.75 {
            1.0 + second * ((rate - 0.5) / 0.25)
        } else {
            1.0 + second * ((1.0 - rate) / 0.25)
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::PRONOUNCED
    }
}

/// Opacity for `rate`: fade in, dip to half, back to opaque, fade out.
pub fn alpha_envelope(rate: f32) -> f32 {
    if rate < 0.25 {
        rate / 0.25
    } else if rate < 0.5 {
        0.5 + 0.5 * ((0.5 - rate) / 0.25)
    } else if rate < 0.75 {
        0.5 + 0.5 * ((rate - 0.5) / 0.25)
    } else {
        (1.0 - rate) / 0.25
    }
}
