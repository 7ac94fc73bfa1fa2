//! Safety limits applied before anything reaches the device
//!
//! Two independent guards:
//! - the frequency cap keeps strobes below a photosensitivity threshold;
//! - derating limits the output level while the device runs hot.

use crate::pattern::{Waveform, clamp_frequency};

/// Default frequency cap, in Hz.
pub const DEFAULT_MAX_FREQUENCY_HZ: f64 = 3.0;

/// Default level ceiling while the device is derated.
pub const DEFAULT_DERATED_LEVEL: f32 = 0.5;

/// Device thermal state, ordered from coolest to hottest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThermalState {
    #[default]
    Nominal,
    Fair,
    Serious,
    Critical,
}

/// Safety configuration shared by the engine and preview surfaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyConfig {
    /// Whether strobe frequency is capped at `max_frequency_hz`
    pub frequency_cap_enabled: bool,
    /// Strobe frequency cap, in Hz
    pub max_frequency_hz: f64,
    /// Thermal state from which the output level is derated
    pub derate_threshold: ThermalState,
    /// Level ceiling applied while derated
    pub derated_level: f32,
}

impl SafetyConfig {
    pub const DEFAULT: Self = Self {
        frequency_cap_enabled: true,
        max_frequency_hz: DEFAULT_MAX_FREQUENCY_HZ,
        derate_threshold: ThermalState::Serious,
        derated_level: DEFAULT_DERATED_LEVEL,
    };

    /// Returns a copy with the frequency cap toggled
    #[must_use]
    pub const fn with_frequency_cap(mut self, enabled: bool) -> Self {
        self.frequency_cap_enabled = enabled;
        self
    }

    /// Effective strobe frequency: clamped to the supported range, then capped
    ///
    /// The cap itself is first brought into the supported range (NaN counts as
    /// the lowest frequency), so the result survives later clamping unchanged.
    pub fn effective_frequency(&self, frequency_hz: f64) -> f64 {
        let frequency = clamp_frequency(frequency_hz);
        if self.frequency_cap_enabled {
            frequency.min(clamp_frequency(self.max_frequency_hz))
        } else {
            frequency
        }
    }

    /// Apply the frequency cap to a waveform
    ///
    /// Only strobes carry a frequency; other waveforms pass through.
    pub fn cap_waveform(&self, waveform: Waveform) -> Waveform {
        match waveform {
            Waveform::Strobe {
                frequency_hz,
                duty_cycle,
            } => Waveform::Strobe {
                frequency_hz: self.effective_frequency(frequency_hz),
                duty_cycle,
            },
            other => other,
        }
    }

    /// Derate a requested level for the given thermal state
    ///
    /// The result is always in `[0, 1]`.
    pub fn derate(&self, level: f32, thermal: ThermalState) -> f32 {
        let level = clamp_level(level);
        if thermal >= self.derate_threshold {
            level.min(clamp_level(self.derated_level))
        } else {
            level
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Clamp an output level to `[0, 1]`, treating NaN as off
pub fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}
