//! Waveform definitions with compile-time known pattern variants
//!
//! All waveforms are stored in an enum and carry their own parameters.
//! Caller-supplied parameters are never trusted: every consumer goes
//! through the clamp helpers below before deriving timings.

const PATTERN_NAME_CONTINUOUS: &str = "continuous";
const PATTERN_NAME_STROBE: &str = "strobe";
const PATTERN_NAME_BEACON: &str = "beacon";
const PATTERN_NAME_SOS: &str = "sos";

const PATTERN_ID_CONTINUOUS: u8 = 0;
const PATTERN_ID_STROBE: u8 = 1;
const PATTERN_ID_BEACON: u8 = 2;
const PATTERN_ID_SOS: u8 = 3;

/// Lowest strobe frequency the engine will run, in Hz.
pub const MIN_FREQUENCY_HZ: f64 = 0.1;
/// Highest strobe frequency the engine will run, in Hz.
pub const MAX_FREQUENCY_HZ: f64 = 15.0;
/// Lowest strobe duty cycle.
pub const MIN_DUTY_CYCLE: f64 = 0.05;
/// Highest strobe duty cycle.
pub const MAX_DUTY_CYCLE: f64 = 0.95;

/// Shortest beacon period, in seconds.
pub const MIN_BEACON_PERIOD_SECONDS: f64 = 0.5;
/// Longest beacon period, in seconds.
pub const MAX_BEACON_PERIOD_SECONDS: f64 = 3_600.0;
/// Shortest beacon flash, in seconds.
pub const MIN_BEACON_ON_SECONDS: f64 = 0.05;

/// Beacon period used by the preview evaluator and the default settings.
pub const BEACON_PERIOD_SECONDS: f64 = 2.0;
/// Beacon flash window used by the preview evaluator and the default settings.
pub const BEACON_ON_SECONDS: f64 = 0.12;

/// Morse timing unit of the preview evaluator, in seconds.
pub const SOS_UNIT_SECONDS: f64 = 0.2;

/// SOS sequence in Morse units.
///
/// Even indices are flashes, odd indices are gaps:
/// `...` letter gap `---` letter gap `...` word gap.
pub const SOS_UNITS: [u8; 18] = [
    1, 1, 1, 1, 1, 3, //
    3, 1, 3, 1, 3, 3, //
    1, 1, 1, 1, 1, 7,
];

/// Total length of one SOS cycle in Morse units.
pub const SOS_CYCLE_UNITS: u32 = {
    let mut total = 0;
    let mut i = 0;
    while i < SOS_UNITS.len() {
        total += SOS_UNITS[i] as u32;
        i += 1;
    }
    total
};

/// Known pattern kinds that can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PatternKind {
    Continuous = PATTERN_ID_CONTINUOUS,
    Strobe = PATTERN_ID_STROBE,
    Beacon = PATTERN_ID_BEACON,
    Sos = PATTERN_ID_SOS,
}

impl PatternKind {
    /// Every kind, in id order.
    pub const ALL: [Self; 4] = [Self::Continuous, Self::Strobe, Self::Beacon, Self::Sos];

    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            PATTERN_ID_CONTINUOUS => Self::Continuous,
            PATTERN_ID_STROBE => Self::Strobe,
            PATTERN_ID_BEACON => Self::Beacon,
            PATTERN_ID_SOS => Self::Sos,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continuous => PATTERN_NAME_CONTINUOUS,
            Self::Strobe => PATTERN_NAME_STROBE,
            Self::Beacon => PATTERN_NAME_BEACON,
            Self::Sos => PATTERN_NAME_SOS,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            PATTERN_NAME_CONTINUOUS => Some(Self::Continuous),
            PATTERN_NAME_STROBE => Some(Self::Strobe),
            PATTERN_NAME_BEACON => Some(Self::Beacon),
            PATTERN_NAME_SOS => Some(Self::Sos),
            _ => None,
        }
    }
}

impl core::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Waveform shape with its parameters, as requested by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    /// Output held on
    Continuous,
    /// Periodic on/off square wave
    Strobe { frequency_hz: f64, duty_cycle: f64 },
    /// Short flash once per period
    Beacon {
        period_seconds: f64,
        on_seconds: f64,
    },
    /// Morse-coded SOS with a fixed timing unit
    Sos,
}

impl Waveform {
    /// Get the parameterless kind of this waveform
    pub const fn kind(&self) -> PatternKind {
        match self {
            Self::Continuous => PatternKind::Continuous,
            Self::Strobe { .. } => PatternKind::Strobe,
            Self::Beacon { .. } => PatternKind::Beacon,
            Self::Sos => PatternKind::Sos,
        }
    }

    /// Returns the same waveform with every parameter inside its safe range
    pub fn clamped(self) -> Self {
        match self {
            Self::Strobe {
                frequency_hz,
                duty_cycle,
            } => Self::Strobe {
                frequency_hz: clamp_frequency(frequency_hz),
                duty_cycle: clamp_duty(duty_cycle),
            },
            Self::Beacon {
                period_seconds,
                on_seconds,
            } => {
                let period = clamp_or_min(
                    period_seconds,
                    MIN_BEACON_PERIOD_SECONDS,
                    MAX_BEACON_PERIOD_SECONDS,
                );
                Self::Beacon {
                    period_seconds: period,
                    on_seconds: clamp_or_min(on_seconds, MIN_BEACON_ON_SECONDS, period),
                }
            }
            other => other,
        }
    }
}

/// Clamp a strobe frequency to `[MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ]`
pub fn clamp_frequency(frequency_hz: f64) -> f64 {
    clamp_or_min(frequency_hz, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)
}

/// Clamp a strobe duty cycle to `[MIN_DUTY_CYCLE, MAX_DUTY_CYCLE]`
pub fn clamp_duty(duty_cycle: f64) -> f64 {
    clamp_or_min(duty_cycle, MIN_DUTY_CYCLE, MAX_DUTY_CYCLE)
}

/// NaN collapses to `min` instead of propagating
fn clamp_or_min(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}
