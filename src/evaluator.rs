//! Waveform evaluator
//!
//! Answers "is the torch lit at time t?" without touching any device.
//! Preview surfaces use it to draw a simulated torch that stays in phase
//! with the real emission for the same parameters.

use embassy_time::Instant;

use crate::pattern::{
    BEACON_ON_SECONDS, BEACON_PERIOD_SECONDS, PatternKind, SOS_CYCLE_UNITS, SOS_UNIT_SECONDS,
    SOS_UNITS, clamp_duty, clamp_frequency,
};
use crate::safety::SafetyConfig;

/// Returns whether a waveform of `kind` emits at `elapsed_seconds`
///
/// `frequency_hz` and `duty_cycle` only matter for strobes and should already
/// be safety-capped; both are clamped again here. Beacons always use the fixed
/// [`BEACON_PERIOD_SECONDS`] / [`BEACON_ON_SECONDS`] window.
///
/// Negative and non-finite times are treated as zero.
pub fn is_emitting(
    kind: PatternKind,
    elapsed_seconds: f64,
    frequency_hz: f64,
    duty_cycle: f64,
) -> bool {
    let t = if elapsed_seconds.is_finite() && elapsed_seconds > 0.0 {
        elapsed_seconds
    } else {
        0.0
    };

    match kind {
        PatternKind::Continuous => true,
        PatternKind::Strobe => {
            let period = 1.0 / clamp_frequency(frequency_hz);
            let phase = libm::fmod(t, period);
            phase < period * clamp_duty(duty_cycle)
        }
        PatternKind::Beacon => libm::fmod(t, BEACON_PERIOD_SECONDS) < BEACON_ON_SECONDS,
        PatternKind::Sos => sos_is_on(t),
    }
}

fn sos_is_on(t: f64) -> bool {
    let total = f64::from(SOS_CYCLE_UNITS) * SOS_UNIT_SECONDS;
    let mut phase = libm::fmod(t, total);

    for (i, &units) in SOS_UNITS.iter().enumerate() {
        let duration = f64::from(units) * SOS_UNIT_SECONDS;
        if phase < duration {
            return i % 2 == 0;
        }
        phase -= duration;
    }

    // Rounding can leave a sliver past the last element; that is the word gap.
    false
}

/// Free-running preview of a pattern
///
/// Holds the parameters a preview surface shows, with the same frequency cap
/// the engine applies, and a time origin.
#[derive(Debug, Clone, Copy)]
pub struct Simulation {
    kind: PatternKind,
    frequency_hz: f64,
    duty_cycle: f64,
    origin: Instant,
}

impl Simulation {
    /// Create a preview starting at `origin`
    pub fn new(
        kind: PatternKind,
        frequency_hz: f64,
        duty_cycle: f64,
        safety: &SafetyConfig,
        origin: Instant,
    ) -> Self {
        Self {
            kind,
            frequency_hz: safety.effective_frequency(frequency_hz),
            duty_cycle: clamp_duty(duty_cycle),
            origin,
        }
    }

    pub const fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Strobe frequency after clamping and capping
    pub const fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub const fn duty_cycle(&self) -> f64 {
        self.duty_cycle
    }

    /// Whether the simulated torch is lit at `now`
    pub fn is_on(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.origin);
        is_emitting(
            self.kind,
            elapsed.as_micros() as f64 / 1_000_000.0,
            self.frequency_hz,
            self.duty_cycle,
        )
    }
}
