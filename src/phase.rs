use embassy_time::Duration;
use heapless::Vec;

use crate::command::EmissionCommand;
use crate::pattern::{SOS_UNITS, Waveform};

/// Longest cycle any waveform produces (SOS).
pub const MAX_CYCLE_PHASES: usize = SOS_UNITS.len();

/// One timed step of an emission cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    /// Whether the output is lit during this phase
    pub on: bool,
    /// How long the phase lasts
    pub duration: Duration,
}

impl Phase {
    pub const fn on(duration: Duration) -> Self {
        Self { on: true, duration }
    }

    pub const fn off(duration: Duration) -> Self {
        Self {
            on: false,
            duration,
        }
    }

    /// Command that starts this phase at the given base level
    pub fn command(&self, level: f32) -> EmissionCommand {
        if self.on {
            EmissionCommand::on(level)
        } else {
            EmissionCommand::OFF
        }
    }
}

/// Repeating sequence of phases
///
/// Stored inline, sized for the longest waveform.
pub type PhaseCycle = Vec<Phase, MAX_CYCLE_PHASES>;

/// Build the repeating phase cycle for a waveform
///
/// Parameters are clamped first. Returns `None` for [`Waveform::Continuous`],
/// which has no cycle: it is switched on once and held.
pub fn phase_cycle(waveform: Waveform, sos_unit: Duration) -> Option<PhaseCycle> {
    match waveform.clamped() {
        Waveform::Continuous => None,
        Waveform::Strobe {
            frequency_hz,
            duty_cycle,
        } => {
            let period_us = (1_000_000.0 / frequency_hz) as u64;
            let on_us = (period_us as f64 * duty_cycle) as u64;
            Some(on_off_cycle(
                Duration::from_micros(on_us),
                Duration::from_micros(period_us - on_us),
            ))
        }
        Waveform::Beacon {
            period_seconds,
            on_seconds,
        } => {
            let period_us = seconds_to_micros(period_seconds);
            let on_us = seconds_to_micros(on_seconds).min(period_us);
            Some(on_off_cycle(
                Duration::from_micros(on_us),
                Duration::from_micros(period_us - on_us),
            ))
        }
        Waveform::Sos => Some(
            SOS_UNITS
                .iter()
                .enumerate()
                .map(|(i, &units)| Phase {
                    on: i % 2 == 0,
                    duration: sos_unit * u32::from(units),
                })
                .collect(),
        ),
    }
}

/// Total duration of one pass through a cycle
pub fn cycle_duration(cycle: &PhaseCycle) -> Duration {
    cycle
        .iter()
        .fold(Duration::from_ticks(0), |total, phase| total + phase.duration)
}

fn on_off_cycle(on: Duration, off: Duration) -> PhaseCycle {
    let mut cycle = PhaseCycle::new();
    let _ = cycle.push(Phase::on(on));
    let _ = cycle.push(Phase::off(off));
    cycle
}

fn seconds_to_micros(seconds: f64) -> u64 {
    (seconds * 1_000_000.0) as u64
}
