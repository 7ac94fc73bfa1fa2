//! Presentation-facing controller
//!
//! Holds the pattern settings a user edits and turns them into engine calls.
//! Preview surfaces read the same settings through [`TorchController::simulation`]
//! and never reach the device.

use embassy_time::Instant;

use crate::TorchDevice;
use crate::engine::{EngineConfig, EngineState, PatternEngine};
use crate::error::EngineError;
use crate::evaluator::Simulation;
use crate::events::EngineEventLog;
use crate::pattern::{BEACON_ON_SECONDS, BEACON_PERIOD_SECONDS, PatternKind, Waveform};
use crate::safety::{SafetyConfig, clamp_level};

/// User-editable pattern parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternSettings {
    pub kind: PatternKind,
    /// Requested level in `[0, 1]`
    pub brightness: f32,
    /// Requested strobe frequency, before capping
    pub frequency_hz: f64,
    pub duty_cycle: f64,
    /// Whether the strobe frequency cap applies
    pub safety_cap_enabled: bool,
}

impl PatternSettings {
    pub const DEFAULT: Self = Self {
        kind: PatternKind::Continuous,
        brightness: 0.75,
        frequency_hz: 2.0,
        duty_cycle: 0.5,
        safety_cap_enabled: true,
    };

    /// Apply the non-empty fields of a change
    pub fn apply(&mut self, change: &SettingsChange) {
        if let Some(kind) = change.kind {
            self.kind = kind;
        }
        if let Some(brightness) = change.brightness {
            self.brightness = clamp_level(brightness);
        }
        if let Some(frequency_hz) = change.frequency_hz {
            self.frequency_hz = frequency_hz;
        }
        if let Some(duty_cycle) = change.duty_cycle {
            self.duty_cycle = duty_cycle;
        }
        if let Some(enabled) = change.safety_cap_enabled {
            self.safety_cap_enabled = enabled;
        }
    }

    /// Safety config with this setting's cap toggle
    pub const fn safety(&self, base: SafetyConfig) -> SafetyConfig {
        base.with_frequency_cap(self.safety_cap_enabled)
    }

    /// Waveform to run for these settings
    ///
    /// Strobe frequency is capped; beacons use the fixed preview window so
    /// the torch matches what the preview shows.
    pub fn waveform(&self, safety: &SafetyConfig) -> Waveform {
        match self.kind {
            PatternKind::Continuous => Waveform::Continuous,
            PatternKind::Strobe => Waveform::Strobe {
                frequency_hz: safety.effective_frequency(self.frequency_hz),
                duty_cycle: self.duty_cycle,
            },
            PatternKind::Beacon => Waveform::Beacon {
                period_seconds: BEACON_PERIOD_SECONDS,
                on_seconds: BEACON_ON_SECONDS,
            },
            PatternKind::Sos => Waveform::Sos,
        }
    }
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Represents a user intent to change the pattern settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsChange {
    pub kind: Option<PatternKind>,
    pub brightness: Option<f32>,
    pub frequency_hz: Option<f64>,
    pub duty_cycle: Option<f64>,
    pub safety_cap_enabled: Option<bool>,
}

/// Torch controller - settings plus the engine they drive
pub struct TorchController<D: TorchDevice + Send + 'static> {
    engine: PatternEngine<D>,
    settings: PatternSettings,
    safety: SafetyConfig,
}

impl<D: TorchDevice + Send + 'static> TorchController<D> {
    /// Create a controller with default settings
    pub fn new(device: D, config: EngineConfig) -> Self {
        Self::with_settings(device, config, PatternSettings::DEFAULT)
    }

    pub fn with_settings(device: D, config: EngineConfig, settings: PatternSettings) -> Self {
        Self {
            engine: PatternEngine::new(device, config),
            settings,
            safety: config.safety,
        }
    }

    pub const fn settings(&self) -> &PatternSettings {
        &self.settings
    }

    /// Update settings. Takes effect on the next [`start`](Self::start).
    pub fn apply(&mut self, change: &SettingsChange) {
        self.settings.apply(change);
    }

    /// Start the pattern described by the current settings
    pub fn start(&self) -> Result<(), EngineError> {
        let safety = self.settings.safety(self.safety);
        self.engine.set_frequency_cap(safety.frequency_cap_enabled);
        self.engine
            .start(self.settings.waveform(&safety), self.settings.brightness)
    }

    pub fn stop(&self) {
        self.engine.stop();
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn events(&self) -> &EngineEventLog {
        self.engine.events()
    }

    /// Cosmetic preview of the current settings, starting at `origin`
    pub fn simulation(&self, origin: Instant) -> Simulation {
        Simulation::new(
            self.settings.kind,
            self.settings.frequency_hz,
            self.settings.duty_cycle,
            &self.settings.safety(self.safety),
            origin,
        )
    }

    pub const fn engine(&self) -> &PatternEngine<D> {
        &self.engine
    }
}
