#![cfg_attr(not(feature = "std"), no_std)]

pub mod command;
#[cfg(feature = "std")]
pub mod controller;
#[cfg(feature = "std")]
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod pattern;
pub mod phase;
pub mod safety;
pub mod scheduler;

pub use command::EmissionCommand;
#[cfg(feature = "std")]
pub use controller::{PatternSettings, SettingsChange, TorchController};
#[cfg(feature = "std")]
pub use engine::{EngineConfig, EngineState, PatternEngine, PatternTimings};
pub use error::{DeviceError, EngineError};
pub use evaluator::{Simulation, is_emitting};
pub use events::{EngineEvent, EngineEventLog, EventLog};
pub use pattern::{PatternKind, Waveform};
pub use phase::{Phase, PhaseCycle, phase_cycle};
pub use safety::{SafetyConfig, ThermalState};
pub use scheduler::PhaseScheduler;

pub use embassy_time::{Duration, Instant};

/// Abstract torch binding
///
/// Implement this trait to support different hardware platforms.
/// The pattern engine is generic over this trait and is the only caller
/// while it holds the device.
pub trait TorchDevice {
    /// Whether the device has a controllable output
    fn is_supported(&self) -> bool;

    /// Current thermal state of the device
    fn thermal_state(&self) -> ThermalState;

    /// Take exclusive control of the output
    fn acquire(&mut self) -> Result<(), DeviceError>;

    /// Give up exclusive control. Must be idempotent.
    fn release(&mut self);

    /// Switch the output on or off at a level
    fn set_output(&mut self, command: EmissionCommand) -> Result<(), DeviceError>;
}
