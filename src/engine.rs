//! Pattern engine
//!
//! Owns the emission loop. `start` validates and locks the device, then runs
//! the loop on a dedicated thread; `stop` signals the loop, joins it, switches
//! the torch off and releases the device. Both are serialized by one control
//! mutex, so at most one loop exists and the device always has an owner while
//! it is locked.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use embassy_time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::TorchDevice;
use crate::command::EmissionCommand;
use crate::error::EngineError;
use crate::events::{EngineEvent, EngineEventLog};
use crate::pattern::Waveform;
use crate::phase::{PhaseCycle, phase_cycle};
use crate::safety::{SafetyConfig, clamp_level};
use crate::scheduler::{DEFAULT_MAX_DRIFT, PhaseScheduler};

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;

const LOOP_THREAD_NAME: &str = "torch-pattern";

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    Idle = STATE_IDLE,
    Running = STATE_RUNNING,
    Stopping = STATE_STOPPING,
}

impl EngineState {
    const fn from_raw(value: u8) -> Self {
        match value {
            STATE_RUNNING => Self::Running,
            STATE_STOPPING => Self::Stopping,
            _ => Self::Idle,
        }
    }
}

/// Loop timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternTimings {
    /// How often a continuous pattern re-checks the stop signal
    pub poll_interval: Duration,
    /// Morse unit of the SOS pattern
    pub sos_unit: Duration,
    /// Drift tolerated before the phase schedule restarts
    pub max_drift: Duration,
}

impl PatternTimings {
    pub const DEFAULT: Self = Self {
        poll_interval: Duration::from_millis(100),
        sos_unit: Duration::from_millis(200),
        max_drift: DEFAULT_MAX_DRIFT,
    };
}

impl Default for PatternTimings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration for the pattern engine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineConfig {
    pub safety: SafetyConfig,
    pub timings: PatternTimings,
}

/// What the loop thread runs
#[derive(Debug, Clone)]
struct EmissionPlan {
    level: f32,
    /// `None` holds the output on until stopped
    cycle: Option<PhaseCycle>,
    timings: PatternTimings,
}

/// Stop request as seen by the loop thread.
///
/// The control side never sends on the channel; dropping its sender is the
/// request. Waits are `recv_timeout` calls, so a stop aborts the current
/// phase instead of sleeping it out.
struct StopSignal {
    rx: Receiver<()>,
}

impl StopSignal {
    fn is_requested(&self) -> bool {
        !matches!(self.rx.try_recv(), Err(TryRecvError::Empty))
    }

    /// Wait up to `timeout`, returning `true` if a stop was requested
    fn wait(&self, timeout: Duration) -> bool {
        !matches!(
            self.rx.recv_timeout(to_std(timeout)),
            Err(RecvTimeoutError::Timeout)
        )
    }
}

struct Worker {
    /// Dropped to stop the loop
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

struct Control {
    worker: Option<Worker>,
    safety: SafetyConfig,
}

/// Pattern Engine - drives a [`TorchDevice`] from a background thread
pub struct PatternEngine<D: TorchDevice + Send + 'static> {
    device: Arc<Mutex<D>>,
    control: Mutex<Control>,
    state: AtomicU8,
    events: Arc<EngineEventLog>,
    timings: PatternTimings,
}

impl<D: TorchDevice + Send + 'static> PatternEngine<D> {
    /// Create an idle engine owning `device`
    pub fn new(device: D, config: EngineConfig) -> Self {
        Self {
            device: Arc::new(Mutex::new(device)),
            control: Mutex::new(Control {
                worker: None,
                safety: config.safety,
            }),
            state: AtomicU8::new(STATE_IDLE),
            events: Arc::new(EngineEventLog::new()),
            timings: config.timings,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        EngineState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// Event log shared with the loop thread
    pub fn events(&self) -> &EngineEventLog {
        &self.events
    }

    /// Current configuration
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            safety: self.lock_control().safety,
            timings: self.timings,
        }
    }

    /// Enable or disable the strobe frequency cap for the next `start`
    pub fn set_frequency_cap(&self, enabled: bool) {
        let mut control = self.lock_control();
        control.safety = control.safety.with_frequency_cap(enabled);
    }

    /// Start emitting `waveform` at `level`
    ///
    /// A running pattern is stopped first. Returns once the loop thread is
    /// running; the pattern continues until [`stop`](Self::stop).
    pub fn start(&self, waveform: Waveform, level: f32) -> Result<(), EngineError> {
        let mut control = self.lock_control();
        self.shutdown(&mut control);

        let result = self.launch(&mut control, waveform, clamp_level(level));
        if let Err(err) = result {
            warn!(pattern = %waveform.kind(), error = %err, "pattern start failed");
            self.events.push(EngineEvent::StartFailed(err));
        }
        result
    }

    /// Stop the running pattern and release the device
    ///
    /// Blocks until the loop thread has exited. No-op when idle.
    pub fn stop(&self) {
        let mut control = self.lock_control();
        self.shutdown(&mut control);
    }

    fn launch(
        &self,
        control: &mut Control,
        waveform: Waveform,
        level: f32,
    ) -> Result<(), EngineError> {
        // Nothing that can panic may run between `acquire` and storing the worker.
        let safety = control.safety;
        let waveform = safety.cap_waveform(waveform);
        let cycle = phase_cycle(waveform, self.timings.sos_unit);

        let thermal = {
            let mut device = self.lock_device();
            if !device.is_supported() {
                return Err(EngineError::Unsupported);
            }
            device.acquire().map_err(EngineError::LockFailed)?;
            device.thermal_state()
        };

        let base_level = safety.derate(level, thermal);
        if base_level < level {
            debug!(?thermal, requested = level, level = base_level, "derating torch level");
        }

        let plan = EmissionPlan {
            level: base_level,
            cycle,
            timings: self.timings,
        };

        let (stop, rx) = crossbeam_channel::bounded::<()>(1);
        let spawned = thread::Builder::new()
            .name(LOOP_THREAD_NAME.into())
            .spawn({
                let device = Arc::clone(&self.device);
                let events = Arc::clone(&self.events);
                move || run_loop(&device, &plan, &StopSignal { rx }, &events)
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                warn!(error = %err, "failed to spawn pattern thread");
                self.lock_device().release();
                return Err(EngineError::ContextUnavailable);
            }
        };

        control.worker = Some(Worker { stop, handle });
        self.state.store(STATE_RUNNING, Ordering::Release);
        self.events.push(EngineEvent::Started {
            kind: waveform.kind(),
            level: base_level,
            thermal,
        });
        info!(pattern = %waveform.kind(), level = base_level, "pattern started");

        Ok(())
    }

    /// Join the loop, switch off and release. Never fails.
    fn shutdown(&self, control: &mut Control) {
        let Some(worker) = control.worker.take() else {
            return;
        };
        self.state.store(STATE_STOPPING, Ordering::Release);

        drop(worker.stop);
        if worker.handle.join().is_err() {
            warn!("pattern thread panicked");
        }

        {
            let mut device = self.lock_device();
            if let Err(err) = device.set_output(EmissionCommand::OFF) {
                warn!(error = %err, "final off command failed");
                self.events.push(EngineEvent::CommandFailed {
                    command: EmissionCommand::OFF,
                    error: EngineError::CommandFailed(err),
                });
            }
            device.release();
        }

        self.state.store(STATE_IDLE, Ordering::Release);
        self.events.push(EngineEvent::Stopped);
        info!("pattern stopped");
    }

    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_device(&self) -> MutexGuard<'_, D> {
        lock_device(&self.device)
    }
}

impl<D: TorchDevice + Send + 'static> Drop for PatternEngine<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Emission loop body, runs on the pattern thread
fn run_loop<D: TorchDevice>(
    device: &Mutex<D>,
    plan: &EmissionPlan,
    signal: &StopSignal,
    events: &EngineEventLog,
) {
    let Some(cycle) = &plan.cycle else {
        emit(device, EmissionCommand::on(plan.level), events);
        while !signal.wait(plan.timings.poll_interval) {}
        debug!("continuous loop exited");
        return;
    };

    let mut scheduler = PhaseScheduler::new(plan.timings.max_drift);
    'pattern: loop {
        for phase in cycle {
            if signal.is_requested() {
                break 'pattern;
            }
            emit(device, phase.command(plan.level), events);

            let wait = scheduler.advance(Instant::now(), phase.duration);
            if signal.wait(wait) {
                break 'pattern;
            }
        }
    }
    debug!("pattern loop exited");
}

/// Send one command, logging and discarding a failure
fn emit<D: TorchDevice>(device: &Mutex<D>, command: EmissionCommand, events: &EngineEventLog) {
    let result = lock_device(device).set_output(command);
    if let Err(err) = result {
        warn!(on = command.on, level = command.level, error = %err, "torch command failed");
        events.push(EngineEvent::CommandFailed {
            command,
            error: EngineError::CommandFailed(err),
        });
    }
}

fn lock_device<D>(device: &Mutex<D>) -> MutexGuard<'_, D> {
    device.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_std(duration: Duration) -> std::time::Duration {
    std::time::Duration::from_micros(duration.as_micros())
}
