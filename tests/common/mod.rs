#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration as StdDuration, Instant as StdInstant};

use myrtio_torch_patterns::{DeviceError, EmissionCommand, ThermalState, TorchDevice};

/// Something the mock device was asked to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Acquire,
    Release,
    Set(EmissionCommand),
}

#[derive(Debug)]
pub struct MockState {
    pub supported: bool,
    pub thermal: ThermalState,
    pub refuse_lock: bool,
    /// Number of upcoming `set_output` calls that fail
    pub failing_sets: usize,
    pub locked: bool,
    pub calls: Vec<(StdInstant, Call)>,
}

/// Scripted torch that records every call with a timestamp
#[derive(Debug, Clone)]
pub struct MockTorch {
    state: Arc<Mutex<MockState>>,
}

impl MockTorch {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                supported: true,
                thermal: ThermalState::Nominal,
                refuse_lock: false,
                failing_sets: 0,
                locked: false,
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_thermal(self, thermal: ThermalState) -> Self {
        self.state().thermal = thermal;
        self
    }

    pub fn unsupported(self) -> Self {
        self.state().supported = false;
        self
    }

    pub fn refusing_lock(self) -> Self {
        self.state().refuse_lock = true;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn is_locked(&self) -> bool {
        self.state().locked
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.iter().map(|(_, call)| *call).collect()
    }

    pub fn timed_commands(&self) -> Vec<(StdInstant, EmissionCommand)> {
        self.state()
            .calls
            .iter()
            .filter_map(|(at, call)| match call {
                Call::Set(command) => Some((*at, *command)),
                _ => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<EmissionCommand> {
        self.timed_commands()
            .into_iter()
            .map(|(_, command)| command)
            .collect()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    pub fn on_count(&self) -> usize {
        self.commands().iter().filter(|c| c.on).count()
    }
}

impl TorchDevice for MockTorch {
    fn is_supported(&self) -> bool {
        self.state().supported
    }

    fn thermal_state(&self) -> ThermalState {
        self.state().thermal
    }

    fn acquire(&mut self) -> Result<(), DeviceError> {
        let mut state = self.state();
        state.calls.push((StdInstant::now(), Call::Acquire));
        if state.refuse_lock {
            return Err(DeviceError::LockFailed);
        }
        assert!(!state.locked, "device acquired twice");
        state.locked = true;
        Ok(())
    }

    fn release(&mut self) {
        let mut state = self.state();
        state.calls.push((StdInstant::now(), Call::Release));
        state.locked = false;
    }

    fn set_output(&mut self, command: EmissionCommand) -> Result<(), DeviceError> {
        let mut state = self.state();
        state.calls.push((StdInstant::now(), Call::Set(command)));
        if state.failing_sets > 0 {
            state.failing_sets -= 1;
            return Err(DeviceError::OperationFailed);
        }
        Ok(())
    }
}

/// Poll until `condition` holds or `timeout` elapses
pub fn wait_for(timeout: StdDuration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = StdInstant::now() + timeout;
    while StdInstant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(StdDuration::from_millis(5));
    }
    condition()
}
