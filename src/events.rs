//! Engine event log.
//!
//! A bounded, drop-oldest queue built on `critical-section` and
//! `heapless::Deque`. The emission thread pushes, presentation code reads;
//! pushing never blocks and never fails, so logging can't stall a pattern.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{Deque, Vec};

use crate::command::EmissionCommand;
use crate::error::EngineError;
use crate::pattern::PatternKind;
use crate::safety::ThermalState;

/// Default number of events kept by the engine.
pub const EVENT_LOG_SIZE: usize = 32;

/// Something observable that happened inside the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A pattern started emitting
    Started {
        kind: PatternKind,
        /// Base level after derating
        level: f32,
        /// Thermal state sampled at start
        thermal: ThermalState,
    },
    /// `start` was refused
    StartFailed(EngineError),
    /// A command failed and was skipped
    CommandFailed {
        command: EmissionCommand,
        error: EngineError,
    },
    /// The pattern stopped and the device was released
    Stopped,
}

/// Bounded, thread-safe log that overwrites its oldest entry when full.
pub struct EventLog<T, const SIZE: usize> {
    inner: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> EventLog<T, SIZE> {
    /// Create a new empty log.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Append an entry, evicting the oldest one if the log is full.
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&self, value: T) -> Option<T> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            let evicted = if queue.is_full() {
                queue.pop_front()
            } else {
                None
            };
            // Cannot fail: a slot was freed above if needed.
            let _ = queue.push_back(value);
            evicted
        })
    }

    /// Take the oldest entry.
    pub fn try_receive(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().clear());
    }
}

impl<T: Clone, const SIZE: usize> EventLog<T, SIZE> {
    /// Copy of all entries, oldest first, without consuming them.
    pub fn snapshot(&self) -> Vec<T, SIZE> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().iter().cloned().collect())
    }
}

impl<T, const SIZE: usize> Default for EventLog<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Event log used by the engine
pub type EngineEventLog = EventLog<EngineEvent, EVENT_LOG_SIZE>;
