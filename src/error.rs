use thiserror::Error;

/// Failure reported by a [`TorchDevice`](crate::TorchDevice) binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The device has no controllable output
    #[error("device has no torch")]
    Unsupported,
    /// Exclusive control could not be obtained
    #[error("device lock failed")]
    LockFailed,
    /// The device refused an output change
    #[error("device operation failed")]
    OperationFailed,
}

/// Failure reported by the pattern engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The device has no controllable output. Not retried.
    #[error("torch unsupported")]
    Unsupported,
    /// Exclusive device control could not be acquired. The caller may retry.
    #[error("torch lock failed: {0}")]
    LockFailed(DeviceError),
    /// A single command failed during emission. Absorbed by the loop.
    #[error("torch command failed: {0}")]
    CommandFailed(DeviceError),
    /// The emission thread could not be started
    #[error("emission context unavailable")]
    ContextUnavailable,
}
