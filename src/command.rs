use crate::safety::clamp_level;

/// Lowest level a torch accepts while switched on.
pub const MIN_ON_LEVEL: f32 = 0.01;

/// A single output change sent to the [`TorchDevice`](crate::TorchDevice)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionCommand {
    /// Whether the output is lit
    pub on: bool,
    /// Output level in `[0, 1]`
    pub level: f32,
}

impl EmissionCommand {
    /// Output off, level zero.
    pub const OFF: Self = Self {
        on: false,
        level: 0.0,
    };

    /// Output lit at `level`, clamped to `[0, 1]`
    pub fn on(level: f32) -> Self {
        Self {
            on: true,
            level: clamp_level(level),
        }
    }

    /// Level a binding should program into the hardware
    ///
    /// Off commands map to zero. Lit commands never go below [`MIN_ON_LEVEL`],
    /// since most torches reject a zero level while on.
    pub fn device_level(&self) -> f32 {
        if self.on {
            clamp_level(self.level).max(MIN_ON_LEVEL)
        } else {
            0.0
        }
    }
}
