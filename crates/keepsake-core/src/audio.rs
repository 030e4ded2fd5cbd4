//! Background music collaborator
//!
//! The navigator only ever needs an on/off switch. Failures (for example a
//! player refusing to start) are reported back and logged by the caller; they
//! never change navigation state.

use crate::Result;

pub trait Audio {
    fn enable(&mut self) -> Result<()>;
    fn disable(&mut self) -> Result<()>;
    fn is_enabled(&self) -> bool;
}

/// Audio that only tracks the toggle; no sound is produced
#[derive(Debug, Clone, Default)]
pub struct SimulatedAudio {
    enabled: bool,
}

impl SimulatedAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Audio for SimulatedAudio {
    fn enable(&mut self) -> Result<()> {
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        self.enabled = false;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
