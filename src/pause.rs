// Global circuit breaker for trading

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Pause switch owned by the engine. Only buys and sells consult it;
/// resolution, redemption and fee withdrawal keep working while paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseGate {
    paused: bool,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns true when the flag actually changed
    pub fn pause(&mut self) -> bool {
        let changed = !self.paused;
        self.paused = true;
        changed
    }

    /// Returns true when the flag actually changed
    pub fn unpause(&mut self) -> bool {
        let changed = self.paused;
        self.paused = false;
        changed
    }

    pub fn require_not_paused(&self) -> LedgerResult<()> {
        if self.paused {
            return Err(LedgerError::SystemPaused);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unpaused() {
        let gate = PauseGate::new();
        assert!(!gate.is_paused());
        assert!(gate.require_not_paused().is_ok());
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut gate = PauseGate::new();
        assert!(gate.pause());
        assert!(!gate.pause());
        assert_eq!(gate.require_not_paused(), Err(LedgerError::SystemPaused));

        assert!(gate.unpause());
        assert!(!gate.unpause());
        assert!(gate.require_not_paused().is_ok());
    }
}
