//! Enable/disable state for phase locking.

/// What the mode controller observed at the start of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// Same state as the previous frame.
    Steady,
    /// Locking was switched on since the previous frame.
    Enabled,
    /// Locking was switched off since the previous frame; persisted phases
    /// must be re-initialized before the basic path runs.
    Disabled,
}

/// Tracks whether phase locking is enabled and detects toggles between
/// consecutive frames.
#[derive(Debug, Clone)]
pub struct ModeController {
    enabled: bool,
    was_enabled: bool,
}

impl ModeController {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            was_enabled: enabled,
        }
    }

    /// Requests locking on or off, effective from the next frame.
    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Compares the current state with the previous frame's and records it.
    ///
    /// Call exactly once per frame, before synthesis.
    pub fn begin_frame(&mut self) -> ModeTransition {
        let transition = match (self.was_enabled, self.enabled) {
            (true, false) => ModeTransition::Disabled,
            (false, true) => ModeTransition::Enabled,
            _ => ModeTransition::Steady,
        };
        self.was_enabled = self.enabled;
        transition
    }
}
