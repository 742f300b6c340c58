//! Lights, doors and engine as three binary devices.
//!
//! Engine start is gated on the doors being locked. That is the only rule
//! linking devices; everything else toggles independently and repeating a
//! command reports "already" instead of failing.

use tracing::{info, warn};

use crate::router::Subsystem;

/// Result of one control command. Never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// State changed.
    Changed(&'static str),
    /// Device was already in the requested state.
    Unchanged(&'static str),
    /// Refused by an interlock.
    Blocked(&'static str),
    /// Command text not understood for the subsystem.
    Invalid(&'static str),
}

impl ControlOutcome {
    /// The reply shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            ControlOutcome::Changed(m)
            | ControlOutcome::Unchanged(m)
            | ControlOutcome::Blocked(m)
            | ControlOutcome::Invalid(m) => m,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, ControlOutcome::Changed(_))
    }
}

impl std::fmt::Display for ControlOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Remote-control state for one session's vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleController {
    lights_on: bool,
    doors_locked: bool,
    engine_on: bool,
}

impl VehicleController {
    /// Lights off, doors unlocked, engine off.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lights_on(&self) -> bool {
        self.lights_on
    }

    pub fn doors_locked(&self) -> bool {
        self.doors_locked
    }

    pub fn engine_on(&self) -> bool {
        self.engine_on
    }

    pub fn apply(&mut self, subsystem: Subsystem, action: &str) -> ControlOutcome {
        let action = action.to_lowercase();
        match subsystem {
            Subsystem::Lights => self.control_lights(&action),
            Subsystem::Doors => self.control_doors(&action),
            Subsystem::Engine => self.control_engine(&action),
        }
    }

    fn control_lights(&mut self, action: &str) -> ControlOutcome {
        if action.contains("on") {
            if self.lights_on {
                return ControlOutcome::Unchanged("Vehicle lights are already on");
            }
            self.lights_on = true;
            info!("🚗 Vehicle lights turned ON");
            ControlOutcome::Changed("Vehicle lights have been turned on")
        } else if action.contains("off") {
            if !self.lights_on {
                return ControlOutcome::Unchanged("Vehicle lights are already off");
            }
            self.lights_on = false;
            info!("🚗 Vehicle lights turned OFF");
            ControlOutcome::Changed("Vehicle lights have been turned off")
        } else {
            ControlOutcome::Invalid("Invalid lights command")
        }
    }

    fn control_doors(&mut self, action: &str) -> ControlOutcome {
        if action.contains("lock") && !action.contains("unlock") {
            if self.doors_locked {
                return ControlOutcome::Unchanged("All doors are already locked");
            }
            self.doors_locked = true;
            info!("🚗 Vehicle doors LOCKED");
            ControlOutcome::Changed("All doors have been locked")
        } else if action.contains("unlock") {
            if !self.doors_locked {
                return ControlOutcome::Unchanged("All doors are already unlocked");
            }
            self.doors_locked = false;
            info!("🚗 Vehicle doors UNLOCKED");
            ControlOutcome::Changed("All doors have been unlocked")
        } else {
            ControlOutcome::Invalid("Invalid door command")
        }
    }

    fn control_engine(&mut self, action: &str) -> ControlOutcome {
        if action.contains("start") {
            if self.engine_on {
                return ControlOutcome::Unchanged("Engine is already running");
            }
            if !self.doors_locked {
                warn!("⚠️ Cannot start engine: doors must be locked first");
                return ControlOutcome::Blocked("Please lock the doors before starting the engine");
            }
            self.engine_on = true;
            info!("🚗 Engine STARTED");
            ControlOutcome::Changed("Engine has been started")
        } else if action.contains("stop") || action.contains("off") {
            if !self.engine_on {
                return ControlOutcome::Unchanged("Engine is already stopped");
            }
            self.engine_on = false;
            info!("🚗 Engine STOPPED");
            ControlOutcome::Changed("Engine has been stopped")
        } else {
            ControlOutcome::Invalid("Invalid engine command")
        }
    }
}
