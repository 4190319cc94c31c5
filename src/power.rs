//! Screen power policy.
//!
//! The watch has no host OS telling the face when it is visible or ambient,
//! so the firmware derives both from the backlight state and idle time.

use heapless::Vec;

use crate::face::HostEvent;

/// What the screen is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenMode {
    Off,
    Interactive,
    Ambient,
}

/// Decide the screen mode from the display switch and inactivity.
pub fn screen_mode(display_on: bool, idle_secs: u64, ambient_after_secs: u64) -> ScreenMode {
    if !display_on {
        return ScreenMode::Off;
    }

    if idle_secs >= ambient_after_secs {
        return ScreenMode::Ambient;
    }

    ScreenMode::Interactive
}

impl ScreenMode {
    /// Face callbacks for a change from `self` to `next`.
    pub fn transition_events(self, next: ScreenMode) -> Vec<HostEvent, 2> {
        use ScreenMode::*;

        let (ambient, visible) = match (self, next) {
            (a, b) if a == b => (None, None),
            (_, Off) => (None, Some(false)),
            (Off, Interactive) => (Some(false), Some(true)),
            (Off, Ambient) => (Some(true), Some(true)),
            (Interactive, Ambient) => (Some(true), None),
            (Ambient, Interactive) => (Some(false), None),
            _ => (None, None),
        };

        // Ambient first so the face starts its timer in the right mode
        let mut events = Vec::new();
        if let Some(ambient) = ambient {
            let _ = events.push(HostEvent::AmbientModeChanged(ambient));
        }
        if let Some(visible) = visible {
            let _ = events.push(HostEvent::VisibilityChanged(visible));
        }
        events
    }
}
