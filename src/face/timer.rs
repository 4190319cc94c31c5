//! Interactive-mode redraw timer.

use crate::config::INTERACTIVE_UPDATE_RATE_MS;

/// Delay until the next whole second.
pub fn next_tick_delay_ms(now_ms: i64) -> u64 {
    let rate = INTERACTIVE_UPDATE_RATE_MS as i64;
    (rate - now_ms.rem_euclid(rate)) as u64
}

/// A single self-rescheduling tick. At most one is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateTimer {
    deadline_ms: Option<i64>,
}

impl UpdateTimer {
    pub const fn new() -> Self {
        Self { deadline_ms: None }
    }

    /// Replace any outstanding tick with one `delay_ms` from `now_ms`.
    pub fn schedule(&mut self, now_ms: i64, delay_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(delay_ms as i64));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline_ms(&self) -> Option<i64> {
        self.deadline_ms
    }

    /// Consume the tick if it is due.
    pub fn fire(&mut self, now_ms: i64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
