//! Kiosk mode state machine.
//!
//! The controller is wall-clock-based and holds no timer of its own; the
//! hosting session calls `tick()` periodically with an injected "now".
//! Event timestamps reuse the injected instant, so the machine stays
//! deterministic end to end.
//!
//! ## State Transitions
//!
//! ```text
//! CheckIn <-> CheckOut
//! ```
//!
//! Automatic evaluation compares "now" against the window's checkout
//! threshold. An operator may force either mode at any time; the forced
//! mode lasts only until the next scheduled re-evaluation, which resumes
//! automatic logic and wipes the override.

use chrono::{Duration, NaiveDateTime};

use super::{KioskMode, KioskWindow, CHECKOUT_LEAD_MINUTES, REEVAL_INTERVAL_MINUTES};
use crate::events::Event;

/// Check-in/check-out controller for one kiosk session.
#[derive(Debug, Clone)]
pub struct ModeController {
    window: KioskWindow,
    /// Minutes before the window's end time at which check-out begins.
    lead_minutes: i64,
    mode: KioskMode,
    /// Instant of the last automatic evaluation. Manual overrides do not
    /// touch it, so the re-evaluation cadence is unaffected by them.
    last_eval: NaiveDateTime,
    overridden: bool,
}

impl ModeController {
    /// Create a controller with the default checkout lead, evaluating
    /// once on entry to the kiosk screen.
    pub fn new(window: KioskWindow, now: NaiveDateTime) -> Self {
        Self::with_lead(window, CHECKOUT_LEAD_MINUTES, now)
    }

    /// Create a controller with a configured checkout lead.
    pub fn with_lead(window: KioskWindow, lead_minutes: i64, now: NaiveDateTime) -> Self {
        Self {
            window,
            lead_minutes,
            mode: window.mode_at_with(now.time(), lead_minutes),
            last_eval: now,
            overridden: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> KioskMode {
        self.mode
    }

    pub fn window(&self) -> KioskWindow {
        self.window
    }

    /// True while a manual override is pending the next re-evaluation.
    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call periodically. Re-evaluates once the interval has elapsed;
    /// returns `Some(Event::KioskModeChanged)` when the mode flipped.
    ///
    /// A scheduled re-evaluation always resumes automatic logic, wiping
    /// any manual override set since the previous one.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<Event> {
        if now - self.last_eval < Duration::minutes(REEVAL_INTERVAL_MINUTES) {
            return None;
        }
        self.last_eval = now;
        self.overridden = false;
        let next = self.window.mode_at_with(now.time(), self.lead_minutes);
        if next == self.mode {
            return None;
        }
        let from = self.mode;
        self.mode = next;
        Some(Event::KioskModeChanged {
            from,
            to: next,
            automatic: true,
            at: now.and_utc(),
        })
    }

    /// Operator toggle. Takes effect immediately and persists only until
    /// the next scheduled re-evaluation.
    pub fn force_mode(&mut self, mode: KioskMode, now: NaiveDateTime) -> Option<Event> {
        self.overridden = true;
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        Some(Event::KioskModeForced {
            mode,
            at: now.and_utc(),
        })
    }
}
