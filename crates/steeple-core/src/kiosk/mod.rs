//! Kiosk check-in/check-out mode.
//!
//! A kiosk screen records attendance for one gathering. While the
//! gathering is open it offers check-in; close to the configured end
//! time it flips to check-out. The flip is driven by [`ModeController`],
//! a wall-clock state machine ticked by the caller.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule::Gathering;

mod controller;

pub use controller::ModeController;

/// Minutes before the gathering's end time at which the kiosk flips to
/// check-out.
pub const CHECKOUT_LEAD_MINUTES: i64 = 15;

/// Minutes between automatic mode re-evaluations.
pub const REEVAL_INTERVAL_MINUTES: i64 = 15;

/// Kiosk screen mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KioskMode {
    CheckIn,
    CheckOut,
}

impl std::fmt::Display for KioskMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KioskMode::CheckIn => write!(f, "checkin"),
            KioskMode::CheckOut => write!(f, "checkout"),
        }
    }
}

/// The gathering's open hours on "today", parsed from its HH:mm strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KioskWindow {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl KioskWindow {
    /// Parse `HH:mm` start/end strings. Malformed strings are a
    /// configuration error; the state machine itself never fails.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        let parse_one = |key: &str, value: &str| {
            NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected HH:MM, got '{value}': {e}"),
            })
        };
        Ok(Self {
            start_time: parse_one("start_time", start)?,
            end_time: parse_one("end_time", end)?,
        })
    }

    /// Window for a configured gathering.
    pub fn for_gathering(gathering: &Gathering) -> Result<Self, ConfigError> {
        Self::parse(&gathering.start_time, &gathering.end_time)
    }

    /// Instant at which the kiosk flips to check-out, with the default
    /// lead.
    pub fn checkout_threshold(&self) -> NaiveTime {
        self.checkout_threshold_with(CHECKOUT_LEAD_MINUTES)
    }

    /// Instant at which the kiosk flips to check-out, `lead_minutes`
    /// before the end time.
    pub fn checkout_threshold_with(&self, lead_minutes: i64) -> NaiveTime {
        self.end_time
            .overflowing_sub_signed(Duration::minutes(lead_minutes))
            .0
    }

    /// Mode the kiosk should be in at `now`, ignoring manual overrides.
    pub fn mode_at(&self, now: NaiveTime) -> KioskMode {
        self.mode_at_with(now, CHECKOUT_LEAD_MINUTES)
    }

    /// Mode at `now` under a configured checkout lead.
    pub fn mode_at_with(&self, now: NaiveTime, lead_minutes: i64) -> KioskMode {
        if now >= self.checkout_threshold_with(lead_minutes) {
            KioskMode::CheckOut
        } else {
            KioskMode::CheckIn
        }
    }
}
