use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::kiosk::KioskMode;

/// Every state change in the system produces an Event.
/// The hosting front end polls for events; loggers subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The kiosk mode flipped.
    KioskModeChanged {
        from: KioskMode,
        to: KioskMode,
        /// True when the flip came from a scheduled re-evaluation rather
        /// than an operator action.
        automatic: bool,
        at: DateTime<Utc>,
    },
    /// An operator forced the kiosk mode via the manual toggle.
    KioskModeForced {
        mode: KioskMode,
        at: DateTime<Utc>,
    },
    /// A gathering's next occurrence was resolved.
    OccurrenceResolved {
        gathering_id: String,
        date: NaiveDate,
        days_away: u32,
        at: DateTime<Utc>,
    },
    /// A kiosk session was torn down and its ticker released.
    KioskSessionEnded {
        at: DateTime<Utc>,
    },
}
