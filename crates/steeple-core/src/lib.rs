//! # Steeple Core Library
//!
//! This library provides the scheduling core for Steeple, a gathering
//! attendance toolkit. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with any front
//! end being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Schedule Resolver**: A pure calendar calculator that turns a
//!   gathering's recurrence definition and an injected "today" into the
//!   next occurrence date
//! - **Kiosk Mode Controller**: A wall-clock state machine that flips a
//!   kiosk screen between check-in and check-out; the caller invokes
//!   `tick()` periodically
//! - **Storage**: TOML-based configuration holding the gathering roster
//!
//! ## Key Components
//!
//! - [`resolve_next_occurrence`]: Next-occurrence resolution
//! - [`ModeController`]: Kiosk check-in/check-out state machine
//! - [`Config`]: Gathering roster and kiosk settings persistence

pub mod error;
pub mod events;
pub mod kiosk;
pub mod schedule;
pub mod storage;

pub use error::{ConfigError, CoreError, Result};
pub use events::Event;
pub use kiosk::{KioskMode, KioskWindow, ModeController};
pub use schedule::resolver::{resolve_next_occurrence, upcoming_occurrences};
pub use schedule::{CustomSchedule, Frequency, Gathering, NextOccurrence, RecurrencePattern};
pub use storage::Config;
