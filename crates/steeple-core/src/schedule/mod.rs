//! Recurrence data model for gatherings.
//!
//! A gathering either follows a simple weekly-style rule (a weekday name
//! plus an advisory frequency tag) or carries a custom schedule that
//! overrides it. The resolver in [`resolver`] turns either shape into a
//! concrete next-occurrence date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod resolver;

/// Advisory frequency tag on the simple weekly-style rule.
///
/// The tag does not change date arithmetic: resolution always walks
/// forward to the next matching weekday regardless of its value. It is
/// carried for display and reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Weekly
    }
}

/// One repetition pattern of a recurring custom schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily {
        /// Gap in days between occurrences. Ignored when `custom_dates`
        /// is present.
        interval: u32,
        /// Explicit occurrence dates. When set, these are the candidates
        /// verbatim and the interval is not applied.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        custom_dates: Option<Vec<NaiveDate>>,
    },
    Weekly {
        /// 0=Sun ... 6=Sat
        days_of_week: Vec<u8>,
    },
    Biweekly {
        /// 0=Sun ... 6=Sat
        days_of_week: Vec<u8>,
    },
    Monthly {
        /// Fixed calendar day-of-month (1-31). Months lacking the day
        /// produce no occurrence.
        day_of_month: u32,
    },
}

/// Custom schedule overriding the simple weekly-style rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomSchedule {
    /// Single fixed calendar date.
    OneOff { start_date: NaiveDate },
    /// Pattern-based repetition over `[start_date, end_date)`.
    Recurring {
        start_date: NaiveDate,
        /// Defaults to `start_date + 8 weeks` when absent, bounding
        /// candidate expansion.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_date: Option<NaiveDate>,
        pattern: RecurrencePattern,
    },
}

/// A gathering definition as stored in configuration.
///
/// Immutable input to the resolver; resolution never mutates it and
/// returns a fresh [`NextOccurrence`] per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gathering {
    pub id: String,
    pub name: String,
    /// Weekday name, "Sunday".."Saturday". Absent or unrecognized names
    /// degrade to a same-day result rather than failing.
    #[serde(default)]
    pub day_of_week: Option<String>,
    #[serde(default)]
    pub frequency: Frequency,
    /// HH:mm
    #[serde(default = "default_start_time")]
    pub start_time: String,
    /// HH:mm
    #[serde(default = "default_end_time")]
    pub end_time: String,
    /// When present, takes priority over the simple weekly-style rule.
    #[serde(default)]
    pub custom_schedule: Option<CustomSchedule>,
}

fn default_start_time() -> String {
    "09:00".into()
}
fn default_end_time() -> String {
    "10:30".into()
}

impl Gathering {
    /// Create a gathering with a fresh id and default times.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            day_of_week: None,
            frequency: Frequency::Weekly,
            start_time: default_start_time(),
            end_time: default_end_time(),
            custom_schedule: None,
        }
    }
}

/// Result of resolving a gathering against "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextOccurrence {
    pub date: NaiveDate,
    /// Whole days between "today" and `date`, clamped at zero.
    pub days_away: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathering_serialization() {
        let mut g = Gathering::new("Sunday Service");
        g.day_of_week = Some("Sunday".to_string());
        g.custom_schedule = Some(CustomSchedule::Recurring {
            pattern: RecurrencePattern::Weekly {
                days_of_week: vec![0],
            },
            start_date: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            end_date: None,
        });

        let json = serde_json::to_string(&g).unwrap();
        let decoded: Gathering = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.custom_schedule, g.custom_schedule);
    }

    #[test]
    fn frequency_tag_is_lowercase() {
        let json = serde_json::to_string(&Frequency::Biweekly).unwrap();
        assert_eq!(json, "\"biweekly\"");
    }

    #[test]
    fn custom_schedule_toml_round_trip() {
        let schedule = CustomSchedule::Recurring {
            pattern: RecurrencePattern::Daily {
                interval: 3,
                custom_dates: None,
            },
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()),
        };
        let toml = toml::to_string(&schedule).unwrap();
        let decoded: CustomSchedule = toml::from_str(&toml).unwrap();
        assert_eq!(decoded, schedule);
    }
}
