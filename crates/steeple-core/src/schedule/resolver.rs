//! Next-occurrence resolution.
//!
//! The resolver is a pure calendar calculator. "Today" is injected by the
//! caller rather than read from the system clock, so resolution is
//! deterministic and safe to call from any number of threads. It is also
//! total: malformed or incomplete definitions degrade to a best-effort
//! date instead of failing, because the caller always needs some date to
//! display.

use chrono::{Datelike, Duration, NaiveDate};

use super::{CustomSchedule, Gathering, NextOccurrence, RecurrencePattern};

/// Weekday-name lookup, Sunday=0 .. Saturday=6.
const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Expansion horizon applied when a recurring schedule has no end date.
const DEFAULT_HORIZON_WEEKS: i64 = 8;

fn weekday_index(name: &str) -> Option<u8> {
    WEEKDAY_NAMES
        .iter()
        .position(|&n| n.eq_ignore_ascii_case(name))
        .map(|i| i as u8)
}

/// Resolve the next occurrence of `gathering` on or after `today`.
///
/// A custom schedule takes priority; a recurring pattern that yields no
/// candidates falls through to the simple weekly-style rule, which in
/// turn degrades to `{today, 0}` when the weekday name is absent or
/// unrecognized.
pub fn resolve_next_occurrence(gathering: &Gathering, today: NaiveDate) -> NextOccurrence {
    if let Some(schedule) = &gathering.custom_schedule {
        match schedule {
            CustomSchedule::OneOff { start_date } => {
                return NextOccurrence {
                    date: *start_date,
                    days_away: days_away(*start_date, today),
                };
            }
            CustomSchedule::Recurring {
                pattern,
                start_date,
                end_date,
            } => {
                let end = effective_end(*start_date, *end_date);
                let candidates = expand_candidates(pattern, *start_date, end);
                if let Some(date) = select_candidate(&candidates, today) {
                    return NextOccurrence {
                        date,
                        days_away: days_away(date, today),
                    };
                }
                // Zero candidates: fall through to the simple rule.
            }
        }
    }

    next_simple_occurrence(gathering.day_of_week.as_deref(), today)
}

/// Occurrence dates on or after `today`, at most `limit` of them.
///
/// Custom schedules expand their candidate set; the simple weekly-style
/// rule walks forward a week at a time. Degenerate definitions yield the
/// single date the resolver would report.
pub fn upcoming_occurrences(gathering: &Gathering, today: NaiveDate, limit: usize) -> Vec<NaiveDate> {
    if limit == 0 {
        return Vec::new();
    }
    if let Some(schedule) = &gathering.custom_schedule {
        match schedule {
            CustomSchedule::OneOff { start_date } => {
                return if *start_date >= today {
                    vec![*start_date]
                } else {
                    Vec::new()
                };
            }
            CustomSchedule::Recurring {
                pattern,
                start_date,
                end_date,
            } => {
                let end = effective_end(*start_date, *end_date);
                let candidates = expand_candidates(pattern, *start_date, end);
                if !candidates.is_empty() {
                    return candidates
                        .into_iter()
                        .filter(|d| *d >= today)
                        .take(limit)
                        .collect();
                }
            }
        }
    }

    match gathering.day_of_week.as_deref().and_then(weekday_index) {
        Some(target) => {
            let first = today + Duration::days(days_until_weekday(target, today));
            (0..limit as i64).map(|k| first + Duration::weeks(k)).collect()
        }
        None => vec![today],
    }
}

fn effective_end(start: NaiveDate, end: Option<NaiveDate>) -> NaiveDate {
    end.unwrap_or(start + Duration::weeks(DEFAULT_HORIZON_WEEKS))
}

fn days_away(date: NaiveDate, today: NaiveDate) -> u32 {
    (date - today).num_days().max(0) as u32
}

fn days_until_weekday(target: u8, today: NaiveDate) -> i64 {
    let today_idx = today.weekday().num_days_from_sunday() as i64;
    (target as i64 - today_idx).rem_euclid(7)
}

fn next_simple_occurrence(day_of_week: Option<&str>, today: NaiveDate) -> NextOccurrence {
    match day_of_week.and_then(weekday_index) {
        Some(target) => {
            let days_until = days_until_weekday(target, today);
            NextOccurrence {
                date: today + Duration::days(days_until),
                days_away: days_until as u32,
            }
        }
        // Degenerate: no usable weekday, report "today" so the caller
        // still has a date to show.
        None => NextOccurrence {
            date: today,
            days_away: 0,
        },
    }
}

/// Sorted, deduplicated candidate dates for `pattern` over `[start, end)`.
fn expand_candidates(pattern: &RecurrencePattern, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut candidates = match pattern {
        RecurrencePattern::Daily {
            interval,
            custom_dates,
        } => match custom_dates {
            // Explicit dates are the candidates verbatim; the interval
            // does not filter them.
            Some(dates) => dates.clone(),
            None => {
                let step = (*interval).max(1) as i64;
                let mut dates = Vec::new();
                let mut cursor = start;
                while cursor < end {
                    dates.push(cursor);
                    cursor += Duration::days(step);
                }
                dates
            }
        },
        RecurrencePattern::Weekly { days_of_week } => {
            expand_weekly(days_of_week, start, end, 1)
        }
        RecurrencePattern::Biweekly { days_of_week } => {
            expand_weekly(days_of_week, start, end, 2)
        }
        RecurrencePattern::Monthly { day_of_month } => {
            // Cursor advances 4 weeks at a time, not one calendar month.
            // Near the end of the range this can overshoot a month whose
            // day-of-month would still fall inside it.
            let mut dates = Vec::new();
            let mut cursor = start;
            while cursor < end {
                if let Some(date) =
                    NaiveDate::from_ymd_opt(cursor.year(), cursor.month(), *day_of_month)
                {
                    if date >= start && date < end {
                        dates.push(date);
                    }
                }
                cursor += Duration::weeks(4);
            }
            dates
        }
    };
    candidates.sort_unstable();
    candidates.dedup();
    candidates
}

/// Weeks are anchored to the Sunday of `start`'s week; `week_step` of 2
/// keeps every other week, parity relative to that anchor.
fn expand_weekly(days_of_week: &[u8], start: NaiveDate, end: NaiveDate, week_step: i64) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut week_start = start - Duration::days(start.weekday().num_days_from_sunday() as i64);
    while week_start < end {
        for &day in days_of_week {
            if day > 6 {
                continue;
            }
            let date = week_start + Duration::days(day as i64);
            if date >= start && date < end {
                dates.push(date);
            }
        }
        week_start += Duration::weeks(week_step);
    }
    dates
}

/// First candidate on or after `today`, else the latest candidate.
fn select_candidate(candidates: &[NaiveDate], today: NaiveDate) -> Option<NaiveDate> {
    candidates
        .iter()
        .copied()
        .find(|d| *d >= today)
        .or_else(|| candidates.last().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Frequency;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn simple(day: Option<&str>) -> Gathering {
        let mut g = Gathering::new("Test Gathering");
        g.day_of_week = day.map(str::to_string);
        g
    }

    fn recurring(pattern: RecurrencePattern, start: NaiveDate, end: Option<NaiveDate>) -> Gathering {
        let mut g = Gathering::new("Test Gathering");
        g.custom_schedule = Some(CustomSchedule::Recurring {
            pattern,
            start_date: start,
            end_date: end,
        });
        g
    }

    #[test]
    fn one_off_in_the_future() {
        let mut g = Gathering::new("Easter Service");
        g.custom_schedule = Some(CustomSchedule::OneOff {
            start_date: date(2024, 3, 31),
        });
        let next = resolve_next_occurrence(&g, date(2024, 3, 25));
        assert_eq!(next.date, date(2024, 3, 31));
        assert_eq!(next.days_away, 6);
    }

    #[test]
    fn one_off_in_the_past_clamps_to_zero() {
        let mut g = Gathering::new("Easter Service");
        g.custom_schedule = Some(CustomSchedule::OneOff {
            start_date: date(2024, 3, 31),
        });
        let next = resolve_next_occurrence(&g, date(2024, 5, 1));
        assert_eq!(next.date, date(2024, 3, 31));
        assert_eq!(next.days_away, 0);
    }

    #[test]
    fn simple_wednesday_from_monday_is_two_days() {
        // 2024-03-04 is a Monday.
        let next = resolve_next_occurrence(&simple(Some("Wednesday")), date(2024, 3, 4));
        assert_eq!(next.days_away, 2);
        assert_eq!(next.date, date(2024, 3, 6));
    }

    #[test]
    fn simple_same_weekday_is_today() {
        // 2024-03-03 is a Sunday.
        let next = resolve_next_occurrence(&simple(Some("Sunday")), date(2024, 3, 3));
        assert_eq!(next.days_away, 0);
        assert_eq!(next.date, date(2024, 3, 3));
    }

    #[test]
    fn simple_weekday_name_is_case_insensitive() {
        let next = resolve_next_occurrence(&simple(Some("wednesday")), date(2024, 3, 4));
        assert_eq!(next.days_away, 2);
    }

    #[test]
    fn missing_weekday_degrades_to_today() {
        let next = resolve_next_occurrence(&simple(None), date(2024, 3, 4));
        assert_eq!(next, NextOccurrence { date: date(2024, 3, 4), days_away: 0 });
    }

    #[test]
    fn unrecognized_weekday_degrades_to_today() {
        let next = resolve_next_occurrence(&simple(Some("Funday")), date(2024, 3, 4));
        assert_eq!(next, NextOccurrence { date: date(2024, 3, 4), days_away: 0 });
    }

    #[test]
    fn frequency_tag_does_not_change_arithmetic() {
        let mut g = simple(Some("Wednesday"));
        g.frequency = Frequency::Monthly;
        let next = resolve_next_occurrence(&g, date(2024, 3, 4));
        assert_eq!(next.days_away, 2);
    }

    #[test]
    fn daily_interval_candidates() {
        let g = recurring(
            RecurrencePattern::Daily { interval: 3, custom_dates: None },
            date(2024, 3, 1),
            Some(date(2024, 3, 10)),
        );
        // Candidates are 03-01, 03-04, 03-07; the end date is exclusive.
        let next = resolve_next_occurrence(&g, date(2024, 3, 1));
        assert_eq!(next.date, date(2024, 3, 1));
        assert_eq!(next.days_away, 0);

        let next = resolve_next_occurrence(&g, date(2024, 3, 5));
        assert_eq!(next.date, date(2024, 3, 7));
        assert_eq!(next.days_away, 2);
    }

    #[test]
    fn daily_past_range_falls_back_to_latest_candidate() {
        let g = recurring(
            RecurrencePattern::Daily { interval: 3, custom_dates: None },
            date(2024, 3, 1),
            Some(date(2024, 3, 10)),
        );
        let next = resolve_next_occurrence(&g, date(2024, 4, 1));
        assert_eq!(next.date, date(2024, 3, 7));
        assert_eq!(next.days_away, 0);
    }

    #[test]
    fn daily_explicit_dates_ignore_interval() {
        let g = recurring(
            RecurrencePattern::Daily {
                interval: 7,
                custom_dates: Some(vec![date(2024, 3, 2), date(2024, 3, 3), date(2024, 3, 9)]),
            },
            date(2024, 3, 1),
            Some(date(2024, 3, 31)),
        );
        let next = resolve_next_occurrence(&g, date(2024, 3, 3));
        assert_eq!(next.date, date(2024, 3, 3));
        let next = resolve_next_occurrence(&g, date(2024, 3, 4));
        assert_eq!(next.date, date(2024, 3, 9));
    }

    #[test]
    fn daily_zero_interval_still_terminates() {
        let g = recurring(
            RecurrencePattern::Daily { interval: 0, custom_dates: None },
            date(2024, 3, 1),
            Some(date(2024, 3, 5)),
        );
        let next = resolve_next_occurrence(&g, date(2024, 3, 2));
        assert_eq!(next.date, date(2024, 3, 2));
    }

    #[test]
    fn weekly_emits_each_requested_weekday() {
        // Start Sunday 2024-03-03; Sundays and Wednesdays for two weeks.
        let g = recurring(
            RecurrencePattern::Weekly { days_of_week: vec![0, 3] },
            date(2024, 3, 3),
            Some(date(2024, 3, 17)),
        );
        assert_eq!(
            upcoming_occurrences(&g, date(2024, 3, 3), 10),
            vec![date(2024, 3, 3), date(2024, 3, 6), date(2024, 3, 10), date(2024, 3, 13)],
        );
    }

    #[test]
    fn weekly_same_day_resolves_to_zero() {
        let g = recurring(
            RecurrencePattern::Weekly { days_of_week: vec![3] },
            date(2024, 3, 3),
            None,
        );
        // 2024-03-06 is a Wednesday inside the default horizon.
        let next = resolve_next_occurrence(&g, date(2024, 3, 6));
        assert_eq!(next.days_away, 0);
        assert_eq!(next.date, date(2024, 3, 6));
    }

    #[test]
    fn weekly_excludes_days_before_start() {
        // Start Wednesday 2024-03-06; the Monday of that week precedes
        // the start date and must not be emitted.
        let g = recurring(
            RecurrencePattern::Weekly { days_of_week: vec![1] },
            date(2024, 3, 6),
            Some(date(2024, 3, 20)),
        );
        assert_eq!(
            upcoming_occurrences(&g, date(2024, 3, 1), 10),
            vec![date(2024, 3, 11), date(2024, 3, 18)],
        );
    }

    #[test]
    fn biweekly_keeps_every_other_week() {
        // Start Sunday 2024-03-03, Sundays only, six weeks of range.
        let g = recurring(
            RecurrencePattern::Biweekly { days_of_week: vec![0] },
            date(2024, 3, 3),
            Some(date(2024, 4, 14)),
        );
        assert_eq!(
            upcoming_occurrences(&g, date(2024, 3, 3), 10),
            vec![date(2024, 3, 3), date(2024, 3, 17), date(2024, 3, 31)],
        );
    }

    #[test]
    fn default_horizon_is_eight_weeks() {
        let g = recurring(
            RecurrencePattern::Weekly { days_of_week: vec![0] },
            date(2024, 3, 3),
            None,
        );
        let dates = upcoming_occurrences(&g, date(2024, 3, 3), 100);
        // Sundays from 03-03 up to but not including 04-28.
        assert_eq!(dates.len(), 8);
        assert_eq!(*dates.last().unwrap(), date(2024, 4, 21));
    }

    #[test]
    fn monthly_four_week_step_misses_a_month_end() {
        // Cursor positions: 01-01, 01-29, 02-26, 03-25; the next step
        // lands on 04-22, past the end date, so April 15th is never
        // emitted even though it precedes 04-18. True calendar-month
        // stepping would include it. Pinned on purpose.
        let g = recurring(
            RecurrencePattern::Monthly { day_of_month: 15 },
            date(2024, 1, 1),
            Some(date(2024, 4, 18)),
        );
        let dates = upcoming_occurrences(&g, date(2024, 1, 1), 10);
        assert_eq!(dates, vec![date(2024, 1, 15), date(2024, 2, 15), date(2024, 3, 15)]);
    }

    #[test]
    fn monthly_duplicate_cursor_months_collapse() {
        // Cursors 01-01 and 01-29 both sit in January; the 15th is
        // emitted once.
        let g = recurring(
            RecurrencePattern::Monthly { day_of_month: 15 },
            date(2024, 1, 1),
            Some(date(2024, 2, 1)),
        );
        let dates = upcoming_occurrences(&g, date(2024, 1, 1), 10);
        assert_eq!(dates, vec![date(2024, 1, 15)]);
    }

    #[test]
    fn monthly_skips_invalid_day_of_month() {
        let g = recurring(
            RecurrencePattern::Monthly { day_of_month: 30 },
            date(2024, 1, 20),
            Some(date(2024, 3, 20)),
        );
        // February 2024 has no 30th; January 30th and nothing else until
        // March, which the cursor reaches at 03-16.
        let dates = upcoming_occurrences(&g, date(2024, 1, 20), 10);
        assert_eq!(dates, vec![date(2024, 1, 30)]);
    }

    #[test]
    fn empty_days_of_week_falls_back_to_simple_rule() {
        let mut g = recurring(
            RecurrencePattern::Weekly { days_of_week: vec![] },
            date(2024, 3, 3),
            None,
        );
        g.day_of_week = Some("Wednesday".to_string());
        let next = resolve_next_occurrence(&g, date(2024, 3, 4));
        assert_eq!(next.days_away, 2);
    }

    #[test]
    fn empty_days_and_no_weekday_degrades_to_today() {
        let g = recurring(
            RecurrencePattern::Weekly { days_of_week: vec![] },
            date(2024, 3, 3),
            None,
        );
        let next = resolve_next_occurrence(&g, date(2024, 3, 4));
        assert_eq!(next, NextOccurrence { date: date(2024, 3, 4), days_away: 0 });
    }

    #[test]
    fn upcoming_simple_walks_weekly() {
        let dates = upcoming_occurrences(&simple(Some("Sunday")), date(2024, 3, 4), 3);
        assert_eq!(dates, vec![date(2024, 3, 10), date(2024, 3, 17), date(2024, 3, 24)]);
    }

    fn arb_pattern() -> impl Strategy<Value = RecurrencePattern> {
        prop_oneof![
            (0u32..10).prop_map(|interval| RecurrencePattern::Daily { interval, custom_dates: None }),
            proptest::collection::vec(0u8..7, 0..4)
                .prop_map(|days_of_week| RecurrencePattern::Weekly { days_of_week }),
            proptest::collection::vec(0u8..7, 0..4)
                .prop_map(|days_of_week| RecurrencePattern::Biweekly { days_of_week }),
            (1u32..32).prop_map(|day_of_month| RecurrencePattern::Monthly { day_of_month }),
        ]
    }

    fn arb_gathering() -> impl Strategy<Value = Gathering> {
        let day = prop_oneof![
            Just(None),
            (0usize..7).prop_map(|i| Some(WEEKDAY_NAMES[i].to_string())),
            Just(Some("Someday".to_string())),
        ];
        let schedule = prop_oneof![
            Just(None),
            (0i64..200).prop_map(|off| {
                Some(CustomSchedule::OneOff {
                    start_date: date(2024, 1, 1) + Duration::days(off),
                })
            }),
            (arb_pattern(), 0i64..200, proptest::option::of(1i64..120)).prop_map(
                |(pattern, start_off, end_off)| {
                    let start_date = date(2024, 1, 1) + Duration::days(start_off);
                    Some(CustomSchedule::Recurring {
                        pattern,
                        start_date,
                        end_date: end_off.map(|e| start_date + Duration::days(e)),
                    })
                }
            ),
        ];
        (day, schedule).prop_map(|(day_of_week, custom_schedule)| {
            let mut g = Gathering::new("prop");
            g.day_of_week = day_of_week;
            g.custom_schedule = custom_schedule;
            g
        })
    }

    proptest! {
        #[test]
        fn resolution_is_idempotent(g in arb_gathering(), today_off in 0i64..400) {
            let today = date(2024, 1, 1) + Duration::days(today_off);
            let first = resolve_next_occurrence(&g, today);
            let second = resolve_next_occurrence(&g, today);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn days_away_matches_date_or_is_clamped(g in arb_gathering(), today_off in 0i64..400) {
            let today = date(2024, 1, 1) + Duration::days(today_off);
            let next = resolve_next_occurrence(&g, today);
            if next.date >= today {
                prop_assert_eq!(i64::from(next.days_away), (next.date - today).num_days());
            } else {
                prop_assert_eq!(next.days_away, 0);
            }
        }
    }
}
