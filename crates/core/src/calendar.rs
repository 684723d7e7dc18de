//! Day and week calendar aggregation.
//!
//! Weeks run Monday 00:00:00.000 through Sunday 23:59:59.999. Appointments
//! are bucketed by the local calendar date of their wall-clock start, then by
//! operator, and every day x operator bucket exists even when empty so the UI
//! can render a full grid.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::LocalDateTime;

/// Number of days in a calendar week view.
pub const DAYS_PER_WEEK: usize = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Anything that can be placed on the calendar grid.
pub trait Scheduled {
    fn starts_at(&self) -> LocalDateTime;
    fn operator_id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Inclusive wall-clock bounds of a calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub start: LocalDateTime,
    pub end: LocalDateTime,
}

impl DateBounds {
    pub fn contains(&self, at: LocalDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// 23:59:59.999, the last instant included in a day.
pub fn end_of_day_time() -> NaiveTime {
    NaiveTime::MIN + Duration::milliseconds(MILLIS_PER_DAY - 1)
}

/// `[date 00:00:00.000, date 23:59:59.999]`.
pub fn day_bounds(date: NaiveDate) -> DateBounds {
    DateBounds {
        start: date.and_time(NaiveTime::MIN),
        end: date.and_time(end_of_day_time()),
    }
}

/// Monday of the week containing `anchor`.
///
/// Sunday belongs to the week that started six days earlier; any other day
/// goes back `weekday - 1` days.
pub fn week_start(anchor: NaiveDate) -> NaiveDate {
    let days_back = match anchor.weekday() {
        Weekday::Sun => 6,
        other => i64::from(other.number_from_monday()) - 1,
    };
    anchor - Duration::days(days_back)
}

/// Monday 00:00:00.000 through the following Sunday 23:59:59.999.
pub fn week_bounds(anchor: NaiveDate) -> DateBounds {
    let monday = week_start(anchor);
    let sunday = monday + Duration::days(DAYS_PER_WEEK as i64 - 1);
    DateBounds {
        start: monday.and_time(NaiveTime::MIN),
        end: sunday.and_time(end_of_day_time()),
    }
}

/// The seven dates starting at `monday`.
pub fn week_days(monday: NaiveDate) -> Vec<NaiveDate> {
    monday.iter_days().take(DAYS_PER_WEEK).collect()
}

/// Parse a `YYYY-MM-DD` query parameter.
pub fn parse_date(input: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CoreError::Validation(format!("Invalid date '{input}'. Expected YYYY-MM-DD"))
    })
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// One operator's appointments on one day, ordered by start.
#[derive(Debug, Clone, Serialize)]
pub struct OperatorColumn<T> {
    pub operator_id: String,
    pub appointments: Vec<T>,
}

/// All operator columns for a single day.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay<T> {
    pub date: NaiveDate,
    pub operators: Vec<OperatorColumn<T>>,
}

/// Day -> operator -> appointments.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid<T> {
    pub days: Vec<CalendarDay<T>>,
}

impl<T: Scheduled> CalendarGrid<T> {
    /// Bucket `appointments` into a grid of `days` x `operator_ids`.
    ///
    /// Day and operator order follow the inputs. Appointments whose date or
    /// operator is not part of the grid are dropped.
    pub fn build(days: &[NaiveDate], operator_ids: &[String], mut appointments: Vec<T>) -> Self {
        appointments.sort_by_key(|a| a.starts_at());

        let mut grid: Vec<CalendarDay<T>> = days
            .iter()
            .map(|&date| CalendarDay {
                date,
                operators: operator_ids
                    .iter()
                    .map(|id| OperatorColumn {
                        operator_id: id.clone(),
                        appointments: Vec::new(),
                    })
                    .collect(),
            })
            .collect();

        let day_index: HashMap<NaiveDate, usize> =
            days.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        let operator_index: HashMap<&str, usize> = operator_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        for appointment in appointments {
            let date = appointment.starts_at().date();
            let cell = day_index
                .get(&date)
                .copied()
                .zip(operator_index.get(appointment.operator_id()).copied());
            if let Some((d, o)) = cell {
                grid[d].operators[o].appointments.push(appointment);
            }
        }

        Self { days: grid }
    }

    /// Appointments for one operator on one day.
    pub fn cell(&self, date: NaiveDate, operator_id: &str) -> Option<&[T]> {
        self.days
            .iter()
            .find(|d| d.date == date)?
            .operators
            .iter()
            .find(|c| c.operator_id == operator_id)
            .map(|c| c.appointments.as_slice())
    }

    /// Total appointments placed on the grid.
    pub fn appointment_count(&self) -> usize {
        self.days
            .iter()
            .flat_map(|d| d.operators.iter())
            .map(|c| c.appointments.len())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Timelike;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
        operator: String,
        at: LocalDateTime,
    }

    impl Scheduled for Item {
        fn starts_at(&self) -> LocalDateTime {
            self.at
        }
        fn operator_id(&self) -> &str {
            &self.operator
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: i64, operator: &str, day: NaiveDate, h: u32, min: u32) -> Item {
        Item {
            id,
            operator: operator.to_string(),
            at: day.and_hms_opt(h, min, 0).unwrap(),
        }
    }

    #[test]
    fn day_bounds_cover_whole_day() {
        let bounds = day_bounds(date(2024, 1, 8));
        assert_eq!(bounds.start, date(2024, 1, 8).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            bounds.end,
            date(2024, 1, 8).and_hms_milli_opt(23, 59, 59, 999).unwrap()
        );
        assert!(bounds.contains(date(2024, 1, 8).and_hms_opt(23, 59, 59).unwrap()));
        assert!(!bounds.contains(date(2024, 1, 9).and_hms_opt(0, 0, 0).unwrap()));
    }

    #[test]
    fn wednesday_anchor_starts_on_monday() {
        // 2024-01-10 is a Wednesday.
        let bounds = week_bounds(date(2024, 1, 10));
        assert_eq!(bounds.start, date(2024, 1, 8).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            bounds.end,
            date(2024, 1, 14).and_hms_milli_opt(23, 59, 59, 999).unwrap()
        );
    }

    #[test]
    fn sunday_anchor_goes_back_six_days() {
        // 2024-01-14 is a Sunday.
        assert_eq!(week_start(date(2024, 1, 14)), date(2024, 1, 8));
        let bounds = week_bounds(date(2024, 1, 14));
        assert_eq!(bounds.end.date(), date(2024, 1, 14));
        assert_eq!(bounds.end.nanosecond(), 999_000_000);
    }

    #[test]
    fn monday_anchor_is_its_own_week_start() {
        assert_eq!(week_start(date(2024, 1, 8)), date(2024, 1, 8));
    }

    #[test]
    fn week_crossing_month_and_year() {
        // 2025-01-01 is a Wednesday.
        assert_eq!(week_start(date(2025, 1, 1)), date(2024, 12, 30));
        let days = week_days(date(2024, 12, 30));
        assert_eq!(days.len(), DAYS_PER_WEEK);
        assert_eq!(days[6], date(2025, 1, 5));
    }

    #[test]
    fn grid_preinitialises_every_bucket() {
        let monday = date(2024, 1, 8);
        let operators = vec!["op-maria".to_string(), "op-giulia".to_string()];
        let grid: CalendarGrid<Item> = CalendarGrid::build(&week_days(monday), &operators, vec![]);

        assert_eq!(grid.days.len(), 7);
        for day in &grid.days {
            assert_eq!(day.operators.len(), 2);
            assert!(day.operators.iter().all(|c| c.appointments.is_empty()));
        }
        assert_eq!(grid.appointment_count(), 0);
    }

    #[test]
    fn grid_buckets_by_day_then_operator_in_start_order() {
        let monday = date(2024, 1, 8);
        let tuesday = date(2024, 1, 9);
        let operators = vec!["op-maria".to_string(), "op-giulia".to_string()];
        let items = vec![
            item(3, "op-giulia", monday, 11, 0),
            item(1, "op-giulia", monday, 9, 0),
            item(2, "op-maria", monday, 10, 0),
            item(4, "op-maria", tuesday, 23, 45),
        ];

        let grid = CalendarGrid::build(&week_days(monday), &operators, items);

        let giulia_monday: Vec<i64> = grid
            .cell(monday, "op-giulia")
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(giulia_monday, vec![1, 3]);
        assert_eq!(grid.cell(monday, "op-maria").unwrap().len(), 1);
        assert_eq!(grid.cell(tuesday, "op-maria").unwrap()[0].id, 4);
        assert_eq!(grid.appointment_count(), 4);
    }

    #[test]
    fn late_evening_appointment_stays_on_its_local_date() {
        let monday = date(2024, 1, 8);
        let operators = vec!["op-maria".to_string()];
        let grid = CalendarGrid::build(
            &week_days(monday),
            &operators,
            vec![item(1, "op-maria", date(2024, 1, 14), 23, 30)],
        );
        assert_eq!(grid.cell(date(2024, 1, 14), "op-maria").unwrap().len(), 1);
    }

    #[test]
    fn out_of_range_items_are_dropped() {
        let monday = date(2024, 1, 8);
        let operators = vec!["op-maria".to_string()];
        let grid = CalendarGrid::build(
            &[monday],
            &operators,
            vec![
                item(1, "op-maria", date(2024, 1, 9), 10, 0),
                item(2, "op-unknown", monday, 10, 0),
            ],
        );
        assert_eq!(grid.appointment_count(), 0);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date("2024-01-08").unwrap(), date(2024, 1, 8));
        assert_matches!(parse_date("08/01/2024"), Err(CoreError::Validation(_)));
    }
}
