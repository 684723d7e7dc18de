//! Daily dashboard summary.
//!
//! Pure functions over an already-fetched appointment list.

use chrono::NaiveDate;
use serde::Serialize;

use crate::appointment::AppointmentStatus;
use crate::calendar::{day_bounds, Scheduled};
use crate::money::sum_cents;
use crate::types::{Cents, LocalDateTime};

/// Slots per day used for the occupancy percentage.
pub const DAILY_SLOT_CAPACITY: usize = 10;

/// Daily takings goal (300.00).
pub const DAILY_REVENUE_TARGET_CENTS: Cents = 30_000;

/// An appointment with the data the dashboard needs.
pub trait Billable: Scheduled {
    fn status(&self) -> AppointmentStatus;
    /// Sum of the linked services' prices.
    fn total_price_cents(&self) -> Cents;
    fn client_last_name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAppointment {
    pub client_last_name: String,
    pub starts_at: LocalDateTime,
    pub minutes_until: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub appointment_count: usize,
    pub occupancy_percent: u32,
    pub revenue_cents: Cents,
    pub revenue_target_cents: Cents,
    pub target_reached: bool,
    pub next_appointment: Option<NextAppointment>,
}

impl DailySummary {
    /// Summarise `appointments` for the day containing `now`.
    ///
    /// The next appointment is the earliest one starting strictly after `now`
    /// among all the given appointments, whatever their status.
    pub fn compute<T: Billable>(appointments: &[T], now: LocalDateTime) -> Self {
        let today = day_bounds(now.date());
        let todays: Vec<&T> = appointments
            .iter()
            .filter(|a| today.contains(a.starts_at()))
            .collect();

        let revenue_cents = sum_cents(
            todays
                .iter()
                .filter(|a| a.status().counts_toward_revenue())
                .map(|a| a.total_price_cents()),
        );

        let next_appointment = appointments
            .iter()
            .filter(|a| a.starts_at() > now)
            .min_by_key(|a| a.starts_at())
            .map(|a| NextAppointment {
                client_last_name: a.client_last_name().to_string(),
                starts_at: a.starts_at(),
                minutes_until: minutes_between(now, a.starts_at()),
            });

        Self {
            date: now.date(),
            appointment_count: todays.len(),
            occupancy_percent: occupancy_percent(todays.len()),
            revenue_cents,
            revenue_target_cents: DAILY_REVENUE_TARGET_CENTS,
            target_reached: revenue_cents >= DAILY_REVENUE_TARGET_CENTS,
            next_appointment,
        }
    }
}

/// Booked share of [`DAILY_SLOT_CAPACITY`], rounded and capped at 100.
pub fn occupancy_percent(count: usize) -> u32 {
    let percent = (count * 100 + DAILY_SLOT_CAPACITY / 2) / DAILY_SLOT_CAPACITY;
    percent.min(100) as u32
}

/// Whole minutes from `now` to `later`, rounded to nearest and never negative.
fn minutes_between(now: LocalDateTime, later: LocalDateTime) -> i64 {
    let seconds = (later - now).num_seconds().max(0);
    (seconds + 30) / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Appt {
        operator: String,
        at: LocalDateTime,
        status: AppointmentStatus,
        price: Cents,
        last_name: String,
    }

    impl Scheduled for Appt {
        fn starts_at(&self) -> LocalDateTime {
            self.at
        }
        fn operator_id(&self) -> &str {
            &self.operator
        }
    }

    impl Billable for Appt {
        fn status(&self) -> AppointmentStatus {
            self.status
        }
        fn total_price_cents(&self) -> Cents {
            self.price
        }
        fn client_last_name(&self) -> &str {
            &self.last_name
        }
    }

    fn at(day: u32, h: u32, m: u32) -> LocalDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn appt(at: LocalDateTime, status: AppointmentStatus, price: Cents, last_name: &str) -> Appt {
        Appt {
            operator: "op-giulia".into(),
            at,
            status,
            price,
            last_name: last_name.into(),
        }
    }

    #[test]
    fn revenue_excludes_cancelled_and_other_days() {
        let list = vec![
            appt(at(8, 9, 0), AppointmentStatus::Completed, 2500, "Rossi"),
            appt(at(8, 10, 0), AppointmentStatus::Confirmed, 4500, "Bianchi"),
            appt(at(8, 11, 0), AppointmentStatus::Cancelled, 6000, "Verdi"),
            appt(at(9, 11, 0), AppointmentStatus::Confirmed, 9900, "Neri"),
        ];
        let summary = DailySummary::compute(&list, at(8, 8, 0));
        assert_eq!(summary.appointment_count, 3);
        assert_eq!(summary.revenue_cents, 7000);
        assert!(!summary.target_reached);
        assert_eq!(summary.occupancy_percent, 30);
    }

    #[test]
    fn next_appointment_and_minutes_until() {
        let list = vec![
            appt(at(8, 9, 0), AppointmentStatus::Completed, 2500, "Rossi"),
            appt(at(8, 11, 0), AppointmentStatus::Confirmed, 2500, "Verdi"),
            appt(at(8, 10, 30), AppointmentStatus::Confirmed, 2500, "Bianchi"),
        ];
        let summary = DailySummary::compute(&list, at(8, 10, 0));
        let next = summary.next_appointment.unwrap();
        assert_eq!(next.client_last_name, "Bianchi");
        assert_eq!(next.minutes_until, 30);
    }

    #[test]
    fn no_future_appointment() {
        let list = vec![appt(at(8, 9, 0), AppointmentStatus::Completed, 2500, "Rossi")];
        let summary = DailySummary::compute(&list, at(8, 18, 0));
        assert!(summary.next_appointment.is_none());
    }

    #[test]
    fn target_reached_at_threshold() {
        let list = vec![
            appt(at(8, 9, 0), AppointmentStatus::Completed, 20_000, "Rossi"),
            appt(at(8, 12, 0), AppointmentStatus::Confirmed, 10_000, "Verdi"),
        ];
        let summary = DailySummary::compute(&list, at(8, 8, 0));
        assert_eq!(summary.revenue_cents, DAILY_REVENUE_TARGET_CENTS);
        assert!(summary.target_reached);
    }

    #[test]
    fn occupancy_is_capped() {
        assert_eq!(occupancy_percent(0), 0);
        assert_eq!(occupancy_percent(7), 70);
        assert_eq!(occupancy_percent(15), 100);
    }

    #[test]
    fn empty_list() {
        let summary = DailySummary::compute::<Appt>(&[], at(8, 8, 0));
        assert_eq!(summary.appointment_count, 0);
        assert_eq!(summary.revenue_cents, 0);
        assert!(summary.next_appointment.is_none());
    }
}
