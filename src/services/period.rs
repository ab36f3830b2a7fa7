//! Budget period window resolution.
//!
//! A budget's "current" spend is measured over the window
//! `[window_start(period, now), now]`. All timestamps in the system are
//! UTC, so "midnight" here means UTC midnight.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};

use crate::models::budget::BudgetPeriod;

/// Inclusive start of the current period window containing `now`.
///
/// - DAILY: midnight of `now`'s date
/// - WEEKLY: midnight of the Monday on/before `now` (ISO week)
/// - MONTHLY: midnight of the 1st of the month
/// - QUARTERLY: midnight of the 1st of the quarter (months 1, 4, 7, 10)
/// - YEARLY: midnight of January 1st
pub fn window_start(period: BudgetPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();

    let start = match period {
        BudgetPeriod::Daily => today,
        BudgetPeriod::Weekly => today.week(Weekday::Mon).first_day(),
        BudgetPeriod::Monthly => first_of_month(today.year(), today.month()),
        BudgetPeriod::Quarterly => {
            // Quarters start at months 1, 4, 7, 10.
            let quarter_start_month = (today.month0() / 3) * 3 + 1;
            first_of_month(today.year(), quarter_start_month)
        }
        BudgetPeriod::Yearly => first_of_month(today.year(), 1),
    };

    start.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Month comes from a valid date (or a quarter/year constant), so day 1
    // always exists.
    NaiveDate::from_ymd_opt(year, month, 1).expect("first day of month")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        at(y, m, d, 0, 0)
    }

    #[test]
    fn daily_starts_at_midnight_of_today() {
        let now = at(2024, 3, 17, 15, 42);
        assert_eq!(window_start(BudgetPeriod::Daily, now), midnight(2024, 3, 17));
    }

    #[test]
    fn weekly_starts_on_preceding_monday() {
        // 2024-03-17 is a Sunday; the ISO week began Monday 2024-03-11.
        let now = at(2024, 3, 17, 9, 0);
        assert_eq!(
            window_start(BudgetPeriod::Weekly, now),
            midnight(2024, 3, 11)
        );
    }

    #[test]
    fn weekly_on_a_monday_is_that_monday() {
        let now = at(2024, 3, 11, 0, 0);
        assert_eq!(
            window_start(BudgetPeriod::Weekly, now),
            midnight(2024, 3, 11)
        );
    }

    #[test]
    fn monthly_starts_on_the_first() {
        let now = at(2024, 3, 17, 23, 59);
        assert_eq!(
            window_start(BudgetPeriod::Monthly, now),
            midnight(2024, 3, 1)
        );
    }

    #[test]
    fn quarterly_snaps_to_quarter_boundaries() {
        assert_eq!(
            window_start(BudgetPeriod::Quarterly, at(2024, 2, 10, 8, 0)),
            midnight(2024, 1, 1)
        );
        assert_eq!(
            window_start(BudgetPeriod::Quarterly, at(2024, 8, 31, 8, 0)),
            midnight(2024, 7, 1)
        );
        assert_eq!(
            window_start(BudgetPeriod::Quarterly, at(2024, 10, 1, 0, 0)),
            midnight(2024, 10, 1)
        );
    }

    #[test]
    fn yearly_starts_on_january_first() {
        let now = at(2024, 12, 31, 23, 0);
        assert_eq!(
            window_start(BudgetPeriod::Yearly, now),
            midnight(2024, 1, 1)
        );
    }
}
