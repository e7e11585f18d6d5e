//! Statistics periods.
//!
//! A period starts at local midnight of its first day in the bot's time zone
//! and ends at the moment the report is requested.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Period {
    Today,
    Week,
    Month,
    Year,
}

impl Period {
    pub(crate) const ALL: [Period; 4] = [Period::Today, Period::Week, Period::Month, Period::Year];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Period> {
        Period::ALL.into_iter().find(|p| p.as_str() == value)
    }

    /// First day of the period containing `today`. Weeks start on Monday.
    pub(crate) fn first_day(self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::Today => today,
            Period::Week => today
                .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
                .unwrap_or(today),
            Period::Month => today.with_day(1).unwrap_or(today),
            Period::Year => today.with_ordinal(1).unwrap_or(today),
        }
    }

    /// Inclusive UTC window `[start of period, now]`.
    pub(crate) fn window(self, now: DateTime<Utc>, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.with_timezone(&tz).date_naive();
        let first = self.first_day(today);
        (local_midnight(first, tz), now)
    }
}

/// Midnight of `day` in `tz`, falling back to UTC midnight when the local
/// midnight does not exist.
fn local_midnight(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// The current calendar day in `tz`.
pub(crate) fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Moscow;

    #[test]
    fn first_days() {
        // Thursday
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(Period::Today.first_day(today), today);
        assert_eq!(
            Period::Week.first_day(today),
            NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
        );
        assert_eq!(
            Period::Month.first_day(today),
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
        );
        assert_eq!(
            Period::Year.first_day(today),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );

        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        assert_eq!(Period::Week.first_day(monday), monday);
    }

    #[test]
    fn window_starts_at_local_midnight() {
        // 2026-10-15 22:30 UTC is already 16 October in Moscow (UTC+3).
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 22, 30, 0).unwrap();
        let (start, end) = Period::Today.window(now, Moscow);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 15, 21, 0, 0).unwrap());
        assert_eq!(end, now);

        let (start, _) = Period::Month.window(now, Moscow);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 9, 30, 21, 0, 0).unwrap());
    }

    #[test]
    fn names_round_trip() {
        for period in Period::ALL {
            assert_eq!(Period::parse(period.as_str()), Some(period));
        }
        assert_eq!(Period::parse("decade"), None);
    }
}
