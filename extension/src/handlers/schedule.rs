// Stats reset schedule
// Registers the weekly and monthly reset alarms

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use std::fmt::Display;

use crate::config::ScheduleConfig;
use crate::services::{AlarmScheduler, AlarmSpec};
use crate::state::StatsWindow;

/// Instants the reset alarms were registered for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetSchedule {
    pub weekly: AlarmSpec,
    pub monthly: AlarmSpec,
}

/// `now` moved forward by the whole days left until Sunday, a full week when
/// today is Sunday. The time of day is kept, not rounded to midnight.
pub fn next_weekly_reset<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let days_until_sunday = match now.weekday().num_days_from_sunday() {
        0 => 7,
        day => 7 - day,
    };
    now.clone() + Duration::days(i64::from(days_until_sunday))
}

/// Local midnight on the first day of next month.
///
/// When midnight falls in a DST gap the first valid hour after it is used.
pub fn next_monthly_reset<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let (year, month) = match now.month() {
        12 => (now.year() + 1, 1),
        month => (now.year(), month + 1),
    };
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;

    let tz = now.timezone();
    (0..=3).find_map(|hour| {
        tz.from_local_datetime(&(midnight + Duration::hours(hour)))
            .earliest()
    })
}

/// Register (or re-register) both reset alarms relative to `now`
pub async fn schedule_resets<Tz>(
    alarms: &impl AlarmScheduler,
    config: &ScheduleConfig,
    now: &DateTime<Tz>,
) -> Result<ResetSchedule>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let weekly_at = next_weekly_reset(now);
    let monthly_at = next_monthly_reset(now).context("First day of next month is out of range")?;

    let weekly = AlarmSpec {
        when: weekly_at.with_timezone(&Utc),
        period_in_minutes: config.weekly_period_minutes,
    };
    alarms
        .create(StatsWindow::Weekly.alarm_name(), &weekly)
        .await?;
    log::info!("Weekly stats reset alarm set for {}", weekly_at);

    let monthly = AlarmSpec {
        when: monthly_at.with_timezone(&Utc),
        period_in_minutes: config.monthly_period_minutes,
    };
    alarms
        .create(StatsWindow::Monthly.alarm_name(), &monthly)
        .await?;
    log::info!("Monthly stats reset alarm set for {}", monthly_at);

    Ok(ResetSchedule { weekly, monthly })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryPlatform;
    use chrono::{FixedOffset, Timelike, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_weekly_from_midweek() {
        // 2026-10-21 is a Wednesday
        let now = at(2026, 10, 21, 15, 30);
        let next = next_weekly_reset(&now);

        assert_eq!(next.weekday(), Weekday::Sun);
        assert_eq!(next, at(2026, 10, 25, 15, 30));
    }

    #[test]
    fn test_weekly_from_sunday_is_a_full_week() {
        let now = at(2026, 10, 18, 9, 5);
        assert_eq!(next_weekly_reset(&now), at(2026, 10, 25, 9, 5));
    }

    #[test]
    fn test_weekly_from_saturday() {
        let now = at(2026, 10, 24, 23, 59);
        let next = next_weekly_reset(&now);
        assert_eq!(next, at(2026, 10, 25, 23, 59));
        assert_eq!((next.hour(), next.minute()), (23, 59));
    }

    #[test]
    fn test_monthly_is_first_of_next_month_at_midnight() {
        let now = at(2026, 10, 19, 14, 0);
        assert_eq!(next_monthly_reset(&now), Some(at(2026, 11, 1, 0, 0)));

        // Already the first: still next month
        let now = at(2026, 2, 1, 0, 0);
        assert_eq!(next_monthly_reset(&now), Some(at(2026, 3, 1, 0, 0)));
    }

    #[test]
    fn test_monthly_rolls_over_the_year() {
        let now = at(2026, 12, 31, 23, 0);
        assert_eq!(next_monthly_reset(&now), Some(at(2027, 1, 1, 0, 0)));
    }

    #[test]
    fn test_monthly_skips_missing_midnight() {
        use chrono_tz::America::Asuncion;

        // Paraguay moved clocks from 00:00 to 01:00 on 2017-10-01
        let now = Asuncion.with_ymd_and_hms(2017, 9, 15, 12, 0, 0).unwrap();
        let next = next_monthly_reset(&now).unwrap();

        assert_eq!(next.to_rfc3339(), "2017-10-01T01:00:00-03:00");
        assert_eq!((next.day(), next.hour()), (1, 1));
    }

    #[tokio::test]
    async fn test_schedule_registers_both_alarms() {
        let platform = MemoryPlatform::new();
        let now = at(2026, 10, 19, 8, 0);

        let schedule = schedule_resets(&platform, &ScheduleConfig::default(), &now)
            .await
            .unwrap();

        let alarms = platform.alarms();
        assert_eq!(alarms.len(), 2);

        let weekly = &alarms["resetWeeklyStats"];
        assert_eq!(weekly, &schedule.weekly);
        assert_eq!(weekly.period_in_minutes, 10080);
        assert_eq!(weekly.when, at(2026, 10, 25, 8, 0).with_timezone(&Utc));

        let monthly = &alarms["resetMonthlyStats"];
        assert_eq!(monthly.period_in_minutes, 43200);
        assert_eq!(monthly.when, at(2026, 11, 1, 0, 0).with_timezone(&Utc));
    }

    #[tokio::test]
    async fn test_rescheduling_overwrites_previous_alarms() {
        let platform = MemoryPlatform::new();
        let config = ScheduleConfig::default();

        schedule_resets(&platform, &config, &at(2026, 10, 19, 8, 0))
            .await
            .unwrap();
        schedule_resets(&platform, &config, &at(2026, 11, 3, 8, 0))
            .await
            .unwrap();

        let alarms = platform.alarms();
        assert_eq!(alarms.len(), 2);
        assert_eq!(
            alarms["resetMonthlyStats"].when,
            at(2026, 12, 1, 0, 0).with_timezone(&Utc)
        );
    }
}
