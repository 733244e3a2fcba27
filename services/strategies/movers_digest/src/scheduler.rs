//! Hourly schedule: one cycle immediately, then one per hour at a fixed
//! minute and second in the configured UTC offset

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Timelike, Utc};
use std::time::Duration;

use crate::logging::LogEmoji;
use crate::pipeline::{run_cycle, CycleContext, DeliveryMode};
use crate::{log_error, log_schedule, log_success};

const MIN_SLEEP: Duration = Duration::from_secs(1);

/// When the clock should trigger next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub utc_offset: FixedOffset,
    pub at_minute: u32,
    pub at_second: u32,
}

impl Schedule {
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.utc_offset)
    }
}

/// One hour after `now`, with minute and second replaced and sub-seconds zeroed
///
/// Out-of-range minute or second values leave the shifted time untouched
/// in that field.
pub fn next_run_after(now: DateTime<FixedOffset>, minute: u32, second: u32) -> DateTime<FixedOffset> {
    let shifted = now + ChronoDuration::hours(1);
    let shifted = shifted.with_minute(minute).unwrap_or(shifted);
    let shifted = shifted.with_second(second).unwrap_or(shifted);
    shifted.with_nanosecond(0).unwrap_or(shifted)
}

/// Time to sleep until `next`, never less than one second
pub fn sleep_until(now: DateTime<FixedOffset>, next: DateTime<FixedOffset>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO).max(MIN_SLEEP)
}

async fn run_logged(ctx: &CycleContext) {
    match run_cycle(ctx, DeliveryMode::Deliver).await {
        Ok(report) => log_success!(
            "Cycle complete: {} in universe, {} ranked, {} reported",
            report.universe,
            report.ranked,
            report.enriched.len()
        ),
        Err(e) if e.is_permanent() => {
            log_error!("Cycle failed: {} (will repeat until the configuration is fixed)", e)
        }
        Err(e) => log_error!("Cycle failed: {}", e),
    }
}

/// Run cycles forever; a failing cycle never stops the loop
pub async fn run_forever(ctx: &CycleContext, schedule: Schedule) {
    run_logged(ctx).await;

    loop {
        let now = schedule.now();
        let next = next_run_after(now, schedule.at_minute, schedule.at_second);
        let wait = sleep_until(now, next);
        log_schedule!("Sleeping {:.1}s until {}", wait.as_secs_f64(), next.to_rfc3339());

        tokio::time::sleep(wait).await;
        tracing::debug!("{} Woke for scheduled cycle", LogEmoji::CLOCK);
        run_logged(ctx).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_next_run_is_following_hour() {
        let now = kst().with_ymd_and_hms(2024, 3, 1, 10, 17, 42).unwrap();
        let next = next_run_after(now, 0, 5);
        assert_eq!(next, kst().with_ymd_and_hms(2024, 3, 1, 11, 0, 5).unwrap());
        assert_eq!(sleep_until(now, next), Duration::from_secs(42 * 60 + 23));
    }

    #[test]
    fn test_next_run_crosses_midnight() {
        let now = kst().with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        let next = next_run_after(now, 0, 5);
        assert_eq!(next, kst().with_ymd_and_hms(2024, 3, 1, 0, 0, 5).unwrap());
    }

    #[test]
    fn test_sub_seconds_are_zeroed() {
        let now = kst().with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap() + ChronoDuration::milliseconds(750);
        let next = next_run_after(now, 30, 0);
        assert_eq!(next.nanosecond(), 0);
        assert_eq!(next, kst().with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap());
    }

    #[test]
    fn test_sleep_has_floor() {
        let now = kst().with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(sleep_until(now, now), MIN_SLEEP);
        assert_eq!(sleep_until(now, now - ChronoDuration::seconds(30)), MIN_SLEEP);
    }
}
